mod filters;

use std::path::Path;

use image::RgbImage;
use thiserror::Error;

pub use filters::{BuiltinStylizer, Filter};

/// 风格化例程错误
#[derive(Error, Debug)]
pub enum StylizeError {
    /// 滤镜名不在例程支持的集合内
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    /// 原图读取或解码失败
    #[error("failed to load original '{path}': {reason}")]
    Source { path: String, reason: String },
}

/// 风格化例程：对磁盘上的原图按滤镜名生成风格化结果。
///
/// 由 handler 在阻塞线程池中调用，实现可以是 CPU 密集的。
/// 滤镜名原样透传，不与已上传的风格图目录做任何对照。
pub trait Stylizer: Send + Sync + 'static {
    fn stylize(&self, original: &Path, filter: &str) -> Result<RgbImage, StylizeError>;
}

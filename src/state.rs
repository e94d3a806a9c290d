use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::AppConfig;
use crate::features::storage::PhotoStore;
use crate::features::stylize::{BuiltinStylizer, Stylizer};

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 风格图与照片的目录布局
    pub store: PhotoStore,
    /// 风格化例程
    pub stylizer: Arc<dyn Stylizer>,
    /// 控制并发图片处理的信号量（解码/哈希/风格化/编码均为 CPU 密集）
    pub render_semaphore: Arc<Semaphore>,
    /// 上传扩展名白名单
    pub allowed_extensions: Arc<[String]>,
    /// 输出 JPEG 质量
    pub jpeg_quality: u8,
}

impl AppState {
    pub fn new(config: &AppConfig, stylizer: Arc<dyn Stylizer>) -> Self {
        Self {
            store: PhotoStore::from_config(config),
            stylizer,
            render_semaphore: Arc::new(Semaphore::new(config.image.effective_parallelism())),
            allowed_extensions: config.upload.allowed_extensions.clone().into(),
            jpeg_quality: config.image.jpeg_quality,
        }
    }

    /// 使用内置滤镜集合
    pub fn with_builtin_stylizer(config: &AppConfig) -> Self {
        Self::new(config, Arc::new(BuiltinStylizer))
    }
}

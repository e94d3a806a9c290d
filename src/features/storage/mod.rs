//! 文件系统存储：两个平铺目录即全部状态。
//!
//! - 风格图：`<styles_dir>/<上传文件名>`
//! - 照片：`<photos_dir>/<hash>.<variant>.jpg`，variant 为 `original` 或滤镜名

pub mod codec;

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::AppConfig;

/// 原图的 variant 名
pub const ORIGINAL_VARIANT: &str = "original";

/// 照片文件名：`<hash>.<variant>.jpg`
pub fn photo_filename(photo_hash: &str, variant: &str) -> String {
    format!("{photo_hash}.{variant}.jpg")
}

/// 路径片段（哈希、滤镜名、风格文件名）是否可以安全地拼进目录。
///
/// 拒绝空串、`.`/`..` 以及任何路径分隔符或 NUL。
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

#[derive(Debug, Clone)]
pub struct PhotoStore {
    styles_dir: PathBuf,
    photos_dir: PathBuf,
}

impl PhotoStore {
    pub fn new(styles_dir: impl Into<PathBuf>, photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            styles_dir: styles_dir.into(),
            photos_dir: photos_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.styles_path(), config.photos_path())
    }

    pub fn styles_dir(&self) -> &Path {
        &self.styles_dir
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// 创建两个存储目录（已存在时无操作）
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.styles_dir).await?;
        tokio::fs::create_dir_all(&self.photos_dir).await?;
        Ok(())
    }

    pub fn photo_path(&self, photo_hash: &str, variant: &str) -> PathBuf {
        self.photos_dir.join(photo_filename(photo_hash, variant))
    }

    pub fn style_path(&self, filename: &str) -> PathBuf {
        self.styles_dir.join(filename)
    }

    /// 路径存在且是普通文件
    pub async fn is_file(path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .is_ok_and(|m| m.is_file())
    }

    pub async fn is_dir(path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .is_ok_and(|m| m.is_dir())
    }

    /// 整文件替换写入：先写同目录临时文件再 rename，读者不会看到半截 JPEG。
    /// 目标已存在时直接覆盖；同一目标的并发写入各用独立的临时文件，后 rename 者胜出。
    pub async fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("photo");
        let temp_path = parent.join(format!(".{file_name}.tmp-{}", Uuid::new_v4().simple()));

        if let Err(err) = tokio::fs::write(&temp_path, bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err);
        }
        if let Err(err) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err);
        }
        Ok(())
    }

    /// 仅在目标不存在时创建并写入；已存在时返回 `ErrorKind::AlreadyExists`。
    pub async fn create_new_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }
}

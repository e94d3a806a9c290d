use crate::error::AppError;
use crate::features::storage::PhotoStore;
use crate::features::stylize::BuiltinStylizer;

/// 执行启动检查
///
/// 1. 检查并创建风格图与照片目录
/// 2. 打印内置滤镜列表
pub async fn run_startup_checks(store: &PhotoStore) -> Result<(), AppError> {
    tracing::info!("🔍 开始执行启动检查...");

    ensure_storage_dirs(store).await?;

    let filters: Vec<&str> = BuiltinStylizer::filter_names().collect();
    tracing::info!("🎨 内置滤镜: {}", filters.join(", "));

    tracing::info!("✅ 启动检查完成");
    Ok(())
}

/// 确保存储目录存在
async fn ensure_storage_dirs(store: &PhotoStore) -> Result<(), AppError> {
    for dir in [store.styles_dir(), store.photos_dir()] {
        if PhotoStore::is_dir(dir).await {
            tracing::info!("✅ 目录已存在: {:?}", dir);
        } else {
            tracing::warn!("📁 未找到目录，正在创建: {:?}", dir);
        }
    }
    store
        .ensure_dirs()
        .await
        .map_err(|e| AppError::Internal(format!("创建存储目录失败: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_startup_checks;
    use crate::features::storage::PhotoStore;

    #[tokio::test]
    async fn startup_creates_missing_storage_dirs() {
        let root = tempfile::tempdir().expect("tempdir");
        let store = PhotoStore::new(root.path().join("fs/styles"), root.path().join("fs/photos"));

        run_startup_checks(&store).await.expect("startup checks");
        assert!(store.styles_dir().is_dir());
        assert!(store.photos_dir().is_dir());

        // 再次运行无副作用
        run_startup_checks(&store).await.expect("idempotent");
    }
}

use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    routing::post,
};
use std::time::Instant;

use crate::error::{AppError, ErrorBody};
use crate::features::storage::{PhotoStore, codec, is_safe_segment};
use crate::features::upload::{self, UploadForm};
use crate::state::AppState;

pub const MSG_STYLE_CONFLICT: &str = "style with same filename already exists";
pub const MSG_STYLE_BAD_NAME: &str = "style filename must not contain path separators";

#[utoipa::path(
    post,
    path = "/style/upload",
    summary = "上传风格参考图",
    description = "以客户端文件名原样保存（重新编码为 JPEG）。同名风格已存在时拒绝，不覆盖。",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "上传成功", body = String, content_type = "text/plain"),
        (status = 400, description = "缺少文件 / 扩展名不允许 / 同名冲突", body = ErrorBody),
        (status = 422, description = "内容无法解码为图片", body = ErrorBody)
    ),
    tag = "Style"
)]
pub async fn upload_style(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<&'static str, AppError> {
    let t_total = Instant::now();
    let style = upload::read_upload(multipart, &state.allowed_extensions).await?;

    if !is_safe_segment(&style.filename) {
        return Err(AppError::invalid_usage(MSG_STYLE_BAD_NAME));
    }
    let style_path = state.store.style_path(&style.filename);
    // 先行检查，避免对必然冲突的上传做解码
    if PhotoStore::is_file(&style_path).await {
        return Err(AppError::invalid_usage(MSG_STYLE_CONFLICT));
    }

    let quality = state.jpeg_quality;
    let _permit = state.render_semaphore.clone().acquire_owned().await?;
    let bytes = style.bytes;
    let jpeg =
        tokio::task::spawn_blocking(move || codec::reencode_as_jpeg(&bytes, quality)).await??;

    // create_new 保证检查与写入之间被并发抢先时也不会覆盖
    match PhotoStore::create_new_file(&style_path, &jpeg).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(AppError::invalid_usage(MSG_STYLE_CONFLICT));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        filename = %style.filename,
        bytes = jpeg.len(),
        "风格图已保存，耗时 {}ms",
        t_total.elapsed().as_millis()
    );
    Ok("upload success")
}

pub fn create_style_router() -> Router<AppState> {
    Router::new().route("/style/upload", post(upload_style))
}

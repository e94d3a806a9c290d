use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderValue, header},
    response::IntoResponse,
    routing::{get, post},
};
use std::time::Instant;

use crate::error::{AppError, ErrorBody};
use crate::features::hashing::AverageHash;
use crate::features::storage::{ORIGINAL_VARIANT, PhotoStore, codec, is_safe_segment};
use crate::features::upload::{self, UploadForm};
use crate::state::AppState;

use super::models::PhotoUploadResponse;

pub const MSG_NO_ORIGINAL: &str = "original photo doesnt exist in the fs";
pub const MSG_BAD_SEGMENT: &str = "photo hash and filter name must not contain path separators";

#[utoipa::path(
    post,
    path = "/photo/upload",
    summary = "上传照片",
    description = "计算图片的平均哈希作为照片 ID，并保存为 `<hash>.original.jpg`。同哈希重复上传会静默覆盖。",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "上传成功，返回照片哈希", body = PhotoUploadResponse),
        (status = 400, description = "缺少文件 / 扩展名不允许", body = ErrorBody),
        (status = 422, description = "内容无法解码为图片", body = ErrorBody)
    ),
    tag = "Photo"
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let t_total = Instant::now();
    let photo = upload::read_upload(multipart, &state.allowed_extensions).await?;

    let quality = state.jpeg_quality;
    let _permit = state.render_semaphore.clone().acquire_owned().await?;
    let bytes = photo.bytes;
    // 解码、缩放求哈希、JPEG 编码都是 CPU 密集操作，移出 tokio worker
    let (hash, jpeg) = tokio::task::spawn_blocking(move || {
        let img = codec::decode_image(&bytes)?;
        let hash = AverageHash::of(&img);
        let jpeg = codec::encode_jpeg(&img.to_rgb8(), quality)?;
        Ok::<_, AppError>((hash, jpeg))
    })
    .await??;

    let uid = hash.to_string();
    let path = state.store.photo_path(&uid, ORIGINAL_VARIANT);
    PhotoStore::replace_file(&path, &jpeg).await?;

    tracing::info!(
        uid = %uid,
        filename = %photo.filename,
        "照片已保存，耗时 {}ms",
        t_total.elapsed().as_millis()
    );
    Ok(Json(PhotoUploadResponse { uid }))
}

#[utoipa::path(
    get,
    path = "/photo/{photo_hash}/stylize/{filter_name}",
    summary = "获取风格化照片",
    description = "若 `<hash>.<filter>.jpg` 尚不存在，则对原图调用风格化例程并落盘；随后返回该文件。滤镜名不与风格图目录做对照。",
    params(
        ("photo_hash" = String, Path, description = "照片上传时返回的 uid"),
        ("filter_name" = String, Path, description = "滤镜名")
    ),
    responses(
        (status = 200, description = "风格化后的 JPEG", content_type = "image/jpeg"),
        (status = 400, description = "原图不存在", body = ErrorBody),
        (status = 500, description = "风格化失败（含未知滤镜）", body = ErrorBody)
    ),
    tag = "Photo"
)]
pub async fn stylize_photo(
    State(state): State<AppState>,
    Path((photo_hash, filter_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let t_total = Instant::now();
    if !is_safe_segment(&photo_hash) || !is_safe_segment(&filter_name) {
        return Err(AppError::invalid_usage(MSG_BAD_SEGMENT));
    }

    let original_path = state.store.photo_path(&photo_hash, ORIGINAL_VARIANT);
    if !PhotoStore::is_file(&original_path).await {
        return Err(AppError::invalid_usage(MSG_NO_ORIGINAL));
    }

    // 仅以文件是否存在作为缓存状态；并发的同键请求可能重复计算，后写覆盖先写
    let stylized_path = state.store.photo_path(&photo_hash, &filter_name);
    let body: Vec<u8> = if PhotoStore::is_file(&stylized_path).await {
        tracing::info!(uid = %photo_hash, filter = %filter_name, "风格化缓存命中");
        tokio::fs::read(&stylized_path).await?
    } else {
        tracing::info!(uid = %photo_hash, filter = %filter_name, "风格化缓存未命中，开始计算");
        let quality = state.jpeg_quality;
        let stylizer = state.stylizer.clone();
        let filter = filter_name.clone();
        let _permit = state.render_semaphore.clone().acquire_owned().await?;
        let t_stylize = Instant::now();
        let jpeg = tokio::task::spawn_blocking(move || {
            let stylized = stylizer.stylize(&original_path, &filter)?;
            codec::encode_jpeg(&stylized, quality)
        })
        .await??;
        tracing::info!(
            uid = %photo_hash,
            filter = %filter_name,
            "风格化完成，耗时 {}ms",
            t_stylize.elapsed().as_millis()
        );
        PhotoStore::replace_file(&stylized_path, &jpeg).await?;
        jpeg
    };

    tracing::debug!(
        uid = %photo_hash,
        filter = %filter_name,
        bytes = body.len(),
        "风格化请求完成，总耗时 {}ms",
        t_total.elapsed().as_millis()
    );
    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"))],
        Bytes::from(body),
    ))
}

pub fn create_photo_router() -> Router<AppState> {
    Router::new()
        .route("/photo/upload", post(upload_photo))
        .route("/photo/:photo_hash/stylize/:filter_name", get(stylize_photo))
}

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};

use crate::error::AppError;

/// multipart 中承载文件的字段名
pub const FILE_FIELD: &str = "file";

pub const MSG_NO_FILE: &str = "you must supply a file";
pub const MSG_EMPTY_FILE: &str = "file not provided";
pub const MSG_BAD_EXTENSION: &str = "file not allowed. do you have a .jpg file extension?";

/// multipart 上传表单（仅用于 OpenAPI 描述）
#[derive(Debug, utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// 图片文件，扩展名须为 jpg/jpeg/png
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// 通过校验的上传文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 客户端提供的文件名（原样）
    pub filename: String,
    pub bytes: Bytes,
}

/// 扩展名取最后一个 `.` 之后的部分，区分大小写
pub fn allowed_file(filename: &str, allowed_extensions: &[String]) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| allowed_extensions.iter().any(|a| a == ext))
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::invalid_usage_with_status(err.body_text(), err.status())
}

/// 从 multipart 请求体中取出 `file` 字段并做上传校验。
///
/// 非 multipart 请求与缺少 `file` 字段同样视为未提供文件。
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    allowed_extensions: &[String],
) -> Result<UploadedFile, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("multipart 解析被拒绝: {}", e);
        AppError::invalid_usage(MSG_NO_FILE)
    })?;

    let mut found = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        found = Some(UploadedFile { filename, bytes });
        break;
    }

    validate_upload(found, allowed_extensions)
}

/// 上传校验：存在、非空、扩展名在白名单内。不检查内容。
pub fn validate_upload(
    file: Option<UploadedFile>,
    allowed_extensions: &[String],
) -> Result<UploadedFile, AppError> {
    let file = file.ok_or_else(|| AppError::invalid_usage(MSG_NO_FILE))?;
    if file.filename.is_empty() || file.bytes.is_empty() {
        return Err(AppError::invalid_usage(MSG_EMPTY_FILE));
    }
    if !allowed_file(&file.filename, allowed_extensions) {
        return Err(AppError::invalid_usage(MSG_BAD_EXTENSION));
    }
    Ok(file)
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::features::stylize::StylizeError;

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 客户端用法错误（缺少文件、扩展名不合法、风格重名、原图不存在等），默认 400
    #[error("{message}")]
    InvalidUsage { message: String, status: StatusCode },

    /// 上传内容无法解码为图片
    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    /// 风格化例程失败（含未知滤镜名）
    #[error("stylize failed: {0}")]
    Stylize(#[from] StylizeError),

    /// 内部服务器错误（编码、I/O、任务调度）
    #[error("internal error: {0}")]
    Internal(String),
}

/// 统一的 JSON 错误响应体：`message` 恒在，其余为附加字段。
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// 人类可读的错误信息
    #[schema(example = "file not allowed. do you have a .jpg file extension?")]
    pub message: String,
    /// 稳定的错误码，用于程序化处理
    #[schema(example = "INVALID_USAGE")]
    pub code: String,
    /// 请求追踪 ID（由 request-id 中间件注入）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AppError {
    /// 默认 400 的用法错误
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Self::InvalidUsage {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    /// 自定义状态码的用法错误
    pub fn invalid_usage_with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self::InvalidUsage {
            message: message.into(),
            status,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUsage { status, .. } => *status,
            AppError::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Stylize(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 写入响应体的信息；涉及服务器路径或内部细节的错误只返回概括，细节留在日志
    fn public_message(&self) -> String {
        match self {
            AppError::Stylize(StylizeError::Source { .. }) => {
                "stylize failed: original photo could not be loaded".to_string()
            }
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::InvalidUsage { .. } => "INVALID_USAGE",
            AppError::ImageDecode(_) => "IMAGE_DECODE_FAILED",
            AppError::Stylize(_) => "STYLIZE_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.stable_code(), "请求处理失败: {}", self);
        } else {
            tracing::debug!(code = self.stable_code(), "请求被拒绝: {}", self);
        }

        let body = ErrorBody {
            message: self.public_message(),
            code: self.stable_code().to_string(),
            request_id: crate::request_id::current_request_id(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("I/O 错误: {err}"))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("阻塞任务执行失败: {err}"))
    }
}

impl From<tokio::sync::AcquireError> for AppError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        AppError::Internal(format!("获取处理信号量失败: {err}"))
    }
}

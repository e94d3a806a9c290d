use serde::{Deserialize, Serialize};

/// 照片上传响应
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PhotoUploadResponse {
    /// 照片的平均哈希，即后续风格化接口的 `photo_hash`
    #[schema(example = "f0f0e0c0c0c08000")]
    pub uid: String,
}


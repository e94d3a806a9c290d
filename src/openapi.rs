use utoipa::OpenApi;
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::Modify;

/// 为 Swagger UI 提供正确的业务接口前缀 Servers 配置。
///
/// `/health` 不带前缀，因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api")
                    .description(Some("业务接口前缀：对应 config.api.prefix")),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（/health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::style::handler::upload_style,
        crate::features::photo::handler::upload_photo,
        crate::features::photo::handler::stylize_photo,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::features::upload::UploadForm,
        crate::features::photo::models::PhotoUploadResponse,
        crate::features::health::handler::HealthResponse,
    )),
    modifiers(&ApiServers),
    tags(
        (name = "Style", description = "风格参考图上传（同名拒绝）。"),
        (name = "Photo", description = "照片上传（平均哈希作为 ID）与按滤镜获取风格化结果（磁盘缓存）。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Photo Stylizer API",
        version = env!("CARGO_PKG_VERSION"),
        description = "照片风格化服务 API（Axum + utoipa）。除 /health 外，业务接口挂载在 `config.api.prefix`（默认 /api）下，paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;

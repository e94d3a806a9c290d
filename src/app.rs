use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::features::{health, photo, style};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 只压缩 JSON/文本类响应；风格化结果本身就是 JPEG，压缩只浪费 CPU。
fn compression_predicate() -> impl Predicate {
    SizeAbove::default()
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
}

/// 业务路由（挂载在 `config.api.prefix` 下）
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(style::create_style_router())
        .merge(photo::create_photo_router())
}

/// 组装完整应用：业务路由、健康检查、文档与全局中间件
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::handler::health_check))
        .nest(&config.api.prefix, api_router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(config.upload.max_body_bytes))
        .with_state(state);

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new().compress_when(compression_predicate()))
}

#[cfg(test)]
mod tests {
    use super::compression_predicate;
    use axum::body::Body;
    use axum::http::{Response, header};
    use tower_http::compression::predicate::Predicate;

    fn should_compress_for(ct: &str) -> bool {
        let resp = Response::builder()
            .header(header::CONTENT_TYPE, ct)
            .body(Body::from(vec![b'x'; 2048]))
            .unwrap();
        compression_predicate().should_compress(&resp)
    }

    #[test]
    fn jpeg_responses_are_not_compressed() {
        assert!(!should_compress_for("image/jpeg"));
    }

    #[test]
    fn json_responses_are_compressed() {
        assert!(should_compress_for("application/json"));
    }
}

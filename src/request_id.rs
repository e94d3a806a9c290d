use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// 请求追踪头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static TASK_REQUEST_ID: String;
}

/// 当前请求上下文中的 request_id（不在请求内时为 None）
pub fn current_request_id() -> Option<String> {
    TASK_REQUEST_ID.try_with(Clone::clone).ok()
}

fn accept_client_id(raw: &str) -> bool {
    (1..=128).contains(&raw.len())
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn request_id_for(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| accept_client_id(v))
        .map(str::to_string)
        .unwrap_or_else(|| format!("req_{}", Uuid::new_v4().simple()))
}

/// request_id 中间件：透传合法的客户端 `X-Request-Id`，否则生成；
/// 绑定到 tracing span 与任务上下文，并回写响应头。
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = request_id_for(&req);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path()
    );
    let mut res = TASK_REQUEST_ID
        .scope(request_id.clone(), next.run(req).instrument(span))
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

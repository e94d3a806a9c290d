use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// 配置列表解析结果：是否包含 "*"，以及其余可解析的值
struct Allowed<T> {
    any: bool,
    values: Vec<T>,
}

fn parse_list<T>(label: &str, raw: &[String], parse: impl Fn(&str) -> Option<T>) -> Allowed<T> {
    let mut allowed = Allowed {
        any: false,
        values: Vec::new(),
    };
    for value in raw.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if value == "*" {
            allowed.any = true;
        } else if let Some(v) = parse(value) {
            allowed.values.push(v);
        } else {
            tracing::warn!("CORS {} 含无效值: {}", label, value);
        }
    }
    allowed
}

fn parse_origin(v: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(v).ok()
}

fn parse_method(v: &str) -> Option<Method> {
    Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
}

fn parse_header(v: &str) -> Option<HeaderName> {
    HeaderName::from_bytes(v.to_ascii_lowercase().as_bytes()).ok()
}

/// 根据配置构建 CORS 中间件；未启用或配置无效时返回 None
pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if !cors.enabled {
        return None;
    }

    let origins = parse_list("allowed_origins", &cors.allowed_origins, parse_origin);
    if !origins.any && origins.values.is_empty() {
        tracing::warn!("CORS 已启用但 allowed_origins 为空，已跳过启用");
        return None;
    }
    let methods = parse_list("allowed_methods", &cors.allowed_methods, parse_method);
    let headers = parse_list("allowed_headers", &cors.allowed_headers, parse_header);
    let expose = parse_list("expose_headers", &cors.expose_headers, parse_header);

    if cors.allow_credentials && (origins.any || methods.any || headers.any || expose.any) {
        tracing::error!("CORS 配置无效：allow_credentials=true 不能与 \"*\" 同时使用，已跳过启用");
        return None;
    }

    let mut layer = if origins.any {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins.values)
    };

    if methods.any {
        layer = layer.allow_methods(Any);
    } else if !methods.values.is_empty() {
        layer = layer.allow_methods(methods.values);
    } else {
        layer = layer.allow_methods([Method::GET, Method::POST]);
    }

    if headers.any {
        layer = layer.allow_headers(Any);
    } else if !headers.values.is_empty() {
        layer = layer.allow_headers(headers.values);
    }

    if expose.any {
        layer = layer.expose_headers(Any);
    } else if !expose.values.is_empty() {
        layer = layer.expose_headers(expose.values);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }
    if let Some(secs) = cors.max_age_secs.filter(|s| *s > 0) {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::{build_cors_layer, parse_list, parse_method};
    use crate::config::CorsConfig;
    use axum::http::Method;

    #[test]
    fn default_config_allows_any_origin() {
        assert!(build_cors_layer(&CorsConfig::default()).is_some());
    }

    #[test]
    fn disabled_or_empty_origins_yield_no_layer() {
        assert!(build_cors_layer(&CorsConfig::disabled()).is_none());
        let cors = CorsConfig {
            allowed_origins: Vec::new(),
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn credentials_with_wildcard_are_rejected() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn method_list_is_case_insensitive() {
        let raw = vec!["get".to_string(), " post ".to_string(), String::new()];
        let parsed = parse_list("allowed_methods", &raw, parse_method);
        assert!(!parsed.any);
        assert_eq!(parsed.values, vec![Method::GET, Method::POST]);
    }
}

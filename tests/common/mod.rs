#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{Request, Response, header},
};
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use photo_stylizer::features::stylize::{BuiltinStylizer, StylizeError, Stylizer};
use photo_stylizer::{AppConfig, AppState, build_app};

pub const BOUNDARY: &str = "stylizer-test-boundary";

/// 统计调用次数的风格化例程，委托给内置滤镜
#[derive(Default)]
pub struct CountingStylizer {
    pub calls: AtomicUsize,
}

impl CountingStylizer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Stylizer for CountingStylizer {
    fn stylize(&self, original: &Path, filter: &str) -> Result<RgbImage, StylizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        BuiltinStylizer.stylize(original, filter)
    }
}

pub struct TestApp {
    pub root: TempDir,
    pub config: AppConfig,
    pub stylizer: Arc<CountingStylizer>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.storage.styles_dir = root.path().join("styles").display().to_string();
        config.storage.photos_dir = root.path().join("photos").display().to_string();
        std::fs::create_dir_all(&config.storage.styles_dir).expect("styles dir");
        std::fs::create_dir_all(&config.storage.photos_dir).expect("photos dir");
        config.image.max_parallel = 2;

        let stylizer = Arc::new(CountingStylizer::default());
        let state = AppState::new(&config, stylizer.clone());
        let router = build_app(state, &config);
        Self {
            root,
            config,
            stylizer,
            router,
        }
    }

    pub fn photo_file(&self, name: &str) -> std::path::PathBuf {
        Path::new(&self.config.storage.photos_dir).join(name)
    }

    pub fn style_file(&self, name: &str) -> std::path::PathBuf {
        Path::new(&self.config.storage.styles_dir).join(name)
    }
}

/// 生成一张带渐变的 PNG
pub fn png_bytes(seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(48, 32, |x, y| {
        Rgb([(x * 5) as u8 ^ seed, (y * 7) as u8, seed.wrapping_mul(3)])
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode png");
    out
}

/// 构造只含一个文件字段的 multipart 请求体
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub async fn body_bytes(resp: Response<Body>) -> Bytes {
    to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("parse json")
}

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        8001
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// 存储目录配置（两个平铺目录，文件系统即唯一数据源）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 风格参考图目录
    #[serde(default = "StorageConfig::default_styles_dir")]
    pub styles_dir: String,
    /// 照片目录（`<hash>.<variant>.jpg`）
    #[serde(default = "StorageConfig::default_photos_dir")]
    pub photos_dir: String,
}

impl StorageConfig {
    fn default_styles_dir() -> String {
        "./fs/styles".to_string()
    }
    fn default_photos_dir() -> String {
        "./fs/photos".to_string()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            styles_dir: Self::default_styles_dir(),
            photos_dir: Self::default_photos_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（RUST_LOG 存在时以 RUST_LOG 为准）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    /// 默认的 EnvFilter 指令
    pub fn filter_directive(&self) -> String {
        format!("photo_stylizer={0},tower_http={0}", self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 路由前缀
    #[serde(default = "ApiConfig::default_prefix")]
    pub prefix: String,
}

impl ApiConfig {
    fn default_prefix() -> String {
        "/api".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
        }
    }
}

/// 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 允许的文件扩展名（区分大小写）
    #[serde(default = "UploadConfig::default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// 请求体上限（字节）
    #[serde(default = "UploadConfig::default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl UploadConfig {
    fn default_allowed_extensions() -> Vec<String> {
        ["jpg", "jpeg", "png"].iter().map(|s| s.to_string()).collect()
    }
    fn default_max_body_bytes() -> usize {
        20 * 1024 * 1024
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: Self::default_allowed_extensions(),
            max_body_bytes: Self::default_max_body_bytes(),
        }
    }
}

/// 图片处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// JPEG 编码质量（1-100）
    #[serde(default = "ImageConfig::default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// 并发处理许可数（0=自动，取 CPU 核心数）
    #[serde(default)]
    pub max_parallel: u32,
}

impl ImageConfig {
    fn default_jpeg_quality() -> u8 {
        90
    }

    /// 实际生效的并发许可数
    pub fn effective_parallelism(&self) -> usize {
        if self.max_parallel == 0 {
            num_cpus::get()
        } else {
            self.max_parallel as usize
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Self::default_jpeg_quality(),
            max_parallel: 0,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default = "CorsConfig::default_enabled")]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意，空表示沿用 tower-http 默认）
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_allowed_headers")]
    pub allowed_headers: Vec<String>,
    /// 暴露的响应头列表
    #[serde(default)]
    pub expose_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    #[serde(default)]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl CorsConfig {
    fn default_enabled() -> bool {
        true
    }
    fn default_allowed_origins() -> Vec<String> {
        vec!["*".to_string()]
    }
    fn default_allowed_headers() -> Vec<String> {
        vec!["content-type".to_string()]
    }

    /// 关闭状态的配置（测试与显式禁用场景使用）
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            allowed_origins: Self::default_allowed_origins(),
            allowed_methods: Vec::new(),
            allowed_headers: Self::default_allowed_headers(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    /// 获取优雅退出超时时间
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// 上传校验配置
    #[serde(default)]
    pub upload: UploadConfig,
    /// 图片处理配置
    #[serde(default)]
    pub image: ImageConfig,
    /// CORS 配置
    #[serde(default)]
    pub cors: CorsConfig,
    /// 优雅退出配置
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    ///
    /// 配置文件可缺省，缺省时全部字段取默认值。
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let builder = ConfigBuilder::builder()
            .add_source(File::from(config_path).required(false))
            // 支持环境变量覆盖，例如：APP_SERVER__PORT=9000
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = builder.try_deserialize()?;

        tracing::debug!(
            "配置加载完成: styles_dir = {}, photos_dir = {}",
            config.storage.styles_dir,
            config.storage.photos_dir
        );

        Ok(config)
    }

    /// 获取全局配置单例
    pub fn global() -> &'static AppConfig {
        CONFIG.get().expect("配置未初始化，请先调用 init_global()")
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<(), ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(())
    }

    /// 获取配置文件路径（`APP_CONFIG` 可覆盖）
    fn get_config_path() -> PathBuf {
        std::env::var("APP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 风格参考图目录
    pub fn styles_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.styles_dir)
    }

    /// 照片目录
    pub fn photos_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.photos_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use config::Config;

    #[test]
    fn empty_source_yields_defaults() {
        let cfg: AppConfig = Config::builder()
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config");
        assert_eq!(cfg.server.port, 8001);
        assert_eq!(cfg.api.prefix, "/api");
        assert_eq!(cfg.storage.photos_dir, "./fs/photos");
        assert_eq!(
            cfg.upload.allowed_extensions,
            vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
        );
        assert!(cfg.cors.enabled);
        assert_eq!(cfg.cors.allowed_origins, vec!["*".to_string()]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: AppConfig = Config::builder()
            .set_override("server.port", 9000)
            .expect("override")
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.image.jpeg_quality, 90);
    }

    #[test]
    fn zero_parallelism_means_cpu_count() {
        let cfg = AppConfig::default();
        assert!(cfg.image.effective_parallelism() >= 1);
    }
}

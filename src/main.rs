use photo_stylizer::startup::run_startup_checks;
use photo_stylizer::{AppConfig, AppState, ShutdownManager, build_app};

#[tokio::main]
async fn main() {
    // 配置加载前日志尚未初始化，加载失败直接输出到 stderr
    if let Err(e) = AppConfig::init_global() {
        eprintln!("Config init failed: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::global();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter_directive().into()),
        )
        .init();

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let state = AppState::with_builtin_stylizer(config);
    if let Err(e) = run_startup_checks(&state.store).await {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }
    tracing::info!(
        "图片处理并发许可: {}",
        state.render_semaphore.available_permits()
    );

    let app = build_app(state, config);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Style API: http://{}{}/style/upload", addr, config.api.prefix);
    tracing::info!("Photo API: http://{}{}/photo", addr, config.api.prefix);
    tracing::info!("Photos: {:?}", config.photos_path());

    let shutdown_timeout = config.shutdown.timeout_duration();
    let signal_manager = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = signal_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    // 退出信号到达后，最多再等待 timeout 让在途请求（含风格化计算）完成
    let forced_exit = async {
        shutdown_manager.wait_for_shutdown().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        res = graceful => {
            if let Err(e) = res {
                tracing::error!("服务器运行错误: {}", e);
                std::process::exit(1);
            }
            tracing::info!("服务器已优雅关闭");
        }
        _ = forced_exit => {
            tracing::warn!("优雅退出超时（{}秒），强制退出", shutdown_timeout.as_secs());
        }
    }
}

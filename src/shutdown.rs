//! 优雅退出管理模块
//!
//! 监听 SIGINT/SIGTERM（Windows 下为 Ctrl+C），通知 HTTP 服务器停止接收新连接。

use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::{debug, info};

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
    /// 应用请求退出
    Application,
}

/// 优雅退出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(String),
}

/// 优雅退出管理器
#[derive(Debug, Clone, Default)]
pub struct ShutdownManager {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug, Default)]
struct ShutdownInner {
    notify: Notify,
    /// 首次触发的退出原因；Some 即表示已进入退出流程
    reason: Mutex<Option<ShutdownReason>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发优雅退出，只有第一次生效
    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        let Ok(mut guard) = self.inner.reason.lock() else {
            return;
        };
        if guard.is_some() {
            debug!("重复的退出信号被忽略: {:?}", reason);
            return;
        }
        info!("触发优雅退出: {:?}", reason);
        *guard = Some(reason);
        drop(guard);
        self.inner.notify.notify_waiters();
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.inner.reason.lock().ok().and_then(|g| *g)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.reason().is_some()
    }

    /// 等待退出信号并返回原因
    pub async fn wait_for_shutdown(&self) -> ShutdownReason {
        loop {
            // 先注册再检查，避免 trigger 落在检查与等待之间
            let notified = self.inner.notify.notified();
            if let Some(reason) = self.reason() {
                return reason;
            }
            notified.await;
        }
    }

    /// 启动信号处理任务
    pub fn start_signal_handler(&self) -> Result<(), ShutdownError> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigint = signal(SignalKind::interrupt())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
            let mut sigterm = signal(SignalKind::terminate())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
            let manager = self.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigint.recv() => manager.trigger_shutdown(ShutdownReason::Interrupt),
                    _ = sigterm.recv() => manager.trigger_shutdown(ShutdownReason::Terminate),
                }
            });
        }

        #[cfg(not(unix))]
        {
            let manager = self.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("监听Ctrl+C信号失败: {}", e);
                    return;
                }
                manager.trigger_shutdown(ShutdownReason::Interrupt);
            });
        }

        info!("信号处理器已启动");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn first_trigger_wins() {
        let manager = ShutdownManager::new();
        assert!(!manager.is_shutting_down());

        manager.trigger_shutdown(ShutdownReason::Interrupt);
        manager.trigger_shutdown(ShutdownReason::Terminate);

        assert_eq!(manager.wait_for_shutdown().await, ShutdownReason::Interrupt);
    }

    #[tokio::test]
    async fn waiter_is_woken_by_later_trigger() {
        let manager = ShutdownManager::new();
        let waiter = {
            let m = manager.clone();
            tokio::spawn(async move { m.wait_for_shutdown().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.trigger_shutdown(ShutdownReason::Application);

        let reason = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter timed out")
            .expect("join waiter");
        assert_eq!(reason, ShutdownReason::Application);
    }
}

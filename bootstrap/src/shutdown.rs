//! Graceful Shutdown
//!
//! 后台任务通过 `ShutdownSignal` 感知服务关闭。

use tokio::sync::watch;
use tracing::info;

/// Shutdown 控制器
#[derive(Clone)]
pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        info!("Triggering shutdown");
        self.sender.send_replace(true);
    }

    /// 订阅关闭信号
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// 关闭信号
///
/// 在订阅之前已触发的关闭同样可见。
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// 是否已触发关闭
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }

    /// 等待关闭
    pub async fn wait(&mut self) {
        // 发送端被丢弃同样视为关闭
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_subscriber_sees_shutdown() {
        let controller = ShutdownController::new();
        let mut signal = controller.subscribe();
        assert!(!signal.is_shutdown());

        let handle = tokio::spawn(async move {
            signal.wait().await;
        });

        controller.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_shutdown() {
        let controller = ShutdownController::new();
        controller.shutdown();

        let mut signal = controller.subscribe();
        assert!(signal.is_shutdown());
        signal.wait().await;
    }
}

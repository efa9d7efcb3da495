use std::sync::Arc;

use tokio::sync::watch;

/// 取消信号
///
/// 可以克隆后在多个挂起点共享，一旦取消不可恢复
#[derive(Clone, Debug)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// 等待取消发生
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // 发送端由自身持有，不会提前关闭
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

//! 取消令牌
//!
//! 阻塞例程每个控制周期检查一次令牌；其他线程（例如信号处理）调用
//! [`CancelToken::cancel`] 后，例程发送停止指令并返回 `ControlError::Cancelled`。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 取消令牌（克隆的实例共享同一标志）
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// 清除取消标志，以便复用
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}

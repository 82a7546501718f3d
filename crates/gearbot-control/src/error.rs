//! 控制层错误类型定义

use gearbot_driver::DriverError;
use thiserror::Error;

/// 控制层错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    /// 驱动错误（指令发送或遥测读取失败）
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 例程在超时前未满足终止条件
    #[error("{routine} timed out after {elapsed_ms}ms")]
    Timeout {
        routine: &'static str,
        elapsed_ms: u64,
    },

    /// 例程被取消
    #[error("{routine} was cancelled")]
    Cancelled { routine: &'static str },

    /// 参数不合法
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// 对已结束的例程继续调用 tick
    #[error("{routine} has already finished")]
    AlreadyFinished { routine: &'static str },
}

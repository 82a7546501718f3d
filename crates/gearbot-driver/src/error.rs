//! 驱动层错误类型定义

use gearbot_bus::BusError;
use gearbot_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 总线错误
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 驱动不支持该指令类型（如 C610 只支持电流模式）
    #[error("{driver} does not support {command} commands")]
    UnsupportedCommand {
        driver: &'static str,
        command: &'static str,
    },

    /// 尚未收到任何反馈帧
    #[error("No feedback received yet")]
    NoFeedback,

    /// 设备 ID 不匹配
    #[error("Device 0x{address:02X} reported id 0x{found:02X}, expected 0x{expected:02X}")]
    DeviceIdMismatch { address: u8, expected: u8, found: u8 },

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,
}

//! # Gearbot Protocol
//!
//! 执行器总线协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: CAN ID 常量定义
//! - `feedback`: C610 反馈帧解析（[`RawFeedback`]）
//! - `control`: 运动指令（[`MotionCommand`]）与 C610 电流指令帧构建
//! - `config`: 编码器/电机标定数据
//! - `adxl`: ADXL 加速度计寄存器表
//!
//! ## 字节序
//!
//! C610 协议使用 Motorola (MSB) 高位在前（大端字节序）；
//! ADXL 数据寄存器为低位在前（小端）。

pub mod adxl;
pub mod config;
pub mod control;
pub mod feedback;
pub mod ids;

// 重新导出常用类型
pub use adxl::*;
pub use config::*;
pub use control::*;
pub use feedback::*;
pub use ids::*;

/// CAN 2.0 标准帧的统一抽象
///
/// `BusFrame` 是协议层和总线层之间的中间抽象：
/// - 协议层通过 `TryFrom<BusFrame>` 解析、`BusFrame::new_standard()` 构建
/// - 总线层（`gearbot-bus`）通过 `CanAdapter` trait 收发
///
/// ```text
/// Protocol Layer (gearbot-protocol)
///     ↓ TryFrom<BusFrame> / new_standard()
/// BusFrame (此类型)
///     ↓
/// Bus Layer (gearbot-bus)
/// ```
///
/// # 转换示例
///
/// ```rust
/// use gearbot_protocol::BusFrame;
///
/// let frame = BusFrame::new_standard(0x201, &[0x1F, 0xFF, 0x00, 0x10]);
/// assert_eq!(frame.id(), 0x201);
/// assert_eq!(frame.data_slice(), &[0x1F, 0xFF, 0x00, 0x10]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusFrame {
    /// CAN ID（标准帧或扩展帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID）
    pub is_extended: bool,
}

impl BusFrame {
    /// 创建标准帧
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::new(u32::from(id), data, false)
    }

    /// 创建扩展帧
    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::new(id, data, true)
    }

    fn new(id: u32, data: &[u8], is_extended: bool) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
            is_extended,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..usize::from(self.len).min(8)]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }
}

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },

    #[error("Invalid motor id: {0} (expected 1..=8)")]
    InvalidMotorId(u8),
}

/// 大端字节序转 u16
pub fn bytes_to_u16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// 大端字节序转 i16
pub fn bytes_to_i16_be(bytes: [u8; 2]) -> i16 {
    i16::from_be_bytes(bytes)
}

/// i16 转大端字节序
pub fn i16_to_bytes_be(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

/// 小端字节序转 i16（ADXL 数据寄存器）
pub fn bytes_to_i16_le(bytes: [u8; 2]) -> i16 {
    i16::from_le_bytes(bytes)
}

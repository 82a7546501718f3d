//! C610 反馈帧解析
//!
//! 帧格式（8 字节，大端）：
//!
//! | 字节 | 内容 | 类型 |
//! |------|------|------|
//! | 0-1 | 转子机械角度（0..8191 计数） | u16 |
//! | 2-3 | 转子转速（RPM） | i16 |
//! | 4-5 | 实际转矩电流（mA） | i16 |
//! | 6-7 | 保留 | - |

use crate::ids::motor_id_from_feedback;
use crate::{BusFrame, ProtocolError, bytes_to_i16_be, bytes_to_u16_be};

/// 一帧原始反馈
///
/// 由总线层每帧产生一次，只被估计器消费一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFeedback {
    /// 单圈编码器计数，范围 [0, counts_per_revolution)
    pub counts: u16,
    /// 原始转速（转子 RPM）
    pub raw_velocity: i16,
    /// 原始电流（mA）
    pub raw_current: i16,
}

impl RawFeedback {
    pub fn new(counts: u16, raw_velocity: i16, raw_current: i16) -> Self {
        Self {
            counts,
            raw_velocity,
            raw_current,
        }
    }
}

/// 带电机编号的反馈帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C610Feedback {
    pub motor_id: u8,
    pub feedback: RawFeedback,
}

impl TryFrom<BusFrame> for C610Feedback {
    type Error = ProtocolError;

    fn try_from(frame: BusFrame) -> Result<Self, Self::Error> {
        if frame.is_extended {
            return Err(ProtocolError::InvalidCanId { id: frame.id });
        }
        let motor_id = motor_id_from_feedback(frame.id)?;

        if frame.len < 6 {
            return Err(ProtocolError::InvalidLength {
                expected: 6,
                actual: usize::from(frame.len),
            });
        }

        Ok(Self {
            motor_id,
            feedback: RawFeedback {
                counts: bytes_to_u16_be([frame.data[0], frame.data[1]]),
                raw_velocity: bytes_to_i16_be([frame.data[2], frame.data[3]]),
                raw_current: bytes_to_i16_be([frame.data[4], frame.data[5]]),
            },
        })
    }
}

impl TryFrom<BusFrame> for RawFeedback {
    type Error = ProtocolError;

    fn try_from(frame: BusFrame) -> Result<Self, Self::Error> {
        C610Feedback::try_from(frame).map(|f| f.feedback)
    }
}

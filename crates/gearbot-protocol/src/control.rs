//! 控制指令
//!
//! - [`MotionCommand`]：发往执行器驱动的抽象运动指令（位置/速度/电流/停止）
//! - [`C610CurrentCommand`]：C610 电调的分组电流指令帧

use crate::ids::command_slot;
use crate::{BusFrame, ProtocolError, i16_to_bytes_be};

/// 运动指令
///
/// 发送给外部执行器驱动；执行器是唯一的执行者，调用方不能假设指令在下一次
/// 遥测读取前已经生效。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionCommand {
    /// 位置指令（rad）；`velocity_limit` 为 `None` 时使用驱动默认值
    Position {
        target: f64,
        velocity_limit: Option<f64>,
    },
    /// 速度指令（rad/s），不约束目标位置
    Velocity {
        target: f64,
        velocity_limit: Option<f64>,
    },
    /// 电流指令（A），d 轴与 q 轴
    Current { d_axis: f64, q_axis: f64 },
    /// 停止
    Stop,
}

impl MotionCommand {
    /// 指令名称（用于日志）
    pub fn kind(&self) -> &'static str {
        match self {
            MotionCommand::Position { .. } => "position",
            MotionCommand::Velocity { .. } => "velocity",
            MotionCommand::Current { .. } => "current",
            MotionCommand::Stop => "stop",
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, MotionCommand::Stop)
    }
}

/// C610 电流指令上限（mA）
pub const C610_MAX_CURRENT_MA: i16 = 10_000;

/// C610 分组电流指令（每帧 4 个电机槽位，大端 i16，单位 mA）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct C610CurrentCommand {
    /// 指令帧 ID（0x200 或 0x1FF）
    pub group_id: u16,
    /// 4 个槽位的电流（mA）
    pub currents_ma: [i16; 4],
}

impl C610CurrentCommand {
    /// 创建空的分组指令
    pub fn new(group_id: u16) -> Self {
        Self {
            group_id,
            currents_ma: [0; 4],
        }
    }

    /// 为单个电机构建指令（其余槽位为 0）
    pub fn for_motor(motor_id: u8, current_ma: i16) -> Result<Self, ProtocolError> {
        let (group_id, slot) = command_slot(motor_id)?;
        let mut cmd = Self::new(group_id);
        cmd.currents_ma[slot] = clamp_current_ma(current_ma);
        Ok(cmd)
    }

    /// 设置某个电机的电流（自动限幅）
    pub fn set_motor(&mut self, motor_id: u8, current_ma: i16) -> Result<(), ProtocolError> {
        let (group_id, slot) = command_slot(motor_id)?;
        if group_id != self.group_id {
            return Err(ProtocolError::InvalidMotorId(motor_id));
        }
        self.currents_ma[slot] = clamp_current_ma(current_ma);
        Ok(())
    }

    /// 编码为 CAN 帧
    pub fn to_frame(&self) -> BusFrame {
        let mut data = [0u8; 8];
        for (chunk, current) in data.chunks_exact_mut(2).zip(self.currents_ma.iter()) {
            chunk.copy_from_slice(&i16_to_bytes_be(*current));
        }
        BusFrame::new_standard(self.group_id, &data)
    }
}

fn clamp_current_ma(current_ma: i16) -> i16 {
    current_ma.clamp(-C610_MAX_CURRENT_MA, C610_MAX_CURRENT_MA)
}

/// 安培转 C610 指令电流（mA，饱和到 ±10000）
pub fn amps_to_command_ma(amps: f64, milliamp_per_amp: f64) -> i16 {
    let ma = (amps * milliamp_per_amp).round();
    if ma.is_nan() {
        return 0;
    }
    ma.clamp(
        f64::from(-C610_MAX_CURRENT_MA),
        f64::from(C610_MAX_CURRENT_MA),
    ) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_low_group() {
        let cmd = C610CurrentCommand::for_motor(2, 1000).unwrap();
        let frame = cmd.to_frame();
        assert_eq!(frame.id, 0x200);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.data, [0, 0, 0x03, 0xE8, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_high_group_negative() {
        let cmd = C610CurrentCommand::for_motor(8, -2).unwrap();
        let frame = cmd.to_frame();
        assert_eq!(frame.id, 0x1FF);
        assert_eq!(&frame.data[6..8], &[0xFF, 0xFE]);
    }

    #[test]
    fn test_current_is_clamped() {
        let cmd = C610CurrentCommand::for_motor(1, 20_000).unwrap();
        assert_eq!(cmd.currents_ma[0], 10_000);
        let cmd = C610CurrentCommand::for_motor(1, i16::MIN).unwrap();
        assert_eq!(cmd.currents_ma[0], -10_000);
    }

    #[test]
    fn test_set_motor_rejects_other_group() {
        let mut cmd = C610CurrentCommand::new(0x200);
        assert!(cmd.set_motor(3, 5).is_ok());
        assert_eq!(cmd.set_motor(6, 5), Err(ProtocolError::InvalidMotorId(6)));
    }

    #[test]
    fn test_amps_to_command_ma() {
        assert_eq!(amps_to_command_ma(1.5, 1000.0), 1500);
        assert_eq!(amps_to_command_ma(-50.0, 1000.0), -10_000);
        assert_eq!(amps_to_command_ma(f64::NAN, 1000.0), 0);
    }

    #[test]
    fn test_command_kind() {
        assert_eq!(MotionCommand::Stop.kind(), "stop");
        assert!(MotionCommand::Stop.is_stop());
        let cmd = MotionCommand::Velocity {
            target: 1.0,
            velocity_limit: Some(2.0),
        };
        assert_eq!(cmd.kind(), "velocity");
        assert!(!cmd.is_stop());
    }
}

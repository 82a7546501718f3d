//! CAN ID 常量定义
//!
//! C610 电调：
//! - 反馈帧 `0x200 + motor_id`（motor_id 为 1..=8）
//! - 电流指令帧按组发送：电机 1-4 使用 `0x200`，电机 5-8 使用 `0x1FF`

use crate::ProtocolError;

/// 反馈帧基地址（实际 ID = 基地址 + 电机编号）
pub const ID_C610_FEEDBACK_BASE: u32 = 0x200;

/// 电机 1-4 电流指令帧
pub const ID_C610_COMMAND_LOW: u16 = 0x200;

/// 电机 5-8 电流指令帧
pub const ID_C610_COMMAND_HIGH: u16 = 0x1FF;

/// 单条总线上最多挂载的电调数量
pub const C610_MAX_MOTORS: u8 = 8;

/// 校验电机编号（1..=8）
pub fn validate_motor_id(motor_id: u8) -> Result<u8, ProtocolError> {
    if (1..=C610_MAX_MOTORS).contains(&motor_id) {
        Ok(motor_id)
    } else {
        Err(ProtocolError::InvalidMotorId(motor_id))
    }
}

/// 电机编号对应的反馈帧 ID
pub fn feedback_id(motor_id: u8) -> Result<u32, ProtocolError> {
    let motor_id = validate_motor_id(motor_id)?;
    Ok(ID_C610_FEEDBACK_BASE + u32::from(motor_id))
}

/// 从反馈帧 ID 解析电机编号
pub fn motor_id_from_feedback(id: u32) -> Result<u8, ProtocolError> {
    let offset = id
        .checked_sub(ID_C610_FEEDBACK_BASE)
        .ok_or(ProtocolError::InvalidCanId { id })?;
    match u8::try_from(offset) {
        Ok(motor_id) if (1..=C610_MAX_MOTORS).contains(&motor_id) => Ok(motor_id),
        _ => Err(ProtocolError::InvalidCanId { id }),
    }
}

/// 电机编号对应的指令帧 ID 与帧内槽位（0..4）
pub fn command_slot(motor_id: u8) -> Result<(u16, usize), ProtocolError> {
    let motor_id = validate_motor_id(motor_id)?;
    if motor_id <= 4 {
        Ok((ID_C610_COMMAND_LOW, usize::from(motor_id - 1)))
    } else {
        Ok((ID_C610_COMMAND_HIGH, usize::from(motor_id - 5)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_id_roundtrip() {
        for motor_id in 1..=8 {
            let id = feedback_id(motor_id).unwrap();
            assert_eq!(motor_id_from_feedback(id).unwrap(), motor_id);
        }
    }

    #[test]
    fn test_invalid_motor_ids() {
        assert_eq!(validate_motor_id(0), Err(ProtocolError::InvalidMotorId(0)));
        assert_eq!(validate_motor_id(9), Err(ProtocolError::InvalidMotorId(9)));
        assert!(motor_id_from_feedback(0x200).is_err());
        assert!(motor_id_from_feedback(0x209).is_err());
        assert!(motor_id_from_feedback(0x100).is_err());
    }

    #[test]
    fn test_command_slot() {
        assert_eq!(command_slot(1).unwrap(), (0x200, 0));
        assert_eq!(command_slot(4).unwrap(), (0x200, 3));
        assert_eq!(command_slot(5).unwrap(), (0x1FF, 0));
        assert_eq!(command_slot(8).unwrap(), (0x1FF, 3));
    }
}

use gearbot_driver::Telemetry;
use gearbot_protocol::MotionCommand;
use std::time::Duration;

use crate::error::ControlError;
use crate::routine::{MotionRoutine, Verdict};

/// 阻塞式位置运动：位置误差小于容差（绝对值，rad）时结束
#[derive(Debug, Clone, PartialEq)]
pub struct MoveToPosition {
    target: f64,
    velocity_limit: f64,
    tolerance: f64,
}

impl MoveToPosition {
    pub fn new(target: f64, velocity: f64, tolerance: f64) -> Result<Self, ControlError> {
        if !target.is_finite() {
            return Err(ControlError::InvalidParameter(format!(
                "target position must be finite, got {target}"
            )));
        }
        if !(velocity.is_finite() && velocity != 0.0) {
            return Err(ControlError::InvalidParameter(format!(
                "move velocity must be finite and non-zero, got {velocity}"
            )));
        }
        if !(tolerance > 0.0) {
            return Err(ControlError::InvalidParameter(format!(
                "position tolerance must be positive, got {tolerance}"
            )));
        }
        Ok(Self {
            target,
            velocity_limit: velocity.abs(),
            tolerance,
        })
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn reached(&self, position: f64) -> bool {
        (position - self.target).abs() < self.tolerance
    }
}

impl MotionRoutine for MoveToPosition {
    /// 结束时的位置误差（rad）
    type Output = f64;

    fn name(&self) -> &'static str {
        "move_to_position"
    }

    fn command(&self) -> MotionCommand {
        MotionCommand::Position {
            target: self.target,
            velocity_limit: Some(self.velocity_limit),
        }
    }

    fn evaluate(&mut self, telemetry: &Telemetry, _stage_elapsed: Duration) -> Verdict<f64> {
        if self.reached(telemetry.position) {
            Verdict::Finished {
                success: true,
                value: telemetry.position - self.target,
            }
        } else {
            Verdict::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_is_strict() {
        let routine = MoveToPosition::new(1.0, 2.0, 0.1).unwrap();
        assert!(routine.reached(1.05));
        assert!(routine.reached(0.95));
        assert!(!routine.reached(1.2));
        assert!(!routine.reached(0.8));
    }

    #[test]
    fn test_command_uses_speed_as_limit() {
        let routine = MoveToPosition::new(-0.4, -2.0, 0.1).unwrap();
        assert_eq!(
            routine.command(),
            MotionCommand::Position {
                target: -0.4,
                velocity_limit: Some(2.0)
            }
        );
        assert!(MoveToPosition::new(f64::NAN, 1.0, 0.1).is_err());
        assert!(MoveToPosition::new(0.0, 0.0, 0.1).is_err());
    }
}

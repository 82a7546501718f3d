//! 寻找机械限位
//!
//! 以恒定速度运动，把电流超过阈值视为撞上硬限位。加速阶段的电流尖峰同样会超过阈值，
//! 所以在起动保护时间内不做判定。

use gearbot_driver::Telemetry;
use gearbot_protocol::MotionCommand;
use gearbot_tools::RunToEndSettings;
use std::time::Duration;

use crate::error::ControlError;
use crate::routine::{MotionRoutine, Verdict};

/// 寻找限位
#[derive(Debug, Clone, PartialEq)]
pub struct RunToEnd {
    velocity: f64,
    current_threshold: f64,
    startup_guard: Duration,
    velocity_limit: f64,
}

impl RunToEnd {
    /// 创建例程
    ///
    /// `velocity` 的符号决定方向；速度限制为 `|velocity| × velocity_limit_factor`。
    pub fn new(
        velocity: f64,
        current_threshold: f64,
        settings: &RunToEndSettings,
    ) -> Result<Self, ControlError> {
        if !velocity.is_finite() || velocity == 0.0 {
            return Err(ControlError::InvalidParameter(format!(
                "run_to_end velocity must be finite and non-zero, got {velocity}"
            )));
        }
        if !(current_threshold.is_finite() && current_threshold > 0.0) {
            return Err(ControlError::InvalidParameter(format!(
                "run_to_end current threshold must be positive, got {current_threshold}"
            )));
        }
        Ok(Self {
            velocity,
            current_threshold,
            startup_guard: settings.startup_guard(),
            velocity_limit: velocity.abs() * settings.velocity_limit_factor,
        })
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn current_threshold(&self) -> f64 {
        self.current_threshold
    }

    /// 是否到达限位
    pub fn at_end_stop(&self, telemetry: &Telemetry, elapsed: Duration) -> bool {
        telemetry.q_current.abs() > self.current_threshold && elapsed > self.startup_guard
    }
}

impl MotionRoutine for RunToEnd {
    /// 停止时的遥测
    type Output = Telemetry;

    fn name(&self) -> &'static str {
        "run_to_end"
    }

    fn command(&self) -> MotionCommand {
        MotionCommand::Velocity {
            target: self.velocity,
            velocity_limit: Some(self.velocity_limit),
        }
    }

    fn evaluate(&mut self, telemetry: &Telemetry, stage_elapsed: Duration) -> Verdict<Telemetry> {
        if self.at_end_stop(telemetry, stage_elapsed) {
            Verdict::Finished {
                success: true,
                value: *telemetry,
            }
        } else {
            Verdict::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telemetry(q_current: f64) -> Telemetry {
        Telemetry {
            q_current,
            ..Telemetry::default()
        }
    }

    #[test]
    fn test_command_uses_doubled_velocity_limit() {
        let routine = RunToEnd::new(-3.0, 1.0, &RunToEndSettings::default()).unwrap();
        assert_eq!(
            routine.command(),
            MotionCommand::Velocity {
                target: -3.0,
                velocity_limit: Some(6.0)
            }
        );
    }

    #[test]
    fn test_guard_suppresses_early_spike() {
        let mut routine = RunToEnd::new(1.0, 1.0, &RunToEndSettings::default()).unwrap();
        let spike = telemetry(-5.0);
        assert_eq!(
            routine.evaluate(&spike, Duration::from_millis(50)),
            Verdict::Continue
        );
        assert_eq!(
            routine.evaluate(&spike, Duration::from_millis(500)),
            Verdict::Continue
        );
        assert!(matches!(
            routine.evaluate(&spike, Duration::from_millis(501)),
            Verdict::Finished { success: true, .. }
        ));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut routine = RunToEnd::new(1.0, 1.0, &RunToEndSettings::default()).unwrap();
        assert_eq!(
            routine.evaluate(&telemetry(1.0), Duration::from_secs(1)),
            Verdict::Continue
        );
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let settings = RunToEndSettings::default();
        assert!(RunToEnd::new(0.0, 1.0, &settings).is_err());
        assert!(RunToEnd::new(f64::NAN, 1.0, &settings).is_err());
        assert!(RunToEnd::new(1.0, 0.0, &settings).is_err());
    }
}

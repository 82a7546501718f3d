//! 离合器打滑测试
//!
//! 在 d/q 两轴同时施加恒定电流一段时间，比较起止位置。
//! 位移阈值和判据方向都没有可靠的默认值，必须由调用方给出 [`ClutchCriterion`]。

use gearbot_driver::Telemetry;
use gearbot_protocol::MotionCommand;
use gearbot_tools::{ClutchSettings, SlipPolarity};
use std::time::Duration;

use crate::error::ControlError;
use crate::routine::{MotionRoutine, Verdict};

/// 离合器测试判据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClutchCriterion {
    /// 位移阈值（rad）
    pub slip_threshold: f64,
    pub polarity: SlipPolarity,
}

impl ClutchCriterion {
    pub fn new(slip_threshold: f64, polarity: SlipPolarity) -> Result<Self, ControlError> {
        if !(slip_threshold.is_finite() && slip_threshold >= 0.0) {
            return Err(ControlError::InvalidParameter(format!(
                "clutch slip threshold must be a non-negative number, got {slip_threshold}"
            )));
        }
        Ok(Self {
            slip_threshold,
            polarity,
        })
    }

    /// 从配置读取；阈值或方向缺失时报错
    pub fn from_settings(settings: &ClutchSettings) -> Result<Self, ControlError> {
        match (settings.slip_threshold, settings.pass_when) {
            (Some(threshold), Some(polarity)) => Self::new(threshold, polarity),
            _ => Err(ControlError::InvalidParameter(
                "clutch test needs both slip_threshold and pass_when".to_string(),
            )),
        }
    }

    pub fn passes(&self, slip_distance: f64) -> bool {
        self.polarity.passes(slip_distance, self.slip_threshold)
    }
}

/// 离合器测试
#[derive(Debug, Clone, PartialEq)]
pub struct ClutchTest {
    max_current: f64,
    duration: Duration,
    criterion: ClutchCriterion,
    start_position: Option<f64>,
}

impl ClutchTest {
    pub fn new(
        max_current: f64,
        duration: Duration,
        criterion: ClutchCriterion,
    ) -> Result<Self, ControlError> {
        if !max_current.is_finite() {
            return Err(ControlError::InvalidParameter(format!(
                "clutch test current must be finite, got {max_current}"
            )));
        }
        Ok(Self {
            max_current,
            duration,
            criterion,
            start_position: None,
        })
    }

    pub fn start_position(&self) -> Option<f64> {
        self.start_position
    }
}

impl MotionRoutine for ClutchTest {
    /// 有符号位移：结束位置 − 起始位置（rad）
    type Output = f64;

    fn name(&self) -> &'static str {
        "test_clutch"
    }

    fn command(&self) -> MotionCommand {
        MotionCommand::Current {
            d_axis: self.max_current,
            q_axis: self.max_current,
        }
    }

    fn start(&mut self, telemetry: &Telemetry) {
        self.start_position = Some(telemetry.position);
    }

    fn evaluate(&mut self, telemetry: &Telemetry, stage_elapsed: Duration) -> Verdict<f64> {
        if stage_elapsed < self.duration {
            return Verdict::Continue;
        }
        let start = *self.start_position.get_or_insert(telemetry.position);
        let slip = telemetry.position - start;
        Verdict::Finished {
            success: self.criterion.passes(slip),
            value: slip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(position: f64) -> Telemetry {
        Telemetry {
            position,
            ..Telemetry::default()
        }
    }

    fn criterion(polarity: SlipPolarity) -> ClutchCriterion {
        ClutchCriterion::new(0.05, polarity).unwrap()
    }

    #[test]
    fn test_command_sets_both_axes() {
        let routine = ClutchTest::new(
            1.5,
            Duration::from_secs(3),
            criterion(SlipPolarity::PassWhenBelow),
        )
        .unwrap();
        assert_eq!(
            routine.command(),
            MotionCommand::Current {
                d_axis: 1.5,
                q_axis: 1.5
            }
        );
    }

    #[test]
    fn test_polarity_decides_verdict() {
        for (polarity, expected) in [
            (SlipPolarity::PassWhenBelow, false),
            (SlipPolarity::PassWhenAbove, true),
        ] {
            let mut routine =
                ClutchTest::new(1.0, Duration::from_secs(3), criterion(polarity)).unwrap();
            routine.start(&at(0.2));
            assert_eq!(
                routine.evaluate(&at(0.1), Duration::from_millis(2950)),
                Verdict::Continue
            );
            match routine.evaluate(&at(0.1), Duration::from_secs(3)) {
                Verdict::Finished { success, value } => {
                    assert_eq!(success, expected);
                    assert!((value + 0.1).abs() < 1e-12);
                },
                other => panic!("unexpected verdict {:?}", other),
            }
        }
    }

    #[test]
    fn test_criterion_requires_both_settings() {
        let mut settings = ClutchSettings::default();
        assert!(ClutchCriterion::from_settings(&settings).is_err());
        settings.slip_threshold = Some(0.05);
        assert!(ClutchCriterion::from_settings(&settings).is_err());
        settings.pass_when = Some(SlipPolarity::PassWhenBelow);
        assert_eq!(
            ClutchCriterion::from_settings(&settings).unwrap(),
            criterion(SlipPolarity::PassWhenBelow)
        );
        assert!(ClutchCriterion::new(-1.0, SlipPolarity::PassWhenBelow).is_err());
    }
}

//! 运动阻力测量
//!
//! 先用固定参数寻找限位，再以给定速度扫描，每个控制周期记录一组（时间, 电流, 位置）
//! 采样，直到电流幅值达到阈值。阈值电流就是沿程最大阻力对应的电流。
//!
//! 采样缓冲可以设上限；达到上限后丢弃最早的采样，保留阈值附近的数据。

use gearbot_driver::Telemetry;
use gearbot_protocol::MotionCommand;
use gearbot_tools::{ResistanceSettings, RunToEndSettings};
use std::collections::VecDeque;
use std::time::Duration;

use crate::error::ControlError;
use crate::routine::{MotionRoutine, Verdict};
use crate::routines::RunToEnd;

/// 预留的采样容量（50ms 周期下约 10 秒）
const INITIAL_SAMPLE_CAPACITY: usize = 200;

/// 扫描采样
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistanceSample {
    /// 扫描阶段开始以来的时间
    pub elapsed: Duration,
    /// q 轴电流（A）
    pub current: f64,
    /// 位置（rad）
    pub position: f64,
}

/// 阻力测量结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResistanceReport {
    /// 越过阈值时的电流（A）
    pub threshold_current: f64,
    /// 越过阈值时的位置（rad）
    pub threshold_position: f64,
    pub samples: Vec<ResistanceSample>,
    /// 因缓冲上限丢弃的采样数
    pub dropped_samples: usize,
}

/// 运动阻力测量
#[derive(Debug, Clone, PartialEq)]
pub struct MovingResistance {
    probe: RunToEnd,
    probing: bool,
    velocity: f64,
    threshold_current: f64,
    samples: VecDeque<ResistanceSample>,
    max_samples: Option<usize>,
    dropped_samples: usize,
}

impl MovingResistance {
    pub fn new(
        velocity: f64,
        settings: &ResistanceSettings,
        run_to_end: &RunToEndSettings,
    ) -> Result<Self, ControlError> {
        if !(velocity.is_finite() && velocity != 0.0) {
            return Err(ControlError::InvalidParameter(format!(
                "sweep velocity must be finite and non-zero, got {velocity}"
            )));
        }
        if !(settings.threshold_current > 0.0) {
            return Err(ControlError::InvalidParameter(format!(
                "resistance threshold must be positive, got {}",
                settings.threshold_current
            )));
        }
        if settings.max_samples == Some(0) {
            return Err(ControlError::InvalidParameter(
                "max_samples must be > 0".to_string(),
            ));
        }
        let probe = RunToEnd::new(settings.probe_velocity, settings.probe_current, run_to_end)?;
        let capacity = settings
            .max_samples
            .map_or(INITIAL_SAMPLE_CAPACITY, |max| max.min(INITIAL_SAMPLE_CAPACITY));
        Ok(Self {
            probe,
            probing: true,
            velocity,
            threshold_current: settings.threshold_current,
            samples: VecDeque::with_capacity(capacity),
            max_samples: settings.max_samples,
            dropped_samples: 0,
        })
    }

    /// 已记录的扫描采样
    pub fn samples(&self) -> impl Iterator<Item = &ResistanceSample> {
        self.samples.iter()
    }

    pub fn is_probing(&self) -> bool {
        self.probing
    }

    fn record(&mut self, sample: ResistanceSample) {
        if let Some(max) = self.max_samples {
            while self.samples.len() >= max {
                self.samples.pop_front();
                self.dropped_samples += 1;
            }
        }
        self.samples.push_back(sample);
    }
}

impl MotionRoutine for MovingResistance {
    type Output = ResistanceReport;

    fn name(&self) -> &'static str {
        "measure_moving_resistance"
    }

    fn command(&self) -> MotionCommand {
        if self.probing {
            self.probe.command()
        } else {
            MotionCommand::Velocity {
                target: self.velocity,
                velocity_limit: None,
            }
        }
    }

    fn evaluate(
        &mut self,
        telemetry: &Telemetry,
        stage_elapsed: Duration,
    ) -> Verdict<ResistanceReport> {
        if self.probing {
            return match self.probe.evaluate(telemetry, stage_elapsed) {
                Verdict::Finished { .. } => {
                    self.probing = false;
                    Verdict::NextStage
                },
                _ => Verdict::Continue,
            };
        }

        self.record(ResistanceSample {
            elapsed: stage_elapsed,
            current: telemetry.q_current,
            position: telemetry.position,
        });

        if telemetry.q_current.abs() < self.threshold_current {
            return Verdict::Continue;
        }
        Verdict::Finished {
            success: true,
            value: ResistanceReport {
                threshold_current: telemetry.q_current,
                threshold_position: telemetry.position,
                samples: Vec::from(std::mem::take(&mut self.samples)),
                dropped_samples: self.dropped_samples,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(position: f64, q_current: f64) -> Telemetry {
        Telemetry {
            position,
            q_current,
            ..Telemetry::default()
        }
    }

    fn routine(max_samples: Option<usize>) -> MovingResistance {
        let settings = ResistanceSettings {
            max_samples,
            ..ResistanceSettings::default()
        };
        MovingResistance::new(-1.0, &settings, &RunToEndSettings::default()).unwrap()
    }

    #[test]
    fn test_probe_then_sweep() {
        let mut routine = routine(None);
        assert!(matches!(
            routine.command(),
            MotionCommand::Velocity { target, velocity_limit: Some(_) } if target == 5.0
        ));

        let late = Duration::from_secs(1);
        assert_eq!(routine.evaluate(&reading(1.0, 2.0), late), Verdict::NextStage);
        assert!(!routine.is_probing());
        assert_eq!(
            routine.command(),
            MotionCommand::Velocity {
                target: -1.0,
                velocity_limit: None
            }
        );

        let ms = Duration::from_millis;
        assert_eq!(routine.evaluate(&reading(0.9, -0.2), ms(50)), Verdict::Continue);
        assert_eq!(routine.evaluate(&reading(0.8, -0.3), ms(100)), Verdict::Continue);
        match routine.evaluate(&reading(0.7, -0.5), ms(150)) {
            Verdict::Finished { success, value } => {
                assert!(success);
                assert_eq!(value.threshold_current, -0.5);
                assert_eq!(value.threshold_position, 0.7);
                assert_eq!(value.samples.len(), 3);
                assert_eq!(value.samples[0].elapsed, ms(50));
                assert_eq!(value.dropped_samples, 0);
            },
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_sample_cap_keeps_latest() {
        let mut routine = routine(Some(2));
        routine.evaluate(&reading(1.0, 2.0), Duration::from_secs(1));
        for i in 0..5 {
            routine.evaluate(&reading(f64::from(i), 0.1), Duration::from_millis(50 * i as u64));
        }
        let positions: Vec<f64> = routine.samples().map(|s| s.position).collect();
        assert_eq!(positions, vec![3.0, 4.0]);

        let Verdict::Finished { value, .. } =
            routine.evaluate(&reading(5.0, 0.6), Duration::from_millis(300))
        else {
            panic!("expected finished");
        };
        assert_eq!(value.samples.len(), 2);
        assert_eq!(value.dropped_samples, 4);
    }
}

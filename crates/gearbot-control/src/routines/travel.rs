//! 行程测量：正向寻找限位，再反向寻找限位，两次停止位置之差即可用行程。

use gearbot_driver::Telemetry;
use gearbot_protocol::MotionCommand;
use gearbot_tools::RunToEndSettings;
use std::time::Duration;

use crate::error::ControlError;
use crate::routine::{MotionRoutine, Verdict};
use crate::routines::RunToEnd;

/// 行程测量
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureTravel {
    forward: RunToEnd,
    backward: RunToEnd,
    first_stop: Option<f64>,
}

impl MeasureTravel {
    pub fn new(
        velocity: f64,
        current_threshold: f64,
        settings: &RunToEndSettings,
    ) -> Result<Self, ControlError> {
        Ok(Self {
            forward: RunToEnd::new(velocity, current_threshold, settings)?,
            backward: RunToEnd::new(-velocity, current_threshold, settings)?,
            first_stop: None,
        })
    }

    /// 第一次停止的位置
    pub fn first_stop(&self) -> Option<f64> {
        self.first_stop
    }

    fn active(&mut self) -> &mut RunToEnd {
        if self.first_stop.is_none() {
            &mut self.forward
        } else {
            &mut self.backward
        }
    }
}

impl MotionRoutine for MeasureTravel {
    /// 第一次停止位置 − 第二次停止位置（rad）
    type Output = f64;

    fn name(&self) -> &'static str {
        "measure_travel_distance"
    }

    fn command(&self) -> MotionCommand {
        match self.first_stop {
            None => self.forward.command(),
            Some(_) => self.backward.command(),
        }
    }

    fn evaluate(&mut self, telemetry: &Telemetry, stage_elapsed: Duration) -> Verdict<f64> {
        match self.active().evaluate(telemetry, stage_elapsed) {
            Verdict::Continue | Verdict::NextStage => Verdict::Continue,
            Verdict::Finished { value, .. } => match self.first_stop {
                None => {
                    self.first_stop = Some(value.position);
                    Verdict::NextStage
                },
                Some(first) => Verdict::Finished {
                    success: true,
                    value: first - value.position,
                },
            },
        }
    }
}

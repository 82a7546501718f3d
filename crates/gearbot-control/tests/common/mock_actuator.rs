//! 按脚本回放遥测的执行器
//!
//! 第 n 次 `last_telemetry()` 返回脚本的第 n 项，脚本耗尽后重复最后一项。
//! 用于精确控制每个控制周期看到的电流/位置。

use gearbot_control::CancelToken;
use gearbot_driver::{Actuator, ActuatorMode, DriverError, Telemetry};
use gearbot_protocol::MotionCommand;

pub struct ScriptedActuator {
    script: Vec<Telemetry>,
    reads: usize,
    commands: Vec<MotionCommand>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl ScriptedActuator {
    pub fn new(script: Vec<Telemetry>) -> Self {
        assert!(!script.is_empty(), "script needs at least one frame");
        Self {
            script,
            reads: 0,
            commands: Vec::new(),
            cancel_after: None,
        }
    }

    /// 由 (位置, 电流) 序列构建脚本
    pub fn from_samples(samples: &[(f64, f64)]) -> Self {
        Self::new(
            samples
                .iter()
                .map(|&(position, q_current)| Telemetry {
                    position,
                    velocity: 0.0,
                    q_current,
                    mode: ActuatorMode::Velocity,
                })
                .collect(),
        )
    }

    /// 第 `reads` 次读取后触发取消
    pub fn cancel_after(mut self, reads: usize, token: CancelToken) -> Self {
        self.cancel_after = Some((reads, token));
        self
    }

    pub fn commands(&self) -> &[MotionCommand] {
        &self.commands
    }

    pub fn stop_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_stop()).count()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Actuator for ScriptedActuator {
    fn send(&mut self, command: MotionCommand) -> Result<(), DriverError> {
        self.commands.push(command);
        Ok(())
    }

    fn last_telemetry(&mut self) -> Result<Telemetry, DriverError> {
        let index = self.reads.min(self.script.len() - 1);
        self.reads += 1;
        if let Some((after, token)) = &self.cancel_after {
            if self.reads >= *after {
                token.cancel();
            }
        }
        Ok(self.script[index])
    }
}

//! C610 电调驱动
//!
//! C610 是电流模式电调：主机下发 q 轴电流，电调以约 1kHz 上报单圈角度、
//! 转速和电流。本驱动把反馈帧喂给 [`AngleUnwrapEstimator`]，
//! 对外提供多圈位置/速度/电流遥测。
//!
//! 位置/速度闭环不在 C610 上实现，对应指令返回
//! [`DriverError::UnsupportedCommand`]。

use gearbot_bus::CanAdapter;
use gearbot_protocol::{
    C610CurrentCommand, C610Feedback, MotionCommand, MotorCalibration, RawFeedback,
    amps_to_command_ma, feedback_id, validate_motor_id,
};
use tracing::{trace, warn};

use crate::actuator::{Actuator, ActuatorMode, Telemetry};
use crate::error::DriverError;
use crate::estimator::AngleUnwrapEstimator;

/// 单次 `poll()` 读取帧数上限（含其他设备的帧），仅在总线异常持续灌帧时生效
const MAX_FRAMES_PER_POLL: usize = 65_536;

/// 单个 C610 电调
pub struct C610Motor<B: CanAdapter> {
    bus: B,
    motor_id: u8,
    feedback_id: u32,
    estimator: AngleUnwrapEstimator,
    mode: ActuatorMode,
    frames_received: u64,
}

impl<B: CanAdapter> C610Motor<B> {
    /// 创建驱动
    ///
    /// - `motor_id`: 电调 ID（1..=8）
    pub fn new(bus: B, motor_id: u8, calibration: MotorCalibration) -> Result<Self, DriverError> {
        let motor_id = validate_motor_id(motor_id)?;
        Ok(Self {
            bus,
            motor_id,
            feedback_id: feedback_id(motor_id)?,
            estimator: AngleUnwrapEstimator::new(calibration),
            mode: ActuatorMode::Stopped,
            frames_received: 0,
        })
    }

    /// 读取总线上所有待处理帧，更新估计器
    ///
    /// 一直读到接收队列为空，遥测始终对应最新一帧。
    /// 返回本次处理的属于本电机的反馈帧数量。
    pub fn poll(&mut self) -> Result<usize, DriverError> {
        let mut handled = 0;
        let mut read = 0;
        while let Some(frame) = self.bus.try_receive()? {
            read += 1;
            if frame.id == self.feedback_id {
                let decoded = C610Feedback::try_from(frame)?;
                self.ingest(decoded.feedback);
                handled += 1;
            } else {
                trace!("C610 #{}: ignoring frame 0x{:X}", self.motor_id, frame.id);
            }
            if read >= MAX_FRAMES_PER_POLL {
                warn!(
                    "C610 #{}: {} frames read in one poll, receive queue still not empty",
                    self.motor_id, read
                );
                break;
            }
        }
        Ok(handled)
    }

    /// 直接输入一帧已解码的反馈
    pub fn ingest(&mut self, feedback: RawFeedback) {
        let counts_per_revolution = self.estimator.calibration().encoder.counts_per_revolution;
        let mut feedback = feedback;
        if u32::from(feedback.counts) >= counts_per_revolution {
            warn!(
                "C610 #{}: counts {} out of range [0, {}), clamping",
                self.motor_id, feedback.counts, counts_per_revolution
            );
            feedback.counts = u16::try_from(counts_per_revolution.saturating_sub(1)).unwrap_or(u16::MAX);
        }
        self.estimator.update(feedback);
        self.frames_received += 1;
    }

    /// 下发 q 轴电流（A）
    pub fn set_current(&mut self, amps: f64) -> Result<(), DriverError> {
        let milliamp_per_amp = self.estimator.calibration().encoder.milliamp_per_amp;
        let command =
            C610CurrentCommand::for_motor(self.motor_id, amps_to_command_ma(amps, milliamp_per_amp))?;
        self.bus.send(command.to_frame())?;
        Ok(())
    }

    pub fn motor_id(&self) -> u8 {
        self.motor_id
    }

    pub fn estimator(&self) -> &AngleUnwrapEstimator {
        &self.estimator
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// 取回底层总线
    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: CanAdapter> Actuator for C610Motor<B> {
    fn send(&mut self, command: MotionCommand) -> Result<(), DriverError> {
        match command {
            MotionCommand::Current { q_axis, .. } => {
                self.set_current(q_axis)?;
                self.mode = ActuatorMode::Current;
            },
            MotionCommand::Stop => {
                self.set_current(0.0)?;
                self.mode = ActuatorMode::Stopped;
            },
            MotionCommand::Position { .. } | MotionCommand::Velocity { .. } => {
                return Err(DriverError::UnsupportedCommand {
                    driver: "C610",
                    command: command.kind(),
                });
            },
        }
        Ok(())
    }

    fn last_telemetry(&mut self) -> Result<Telemetry, DriverError> {
        self.poll()?;
        if !self.estimator.is_initialized() {
            return Err(DriverError::NoFeedback);
        }
        Ok(Telemetry::from_estimator(&self.estimator, self.mode))
    }
}

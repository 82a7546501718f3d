//! 执行器指令/遥测接口
//!
//! 运动原语只通过 [`Actuator`] 与底层驱动交互：发送一条 [`MotionCommand`]，
//! 读取最近一帧 [`Telemetry`]。遥测反映的是设备最近上报的状态，
//! 不一定是最近一条指令的执行结果。
//!
//! 执行器是单写者资源：所有方法都要求 `&mut self`，
//! 由借用检查器保证同一时刻只有一个例程在驱动它。

use crate::error::DriverError;
use crate::estimator::AngleUnwrapEstimator;
use gearbot_protocol::MotionCommand;

/// 执行器工作模式（遥测上报）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActuatorMode {
    #[default]
    Stopped,
    Current,
    Velocity,
    Position,
}

impl ActuatorMode {
    /// 指令对应的期望模式
    pub fn for_command(command: &MotionCommand) -> Self {
        match command {
            MotionCommand::Position { .. } => ActuatorMode::Position,
            MotionCommand::Velocity { .. } => ActuatorMode::Velocity,
            MotionCommand::Current { .. } => ActuatorMode::Current,
            MotionCommand::Stop => ActuatorMode::Stopped,
        }
    }
}

/// 一帧遥测（已换算为物理单位）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Telemetry {
    /// 位置（rad）
    pub position: f64,
    /// 速度（rad/s）
    pub velocity: f64,
    /// q 轴电流（A）
    pub q_current: f64,
    pub mode: ActuatorMode,
}

impl Telemetry {
    /// 由估计器输出构建
    pub fn from_estimator(estimator: &AngleUnwrapEstimator, mode: ActuatorMode) -> Self {
        Self {
            position: estimator.position(),
            velocity: estimator.velocity(),
            q_current: estimator.current(),
            mode,
        }
    }
}

/// 执行器接口
pub trait Actuator {
    /// 发送一条指令
    fn send(&mut self, command: MotionCommand) -> Result<(), DriverError>;

    /// 读取最近一帧遥测
    fn last_telemetry(&mut self) -> Result<Telemetry, DriverError>;

    /// 发送停止指令
    fn stop(&mut self) -> Result<(), DriverError> {
        self.send(MotionCommand::Stop)
    }
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn send(&mut self, command: MotionCommand) -> Result<(), DriverError> {
        (**self).send(command)
    }

    fn last_telemetry(&mut self) -> Result<Telemetry, DriverError> {
        (**self).last_telemetry()
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn send(&mut self, command: MotionCommand) -> Result<(), DriverError> {
        (**self).send(command)
    }

    fn last_telemetry(&mut self) -> Result<Telemetry, DriverError> {
        (**self).last_telemetry()
    }
}

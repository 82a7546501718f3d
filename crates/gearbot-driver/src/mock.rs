//! 模拟执行器
//!
//! 一维刚体模型，带上下限位和一个可打滑的离合器，用于在无硬件时运行运动原语。
//! 每次 `last_telemetry()` 推进一个仿真步长 `dt`（与控制周期一致），
//! 所以遥测刷新节奏和真实驱动一样由读取方驱动。

use gearbot_protocol::{MotionCommand, signum_or_zero};
use std::time::Duration;

use crate::actuator::{Actuator, ActuatorMode, Telemetry};
use crate::error::DriverError;

/// 模拟参数
#[derive(Debug, Clone)]
pub struct SimulatedPlantConfig {
    /// 每次读取遥测推进的时间
    pub dt: Duration,
    /// 下限位（rad）
    pub lower_stop: f64,
    /// 上限位（rad）
    pub upper_stop: f64,
    /// 自由运动时的电流（A）
    pub free_current: f64,
    /// 每离开下限位 1 rad 增加的负载电流（A/rad）
    pub load_gradient: f64,
    /// 顶住限位时的堵转电流（A）
    pub stall_current: f64,
    /// 速度指令变化后的起动电流尖峰（A）
    pub startup_spike_current: f64,
    /// 起动尖峰持续的步数
    pub startup_spike_ticks: u32,
    /// 位置指令未给速度限制时的默认速度（rad/s）
    pub default_velocity_limit: f64,
    /// 离合器开始打滑的电流（A）
    pub clutch_slip_current: f64,
    /// 打滑速度（rad/s）
    pub clutch_slip_rate: f64,
}

impl Default for SimulatedPlantConfig {
    fn default() -> Self {
        Self {
            dt: Duration::from_millis(50),
            lower_stop: -1.0,
            upper_stop: 1.0,
            free_current: 0.2,
            load_gradient: 0.0,
            stall_current: 2.0,
            startup_spike_current: 0.0,
            startup_spike_ticks: 0,
            default_velocity_limit: 1.0,
            clutch_slip_current: f64::INFINITY,
            clutch_slip_rate: 0.0,
        }
    }
}

/// 模拟执行器
#[derive(Debug, Clone)]
pub struct SimulatedActuator {
    config: SimulatedPlantConfig,
    position: f64,
    velocity: f64,
    q_current: f64,
    active: MotionCommand,
    ticks_since_change: u32,
    commands: Vec<MotionCommand>,
    telemetry_reads: u64,
    fail_reads: bool,
}

impl SimulatedActuator {
    pub fn new(config: SimulatedPlantConfig) -> Self {
        Self {
            config,
            position: 0.0,
            velocity: 0.0,
            q_current: 0.0,
            active: MotionCommand::Stop,
            ticks_since_change: 0,
            commands: Vec::new(),
            telemetry_reads: 0,
            fail_reads: false,
        }
    }

    /// 设置初始位置（会被限制在限位内）
    pub fn with_position(mut self, position: f64) -> Self {
        self.position = position.clamp(self.config.lower_stop, self.config.upper_stop);
        self
    }

    /// 已收到的全部指令
    pub fn commands(&self) -> &[MotionCommand] {
        &self.commands
    }

    /// 已收到的停止指令数量
    pub fn stop_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_stop()).count()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn telemetry_reads(&self) -> u64 {
        self.telemetry_reads
    }

    /// 模拟遥测读取失败
    pub fn simulate_read_failure(&mut self, enable: bool) {
        self.fail_reads = enable;
    }

    fn step(&mut self) {
        let dt = self.config.dt.as_secs_f64();
        match self.active {
            MotionCommand::Stop => {
                self.velocity = 0.0;
                self.q_current = 0.0;
            },
            MotionCommand::Velocity {
                target,
                velocity_limit,
            } => {
                let speed = match velocity_limit {
                    Some(limit) => target.clamp(-limit.abs(), limit.abs()),
                    None => target,
                };
                self.drive(speed, dt);
            },
            MotionCommand::Position {
                target,
                velocity_limit,
            } => {
                let limit = velocity_limit
                    .unwrap_or(self.config.default_velocity_limit)
                    .abs();
                let error = target - self.position;
                let max_step = limit * dt;
                let speed = if error.abs() <= max_step {
                    error / dt
                } else {
                    limit * signum_or_zero(error)
                };
                self.drive(speed, dt);
            },
            MotionCommand::Current { q_axis, .. } => {
                self.q_current = q_axis;
                if q_axis.abs() > self.config.clutch_slip_current {
                    let speed = self.config.clutch_slip_rate * signum_or_zero(q_axis);
                    let next = (self.position + speed * dt)
                        .clamp(self.config.lower_stop, self.config.upper_stop);
                    self.velocity = (next - self.position) / dt;
                    self.position = next;
                } else {
                    self.velocity = 0.0;
                }
            },
        }
        self.ticks_since_change = self.ticks_since_change.saturating_add(1);
    }

    fn drive(&mut self, speed: f64, dt: f64) {
        let unclamped = self.position + speed * dt;
        let next = unclamped.clamp(self.config.lower_stop, self.config.upper_stop);
        let direction = signum_or_zero(speed);
        let blocked = next != unclamped || (speed != 0.0 && self.at_stop(direction));

        self.velocity = (next - self.position) / dt;
        self.position = next;

        self.q_current = if blocked {
            self.config.stall_current * direction
        } else if self.ticks_since_change < self.config.startup_spike_ticks {
            self.config.startup_spike_current * direction
        } else {
            let load = self.config.load_gradient * (self.position - self.config.lower_stop);
            (self.config.free_current + load) * direction
        };
    }

    fn at_stop(&self, direction: f64) -> bool {
        (direction > 0.0 && self.position >= self.config.upper_stop)
            || (direction < 0.0 && self.position <= self.config.lower_stop)
    }
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self::new(SimulatedPlantConfig::default())
    }
}

impl Actuator for SimulatedActuator {
    fn send(&mut self, command: MotionCommand) -> Result<(), DriverError> {
        if command != self.active {
            self.ticks_since_change = 0;
        }
        self.active = command;
        self.commands.push(command);
        Ok(())
    }

    fn last_telemetry(&mut self) -> Result<Telemetry, DriverError> {
        if self.fail_reads {
            return Err(DriverError::Timeout);
        }
        self.step();
        self.telemetry_reads += 1;
        Ok(Telemetry {
            position: self.position,
            velocity: self.velocity,
            q_current: self.q_current,
            mode: ActuatorMode::for_command(&self.active),
        })
    }
}

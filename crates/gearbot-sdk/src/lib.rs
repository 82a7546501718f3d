//! Gearbot SDK - 执行器状态估计与运动原语
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): C610 反馈/指令帧编解码、标定数据、ADXL 寄存器定义
//! - **总线层** (`bus`): CAN 与寄存器总线抽象
//! - **驱动层** (`driver`): 多圈角度估计器、执行器接口、C610/ADXL 驱动
//! - **控制层** (`control`): 寻找限位、位置运动、离合器/阻力诊断
//! - **配置** (`tools`): TOML 配置文件
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use gearbot_sdk::prelude::*;
//! use std::time::Duration;
//!
//! fn check_clutch<B: CanAdapter>(bus: B) -> Result<(), Box<dyn std::error::Error>> {
//!     gearbot_sdk::init_logging()?;
//!
//!     let motor = C610Motor::new(bus, 1, MotorCalibration::default())?;
//!     let mut primitives = MotionPrimitives::new(motor);
//!     let criterion = ClutchCriterion::new(0.05, SlipPolarity::PassWhenBelow)?;
//!     let result = primitives.test_clutch(1.0, criterion, Duration::from_secs(5))?;
//!     println!("clutch slip {:.4} rad, passed: {}", result.value, result.success);
//!     Ok(())
//! }
//! ```

mod logging;
pub mod prelude;

pub use gearbot_bus as bus;
pub use gearbot_control as control;
pub use gearbot_driver as driver;
pub use gearbot_protocol as protocol;
pub use gearbot_tools as tools;

pub use logging::{DEFAULT_LOG_DIRECTIVES, LoggingError, init_logging, init_logging_with};

// 常用类型
pub use gearbot_bus::{BusError, CanAdapter, RegisterBus};
pub use gearbot_control::{ControlConfig, ControlError, MotionPrimitives, RoutineResult};
pub use gearbot_driver::{Actuator, AngleUnwrapEstimator, C610Motor, DriverError, Telemetry};
pub use gearbot_protocol::{MotionCommand, MotorCalibration, ProtocolError, RawFeedback};
pub use gearbot_tools::GearbotConfig;

/// 按配置文件创建 C610 电机的运动原语执行器
///
/// 标定取自 `[calibration]`，控制周期、默认超时和例程参数取自 `[control]` / `[routines]`。
pub fn c610_primitives<B: CanAdapter>(
    bus: B,
    motor_id: u8,
    config: &GearbotConfig,
) -> Result<MotionPrimitives<C610Motor<B>>, ControlError> {
    let motor = C610Motor::new(bus, motor_id, config.calibration)?;
    Ok(MotionPrimitives::new(motor).with_config(ControlConfig::from_config(config)))
}

//! 驱动层模块
//!
//! 本模块提供执行器子系统的设备驱动与状态估计：
//! - [`AngleUnwrapEstimator`]：单圈计数 → 多圈位置/速度/转矩/功率
//! - [`Actuator`]：运动原语使用的指令/遥测接口
//! - [`C610Motor`]：基于估计器的 C610 电流模式电调驱动
//! - [`Adxl`]：ADXL345/ADXL375 加速度计驱动
//!
//! # Feature
//!
//! - `mock`：提供 [`SimulatedActuator`]，无硬件运行运动原语

pub mod actuator;
pub mod adxl;
pub mod c610;
mod error;
pub mod estimator;

#[cfg(feature = "mock")]
pub mod mock;

pub use actuator::{Actuator, ActuatorMode, Telemetry};
pub use adxl::{Acceleration, Adxl, RawAcceleration};
pub use c610::C610Motor;
pub use error::DriverError;
pub use estimator::{AngleUnwrapEstimator, EstimatorState};

#[cfg(feature = "mock")]
pub use mock::{SimulatedActuator, SimulatedPlantConfig};

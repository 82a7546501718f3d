//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use gearbot_sdk::prelude::*;
//! ```

// 控制层
pub use gearbot_control::{
    CancelToken, ClutchCriterion, Clock, ControlConfig, ManualClock, MonotonicClock,
    MotionPrimitives, ResistanceReport, RoutineResult,
};

// 驱动层
pub use gearbot_driver::{
    Acceleration, Actuator, ActuatorMode, Adxl, AngleUnwrapEstimator, C610Motor, Telemetry,
};

// 总线/协议层
pub use gearbot_bus::{CanAdapter, RegisterBus};
pub use gearbot_protocol::{AdxlModel, EncoderCalibration, MotionCommand, MotorCalibration};

// 配置
pub use gearbot_tools::{GearbotConfig, SlipPolarity};
pub use crate::c610_primitives;

// 错误类型
pub use gearbot_bus::BusError;
pub use gearbot_control::ControlError;
pub use gearbot_driver::DriverError;
pub use gearbot_protocol::ProtocolError;

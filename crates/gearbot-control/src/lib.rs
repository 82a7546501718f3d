//! # Gearbot Control
//!
//! 执行器运动原语：寻找限位、行程测量、离合器测试、运动阻力测量、位置运动。
//!
//! 每个原语都是一个 [`MotionRoutine`] 状态机，可以：
//! - 由外部节拍源通过 [`RoutineDriver::tick`] 驱动（事件循环/定时器）
//! - 或通过 [`MotionPrimitives`] 在调用线程上阻塞运行
//!
//! 阻塞运行必须给出超时时间，可选 [`CancelToken`]；超时或取消时发送停止指令后返回错误。
//!
//! ```rust,no_run
//! use gearbot_control::{MotionPrimitives, ClutchCriterion};
//! use gearbot_driver::SimulatedActuator;
//! use gearbot_tools::SlipPolarity;
//! use std::time::Duration;
//!
//! let mut primitives = MotionPrimitives::new(SimulatedActuator::default());
//! let home = primitives.run_to_end(2.0, 1.0, Duration::from_secs(10))?;
//! println!("end stop at {:.3} rad", home.final_position);
//!
//! let criterion = ClutchCriterion::new(0.05, SlipPolarity::PassWhenBelow)?;
//! let clutch = primitives.test_clutch(1.0, criterion, Duration::from_secs(5))?;
//! println!("clutch passed: {}", clutch.success);
//! # Ok::<(), gearbot_control::ControlError>(())
//! ```

pub mod cancel;
pub mod clock;
pub mod config;
mod error;
pub mod primitives;
pub mod routine;
pub mod routines;

pub use cancel::CancelToken;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::ControlConfig;
pub use error::ControlError;
pub use primitives::MotionPrimitives;
pub use routine::{
    AbortReason, MotionRoutine, RoutineDriver, RoutinePhase, RoutineResult, TickOutcome, Verdict,
};
pub use routines::{
    ClutchCriterion, ClutchTest, MeasureTravel, MoveToPosition, MovingResistance,
    ResistanceReport, ResistanceSample, RunToEnd,
};

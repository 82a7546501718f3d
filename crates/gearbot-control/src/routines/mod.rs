//! 运动原语的状态机实现
//!
//! | 例程 | 指令 | 终止条件 |
//! |------|------|----------|
//! | [`RunToEnd`] | 恒速 | 电流超限且超过起动保护时间 |
//! | [`MeasureTravel`] | 正向 + 反向 `RunToEnd` | 两次到达限位 |
//! | [`ClutchTest`] | 恒流（d = q） | 达到测试时长 |
//! | [`MovingResistance`] | 探测限位 + 恒速扫描 | 电流达到阈值 |
//! | [`MoveToPosition`] | 位置 + 速度限制 | 位置误差小于容差 |

mod clutch;
mod move_to;
mod resistance;
mod run_to_end;
mod travel;

pub use clutch::{ClutchCriterion, ClutchTest};
pub use move_to::MoveToPosition;
pub use resistance::{MovingResistance, ResistanceReport, ResistanceSample};
pub use run_to_end::RunToEnd;
pub use travel::MeasureTravel;

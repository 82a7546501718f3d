//! # Gearbot Tools - 共享配置格式
//!
//! **依赖原则**: 只依赖 `gearbot-protocol`，避免依赖 `gearbot-control`
//!
//! ## 包含模块
//!
//! - `config` - 配置文件格式（标定 + 控制参数），TOML 读写
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use gearbot_tools::GearbotConfig;
//!
//! let config = GearbotConfig::load_from_file("gearbot.toml")?;
//! println!("control period: {:?}", config.control.control_period());
//! # Ok::<(), anyhow::Error>(())
//! ```

// ⚠️ 禁止引入 gearbot-control
// use gearbot_control::*;  // ❌ 禁止

pub mod config;

// 重新导出常用类型
pub use config::{
    ClutchSettings, ControlSettings, GearbotConfig, MoveSettings, ResistanceSettings,
    RoutineSettings, RunToEndSettings, SlipPolarity, TravelWindow,
};

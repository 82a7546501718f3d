//! # 配置文件
//!
//! 标定数据与运动原语参数的 TOML 格式。所有字段都有默认值（与参考行为的常量一致），
//! 配置文件只需写出要覆盖的部分。
//!
//! 以下参数**没有默认值**，必须由调用方（或配置文件）显式提供：
//! - `control.default_timeout_ms`：阻塞例程的最长运行时间
//! - `routines.clutch.slip_threshold` / `routines.clutch.pass_when`：离合器测试的判据
//!
//! ```toml
//! [calibration]
//! resistance_ohm = 0.07
//!
//! [control]
//! control_period_ms = 50
//! default_timeout_ms = 10000
//!
//! [routines.clutch]
//! slip_threshold = 0.05
//! pass_when = "below"
//! ```

use anyhow::{Context, Result, bail};
use gearbot_protocol::MotorCalibration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GearbotConfig {
    /// 编码器/电机标定
    pub calibration: MotorCalibration,
    /// 控制循环参数
    pub control: ControlSettings,
    /// 各例程参数
    pub routines: RoutineSettings,
}

impl GearbotConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse gearbot config")?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize gearbot config")
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config file {}", path.display()))
    }

    /// 检查参数取值
    pub fn validate(&self) -> Result<()> {
        let encoder = &self.calibration.encoder;
        if encoder.counts_per_revolution < 2 {
            bail!("calibration.encoder.counts_per_revolution must be >= 2");
        }
        if encoder.counts_per_revolution > u32::from(u16::MAX) + 1 {
            bail!("calibration.encoder.counts_per_revolution must fit 16-bit counts");
        }
        for (name, value) in [
            ("counts_per_rad", encoder.counts_per_rad),
            ("rpm_per_rad_s", encoder.rpm_per_rad_s),
            ("milliamp_per_amp", encoder.milliamp_per_amp),
        ] {
            if !(value.is_finite() && value > 0.0) {
                bail!("calibration.encoder.{name} must be a positive number, got {value}");
            }
        }

        if self.control.control_period_ms == 0 {
            bail!("control.control_period_ms must be > 0");
        }
        if self.control.default_timeout_ms == Some(0) {
            bail!("control.default_timeout_ms must be > 0");
        }

        let routines = &self.routines;
        if !(routines.run_to_end.velocity_limit_factor > 0.0) {
            bail!("routines.run_to_end.velocity_limit_factor must be > 0");
        }
        if !(routines.move_to_position.position_tolerance > 0.0) {
            bail!("routines.move_to_position.position_tolerance must be > 0");
        }
        if let Some(window) = &routines.move_to_position.travel_window {
            if !(window.min < window.max) {
                bail!(
                    "routines.move_to_position.travel_window: min ({}) must be < max ({})",
                    window.min,
                    window.max
                );
            }
        }
        if let Some(threshold) = routines.clutch.slip_threshold {
            if !(threshold.is_finite() && threshold >= 0.0) {
                bail!("routines.clutch.slip_threshold must be a non-negative number");
            }
        }
        if !(routines.moving_resistance.threshold_current > 0.0) {
            bail!("routines.moving_resistance.threshold_current must be > 0");
        }
        if routines.moving_resistance.max_samples == Some(0) {
            bail!("routines.moving_resistance.max_samples must be > 0");
        }
        Ok(())
    }
}

/// 控制循环参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// 控制周期（ms），默认 50ms（20Hz）
    pub control_period_ms: u64,
    /// 阻塞例程默认超时（ms），无默认值
    pub default_timeout_ms: Option<u64>,
}

impl ControlSettings {
    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms)
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            control_period_ms: 50,
            default_timeout_ms: None,
        }
    }
}

/// 各例程参数
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutineSettings {
    pub run_to_end: RunToEndSettings,
    pub move_to_position: MoveSettings,
    pub clutch: ClutchSettings,
    pub moving_resistance: ResistanceSettings,
}

/// 寻找限位参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunToEndSettings {
    /// 起动保护时间（ms）：此时间内忽略电流超限（加速电流尖峰）
    pub startup_guard_ms: u64,
    /// 速度限制 = 行进速度 × 该系数
    pub velocity_limit_factor: f64,
}

impl RunToEndSettings {
    pub fn startup_guard(&self) -> Duration {
        Duration::from_millis(self.startup_guard_ms)
    }
}

impl Default for RunToEndSettings {
    fn default() -> Self {
        Self {
            startup_guard_ms: 500,
            velocity_limit_factor: 2.0,
        }
    }
}

/// 位置运动参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSettings {
    /// 到位判定（绝对误差，rad）
    pub position_tolerance: f64,
    /// 可选的行程窗口，窗口外的目标被拒绝
    pub travel_window: Option<TravelWindow>,
}

impl Default for MoveSettings {
    fn default() -> Self {
        Self {
            position_tolerance: 0.1,
            travel_window: None,
        }
    }
}

/// 行程窗口（rad）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelWindow {
    pub min: f64,
    pub max: f64,
}

impl TravelWindow {
    pub fn contains(&self, position: f64) -> bool {
        position >= self.min && position <= self.max
    }
}

/// 离合器测试判据方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlipPolarity {
    /// 位移小于阈值为通过（离合器在该电流下不应打滑）
    #[serde(rename = "below")]
    PassWhenBelow,
    /// 位移大于阈值为通过（离合器在该电流下应当打滑）
    #[serde(rename = "above")]
    PassWhenAbove,
}

impl SlipPolarity {
    /// 根据位移幅值判定是否通过
    pub fn passes(self, slip_distance: f64, threshold: f64) -> bool {
        match self {
            SlipPolarity::PassWhenBelow => slip_distance.abs() < threshold,
            SlipPolarity::PassWhenAbove => slip_distance.abs() > threshold,
        }
    }
}

/// 离合器测试参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClutchSettings {
    /// 施加电流的时间（ms）
    pub test_duration_ms: u64,
    /// 位移阈值（rad），无默认值
    pub slip_threshold: Option<f64>,
    /// 判据方向，无默认值
    pub pass_when: Option<SlipPolarity>,
}

impl ClutchSettings {
    pub fn test_duration(&self) -> Duration {
        Duration::from_millis(self.test_duration_ms)
    }
}

impl Default for ClutchSettings {
    fn default() -> Self {
        Self {
            test_duration_ms: 3000,
            slip_threshold: None,
            pass_when: None,
        }
    }
}

/// 运动阻力测量参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResistanceSettings {
    /// 扫描终止电流（A）
    pub threshold_current: f64,
    /// 预先寻找限位的速度（rad/s）
    pub probe_velocity: f64,
    /// 预先寻找限位的电流阈值（A）
    pub probe_current: f64,
    /// 采样缓冲上限；`None` 表示不设上限
    pub max_samples: Option<usize>,
}

impl Default for ResistanceSettings {
    fn default() -> Self {
        Self {
            threshold_current: 0.5,
            probe_velocity: 5.0,
            probe_current: 0.5,
            max_samples: None,
        }
    }
}

//! 控制层配置

use gearbot_tools::{GearbotConfig, RoutineSettings};
use std::time::Duration;

use crate::error::ControlError;

/// 运动原语配置
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// 控制周期（默认 50ms）
    pub control_period: Duration,
    /// 未显式给出超时时使用（见 [`MotionPrimitives::run_with_default_timeout`]）
    ///
    /// [`MotionPrimitives::run_with_default_timeout`]: crate::MotionPrimitives::run_with_default_timeout
    pub default_timeout: Option<Duration>,
    pub routines: RoutineSettings,
}

impl ControlConfig {
    /// 从配置文件内容构建
    pub fn from_config(config: &GearbotConfig) -> Self {
        Self {
            control_period: config.control.control_period(),
            default_timeout: config.control.default_timeout(),
            routines: config.routines.clone(),
        }
    }

    pub fn with_control_period(mut self, period: Duration) -> Result<Self, ControlError> {
        if period.is_zero() {
            return Err(ControlError::InvalidParameter(
                "control period must be > 0".to_string(),
            ));
        }
        self.control_period = period;
        Ok(self)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Result<Self, ControlError> {
        if timeout.is_zero() {
            return Err(ControlError::InvalidParameter(
                "default timeout must be > 0".to_string(),
            ));
        }
        self.default_timeout = Some(timeout);
        Ok(self)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::from_config(&GearbotConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period() {
        let config = ControlConfig::default();
        assert_eq!(config.control_period, Duration::from_millis(50));
        assert!(config.clone().with_control_period(Duration::ZERO).is_err());
        assert_eq!(
            config
                .with_control_period(Duration::from_millis(20))
                .unwrap()
                .control_period,
            Duration::from_millis(20)
        );
    }

    #[test]
    fn test_default_timeout_from_file() {
        assert_eq!(ControlConfig::default().default_timeout, None);

        let file = GearbotConfig::from_toml_str("[control]\ndefault_timeout_ms = 1500").unwrap();
        let config = ControlConfig::from_config(&file);
        assert_eq!(config.default_timeout, Some(Duration::from_millis(1500)));
        assert!(config.with_default_timeout(Duration::ZERO).is_err());
    }
}

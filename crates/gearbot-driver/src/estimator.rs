//! 多圈角度展开估计器
//!
//! 把周期性的单圈编码器计数流转换为连续的多圈位置，并由原始转速/电流推导
//! 角速度、电流、转矩和功率估计。纯状态机，不做任何 I/O。
//!
//! # 采样前提
//!
//! 相邻两次采样之间的真实位移必须小于半圈。这是回绕判定所能分辨的最大位移：
//! 若采样过慢（或丢帧）导致单次位移超过半圈，圈数会被静默地记错，
//! 且本模块无法在运行时检测。调用方可用
//! [`AngleUnwrapEstimator::max_unambiguous_speed`] 对照预期速度自行校验。
//!
//! # 示例
//!
//! ```rust
//! use gearbot_driver::AngleUnwrapEstimator;
//! use gearbot_protocol::RawFeedback;
//!
//! let mut est = AngleUnwrapEstimator::default();
//! est.update(RawFeedback::new(8000, 0, 0));
//! est.update(RawFeedback::new(100, 0, 0)); // 正向跨过零点
//! assert_eq!(est.revolutions(), 1);
//! assert_eq!(est.unwrapped_counts(), 8192 + 100);
//! ```

use gearbot_protocol::{MotorCalibration, RawFeedback};
use std::time::Duration;

/// 估计器内部状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EstimatorState {
    /// 是否已收到第一帧
    pub initialized: bool,
    /// 累计整圈数（可为负）
    pub revolution_count: i64,
    /// 最近一次原始计数（仅用于回绕判定）
    pub last_raw_counts: u16,
    /// 连续位置（原始计数单位）= revolution_count × counts_per_revolution + last_raw_counts
    pub unwrapped_counts: i64,
    /// 最近一次原始转速（RPM）
    pub velocity_raw: i16,
    /// 最近一次原始电流（mA）
    pub current_raw: i16,
}

/// 多圈角度展开估计器
#[derive(Debug, Clone)]
pub struct AngleUnwrapEstimator {
    calibration: MotorCalibration,
    state: EstimatorState,
}

impl AngleUnwrapEstimator {
    pub fn new(calibration: MotorCalibration) -> Self {
        Self {
            calibration,
            state: EstimatorState::default(),
        }
    }

    /// 输入一帧反馈
    ///
    /// 第一帧只作为基准，不改变圈数。之后每帧计算 `delta = new - last`：
    /// - `delta > 半圈`：反向跨过零点，圈数 -1
    /// - `delta < -半圈`：正向跨过零点，圈数 +1
    ///
    /// `feedback.counts` 必须在 `[0, counts_per_revolution)` 内，由调用方保证。
    pub fn update(&mut self, feedback: RawFeedback) {
        let state = &mut self.state;
        if !state.initialized {
            state.initialized = true;
            state.last_raw_counts = feedback.counts;
        }

        let half = self.calibration.encoder.half_revolution();
        let delta = i64::from(feedback.counts) - i64::from(state.last_raw_counts);
        if delta > half {
            state.revolution_count -= 1;
        } else if delta < -half {
            state.revolution_count += 1;
        }

        state.unwrapped_counts = state.revolution_count
            * i64::from(self.calibration.encoder.counts_per_revolution)
            + i64::from(feedback.counts);
        state.last_raw_counts = feedback.counts;

        state.velocity_raw = feedback.raw_velocity;
        state.current_raw = feedback.raw_current;
    }

    /// 清空状态（下一帧重新作为基准）
    pub fn reset(&mut self) {
        self.state = EstimatorState::default();
    }

    /// 输出轴位置（rad）
    pub fn position(&self) -> f64 {
        self.state.unwrapped_counts as f64 / self.calibration.encoder.counts_per_rad
    }

    /// 输出轴角速度（rad/s）
    pub fn velocity(&self) -> f64 {
        f64::from(self.state.velocity_raw) / self.calibration.encoder.rpm_per_rad_s
    }

    /// 电流（A）
    pub fn current(&self) -> f64 {
        f64::from(self.state.current_raw) / self.calibration.encoder.milliamp_per_amp
    }

    /// 转矩估计（N·m）
    ///
    /// 按原始速度与原始电流的符号选择标定系数，电流项使用原始 mA 值。
    pub fn torque(&self) -> f64 {
        let coefficients = self
            .calibration
            .torque
            .coefficients(self.state.velocity_raw, self.state.current_raw);
        coefficients.evaluate(self.velocity(), f64::from(self.state.current_raw))
    }

    /// 电功率（W）：I²R + Kv·ω·I
    pub fn electrical_power(&self) -> f64 {
        let current = self.current();
        current * current * self.calibration.resistance_ohm
            + self.calibration.voltage_constant * self.velocity() * current
    }

    /// 机械功率（W）：τ·ω
    pub fn mechanical_power(&self) -> f64 {
        self.torque() * self.velocity()
    }

    /// 在给定采样周期下，回绕判定仍然成立的最大转速（rad/s）
    pub fn max_unambiguous_speed(&self, sample_period: Duration) -> f64 {
        let half_rev_rad =
            self.calibration.encoder.half_revolution() as f64 / self.calibration.encoder.counts_per_rad;
        half_rev_rad / sample_period.as_secs_f64()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn revolutions(&self) -> i64 {
        self.state.revolution_count
    }

    pub fn unwrapped_counts(&self) -> i64 {
        self.state.unwrapped_counts
    }

    pub fn last_raw_counts(&self) -> u16 {
        self.state.last_raw_counts
    }

    pub fn raw_velocity(&self) -> i16 {
        self.state.velocity_raw
    }

    pub fn raw_current(&self) -> i16 {
        self.state.current_raw
    }

    pub fn state(&self) -> EstimatorState {
        self.state
    }

    pub fn calibration(&self) -> &MotorCalibration {
        &self.calibration
    }
}

impl Default for AngleUnwrapEstimator {
    fn default() -> Self {
        Self::new(MotorCalibration::default())
    }
}

//! 编码器与电机标定数据
//!
//! 这些常量与具体的编码器/电机组合绑定（默认：C610 电调 + M2006 减速电机，36:1）。
//! 转矩模型是经验拟合的标定表，不是物理定律。

use std::f64::consts::TAU;

/// M2006 转子编码器每圈计数
pub const M2006_COUNTS_PER_REV: u32 = 8192;

/// M2006 减速比
pub const M2006_REDUCTION: f64 = 36.0;

/// 编码器单位换算
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncoderCalibration {
    /// 每圈计数（原始值范围 [0, counts_per_revolution)）
    pub counts_per_revolution: u32,
    /// 输出轴每弧度对应的计数
    pub counts_per_rad: f64,
    /// 输出轴每 rad/s 对应的原始 RPM
    pub rpm_per_rad_s: f64,
    /// 原始电流单位换算（mA/A）
    pub milliamp_per_amp: f64,
}

impl EncoderCalibration {
    /// 由每圈计数和减速比推导其余常量
    pub fn for_encoder(counts_per_revolution: u32, reduction: f64) -> Self {
        Self {
            counts_per_revolution,
            counts_per_rad: f64::from(counts_per_revolution) * reduction / TAU,
            rpm_per_rad_s: reduction * 60.0 / TAU,
            milliamp_per_amp: 1000.0,
        }
    }

    /// 单次采样允许的最大计数变化（半圈）
    pub fn half_revolution(&self) -> i64 {
        i64::from(self.counts_per_revolution / 2)
    }
}

impl Default for EncoderCalibration {
    fn default() -> Self {
        Self::for_encoder(M2006_COUNTS_PER_REV, M2006_REDUCTION)
    }
}

/// 单个工况的转矩拟合系数
///
/// `torque = sign · sgn(ω) + velocity · ω + current · I_raw(mA)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TorqueCoefficients {
    pub sign: f64,
    pub velocity: f64,
    pub current: f64,
}

impl TorqueCoefficients {
    pub const fn new(sign: f64, velocity: f64, current: f64) -> Self {
        Self {
            sign,
            velocity,
            current,
        }
    }

    /// 计算转矩（N·m）
    ///
    /// - `velocity`: 输出轴角速度（rad/s）
    /// - `raw_current`: 原始电流（mA）
    pub fn evaluate(&self, velocity: f64, raw_current: f64) -> f64 {
        self.sign * signum_or_zero(velocity) + self.velocity * velocity + self.current * raw_current
    }
}

/// 分段转矩模型
///
/// 由原始速度与原始电流的符号关系选择工况：
/// - 同号（乘积 > 0）：电动工况 `motoring`
/// - 异号或任一为 0：回馈/制动工况 `regenerating`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TorqueModel {
    pub motoring: TorqueCoefficients,
    pub regenerating: TorqueCoefficients,
}

impl TorqueModel {
    /// C610/M2006 标定表
    pub const M2006: Self = Self {
        motoring: TorqueCoefficients::new(-0.0673, -0.00277, 0.000308),
        regenerating: TorqueCoefficients::new(-0.0136, -0.00494, 0.000179),
    };

    /// 是否处于电动工况
    pub fn is_motoring(raw_velocity: i16, raw_current: i16) -> bool {
        i32::from(raw_velocity) * i32::from(raw_current) > 0
    }

    /// 按工况选择系数
    pub fn coefficients(&self, raw_velocity: i16, raw_current: i16) -> &TorqueCoefficients {
        if Self::is_motoring(raw_velocity, raw_current) {
            &self.motoring
        } else {
            &self.regenerating
        }
    }
}

impl Default for TorqueModel {
    fn default() -> Self {
        Self::M2006
    }
}

/// 电机完整标定
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotorCalibration {
    pub encoder: EncoderCalibration,
    pub torque: TorqueModel,
    /// 相电阻（Ω）
    pub resistance_ohm: f64,
    /// 反电动势常数（V·s/rad）
    pub voltage_constant: f64,
}

impl Default for MotorCalibration {
    fn default() -> Self {
        Self {
            encoder: EncoderCalibration::default(),
            torque: TorqueModel::default(),
            resistance_ohm: 0.067,
            voltage_constant: 0.19,
        }
    }
}

/// 符号函数，`sgn(0) = 0`
pub fn signum_or_zero(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

//! 角度展开估计器的属性测试
//!
//! 只要每步位移不超过半圈，展开后的计数必须精确重建真实的连续位移。

use gearbot_driver::AngleUnwrapEstimator;
use gearbot_protocol::{EncoderCalibration, MotorCalibration, RawFeedback};
use proptest::prelude::*;

fn estimator(counts_per_revolution: u32) -> AngleUnwrapEstimator {
    AngleUnwrapEstimator::new(MotorCalibration {
        encoder: EncoderCalibration::for_encoder(counts_per_revolution, 1.0),
        ..MotorCalibration::default()
    })
}

fn wrap(position: i64, counts_per_revolution: u32) -> u16 {
    position.rem_euclid(i64::from(counts_per_revolution)) as u16
}

proptest! {
    /// 随机游走（每步 < 半圈）后，展开计数等于真实位置
    #[test]
    fn unwrap_reconstructs_continuous_motion(
        start in 0i64..8192,
        steps in prop::collection::vec(-4095i64..=4095, 1..400),
    ) {
        let cpr = 8192;
        let mut est = estimator(cpr);
        let mut truth = start;
        est.update(RawFeedback::new(wrap(truth, cpr), 0, 0));

        for step in steps {
            truth += step;
            est.update(RawFeedback::new(wrap(truth, cpr), 0, 0));
            prop_assert_eq!(est.unwrapped_counts(), truth);
        }
    }

    /// 65536 计数编码器同样成立
    #[test]
    fn unwrap_reconstructs_with_16bit_encoder(
        steps in prop::collection::vec(-32767i64..=32767, 1..200),
    ) {
        let cpr = 65536;
        let mut est = estimator(cpr);
        let mut truth = 0i64;
        est.update(RawFeedback::new(0, 0, 0));

        for step in steps {
            truth += step;
            est.update(RawFeedback::new(wrap(truth, cpr), 0, 0));
            prop_assert_eq!(est.unwrapped_counts(), truth);
        }
    }

    /// 位置/速度/电流对原始输入线性
    #[test]
    fn conversions_are_raw_over_constant(
        counts in 0u16..8192,
        rpm in any::<i16>(),
        current in any::<i16>(),
    ) {
        let cal = MotorCalibration::default();
        let mut est = AngleUnwrapEstimator::new(cal);
        est.update(RawFeedback::new(counts, rpm, current));

        prop_assert_eq!(est.position(), f64::from(counts) / cal.encoder.counts_per_rad);
        prop_assert_eq!(est.velocity(), f64::from(rpm) / cal.encoder.rpm_per_rad_s);
        prop_assert_eq!(est.current(), f64::from(current) / cal.encoder.milliamp_per_amp);
    }

    /// 工况选择：同号走电动系数，其余走回馈系数
    #[test]
    fn torque_regime_is_selected_by_sign(rpm in any::<i16>(), current in any::<i16>()) {
        let cal = MotorCalibration::default();
        let mut est = AngleUnwrapEstimator::new(cal);
        est.update(RawFeedback::new(0, rpm, current));

        let same_sign = (rpm > 0 && current > 0) || (rpm < 0 && current < 0);
        let coefficients = if same_sign { cal.torque.motoring } else { cal.torque.regenerating };
        let expected = coefficients.evaluate(est.velocity(), f64::from(current));
        prop_assert_eq!(est.torque(), expected);
    }
}

#[test]
fn single_backward_wrap_then_single_forward_wrap() {
    let mut est = estimator(65536);
    est.update(RawFeedback::new(0, 0, 0));
    est.update(RawFeedback::new(65500, 0, 0));
    assert_eq!(est.revolutions(), -1);
    est.update(RawFeedback::new(100, 0, 0));
    assert_eq!(est.revolutions(), 0);
    assert_eq!(est.unwrapped_counts(), 100);
}

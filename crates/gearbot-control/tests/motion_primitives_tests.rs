//! 运动原语集成测试（手动时钟，50ms 控制周期）

mod common;

use common::mock_actuator::ScriptedActuator;
use gearbot_control::{
    CancelToken, ClutchCriterion, ControlConfig, ControlError, ManualClock, MotionPrimitives,
};
use gearbot_driver::{SimulatedActuator, SimulatedPlantConfig};
use gearbot_protocol::MotionCommand;
use gearbot_tools::SlipPolarity;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn primitives<A: gearbot_driver::Actuator>(actuator: A) -> MotionPrimitives<A, ManualClock> {
    MotionPrimitives::with_clock(actuator, ManualClock::new(), ControlConfig::default())
}

/// 读取 n 对应 t = n × 50ms
fn constant_current(current: f64) -> ScriptedActuator {
    ScriptedActuator::from_samples(&[(0.0, current)])
}

#[test]
fn run_to_end_ignores_spike_during_startup_guard() {
    // t=0 起电流一直超过阈值
    let mut p = primitives(constant_current(3.0));
    let result = p.run_to_end(1.0, 1.0, TIMEOUT).unwrap();

    // 500ms 时 elapsed 不大于保护时间，550ms 是第一个满足条件的控制周期
    assert_eq!(result.elapsed, ms(550));
    assert_eq!(result.ticks, 12);

    let commands = p.actuator().commands();
    let (last, before) = commands.split_last().unwrap();
    assert!(last.is_stop());
    assert!(before.iter().all(|c| matches!(
        c,
        MotionCommand::Velocity {
            target,
            velocity_limit: Some(limit)
        } if *target == 1.0 && *limit == 2.0
    )));
    assert_eq!(p.actuator().stop_count(), 1);
}

#[test]
fn run_to_end_stops_at_first_qualifying_tick_after_guard() {
    // 0..=100ms 起动尖峰，之后自由运动，700ms 起撞上限位
    let mut samples = vec![(0.0, 3.0); 3];
    samples.extend(std::iter::repeat_n((0.5, 0.2), 11));
    samples.push((1.0, 2.5));
    let mut p = primitives(ScriptedActuator::from_samples(&samples));

    let result = p.run_to_end(1.0, 1.0, TIMEOUT).unwrap();
    assert_eq!(result.elapsed, ms(700));
    assert_eq!(result.final_position, 1.0);
    assert_eq!(result.value.q_current, 2.5);
    assert_eq!(p.actuator().stop_count(), 1);
}

#[test]
fn run_to_end_timeout_stops_once() {
    let mut p = primitives(constant_current(0.1));
    let err = p.run_to_end(1.0, 1.0, ms(1000)).unwrap_err();
    assert!(matches!(
        err,
        ControlError::Timeout {
            routine: "run_to_end",
            elapsed_ms: 1000
        }
    ));
    assert_eq!(p.actuator().stop_count(), 1);
    assert!(p.actuator().commands().last().unwrap().is_stop());
}

#[test]
fn cancellation_mid_routine_stops_once() {
    let token = CancelToken::new();
    let actuator = ScriptedActuator::from_samples(&[(0.0, 0.1)]).cancel_after(4, token.clone());
    let mut p = primitives(actuator).with_cancel_token(token);

    let err = p.run_to_end(1.0, 1.0, TIMEOUT).unwrap_err();
    assert!(matches!(err, ControlError::Cancelled { routine: "run_to_end" }));
    assert_eq!(p.actuator().reads(), 4);
    assert_eq!(p.actuator().stop_count(), 1);
}

#[test]
fn cancellation_before_start_sends_only_stop() {
    let token = CancelToken::new();
    token.cancel();
    let mut p = primitives(constant_current(0.0)).with_cancel_token(token);
    assert!(matches!(
        p.move_to_position_blocking(1.0, 1.0, TIMEOUT),
        Err(ControlError::Cancelled { .. })
    ));
    assert_eq!(p.actuator().commands(), &[MotionCommand::Stop]);
}

#[test]
fn measure_travel_distance_is_first_minus_second_stop() {
    let mut p = primitives(SimulatedActuator::new(SimulatedPlantConfig {
        lower_stop: -0.75,
        upper_stop: 1.25,
        ..SimulatedPlantConfig::default()
    }));
    let result = p.measure_travel_distance(2.0, 1.0, TIMEOUT).unwrap();
    assert!(result.success);
    assert_eq!(result.value, 1.25 - (-0.75));
    assert_eq!(result.final_position, -0.75);
    // 阶段之间一次，结束时一次
    assert_eq!(p.actuator().stop_count(), 2);
}

#[test]
fn measure_travel_distance_reverse_direction_is_negative() {
    let mut p = primitives(SimulatedActuator::default());
    let result = p.measure_travel_distance(-2.0, 1.0, TIMEOUT).unwrap();
    assert_eq!(result.value, -2.0);
}

#[test]
fn move_to_position_blocking_stops_exactly_once_on_arrival() {
    let mut p = primitives(SimulatedActuator::default());
    // 1 rad/s × 50ms = 0.05 rad/周期；0.45 是第一个与 0.52 相差小于 0.1 的位置
    let result = p.move_to_position_blocking(0.52, 1.0, TIMEOUT).unwrap();
    assert!(result.success);
    assert_eq!(result.elapsed, ms(450));
    assert!((result.final_position - 0.45).abs() < 1e-9);
    assert!((result.value + 0.07).abs() < 1e-9);

    let commands = p.actuator().commands();
    assert_eq!(p.actuator().stop_count(), 1);
    assert!(commands.last().unwrap().is_stop());
    assert!(commands[..commands.len() - 1].iter().all(|c| matches!(
        c,
        MotionCommand::Position {
            target,
            velocity_limit: Some(limit)
        } if *target == 0.52 && *limit == 1.0
    )));
}

#[test]
fn clutch_test_reports_slip_with_caller_polarity() {
    let plant = SimulatedPlantConfig {
        clutch_slip_current: 1.0,
        clutch_slip_rate: 0.1,
        ..SimulatedPlantConfig::default()
    };
    let below = ClutchCriterion::new(0.05, SlipPolarity::PassWhenBelow).unwrap();

    // 低于打滑电流：不动，通过
    let mut p = primitives(SimulatedActuator::new(plant.clone()));
    let result = p.test_clutch(0.5, below, TIMEOUT).unwrap();
    assert!(result.success);
    assert_eq!(result.value, 0.0);
    assert_eq!(result.elapsed, ms(3000));
    assert_eq!(p.actuator().stop_count(), 1);
    assert!(matches!(
        p.actuator().commands()[0],
        MotionCommand::Current { d_axis, q_axis } if d_axis == 0.5 && q_axis == 0.5
    ));

    // 高于打滑电流：3s × 0.1 rad/s ≈ 0.3 rad
    let mut p = primitives(SimulatedActuator::new(plant.clone()));
    let result = p.test_clutch(2.0, below, TIMEOUT).unwrap();
    assert!(!result.success);
    assert!((result.value - 0.3).abs() < 1e-9);

    let above = ClutchCriterion::new(0.05, SlipPolarity::PassWhenAbove).unwrap();
    let mut p = primitives(SimulatedActuator::new(plant));
    assert!(p.test_clutch(2.0, above, TIMEOUT).unwrap().success);
}

#[test]
fn clutch_test_shorter_than_duration_times_out() {
    let below = ClutchCriterion::new(0.05, SlipPolarity::PassWhenBelow).unwrap();
    let mut p = primitives(SimulatedActuator::default());
    assert!(matches!(
        p.test_clutch(0.5, below, ms(2000)),
        Err(ControlError::Timeout { .. })
    ));
    assert_eq!(p.actuator().stop_count(), 1);
}

#[test]
fn moving_resistance_sweeps_until_threshold() {
    let mut config = ControlConfig::default();
    config.routines.moving_resistance.probe_velocity = -5.0;
    let sim = SimulatedActuator::new(SimulatedPlantConfig {
        load_gradient: 0.2,
        ..SimulatedPlantConfig::default()
    });
    let mut p = MotionPrimitives::with_clock(sim, ManualClock::new(), config);

    let result = p.measure_moving_resistance(1.0, TIMEOUT).unwrap();
    let report = &result.value;
    assert!(result.success);
    assert!(report.threshold_current >= 0.5);
    assert!(report.threshold_position > 0.4);
    assert_eq!(report.dropped_samples, 0);

    let last = report.samples.last().unwrap();
    assert_eq!(last.current, report.threshold_current);
    assert!(report.samples[..report.samples.len() - 1]
        .iter()
        .all(|s| s.current.abs() < 0.5));
    assert!(report.samples.windows(2).all(|w| w[0].position < w[1].position));
    assert!(report.samples.windows(2).all(|w| w[0].elapsed < w[1].elapsed));

    // 探测阶段结束一次，扫描结束一次
    assert_eq!(p.actuator().stop_count(), 2);
}

#[test]
fn telemetry_failure_propagates_after_stop() {
    let mut sim = SimulatedActuator::default();
    sim.simulate_read_failure(true);
    let mut p = primitives(sim);
    assert!(matches!(
        p.run_to_end(1.0, 1.0, TIMEOUT),
        Err(ControlError::Driver(_))
    ));
    assert_eq!(p.actuator().stop_count(), 1);
}

#[test]
fn borrowed_actuator_is_usable_after_routine() {
    let mut sim = SimulatedActuator::default();
    {
        let mut p = primitives(&mut sim);
        p.move_to_position_blocking(-0.5, 2.0, TIMEOUT).unwrap();
    }
    assert!((sim.position() + 0.5).abs() < 0.1);
}

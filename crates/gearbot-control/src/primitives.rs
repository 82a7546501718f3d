//! 阻塞式运动原语
//!
//! [`MotionPrimitives`] 在调用线程上以固定控制周期驱动 [`RoutineDriver`]，
//! 直到例程结束、超时或被取消。每个阻塞例程都必须给出超时时间；
//! 超时或取消时先发送停止指令，再返回错误。
//!
//! 控制循环使用绝对时间锚点（`next_tick += period`）消除累积漂移；
//! 单拍耗时超过周期时记录 overrun 并把锚点重置到当前时间。

use gearbot_driver::{Actuator, Telemetry};
use std::time::Duration;
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::clock::{Clock, MonotonicClock};
use crate::config::ControlConfig;
use crate::error::ControlError;
use crate::routine::{AbortReason, MotionRoutine, RoutineDriver, RoutineResult, TickOutcome};
use crate::routines::{
    ClutchCriterion, ClutchTest, MeasureTravel, MoveToPosition, MovingResistance,
    ResistanceReport, RunToEnd,
};

/// 运动原语执行器
///
/// 独占执行器句柄；需要临时借用时传入 `&mut actuator` 即可。
pub struct MotionPrimitives<A: Actuator, C: Clock = MonotonicClock> {
    actuator: A,
    clock: C,
    config: ControlConfig,
    cancel: Option<CancelToken>,
}

impl<A: Actuator> MotionPrimitives<A, MonotonicClock> {
    /// 使用单调时钟和默认配置
    pub fn new(actuator: A) -> Self {
        Self::with_clock(actuator, MonotonicClock::new(), ControlConfig::default())
    }
}

impl<A: Actuator, C: Clock> MotionPrimitives<A, C> {
    pub fn with_clock(actuator: A, clock: C, config: ControlConfig) -> Self {
        Self {
            actuator,
            clock,
            config,
            cancel: None,
        }
    }

    pub fn with_config(mut self, config: ControlConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置取消令牌（每个控制周期检查一次）
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn set_cancel_token(&mut self, token: Option<CancelToken>) {
        self.cancel = token;
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 读取一帧遥测
    pub fn telemetry(&mut self) -> Result<Telemetry, ControlError> {
        Ok(self.actuator.last_telemetry()?)
    }

    pub fn into_inner(self) -> A {
        self.actuator
    }

    /// 以恒定速度运动直到撞上限位
    ///
    /// 电流幅值超过 `current_threshold` 且已过起动保护时间（默认 500ms）时停止。
    /// 结果的 `value` 为停止时的遥测。
    pub fn run_to_end(
        &mut self,
        velocity: f64,
        current_threshold: f64,
        timeout: Duration,
    ) -> Result<RoutineResult<Telemetry>, ControlError> {
        let routine = RunToEnd::new(velocity, current_threshold, &self.config.routines.run_to_end)?;
        info!(
            "run_to_end: velocity={:.3} rad/s, current threshold={:.3} A",
            velocity, current_threshold
        );
        self.run(routine, timeout)
    }

    /// 测量可用行程
    ///
    /// 先以 `velocity` 寻找限位，再以 `-velocity` 寻找另一端；
    /// `value` = 第一次停止位置 − 第二次停止位置。
    pub fn measure_travel_distance(
        &mut self,
        velocity: f64,
        current_threshold: f64,
        timeout: Duration,
    ) -> Result<RoutineResult<f64>, ControlError> {
        let routine =
            MeasureTravel::new(velocity, current_threshold, &self.config.routines.run_to_end)?;
        info!(
            "measure_travel_distance: velocity={:.3} rad/s, current threshold={:.3} A",
            velocity, current_threshold
        );
        let result = self.run(routine, timeout)?;
        info!("Travel distance: {:.4} rad", result.value);
        Ok(result)
    }

    /// 离合器打滑测试
    ///
    /// 在 d/q 两轴施加 `max_current`，持续配置的测试时长（默认 3000ms）。
    /// `value` 为有符号位移，`success` 为按 `criterion` 判定的结果。
    pub fn test_clutch(
        &mut self,
        max_current: f64,
        criterion: ClutchCriterion,
        timeout: Duration,
    ) -> Result<RoutineResult<f64>, ControlError> {
        let duration = self.config.routines.clutch.test_duration();
        let routine = ClutchTest::new(max_current, duration, criterion)?;
        info!(
            "test_clutch: current={:.3} A for {}ms, pass when slip {:?} {:.4} rad",
            max_current,
            duration.as_millis(),
            criterion.polarity,
            criterion.slip_threshold
        );
        let result = self.run(routine, timeout)?;
        info!(
            "Clutch {}: slip {:.4} rad",
            if result.success { "passed" } else { "failed" },
            result.value
        );
        Ok(result)
    }

    /// 测量运动阻力
    ///
    /// 先按配置的探测参数寻找限位，再以 `velocity` 扫描直到电流达到阈值（默认 0.5A）。
    pub fn measure_moving_resistance(
        &mut self,
        velocity: f64,
        timeout: Duration,
    ) -> Result<RoutineResult<ResistanceReport>, ControlError> {
        let routines = &self.config.routines;
        let routine =
            MovingResistance::new(velocity, &routines.moving_resistance, &routines.run_to_end)?;
        info!(
            "measure_moving_resistance: sweep velocity={:.3} rad/s, threshold={:.3} A",
            velocity, routines.moving_resistance.threshold_current
        );
        let result = self.run(routine, timeout)?;
        info!(
            "Moving resistance: {:.3} A at {:.4} rad ({} samples)",
            result.value.threshold_current,
            result.value.threshold_position,
            result.value.samples.len()
        );
        Ok(result)
    }

    /// 运动到目标位置并等待到位
    ///
    /// 位置误差小于配置的容差（默认 0.1 rad）时停止；停止指令只在到位时发送一次。
    pub fn move_to_position_blocking(
        &mut self,
        target: f64,
        velocity: f64,
        timeout: Duration,
    ) -> Result<RoutineResult<f64>, ControlError> {
        let routine = self.position_routine(target, velocity)?;
        info!(
            "move_to_position: target={:.4} rad, velocity limit={:.3} rad/s",
            target, velocity
        );
        self.run(routine, timeout)
    }

    /// 发送位置指令后立即返回，不等待到位
    ///
    /// 调用方需要自行轮询遥测确认到位。
    pub fn move_to_position(&mut self, target: f64, velocity: f64) -> Result<(), ControlError> {
        let routine = self.position_routine(target, velocity)?;
        self.actuator.send(routine.command())?;
        info!(
            "move_to_position (non-blocking): target={:.4} rad, velocity limit={:.3} rad/s",
            target, velocity
        );
        Ok(())
    }

    fn position_routine(&self, target: f64, velocity: f64) -> Result<MoveToPosition, ControlError> {
        let settings = &self.config.routines.move_to_position;
        if let Some(window) = &settings.travel_window {
            if !window.contains(target) {
                return Err(ControlError::InvalidParameter(format!(
                    "target {target} outside travel window [{}, {}]",
                    window.min, window.max
                )));
            }
        }
        MoveToPosition::new(target, velocity, settings.position_tolerance)
    }

    /// 以配置中的默认超时运行例程
    ///
    /// 配置未给出 `default_timeout` 时返回 [`ControlError::InvalidParameter`]，不发送任何指令。
    pub fn run_with_default_timeout<R: MotionRoutine>(
        &mut self,
        routine: R,
    ) -> Result<RoutineResult<R::Output>, ControlError> {
        let timeout = self.config.default_timeout.ok_or_else(|| {
            ControlError::InvalidParameter(format!(
                "{}: no timeout given and no default timeout configured",
                routine.name()
            ))
        })?;
        self.run(routine, timeout)
    }

    /// 以阻塞方式运行任意例程
    pub fn run<R: MotionRoutine>(
        &mut self,
        routine: R,
        timeout: Duration,
    ) -> Result<RoutineResult<R::Output>, ControlError> {
        if timeout.is_zero() {
            return Err(ControlError::InvalidParameter(
                "routine timeout must be > 0".to_string(),
            ));
        }

        let mut driver = RoutineDriver::new(routine);
        let period = self.config.control_period;
        let start = self.clock.now();
        let mut next_tick = start;

        loop {
            let now = self.clock.now();
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(driver.abort(&mut self.actuator, AbortReason::Cancelled, now));
            }
            if now.saturating_sub(start) >= timeout {
                return Err(driver.abort(&mut self.actuator, AbortReason::Timeout, now));
            }

            if let TickOutcome::Finished(result) = driver.tick(&mut self.actuator, now)? {
                return Ok(result);
            }

            next_tick += period;
            let now = self.clock.now();
            if next_tick > now {
                self.clock.sleep(next_tick - now);
            } else {
                warn!(
                    "Control loop overrun: tick took {:?}, expected period {:?}",
                    now.saturating_sub(next_tick - period),
                    period
                );
                next_tick = now;
            }
        }
    }
}

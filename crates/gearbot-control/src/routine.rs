//! 例程状态机
//!
//! 每个运动原语实现 [`MotionRoutine`]：给出当前阶段要持续发送的指令，并根据每帧遥测
//! 判断是否结束。[`RoutineDriver`] 由外部节拍源驱动（每个控制周期调用一次 `tick`），
//! 执行器以 `&mut` 参数传入，不在状态机内部持有。
//!
//! ```text
//! Idle ──tick──▶ CommandIssued ──tick──▶ Polling ──┐
//!                      ▲                    │  ▲    │ 每拍：读遥测 → 重发指令 → 判定
//!                      └──── NextStage ─────┘  └────┘
//!                                           │
//!                                      Finished / abort
//!                                           ▼
//!                                      Terminating ──(Stop)──▶ Done
//! ```
//!
//! `Done` 只能经由 `Terminating` 到达，所以每个结束的例程都恰好发送一次停止指令
//! （多阶段例程在阶段之间另外各发送一次）。
//!
//! 停止指令发送失败时状态机停留在 `Terminating`，`tick` 返回该错误；
//! 之后再次 `tick` 会重发停止，成功后返回被推迟的结束结果
//! （例程已判定结束时为 [`TickOutcome::Finished`]，否则为 [`ControlError::AlreadyFinished`]）。

use gearbot_driver::{Actuator, Telemetry};
use gearbot_protocol::MotionCommand;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::ControlError;

/// 单帧判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<T> {
    /// 继续当前阶段
    Continue,
    /// 当前阶段结束，进入下一阶段（驱动器先发送停止，再重置阶段计时）
    NextStage,
    /// 例程结束
    Finished { success: bool, value: T },
}

/// 运动例程
pub trait MotionRoutine {
    /// 例程输出的诊断量
    type Output;

    /// 例程名称（日志与错误信息）
    fn name(&self) -> &'static str;

    /// 当前阶段每个控制周期都要重发的指令
    fn command(&self) -> MotionCommand;

    /// 发出第一条指令前的遥测（起始位置等基准量）
    fn start(&mut self, _telemetry: &Telemetry) {}

    /// 根据一帧遥测判断是否结束
    ///
    /// `stage_elapsed` 为当前阶段开始以来的时间。
    fn evaluate(&mut self, telemetry: &Telemetry, stage_elapsed: Duration)
    -> Verdict<Self::Output>;
}

/// 例程结果
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineResult<T> {
    pub routine: &'static str,
    /// 例程判定是否成功（如离合器测试是否通过）
    pub success: bool,
    /// 结束时的位置（rad）
    pub final_position: f64,
    /// 例程总耗时
    pub elapsed: Duration,
    /// 执行的控制周期数
    pub ticks: u32,
    pub value: T,
}

/// 驱动器所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutinePhase {
    Idle,
    CommandIssued,
    Polling,
    Terminating,
    Done,
}

/// 单拍结果
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome<T> {
    Running,
    Finished(RoutineResult<T>),
}

/// 中止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    Timeout,
    Cancelled,
}

/// 例程状态机驱动器
pub struct RoutineDriver<R: MotionRoutine> {
    routine: R,
    phase: RoutinePhase,
    started_at: Duration,
    stage_started_at: Duration,
    stage: u32,
    ticks: u32,
    last_telemetry: Option<Telemetry>,
    /// 已判定结束、等待停止指令确认的结果
    pending: Option<RoutineResult<R::Output>>,
}

impl<R: MotionRoutine> RoutineDriver<R> {
    pub fn new(routine: R) -> Self {
        Self {
            routine,
            phase: RoutinePhase::Idle,
            started_at: Duration::ZERO,
            stage_started_at: Duration::ZERO,
            stage: 0,
            ticks: 0,
            last_telemetry: None,
            pending: None,
        }
    }

    pub fn phase(&self) -> RoutinePhase {
        self.phase
    }

    pub fn routine(&self) -> &R {
        &self.routine
    }

    pub fn is_done(&self) -> bool {
        self.phase == RoutinePhase::Done
    }

    /// 已开始的阶段序号（从 0 开始）
    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn last_telemetry(&self) -> Option<&Telemetry> {
        self.last_telemetry.as_ref()
    }

    /// 推进一个控制周期
    ///
    /// `now` 来自调用方的时钟，所有时间判据都以它为准。
    /// 任何执行器错误都会先尝试发送停止，再向上传播。
    pub fn tick<A: Actuator + ?Sized>(
        &mut self,
        actuator: &mut A,
        now: Duration,
    ) -> Result<TickOutcome<R::Output>, ControlError> {
        match self.phase {
            RoutinePhase::Idle => {
                self.started_at = now;
                self.stage_started_at = now;
                self.ticks = 1;

                let telemetry = self.guard(actuator, |a| a.last_telemetry())?;
                self.routine.start(&telemetry);
                self.last_telemetry = Some(telemetry);

                let command = self.routine.command();
                self.guard(actuator, |a| a.send(command))?;
                debug!(
                    "{}: issued {} command at position {:.4}",
                    self.routine.name(),
                    command.kind(),
                    telemetry.position
                );
                self.phase = RoutinePhase::CommandIssued;
                Ok(TickOutcome::Running)
            },
            RoutinePhase::CommandIssued | RoutinePhase::Polling => {
                self.ticks = self.ticks.saturating_add(1);
                let telemetry = self.guard(actuator, |a| a.last_telemetry())?;
                self.last_telemetry = Some(telemetry);

                let command = self.routine.command();
                self.guard(actuator, |a| a.send(command))?;

                let stage_elapsed = now.saturating_sub(self.stage_started_at);
                debug!(
                    "{} [stage {} t={}ms] mode={:?} pos={:.4} vel={:.4} cur={:.3}",
                    self.routine.name(),
                    self.stage,
                    stage_elapsed.as_millis(),
                    telemetry.mode,
                    telemetry.position,
                    telemetry.velocity,
                    telemetry.q_current
                );

                match self.routine.evaluate(&telemetry, stage_elapsed) {
                    Verdict::Continue => {
                        self.phase = RoutinePhase::Polling;
                        Ok(TickOutcome::Running)
                    },
                    Verdict::NextStage => {
                        self.guard(actuator, |a| a.stop())?;
                        self.stage += 1;
                        self.stage_started_at = now;
                        let next = self.routine.command();
                        self.guard(actuator, |a| a.send(next))?;
                        debug!(
                            "{}: stage {} started with {} command",
                            self.routine.name(),
                            self.stage,
                            next.kind()
                        );
                        self.phase = RoutinePhase::CommandIssued;
                        Ok(TickOutcome::Running)
                    },
                    Verdict::Finished { success, value } => {
                        self.pending = Some(RoutineResult {
                            routine: self.routine.name(),
                            success,
                            final_position: telemetry.position,
                            elapsed: now.saturating_sub(self.started_at),
                            ticks: self.ticks,
                            value,
                        });
                        self.terminate(actuator)?;
                        self.finish(&telemetry)
                    },
                }
            },
            RoutinePhase::Terminating => {
                self.terminate(actuator)?;
                let telemetry = self.last_telemetry.unwrap_or_default();
                self.finish(&telemetry)
            },
            RoutinePhase::Done => Err(ControlError::AlreadyFinished {
                routine: self.routine.name(),
            }),
        }
    }

    /// 中止例程：发送停止指令并返回对应的错误
    pub fn abort<A: Actuator + ?Sized>(
        &mut self,
        actuator: &mut A,
        reason: AbortReason,
        now: Duration,
    ) -> ControlError {
        let routine = self.routine.name();
        let elapsed = now.saturating_sub(self.started_at);
        if self.phase != RoutinePhase::Done {
            if let Err(e) = self.terminate(actuator) {
                error!("{}: failed to stop actuator during abort: {}", routine, e);
            }
        }
        match reason {
            AbortReason::Timeout => {
                warn!(
                    "{} timed out after {}ms ({} ticks), actuator stopped",
                    routine,
                    elapsed.as_millis(),
                    self.ticks
                );
                ControlError::Timeout {
                    routine,
                    elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                }
            },
            AbortReason::Cancelled => {
                warn!("{} cancelled after {}ms, actuator stopped", routine, elapsed.as_millis());
                ControlError::Cancelled { routine }
            },
        }
    }

    fn finish(&mut self, telemetry: &Telemetry) -> Result<TickOutcome<R::Output>, ControlError> {
        let Some(result) = self.pending.take() else {
            return Err(ControlError::AlreadyFinished {
                routine: self.routine.name(),
            });
        };
        info!(
            "{} finished (success={}) at position {:.4} after {}ms, {} ticks; \
             stop telemetry: vel={:.4} cur={:.3}",
            result.routine,
            result.success,
            result.final_position,
            result.elapsed.as_millis(),
            result.ticks,
            telemetry.velocity,
            telemetry.q_current
        );
        Ok(TickOutcome::Finished(result))
    }

    fn terminate<A: Actuator + ?Sized>(&mut self, actuator: &mut A) -> Result<(), ControlError> {
        self.phase = RoutinePhase::Terminating;
        actuator.stop()?;
        self.phase = RoutinePhase::Done;
        Ok(())
    }

    /// 执行一次执行器操作；失败时尽力停止并结束例程
    fn guard<A, T, F>(&mut self, actuator: &mut A, op: F) -> Result<T, ControlError>
    where
        A: Actuator + ?Sized,
        F: FnOnce(&mut A) -> Result<T, gearbot_driver::DriverError>,
    {
        match op(actuator) {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("{}: actuator error, stopping: {}", self.routine.name(), e);
                self.phase = RoutinePhase::Terminating;
                match actuator.stop() {
                    Ok(()) => self.phase = RoutinePhase::Done,
                    Err(stop_err) => {
                        error!("{}: stop after error also failed: {}", self.routine.name(), stop_err)
                    },
                }
                Err(e.into())
            },
        }
    }
}

//! 时钟抽象
//!
//! 运动原语的时间判据（起动保护、测试时长、超时）都基于 [`Clock::now`]，
//! 控制周期的等待通过 [`Clock::sleep`]。硬件上使用 [`MonotonicClock`]；
//! 仿真和测试使用 [`ManualClock`]，`sleep` 只推进虚拟时间，不真正阻塞。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 时钟
pub trait Clock {
    /// 自时钟原点起经过的时间
    fn now(&self) -> Duration;

    /// 等待一段时间
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// 单调时钟（`Instant` + `spin_sleep`）
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

/// 手动时钟
///
/// `sleep` 立即返回并把时间推进相应长度。克隆的实例共享同一时间线。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进时间
    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(duration_to_nanos(duration), Ordering::SeqCst);
    }

    /// 设置绝对时间
    pub fn set(&self, now: Duration) {
        self.nanos.store(duration_to_nanos(now), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

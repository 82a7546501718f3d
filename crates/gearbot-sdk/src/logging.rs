//! 日志初始化
//!
//! 所有 crate 通过 `tracing` 输出日志。`init_logging()` 安装 fmt 订阅者，
//! 过滤规则取自 `RUST_LOG`，并追加默认指令；使用 `log` 宏的依赖通过
//! `tracing-log` 桥接到同一个订阅者。

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, ParseError};

/// 默认日志指令：例程摘要和告警
pub const DEFAULT_LOG_DIRECTIVES: &[&str] = &[
    "gearbot_control=info",
    "gearbot_driver=info",
    "gearbot_sdk=info",
];

/// 日志初始化错误
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log directive: {0}")]
    InvalidDirective(#[from] ParseError),

    #[error("Failed to install log bridge: {0}")]
    LogBridge(#[from] log::SetLoggerError),

    #[error("Global subscriber already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 使用默认指令初始化日志
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with(DEFAULT_LOG_DIRECTIVES)
}

/// 使用给定的默认指令初始化日志（`RUST_LOG` 仍然生效）
pub fn init_logging_with(directives: &[&str]) -> Result<(), LoggingError> {
    let mut filter = EnvFilter::from_default_env();
    for directive in directives {
        filter = filter.add_directive(directive.parse::<Directive>()?);
    }

    LogTracer::init()?;
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

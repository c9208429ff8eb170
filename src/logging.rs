//! Logging setup
//!
//! `env_logger` does the formatting. The workflow harness wraps it in a
//! [`DiagnosticLogger`] so every `error` record also lands in the run's
//! [`Diagnostics`] sink.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::workflow::Diagnostics;

/// Set to `true` to get debug output from workflows
pub const WORKFLOW_DEBUGGING_ENV: &str = "WORKFLOW_DEBUGGING";

/// Whether `WORKFLOW_DEBUGGING=true` is set
pub fn debug_from_env() -> bool {
    std::env::var(WORKFLOW_DEBUGGING_ENV).is_ok_and(|v| v == "true")
}

/// Forwards to env_logger and records error-level messages as diagnostics
pub struct DiagnosticLogger {
    inner: env_logger::Logger,
    sink: Diagnostics,
}

impl DiagnosticLogger {
    pub fn new(inner: env_logger::Logger, sink: Diagnostics) -> Self {
        Self { inner, sink }
    }

    fn max_level(&self) -> LevelFilter {
        self.inner.filter().max(LevelFilter::Error)
    }
}

impl Log for DiagnosticLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() == Level::Error || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Error {
            self.sink.report(record.args().to_string());
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

fn builder(debug: bool) -> env_logger::Builder {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
}

/// Install the global logger.
///
/// `RUST_LOG` overrides the default level. With a sink, error records are
/// also reported as diagnostics.
pub fn init(debug: bool, sink: Option<Diagnostics>) -> Result<(), SetLoggerError> {
    let logger = builder(debug).build();
    match sink {
        Some(sink) => {
            let logger = DiagnosticLogger::new(logger, sink);
            let max_level = logger.max_level();
            log::set_boxed_logger(Box::new(logger))?;
            log::set_max_level(max_level);
        }
        None => {
            let max_level = logger.filter();
            log::set_boxed_logger(Box::new(logger))?;
            log::set_max_level(max_level);
        }
    }
    Ok(())
}

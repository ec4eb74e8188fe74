use std::sync::{Arc, OnceLock};

/// Receives log messages emitted by `TagKit`.
///
/// Implemented by the host app and exported via `UniFFI`.
///
/// # Examples
///
/// ```rust
/// use tagkit_core::logger::{LogLevel, Logger};
///
/// struct ConsoleLogger;
///
/// impl Logger for ConsoleLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Kotlin
///
/// ```kotlin
/// object TagKitLogger : Logger {
///     override fun log(level: LogLevel, message: String) {
///         Log.println(level.toPriority(), "TagKit", message)
///     }
/// }
///
/// setLogger(TagKitLogger) // once, from Application.onCreate
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing, e.g. every acquisition attempt.
    Trace,
    /// Debugging information.
    Debug,
    /// Session progress.
    Info,
    /// Recoverable problems, e.g. a failed release.
    Warn,
    /// Session failures.
    Error,
}

/// Bridges the `log` facade to the foreign `Logger`.
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        // Debug and trace output of dependencies is noise for the host app.
        let from_tagkit = record
            .module_path()
            .is_some_and(|module_path| module_path.starts_with("tagkit"));
        if record.level() >= log::Level::Debug && !from_tagkit {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs the host logger. Only the first call has an effect.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        println!("Logger already set");
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(log::Level::Error), LogLevel::Error);
        assert_eq!(log_level(log::Level::Warn), LogLevel::Warn);
        assert_eq!(log_level(log::Level::Info), LogLevel::Info);
        assert_eq!(log_level(log::Level::Debug), LogLevel::Debug);
        assert_eq!(log_level(log::Level::Trace), LogLevel::Trace);
    }
}

//! Terminal logger for host-side control loops.

use std::{sync::OnceLock, time::Instant};

use log::{max_level, set_logger, set_max_level, LevelFilter, Log, Metadata, SetLoggerError};

const ESCAPES: [Option<&str>; 6] = [
    None,             // Default foreground
    Some("\x1B[31m"), // Error (red)
    Some("\x1B[33m"), // Warn (yellow)
    Some("\x1B[34m"), // Info (blue)
    Some("\x1B[36m"), // Debug (cyan)
    Some("\x1B[37m"), // Trace (white)
];

/// Prints records to stdout as `mm:ss:ms [LEVEL] message`, timed from the
/// first record.
///
/// ```no_run
/// use log::LevelFilter;
/// use planar_pid::logger::StdoutLogger;
///
/// static LOGGER: StdoutLogger = StdoutLogger::new();
/// LOGGER.init(LevelFilter::Debug).expect("logger already set");
/// ```
pub struct StdoutLogger {
    origin: OnceLock<Instant>,
}

impl StdoutLogger {
    pub const fn new() -> Self {
        Self {
            origin: OnceLock::new(),
        }
    }

    pub fn init(&'static self, level: LevelFilter) -> Result<(), SetLoggerError> {
        set_logger(self)?;
        set_max_level(level);

        Ok(())
    }

    fn format(&self, record: &log::Record<'_>) -> String {
        let timestamp = self.origin.get_or_init(Instant::now).elapsed();
        let mins = timestamp.as_secs() / 60;
        let submin_secs = timestamp.as_secs() % 60;

        format!(
            "{:02}:{:02}:{:03} {}[{}]\x1B[0m {}",
            mins,
            submin_secs,
            timestamp.subsec_millis(),
            ESCAPES[record.level() as usize].unwrap_or_default(),
            record.level(),
            record.args()
        )
    }
}

impl Default for StdoutLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            println!("{}", self.format(record));
        }
    }

    fn flush(&self) {}
}

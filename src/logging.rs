//! Logger setup.

use std::fmt;

/// Installs a stdout logger printing `[HH:MM:SS.mmm LEVEL target] message` lines.
pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                Line {
                    time: chrono::Local::now().format("%H:%M:%S%.3f"),
                    level: record.level(),
                    target: record.target(),
                    message,
                }
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
}

struct Line<'a, T, M> {
    time: T,
    level: log::Level,
    target: &'a str,
    message: M,
}

impl<T: fmt::Display, M: fmt::Display> fmt::Display for Line<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {:<5} {}] {}",
            self.time, self.level, self.target, self.message
        )
    }
}

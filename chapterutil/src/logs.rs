//! Levelled progress logging.
//!
//! Entries carry a level and an indentation depth and are rendered with the
//! same prefixes the CLI has always printed. Output goes through the `log`
//! facade, so the binary decides where it lands (see [`init`]).

use std::io::Write;

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Optional indentation level (for nested logs)
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Text as printed: indentation, level prefix, message.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }

    /// Send this entry to the installed logger.
    pub fn emit(&self) {
        let level = match self.level {
            LogLevel::Info | LogLevel::Success => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        };
        log::log!(level, "{}", self.render());
    }
}

/// Install the stderr logger.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `warn` when `quiet`.
pub fn init(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init();
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LogEntry::info(msg).emit();
}

pub fn log_success(msg: impl Into<String>) {
    LogEntry::success(msg).emit();
}

pub fn log_warning(msg: impl Into<String>) {
    LogEntry::warning(msg).emit();
}

pub fn log_error(msg: impl Into<String>) {
    LogEntry::error(msg).emit();
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LogEntry::info(msg).with_indent(indent).emit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prefixes() {
        assert_eq!(LogEntry::info("Reading").render(), "    Reading");
        assert_eq!(LogEntry::success("Done").render(), "   ✓ Done");
        assert_eq!(LogEntry::error("Bad").render(), "   ❌ Bad");
    }

    #[test]
    fn test_render_indent() {
        let entry = LogEntry::success("nested").with_indent(2);
        assert_eq!(entry.render(), "         ✓ nested");
    }
}

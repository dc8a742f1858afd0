//! Logging support for the broker
//!
//! Events are rendered as `[CODE] message key=value ...` and handed to the
//! `log` facade under the `hostfacts` target. The library never installs a
//! logger; binaries choose one (the SDK CLI uses `env_logger`).

pub mod codes;
pub mod macros;

pub use codes::Code;
pub use log::Level;

/// Target used for every event emitted by this crate
pub const TARGET: &str = "hostfacts";

/// Whether events at `level` would be recorded by the installed logger
pub fn enabled(level: Level) -> bool {
    log::log_enabled!(target: TARGET, level)
}

/// Emit one event (used by the logging macros)
pub fn emit(level: Level, code: Option<Code>, message: &str, context: &[(&str, String)]) {
    if !enabled(level) {
        return;
    }
    log::log!(target: TARGET, level, "{}", render(code, message, context));
}

/// Render an event line without emitting it
pub fn render(code: Option<Code>, message: &str, context: &[(&str, String)]) -> String {
    let mut line = String::with_capacity(message.len() + 16 * context.len() + 8);

    if let Some(code) = code {
        line.push('[');
        line.push_str(code.as_str());
        line.push_str("] ");
    }
    line.push_str(message);

    for (key, value) in context {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        if value.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(value);
            line.push('"');
        } else {
            line.push_str(value);
        }
    }

    line
}

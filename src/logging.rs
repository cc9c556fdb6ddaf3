//! Logging bootstrap for the command-line tool.
//!
//! The library only talks to the `log` facade. The binary installs a
//! `flexi_logger` backend writing to stderr, so stdout stays reserved for
//! the round table.
//!
//! Messages use `event=<name> key=value ...` so they stay grep-able.

use flexi_logger::{Logger, LoggerHandle};
use log::info;

const SUPPORTED_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Start stderr logging at `level`, unless `RUST_LOG` overrides it.
///
/// The returned handle must stay alive for the life of the process.
///
/// # Errors
///
/// Returns a human-readable message for an unsupported level or a backend
/// start failure.
pub fn init_logging(level: &str) -> Result<LoggerHandle, String> {
    let level = normalize_level(level)?;

    let handle = Logger::try_with_env_or_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .format(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=app_start status=ok level={} version={}",
        level,
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}

/// Lower-case and check a level name.
pub fn normalize_level(level: &str) -> Result<&'static str, String> {
    let lowered = level.trim().to_ascii_lowercase();
    SUPPORTED_LEVELS
        .iter()
        .copied()
        .find(|candidate| *candidate == lowered)
        .ok_or_else(|| {
            format!(
                "unsupported log level `{level}`; expected one of {}",
                SUPPORTED_LEVELS.join(", ")
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("INFO"), Ok("info"));
        assert_eq!(normalize_level(" debug "), Ok("debug"));
        assert!(normalize_level("verbose").is_err());
        assert!(normalize_level("").is_err());
    }
}

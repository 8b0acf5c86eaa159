//! Debug infrastructure with per-module loggers.
//!
//! Control via DEBUG environment variable:
//! - `DEBUG=*` - Enable all loggers
//! - `DEBUG=session` - Enable only the session logger
//! - `DEBUG=session,eval` - Enable multiple
//!
//! Verbosity via DEBUG_VERBOSITY (0-3, default 1). Level 1 emits `log!`,
//! level 2 and above also emits `log_detail!`. Warnings and errors are
//! always emitted.
//!
//! Loggers are thin wrappers over the `log` facade: the logger name is the
//! record target, so any `log`-compatible backend can consume them.
//! [`init`] installs `env_logger` with filters derived from the variables
//! above.

use log::Level;
use std::collections::HashSet;
use std::env;
use std::sync::OnceLock;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum EnabledConfig {
    All,
    None,
    Some(HashSet<String>),
}

struct GlobalConfig {
    enabled: EnabledConfig,
    verbosity: u8,
}

static CONFIG: OnceLock<GlobalConfig> = OnceLock::new();

fn parse_enabled(value: Option<&str>) -> EnabledConfig {
    match value {
        None | Some("") => EnabledConfig::None,
        Some("*") | Some("1") | Some("true") => EnabledConfig::All,
        Some(value) => {
            let set: HashSet<_> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if set.is_empty() {
                EnabledConfig::None
            } else {
                EnabledConfig::Some(set)
            }
        }
    }
}

fn parse_verbosity(value: Option<&str>) -> u8 {
    value
        .and_then(|v| v.parse().ok())
        .map(|v: u8| v.min(3))
        .unwrap_or(1)
}

fn get_config() -> &'static GlobalConfig {
    CONFIG.get_or_init(|| GlobalConfig {
        enabled: parse_enabled(env::var("DEBUG").ok().as_deref()),
        verbosity: parse_verbosity(env::var("DEBUG_VERBOSITY").ok().as_deref()),
    })
}

fn is_enabled(name: &str) -> bool {
    match &get_config().enabled {
        EnabledConfig::None => false,
        EnabledConfig::All => true,
        EnabledConfig::Some(set) => set.contains(name),
    }
}

fn detail_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Build an `env_logger` filter spec from the DEBUG settings.
///
/// Every target gets `warn` so faults are never silent; enabled loggers are
/// raised to `debug` or `trace` depending on verbosity.
fn filter_spec(enabled: &EnabledConfig, verbosity: u8) -> String {
    let level = detail_level(verbosity);
    match enabled {
        EnabledConfig::None => "warn".to_string(),
        EnabledConfig::All => level.to_string(),
        EnabledConfig::Some(set) => {
            let mut names: Vec<&String> = set.iter().collect();
            names.sort();
            let mut spec = String::from("warn");
            for name in names {
                spec.push_str(&format!(",{}={}", name, level));
            }
            spec
        }
    }
}

/// Install `env_logger` as the `log` backend, writing to stderr.
///
/// Safe to call more than once; only the first call installs a backend.
pub fn init() {
    let config = get_config();
    let spec = filter_spec(&config.enabled, config.verbosity);
    let _ = env_logger::Builder::new()
        .parse_filters(&spec)
        .format_timestamp(None)
        .format_target(true)
        .try_init();
}

// ============================================================================
// Logger
// ============================================================================

pub struct Logger {
    name: &'static str,
    enabled: bool,
}

impl Logger {
    pub const fn disabled(name: &'static str) -> Self {
        Self { name, enabled: false }
    }

    fn active(name: &'static str) -> Self {
        Self { name, enabled: true }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn log(&self, msg: &str) {
        if self.enabled && get_config().verbosity >= 1 {
            log::log!(target: self.name, Level::Debug, "{}", msg);
        }
    }

    #[inline]
    pub fn detail(&self, msg: &str) {
        if self.enabled && get_config().verbosity >= 2 {
            log::log!(target: self.name, Level::Trace, "{}", msg);
        }
    }

    /// Warnings bypass the DEBUG switch.
    #[inline]
    pub fn warn(&self, msg: &str) {
        log::log!(target: self.name, Level::Warn, "{}", msg);
    }

    /// Errors bypass the DEBUG switch.
    #[inline]
    pub fn error(&self, msg: &str) {
        log::log!(target: self.name, Level::Error, "{}", msg);
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create a logger. The name must be a static string.
pub fn create_logger(name: &'static str) -> Logger {
    if is_enabled(name) {
        Logger::active(name)
    } else {
        Logger::disabled(name)
    }
}

// ============================================================================
// Macros - avoid format! cost when disabled
// ============================================================================

#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.log(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_detail {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.detail(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enabled() {
        assert_eq!(parse_enabled(None), EnabledConfig::None);
        assert_eq!(parse_enabled(Some("")), EnabledConfig::None);
        assert_eq!(parse_enabled(Some("*")), EnabledConfig::All);
        assert_eq!(parse_enabled(Some(" , ")), EnabledConfig::None);
        match parse_enabled(Some("session, eval")) {
            EnabledConfig::Some(set) => {
                assert!(set.contains("session"));
                assert!(set.contains("eval"));
                assert_eq!(set.len(), 2);
            }
            other => panic!("expected a module set, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_verbosity() {
        assert_eq!(parse_verbosity(None), 1);
        assert_eq!(parse_verbosity(Some("2")), 2);
        assert_eq!(parse_verbosity(Some("9")), 3);
        assert_eq!(parse_verbosity(Some("loud")), 1);
    }

    #[test]
    fn test_filter_spec() {
        assert_eq!(filter_spec(&EnabledConfig::None, 1), "warn");
        assert_eq!(filter_spec(&EnabledConfig::All, 1), "debug");
        assert_eq!(filter_spec(&EnabledConfig::All, 3), "trace");
        let set: HashSet<String> = ["session".to_string(), "eval".to_string()].into();
        assert_eq!(
            filter_spec(&EnabledConfig::Some(set), 1),
            "warn,eval=debug,session=debug"
        );
    }

    #[test]
    fn test_disabled_logger_keeps_name() {
        let logger = Logger::disabled("repl");
        assert!(!logger.enabled());
        assert_eq!(logger.name(), "repl");
        // Must not panic without a backend installed.
        crate::log!(logger, "ignored {}", 1);
        crate::log_warn!(logger, "still routed {}", 2);
    }
}

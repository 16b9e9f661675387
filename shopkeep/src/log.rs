//! Structured JSON logging to stderr.
//!
//! Each line is one JSON object:
//!
//! ```json
//! {"level":"info","msg":"user created","user_id":"7","ts":"2025-01-16T10:30:00.000Z"}
//! {"level":"debug","msg":"statement","dialect":"sqlite","sql":"SELECT ...","params":"2","ts":"2025-01-16T10:30:00.004Z"}
//! ```
//!
//! Field values are rendered with `Display` and always emitted as JSON
//! strings. Bound parameter values are never logged, only their count.
//!
//! # Structured Logging Usage
//!
//! ```no_run
//! # use shopkeep::log;
//! let user_id = 7;
//! log!(info, "user created", user_id: user_id, username: "alice");
//! log!(warn, "delete refused", reason: "has subcategories");
//! ```
//!
//! # Level Filter
//!
//! Lines below the process-wide minimum level are dropped before their
//! fields are formatted. The default minimum is [`Level::Info`]; the CLI
//! sets it from configuration with [`set_min_level`].

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{SecondsFormat, Utc};

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Statement tracing and other diagnostics.
    Debug = 0,
    /// Normal operations.
    Info = 1,
    /// Refused or suspicious operations.
    Warn = 2,
    /// Failures.
    Error = 3,
}

impl Level {
    /// Lower-case name as written to the `level` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warn,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Set the process-wide minimum level.
pub fn set_min_level(level: Level) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Current process-wide minimum level.
#[must_use]
pub fn min_level() -> Level {
    Level::from_u8(MIN_LEVEL.load(Ordering::Relaxed))
}

/// Whether a line at `level` would be written.
#[inline]
#[must_use]
pub fn enabled(level: Level) -> bool {
    level >= min_level()
}

/// Format the current time as ISO 8601 UTC with millisecond precision.
#[doc(hidden)]
#[must_use]
pub fn __format_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Escape a string for use inside a JSON string literal.
#[doc(hidden)]
#[must_use]
pub fn __escape_json(s: &str) -> String {
    let quoted = miniserde::json::to_string(s);
    quoted
        .strip_prefix('"')
        .and_then(|q| q.strip_suffix('"'))
        .map_or_else(|| quoted.clone(), str::to_string)
}

/// Map a macro level identifier (`debug`, `info`, `warn`, `error`) to a [`Level`].
#[doc(hidden)]
#[must_use]
pub fn __level(name: &str) -> Level {
    name.parse().unwrap_or(Level::Info)
}

/// Build a structured JSON log line with key-value pairs.
#[doc(hidden)]
#[must_use]
pub fn __build_structured_log(level: Level, msg: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(64 + msg.len() + fields.len() * 32);

    output.push_str(r#"{"level":""#);
    output.push_str(level.as_str());
    output.push_str(r#"","msg":""#);
    output.push_str(&__escape_json(msg));
    output.push('"');

    for (key, value) in fields {
        output.push_str(r#",""#);
        output.push_str(&__escape_json(key));
        output.push_str(r#"":""#);
        output.push_str(&__escape_json(value));
        output.push('"');
    }

    output.push_str(r#","ts":""#);
    output.push_str(&__format_timestamp());
    output.push_str(r#""}"#);

    output
}

/// Write a finished line to stderr.
#[doc(hidden)]
pub fn __emit(line: &str) {
    use std::io::Write;
    let _ = writeln!(std::io::stderr(), "{line}");
}

/// Structured logging macro with key-value pairs.
///
/// ```no_run
/// # use shopkeep::log;
/// log!(info, "category hidden", id: 4, visibility: 0);
/// log!(debug, "server started");
/// ```
#[macro_export]
macro_rules! log {
    ($level:ident, $msg:expr $(, $key:ident : $value:expr)* $(,)?) => {{
        let level = $crate::log::__level(stringify!($level));
        if $crate::log::enabled(level) {
            let fields: &[(&str, &str)] = &[
                $( (stringify!($key), &format!("{}", $value)) ),*
            ];
            $crate::log::__emit(&$crate::log::__build_structured_log(level, $msg, fields));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_json_simple() {
        assert_eq!(__escape_json("hello"), "hello");
    }

    #[test]
    fn test_escape_json_quotes_and_backslash() {
        assert_eq!(__escape_json(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(__escape_json(r"C:\shop"), r"C:\\shop");
    }

    #[test]
    fn test_escape_json_control_chars() {
        assert_eq!(__escape_json("a\nb\tc"), "a\\nb\\tc");
        assert!(__escape_json("\u{1}").starts_with("\\u"));
    }

    #[test]
    fn test_structured_line_shape() {
        let line = __build_structured_log(
            Level::Warn,
            "delete refused",
            &[("table", "categories"), ("id", "4")],
        );
        assert!(line.starts_with(
            r#"{"level":"warn","msg":"delete refused","table":"categories","id":"4","ts":""#
        ));
        assert!(line.ends_with(r#"Z"}"#));
    }

    #[test]
    fn test_structured_line_escapes_values() {
        let line = __build_structured_log(Level::Info, "m", &[("sql", r#"SELECT "x""#)]);
        assert!(line.contains(r#""sql":"SELECT \"x\"""#));
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("DEBUG".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert!("verbose".parse::<Level>().is_err());
        assert_eq!(__level("error"), Level::Error);
    }

    #[test]
    fn test_min_level_filters_lines() {
        set_min_level(Level::Error);
        assert!(!enabled(Level::Warn));
        assert!(enabled(Level::Error));
        crate::log!(warn, "dropped before formatting", id: 4);
        set_min_level(Level::Info);
        assert!(enabled(Level::Info));
        assert!(!enabled(Level::Debug));
    }

    #[test]
    fn test_level_order() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_timestamp_format() {
        let ts = __format_timestamp();
        // 2025-01-16T10:30:00.000Z
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }
}

//! Rendering of durations given in seconds.

use std::fmt;

/// How report durations are displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DurationFormat {
    /// Human readable, e.g. `1h 5m 30s`.
    #[default]
    Auto,
    Seconds,
    Minutes,
    Hours,
}

impl DurationFormat {
    /// Every format, in the order shown in help text.
    pub const ALL: [Self; 4] = [Self::Auto, Self::Seconds, Self::Minutes, Self::Hours];

    /// Parses a one-letter format code (`a`, `s`, `m`, `h`).
    ///
    /// Unrecognized codes fall back to [`DurationFormat::Auto`].
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "s" => Self::Seconds,
            "m" => Self::Minutes,
            "h" => Self::Hours,
            _ => Self::Auto,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Auto => "a",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
        }
    }

    /// Formats a duration. Negative durations render as zero.
    pub fn format(self, seconds: i64) -> String {
        let seconds = seconds.max(0);
        match self {
            Self::Auto => seconds_to_human(seconds),
            Self::Seconds => format!("{seconds} seconds"),
            Self::Minutes => format!("{} minutes", seconds / 60),
            Self::Hours => format!("{} hours", seconds / 3600),
        }
    }
}

impl fmt::Display for DurationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `Xh Ym Zs`, leaving out zero components.
fn seconds_to_human(seconds: i64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}

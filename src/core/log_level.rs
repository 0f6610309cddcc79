//! Log level definitions

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

/// Call-site floor selected by the `filter-*` cargo features.
///
/// Macros compile messages below this level into a branch that never
/// formats its arguments. FATAL is emitted regardless.
pub const STATIC_FILTER_LEVEL: LogLevel = if cfg!(feature = "filter-fatal") {
    LogLevel::Fatal
} else if cfg!(feature = "filter-error") {
    LogLevel::Error
} else if cfg!(feature = "filter-warn") {
    LogLevel::Warn
} else if cfg!(feature = "filter-info") {
    LogLevel::Info
} else if cfg!(feature = "filter-trace") {
    LogLevel::Trace
} else {
    LogLevel::Debug
};

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Name for a raw numeric level; values outside 0..=5 render as `OTHER`
    pub fn name_of(raw: u8) -> &'static str {
        LogLevel::try_from(raw).map_or("OTHER", |level| level.to_str())
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether the call-site macros emit this level at all
    #[inline]
    pub const fn is_statically_enabled(self) -> bool {
        matches!(self, LogLevel::Fatal) || self as u8 >= STATIC_FILTER_LEVEL as u8
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0 => Ok(LogLevel::Trace),
            1 => Ok(LogLevel::Debug),
            2 => Ok(LogLevel::Info),
            3 => Ok(LogLevel::Warn),
            4 => Ok(LogLevel::Error),
            5 => Ok(LogLevel::Fatal),
            other => Err(other),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` keeps width/alignment flags working, e.g. `{:<5}`
        f.pad(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ordering() {
        for (index, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(level.as_u8() as usize, index);
        }
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_unknown_raw_level_is_other() {
        assert_eq!(LogLevel::name_of(3), "WARN");
        assert_eq!(LogLevel::name_of(6), "OTHER");
        assert_eq!(LogLevel::name_of(u8::MAX), "OTHER");
        assert_eq!(LogLevel::try_from(9), Err(9));
    }

    #[test]
    fn test_display_honors_padding() {
        assert_eq!(format!("{:<5}|", LogLevel::Warn), "WARN |");
        assert_eq!(format!("{:<5}|", LogLevel::Error), "ERROR|");
        assert_eq!(LogLevel::Info.to_string(), "INFO");
    }

    #[test]
    fn test_fatal_always_statically_enabled() {
        assert!(LogLevel::Fatal.is_statically_enabled());
        assert_eq!(
            LogLevel::Trace.is_statically_enabled(),
            STATIC_FILTER_LEVEL == LogLevel::Trace
        );
    }

    #[test]
    fn test_parse_accepts_warning_alias() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}

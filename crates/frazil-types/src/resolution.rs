//! Bar resolution registry.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Bar resolution.
///
/// [`Resolution::Tick`] is the zero-duration passthrough resolution: the
/// normalized event stream itself is archived without bucketing. The
/// remaining resolutions define the bucket width for OHLCV aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Raw normalized events (no aggregation).
    #[default]
    Tick,
    /// 1-second bars.
    Second,
    /// 1-minute bars.
    Minute,
    /// 1-hour bars.
    Hour,
    /// Daily bars.
    Daily,
}

impl Resolution {
    /// Returns the bucket width in milliseconds, or `None` for tick data.
    #[must_use]
    pub const fn millis(&self) -> Option<i64> {
        match self {
            Self::Tick => None,
            Self::Second => Some(1_000),
            Self::Minute => Some(60_000),
            Self::Hour => Some(3_600_000),
            Self::Daily => Some(86_400_000),
        }
    }

    /// Returns true if this is the tick passthrough resolution.
    #[must_use]
    pub const fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }

    /// Returns the resolution as the directory name used in archive paths.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Daily => "daily",
        }
    }

    /// Returns every resolution, tick passthrough included.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Tick,
            Self::Second,
            Self::Minute,
            Self::Hour,
            Self::Daily,
        ]
    }

    /// Returns the bucketed resolutions (everything except tick).
    #[must_use]
    pub const fn bar_resolutions() -> &'static [Self] {
        &[Self::Second, Self::Minute, Self::Hour, Self::Daily]
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tick" => Ok(Self::Tick),
            "second" | "s" | "1s" => Ok(Self::Second),
            "minute" | "m" | "1m" => Ok(Self::Minute),
            "hour" | "h" | "1h" => Ok(Self::Hour),
            "daily" | "day" | "d" | "1d" => Ok(Self::Daily),
            _ => Err(ResolutionParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid resolution string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionParseError(String);

impl std::fmt::Display for ResolutionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid resolution '{}', expected one of: tick, second, minute, hour, daily",
            self.0
        )
    }
}

impl std::error::Error for ResolutionParseError {}

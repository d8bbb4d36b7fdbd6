//! Wait limits for the camera, written as `5s`, `2m` or `1m30s`

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// How long to wait for the first camera frame (5 seconds)
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 5;

/// How long to wait for a camera device to start streaming (15 seconds)
pub const DEFAULT_OPEN_TIMEOUT_SECS: u64 = 15;

/// A positive wait limit with millisecond resolution.
///
/// Parsed from the `camera.ready_timeout` setting and printed back in
/// the same notation, so `90s` round-trips as `1m30s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    millis: u64,
}

impl Duration {
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            millis: secs.saturating_mul(1000),
        }
    }

    pub const fn default_ready_timeout() -> Self {
        Self::from_secs(DEFAULT_READY_TIMEOUT_SECS)
    }

    pub const fn default_open_timeout() -> Self {
        Self::from_secs(DEFAULT_OPEN_TIMEOUT_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.millis / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// For `tokio::time::timeout` and friends
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.millis)
    }
}

/// A run of ASCII digits. Rejects signs, blanks and values beyond `u64`.
fn parse_count(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Accepts `<n>m`, `<n>s` or `<n>m<n>s`, case-insensitive. Zero and
    /// anything that does not fit in milliseconds are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };
        let text = s.trim().to_ascii_lowercase();

        let (minutes, rest) = match text.split_once('m') {
            Some((minutes, rest)) => (Some(minutes), rest),
            None => (None, text.as_str()),
        };
        let seconds = match rest {
            "" => None,
            rest => Some(rest.strip_suffix('s').ok_or_else(invalid)?),
        };
        if minutes.is_none() && seconds.is_none() {
            return Err(invalid());
        }

        let minutes = minutes.map_or(Some(0), parse_count).ok_or_else(invalid)?;
        let seconds = seconds.map_or(Some(0), parse_count).ok_or_else(invalid)?;

        let millis = minutes
            .checked_mul(60)
            .and_then(|secs| secs.checked_add(seconds))
            .and_then(|secs| secs.checked_mul(1000))
            .filter(|&millis| millis > 0)
            .ok_or_else(invalid)?;

        Ok(Self { millis })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (minutes, seconds) = (self.as_secs() / 60, self.as_secs() % 60);

        match (minutes, seconds) {
            (0, s) => write!(f, "{}s", s),
            (m, 0) => write!(f, "{}m", m),
            (m, s) => write!(f, "{}m{}s", m, s),
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_ready_timeout()
    }
}

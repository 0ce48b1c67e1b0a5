use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fmt;
use std::str::FromStr;

/// Largest shift accepted in either direction, in hours.
pub const MAX_OFFSET_HOURS: i32 = 14;

/// A fixed whole-hour shift from UTC. No timezone database, no DST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UtcOffset {
    hours: i32,
}

impl UtcOffset {
    pub const UTC: UtcOffset = UtcOffset { hours: 0 };

    pub fn from_hours(hours: i32) -> Option<Self> {
        (hours.abs() <= MAX_OFFSET_HOURS).then_some(Self { hours })
    }

    pub fn hours(&self) -> i32 {
        self.hours
    }

    /// Parse an optional descriptor, degrading to UTC when absent or malformed.
    pub fn from_setting(descriptor: Option<&str>) -> Self {
        descriptor
            .and_then(|d| d.parse().ok())
            .unwrap_or(Self::UTC)
    }

    /// Shift a UTC instant into this offset.
    pub fn apply(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.hours * 3600).unwrap_or_else(|| Utc.fix());
        instant.with_timezone(&offset)
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours < 0 {
            write!(f, "UTC{}", self.hours)
        } else {
            write!(f, "UTC+{}", self.hours)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOffsetError {
    MissingPrefix,
    InvalidHours(String),
    OutOfRange(i32),
}

impl fmt::Display for ParseOffsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseOffsetError::MissingPrefix => write!(f, "timezone must start with 'UTC'"),
            ParseOffsetError::InvalidHours(s) => write!(f, "invalid hour offset '{}'", s),
            ParseOffsetError::OutOfRange(h) => write!(
                f,
                "hour offset {} outside -{}..=+{}",
                h, MAX_OFFSET_HOURS, MAX_OFFSET_HOURS
            ),
        }
    }
}

impl std::error::Error for ParseOffsetError {}

/// Parses `UTC±N`, case-insensitive. The sign is optional for positive offsets,
/// and a bare `UTC` means no shift.
/// Example: "UTC+2" -> 2, "utc-5" -> -5, "UTC3" -> 3
impl FromStr for UtcOffset {
    type Err = ParseOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rest = match s.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("utc") => s[3..].trim(),
            _ => return Err(ParseOffsetError::MissingPrefix),
        };

        if rest.is_empty() {
            return Ok(Self::UTC);
        }

        let (negative, digits) = match rest.as_bytes()[0] {
            b'+' => (false, &rest[1..]),
            b'-' => (true, &rest[1..]),
            _ => (false, rest),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseOffsetError::InvalidHours(rest.to_string()));
        }

        let magnitude: i32 = digits
            .parse()
            .map_err(|_| ParseOffsetError::InvalidHours(rest.to_string()))?;
        let hours = if negative { -magnitude } else { magnitude };

        Self::from_hours(hours).ok_or(ParseOffsetError::OutOfRange(hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_offset() {
        assert_eq!("UTC+2".parse::<UtcOffset>().unwrap().hours(), 2);
        assert_eq!("utc-5".parse::<UtcOffset>().unwrap().hours(), -5);
        assert_eq!("UTC3".parse::<UtcOffset>().unwrap().hours(), 3);
        assert_eq!(" Utc+10 ".parse::<UtcOffset>().unwrap().hours(), 10);
        assert_eq!("UTC".parse::<UtcOffset>().unwrap(), UtcOffset::UTC);
    }

    #[test]
    fn test_parse_offset_invalid() {
        assert_eq!(
            "GMT+2".parse::<UtcOffset>(),
            Err(ParseOffsetError::MissingPrefix)
        );
        assert!(matches!(
            "UTC+two".parse::<UtcOffset>(),
            Err(ParseOffsetError::InvalidHours(_))
        ));
        assert!(matches!(
            "UTC+".parse::<UtcOffset>(),
            Err(ParseOffsetError::InvalidHours(_))
        ));
        assert!(matches!(
            "UTC+1.5".parse::<UtcOffset>(),
            Err(ParseOffsetError::InvalidHours(_))
        ));
        assert_eq!(
            "UTC+20".parse::<UtcOffset>(),
            Err(ParseOffsetError::OutOfRange(20))
        );
        assert!("".parse::<UtcOffset>().is_err());
    }

    #[test]
    fn test_from_setting_defaults_to_utc() {
        assert_eq!(UtcOffset::from_setting(None), UtcOffset::UTC);
        assert_eq!(UtcOffset::from_setting(Some("nonsense")), UtcOffset::UTC);
        assert_eq!(UtcOffset::from_setting(Some("UTC-3")).hours(), -3);
    }

    #[test]
    fn test_apply_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let shifted = UtcOffset::from_hours(2).unwrap().apply(instant);
        assert_eq!(
            shifted.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-01 02:00:00"
        );

        let behind = UtcOffset::from_hours(-1).unwrap().apply(instant);
        assert_eq!(behind.format("%Y-%m-%d").to_string(), "2023-12-31");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for hours in [-12, -1, 0, 5, 14] {
            let offset = UtcOffset::from_hours(hours).unwrap();
            assert_eq!(offset.to_string().parse::<UtcOffset>(), Ok(offset));
        }
    }
}

//! Session time zone handling.

use std::str::FromStr;

use chrono::{
    FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use common_error::QuarryError;

use super::value::UNIX_EPOCH_DAYS_FROM_CE;

/// The session time zone.
///
/// Accepted identifiers: `UTC`, `GMT`, `Z`, `+HH:MM`, `-HH:MM`, `+HHMM`,
/// `+HH`, optionally prefixed with `UTC` or `GMT` (e.g. `UTC+05:30`), and
/// IANA region names such as `Europe/Berlin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimeZone {
    id: String,
    zone: Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Fixed(FixedOffset),
    Region(Tz),
}

impl SessionTimeZone {
    /// The UTC time zone.
    pub fn utc() -> Self {
        Self {
            id: "UTC".to_string(),
            zone: Zone::Fixed(Utc.fix()),
        }
    }

    /// The identifier this zone was parsed from.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Offset east of UTC in seconds, for zones without daylight saving rules.
    pub fn fixed_offset_seconds(&self) -> Option<i32> {
        match self.zone {
            Zone::Fixed(offset) => Some(offset.local_minus_utc()),
            Zone::Region(_) => None,
        }
    }

    /// Interpret a wall-clock time in this zone and return UTC nanoseconds.
    ///
    /// An ambiguous time (clocks set back) resolves to the earlier instant.
    /// A time skipped by a forward transition is read with the offset in
    /// effect before the transition, which lands after the gap.
    pub fn local_to_utc_nanos(&self, local: &NaiveDateTime) -> Option<i64> {
        let offset_seconds = match self.zone {
            Zone::Fixed(offset) => offset.local_minus_utc(),
            Zone::Region(tz) => match tz.offset_from_local_datetime(local) {
                LocalResult::Single(offset) => offset.fix().local_minus_utc(),
                LocalResult::Ambiguous(earliest, _) => earliest.fix().local_minus_utc(),
                LocalResult::None => {
                    let before = local.checked_sub_signed(TimeDelta::days(1))?;
                    tz.offset_from_utc_datetime(&before).fix().local_minus_utc()
                }
            },
        };
        local
            .checked_sub_signed(TimeDelta::seconds(i64::from(offset_seconds)))?
            .and_utc()
            .timestamp_nanos_opt()
    }

    /// UTC nanoseconds of local midnight on the given day.
    pub fn date_to_utc_nanos(&self, days_since_epoch: i32) -> Option<i64> {
        let midnight = NaiveDate::from_num_days_from_ce_opt(
            days_since_epoch.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?,
        )?
        .and_hms_opt(0, 0, 0)?;
        self.local_to_utc_nanos(&midnight)
    }
}

impl Default for SessionTimeZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl std::fmt::Display for SessionTimeZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl FromStr for SessionTimeZone {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        let invalid = || QuarryError::invalid_parameter(format!("unsupported time zone '{s}'"));

        let zone = match parse_fixed_offset(id) {
            Some(offset) => Zone::Fixed(offset),
            None => Zone::Region(id.parse::<Tz>().map_err(|_| invalid())?),
        };
        Ok(Self {
            id: id.to_string(),
            zone,
        })
    }
}

/// `UTC`, `GMT`, `Z` or a signed offset, optionally prefixed with `UTC`/`GMT`.
fn parse_fixed_offset(id: &str) -> Option<FixedOffset> {
    let upper = id.to_ascii_uppercase();
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    let seconds = if rest.is_empty() || rest == "Z" {
        0
    } else {
        parse_offset_seconds(rest)?
    };
    FixedOffset::east_opt(seconds)
}

/// Parse `+HH`, `+HHMM` or `+HH:MM` (sign required) into seconds east of UTC.
fn parse_offset_seconds(s: &str) -> Option<i32> {
    let (sign, digits) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };

    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }

    Some(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn utc_nanos(raw: &str) -> i64 {
        SessionTimeZone::utc().local_to_utc_nanos(&local(raw)).unwrap()
    }

    #[test]
    fn test_parse_named_utc() {
        for id in ["UTC", "utc", "GMT", "Z", "UTC+00:00"] {
            let tz: SessionTimeZone = id.parse().unwrap();
            assert_eq!(tz.fixed_offset_seconds(), Some(0), "{id}");
        }
    }

    #[test]
    fn test_parse_offsets() {
        let tz: SessionTimeZone = "+08:00".parse().unwrap();
        assert_eq!(tz.fixed_offset_seconds(), Some(8 * 3600));
        assert_eq!(tz.id(), "+08:00");

        let tz: SessionTimeZone = "-0530".parse().unwrap();
        assert_eq!(tz.fixed_offset_seconds(), Some(-(5 * 3600 + 30 * 60)));

        let tz: SessionTimeZone = "UTC+3".parse().unwrap();
        assert_eq!(tz.fixed_offset_seconds(), Some(3 * 3600));
    }

    #[test]
    fn test_parse_region() {
        let tz: SessionTimeZone = "America/Los_Angeles".parse().unwrap();
        assert_eq!(tz.id(), "America/Los_Angeles");
        assert_eq!(tz.fixed_offset_seconds(), None);
        assert!("Europe/Berlin".parse::<SessionTimeZone>().is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for id in ["Mars/Olympus", "+25:00", "08:00", "+ab:cd", "+08:75"] {
            assert!(id.parse::<SessionTimeZone>().is_err(), "{id}");
        }
    }

    #[test]
    fn test_region_follows_daylight_saving() {
        let tz: SessionTimeZone = "America/Los_Angeles".parse().unwrap();
        // DST starts 2024-03-10 02:00 local: PST (-08:00) before, PDT (-07:00) after.
        assert_eq!(
            tz.local_to_utc_nanos(&local("2024-03-09 12:00:00")),
            Some(utc_nanos("2024-03-09 20:00:00"))
        );
        assert_eq!(
            tz.local_to_utc_nanos(&local("2024-03-11 12:00:00")),
            Some(utc_nanos("2024-03-11 19:00:00"))
        );
    }

    #[test]
    fn test_region_gap_and_overlap() {
        let tz: SessionTimeZone = "America/Los_Angeles".parse().unwrap();
        // 02:30 does not exist on 2024-03-10; read with the PST offset.
        assert_eq!(
            tz.local_to_utc_nanos(&local("2024-03-10 02:30:00")),
            Some(utc_nanos("2024-03-10 10:30:00"))
        );
        // 01:30 occurs twice on 2024-11-03; the PDT reading comes first.
        assert_eq!(
            tz.local_to_utc_nanos(&local("2024-11-03 01:30:00")),
            Some(utc_nanos("2024-11-03 08:30:00"))
        );
    }

    #[test]
    fn test_date_to_utc_nanos() {
        let tz: SessionTimeZone = "+01:00".parse().unwrap();
        assert_eq!(tz.date_to_utc_nanos(0), Some(-3_600_000_000_000));
        assert_eq!(SessionTimeZone::utc().date_to_utc_nanos(1), Some(86_400_000_000_000));

        let berlin: SessionTimeZone = "Europe/Berlin".parse().unwrap();
        // 2024-07-01 is day 19905; Berlin is on CEST (+02:00).
        assert_eq!(
            berlin.date_to_utc_nanos(19_905),
            Some(utc_nanos("2024-06-30 22:00:00"))
        );
    }
}

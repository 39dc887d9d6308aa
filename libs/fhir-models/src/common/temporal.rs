//! Partial date/time values
//!
//! FHIR `date`, `dateTime`, `instant` and `time` values may be partial
//! (e.g. `2024` or `2024-03`). These types keep the parsed chrono value
//! together with the precision that was actually written.

use super::error::{Error, Result};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimePrecision {
    Hour,
    Minute,
    Second,
    Millisecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateTimePrecision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

/// A date with year, month or day precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialDate {
    pub date: NaiveDate,
    pub precision: DatePrecision,
}

/// A time of day with hour to millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialTime {
    pub time: NaiveTime,
    pub precision: TimePrecision,
}

/// A date-time with optional time part and optional timezone offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialDateTime {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
    pub precision: DateTimePrecision,
}

fn invalid(type_name: &str, value: &str) -> Error {
    Error::InvalidPrimitive {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}

fn parse_date(s: &str) -> Option<(NaiveDate, DatePrecision)> {
    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    let parts: Vec<&str> = s.split('-').collect();
    if !parts.iter().all(|p| all_digits(p)) || parts[0].len() != 4 {
        return None;
    }

    match parts.as_slice() {
        [y] => NaiveDate::from_ymd_opt(y.parse().ok()?, 1, 1).map(|d| (d, DatePrecision::Year)),
        [y, m] if m.len() == 2 => NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
            .map(|d| (d, DatePrecision::Month)),
        [y, m, d] if m.len() == 2 && d.len() == 2 => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
                .map(|d| (d, DatePrecision::Day))
        }
        _ => None,
    }
}

fn parse_time(s: &str) -> Option<(NaiveTime, TimePrecision)> {
    let (main, frac) = match s.split_once('.') {
        Some((main, frac)) => (main, Some(frac)),
        None => (s, None),
    };

    let parts: Vec<&str> = main.split(':').collect();
    if parts.iter().any(|p| p.len() != 2 || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let (hour, minute, second, precision) = match parts.as_slice() {
        [hh] => (hh.parse().ok()?, 0, 0, TimePrecision::Hour),
        [hh, mm] => (hh.parse().ok()?, mm.parse().ok()?, 0, TimePrecision::Minute),
        [hh, mm, ss] => (
            hh.parse().ok()?,
            mm.parse().ok()?,
            ss.parse().ok()?,
            if frac.is_some() {
                TimePrecision::Millisecond
            } else {
                TimePrecision::Second
            },
        ),
        _ => return None,
    };

    let millis: u32 = match frac {
        Some(frac) if !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()) => {
            let digits: String = frac.chars().take(3).collect();
            format!("{:0<3}", digits).parse().ok()?
        }
        Some(_) => return None,
        None => 0,
    };

    NaiveTime::from_hms_milli_opt(hour, minute, second, millis).map(|t| (t, precision))
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    if tz == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = match tz.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, minutes) = tz[1..].split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn format_offset(offset: &FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
}

impl FromStr for PartialDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_date(s.trim())
            .map(|(date, precision)| Self { date, precision })
            .ok_or_else(|| invalid("date", s))
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.date;
        match self.precision {
            DatePrecision::Year => write!(f, "{:04}", d.year()),
            DatePrecision::Month => write!(f, "{:04}-{:02}", d.year(), d.month()),
            DatePrecision::Day => write!(f, "{:04}-{:02}-{:02}", d.year(), d.month(), d.day()),
        }
    }
}

impl FromStr for PartialTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_time(s.trim())
            .map(|(time, precision)| Self { time, precision })
            .ok_or_else(|| invalid("time", s))
    }
}

impl fmt::Display for PartialTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.time;
        match self.precision {
            TimePrecision::Hour => write!(f, "{:02}", t.hour()),
            TimePrecision::Minute => write!(f, "{:02}:{:02}", t.hour(), t.minute()),
            TimePrecision::Second => {
                write!(f, "{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())
            }
            TimePrecision::Millisecond => write!(
                f,
                "{:02}:{:02}:{:02}.{:03}",
                t.hour(),
                t.minute(),
                t.second(),
                t.nanosecond() / 1_000_000
            ),
        }
    }
}

impl FromStr for PartialDateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let midnight = NaiveTime::default();

        let Some((date_part, rest)) = raw.split_once('T') else {
            let (date, precision) = parse_date(raw).ok_or_else(|| invalid("dateTime", s))?;
            let precision = match precision {
                DatePrecision::Year => DateTimePrecision::Year,
                DatePrecision::Month => DateTimePrecision::Month,
                DatePrecision::Day => DateTimePrecision::Day,
            };
            return Ok(Self {
                local: NaiveDateTime::new(date, midnight),
                offset: None,
                precision,
            });
        };

        let (date, date_precision) = parse_date(date_part).ok_or_else(|| invalid("dateTime", s))?;
        if date_precision != DatePrecision::Day {
            return Err(invalid("dateTime", s));
        }

        let (time_part, offset) = if let Some(stripped) = rest.strip_suffix('Z') {
            (stripped, FixedOffset::east_opt(0))
        } else if let Some(pos) = rest.rfind(['+', '-']) {
            let offset = parse_offset(&rest[pos..]).ok_or_else(|| invalid("dateTime", s))?;
            (&rest[..pos], Some(offset))
        } else {
            (rest, None)
        };

        let (time, time_precision) = parse_time(time_part).ok_or_else(|| invalid("dateTime", s))?;
        let precision = match time_precision {
            TimePrecision::Hour => DateTimePrecision::Hour,
            TimePrecision::Minute => DateTimePrecision::Minute,
            TimePrecision::Second => DateTimePrecision::Second,
            TimePrecision::Millisecond => DateTimePrecision::Millisecond,
        };

        Ok(Self {
            local: NaiveDateTime::new(date, time),
            offset,
            precision,
        })
    }
}

impl fmt::Display for PartialDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = PartialDate {
            date: self.local.date(),
            precision: match self.precision {
                DateTimePrecision::Year => DatePrecision::Year,
                DateTimePrecision::Month => DatePrecision::Month,
                _ => DatePrecision::Day,
            },
        };
        write!(f, "{}", date)?;

        let time_precision = match self.precision {
            DateTimePrecision::Year | DateTimePrecision::Month | DateTimePrecision::Day => {
                return Ok(())
            }
            DateTimePrecision::Hour => TimePrecision::Hour,
            DateTimePrecision::Minute => TimePrecision::Minute,
            DateTimePrecision::Second => TimePrecision::Second,
            DateTimePrecision::Millisecond => TimePrecision::Millisecond,
        };
        let time = PartialTime {
            time: self.local.time(),
            precision: time_precision,
        };
        write!(f, "T{}", time)?;

        if let Some(offset) = &self.offset {
            write!(f, "{}", format_offset(offset))?;
        }
        Ok(())
    }
}

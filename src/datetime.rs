//! The four TOML date/time flavors.
//!
//! TOML distinguishes offset date-times, local date-times, local dates and
//! local times. [`Datetime`] carries one [`chrono`] value per flavor, so the
//! usual date arithmetic and field accessors come for free while parsing and
//! formatting follow the TOML grammar exactly:
//!
//! - the date/time separator may be `T`, `t` or a single space on input and
//!   is always `T` on output;
//! - the offset is `Z`, `z` or `±HH:MM` on input; zero offsets print as `Z`;
//! - fractional seconds are truncated to nanosecond (9-digit) precision and
//!   print with trailing zeros trimmed, omitted entirely when zero.
//!
//! Equality is variant-aware and field-by-field: `01:00:00+01:00` and
//! `00:00:00Z` name the same instant but are **not** equal values.
//!
//! ## Examples
//!
//! ```rust
//! use tomlet::Datetime;
//!
//! let dt: Datetime = "1979-05-27T07:32:00.999Z".parse().unwrap();
//! assert!(dt.is_offset_datetime());
//! assert_eq!(dt.year(), Some(1979));
//! assert_eq!(dt.to_string(), "1979-05-27T07:32:00.999Z");
//!
//! let date: Datetime = "1979-05-27".parse().unwrap();
//! assert_eq!(date.hour(), None);
//! ```

use crate::{Error, Result};
use chrono::{
    Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// A TOML date/time value, one variant per grammar flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datetime {
    /// Date, time and UTC offset, e.g. `1979-05-27T07:32:00-05:00`.
    Offset {
        datetime: NaiveDateTime,
        offset: FixedOffset,
    },
    /// Date and time without an offset, e.g. `1979-05-27T07:32:00`.
    LocalDatetime(NaiveDateTime),
    /// Date only, e.g. `1979-05-27`.
    LocalDate(NaiveDate),
    /// Time only, e.g. `07:32:00`.
    LocalTime(NaiveTime),
}

impl Datetime {
    /// Parses a TOML date/time string.
    ///
    /// The whole input must match one of the four flavors; trailing content
    /// is an error. Offsets in parse errors are relative to `s`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tomlet::Datetime;
    ///
    /// assert!(Datetime::parse("2000-02-29").is_ok());
    /// assert!(Datetime::parse("2001-02-29").is_err());
    /// assert!(Datetime::parse("07:32:00.123456789").is_ok());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if `s` does not match any TOML date/time
    /// format.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::parse("empty date-time string", 0));
        }
        if let Some(parsed) = Self::parse_date_leading(s)? {
            return Ok(parsed);
        }
        if let Some(parsed) = Self::parse_time_only(s)? {
            return Ok(parsed);
        }
        Err(Error::parse(
            format!("`{s}` does not match any TOML date-time format"),
            0,
        ))
    }

    /// `true` for the offset date-time variant.
    #[inline]
    #[must_use]
    pub const fn is_offset_datetime(&self) -> bool {
        matches!(self, Datetime::Offset { .. })
    }

    /// `true` for the local date-time variant.
    #[inline]
    #[must_use]
    pub const fn is_local_datetime(&self) -> bool {
        matches!(self, Datetime::LocalDatetime(_))
    }

    /// `true` for the local date variant.
    #[inline]
    #[must_use]
    pub const fn is_local_date(&self) -> bool {
        matches!(self, Datetime::LocalDate(_))
    }

    /// `true` for the local time variant.
    #[inline]
    #[must_use]
    pub const fn is_local_time(&self) -> bool {
        matches!(self, Datetime::LocalTime(_))
    }

    fn date_part(&self) -> Option<NaiveDate> {
        match self {
            Datetime::Offset { datetime, .. } => Some(datetime.date()),
            Datetime::LocalDatetime(datetime) => Some(datetime.date()),
            Datetime::LocalDate(date) => Some(*date),
            Datetime::LocalTime(_) => None,
        }
    }

    fn time_part(&self) -> Option<NaiveTime> {
        match self {
            Datetime::Offset { datetime, .. } => Some(datetime.time()),
            Datetime::LocalDatetime(datetime) => Some(datetime.time()),
            Datetime::LocalDate(_) => None,
            Datetime::LocalTime(time) => Some(*time),
        }
    }

    /// The year, for variants that carry a date.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.date_part().map(|d| d.year())
    }

    /// The month (1-12), for variants that carry a date.
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        self.date_part().map(|d| d.month())
    }

    /// The day of month (1-31), for variants that carry a date.
    #[must_use]
    pub fn day(&self) -> Option<u32> {
        self.date_part().map(|d| d.day())
    }

    /// The hour (0-23), for variants that carry a time.
    #[must_use]
    pub fn hour(&self) -> Option<u32> {
        self.time_part().map(|t| t.hour())
    }

    /// The minute (0-59), for variants that carry a time.
    #[must_use]
    pub fn minute(&self) -> Option<u32> {
        self.time_part().map(|t| t.minute())
    }

    /// The second (0-59), for variants that carry a time.
    #[must_use]
    pub fn second(&self) -> Option<u32> {
        self.time_part().map(|t| t.second())
    }

    /// The fractional second in nanoseconds, for variants that carry a time.
    #[must_use]
    pub fn nanosecond(&self) -> Option<u32> {
        self.time_part().map(|t| t.nanosecond())
    }

    /// The UTC offset in minutes, for the offset date-time variant.
    #[must_use]
    pub fn offset_minutes(&self) -> Option<i32> {
        match self {
            Datetime::Offset { offset, .. } => Some(offset.local_minus_utc() / 60),
            _ => None,
        }
    }

    /// Converts an offset date-time to a [`SystemTime`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] for the three local variants, which do not
    /// name an instant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tomlet::Datetime;
    ///
    /// let dt: Datetime = "1970-01-01T00:00:01Z".parse().unwrap();
    /// let t = dt.to_system_time().unwrap();
    /// assert_eq!(
    ///     t.duration_since(std::time::UNIX_EPOCH).unwrap().as_secs(),
    ///     1
    /// );
    ///
    /// let local: Datetime = "07:32:00".parse().unwrap();
    /// assert!(local.to_system_time().is_err());
    /// ```
    pub fn to_system_time(&self) -> Result<SystemTime> {
        match self {
            Datetime::Offset { datetime, offset } => {
                let utc = Utc.from_utc_datetime(&(*datetime - *offset));
                Ok(SystemTime::from(utc))
            }
            other => Err(Error::type_mismatch("offset date-time", other.describe())),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Datetime::Offset { .. } => "offset date-time",
            Datetime::LocalDatetime(_) => "local date-time",
            Datetime::LocalDate(_) => "local date",
            Datetime::LocalTime(_) => "local time",
        }
    }

    /// Parses the formats that begin with a full date. `Ok(None)` means the
    /// input is not date-shaped and other formats should be tried; `Err`
    /// means the input committed to this format and then went wrong.
    fn parse_date_leading(s: &str) -> Result<Option<Self>> {
        let bytes = s.as_bytes();
        let mut pos = 0;

        let Some(year) = read_digits(bytes, &mut pos, 4) else {
            return Ok(None);
        };
        if bytes.get(pos) != Some(&b'-') {
            return Ok(None);
        }
        pos += 1;
        let Some(month) = read_digits(bytes, &mut pos, 2) else {
            return Ok(None);
        };
        if !(1..=12).contains(&month) || bytes.get(pos) != Some(&b'-') {
            return Ok(None);
        }
        pos += 1;
        let Some(day) = read_digits(bytes, &mut pos, 2) else {
            return Ok(None);
        };
        // Validates the day against the month, leap years included.
        let Some(date) = NaiveDate::from_ymd_opt(year as i32, month, day) else {
            return Ok(None);
        };

        if pos == bytes.len() {
            return Ok(Some(Datetime::LocalDate(date)));
        }
        match bytes[pos] {
            b'T' | b't' | b' ' => pos += 1,
            _ => {
                return Err(Error::parse(
                    format!("invalid separator after date in `{s}`"),
                    pos,
                ))
            }
        }

        let Some((time, after_time)) = parse_time_part(s, pos)? else {
            return Ok(None);
        };
        let datetime = NaiveDateTime::new(date, time);

        let (offset_minutes, end) = match bytes.get(after_time) {
            None => (None, after_time),
            Some(b'Z' | b'z') => (Some(0i32), after_time + 1),
            Some(sign @ (b'+' | b'-')) => {
                let mut p = after_time + 1;
                let hours = match read_digits(bytes, &mut p, 2) {
                    Some(h) if h <= 23 && bytes.get(p) == Some(&b':') => {
                        p += 1;
                        h
                    }
                    _ => {
                        return Err(Error::parse(
                            format!("invalid time zone offset hour in `{s}`"),
                            after_time,
                        ))
                    }
                };
                let minutes = match read_digits(bytes, &mut p, 2) {
                    Some(m) if m <= 59 => m,
                    _ => {
                        return Err(Error::parse(
                            format!("invalid time zone offset minute in `{s}`"),
                            after_time,
                        ))
                    }
                };
                let magnitude = (hours * 60 + minutes) as i32;
                let signed = if *sign == b'+' { magnitude } else { -magnitude };
                (Some(signed), p)
            }
            Some(_) => (None, after_time),
        };

        if end != bytes.len() {
            return Ok(None);
        }
        match offset_minutes {
            Some(minutes) => {
                let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
                    Error::parse(format!("time zone offset out of range in `{s}`"), 0)
                })?;
                Ok(Some(Datetime::Offset { datetime, offset }))
            }
            None => Ok(Some(Datetime::LocalDatetime(datetime))),
        }
    }

    fn parse_time_only(s: &str) -> Result<Option<Self>> {
        let Some((time, end)) = parse_time_part(s, 0)? else {
            return Ok(None);
        };
        if end != s.len() {
            return Ok(None);
        }
        Ok(Some(Datetime::LocalTime(time)))
    }
}

/// Parses `hh:mm:ss` with an optional fractional part starting at `start`.
/// Returns the time and the position after it, or `Ok(None)` if the shape
/// does not match.
fn parse_time_part(s: &str, start: usize) -> Result<Option<(NaiveTime, usize)>> {
    let bytes = s.as_bytes();
    let mut pos = start;

    let Some(hour) = read_digits(bytes, &mut pos, 2) else {
        return Ok(None);
    };
    if hour > 23 || bytes.get(pos) != Some(&b':') {
        return Ok(None);
    }
    pos += 1;
    let Some(minute) = read_digits(bytes, &mut pos, 2) else {
        return Ok(None);
    };
    if minute > 59 || bytes.get(pos) != Some(&b':') {
        return Ok(None);
    }
    pos += 1;
    let Some(second) = read_digits(bytes, &mut pos, 2) else {
        return Ok(None);
    };
    // No leap second: 60 is rejected along with everything above it.
    if second > 59 {
        return Ok(None);
    }

    let mut nanos = 0u32;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let frac_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == frac_start {
            return Err(Error::parse(
                format!("`.` must be followed by digits in `{s}`"),
                frac_start,
            ));
        }
        nanos = frac_to_nanos(&bytes[frac_start..pos]);
    }

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .ok_or_else(|| Error::parse(format!("time out of range in `{s}`"), start))?;
    Ok(Some((time, pos)))
}

/// Reads exactly `count` ASCII digits, advancing `pos` only on success.
fn read_digits(bytes: &[u8], pos: &mut usize, count: usize) -> Option<u32> {
    if *pos + count > bytes.len() {
        return None;
    }
    let mut value = 0u32;
    for &b in &bytes[*pos..*pos + count] {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + u32::from(b - b'0');
    }
    *pos += count;
    Some(value)
}

/// Converts fractional-second digits to nanoseconds. Digits beyond the ninth
/// are discarded, never rounded.
fn frac_to_nanos(digits: &[u8]) -> u32 {
    let mut value = 0u32;
    let mut count = 0u32;
    for &b in digits.iter().take(9) {
        value = value * 10 + u32::from(b - b'0');
        count += 1;
    }
    value * 10u32.pow(9 - count)
}

/// Reports whether `s` exactly matches one of the four TOML date/time
/// formats. A fast shape-and-range check used to decide between the datetime
/// and number productions; it does not validate days against months.
pub(crate) fn matches_full(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    let byte = |i: usize, b: u8| bytes.get(i) == Some(&b);

    // Date-leading formats.
    if bytes.len() >= 10
        && digit(0)
        && digit(1)
        && digit(2)
        && digit(3)
        && byte(4, b'-')
        && digit(5)
        && digit(6)
        && byte(7, b'-')
        && digit(8)
        && digit(9)
    {
        let month = (bytes[5] - b'0') * 10 + (bytes[6] - b'0');
        let day = (bytes[8] - b'0') * 10 + (bytes[9] - b'0');
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            let mut pos = 10;
            if pos == bytes.len() {
                return true;
            }
            if !matches!(bytes[pos], b'T' | b't' | b' ') {
                return false;
            }
            pos += 1;
            match match_time(bytes, pos) {
                Some(after) => pos = after,
                None => return false,
            }
            if pos < bytes.len() {
                match bytes[pos] {
                    b'Z' | b'z' => pos += 1,
                    b'+' | b'-' => {
                        pos += 1;
                        if !(digit(pos)
                            && digit(pos + 1)
                            && byte(pos + 2, b':')
                            && digit(pos + 3)
                            && digit(pos + 4))
                        {
                            return false;
                        }
                        let hours = (bytes[pos] - b'0') * 10 + (bytes[pos + 1] - b'0');
                        let minutes = (bytes[pos + 3] - b'0') * 10 + (bytes[pos + 4] - b'0');
                        if hours > 23 || minutes > 59 {
                            return false;
                        }
                        pos += 5;
                    }
                    _ => {}
                }
            }
            return pos == bytes.len();
        }
    }

    // Time-only format.
    match match_time(bytes, 0) {
        Some(after) => after == bytes.len(),
        None => false,
    }
}

/// Matches `hh:mm:ss` with optional `.digits` at `pos`, returning the
/// position after the match.
fn match_time(bytes: &[u8], pos: usize) -> Option<usize> {
    let digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    if !(digit(pos)
        && digit(pos + 1)
        && bytes.get(pos + 2) == Some(&b':')
        && digit(pos + 3)
        && digit(pos + 4)
        && bytes.get(pos + 5) == Some(&b':')
        && digit(pos + 6)
        && digit(pos + 7))
    {
        return None;
    }
    let hour = (bytes[pos] - b'0') * 10 + (bytes[pos + 1] - b'0');
    let minute = (bytes[pos + 3] - b'0') * 10 + (bytes[pos + 4] - b'0');
    let second = (bytes[pos + 6] - b'0') * 10 + (bytes[pos + 7] - b'0');
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    let mut after = pos + 8;
    if bytes.get(after) == Some(&b'.') {
        after += 1;
        let frac_start = after;
        while bytes.get(after).is_some_and(u8::is_ascii_digit) {
            after += 1;
        }
        if after == frac_start {
            return None;
        }
    }
    Some(after)
}

impl FromStr for Datetime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Datetime::parse(s)
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(date) = self.date_part() {
            write!(f, "{:04}-{:02}-{:02}", date.year(), date.month(), date.day())?;
            if self.time_part().is_some() {
                f.write_str("T")?;
            }
        }
        if let Some(time) = self.time_part() {
            write!(f, "{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())?;
            let nanos = time.nanosecond();
            if nanos > 0 {
                let digits = format!("{nanos:09}");
                write!(f, ".{}", digits.trim_end_matches('0'))?;
            }
        }
        if let Some(minutes) = self.offset_minutes() {
            if minutes == 0 {
                f.write_str("Z")?;
            } else {
                let sign = if minutes > 0 { '+' } else { '-' };
                let magnitude = minutes.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, magnitude / 60, magnitude % 60)?;
            }
        }
        Ok(())
    }
}

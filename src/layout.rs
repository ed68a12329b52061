//! Reference-date layouts for timestamp fields.
//!
//! A layout is an example rendering of the reference instant
//! `Mon Jan 2 15:04:05 MST 2006` (offset `-0700`). Each recognised piece of
//! the reference instant stands for the matching component of the value;
//! everything else must appear verbatim. `02/01/2006` therefore reads
//! day/month/year.
//!
//! Layouts are compiled into chrono format items and parsed by chrono.

use chrono::format::{self, Fixed, Item, Numeric, Pad, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use std::fmt;

/// One recognised piece of the reference instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    LongMonth,
    Month,
    NumMonth,
    ZeroMonth,
    LongWeekday,
    Weekday,
    Day,
    UnderDay,
    ZeroDay,
    UnderYearDay,
    ZeroYearDay,
    Hour,
    Hour12,
    ZeroHour12,
    Minute,
    ZeroMinute,
    Second,
    ZeroSecond,
    LongYear,
    Year,
    UpperPm,
    LowerPm,
    ZoneName,
    Offset,
    Fraction,
}

fn starts_with_lower(s: &str) -> bool {
    s.bytes().next().is_some_and(|b| b.is_ascii_lowercase())
}

fn is_fraction(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'.' || !matches!(bytes[1], b'0' | b'9') {
        return None;
    }
    let digit = bytes[1];
    let run = bytes[1..].iter().take_while(|b| **b == digit).count();
    match bytes.get(1 + run) {
        Some(b) if b.is_ascii_digit() => None,
        _ => Some(1 + run),
    }
}

/// Matches a token at the start of `rest`, returning its byte length
fn next_token(rest: &str) -> Option<(usize, Token)> {
    let token = match rest.as_bytes().first()? {
        b'J' if rest.starts_with("January") => (7, Token::LongMonth),
        b'J' if rest.starts_with("Jan") && !starts_with_lower(&rest[3..]) => (3, Token::Month),
        b'M' if rest.starts_with("Monday") => (6, Token::LongWeekday),
        b'M' if rest.starts_with("Mon") && !starts_with_lower(&rest[3..]) => (3, Token::Weekday),
        b'M' if rest.starts_with("MST") => (3, Token::ZoneName),
        b'0' if rest.starts_with("002") => (3, Token::ZeroYearDay),
        b'0' if rest.starts_with("01") => (2, Token::ZeroMonth),
        b'0' if rest.starts_with("02") => (2, Token::ZeroDay),
        b'0' if rest.starts_with("03") => (2, Token::ZeroHour12),
        b'0' if rest.starts_with("04") => (2, Token::ZeroMinute),
        b'0' if rest.starts_with("05") => (2, Token::ZeroSecond),
        b'0' if rest.starts_with("06") => (2, Token::Year),
        b'1' if rest.starts_with("15") => (2, Token::Hour),
        b'1' => (1, Token::NumMonth),
        b'2' if rest.starts_with("2006") => (4, Token::LongYear),
        b'2' => (1, Token::Day),
        b'_' if rest.starts_with("__2") => (3, Token::UnderYearDay),
        b'_' if rest.starts_with("_2") && !rest.starts_with("_2006") => (2, Token::UnderDay),
        b'3' => (1, Token::Hour12),
        b'4' => (1, Token::Minute),
        b'5' => (1, Token::Second),
        b'P' if rest.starts_with("PM") => (2, Token::UpperPm),
        b'p' if rest.starts_with("pm") => (2, Token::LowerPm),
        b'Z' if rest.starts_with("Z07:00") => (6, Token::Offset),
        b'Z' if rest.starts_with("Z0700") => (5, Token::Offset),
        b'Z' if rest.starts_with("Z07") => (3, Token::Offset),
        b'-' if rest.starts_with("-07:00") => (6, Token::Offset),
        b'-' if rest.starts_with("-0700") => (5, Token::Offset),
        b'-' if rest.starts_with("-07") => (3, Token::Offset),
        b'.' => (is_fraction(rest)?, Token::Fraction),
        _ => return None,
    };
    Some(token)
}

/// A layout compiled into chrono format items
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    source: &'a str,
    items: Vec<Item<'a>>,
    has_hour: bool,
    has_hour12: bool,
    has_ampm: bool,
    has_minute: bool,
    has_offset: bool,
}

impl<'a> Layout<'a> {
    pub fn compile(source: &'a str) -> Self {
        let mut layout = Self {
            source,
            items: Vec::new(),
            has_hour: false,
            has_hour12: false,
            has_ampm: false,
            has_minute: false,
            has_offset: false,
        };

        let mut literal_start = 0;
        let mut i = 0;
        while i < source.len() {
            let rest = &source[i..];
            match next_token(rest) {
                Some((len, token)) => {
                    if literal_start < i {
                        layout.items.push(Item::Literal(&source[literal_start..i]));
                    }
                    layout.push(token);
                    i += len;
                    literal_start = i;
                }
                None => i += rest.chars().next().map_or(1, char::len_utf8),
            }
        }
        if literal_start < source.len() {
            layout.items.push(Item::Literal(&source[literal_start..]));
        }
        layout
    }

    fn push(&mut self, token: Token) {
        let item = match token {
            Token::LongMonth => Item::Fixed(Fixed::LongMonthName),
            Token::Month => Item::Fixed(Fixed::ShortMonthName),
            Token::NumMonth => Item::Numeric(Numeric::Month, Pad::None),
            Token::ZeroMonth => Item::Numeric(Numeric::Month, Pad::Zero),
            Token::LongWeekday => Item::Fixed(Fixed::LongWeekdayName),
            Token::Weekday => Item::Fixed(Fixed::ShortWeekdayName),
            Token::Day => Item::Numeric(Numeric::Day, Pad::None),
            Token::UnderDay => Item::Numeric(Numeric::Day, Pad::Space),
            Token::ZeroDay => Item::Numeric(Numeric::Day, Pad::Zero),
            Token::UnderYearDay => Item::Numeric(Numeric::Ordinal, Pad::Space),
            Token::ZeroYearDay => Item::Numeric(Numeric::Ordinal, Pad::Zero),
            Token::Hour => {
                self.has_hour = true;
                Item::Numeric(Numeric::Hour, Pad::Zero)
            }
            Token::Hour12 => {
                self.has_hour12 = true;
                Item::Numeric(Numeric::Hour12, Pad::None)
            }
            Token::ZeroHour12 => {
                self.has_hour12 = true;
                Item::Numeric(Numeric::Hour12, Pad::Zero)
            }
            Token::Minute => {
                self.has_minute = true;
                Item::Numeric(Numeric::Minute, Pad::None)
            }
            Token::ZeroMinute => {
                self.has_minute = true;
                Item::Numeric(Numeric::Minute, Pad::Zero)
            }
            Token::Second => Item::Numeric(Numeric::Second, Pad::None),
            Token::ZeroSecond => Item::Numeric(Numeric::Second, Pad::Zero),
            Token::LongYear => Item::Numeric(Numeric::Year, Pad::Zero),
            Token::Year => Item::Numeric(Numeric::YearMod100, Pad::Zero),
            Token::UpperPm => {
                self.has_ampm = true;
                Item::Fixed(Fixed::UpperAmPm)
            }
            Token::LowerPm => {
                self.has_ampm = true;
                Item::Fixed(Fixed::LowerAmPm)
            }
            Token::ZoneName => Item::Fixed(Fixed::TimezoneName),
            Token::Offset => {
                // accepts `Z`, `+07`, `+0700` and `+07:00`
                self.has_offset = true;
                self.items.extend(StrftimeItems::new("%#z"));
                return;
            }
            Token::Fraction => Item::Fixed(Fixed::Nanosecond),
        };
        self.items.push(item);
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Parses `value` into a UTC timestamp.
    ///
    /// Components the layout does not mention default to zero, values
    /// without an offset are taken as UTC and values with one are
    /// normalised to UTC.
    pub fn parse(&self, value: &str) -> Result<DateTime<Utc>, LayoutError> {
        let (naive, offset) = self
            .resolve(value)
            .map_err(|cause| LayoutError::new(self.source, value, cause))?;
        naive
            .checked_sub_offset(offset)
            .map(|utc| Utc.from_utc_datetime(&utc))
            .ok_or_else(|| LayoutError::new(self.source, value, "out of range"))
    }

    fn resolve(&self, value: &str) -> Result<(NaiveDateTime, FixedOffset), format::ParseError> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, value, self.items.iter())?;

        if self.has_hour12 && !self.has_ampm {
            parsed.set_ampm(false)?;
        }
        if (self.has_hour || self.has_hour12) && !self.has_minute {
            parsed.set_minute(0)?;
        }

        let date = parsed.to_naive_date()?;
        let time = if self.has_hour || self.has_hour12 {
            parsed.to_naive_time()?
        } else {
            NaiveTime::MIN
        };
        let naive = NaiveDateTime::new(date, time);

        let offset = if self.has_offset {
            parsed.to_fixed_offset()?
        } else {
            Utc.fix()
        };
        Ok((naive, offset))
    }
}

/// Parses `value` against a reference-date layout
pub fn parse_time(layout: &str, value: &str) -> Result<DateTime<Utc>, LayoutError> {
    Layout::compile(layout).parse(value)
}

/// A value that does not match its layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutError {
    pub layout: String,
    pub value: String,
    pub cause: String,
}

impl LayoutError {
    fn new(layout: &str, value: &str, cause: impl fmt::Display) -> Self {
        Self {
            layout: layout.to_string(),
            value: value.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parsing time \"{}\" as \"{}\": {}",
            self.value, self.layout, self.cause
        )
    }
}

impl std::error::Error for LayoutError {}

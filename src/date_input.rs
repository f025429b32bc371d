//! Parsing and validation of typed-in dates.
//!
//! Input is six numeric components in fixed order (year, month, day, hour,
//! minute, second). Any run of `-`, `:`, space or newline separates them, so
//! `2031-06-03 09:05:00` and `2031 06 03:09-05-00` are the same date.
//! Components shorter than two digits must be zero padded.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike};
use log::debug;
use std::fmt;

const DELIMITERS: [char; 4] = ['-', ':', ' ', '\n'];

/// Hint shown before asking for a date.
pub const FORMAT_HINT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInputError {
    InvalidInput,
    PastDateRejected,
}

impl fmt::Display for DateInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateInputError::InvalidInput => write!(f, "invalid date or time"),
            DateInputError::PastDateRejected => {
                write!(f, "only future appointments can be planned")
            }
        }
    }
}

impl std::error::Error for DateInputError {}

/// Calendar fields as read from the input. `None` marks a component that was
/// missing, malformed or out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarComponents {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

impl CalendarComponents {
    pub fn parse(text: &str, date_only: bool) -> Self {
        let mut tokens = text
            .trim_end_matches(['\r', '\n'])
            .split(DELIMITERS)
            .filter(|token| !token.is_empty());
        let mut next = || convert_token(tokens.next());

        let year = next()
            .filter(|year| (2021..10000).contains(year))
            .map(|year| year as i32);
        let month = next().filter(|month| (1..13).contains(month));
        let day = next().filter(|day| (1..32).contains(day));
        let hour = next().filter(|hour| *hour < 24);
        let minute = next().filter(|minute| *minute < 60);
        let second = next().filter(|second| *second < 60);

        let time_of_day = |value: Option<u32>| if date_only { value.or(Some(0)) } else { value };

        Self {
            year,
            month,
            day,
            hour: time_of_day(hour),
            minute: time_of_day(minute),
            second: time_of_day(second),
        }
    }

    pub fn from_datetime(datetime: &DateTime<Local>) -> Self {
        Self {
            year: Some(datetime.year()),
            month: Some(datetime.month()),
            day: Some(datetime.day()),
            hour: Some(datetime.hour()),
            minute: Some(datetime.minute()),
            second: Some(datetime.second()),
        }
    }

    /// Converts to a local timestamp.
    ///
    /// Fails unless every component is present, the fields name a real local
    /// time, and expanding the result again yields exactly the same fields.
    /// The last check rejects dates such as February 30th and times skipped
    /// by a daylight saving transition.
    pub fn to_local(&self) -> Result<DateTime<Local>, DateInputError> {
        let parser_ok = self.year.is_some()
            && self.month.is_some()
            && self.day.is_some()
            && self.hour.is_some()
            && self.minute.is_some()
            && self.second.is_some();

        let resolved = self.resolve();
        let unchanged =
            resolved.is_some_and(|datetime| Self::from_datetime(&datetime) == *self);

        debug!(
            "date validation: parser={parser_ok} converted={} unchanged={unchanged}",
            resolved.is_some()
        );

        match resolved {
            Some(datetime) if parser_ok && unchanged => Ok(datetime),
            _ => Err(DateInputError::InvalidInput),
        }
    }

    fn resolve(&self) -> Option<DateTime<Local>> {
        let naive = NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)?.and_hms_opt(
            self.hour?,
            self.minute?,
            self.second?,
        )?;
        Local.from_local_datetime(&naive).earliest()
    }
}

fn convert_token(token: Option<&str>) -> Option<u32> {
    let token = token?;
    if (2..=4).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

pub fn parse_date(text: &str, date_only: bool) -> Result<DateTime<Local>, DateInputError> {
    CalendarComponents::parse(text, date_only).to_local()
}

/// Like [`parse_date`], but the result must lie strictly after `now`.
pub fn parse_future_date(
    text: &str,
    date_only: bool,
    now: DateTime<Local>,
) -> Result<DateTime<Local>, DateInputError> {
    let start = parse_date(text, date_only)?;
    if start <= now {
        return Err(DateInputError::PastDateRejected);
    }
    Ok(start)
}

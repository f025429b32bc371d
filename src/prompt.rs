//! Bounded input loops for the interactive menu.
//!
//! Reading a line and parsing it are kept apart: every prompt works on any
//! `BufRead`/`Write` pair and retries at most `max_attempts` times.

use crate::appointment::validate_description;
use crate::date_input::{self, DateInputError, FORMAT_HINT};
use chrono::{DateTime, Local, NaiveDate};
use log::debug;
use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug)]
pub enum PromptError {
    Io(io::Error),
    InputClosed,
    TooManyAttempts { attempts: usize },
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::Io(err) => write!(f, "io error: {err}"),
            PromptError::InputClosed => write!(f, "input closed"),
            PromptError::TooManyAttempts { attempts } => {
                write!(f, "gave up after {attempts} invalid inputs")
            }
        }
    }
}

impl std::error::Error for PromptError {}

impl From<io::Error> for PromptError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

pub type PromptResult<T> = Result<T, PromptError>;

/// Reads one line without its terminator. End of input is an error.
pub fn read_line<R: BufRead>(input: &mut R) -> PromptResult<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PromptError::InputClosed);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_with<R, W, T, F>(
    input: &mut R,
    output: &mut W,
    question: &str,
    max_attempts: usize,
    mut parse: F,
) -> PromptResult<T>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> Result<T, String>,
{
    for attempt in 1..=max_attempts {
        writeln!(output, "] {question}")?;
        output.flush()?;
        let line = read_line(input)?;
        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(message) => {
                debug!("rejected input on attempt {attempt}: {line:?}");
                writeln!(output, "] {message}")?;
            }
        }
    }
    Err(PromptError::TooManyAttempts {
        attempts: max_attempts,
    })
}

/// Asks for a full date and time that lies after `now`.
pub fn prompt_future_date<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    now: DateTime<Local>,
    max_attempts: usize,
) -> PromptResult<DateTime<Local>> {
    writeln!(output, "] Time needs to be formatted as {FORMAT_HINT}")?;
    prompt_with(input, output, "Please enter date & time:", max_attempts, |line| {
        date_input::parse_future_date(line, false, now).map_err(|err| match err {
            DateInputError::InvalidInput => "Invalid time!".to_string(),
            DateInputError::PastDateRejected => {
                "It is only possible to plan FUTURE appointments.".to_string()
            }
        })
    })
}

/// Asks for a calendar day; any time of day given is ignored.
pub fn prompt_day<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    max_attempts: usize,
) -> PromptResult<NaiveDate> {
    prompt_with(input, output, "Please enter a date (yyyy-mm-dd):", max_attempts, |line| {
        date_input::parse_date(line, true)
            .map(|datetime| datetime.date_naive())
            .map_err(|_| "Invalid date!".to_string())
    })
}

pub fn prompt_description<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    max_attempts: usize,
) -> PromptResult<String> {
    prompt_with(input, output, "Please enter a description:", max_attempts, |line| {
        validate_description(line)
            .map(|()| line.to_string())
            .map_err(|err| format!("Invalid description: {err}"))
    })
}

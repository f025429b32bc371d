use chrono::{DateTime, Local};
use std::fmt;

/// Longest description accepted from the console or written to disk.
pub const MAX_DESCRIPTION_LEN: usize = 253;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub start: DateTime<Local>,
    pub description: String,
}

impl Appointment {
    pub fn new(start: DateTime<Local>, description: impl Into<String>) -> Self {
        Self {
            start,
            description: description.into(),
        }
    }

    /// Seconds since the Unix epoch, as stored in the appointment file.
    pub fn timestamp(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn matches(&self, lowered_query: &str) -> bool {
        self.description.to_lowercase().contains(lowered_query)
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.start.format("%a %b %e %H:%M:%S %Y"),
            self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    EmptyDescription,
    DescriptionTooLong { len: usize, max: usize },
    DescriptionContainsNewline,
}

impl fmt::Display for AppointmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentError::EmptyDescription => write!(f, "description must not be empty"),
            AppointmentError::DescriptionTooLong { len, max } => write!(
                f,
                "description has {len} characters, at most {max} are allowed"
            ),
            AppointmentError::DescriptionContainsNewline => {
                write!(f, "description must not contain line breaks")
            }
        }
    }
}

impl std::error::Error for AppointmentError {}

pub fn validate_description(description: &str) -> Result<(), AppointmentError> {
    if description.contains(['\n', '\r']) {
        return Err(AppointmentError::DescriptionContainsNewline);
    }
    if description.trim().is_empty() {
        return Err(AppointmentError::EmptyDescription);
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(AppointmentError::DescriptionTooLong {
            len,
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

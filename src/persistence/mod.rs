use crate::appointment::Appointment;
use crate::Agenda;
use chrono::{DateTime, Local};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Serialization(err) => Some(err),
            PersistenceError::Io(err) => Some(err),
            PersistenceError::Csv(err) => Some(err),
            PersistenceError::InvalidData(_) => None,
        }
    }
}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Outcome of reading an appointment file.
///
/// Loading never fails outright: problems are summarised here so the caller
/// can report them once.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub agenda: Agenda,
    /// Entries dropped because they did not start after the load time.
    pub skipped_expired: usize,
    /// At least one line could not be parsed.
    pub damaged: bool,
    /// Set when the file could not be opened; the agenda is then empty.
    pub unreadable: Option<String>,
}

impl LoadReport {
    pub fn status_lines(&self, source: &str) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(reason) = &self.unreadable {
            lines.push(format!("Could not read {source} ({reason}), starting empty."));
        }
        if self.skipped_expired > 0 {
            lines.push(format!(
                "Skipped {} appointments because they were too old.",
                self.skipped_expired
            ));
        }
        if self.damaged {
            lines.push(format!(
                "The file {source} seems to be damaged, some data might not be available as expected."
            ));
        }
        lines
    }
}

pub trait AgendaStore {
    fn save_agenda(&self, agenda: &Agenda) -> PersistenceResult<()>;
    fn load_agenda(&self, now: DateTime<Local>) -> LoadReport;
}

pub fn validate_appointments<'a, I>(appointments: I) -> PersistenceResult<()>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    for appointment in appointments {
        let description = &appointment.description;
        if description.contains('\n') || description.ends_with('\r') {
            return Err(PersistenceError::InvalidData(format!(
                "appointment at {} has a description containing a line break",
                appointment.timestamp()
            )));
        }
        if appointment.description.is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "appointment at {} has an empty description",
                appointment.timestamp()
            )));
        }
    }
    Ok(())
}

pub fn validate_agenda(agenda: &Agenda) -> PersistenceResult<()> {
    validate_appointments(agenda)
}

pub mod file;

pub use file::{
    TextFileStore, load_agenda_from_file, load_agenda_from_json, save_agenda_to_file,
    save_agenda_to_json,
};

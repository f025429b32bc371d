use super::{AgendaStore, LoadReport, PersistenceError, PersistenceResult};
use crate::{Agenda, Appointment};
use chrono::{DateTime, Local, TimeZone};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Appointment file with one `<start>,<description>` line per entry.
#[derive(Debug, Clone)]
pub struct TextFileStore {
    path: PathBuf,
}

impl TextFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AgendaStore for TextFileStore {
    fn save_agenda(&self, agenda: &Agenda) -> PersistenceResult<()> {
        save_agenda_to_file(agenda, &self.path)
    }

    fn load_agenda(&self, now: DateTime<Local>) -> LoadReport {
        load_agenda_from_file(&self.path, now)
    }
}

/// Writes every appointment, truncating the file. An empty agenda produces an
/// empty file.
pub fn save_agenda_to_file<P: AsRef<Path>>(agenda: &Agenda, path: P) -> PersistenceResult<()> {
    let path = path.as_ref();
    super::validate_agenda(agenda)?;
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(file);
    for appointment in agenda {
        let start = appointment.timestamp().to_string();
        writer.write_record([start.as_str(), appointment.description.as_str()])?;
    }
    writer.flush()?;
    info!("saved {} appointments to {}", agenda.len(), path.display());
    Ok(())
}

/// Reads an appointment file, keeping only entries that start after `now`.
///
/// Unparsable lines are skipped and flagged through [`LoadReport::damaged`].
/// A missing or unreadable file yields an empty agenda.
pub fn load_agenda_from_file<P: AsRef<Path>>(path: P, now: DateTime<Local>) -> LoadReport {
    let path = path.as_ref();
    let mut report = LoadReport::default();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!("could not read appointment file {}: {err}", path.display());
            report.unreadable = Some(err.to_string());
            return report;
        }
    };

    // Quoting is off and records are flexible: only the first comma separates
    // the start from the description. Only `\n` ends a record, so a lone `\r`
    // stays part of the description.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(file);

    let mut record = StringRecord::new();
    let mut consumed = 0;
    loop {
        let result = reader.read_record(&mut record);
        let end = reader.position().byte();
        let line = reader.position().line();
        let advanced = end - consumed;
        consumed = end;
        match result {
            Ok(false) => {
                // The reader drops empty lines without yielding a record.
                if advanced > 0 {
                    warn!("{}: blank lines at end of file", path.display());
                    report.damaged = true;
                }
                break;
            }
            Ok(true) => {
                if advanced > record_bytes(&record) + 1 {
                    warn!("{}: skipped a blank line", path.display());
                    report.damaged = true;
                }
                match parse_record(&record) {
                    Some(appointment) if appointment.start > now => {
                        debug!("read appointment {appointment}");
                        report.agenda.restore(appointment);
                    }
                    Some(appointment) => {
                        debug!("skipping expired appointment {appointment}");
                        report.skipped_expired += 1;
                    }
                    None => {
                        warn!("{}:{line}: unparsable appointment line", path.display());
                        report.damaged = true;
                    }
                }
            }
            Err(err) if err.is_io_error() => {
                warn!("reading {} stopped early: {err}", path.display());
                report.damaged = true;
                break;
            }
            Err(err) => {
                warn!("{}: {err}", path.display());
                report.damaged = true;
            }
        }
    }

    info!(
        "loaded {} appointments from {} (expired={}, damaged={})",
        report.agenda.len(),
        path.display(),
        report.skipped_expired,
        report.damaged
    );
    report
}

/// Length of the record as it appeared in the file, without its terminator.
fn record_bytes(record: &StringRecord) -> u64 {
    (record.as_slice().len() + record.len().saturating_sub(1)) as u64
}

fn parse_record(record: &StringRecord) -> Option<Appointment> {
    let mut fields = record.iter();
    let start: i64 = fields.next()?.trim_start().parse().ok()?;
    let mut description = fields.collect::<Vec<_>>().join(",");
    if description.ends_with('\r') {
        description.pop();
    }
    if description.is_empty() {
        return None;
    }
    let start = Local.timestamp_opt(start, 0).single()?;
    Some(Appointment::new(start, description))
}

#[derive(Serialize, Deserialize)]
struct AgendaSnapshot {
    appointments: Vec<AppointmentRecord>,
}

#[derive(Serialize, Deserialize)]
struct AppointmentRecord {
    start: i64,
    description: String,
}

impl From<&Appointment> for AppointmentRecord {
    fn from(appointment: &Appointment) -> Self {
        Self {
            start: appointment.timestamp(),
            description: appointment.description.clone(),
        }
    }
}

pub fn save_agenda_to_json<P: AsRef<Path>>(agenda: &Agenda, path: P) -> PersistenceResult<()> {
    super::validate_agenda(agenda)?;
    let snapshot = AgendaSnapshot {
        appointments: agenda.iter().map(AppointmentRecord::from).collect(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

/// Imports a JSON snapshot. Expired entries are skipped as for the text file,
/// but a snapshot that is not valid JSON is an error.
pub fn load_agenda_from_json<P: AsRef<Path>>(
    path: P,
    now: DateTime<Local>,
) -> PersistenceResult<LoadReport> {
    let file = File::open(path)?;
    let snapshot: AgendaSnapshot = serde_json::from_reader(file)?;

    let mut report = LoadReport::default();
    for record in snapshot.appointments {
        let start = Local.timestamp_opt(record.start, 0).single().ok_or_else(|| {
            PersistenceError::InvalidData(format!("start {} is out of range", record.start))
        })?;
        if start > now {
            report.agenda.restore(Appointment::new(start, record.description));
        } else {
            report.skipped_expired += 1;
        }
    }
    super::validate_agenda(&report.agenda)?;
    Ok(report)
}

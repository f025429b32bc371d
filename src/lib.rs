pub mod agenda;
pub mod appointment;
pub mod date_input;
pub mod persistence;
pub mod prompt;

pub use agenda::Agenda;
pub use appointment::{Appointment, AppointmentError, MAX_DESCRIPTION_LEN, validate_description};
pub use date_input::{CalendarComponents, DateInputError, parse_date, parse_future_date};
pub use persistence::{
    AgendaStore, LoadReport, PersistenceError, PersistenceResult, TextFileStore,
    load_agenda_from_file, load_agenda_from_json, save_agenda_to_file, save_agenda_to_json,
    validate_agenda,
};
pub use prompt::{PromptError, PromptResult};

use crate::appointment::Appointment;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use log::debug;

/// Appointments kept in ascending order of their start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Agenda {
    appointments: Vec<Appointment>,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Appointment> {
        self.appointments.iter()
    }

    /// The next upcoming appointment.
    pub fn first(&self) -> Option<&Appointment> {
        self.appointments.first()
    }

    /// Inserts before the first appointment that does not start earlier, so a
    /// new entry precedes existing entries with the same start.
    pub fn insert(&mut self, start: DateTime<Local>, description: impl Into<String>) -> usize {
        self.insert_appointment(Appointment::new(start, description))
    }

    pub fn insert_appointment(&mut self, appointment: Appointment) -> usize {
        let index = self
            .appointments
            .partition_point(|existing| existing.start < appointment.start);
        debug!(
            "inserting appointment at position {index} of {}",
            self.appointments.len()
        );
        self.appointments.insert(index, appointment);
        index
    }

    /// Inserts after any appointments with the same start. Rebuilding an
    /// agenda from its own saved order therefore reproduces it exactly.
    pub fn restore(&mut self, appointment: Appointment) -> usize {
        let index = self
            .appointments
            .partition_point(|existing| existing.start <= appointment.start);
        self.appointments.insert(index, appointment);
        index
    }

    /// First appointment, in start order, whose description contains `query`
    /// ignoring case.
    pub fn find(&self, query: &str) -> Option<&Appointment> {
        self.position(query).map(|index| &self.appointments[index])
    }

    /// Removes the first appointment [`find`](Self::find) would return.
    pub fn take(&mut self, query: &str) -> Option<Appointment> {
        self.position(query)
            .map(|index| self.appointments.remove(index))
    }

    pub fn delete(&mut self, query: &str) -> bool {
        self.take(query).is_some()
    }

    fn position(&self, query: &str) -> Option<usize> {
        let lowered = query.to_lowercase();
        self.appointments
            .iter()
            .position(|appointment| appointment.matches(&lowered))
    }

    pub fn list_all(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Appointments starting within the 24 hours after local midnight of the
    /// given day. An impossible date yields nothing.
    pub fn list_on(&self, day: u32, month: u32, year: i32) -> Vec<&Appointment> {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => self.list_on_date(date),
            None => Vec::new(),
        }
    }

    pub fn list_on_date(&self, date: NaiveDate) -> Vec<&Appointment> {
        let Some(window_start) = local_midnight(date) else {
            return Vec::new();
        };
        let window_end = window_start + Duration::seconds(86_400);
        self.appointments
            .iter()
            .skip_while(|appointment| appointment.start < window_start)
            .take_while(|appointment| appointment.start < window_end)
            .collect()
    }

    pub fn clear(&mut self) {
        debug!("clearing {} appointments", self.appointments.len());
        self.appointments.clear();
    }
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&midnight).earliest()
}

impl<'a> IntoIterator for &'a Agenda {
    type Item = &'a Appointment;
    type IntoIter = std::slice::Iter<'a, Appointment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Agenda {
    type Item = Appointment;
    type IntoIter = std::vec::IntoIter<Appointment>;

    fn into_iter(self) -> Self::IntoIter {
        self.appointments.into_iter()
    }
}

impl Extend<Appointment> for Agenda {
    fn extend<I: IntoIterator<Item = Appointment>>(&mut self, iter: I) {
        for appointment in iter {
            self.restore(appointment);
        }
    }
}

impl FromIterator<Appointment> for Agenda {
    fn from_iter<I: IntoIterator<Item = Appointment>>(iter: I) -> Self {
        let mut agenda = Agenda::new();
        agenda.extend(iter);
        agenda
    }
}

use chrono::{DateTime, Local, TimeZone};
use planner::{
    Agenda, AgendaStore, Appointment, PersistenceError, TextFileStore, load_agenda_from_file,
    load_agenda_from_json, save_agenda_to_file, save_agenda_to_json,
};
use std::fs;
use tempfile::{NamedTempFile, tempdir};

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
}

fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn sample_agenda() -> Agenda {
    let mut agenda = Agenda::new();
    agenda.insert(local(2031, 3, 1, 9), "Dentist, then lunch");
    agenda.insert(local(2030, 7, 4, 18), "Barbecue");
    agenda.insert(local(2031, 3, 1, 9), "Same time as dentist");
    agenda
}

fn pairs(agenda: &Agenda) -> Vec<(i64, String)> {
    agenda
        .iter()
        .map(|a| (a.timestamp(), a.description.clone()))
        .collect()
}

#[test]
fn text_round_trip_preserves_order_and_content() {
    let agenda = sample_agenda();
    let file = NamedTempFile::new().unwrap();

    save_agenda_to_file(&agenda, file.path()).unwrap();
    let report = load_agenda_from_file(file.path(), now());

    assert_eq!(pairs(&report.agenda), pairs(&agenda));
    assert_eq!(report.skipped_expired, 0);
    assert!(!report.damaged);
    assert!(report.unreadable.is_none());
}

#[test]
fn file_uses_start_comma_description_lines() {
    let mut agenda = Agenda::new();
    agenda.insert(local(2031, 3, 1, 9), "Dentist, then lunch");
    let file = NamedTempFile::new().unwrap();

    save_agenda_to_file(&agenda, file.path()).unwrap();
    let contents = fs::read_to_string(file.path()).unwrap();
    let expected = format!("{},Dentist, then lunch\n", local(2031, 3, 1, 9).timestamp());
    assert_eq!(contents, expected);
}

#[test]
fn expired_entries_are_skipped_and_counted() {
    let file = NamedTempFile::new().unwrap();
    let future = local(2031, 1, 1, 8).timestamp();
    let contents = format!(
        "{},old one\n{},exactly now\n{future},kept\n{},older\n",
        local(2029, 1, 1, 8).timestamp(),
        now().timestamp(),
        local(2001, 1, 1, 8).timestamp(),
    );
    fs::write(file.path(), contents).unwrap();

    let report = load_agenda_from_file(file.path(), now());
    assert_eq!(report.skipped_expired, 3);
    assert_eq!(report.agenda.len(), 1);
    assert_eq!(report.agenda.first().unwrap().description, "kept");
    assert!(!report.damaged);
}

#[test]
fn damaged_line_is_skipped_and_flagged() {
    let file = NamedTempFile::new().unwrap();
    let a = local(2031, 1, 1, 8).timestamp();
    let b = local(2031, 1, 2, 8).timestamp();
    let c = local(2031, 1, 3, 8).timestamp();
    let contents = format!("{a},first\nnot a number,broken\n{b},second\n{c},third\n");
    fs::write(file.path(), contents).unwrap();

    let report = load_agenda_from_file(file.path(), now());
    assert_eq!(report.agenda.len(), 3);
    assert!(report.damaged);
    assert_eq!(report.skipped_expired, 0);
}

#[test]
fn blank_lines_are_flagged_as_damage() {
    let file = NamedTempFile::new().unwrap();
    let a = local(2031, 1, 1, 8).timestamp();
    fs::write(file.path(), format!("{a},one\n\n{a},two\n")).unwrap();

    let report = load_agenda_from_file(file.path(), now());
    assert_eq!(report.agenda.len(), 2);
    assert!(report.damaged);

    fs::write(file.path(), format!("{a},one\n{a},two\n\n")).unwrap();
    let trailing = load_agenda_from_file(file.path(), now());
    assert_eq!(trailing.agenda.len(), 2);
    assert!(trailing.damaged);

    fs::write(file.path(), format!("{a},one\n{a},two")).unwrap();
    let unterminated = load_agenda_from_file(file.path(), now());
    assert_eq!(unterminated.agenda.len(), 2);
    assert!(!unterminated.damaged);
}

#[test]
fn lone_carriage_return_stays_in_description() {
    let file = NamedTempFile::new().unwrap();
    let a = local(2031, 1, 1, 8).timestamp();
    fs::write(file.path(), format!("{a},a\rb\r\n")).unwrap();

    let report = load_agenda_from_file(file.path(), now());
    assert!(!report.damaged);
    assert_eq!(report.agenda.len(), 1);
    assert_eq!(report.agenda.first().unwrap().description, "a\rb");

    save_agenda_to_file(&report.agenda, file.path()).unwrap();
    assert_eq!(fs::read_to_string(file.path()).unwrap(), format!("{a},a\rb\n"));
}

#[test]
fn lines_without_description_are_damaged() {
    let file = NamedTempFile::new().unwrap();
    let a = local(2031, 1, 1, 8).timestamp();
    fs::write(file.path(), format!("{a}\n{a},\n{a},ok\n")).unwrap();

    let report = load_agenda_from_file(file.path(), now());
    assert_eq!(report.agenda.len(), 1);
    assert!(report.damaged);
}

#[test]
fn loaded_lines_are_sorted_and_accept_crlf() {
    let file = NamedTempFile::new().unwrap();
    let late = local(2031, 9, 1, 8).timestamp();
    let early = local(2031, 1, 1, 8).timestamp();
    fs::write(file.path(), format!("{late},late\r\n{early},early\r\n")).unwrap();

    let report = load_agenda_from_file(file.path(), now());
    let descriptions: Vec<_> = report.agenda.iter().map(|a| a.description.as_str()).collect();
    assert_eq!(descriptions, vec!["early", "late"]);
}

#[test]
fn missing_file_yields_empty_agenda() {
    let dir = tempdir().unwrap();
    let report = load_agenda_from_file(dir.path().join("absent.txt"), now());
    assert!(report.agenda.is_empty());
    assert!(report.unreadable.is_some());
    assert!(!report.damaged);
    assert!(report.status_lines("absent.txt")[0].contains("Could not read"));
}

#[test]
fn empty_agenda_writes_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("appointments.txt");

    save_agenda_to_file(&Agenda::new(), &path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    let report = load_agenda_from_file(&path, now());
    assert!(report.agenda.is_empty());
    assert!(report.unreadable.is_none());
}

#[test]
fn save_rejects_descriptions_with_line_breaks() {
    let mut agenda = Agenda::new();
    agenda.insert_appointment(Appointment::new(local(2031, 1, 1, 8), "two\nlines"));
    let file = NamedTempFile::new().unwrap();

    match save_agenda_to_file(&agenda, file.path()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("line break"), "unexpected message: {msg}")
        }
        other => panic!("expected InvalidData error, got {other:?}"),
    }
}

#[test]
fn text_file_store_round_trip() {
    let dir = tempdir().unwrap();
    let store = TextFileStore::new(dir.path().join("termine.txt"));
    let agenda = sample_agenda();

    store.save_agenda(&agenda).unwrap();
    let report = store.load_agenda(now());
    assert_eq!(pairs(&report.agenda), pairs(&agenda));
}

#[test]
fn json_round_trip_preserves_agenda() {
    let agenda = sample_agenda();
    let file = NamedTempFile::new().unwrap();

    save_agenda_to_json(&agenda, file.path()).unwrap();
    let report = load_agenda_from_json(file.path(), now()).unwrap();
    assert_eq!(pairs(&report.agenda), pairs(&agenda));
}

#[test]
fn json_load_skips_expired_and_rejects_garbage() {
    let file = NamedTempFile::new().unwrap();
    let snapshot = serde_json::json!({
        "appointments": [
            { "start": local(2031, 1, 1, 8).timestamp(), "description": "future" },
            { "start": local(2020, 1, 1, 8).timestamp(), "description": "past" }
        ]
    });
    serde_json::to_writer_pretty(file.as_file(), &snapshot).unwrap();

    let report = load_agenda_from_json(file.path(), now()).unwrap();
    assert_eq!(report.agenda.len(), 1);
    assert_eq!(report.skipped_expired, 1);

    let garbage = NamedTempFile::new().unwrap();
    fs::write(garbage.path(), "not json").unwrap();
    match load_agenda_from_json(garbage.path(), now()) {
        Err(PersistenceError::Serialization(_)) => {}
        other => panic!("expected serialization error, got {other:?}"),
    }
}

use chrono::Local;
use clap::Parser;
use planner::prompt::{self, PromptError, PromptResult};
use planner::{
    Agenda, AgendaStore, Appointment, TextFileStore, load_agenda_from_json, save_agenda_to_json,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_FILE: &str = "termine.txt";

#[derive(Parser, Debug)]
#[command(name = "planner", about = "Plan future appointments kept in a text file")]
struct Args {
    /// Appointment file, loaded on start and written back on exit
    file: Option<PathBuf>,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Invalid inputs accepted per prompt before giving up
    #[arg(long, default_value_t = 5)]
    max_attempts: usize,
}

fn print_menu<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(
        output,
        "Available commands:\n  create          create a new appointment\n  search          show the first appointment matching a text\n  delete          delete the first appointment matching a text\n  list            list all appointments\n  day             list the appointments of one day\n  clear           delete all appointments\n  save            write the appointment file now\n  export <path>   write a JSON snapshot\n  import <path>   add appointments from a JSON snapshot\n  menu            show this menu\n  quit            save and exit the program"
    )
}

fn print_appointments<'a, W, I>(output: &mut W, appointments: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Appointment>,
{
    for appointment in appointments {
        writeln!(output, "----\n{appointment}")?;
    }
    writeln!(output, "----")
}

fn create<R: BufRead, W: Write>(
    agenda: &mut Agenda,
    input: &mut R,
    output: &mut W,
    max_attempts: usize,
) -> PromptResult<()> {
    let start = prompt::prompt_future_date(input, output, Local::now(), max_attempts)?;
    let description = prompt::prompt_description(input, output, max_attempts)?;
    let appointment = Appointment::new(start, description);
    writeln!(output, "Created: {appointment}")?;
    agenda.insert_appointment(appointment);
    Ok(())
}

fn read_query<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> PromptResult<String> {
    writeln!(output, "] Please enter a search term:")?;
    output.flush()?;
    prompt::read_line(input)
}

fn run_menu<R: BufRead, W: Write>(
    agenda: &mut Agenda,
    store: &TextFileStore,
    input: &mut R,
    output: &mut W,
    max_attempts: usize,
) -> PromptResult<()> {
    writeln!(output, "Appointment planner - type 'menu' for commands")?;
    loop {
        writeln!(output, "Enter a command:")?;
        output.flush()?;
        let line = match prompt::read_line(input) {
            Ok(line) => line,
            Err(PromptError::InputClosed) => return Ok(()),
            Err(err) => return Err(err),
        };

        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        let outcome = match cmd {
            "" => Ok(()),
            "menu" | "help" => print_menu(output).map_err(PromptError::from),
            "quit" | "exit" => {
                writeln!(output, "Exiting program.")?;
                return Ok(());
            }
            "create" => create(agenda, input, output, max_attempts),
            "search" => read_query(input, output).and_then(|query| -> PromptResult<()> {
                match agenda.find(&query) {
                    Some(appointment) => writeln!(output, "Found: {appointment}")?,
                    None => writeln!(output, "No matching appointment found.")?,
                }
                Ok(())
            }),
            "delete" => read_query(input, output).and_then(|query| -> PromptResult<()> {
                match agenda.take(&query) {
                    Some(appointment) => writeln!(output, "Deleted: {appointment}")?,
                    None => writeln!(output, "No matching appointment found.")?,
                }
                Ok(())
            }),
            "list" => print_appointments(output, agenda.list_all()).map_err(PromptError::from),
            "day" => prompt::prompt_day(input, output, max_attempts).and_then(|day| {
                print_appointments(output, agenda.list_on_date(day)).map_err(PromptError::from)
            }),
            "clear" => {
                agenda.clear();
                writeln!(output, "All appointments deleted.")?;
                Ok(())
            }
            "save" => {
                match store.save_agenda(agenda) {
                    Ok(()) => writeln!(
                        output,
                        "Saved {} appointments to {}.",
                        agenda.len(),
                        store.path().display()
                    )?,
                    Err(err) => writeln!(output, "Error: {err}")?,
                }
                Ok(())
            }
            "export" => {
                match parts.next() {
                    Some(path) => match save_agenda_to_json(agenda, path) {
                        Ok(()) => {
                            writeln!(output, "Exported {} appointments to {path}.", agenda.len())?
                        }
                        Err(err) => writeln!(output, "Error: {err}")?,
                    },
                    None => writeln!(output, "Usage: export <path>")?,
                }
                Ok(())
            }
            "import" => {
                match parts.next() {
                    Some(path) => match load_agenda_from_json(path, Local::now()) {
                        Ok(report) => {
                            let imported = report.agenda.len();
                            for status in report.status_lines(path) {
                                writeln!(output, "{status}")?;
                            }
                            agenda.extend(report.agenda);
                            writeln!(output, "Imported {imported} appointments from {path}.")?;
                        }
                        Err(err) => writeln!(output, "Error: {err}")?,
                    },
                    None => writeln!(output, "Usage: import <path>")?,
                }
                Ok(())
            }
            _ => {
                writeln!(
                    output,
                    "Unrecognized command. Try 'menu' for a list of supported commands"
                )?;
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {}
            Err(PromptError::TooManyAttempts { attempts }) => {
                writeln!(output, "Giving up after {attempts} invalid inputs.")?;
            }
            Err(PromptError::InputClosed) => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.as_str()),
    )
    .init();

    let path = match args.file {
        Some(path) => path,
        None => {
            println!("No filename provided, using '{DEFAULT_FILE}'");
            PathBuf::from(DEFAULT_FILE)
        }
    };
    let store = TextFileStore::new(path);

    let report = store.load_agenda(Local::now());
    for status in report.status_lines(&store.path().display().to_string()) {
        println!("{status}");
    }
    let mut agenda = report.agenda;

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = run_menu(
        &mut agenda,
        &store,
        &mut stdin.lock(),
        &mut stdout.lock(),
        args.max_attempts,
    ) {
        eprintln!("Error: {err}");
    }

    match store.save_agenda(&agenda) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Could not save {}: {err}", store.path().display());
            ExitCode::FAILURE
        }
    }
}

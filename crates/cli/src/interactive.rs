//! Line-driven dashboard session.
//!
//! Each input line is one user event; the dashboard is re-rendered after every event.

use dashboard_client::{view, DashboardApi, DashboardController};
use dashboard_types::PatientId;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  list                 show the dashboard
  select <n|id>        select a patient by list position or ID
  notes <text>         set session notes
  context <text>       set patient context
  summary <text>       set the summary to save
  insight              generate an insight from the session notes
  save                 save the summary for the selected patient
  reload               reload the patient list
  help                 show this help
  quit                 leave the dashboard";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Select(String),
    Notes(String),
    Context(String),
    Summary(String),
    Insight,
    Save,
    Reload,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "list" | "show" | "" => Ok(Self::List),
            "select" if !rest.is_empty() => Ok(Self::Select(rest.to_string())),
            "select" => Err("usage: select <n|id>".into()),
            "notes" => Ok(Self::Notes(rest.to_string())),
            "context" => Ok(Self::Context(rest.to_string())),
            "summary" => Ok(Self::Summary(rest.to_string())),
            "insight" => Ok(Self::Insight),
            "save" => Ok(Self::Save),
            "reload" => Ok(Self::Reload),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other} (try 'help')")),
        }
    }
}

/// Selects by 1-based list position when `target` is a valid position, otherwise by ID.
fn select(controller: &mut DashboardController, target: &str) -> bool {
    if let Ok(position) = target.parse::<usize>() {
        if let Some(patient) = position
            .checked_sub(1)
            .and_then(|i| controller.patients().get(i))
            .cloned()
        {
            controller.select_patient(&patient);
            return true;
        }
    }
    controller.select_by_id(&PatientId::from(target))
}

pub async fn run<A>(api: &A) -> anyhow::Result<()>
where
    A: DashboardApi + ?Sized,
{
    let mut controller = DashboardController::mount(api).await;
    println!("{}", view::render(&controller));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };
        tracing::debug!(?command, "dashboard command");

        match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::List => {}
            Command::Select(target) => {
                if !select(&mut controller, &target) {
                    println!("No patient matches '{target}'");
                    continue;
                }
            }
            Command::Notes(text) => controller.set_session_notes(text),
            Command::Context(text) => controller.set_patient_context(text),
            Command::Summary(text) => controller.set_summary(text),
            Command::Insight => controller.generate_insight(api).await,
            Command::Save => controller.save_summary(api).await,
            Command::Reload => controller.load_dashboard(api).await,
        }

        println!("{}", view::render(&controller));
    }

    Ok(())
}

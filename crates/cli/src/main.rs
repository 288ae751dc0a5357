use anyhow::Context;
use clap::{Parser, Subcommand};
use dashboard_client::config::DEFAULT_API_BASE;
use dashboard_client::{view, ClientConfig, DashboardApi, DashboardController, HttpDashboardApi};
use dashboard_types::PatientId;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod interactive;

#[derive(Parser)]
#[command(name = "therapist")]
#[command(about = "Therapist dashboard CLI")]
struct Cli {
    /// Base URL of the dashboard service
    #[arg(long, env = "API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,
    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long, env = "API_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the dashboard service is reachable
    Health,
    /// List all patients
    Patients,
    /// Generate an insight from session notes
    Insight {
        /// Session notes
        #[arg(long)]
        notes: String,
        /// Optional patient context (age, diagnosis, etc.)
        #[arg(long, default_value = "")]
        context: String,
    },
    /// Save a patient's summary
    SaveSummary {
        /// Patient ID
        patient_id: String,
        /// New summary text
        summary: String,
        /// Session notes to store alongside the summary
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Open the interactive dashboard
    Dashboard,
}

/// Loads the roster and selects `patient_id`.
///
/// A failed load is reported as such rather than as an unknown patient.
async fn controller_for_patient<A>(
    api: &A,
    patient_id: &PatientId,
) -> anyhow::Result<DashboardController>
where
    A: DashboardApi + ?Sized,
{
    let dashboard = api
        .dashboard()
        .await
        .context("Could not load the patient roster")?;

    let mut controller = DashboardController::new();
    controller.apply_dashboard(Ok(dashboard));
    if !controller.select_by_id(patient_id) {
        anyhow::bail!("No patient with ID: {}", patient_id);
    }
    Ok(controller)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dashboard_client=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(&cli.api_base)?;
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let api = HttpDashboardApi::new(config)?;

    match cli.command {
        Some(Commands::Health) => {
            let res = api.health().await?;
            println!("{} (ok: {})", res.message, res.ok);
        }
        Some(Commands::Patients) => {
            let controller = DashboardController::mount(&api).await;
            if controller.patients().is_empty() {
                println!("{}", view::NO_PATIENTS);
            } else {
                for patient in controller.patients() {
                    println!(
                        "ID: {}, Name: {}, Status: {}, Last visit: {}",
                        patient.patient_id,
                        patient.name,
                        patient.status,
                        patient.last_visit.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Some(Commands::Insight { notes, context }) => {
            let mut controller = DashboardController::new();
            controller.set_session_notes(notes);
            controller.set_patient_context(context);
            controller.generate_insight(&api).await;

            if let Some(status) = controller.status().filter(|s| s.is_error()) {
                anyhow::bail!("{}", status.text());
            }
            println!("{}", controller.insight().unwrap_or_default());
        }
        Some(Commands::SaveSummary {
            patient_id,
            summary,
            notes,
        }) => {
            let mut controller =
                controller_for_patient(&api, &PatientId::from(patient_id)).await?;
            controller.set_session_notes(notes);
            controller.set_summary(summary);
            controller.save_summary(&api).await;

            match controller.status() {
                Some(status) if status.is_error() => anyhow::bail!("{}", status.text()),
                Some(status) => println!("{}", status.text()),
                None => {}
            }
        }
        Some(Commands::Dashboard) => {
            interactive::run(&api).await?;
        }
        None => {
            println!("Use 'therapist --help' for commands");
        }
    }

    Ok(())
}

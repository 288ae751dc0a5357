use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use dashboard_core::config::{optional_env_value, timeout_secs_from_env_value};
use dashboard_core::constants::DEFAULT_INSIGHT_MODEL;
use dashboard_core::{
    CoreConfig, DEFAULT_PATIENT_DATA_DIR, InsightSettings, PatientRepository,
    insight_service_from_config,
};

/// Main entry point for the therapist dashboard service
///
/// Serves the REST API (`/health`, `/dashboard`, `/insight`, `/summary`) with Swagger UI at
/// `/swagger-ui`.
///
/// # Environment Variables
/// - `DASHBOARD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory holding `patients.json` (default: "patient_data")
/// - `INSIGHT_API_URL`: Messages-API endpoint; insight generation is disabled when unset
/// - `INSIGHT_API_KEY`: Key sent as `x-api-key`
/// - `INSIGHT_MODEL`: Model identifier
/// - `INSIGHT_TIMEOUT_SECS`: Model request timeout (default: 60)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("therapist_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("DASHBOARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let patient_data_dir = optional_env_value(std::env::var("PATIENT_DATA_DIR").ok())
        .unwrap_or_else(|| DEFAULT_PATIENT_DATA_DIR.into());

    let insight = InsightSettings {
        api_url: optional_env_value(std::env::var("INSIGHT_API_URL").ok()),
        api_key: optional_env_value(std::env::var("INSIGHT_API_KEY").ok()),
        model: optional_env_value(std::env::var("INSIGHT_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_INSIGHT_MODEL.into()),
        timeout_secs: timeout_secs_from_env_value(std::env::var("INSIGHT_TIMEOUT_SECS").ok())?,
    };
    let cfg = CoreConfig::new(PathBuf::from(patient_data_dir), insight)?;

    let patients = Arc::new(PatientRepository::open(&cfg)?);
    let insight = insight_service_from_config(&cfg)?;

    tracing::info!(
        "++ Patient data in {}",
        cfg.patient_data_dir().display()
    );
    if insight.is_configured() {
        tracing::info!("++ Insight model {}", cfg.insight().model);
    } else {
        tracing::info!("++ Insight generation disabled");
    }
    tracing::info!("++ Starting therapist dashboard REST on {}", rest_addr);

    let app = api_rest::router(AppState::new(patients, insight));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

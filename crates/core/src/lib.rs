//! # Dashboard Core
//!
//! Core business logic behind the therapist dashboard service.
//!
//! This crate contains pure data and generation operations:
//! - Patient roster storage with JSON persistence under `PATIENT_DATA_DIR`
//! - Summary updates with validation and timestamps
//! - Insight generation through a pluggable model client
//!
//! **No API concerns**: HTTP routing, status codes and CORS belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod insight;
pub mod llm;
pub mod patients;

pub use config::{CoreConfig, InsightSettings};
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use error::{InsightError, InsightResult, PatientError, PatientResult};
pub use insight::{InsightOutcome, InsightService};
pub use llm::{LlmClient, MessagesApiClient};
pub use patients::{PatientRepository, StoredPatient, SummaryUpdate, UpdatedSummary};

use std::sync::Arc;

/// Builds the insight service described by the configuration.
///
/// Without `INSIGHT_API_URL` the service is returned unconfigured and every insight request
/// fails with `InsightError::NotConfigured`.
///
/// # Errors
/// Returns `InsightError::ClientBuild` if the HTTP client cannot be constructed.
pub fn insight_service_from_config(cfg: &CoreConfig) -> InsightResult<InsightService> {
    if cfg.insight().api_url.is_none() {
        tracing::warn!("INSIGHT_API_URL not set; insight generation disabled");
        return Ok(InsightService::unconfigured());
    }
    let client = MessagesApiClient::from_settings(cfg.insight())?;
    Ok(InsightService::new(Arc::new(client)))
}

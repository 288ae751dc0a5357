//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services. Request
//! handling never reads process-wide environment variables, which keeps behaviour consistent in
//! multi-threaded runtimes and test harnesses.

use crate::constants::{
    DEFAULT_INSIGHT_MODEL, DEFAULT_INSIGHT_TIMEOUT_SECS, PATIENTS_FILENAME,
};
use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};

/// Settings for the model endpoint behind `/insight`.
#[derive(Clone, Debug, PartialEq)]
pub struct InsightSettings {
    /// Messages-API compatible endpoint. `None` leaves insight generation unconfigured.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: DEFAULT_INSIGHT_MODEL.into(),
            timeout_secs: DEFAULT_INSIGHT_TIMEOUT_SECS,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    insight: InsightSettings,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    /// Returns `PatientError::InvalidInput` if the model name is blank or the model endpoint is
    /// not an `http(s)` URL.
    pub fn new(patient_data_dir: PathBuf, insight: InsightSettings) -> PatientResult<Self> {
        if insight.model.trim().is_empty() {
            return Err(PatientError::InvalidInput(
                "insight model cannot be empty".into(),
            ));
        }

        if let Some(url) = &insight.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PatientError::InvalidInput(format!(
                    "INSIGHT_API_URL must be an http(s) URL, got {url}"
                )));
            }
        }

        Ok(Self {
            patient_data_dir,
            insight,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn patients_file(&self) -> PathBuf {
        self.patient_data_dir.join(PATIENTS_FILENAME)
    }

    pub fn insight(&self) -> &InsightSettings {
        &self.insight
    }
}

/// Normalise an optional environment value: trimmed, and `None` when blank.
pub fn optional_env_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the model request timeout from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn timeout_secs_from_env_value(value: Option<String>) -> PatientResult<u64> {
    let Some(value) = optional_env_value(value) else {
        return Ok(DEFAULT_INSIGHT_TIMEOUT_SECS);
    };

    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(PatientError::InvalidInput(format!(
            "INSIGHT_TIMEOUT_SECS must be a positive integer, got {value}"
        ))),
        Ok(secs) => Ok(secs),
    }
}

//! Constants used throughout the dashboard core crate.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Filename of the patient roster inside the patient data directory.
pub const PATIENTS_FILENAME: &str = "patients.json";

/// Status reported for patients whose record carries none.
pub const DEFAULT_PATIENT_STATUS: &str = "active";

/// Model identifier reported when `INSIGHT_MODEL` is not set.
pub const DEFAULT_INSIGHT_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Timeout applied to model requests when `INSIGHT_TIMEOUT_SECS` is not set.
pub const DEFAULT_INSIGHT_TIMEOUT_SECS: u64 = 60;

pub const INSIGHT_MAX_TOKENS: u32 = 1000;

pub const INSIGHT_TEMPERATURE: f32 = 0.3;

/// Version header sent to Messages-API compatible endpoints.
pub const MESSAGES_API_VERSION: &str = "2023-06-01";

/// Text returned when the model produced nothing usable.
pub const NO_INSIGHT_TEXT: &str = "No insight generated.";

//! Request and response bodies for the dashboard endpoints.
//!
//! Every optional or server-filled field is `#[serde(default)]` so that clients tolerate
//! partial bodies: a dashboard response without `patients` is an empty roster, an error body
//! without `message` falls back to the caller's own text.

use dashboard_types::PatientId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads any JSON scalar as text: strings as-is, numbers and booleans in their JSON form.
///
/// `null` stays `None`. A date stored as `20240502` is shown rather than failing the whole
/// roster.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One row of the patient roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    #[schema(value_type = String)]
    pub patient_id: PatientId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_visit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
}

/// `GET /dashboard`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardRes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub patients: Vec<Patient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: usize,
}

/// `POST /insight` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InsightReq {
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patient_context: String,
}

/// `POST /insight` success body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InsightRes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub insight: String,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
}

/// `POST /summary` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryReq {
    #[serde(default)]
    #[schema(value_type = String)]
    pub patient_id: PatientId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_notes: String,
}

/// `POST /summary` success body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryRes {
    #[serde(default)]
    #[schema(value_type = String)]
    pub patient_id: PatientId,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub message: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }

    /// The user-facing message, if the server sent a non-empty one.
    pub fn display_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

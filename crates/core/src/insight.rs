//! Insight generation from therapy session notes.

use crate::constants::NO_INSIGHT_TEXT;
use crate::error::{InsightError, InsightResult};
use crate::llm::LlmClient;
use chrono::{DateTime, SecondsFormat, Utc};
use dashboard_types::NonEmptyText;
use std::sync::Arc;

/// A generated insight and its provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct InsightOutcome {
    pub insight: String,
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
}

impl InsightOutcome {
    pub fn generated_at_rfc3339(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Builds the model prompt.
///
/// The context line is omitted entirely when no context was given.
pub fn build_prompt(session_notes: &NonEmptyText, patient_context: &str) -> String {
    let context = patient_context.trim();
    let context_line = if context.is_empty() {
        String::new()
    } else {
        format!("Patient Context: {context}\n\n")
    };

    format!(
        "You are a compassionate healthcare assistant helping a therapist reflect on a \
         session. Offer supportive, professional insights focused on the patient's progress \
         and well-being.\n\n\
         Session Notes:\n{notes}\n\n\
         {context_line}\
         Please provide:\n\
         1. Key themes or patterns observed\n\
         2. Signs of progress or positive developments\n\
         3. Areas that may benefit from continued attention\n\
         4. Gentle recommendations for future sessions\n\n\
         Keep the response supportive, professional, and focused on the patient's growth.",
        notes = session_notes.as_str(),
    )
}

/// Turns session notes into an insight via the configured model client.
#[derive(Clone)]
pub struct InsightService {
    client: Option<Arc<dyn LlmClient>>,
}

impl InsightService {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A service that rejects every request with `InsightError::NotConfigured`.
    pub fn unconfigured() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Generates an insight for the given notes.
    ///
    /// # Errors
    /// - `InsightError::EmptyNotes` if the notes are blank (checked before anything else).
    /// - `InsightError::NotConfigured` if no model client is available.
    /// - Any error from the model client.
    pub async fn generate(
        &self,
        session_notes: &str,
        patient_context: &str,
    ) -> InsightResult<InsightOutcome> {
        let notes = NonEmptyText::new(session_notes).map_err(|_| InsightError::EmptyNotes)?;
        let client = self.client.as_ref().ok_or(InsightError::NotConfigured)?;

        let prompt = build_prompt(&notes, patient_context);
        let mut insight = client.generate(&prompt).await?;
        if insight.trim().is_empty() {
            tracing::warn!("model response missing insight content");
            insight = NO_INSIGHT_TEXT.to_string();
        }

        Ok(InsightOutcome {
            insight,
            generated_at: Utc::now(),
            model_used: client.model().to_string(),
        })
    }
}

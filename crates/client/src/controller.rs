//! Dashboard view state and the operations that change it.
//!
//! The controller owns everything the dashboard shows: the roster, the selected patient, the
//! per-session form fields, the last insight, the loading flag and the status line. Front-ends
//! feed it events (selection, typing, button presses) and render from its getters.
//!
//! ## Requests
//!
//! Each network action is split in two so a front-end can keep accepting events while a request
//! is in flight:
//!
//! 1. `begin_*` validates the form, allocates a [`RequestToken`] and returns the request to send
//!    (or `None` when validation fails or there is nothing to do);
//! 2. `complete_*` applies the outcome, but only if its token is still the latest one for that
//!    action. Older outcomes are dropped.
//!
//! `generate_insight` and `save_summary` run both halves around a single await for callers that
//! handle one event at a time.

use crate::api::{ApiError, DashboardApi};
use crate::status::StatusMessage;
use api_shared::dto::{DashboardRes, InsightReq, InsightRes, Patient, SummaryReq, SummaryRes};
use dashboard_types::PatientId;

pub const NOTES_REQUIRED: &str = "Session notes are required for insight generation.";
pub const SUMMARY_REQUIRED: &str = "Summary cannot be empty.";
pub const SUMMARY_SAVED: &str = "Summary saved successfully.";
pub const INSIGHT_SERVER_FALLBACK: &str = "Error generating insight";
pub const INSIGHT_TRANSPORT_FALLBACK: &str = "Error calling insight API";
pub const SUMMARY_SERVER_FALLBACK: &str = "Error saving summary";
pub const SUMMARY_TRANSPORT_FALLBACK: &str = "Error calling summary API";

/// Monotonically increasing id handed to each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// An accepted insight request awaiting its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInsight {
    token: RequestToken,
    request: InsightReq,
}

impl PendingInsight {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn request(&self) -> &InsightReq {
        &self.request
    }
}

/// An accepted summary save awaiting its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    token: RequestToken,
    request: SummaryReq,
}

impl PendingSave {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn request(&self) -> &SummaryReq {
        &self.request
    }
}

#[derive(Debug, Default)]
pub struct DashboardController {
    patients: Vec<Patient>,
    selected: Option<Patient>,
    session_notes: String,
    patient_context: String,
    insight: Option<String>,
    summary: String,
    status: Option<StatusMessage>,
    next_token: u64,
    insight_in_flight: Option<RequestToken>,
    save_in_flight: Option<RequestToken>,
}

impl DashboardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller and loads the roster once.
    pub async fn mount<A>(api: &A) -> Self
    where
        A: DashboardApi + ?Sized,
    {
        let mut controller = Self::new();
        controller.load_dashboard(api).await;
        controller
    }

    // ------------------------------------------------------------------------
    // Dashboard loader
    // ------------------------------------------------------------------------

    pub async fn load_dashboard<A>(&mut self, api: &A)
    where
        A: DashboardApi + ?Sized,
    {
        let outcome = api.dashboard().await;
        self.apply_dashboard(outcome);
    }

    /// Replaces the roster with a dashboard outcome.
    ///
    /// Failures are logged and leave the roster empty. The roster is always replaced, never
    /// extended, so repeated loads of the same data yield the same collection.
    pub fn apply_dashboard(&mut self, outcome: Result<DashboardRes, ApiError>) {
        match outcome {
            Ok(res) => {
                tracing::debug!("loaded {} patients", res.patients.len());
                self.patients = res.patients;
            }
            Err(e) => {
                tracing::error!("failed to load dashboard: {}", e);
                self.patients = Vec::new();
            }
        }
    }

    // ------------------------------------------------------------------------
    // Patient selector
    // ------------------------------------------------------------------------

    /// Makes `patient` the selected patient and resets the per-session fields.
    ///
    /// The summary field is seeded from the patient's stored summary. An insight still in flight
    /// belongs to the previous patient's notes, so it is abandoned. A save in flight is kept: it
    /// carries its own patient id and its result is still true.
    pub fn select_patient(&mut self, patient: &Patient) {
        self.selected = Some(patient.clone());
        self.summary = patient.summary.clone().unwrap_or_default();
        self.insight = None;
        self.session_notes.clear();
        self.patient_context.clear();
        self.status = None;
        self.insight_in_flight = None;
    }

    /// Selects the roster entry with the given id. Returns `false` if there is none.
    pub fn select_by_id(&mut self, patient_id: &PatientId) -> bool {
        let Some(patient) = self
            .patients
            .iter()
            .find(|p| &p.patient_id == patient_id)
            .cloned()
        else {
            return false;
        };
        self.select_patient(&patient);
        true
    }

    // ------------------------------------------------------------------------
    // Form fields
    // ------------------------------------------------------------------------

    pub fn set_session_notes(&mut self, notes: impl Into<String>) {
        self.session_notes = notes.into();
    }

    pub fn set_patient_context(&mut self, context: impl Into<String>) {
        self.patient_context = context.into();
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }

    // ------------------------------------------------------------------------
    // Insight generator
    // ------------------------------------------------------------------------

    /// Validates the session notes and starts an insight request.
    ///
    /// Blank notes set the "notes required" message and return `None`.
    pub fn begin_insight(&mut self) -> Option<PendingInsight> {
        if self.session_notes.trim().is_empty() {
            self.status = Some(StatusMessage::error(NOTES_REQUIRED));
            return None;
        }

        let token = self.next_token();
        self.insight_in_flight = Some(token);
        self.status = None;

        Some(PendingInsight {
            token,
            request: InsightReq {
                session_notes: self.session_notes.clone(),
                patient_context: self.patient_context.clone(),
            },
        })
    }

    /// Applies an insight outcome. Returns `false` if the request was superseded.
    pub fn complete_insight(
        &mut self,
        pending: PendingInsight,
        outcome: Result<InsightRes, ApiError>,
    ) -> bool {
        if self.insight_in_flight != Some(pending.token) {
            tracing::debug!("dropping stale insight outcome {:?}", pending.token);
            return false;
        }
        self.insight_in_flight = None;

        match outcome {
            Ok(res) => {
                self.insight = Some(res.insight).filter(|text| !text.is_empty());
            }
            Err(e) => {
                self.status = Some(failure_message(
                    e,
                    INSIGHT_SERVER_FALLBACK,
                    INSIGHT_TRANSPORT_FALLBACK,
                ));
            }
        }
        true
    }

    pub async fn generate_insight<A>(&mut self, api: &A)
    where
        A: DashboardApi + ?Sized,
    {
        let Some(pending) = self.begin_insight() else {
            return;
        };
        let outcome = api.insight(pending.request()).await;
        self.complete_insight(pending, outcome);
    }

    // ------------------------------------------------------------------------
    // Summary saver
    // ------------------------------------------------------------------------

    /// Validates the summary and starts a save for the selected patient.
    ///
    /// Without a selection this is a silent no-op. A blank summary sets the "summary cannot be
    /// empty" message. Both return `None`.
    pub fn begin_save_summary(&mut self) -> Option<PendingSave> {
        let patient_id = self.selected.as_ref()?.patient_id.clone();
        if self.summary.trim().is_empty() {
            self.status = Some(StatusMessage::error(SUMMARY_REQUIRED));
            return None;
        }

        let token = self.next_token();
        self.save_in_flight = Some(token);
        self.status = None;

        Some(PendingSave {
            token,
            request: SummaryReq {
                patient_id,
                summary: self.summary.clone(),
                session_notes: self.session_notes.clone(),
            },
        })
    }

    /// Applies a save outcome. Returns `false` if the request was superseded.
    ///
    /// On success every roster entry with the saved id gets the submitted summary, as does the
    /// selected copy when it is the same patient. The response body never changes local state.
    pub fn complete_save_summary(
        &mut self,
        pending: PendingSave,
        outcome: Result<Option<SummaryRes>, ApiError>,
    ) -> bool {
        if self.save_in_flight != Some(pending.token) {
            tracing::debug!("dropping stale summary outcome {:?}", pending.token);
            return false;
        }
        self.save_in_flight = None;

        match outcome {
            Ok(_) => {
                let PendingSave { request, .. } = pending;
                self.patch_summary(&request.patient_id, &request.summary);
                self.status = Some(StatusMessage::success(SUMMARY_SAVED));
            }
            Err(e) => {
                self.status = Some(failure_message(
                    e,
                    SUMMARY_SERVER_FALLBACK,
                    SUMMARY_TRANSPORT_FALLBACK,
                ));
            }
        }
        true
    }

    pub async fn save_summary<A>(&mut self, api: &A)
    where
        A: DashboardApi + ?Sized,
    {
        let Some(pending) = self.begin_save_summary() else {
            return;
        };
        let outcome = api.save_summary(pending.request()).await;
        self.complete_save_summary(pending, outcome);
    }

    fn patch_summary(&mut self, patient_id: &PatientId, summary: &str) {
        for patient in self
            .patients
            .iter_mut()
            .filter(|p| &p.patient_id == patient_id)
        {
            patient.summary = Some(summary.to_string());
        }
        if let Some(selected) = self
            .selected
            .as_mut()
            .filter(|p| &p.patient_id == patient_id)
        {
            selected.summary = Some(summary.to_string());
        }
    }

    fn next_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn selected(&self) -> Option<&Patient> {
        self.selected.as_ref()
    }

    pub fn session_notes(&self) -> &str {
        &self.session_notes
    }

    pub fn patient_context(&self) -> &str {
        &self.patient_context
    }

    pub fn insight(&self) -> Option<&str> {
        self.insight.as_deref()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// The status text, or `""` when there is none.
    pub fn message(&self) -> &str {
        self.status.as_ref().map(StatusMessage::text).unwrap_or("")
    }

    /// True while either action has a live request.
    pub fn is_loading(&self) -> bool {
        self.insight_in_flight.is_some() || self.save_in_flight.is_some()
    }
}

fn failure_message(
    error: ApiError,
    server_fallback: &str,
    transport_fallback: &str,
) -> StatusMessage {
    match error {
        ApiError::Server { message, .. } => StatusMessage::error(
            message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| server_fallback.to_string()),
        ),
        _ => StatusMessage::error(transport_fallback),
    }
}

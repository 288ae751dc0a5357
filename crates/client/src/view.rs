//! Plain-text rendering of the dashboard.
//!
//! Roster rows are numbered from 1 so a terminal user can pick a patient by position.

use crate::controller::DashboardController;
use std::fmt::Write;

pub const TITLE: &str = "Therapist Dashboard AI";
pub const NO_PATIENTS: &str = "No patients found.";
pub const NO_SUMMARY: &str = "(No summary)";

/// Renders the roster and, when a patient is selected, the detail form.
pub fn render(controller: &DashboardController) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_dashboard(&mut out, controller);
    out
}

fn write_dashboard(out: &mut String, controller: &DashboardController) -> std::fmt::Result {
    writeln!(out, "{TITLE}")?;
    writeln!(out)?;
    writeln!(out, "Patients")?;

    if controller.patients().is_empty() {
        writeln!(out, "  {NO_PATIENTS}")?;
    }
    let selected_id = controller.selected().map(|p| &p.patient_id);
    for (index, patient) in controller.patients().iter().enumerate() {
        let marker = if selected_id == Some(&patient.patient_id) {
            '>'
        } else {
            ' '
        };
        writeln!(
            out,
            "{marker} [{}] {} ({})",
            index + 1,
            patient.name,
            patient.status
        )?;
    }

    let Some(selected) = controller.selected() else {
        return Ok(());
    };

    let loading = controller.is_loading();
    let current_summary = selected
        .summary
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUMMARY);

    writeln!(out)?;
    writeln!(out, "Patient: {}", selected.name)?;
    writeln!(
        out,
        "Last Visit: {}",
        selected.last_visit.as_deref().unwrap_or("")
    )?;
    writeln!(out, "Current Summary: {current_summary}")?;
    writeln!(out)?;
    writeln!(out, "Session notes: {}", controller.session_notes())?;
    writeln!(out, "Patient context: {}", controller.patient_context())?;
    writeln!(
        out,
        "[{}]",
        if loading {
            "Generating..."
        } else {
            "Generate Insight"
        }
    )?;

    if let Some(insight) = controller.insight() {
        writeln!(out)?;
        writeln!(out, "Insight:")?;
        for line in insight.lines() {
            writeln!(out, "  {line}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Edit Summary: {}", controller.summary())?;
    writeln!(
        out,
        "[{}]",
        if loading { "Saving..." } else { "Save Summary" }
    )?;

    if let Some(status) = controller.status() {
        let tag = if status.is_error() { "error" } else { "ok" };
        writeln!(out)?;
        writeln!(out, "[{tag}] {}", status.text())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use api_shared::dto::{DashboardRes, InsightRes, Patient};
    use dashboard_types::PatientId;

    fn loaded(patients: Vec<Patient>) -> DashboardController {
        let mut controller = DashboardController::new();
        controller.apply_dashboard(Ok(DashboardRes {
            count: patients.len(),
            patients,
        }));
        controller
    }

    fn patient(id: &str, name: &str, summary: Option<&str>) -> Patient {
        Patient {
            patient_id: PatientId::from(id),
            name: name.into(),
            status: "active".into(),
            last_visit: Some("2024-05-02".into()),
            summary: summary.map(str::to_string),
        }
    }

    #[test]
    fn empty_roster_shows_placeholder_and_no_detail() {
        let text = render(&loaded(Vec::new()));

        assert!(text.starts_with(TITLE));
        assert!(text.contains(NO_PATIENTS));
        assert!(!text.contains("Patient:"));
    }

    #[test]
    fn selected_patient_is_marked_and_detailed() {
        let mut controller = loaded(vec![
            patient("1", "Ada Byron", Some("")),
            patient("2", "Grace Hopper", Some("Stable")),
        ]);
        controller.select_by_id(&PatientId::from("1"));

        let text = render(&controller);

        assert!(text.contains("> [1] Ada Byron (active)"));
        assert!(text.contains("  [2] Grace Hopper (active)"));
        assert!(text.contains("Patient: Ada Byron"));
        assert!(text.contains("Last Visit: 2024-05-02"));
        assert!(text.contains("Current Summary: (No summary)"));
        assert!(text.contains("[Generate Insight]"));
        assert!(text.contains("[Save Summary]"));
    }

    #[test]
    fn loading_changes_button_labels() {
        let mut controller = loaded(vec![patient("1", "Ada Byron", None)]);
        controller.select_by_id(&PatientId::from("1"));
        controller.set_session_notes("notes");
        let pending = controller.begin_insight().unwrap();

        let text = render(&controller);
        assert!(text.contains("[Generating...]"));
        assert!(text.contains("[Saving...]"));

        controller.complete_insight(
            pending,
            Ok(InsightRes {
                insight: "Line one\nLine two".into(),
                ..InsightRes::default()
            }),
        );
        let text = render(&controller);
        assert!(text.contains("Insight:\n  Line one\n  Line two"));
    }

    #[test]
    fn status_is_tagged_by_kind() {
        let mut controller = loaded(vec![patient("1", "Ada Byron", Some("old"))]);
        controller.select_by_id(&PatientId::from("1"));
        controller.set_summary("new");
        let pending = controller.begin_save_summary().unwrap();
        controller.complete_save_summary(
            pending,
            Err(ApiError::Server {
                status: 409,
                message: Some("Patient locked".into()),
            }),
        );

        assert!(render(&controller).contains("[error] Patient locked"));

        let pending = controller.begin_save_summary().unwrap();
        controller.complete_save_summary(pending, Ok(None));
        assert!(render(&controller).contains("[ok] Summary saved successfully."));
    }
}

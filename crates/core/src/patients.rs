//! Patient roster storage.
//!
//! Patients live in a single JSON array at `<PATIENT_DATA_DIR>/patients.json`:
//!
//! ```text
//! patient_data/
//!   patients.json
//! ```
//!
//! The repository keeps the roster in memory behind a `RwLock` and rewrites the file on every
//! summary update (temp file + rename, so a crash never leaves a half-written roster). A missing
//! file is an empty roster. [`PatientRepository::in_memory`] skips the file entirely.
//!
//! ## Pure Data Operations
//!
//! This module contains **only** data operations. HTTP status mapping belongs in `api-rest`.

use crate::config::CoreConfig;
use crate::constants::DEFAULT_PATIENT_STATUS;
use crate::error::{PatientError, PatientResult};
use api_shared::dto;
use chrono::{DateTime, SecondsFormat, Utc};
use dashboard_types::{NonEmptyText, PatientId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A patient record as held in the data file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredPatient {
    pub patient_id: PatientId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_session_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl StoredPatient {
    pub fn new(
        patient_id: impl Into<PatientId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            status: None,
            last_visit: None,
            summary: None,
            latest_session_notes: None,
            last_updated: None,
        }
    }

    /// `"<first> <last>"`, trimmed so a missing half leaves no stray space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Projection used by `GET /dashboard`.
    pub fn to_roster_entry(&self) -> dto::Patient {
        dto::Patient {
            patient_id: self.patient_id.clone(),
            name: self.display_name(),
            status: self
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_PATIENT_STATUS.to_string()),
            last_visit: self.last_visit.clone(),
            summary: Some(self.summary.clone().unwrap_or_default()),
        }
    }
}

/// A validated summary update.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryUpdate {
    pub patient_id: PatientId,
    pub summary: NonEmptyText,
    pub session_notes: Option<String>,
}

impl SummaryUpdate {
    /// Validates a `POST /summary` body.
    ///
    /// # Errors
    /// - `PatientError::MissingPatientId` if the id is blank.
    /// - `PatientError::EmptySummary` if the summary is blank.
    pub fn parse(req: &dto::SummaryReq) -> PatientResult<Self> {
        if req.patient_id.is_blank() {
            return Err(PatientError::MissingPatientId);
        }
        let summary = NonEmptyText::new(&req.summary).map_err(|_| PatientError::EmptySummary)?;
        let session_notes = if req.session_notes.is_empty() {
            None
        } else {
            Some(req.session_notes.clone())
        };

        Ok(Self {
            patient_id: req.patient_id.trimmed(),
            summary,
            session_notes,
        })
    }
}

/// Result of a successful summary update.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdatedSummary {
    pub patient_id: PatientId,
    pub summary: String,
    pub last_updated: DateTime<Utc>,
}

impl UpdatedSummary {
    pub fn last_updated_rfc3339(&self) -> String {
        self.last_updated.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Roster storage shared by all request handlers.
#[derive(Debug)]
pub struct PatientRepository {
    data_file: Option<PathBuf>,
    patients: RwLock<Vec<StoredPatient>>,
}

impl PatientRepository {
    /// A repository that never touches the filesystem.
    pub fn in_memory(patients: Vec<StoredPatient>) -> Self {
        Self {
            data_file: None,
            patients: RwLock::new(patients),
        }
    }

    /// Opens the roster under the configured patient data directory.
    ///
    /// The directory is created if missing. A missing `patients.json` yields an empty roster.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file cannot be read/parsed.
    pub fn open(cfg: &CoreConfig) -> PatientResult<Self> {
        fs::create_dir_all(cfg.patient_data_dir()).map_err(PatientError::StorageDirCreation)?;

        let data_file = cfg.patients_file();
        let patients = load_patients(&data_file)?;
        tracing::info!(
            "loaded {} patients from {}",
            patients.len(),
            data_file.display()
        );

        Ok(Self {
            data_file: Some(data_file),
            patients: RwLock::new(patients),
        })
    }

    /// Lists the roster in stored order.
    ///
    /// A file-backed repository re-reads `patients.json` first, so edits made on disk show up
    /// without a restart.
    ///
    /// # Errors
    /// Returns an error if the data file cannot be read or parsed.
    pub fn list_patients(&self) -> PatientResult<Vec<dto::Patient>> {
        let mut patients = self
            .patients
            .write()
            .map_err(|_| PatientError::LockPoisoned)?;
        self.reload(&mut patients)?;
        Ok(patients.iter().map(StoredPatient::to_roster_entry).collect())
    }

    fn reload(&self, patients: &mut Vec<StoredPatient>) -> PatientResult<()> {
        if let Some(path) = &self.data_file {
            *patients = load_patients(path)?;
        }
        Ok(())
    }

    /// Replaces a patient's summary and stamps `last_updated`.
    ///
    /// The roster is re-read from disk first. Session notes are recorded as
    /// `latest_session_notes` only when present. The file is written before the in-memory roster
    /// changes, so a failed write leaves both untouched.
    ///
    /// # Errors
    /// - `PatientError::NotFound` if no patient has the given id.
    /// - Serialization/IO errors from persisting the roster.
    pub fn update_summary(&self, update: SummaryUpdate) -> PatientResult<UpdatedSummary> {
        let mut patients = self
            .patients
            .write()
            .map_err(|_| PatientError::LockPoisoned)?;
        self.reload(&mut patients)?;

        let index = patients
            .iter()
            .position(|p| p.patient_id == update.patient_id)
            .ok_or_else(|| PatientError::NotFound(update.patient_id.clone()))?;

        let now = Utc::now();
        let mut next = patients.clone();
        let record = &mut next[index];
        record.summary = Some(update.summary.as_str().to_string());
        record.last_updated = Some(now);
        if let Some(notes) = update.session_notes {
            record.latest_session_notes = Some(notes);
        }

        if let Some(path) = &self.data_file {
            write_patients(path, &next)?;
        }
        *patients = next;

        Ok(UpdatedSummary {
            patient_id: update.patient_id,
            summary: update.summary.into_inner(),
            last_updated: now,
        })
    }
}

fn load_patients(path: &Path) -> PatientResult<Vec<StoredPatient>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path).map_err(PatientError::FileRead)?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents).map_err(PatientError::Deserialization)
}

fn write_patients(path: &Path, patients: &[StoredPatient]) -> PatientResult<()> {
    let json = serde_json::to_string_pretty(patients).map_err(PatientError::Serialization)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(PatientError::FileWrite)?;
    fs::rename(&tmp, path).map_err(PatientError::FileWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightSettings;
    use tempfile::TempDir;

    fn roster() -> Vec<StoredPatient> {
        let mut ada = StoredPatient::new("p-1", "Ada", "Byron");
        ada.summary = Some("Anxious about work".into());
        ada.last_visit = Some("2024-05-02".into());

        let mut grace = StoredPatient::new("p-2", "Grace", "");
        grace.status = Some("discharged".into());

        vec![ada, grace]
    }

    fn update(id: &str, summary: &str, notes: &str) -> SummaryUpdate {
        SummaryUpdate::parse(&dto::SummaryReq {
            patient_id: PatientId::from(id),
            summary: summary.into(),
            session_notes: notes.into(),
        })
        .expect("update should be valid")
    }

    fn stored(repo: &PatientRepository, id: &str) -> StoredPatient {
        let patients = repo.patients.read().unwrap();
        patients
            .iter()
            .find(|p| p.patient_id.as_str() == id)
            .cloned()
            .expect("patient should exist")
    }

    #[test]
    fn roster_entry_defaults_status_and_summary() {
        let repo = PatientRepository::in_memory(roster());
        let patients = repo.list_patients().unwrap();

        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].name, "Ada Byron");
        assert_eq!(patients[0].status, "active");
        assert_eq!(patients[0].summary.as_deref(), Some("Anxious about work"));
        assert_eq!(patients[1].name, "Grace");
        assert_eq!(patients[1].status, "discharged");
        assert_eq!(patients[1].summary.as_deref(), Some(""));
    }

    #[test]
    fn summary_update_rejects_blank_fields() {
        let blank_id = SummaryUpdate::parse(&dto::SummaryReq {
            patient_id: PatientId::from("  "),
            summary: "fine".into(),
            session_notes: String::new(),
        });
        assert!(matches!(blank_id, Err(PatientError::MissingPatientId)));

        let blank_summary = SummaryUpdate::parse(&dto::SummaryReq {
            patient_id: PatientId::from("p-1"),
            summary: " \n ".into(),
            session_notes: String::new(),
        });
        assert!(matches!(blank_summary, Err(PatientError::EmptySummary)));
    }

    #[test]
    fn update_summary_trims_and_records_notes() {
        let repo = PatientRepository::in_memory(roster());

        let updated = repo
            .update_summary(update(" p-1 ", "  Sleeping better  ", "Talked about routines"))
            .unwrap();

        assert_eq!(updated.patient_id.as_str(), "p-1");
        assert_eq!(updated.summary, "Sleeping better");

        let stored = stored(&repo, "p-1");
        assert_eq!(stored.summary.as_deref(), Some("Sleeping better"));
        assert_eq!(
            stored.latest_session_notes.as_deref(),
            Some("Talked about routines")
        );
        assert_eq!(stored.last_updated, Some(updated.last_updated));
    }

    #[test]
    fn update_summary_without_notes_keeps_previous_notes() {
        let mut patients = roster();
        patients[0].latest_session_notes = Some("earlier notes".into());
        let repo = PatientRepository::in_memory(patients);

        repo.update_summary(update("p-1", "new", "")).unwrap();

        let stored = stored(&repo, "p-1");
        assert_eq!(stored.latest_session_notes.as_deref(), Some("earlier notes"));
    }

    #[test]
    fn update_summary_unknown_patient_is_not_found() {
        let repo = PatientRepository::in_memory(roster());
        let err = repo.update_summary(update("p-404", "x", "")).unwrap_err();

        assert!(matches!(err, PatientError::NotFound(ref id) if id.as_str() == "p-404"));
        assert_eq!(err.to_string(), "no patient with ID: p-404");
    }

    #[test]
    fn open_missing_file_is_empty_and_updates_persist() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("patient_data");
        let cfg = CoreConfig::new(data_dir.clone(), InsightSettings::default()).unwrap();

        let repo = PatientRepository::open(&cfg).expect("open should succeed");
        assert!(repo.list_patients().unwrap().is_empty());
        assert!(data_dir.is_dir(), "data directory should be created");

        let json = serde_json::to_string(&roster()).unwrap();
        fs::write(cfg.patients_file(), json).unwrap();

        let repo = PatientRepository::open(&cfg).expect("reopen should succeed");
        repo.update_summary(update("p-2", "Ready for discharge", "final session"))
            .unwrap();

        let reopened = PatientRepository::open(&cfg).expect("reopen should succeed");
        reopened.list_patients().unwrap();
        let stored = stored(&reopened, "p-2");
        assert_eq!(stored.summary.as_deref(), Some("Ready for discharge"));
        assert!(stored.last_updated.is_some());
        assert!(
            !cfg.patients_file().with_extension("json.tmp").exists(),
            "temp file should be renamed away"
        );
    }

    #[test]
    fn open_rejects_malformed_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg =
            CoreConfig::new(temp_dir.path().to_path_buf(), InsightSettings::default()).unwrap();
        fs::write(cfg.patients_file(), "{not json").unwrap();

        let err = PatientRepository::open(&cfg).unwrap_err();
        assert!(matches!(err, PatientError::Deserialization(_)));
    }

    #[test]
    fn file_backed_roster_picks_up_disk_edits() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg =
            CoreConfig::new(temp_dir.path().to_path_buf(), InsightSettings::default()).unwrap();
        let repo = PatientRepository::open(&cfg).unwrap();

        fs::write(cfg.patients_file(), serde_json::to_string(&roster()).unwrap()).unwrap();
        assert_eq!(repo.list_patients().unwrap().len(), 2);

        fs::write(cfg.patients_file(), "[oops").unwrap();
        let err = repo.list_patients().unwrap_err();
        assert!(matches!(err, PatientError::Deserialization(_)));
    }

    #[test]
    fn failed_write_leaves_roster_untouched() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg =
            CoreConfig::new(temp_dir.path().to_path_buf(), InsightSettings::default()).unwrap();
        fs::write(cfg.patients_file(), serde_json::to_string(&roster()).unwrap()).unwrap();
        let repo = PatientRepository::open(&cfg).unwrap();
        fs::create_dir(cfg.patients_file().with_extension("json.tmp")).unwrap();

        let err = repo.update_summary(update("p-1", "new", "")).unwrap_err();

        assert!(matches!(err, PatientError::FileWrite(_)));
        let patients = repo.list_patients().unwrap();
        assert_eq!(patients[0].summary.as_deref(), Some("Anxious about work"));
    }
}

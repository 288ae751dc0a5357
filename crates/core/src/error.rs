use dashboard_types::PatientId;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("patient ID is required")]
    MissingPatientId,
    #[error("summary cannot be empty")]
    EmptySummary,
    #[error("no patient with ID: {0}")]
    NotFound(PatientId),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize patients: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patients: {0}")]
    Deserialization(serde_json::Error),
    #[error("patient store lock poisoned")]
    LockPoisoned,
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("session notes cannot be empty")]
    EmptyNotes,
    #[error("insight generation is not configured")]
    NotConfigured,
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("could not reach model endpoint {0}")]
    Connection(String),
    #[error("model request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("model endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("failed to parse model response: {0}")]
    ResponseParsing(String),
}

pub type InsightResult<T> = std::result::Result<T, InsightError>;

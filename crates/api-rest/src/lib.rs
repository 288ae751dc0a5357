//! # API REST
//!
//! REST API implementation for the therapist dashboard.
//!
//! Handles:
//! - HTTP endpoints with axum (`/health`, `/dashboard`, `/insight`, `/summary`)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON error bodies, status codes, CORS)
//!
//! Uses `api-shared` for wire types and `dashboard-core` for the work itself.

#![warn(rust_2018_idioms)]

use api_shared::dto::{
    DashboardRes, ErrorRes, HealthRes, InsightReq, InsightRes, Patient, SummaryReq, SummaryRes,
};
use api_shared::HealthService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use dashboard_core::{
    InsightError, InsightService, PatientError, PatientRepository, SummaryUpdate,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    patients: Arc<PatientRepository>,
    insight: InsightService,
}

impl AppState {
    pub fn new(patients: Arc<PatientRepository>, insight: InsightService) -> Self {
        Self { patients, insight }
    }
}

/// Error half of every handler result: a status plus a JSON `{ error, message }` body.
type ApiFailure = (StatusCode, Json<ErrorRes>);

fn failure(status: StatusCode, error: &str, message: impl Into<String>) -> ApiFailure {
    (status, Json(ErrorRes::new(error, message)))
}

#[derive(OpenApi)]
#[openapi(
    paths(health, dashboard, generate_insight, save_summary),
    components(schemas(
        HealthRes,
        Patient,
        DashboardRes,
        InsightReq,
        InsightRes,
        SummaryReq,
        SummaryRes,
        ErrorRes
    ))
)]
pub struct ApiDoc;

/// Builds the dashboard router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(dashboard))
        .route("/insight", post(generate_insight))
        .route("/summary", post(save_summary))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and by clients to verify `API_BASE` before loading the dashboard.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Patient roster", body = DashboardRes),
        (status = 500, description = "Roster could not be read", body = ErrorRes)
    )
)]
/// List the patient roster
///
/// # Errors
/// Returns `500 Internal Server Error` if the roster cannot be read.
#[axum::debug_handler]
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardRes>, ApiFailure> {
    match state.patients.list_patients() {
        Ok(patients) => {
            tracing::info!("Retrieved {} patients", patients.len());
            Ok(Json(DashboardRes {
                count: patients.len(),
                patients,
            }))
        }
        Err(e) => {
            tracing::error!("List patients error: {:?}", e);
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Unable to retrieve patient data",
            ))
        }
    }
}

#[utoipa::path(
    post,
    path = "/insight",
    request_body = InsightReq,
    responses(
        (status = 200, description = "Generated insight", body = InsightRes),
        (status = 400, description = "Missing or empty session notes", body = ErrorRes),
        (status = 500, description = "Model failure", body = ErrorRes),
        (status = 503, description = "Insight generation not configured", body = ErrorRes)
    )
)]
/// Generate an insight from session notes
///
/// # Errors
/// - `400 Bad Request` if the body is missing/invalid or the notes are blank.
/// - `503 Service Unavailable` if no model endpoint is configured.
/// - `500 Internal Server Error` if the model call fails.
#[axum::debug_handler]
async fn generate_insight(
    State(state): State<AppState>,
    payload: Result<Json<InsightReq>, JsonRejection>,
) -> Result<Json<InsightRes>, ApiFailure> {
    let Json(req) = payload.map_err(|e| {
        tracing::warn!("Rejected insight body: {}", e);
        failure(
            StatusCode::BAD_REQUEST,
            "Missing request body",
            "Session notes are required",
        )
    })?;

    match state
        .insight
        .generate(&req.session_notes, &req.patient_context)
        .await
    {
        Ok(outcome) => {
            tracing::info!("Generated insight successfully");
            Ok(Json(InsightRes {
                generated_at: Some(outcome.generated_at_rfc3339()),
                model_used: Some(outcome.model_used),
                insight: outcome.insight,
            }))
        }
        Err(InsightError::EmptyNotes) => Err(failure(
            StatusCode::BAD_REQUEST,
            "Missing session notes",
            "Session notes cannot be empty",
        )),
        Err(InsightError::NotConfigured) => Err(failure(
            StatusCode::SERVICE_UNAVAILABLE,
            "AI service unavailable",
            "Insight generation is not configured",
        )),
        Err(e) => {
            tracing::error!("Insight generation error: {:?}", e);
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI service error",
                "Unable to generate insights at this time",
            ))
        }
    }
}

#[utoipa::path(
    post,
    path = "/summary",
    request_body = SummaryReq,
    responses(
        (status = 200, description = "Summary saved", body = SummaryRes),
        (status = 400, description = "Missing patient ID or empty summary", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 500, description = "Summary could not be stored", body = ErrorRes)
    )
)]
/// Save a patient's summary
///
/// # Errors
/// - `400 Bad Request` if the body is missing/invalid, the id is blank or the summary is blank.
/// - `404 Not Found` if no patient has the given id.
/// - `500 Internal Server Error` if the roster cannot be written.
#[axum::debug_handler]
async fn save_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryReq>, JsonRejection>,
) -> Result<Json<SummaryRes>, ApiFailure> {
    let Json(req) = payload.map_err(|e| {
        tracing::warn!("Rejected summary body: {}", e);
        failure(
            StatusCode::BAD_REQUEST,
            "Missing request body",
            "Patient ID and summary are required",
        )
    })?;

    let update = SummaryUpdate::parse(&req).map_err(|e| match e {
        PatientError::MissingPatientId => failure(
            StatusCode::BAD_REQUEST,
            "Missing patient ID",
            "Patient ID is required",
        ),
        _ => failure(
            StatusCode::BAD_REQUEST,
            "Missing summary",
            "Summary cannot be empty",
        ),
    })?;

    match state.patients.update_summary(update) {
        Ok(updated) => {
            tracing::info!("Updated summary for patient {}", updated.patient_id);
            Ok(Json(SummaryRes {
                last_updated: updated.last_updated_rfc3339(),
                patient_id: updated.patient_id,
                summary: updated.summary,
                message: "Summary updated successfully".into(),
            }))
        }
        Err(PatientError::NotFound(id)) => {
            tracing::warn!("Patient not found: {}", id);
            Err(failure(
                StatusCode::NOT_FOUND,
                "Patient not found",
                format!("No patient with ID: {id}"),
            ))
        }
        Err(e) => {
            tracing::error!("Save summary error: {:?}", e);
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                "Unable to save patient summary",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use dashboard_core::{CoreConfig, InsightResult, InsightSettings, LlmClient, StoredPatient};
    use dashboard_types::PatientId;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct CannedLlm(Option<&'static str>);

    #[async_trait::async_trait]
    impl LlmClient for CannedLlm {
        fn model(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _prompt: &str) -> InsightResult<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| InsightError::Http("connection reset".into()))
        }
    }

    fn test_repo() -> Arc<PatientRepository> {
        let mut ada = StoredPatient::new("p-1", "Ada", "Byron");
        ada.summary = Some("old".into());
        ada.last_visit = Some("2024-05-02".into());
        let grace = StoredPatient::new("p-2", "Grace", "Hopper");
        Arc::new(PatientRepository::in_memory(vec![ada, grace]))
    }

    fn app_with(insight: InsightService) -> (Router, Arc<PatientRepository>) {
        let repo = test_repo();
        (router(AppState::new(repo.clone(), insight)), repo)
    }

    fn app() -> (Router, Arc<PatientRepository>) {
        app_with(InsightService::new(Arc::new(CannedLlm(Some(
            "Key themes: routine",
        )))))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();
        let (status, body) = send(app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn dashboard_lists_roster_with_count() {
        let (app, _) = app();
        let (status, body) = send(app, get("/dashboard")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["patients"][0]["patient_id"], "p-1");
        assert_eq!(body["patients"][0]["name"], "Ada Byron");
        assert_eq!(body["patients"][0]["status"], "active");
        assert_eq!(body["patients"][0]["summary"], "old");
        assert_eq!(body["patients"][1]["summary"], "");
    }

    #[tokio::test]
    async fn insight_returns_generated_text() {
        let (app, _) = app();
        let req = post_json(
            "/insight",
            r#"{"session_notes": "Discussed sleep", "patient_context": ""}"#,
        );
        let (status, body) = send(app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["insight"], "Key themes: routine");
        assert_eq!(body["model_used"], "canned");
        assert!(body["generated_at"].is_string());
    }

    #[tokio::test]
    async fn insight_rejects_blank_notes() {
        let (app, _) = app();
        let (status, body) = send(app, post_json("/insight", r#"{"session_notes": "   "}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing session notes");
        assert_eq!(body["message"], "Session notes cannot be empty");
    }

    #[tokio::test]
    async fn insight_rejects_missing_body_with_json_error() {
        let (app, _) = app();
        let (status, body) = send(app, post_json("/insight", "")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Session notes are required");
    }

    #[tokio::test]
    async fn insight_unconfigured_is_unavailable() {
        let (app, _) = app_with(InsightService::unconfigured());
        let (status, body) =
            send(app, post_json("/insight", r#"{"session_notes": "notes"}"#)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Insight generation is not configured");
    }

    #[tokio::test]
    async fn insight_model_failure_is_server_error() {
        let (app, _) = app_with(InsightService::new(Arc::new(CannedLlm(None))));
        let (status, body) =
            send(app, post_json("/insight", r#"{"session_notes": "notes"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "AI service error");
        assert_eq!(body["message"], "Unable to generate insights at this time");
    }

    #[tokio::test]
    async fn summary_save_updates_repository() {
        let (app, repo) = app();
        let req = post_json(
            "/summary",
            &json!({
                "patient_id": "p-2",
                "summary": "  Engaged and hopeful ",
                "session_notes": "Week 3"
            })
            .to_string(),
        );
        let (status, body) = send(app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patient_id"], "p-2");
        assert_eq!(body["summary"], "Engaged and hopeful");
        assert_eq!(body["message"], "Summary updated successfully");
        assert!(body["last_updated"].as_str().unwrap().ends_with('Z'));

        let roster = repo.list_patients().unwrap();
        assert_eq!(roster[1].patient_id, PatientId::from("p-2"));
        assert_eq!(roster[1].summary.as_deref(), Some("Engaged and hopeful"));
    }

    #[tokio::test]
    async fn summary_rejects_missing_body_with_json_error() {
        let (app, _) = app();
        let (status, body) = send(app, post_json("/summary", "")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing request body");
        assert_eq!(body["message"], "Patient ID and summary are required");
    }

    fn file_backed_app(dir: &TempDir) -> (Router, CoreConfig) {
        let cfg = CoreConfig::new(dir.path().to_path_buf(), InsightSettings::default()).unwrap();
        let roster = vec![StoredPatient::new("p-1", "Ada", "Byron")];
        fs::write(cfg.patients_file(), serde_json::to_string(&roster).unwrap()).unwrap();
        let repo = Arc::new(PatientRepository::open(&cfg).unwrap());
        (router(AppState::new(repo, InsightService::unconfigured())), cfg)
    }

    #[tokio::test]
    async fn dashboard_storage_failure_is_server_error() {
        let dir = TempDir::new().unwrap();
        let (app, cfg) = file_backed_app(&dir);
        fs::write(cfg.patients_file(), "{broken").unwrap();

        let (status, body) = send(app, get("/dashboard")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database error");
        assert_eq!(body["message"], "Unable to retrieve patient data");
    }

    #[tokio::test]
    async fn summary_storage_failure_is_server_error() {
        let dir = TempDir::new().unwrap();
        let (app, cfg) = file_backed_app(&dir);
        fs::create_dir(cfg.patients_file().with_extension("json.tmp")).unwrap();

        let (status, body) = send(
            app,
            post_json("/summary", r#"{"patient_id": "p-1", "summary": "new"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database error");
        assert_eq!(body["message"], "Unable to save patient summary");
    }

    #[tokio::test]
    async fn summary_requires_patient_id_and_text() {
        let (app, _) = app();
        let (status, body) =
            send(app.clone(), post_json("/summary", r#"{"summary": "fine"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Patient ID is required");

        let (status, body) = send(
            app,
            post_json("/summary", r#"{"patient_id": "p-1", "summary": "  "}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Summary cannot be empty");
    }

    #[tokio::test]
    async fn summary_for_unknown_patient_is_not_found() {
        let (app, _) = app();
        let (status, body) = send(
            app,
            post_json("/summary", r#"{"patient_id": "p-9", "summary": "x"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Patient not found");
        assert_eq!(body["message"], "No patient with ID: p-9");
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let (app, _) = app();
        let req = Request::builder()
            .uri("/dashboard")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[test]
    fn openapi_document_lists_all_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/dashboard", "/insight", "/summary"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

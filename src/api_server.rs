// Axum API Server Module
//
// Purpose: session-scoped recommendation workflow over HTTP, plus the contact
// and auth form shells and the static pages.
//
// Each session owns one SessionState behind a tokio Mutex. A submission takes
// the lock with try_lock, so a second submission while one is in flight is
// refused (409) instead of queueing behind it.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::backend::BackendClient;
use crate::config::AppConfig;
use crate::error::{RequestError, SubmitError};
use crate::forms::{ContactMessage, FormError, LoginForm, SignupForm};
use crate::provider::RecommendationProvider;
use crate::sample::SampleForm;
use crate::web::handlers::pages;
use crate::workflow::{SessionState, Workflow};

const MAX_SESSIONS: u64 = 10_000;
const CONTACT_TABLE: &str = "contact_messages";

pub type SessionHandle = Arc<Mutex<SessionState>>;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub sessions: Cache<String, SessionHandle>,
    pub backend: Option<BackendClient>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing recommendation provider...");
        let provider = RecommendationProvider::from_config(&config.strategy)?;
        if let RecommendationProvider::RemoteService(remote) = &provider {
            tracing::info!(
                "Remote provider at {} (wire renames: {:?})",
                remote.endpoint(),
                remote.fields().overrides()
            );
        }

        let backend = match &config.backend {
            Some(b) => {
                let client = BackendClient::connect(&b.url, &b.key)?;
                tracing::info!("Backend client ready at {}", client.base_url());
                Some(client)
            }
            None => None,
        };

        let workflow = Workflow::new(provider, config.form_variant);
        Ok(Self::with_workflow(workflow, config.session_ttl, backend))
    }

    pub fn with_workflow(
        workflow: Workflow,
        session_ttl: Duration,
        backend: Option<BackendClient>,
    ) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(session_ttl) // idle sessions end, history goes with them
            .build();

        Self {
            workflow: Arc::new(workflow),
            sessions,
            backend,
        }
    }

    async fn session(&self, id: &str) -> Result<SessionHandle, AppError> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Pages (HTML)
        .route("/", get(pages::home_page))
        .route("/about", get(pages::about_page))
        .route("/contact", get(pages::contact_page))
        .route("/recommend", get(pages::recommend_page))
        .route("/login", get(pages::login_page))

        // Recommendation sessions (JSON)
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(end_session))
        .route("/api/sessions/:id/history", get(get_history))
        .route("/api/sessions/:id/recommend", post(recommend))

        // Form shells (JSON)
        .route("/api/contact", post(submit_contact))
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "strategy": state.workflow.provider().strategy(),
        "form_variant": state.workflow.variant(),
        "backend": state.backend.is_some(),
    }))
}

async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let id = uuid::Uuid::new_v4().to_string();
    state
        .sessions
        .insert(id.clone(), Arc::new(Mutex::new(SessionState::new())))
        .await;
    tracing::debug!("Created session {}", id);

    (StatusCode::CREATED, Json(json!({ "session_id": id })))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionState>, AppError> {
    let handle = state.session(&id).await?;
    let session = handle.lock().await.clone();
    Ok(Json(session))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .remove(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
    tracing::debug!("Ended session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let handle = state.session(&id).await?;
    let session = handle.lock().await;
    Ok(Json(json!({
        "count": session.history().len(),
        "history": session.history(),
    })))
}

async fn recommend(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SampleForm>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(form) = payload?;
    let handle = state.session(&id).await?;
    let mut session = handle.try_lock().map_err(|_| SubmitError::InFlight)?;

    let recommendation = state.workflow.submit(&mut session, &form).await?;

    Ok(Json(json!({
        "crop": recommendation.crop(),
        "score": recommendation.score(),
        "timestamp": recommendation.timestamp(),
        "inputs": recommendation.inputs(),
        "history_size": session.history().len(),
    })))
}

async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(message) = payload?;
    message.validate()?;
    tracing::info!(
        "Contact message from {} <{}>: {}",
        message.name,
        message.email,
        message.subject.as_deref().unwrap_or("(no subject)")
    );

    if let Some(backend) = &state.backend {
        let row = json!({
            "name": message.name,
            "email": message.email,
            "phone": message.phone,
            "subject": message.subject,
            "message": message.message,
            "created_at": chrono::Utc::now().to_rfc3339(),
        });
        if let Err(e) = backend.insert(CONTACT_TABLE, &row).await {
            tracing::warn!("Failed to store contact message: {}", e);
        }
    }

    Ok(Json(json!({
        "status": "received",
        "message": "Thank you for reaching out! We'll get back to you soon.",
    })))
}

async fn login(
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(form) = payload?;
    form.validate()?;
    tracing::info!("Login form submitted for {}", form.email);
    Ok(auth_shell_response())
}

async fn signup(
    payload: Result<Json<SignupForm>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(form) = payload?;
    form.validate()?;
    tracing::info!("Signup form submitted for {} <{}>", form.name, form.email);
    Ok(auth_shell_response())
}

fn auth_shell_response() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "received",
            "authenticated": false,
            "message": "Accounts are not available yet.",
        })),
    )
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Submit(SubmitError),
    Form(FormError),
    BadRequest(String),
    NotFound(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        AppError::Submit(err)
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        AppError::Form(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Submit(SubmitError::Rejected(e)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": e.to_string(), "field": e.field() }),
            ),
            AppError::Submit(err @ SubmitError::Failed(RequestError::Timeout(_))) => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({ "error": err.to_string(), "retryable": true }),
            ),
            AppError::Submit(err @ SubmitError::Failed(_)) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": err.to_string(), "retryable": true }),
            ),
            AppError::Submit(err @ SubmitError::InFlight) => (
                StatusCode::CONFLICT,
                json!({ "error": err.to_string(), "retryable": true }),
            ),
            AppError::Form(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use uuid::Uuid;

use crate::models::{AudioToggleView, CreateVisitInput, SignalInput, VisitView};
use crate::page;
use crate::visits::{VisitError, VisitStore};

// ============================================================
// Error Handling
// ============================================================

/// Map store errors onto HTTP. Unknown visits are the only expected
/// failure here; anything a visitor can trigger by replaying an old page
/// is logged at debug, not warn.
fn visit_error(error: VisitError) -> (StatusCode, String) {
    match error {
        VisitError::NotFound(_) => {
            tracing::debug!(%error, "request for unknown visit");
            (StatusCode::NOT_FOUND, error.to_string())
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Page shell
// ============================================================

/// Serve the landing shell. Every page view gets its own visit, so the
/// reveal race starts (and the fallback timer arms) the moment the shell
/// is handed out.
pub async fn index(State(store): State<VisitStore>) -> Html<String> {
    let visit = store.create(CreateVisitInput::default());
    Html(page::render_shell(visit.id, store.config()))
}

// ============================================================
// Visits
// ============================================================

pub async fn create_visit(
    State(store): State<VisitStore>,
    body: Option<Json<CreateVisitInput>>,
) -> (StatusCode, Json<VisitView>) {
    let input = body.map(|Json(input)| input).unwrap_or_default();
    (StatusCode::CREATED, Json(store.create(input)))
}

pub async fn get_visit(
    State(store): State<VisitStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<VisitView>, (StatusCode, String)> {
    store.get(id).map(Json).map_err(visit_error)
}

pub async fn dispatch_signal(
    State(store): State<VisitStore>,
    Path(id): Path<Uuid>,
    Json(input): Json<SignalInput>,
) -> Result<Json<VisitView>, (StatusCode, String)> {
    store.signal(id, input.into()).map(Json).map_err(visit_error)
}

pub async fn toggle_audio(
    State(store): State<VisitStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<AudioToggleView>, (StatusCode, String)> {
    store.toggle_audio(id).map(Json).map_err(visit_error)
}

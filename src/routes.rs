use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::{
    api::{ApiError, ContentApi},
    export,
    orchestrator::{GenerationRequest, Orchestrator},
    presentation::{build_view, display_order, View},
    state::{reduce, ActionKind, Session, SessionEvent},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<HashMap<Uuid, Session>>>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self { store: Arc::default(), orchestrator: Arc::new(Orchestrator::new(api)) }
    }
}

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (status, Json(json!({ "error": message.into() })))
}

fn session_not_found() -> Failure { failure(StatusCode::NOT_FOUND, "Session not found") }

fn read_session(state: &AppState, id: Uuid) -> Result<Session, Failure> {
    state.store.read().get(&id).cloned().ok_or_else(session_not_found)
}

/// Applies `event` to the stored session and returns the new snapshot.
fn dispatch(state: &AppState, id: Uuid, event: SessionEvent) -> Result<Session, Failure> {
    let mut guard = state.store.write();
    let session = guard.get_mut(&id).ok_or_else(session_not_found)?;
    *session = reduce(session.clone(), event);
    Ok(session.clone())
}

/// Marks the session busy for `action` unless it already is or has no product to work on.
fn begin_action(state: &AppState, id: Uuid, action: ActionKind) -> Result<Session, Failure> {
    let mut guard = state.store.write();
    let session = guard.get_mut(&id).ok_or_else(session_not_found)?;
    if session.is_generating {
        return Err(failure(StatusCode::CONFLICT, "An action is already running for this session"));
    }
    if !session.can_submit() {
        return Err(failure(StatusCode::UNPROCESSABLE_ENTITY, "Select a catalog product or name the custom product first"));
    }
    *session = reduce(session.clone(), SessionEvent::ActionStarted { action });
    Ok(session.clone())
}

fn upstream_failure(message: String, session: &Session) -> Failure {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": message, "session": session })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/events", post(apply_event))
        .route("/api/sessions/:id/products/:product_id", post(select_product))
        .route("/api/sessions/:id/generate", post(generate_content))
        .route("/api/sessions/:id/complete", post(complete_product))
        .route("/api/sessions/:id/view", get(get_view))
        .route("/api/sessions/:id/export.txt", get(export_text))
        .route("/api/sessions/:id/export.pdf", get(export_pdf))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<Session>) {
    let session = Session::new();
    let id = session.id;
    state.store.write().insert(id, session.clone());
    tracing::info!("🎯 Created session {}", id);

    let event = match state.orchestrator.api().list_products().await {
        Ok(products) => {
            tracing::info!("📦 Loaded {} catalog products", products.len());
            SessionEvent::CatalogLoaded { products }
        }
        Err(e) => {
            tracing::error!("❌ Error fetching products: {}", e);
            SessionEvent::CatalogLoadFailed { message: e.to_string() }
        }
    };
    let session = dispatch(&state, id, event).unwrap_or(session);
    (StatusCode::CREATED, Json(session))
}

pub async fn get_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<Session>, Failure> {
    read_session(&state, id).map(Json)
}

pub async fn apply_event(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(event): Json<SessionEvent>,
) -> Result<Json<Session>, Failure> {
    tracing::debug!(?event, %id, "applying event");
    dispatch(&state, id, event).map(Json)
}

pub async fn select_product(
    Path((id, product_id)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<Session>, Failure> {
    let known = read_session(&state, id)?.find_catalog_product(&product_id).cloned();
    let product = match known {
        Some(product) => product,
        None => state.orchestrator.api().get_product(&product_id).await.map_err(|e| match e {
            e if e.is_not_found() => failure(StatusCode::NOT_FOUND, e.to_string()),
            e => failure(StatusCode::BAD_GATEWAY, e.to_string()),
        })?,
    };
    tracing::info!("🛒 Session {} selected product '{}'", id, product.display_name());
    dispatch(&state, id, SessionEvent::SelectCatalogProduct { product }).map(Json)
}

pub async fn generate_content(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<Session>, Failure> {
    let request = GenerationRequest::from_session(&begin_action(&state, id, ActionKind::Generate)?);

    let outcome = state.orchestrator.generate(&request).await;
    let error = outcome.error.as_ref().map(ApiError::to_string);
    let session = dispatch(&state, id, SessionEvent::GenerationFinished { bag: outcome.bag, error: error.clone() })?;

    match error {
        Some(message) => Err(upstream_failure(message, &session)),
        None => Ok(Json(session)),
    }
}

pub async fn complete_product(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<Session>, Failure> {
    let started = begin_action(&state, id, ActionKind::Complete)?;
    let started_on_custom = started.product.is_custom();
    let product = started.product.product().clone();

    let result = state.orchestrator.complete(&product).await.map_err(|e| e.to_string());
    let error = result.as_ref().err().cloned();
    let session = dispatch(&state, id, SessionEvent::CompletionFinished { result, started_on_custom })?;

    match error {
        Some(message) => Err(upstream_failure(message, &session)),
        None => Ok(Json(session)),
    }
}

pub async fn get_view(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<View>, Failure> {
    read_session(&state, id).map(|s| Json(build_view(&s)))
}

pub async fn export_text(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Response, Failure> {
    let session = read_session(&state, id)?;
    let body = export::to_text(&session.content, &display_order(&session));
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

pub async fn export_pdf(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Response, Failure> {
    let session = read_session(&state, id)?;
    let pdf_bytes = export::to_pdf(session.product.product().display_name(), &session.content, &display_order(&session))
        .map_err(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let disposition = format!("attachment; filename=\"product_content_{}.pdf\"", id);
    Ok((
        [(header::CONTENT_TYPE, "application/pdf".to_string()), (header::CONTENT_DISPOSITION, disposition)],
        pdf_bytes,
    ).into_response())
}

//! General ledger preference routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tallybook_core::preference::PreferenceAssignment;
use tallybook_db::PreferenceRepository;

use crate::{AppState, error::ApiError};

/// Creates the preference routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/general-ledger-preferences",
            get(list_preferences).put(update_preferences),
        )
        .route("/general-ledger-preferences/{id}", get(get_preference))
        .route(
            "/general-ledger-preferences/validate",
            post(validate_preferences),
        )
}

/// Request body for updating or validating preferences.
#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    /// Role bindings; `account_id` of null or 0 clears a role.
    pub preferences: Vec<PreferenceAssignment>,
}

/// GET `/general-ledger-preferences`
async fn list_preferences(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let preferences = PreferenceRepository::new(state.conn()).list().await?;
    Ok(Json(json!({ "preferences": preferences })))
}

/// GET `/general-ledger-preferences/{id}`
async fn get_preference(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(PreferenceRepository::new(state.conn()).get(id).await?))
}

/// PUT `/general-ledger-preferences` - All or nothing; any invalid binding
/// fails the whole batch with its field errors.
async fn update_preferences(
    State(state): State<AppState>,
    Json(payload): Json<PreferencesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let preferences = PreferenceRepository::new(state.conn())
        .update(&payload.preferences)
        .await?;
    Ok(Json(json!({ "preferences": preferences })))
}

/// POST `/general-ledger-preferences/validate` - Dry run of an update.
async fn validate_preferences(
    State(state): State<AppState>,
    Json(payload): Json<PreferencesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = PreferenceRepository::new(state.conn())
        .validate(&payload.preferences)
        .await?;
    Ok(Json(json!({ "valid": errors.is_empty(), "errors": errors })))
}

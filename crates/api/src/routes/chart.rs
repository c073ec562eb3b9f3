//! Chart of accounts routes: class types, classes, groups and accounts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tallybook_core::chart::AccountClassType;
use tallybook_db::{
    AccountClassFilter, AccountClassInput, AccountFilter, AccountGroupFilter, AccountGroupInput,
    AccountInput, ChartRepository,
};

use crate::{AppState, error::ApiError};

/// Creates the chart of accounts routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account-class-types", get(list_class_types))
        .route("/account-classes", get(list_classes).post(create_class))
        .route(
            "/account-classes/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/account-groups", get(list_groups).post(create_group))
        .route(
            "/account-groups/{id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

fn repository(state: &AppState) -> ChartRepository {
    ChartRepository::new(state.conn())
}

/// GET `/account-class-types` - The six fixed class types.
async fn list_class_types() -> impl IntoResponse {
    Json(json!({ "class_types": AccountClassType::views() }))
}

/// GET `/account-classes`
async fn list_classes(
    State(state): State<AppState>,
    Query(filter): Query<AccountClassFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let classes = repository(&state).list_classes(&filter).await?;
    Ok(Json(json!({ "account_classes": classes })))
}

/// POST `/account-classes`
async fn create_class(
    State(state): State<AppState>,
    Json(payload): Json<AccountClassInput>,
) -> Result<impl IntoResponse, ApiError> {
    let class = repository(&state).create_class(payload).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// GET `/account-classes/{id}`
async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(repository(&state).get_class(id).await?))
}

/// PUT `/account-classes/{id}`
async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AccountClassInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(repository(&state).update_class(id, payload).await?))
}

/// DELETE `/account-classes/{id}`
async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    repository(&state).delete_class(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/account-groups`
async fn list_groups(
    State(state): State<AppState>,
    Query(filter): Query<AccountGroupFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let groups = repository(&state).list_groups(&filter).await?;
    Ok(Json(json!({ "account_groups": groups })))
}

/// POST `/account-groups` - A group with a parent inherits the parent's class.
async fn create_group(
    State(state): State<AppState>,
    Json(payload): Json<AccountGroupInput>,
) -> Result<impl IntoResponse, ApiError> {
    let group = repository(&state).create_group(payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET `/account-groups/{id}`
async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(repository(&state).get_group(id).await?))
}

/// PUT `/account-groups/{id}`
async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AccountGroupInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(repository(&state).update_group(id, payload).await?))
}

/// DELETE `/account-groups/{id}`
async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    repository(&state).delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/accounts` - Filterable by name, group, class type and inactive flag.
async fn list_accounts(
    State(state): State<AppState>,
    Query(filter): Query<AccountFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let accounts = repository(&state).list_accounts(&filter).await?;
    Ok(Json(json!({ "accounts": accounts })))
}

/// POST `/accounts`
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<AccountInput>,
) -> Result<impl IntoResponse, ApiError> {
    let account = repository(&state).create_account(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/accounts/{id}`
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(repository(&state).get_account(id).await?))
}

/// PUT `/accounts/{id}`
async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AccountInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(repository(&state).update_account(id, payload).await?))
}

/// DELETE `/accounts/{id}` - Refused once any ledger line references the account.
async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    repository(&state).delete_account(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, json_body, offline_state, send_json};
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        crate::create_router(state)
    }

    #[tokio::test]
    async fn test_class_types_need_no_database() {
        let state = offline_state();
        let response = app(state.clone())
            .oneshot(get(&state, "/api/v1/account-class-types"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let types = body["class_types"].as_array().unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0]["id"], 1);
    }

    #[tokio::test]
    async fn test_create_class_rejects_unknown_type() {
        let state = offline_state();
        let response = app(state.clone())
            .oneshot(send_json(
                &state,
                "POST",
                "/api/v1/account-classes",
                &json!({ "name": "Misc", "type_id": 9 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "INVALID_CLASS_TYPE");
    }

    #[tokio::test]
    async fn test_database_failure_is_internal_error() {
        let state = offline_state();
        let response = app(state.clone())
            .oneshot(get(&state, "/api/v1/accounts?class_type_id=4"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
    }
}

//! Bank account and deposit routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tallybook_core::bank::BankAccountType;
use tallybook_core::ledger::PostingRow;
use tallybook_db::{BankAccountFilter, BankAccountInput, BankRepository, DepositInput};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the bank routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-account-types", get(list_bank_account_types))
        .route("/bank-accounts", get(list_bank_accounts).post(create_bank_account))
        .route(
            "/bank-accounts/{id}",
            get(get_bank_account).put(update_bank_account),
        )
        .route("/bank-accounts/{id}/deposits", post(create_deposit))
}

/// Request body for a deposit into the bank account in the path.
#[derive(Debug, Deserialize)]
pub struct DepositRequestBody {
    /// Transaction date (YYYY-MM-DD).
    pub trans_date: NaiveDate,
    /// Memo stored on the journal and the bank transaction.
    #[serde(default)]
    pub memo: String,
    /// Source accounts and positive amounts, each credited.
    pub rows: Vec<PostingRow>,
}

/// GET `/bank-account-types`
async fn list_bank_account_types() -> impl IntoResponse {
    Json(json!({ "bank_account_types": BankAccountType::views() }))
}

/// GET `/bank-accounts`
async fn list_bank_accounts(
    State(state): State<AppState>,
    Query(filter): Query<BankAccountFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let bank_accounts = BankRepository::new(state.conn())
        .list_accounts(&filter)
        .await?;
    Ok(Json(json!({ "bank_accounts": bank_accounts })))
}

/// POST `/bank-accounts`
async fn create_bank_account(
    State(state): State<AppState>,
    Json(payload): Json<BankAccountInput>,
) -> Result<impl IntoResponse, ApiError> {
    let bank_account = BankRepository::new(state.conn())
        .create_account(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(bank_account)))
}

/// GET `/bank-accounts/{id}`
async fn get_bank_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(BankRepository::new(state.conn()).get_account(id).await?))
}

/// PUT `/bank-accounts/{id}`
async fn update_bank_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BankAccountInput>,
) -> Result<impl IntoResponse, ApiError> {
    let bank_account = BankRepository::new(state.conn())
        .update_account(id, payload)
        .await?;
    Ok(Json(bank_account))
}

/// POST `/bank-accounts/{id}/deposits`
async fn create_deposit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<DepositRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let input = DepositInput {
        created_by: auth.user_id(),
        bank_account_id: id,
        trans_date: payload.trans_date,
        memo: payload.memo,
        rows: payload.rows,
    };

    let deposit = BankRepository::new(state.conn()).deposit(input).await?;
    Ok((StatusCode::CREATED, Json(deposit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, json_body, offline_state, send_json};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_bank_account_types() {
        let state = offline_state();
        let response = crate::create_router(state.clone())
            .oneshot(get(&state, "/api/v1/bank-account-types"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let names: Vec<&str> = body["bank_account_types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.len(), 4);
    }

    #[tokio::test]
    async fn test_deposit_rejects_non_positive_rows() {
        let state = offline_state();
        let response = crate::create_router(state.clone())
            .oneshot(send_json(
                &state,
                "POST",
                "/api/v1/bank-accounts/1/deposits",
                &json!({
                    "trans_date": "2024-05-02",
                    "memo": "Customer payment",
                    "rows": [
                        { "account_id": 1200, "amount": "250.00" },
                        { "account_id": 4000, "amount": "-10.00" },
                    ],
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "INVALID_AMOUNT");
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_bank_account_type() {
        let state = offline_state();
        let response = crate::create_router(state.clone())
            .oneshot(send_json(
                &state,
                "POST",
                "/api/v1/bank-accounts",
                &json!({ "account_id": 1100, "type_id": 7 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "INVALID_BANK_ACCOUNT_TYPE");
    }
}

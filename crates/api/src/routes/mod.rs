//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod bank;
pub mod chart;
pub mod fiscal;
pub mod health;
pub mod ledger;
pub mod preferences;

/// Creates the API router: `/health` is public, everything else requires a
/// bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(chart::routes())
        .merge(preferences::routes())
        .merge(fiscal::routes())
        .merge(ledger::routes())
        .merge(bank::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

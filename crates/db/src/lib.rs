//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - A typed filter builder for list queries
//! - Repository abstractions for data access
//! - Database migrations

pub mod entities;
pub mod filter;
pub mod migration;
pub mod repositories;

pub use filter::Filter;
pub use repositories::{
    AccountClassFilter, AccountClassInput, AccountFilter, AccountGroupFilter, AccountGroupInput,
    AccountInput, BankAccountFilter, BankAccountInput, BankRepository, ChartRepository,
    DepositInput, FiscalYearFilter, FiscalYearRepository, LedgerRepository, PreferenceRepository,
    RepositoryError,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using explicit pool bounds.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with_pool(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}

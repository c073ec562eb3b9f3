//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every decision is delegated to `tallybook-core`; repositories load what
//! those checks need and write the result inside one database transaction.

pub mod bank;
pub mod chart;
pub mod fiscal;
pub mod ledger;
pub mod preference;

pub use bank::{BankAccountFilter, BankAccountInput, BankRepository, DepositInput, DepositResult};
pub use chart::{
    AccountClassFilter, AccountClassInput, AccountFilter, AccountGroupFilter, AccountGroupInput,
    AccountInput, ChartRepository,
};
pub use fiscal::{CloseOutcome, FiscalYearFilter, FiscalYearRepository};
pub use ledger::{JournalWithLines, LedgerRepository};
pub use preference::PreferenceRepository;

use sea_orm::DbErr;
use tallybook_core::AccountingError;
use tallybook_shared::AppError;

/// Error returned by every repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A domain check rejected the operation.
    #[error(transparent)]
    Domain(#[from] AccountingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Returns the domain error, if this is one.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&AccountingError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Domain(err) => err.into(),
            RepositoryError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_keeps_its_code() {
        let err = RepositoryError::from(AccountingError::FiscalYearNotFound(4));
        assert_eq!(err.as_domain(), Some(&AccountingError::FiscalYearNotFound(4)));

        let app: AppError = err.into();
        assert_eq!(app.error_code(), "FISCAL_YEAR_NOT_FOUND");
        assert_eq!(app.status_code(), 404);
    }

    #[test]
    fn test_database_error_is_infrastructure() {
        let err = RepositoryError::from(DbErr::Custom("connection reset".into()));
        assert!(err.as_domain().is_none());

        let app: AppError = err.into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
        assert_eq!(app.status_code(), 500);
    }
}

//! Accounting error types.
//!
//! Every rejection the domain can produce lives in [`AccountingError`]. Each
//! variant maps onto one [`ErrorKind`] of the shared taxonomy and carries a
//! stable error code for the API layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tallybook_shared::{AppError, ErrorKind, FieldError};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during accounting operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountingError {
    // ========== Validation Errors ==========
    /// One or more field-scoped checks failed.
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),

    /// Fiscal year end date is not after its start date.
    #[error("End date {end} must be after start date {start}")]
    InvalidRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// Account class type id is not one of the known class types.
    #[error("Invalid account class type: {0}")]
    InvalidClassType(i32),

    /// Bank account type id is not one of the known bank account types.
    #[error("Invalid bank account type: {0}")]
    InvalidBankAccountType(i32),

    /// A posting was submitted without an acting user.
    #[error("Transaction creator is required")]
    CreatorRequired,

    /// A bank transaction was submitted without an acting user.
    #[error("Invalid user")]
    InvalidUser,

    /// A bank deposit row is zero or negative, or there are no rows.
    #[error("Deposit amounts must be greater than zero")]
    InvalidAmount,

    /// An amount has more than four decimal places or does not fit the
    /// ledger's `NUMERIC(19, 4)` columns.
    #[error("Amount {0} is out of range: at most 4 decimal places and 15 integer digits")]
    AmountOutOfRange(Decimal),

    /// The bank transaction type is not allowed on this path.
    #[error("Invalid bank transaction type")]
    InvalidTransactionType,

    // ========== Invariant Errors ==========
    /// Row amounts do not sum to zero.
    #[error("Transaction is not balanced, rows sum to {total}")]
    TransactionNotBalance {
        /// The non-zero sum of the submitted rows.
        total: Decimal,
    },

    /// The new fiscal year intersects an existing one.
    #[error("Fiscal year {start} to {end} overlaps an existing period")]
    OverlapsExistingPeriod {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// The requested parent group would break the two-level hierarchy.
    #[error("Invalid parent account group: {0}")]
    InvalidParent(String),

    /// A deposit row targets an account that is itself a bank account.
    #[error("Account {0} is linked to a bank account and cannot receive deposits")]
    BankAccountProhibited(i64),

    // ========== Policy Errors ==========
    /// No open fiscal year covers the transaction date.
    #[error("Posting is prohibited: no open fiscal year covers {0}")]
    PostingProhibited(NaiveDate),

    /// A later fiscal year cannot close while an earlier one is still open.
    #[error("Fiscal year {requested} cannot be closed before fiscal year {earliest_open}")]
    CloseProhibited {
        /// The fiscal year the caller asked to close.
        requested: i64,
        /// The earliest fiscal year that is still open.
        earliest_open: i64,
    },

    /// The fiscal year is already closed.
    #[error("Fiscal year {0} is already closed")]
    FiscalYearClosed(i64),

    /// A general ledger preference needed by the operation is unusable.
    #[error("General ledger preference is invalid: {0}")]
    PreferenceInvalid(String),

    /// The journal was already voided.
    #[error("Journal {0} is already voided")]
    JournalAlreadyVoided(Uuid),

    /// The account is referenced by ledger lines and cannot be deleted.
    #[error("Account {0} has transactions")]
    AccountHasTransaction(i64),

    /// The account class still owns groups.
    #[error("Account class {0} still has account groups")]
    AccountClassInUse(i64),

    /// The account group still has child groups or accounts.
    #[error("Account group {0} still has child groups or accounts")]
    AccountGroupInUse(i64),

    // ========== Not Found Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    /// Account group not found.
    #[error("Account group not found: {0}")]
    AccountGroupNotFound(i64),

    /// Account class not found.
    #[error("Account class not found: {0}")]
    AccountClassNotFound(i64),

    /// Fiscal year not found.
    #[error("Fiscal year not found: {0}")]
    FiscalYearNotFound(i64),

    /// There is no open fiscal year at all.
    #[error("No open fiscal year")]
    NoActiveFiscalYear,

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(Uuid),

    /// Bank account not found.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(i64),

    /// General ledger preference not found.
    #[error("General ledger preference not found: {0}")]
    PreferenceNotFound(i32),
}

impl AccountingError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidRange { .. }
            | Self::InvalidClassType(_)
            | Self::InvalidBankAccountType(_)
            | Self::CreatorRequired
            | Self::InvalidUser
            | Self::InvalidAmount
            | Self::AmountOutOfRange(_)
            | Self::InvalidTransactionType => ErrorKind::Validation,

            Self::TransactionNotBalance { .. }
            | Self::OverlapsExistingPeriod { .. }
            | Self::InvalidParent(_)
            | Self::BankAccountProhibited(_) => ErrorKind::Invariant,

            Self::PostingProhibited(_)
            | Self::CloseProhibited { .. }
            | Self::FiscalYearClosed(_)
            | Self::PreferenceInvalid(_)
            | Self::JournalAlreadyVoided(_)
            | Self::AccountHasTransaction(_)
            | Self::AccountClassInUse(_)
            | Self::AccountGroupInUse(_) => ErrorKind::Policy,

            Self::AccountNotFound(_)
            | Self::AccountGroupNotFound(_)
            | Self::AccountClassNotFound(_)
            | Self::FiscalYearNotFound(_)
            | Self::NoActiveFiscalYear
            | Self::JournalNotFound(_)
            | Self::BankAccountNotFound(_)
            | Self::PreferenceNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::InvalidClassType(_) => "INVALID_CLASS_TYPE",
            Self::InvalidBankAccountType(_) => "INVALID_BANK_ACCOUNT_TYPE",
            Self::CreatorRequired => "CREATOR_REQUIRED",
            Self::InvalidUser => "INVALID_USER",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            Self::InvalidTransactionType => "INVALID_TRANSACTION_TYPE",
            Self::TransactionNotBalance { .. } => "TRANSACTION_NOT_BALANCE",
            Self::OverlapsExistingPeriod { .. } => "OVERLAPS_EXISTING_PERIOD",
            Self::InvalidParent(_) => "INVALID_PARENT",
            Self::BankAccountProhibited(_) => "BANK_ACCOUNT_PROHIBITED",
            Self::PostingProhibited(_) => "POSTING_PROHIBITED",
            Self::CloseProhibited { .. } => "CLOSE_PROHIBITED",
            Self::FiscalYearClosed(_) => "FISCAL_YEAR_CLOSED",
            Self::PreferenceInvalid(_) => "PREFERENCE_INVALID",
            Self::JournalAlreadyVoided(_) => "JOURNAL_ALREADY_VOIDED",
            Self::AccountHasTransaction(_) => "ACCOUNT_HAS_TRANSACTION",
            Self::AccountClassInUse(_) => "ACCOUNT_CLASS_IN_USE",
            Self::AccountGroupInUse(_) => "ACCOUNT_GROUP_IN_USE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountGroupNotFound(_) => "ACCOUNT_GROUP_NOT_FOUND",
            Self::AccountClassNotFound(_) => "ACCOUNT_CLASS_NOT_FOUND",
            Self::FiscalYearNotFound(_) | Self::NoActiveFiscalYear => "FISCAL_YEAR_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::PreferenceNotFound(_) => "PREFERENCE_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

impl From<AccountingError> for AppError {
    fn from(err: AccountingError) -> Self {
        let code = err.error_code();
        let message = err.to_string();

        match (err.kind(), err) {
            (_, AccountingError::Validation(fields)) => Self::Validation {
                code,
                message,
                fields,
            },
            (ErrorKind::Validation, _) => Self::Validation {
                code,
                message,
                fields: Vec::new(),
            },
            (ErrorKind::NotFound, _) => Self::NotFound { code, message },
            (kind, _) => Self::Rejected {
                kind,
                code,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(AccountingError::CreatorRequired, "CREATOR_REQUIRED", 400)]
    #[case(AccountingError::InvalidClassType(9), "INVALID_CLASS_TYPE", 400)]
    #[case(AccountingError::AmountOutOfRange(dec!(0.00001)), "AMOUNT_OUT_OF_RANGE", 400)]
    #[case(
        AccountingError::TransactionNotBalance { total: dec!(60) },
        "TRANSACTION_NOT_BALANCE",
        422
    )]
    #[case(AccountingError::InvalidParent("nested".into()), "INVALID_PARENT", 422)]
    #[case(AccountingError::PostingProhibited(date(2024, 1, 1)), "POSTING_PROHIBITED", 409)]
    #[case(
        AccountingError::CloseProhibited { requested: 2, earliest_open: 1 },
        "CLOSE_PROHIBITED",
        409
    )]
    #[case(AccountingError::FiscalYearNotFound(3), "FISCAL_YEAR_NOT_FOUND", 404)]
    #[case(AccountingError::JournalNotFound(Uuid::nil()), "JOURNAL_NOT_FOUND", 404)]
    fn test_codes_and_status(
        #[case] err: AccountingError,
        #[case] code: &str,
        #[case] status: u16,
    ) {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.http_status_code(), status);
    }

    #[test]
    fn test_error_display() {
        let err = AccountingError::TransactionNotBalance { total: dec!(60.00) };
        assert_eq!(err.to_string(), "Transaction is not balanced, rows sum to 60.00");

        let err = AccountingError::InvalidRange {
            start: date(2024, 12, 31),
            end: date(2024, 1, 1),
        };
        assert_eq!(
            err.to_string(),
            "End date 2024-01-01 must be after start date 2024-12-31"
        );
    }

    #[test]
    fn test_validation_converts_with_fields() {
        let err = AccountingError::Validation(vec![FieldError::new(
            "1",
            "ACCOUNT_NOT_FOUND",
            "Account not found",
        )]);

        let app: AppError = err.into();
        assert_eq!(app.error_code(), "VALIDATION_FAILED");
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.fields().len(), 1);
    }

    #[test]
    fn test_policy_converts_to_rejected() {
        let app: AppError = AccountingError::FiscalYearClosed(7).into();

        assert!(matches!(
            app,
            AppError::Rejected {
                kind: ErrorKind::Policy,
                code: "FISCAL_YEAR_CLOSED",
                ..
            }
        ));
    }

    #[test]
    fn test_not_found_converts_to_not_found() {
        let app: AppError = AccountingError::AccountNotFound(42).into();
        assert_eq!(app.status_code(), 404);
        assert_eq!(app.to_string(), "Not found: Account not found: 42");
    }
}

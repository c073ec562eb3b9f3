//! General ledger preferences: logical roles bound to concrete accounts.

pub mod role;
pub mod validator;

pub use role::GeneralLedgerRole;
pub use validator::{
    ACCOUNT_NOT_FOUND, MUST_BE_BALANCE_SHEET_ACCOUNT, PreferenceAssignment, UNKNOWN_PREFERENCE,
    ensure_valid_preferences, retained_earnings_account, validate_preferences,
};

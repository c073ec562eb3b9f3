//! Validation of preference assignments.

use serde::Deserialize;
use tallybook_shared::FieldError;

use super::role::GeneralLedgerRole;
use crate::chart::AccountClassType;
use crate::error::AccountingError;

/// Field error code for an id outside the role set.
pub const UNKNOWN_PREFERENCE: &str = "UNKNOWN_PREFERENCE";
/// Field error code for an account that does not resolve to a class.
pub const ACCOUNT_NOT_FOUND: &str = "ACCOUNT_NOT_FOUND";
/// Field error code for a role that needs a balance-sheet account.
pub const MUST_BE_BALANCE_SHEET_ACCOUNT: &str = "MUST_BE_BALANCE_SHEET_ACCOUNT";

/// A requested `{id, account_id}` binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PreferenceAssignment {
    /// Preference (role) id.
    pub id: i32,
    /// Account to bind, `None` (or `0`) to clear.
    pub account_id: Option<i64>,
}

impl PreferenceAssignment {
    /// Returns the account id with `0` mapped to `None`.
    #[must_use]
    pub fn account(&self) -> Option<i64> {
        self.account_id.filter(|id| *id != 0)
    }
}

/// Collects field errors for a batch of assignments.
///
/// `class_type_of` resolves an account through its group to its class and
/// returns the class `type_id`, or `None` if any link is missing. Errors are
/// keyed by preference id.
///
/// Retained earnings must resolve to a balance-sheet class, so leaving it
/// unbound is reported too.
pub fn validate_preferences<F>(assignments: &[PreferenceAssignment], class_type_of: F) -> Vec<FieldError>
where
    F: Fn(i64) -> Option<i32>,
{
    let mut errors = Vec::new();

    for assignment in assignments {
        let field = assignment.id.to_string();

        let Some(role) = GeneralLedgerRole::from_id(assignment.id) else {
            errors.push(FieldError::new(field, UNKNOWN_PREFERENCE, "Unknown preference"));
            continue;
        };

        let type_id = match assignment.account() {
            Some(account_id) => match class_type_of(account_id) {
                Some(type_id) => Some(type_id),
                None => {
                    errors.push(FieldError::new(field, ACCOUNT_NOT_FOUND, "Account not found"));
                    continue;
                }
            },
            None => None,
        };

        let balance_sheet = type_id
            .and_then(AccountClassType::from_id)
            .is_some_and(AccountClassType::is_balance_sheet);

        if role.requires_balance_sheet() && !balance_sheet {
            errors.push(FieldError::new(
                field,
                MUST_BE_BALANCE_SHEET_ACCOUNT,
                "Account must be one of the balance sheet account",
            ));
        }
    }

    errors
}

/// Like [`validate_preferences`] but fails on any field error.
///
/// # Errors
///
/// Returns `AccountingError::Validation` carrying every field error.
pub fn ensure_valid_preferences<F>(
    assignments: &[PreferenceAssignment],
    class_type_of: F,
) -> Result<(), AccountingError>
where
    F: Fn(i64) -> Option<i32>,
{
    let errors = validate_preferences(assignments, class_type_of);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AccountingError::Validation(errors))
    }
}

/// Resolves the retained earnings account used when closing a fiscal year.
///
/// `class_type_id` is the class type of `account_id`, if it resolved.
///
/// # Errors
///
/// Returns `AccountingError::PreferenceInvalid` if the preference is unbound,
/// does not resolve, or is not a balance-sheet account.
pub fn retained_earnings_account(
    account_id: Option<i64>,
    class_type_id: Option<i32>,
) -> Result<i64, AccountingError> {
    let account_id = account_id.filter(|id| *id != 0).ok_or_else(|| {
        AccountingError::PreferenceInvalid("retained earnings account is not set".to_string())
    })?;

    match class_type_id.and_then(AccountClassType::from_id) {
        Some(class_type) if class_type.is_balance_sheet() => Ok(account_id),
        Some(_) => Err(AccountingError::PreferenceInvalid(format!(
            "retained earnings account {account_id} is not a balance sheet account"
        ))),
        None => Err(AccountingError::PreferenceInvalid(format!(
            "retained earnings account {account_id} does not resolve to an account class"
        ))),
    }
}

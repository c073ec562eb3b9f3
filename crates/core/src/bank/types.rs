//! Bank account domain types.

use serde::Serialize;

use crate::error::AccountingError;

/// Kind of bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "BankAccountTypeView")]
pub enum BankAccountType {
    /// Petty cash.
    Cash = 1,
    /// Chequing account.
    Chequing = 2,
    /// Savings account.
    Saving = 3,
    /// Credit card or credit line.
    Credit = 4,
}

/// Wire shape of a bank account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankAccountTypeView {
    /// Numeric type id.
    pub id: i32,
    /// Display name.
    pub name: &'static str,
}

impl From<BankAccountType> for BankAccountTypeView {
    fn from(kind: BankAccountType) -> Self {
        Self {
            id: kind.id(),
            name: kind.name(),
        }
    }
}

impl BankAccountType {
    /// All bank account types in id order.
    pub const ALL: [Self; 4] = [Self::Cash, Self::Chequing, Self::Saving, Self::Credit];

    /// Looks up a type by id.
    #[must_use]
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Cash),
            2 => Some(Self::Chequing),
            3 => Some(Self::Saving),
            4 => Some(Self::Credit),
            _ => None,
        }
    }

    /// Parses a type id, rejecting unknown values.
    ///
    /// # Errors
    ///
    /// Returns `AccountingError::InvalidBankAccountType` for unknown ids.
    pub const fn try_from_id(id: i32) -> Result<Self, AccountingError> {
        match Self::from_id(id) {
            Some(kind) => Ok(kind),
            None => Err(AccountingError::InvalidBankAccountType(id)),
        }
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Chequing => "Chequing",
            Self::Saving => "Saving",
            Self::Credit => "Credit",
        }
    }

    /// Returns every type as its wire view.
    #[must_use]
    pub fn views() -> Vec<BankAccountTypeView> {
        Self::ALL.into_iter().map(BankAccountTypeView::from).collect()
    }
}

/// Direction of a bank transaction, stored as `bank_transactions.type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BankTransactionType {
    /// Money coming into the bank account.
    Deposit = 1,
    /// Money leaving the bank account.
    Payment = 2,
}

impl BankTransactionType {
    /// Returns the numeric id.
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }
}

/// The parts of a stored bank account that deposits look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankAccountInfo {
    /// Bank account id.
    pub id: i64,
    /// Underlying ledger account.
    pub account_id: i64,
    /// Kind of bank account.
    pub type_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_account_types() {
        assert_eq!(BankAccountType::try_from_id(2), Ok(BankAccountType::Chequing));
        assert_eq!(
            BankAccountType::try_from_id(5),
            Err(AccountingError::InvalidBankAccountType(5))
        );
        assert_eq!(BankAccountType::Credit.name(), "Credit");
        assert_eq!(BankAccountType::views().len(), 4);
    }

    #[test]
    fn test_transaction_type_ids() {
        assert_eq!(BankTransactionType::Deposit.id(), 1);
        assert_eq!(BankTransactionType::Payment.id(), 2);
    }
}

//! The fixed set of general ledger roles.

use serde::Serialize;

/// Logical roles an account can be assigned to. The id space is fixed and the
/// migration seeds one preference row per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneralLedgerRole {
    /// Equity account receiving the closing entry of each fiscal year.
    RetainedEarnings = 1,
    /// Profit and loss for the current year.
    ProfitLossYear = 2,
    /// Gains and losses from exchange differences.
    ExchangeVariances = 3,
    /// Fees charged by banks.
    BankCharges = 4,
}

impl GeneralLedgerRole {
    /// All roles in id order.
    pub const ALL: [Self; 4] = [
        Self::RetainedEarnings,
        Self::ProfitLossYear,
        Self::ExchangeVariances,
        Self::BankCharges,
    ];

    /// Looks up a role by its preference id.
    #[must_use]
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::RetainedEarnings),
            2 => Some(Self::ProfitLossYear),
            3 => Some(Self::ExchangeVariances),
            4 => Some(Self::BankCharges),
            _ => None,
        }
    }

    /// Returns the preference id.
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RetainedEarnings => "Retained Earnings",
            Self::ProfitLossYear => "Profit/Loss Year",
            Self::ExchangeVariances => "Exchange Variances",
            Self::BankCharges => "Bank Charges",
        }
    }

    /// Returns true if the role only accepts balance-sheet accounts.
    #[must_use]
    pub const fn requires_balance_sheet(self) -> bool {
        matches!(self, Self::RetainedEarnings)
    }
}

//! Fixed registry of account class types.
//!
//! Class types are not rows the application writes. Account classes store the
//! numeric id and everything else is derived from this enum.

use serde::Serialize;

use crate::error::AccountingError;

/// The six account class types of the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "ClassTypeView")]
pub enum AccountClassType {
    /// Resources owned.
    Asset = 1,
    /// Obligations owed.
    Liability = 2,
    /// Owner's residual interest.
    Equity = 3,
    /// Revenue.
    Income = 4,
    /// Cost of goods sold.
    CostOfGoodsSold = 5,
    /// Operating expenses.
    Expense = 6,
}

/// Wire shape of a class type: `{"id": 1, "name": "Asset"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassTypeView {
    /// Numeric type id.
    pub id: i32,
    /// Display name.
    pub name: &'static str,
}

impl From<AccountClassType> for ClassTypeView {
    fn from(class_type: AccountClassType) -> Self {
        Self {
            id: class_type.id(),
            name: class_type.name(),
        }
    }
}

impl AccountClassType {
    /// All class types in id order.
    pub const ALL: [Self; 6] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::CostOfGoodsSold,
        Self::Expense,
    ];

    /// Looks up a class type by its numeric id.
    #[must_use]
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Asset),
            2 => Some(Self::Liability),
            3 => Some(Self::Equity),
            4 => Some(Self::Income),
            5 => Some(Self::CostOfGoodsSold),
            6 => Some(Self::Expense),
            _ => None,
        }
    }

    /// Parses a class type id, rejecting unknown values.
    ///
    /// # Errors
    ///
    /// Returns `AccountingError::InvalidClassType` for ids outside `1..=6`.
    pub const fn try_from_id(id: i32) -> Result<Self, AccountingError> {
        match Self::from_id(id) {
            Some(class_type) => Ok(class_type),
            None => Err(AccountingError::InvalidClassType(id)),
        }
    }

    /// Returns the numeric id stored in `account_classes.type_id`.
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Income => "Income",
            Self::CostOfGoodsSold => "Cost of Good Solds",
            Self::Expense => "Expense",
        }
    }

    /// Returns true for Asset, Liability and Equity.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Largest type id that still belongs to the balance sheet.
    #[must_use]
    pub const fn balance_sheet_upper_bound() -> i32 {
        Self::Equity.id()
    }

    /// Returns every class type as its wire view.
    #[must_use]
    pub fn views() -> Vec<ClassTypeView> {
        Self::ALL.into_iter().map(ClassTypeView::from).collect()
    }
}

//! Entity re-exports.

pub use super::account_classes::Entity as AccountClasses;
pub use super::account_groups::Entity as AccountGroups;
pub use super::accounts::Entity as Accounts;
pub use super::bank_accounts::Entity as BankAccounts;
pub use super::bank_transactions::Entity as BankTransactions;
pub use super::fiscal_years::Entity as FiscalYears;
pub use super::general_ledger_preferences::Entity as GeneralLedgerPreferences;
pub use super::general_ledgers::Entity as GeneralLedgers;
pub use super::journals::Entity as Journals;

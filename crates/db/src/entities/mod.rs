//! `SeaORM` entities for the accounting schema.

pub mod prelude;

pub mod account_classes;
pub mod account_groups;
pub mod accounts;
pub mod bank_accounts;
pub mod bank_transactions;
pub mod fiscal_years;
pub mod general_ledger_preferences;
pub mod general_ledgers;
pub mod journals;

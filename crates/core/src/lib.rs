//! Core accounting logic for Tallybook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Repositories load what a rule needs, call into this crate, and write the result.
//!
//! # Modules
//!
//! - `chart` - Account class types and group nesting
//! - `ledger` - Zero-sum posting and closing entries
//! - `fiscal` - Fiscal year ranges, posting windows and closing order
//! - `preference` - General ledger role bindings
//! - `bank` - Bank accounts and deposits

pub mod bank;
pub mod chart;
pub mod error;
pub mod fiscal;
pub mod ledger;
pub mod preference;

pub use error::AccountingError;

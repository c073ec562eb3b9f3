//! Double-entry posting logic.
//!
//! This module turns signed rows into journals:
//! - Posting request and prepared journal types
//! - Zero-sum validation and journal amount derivation
//! - Closing entries for fiscal year end
//! - Void checks

pub mod closing;
pub mod posting;
pub mod types;

#[cfg(test)]
mod posting_props;

pub use closing::prepare_closing;
pub use posting::{AMOUNT_LIMIT, AMOUNT_SCALE, PostingService};
pub use types::{JournalStatus, PostingRequest, PostingRow, PreparedLine, PreparedPosting};

//! Fiscal year management.

pub mod period;

#[cfg(test)]
mod period_props;

pub use period::{
    FiscalYear, date_ranges_overlap, ensure_closable, ensure_no_overlap, ensure_posting_allowed,
    validate_date_range,
};

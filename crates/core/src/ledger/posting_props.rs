//! Property-based tests for PostingService.
//!
//! - Balanced row sets always post, with amount equal to the debit total
//! - Unbalanced row sets never post
//! - Zero rows never reach the ledger

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::posting::PostingService;
use super::types::{PostingRequest, PostingRow};
use crate::error::AccountingError;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate account ids.
fn account_id() -> impl Strategy<Value = i64> {
    1i64..500
}

fn make_request(rows: Vec<PostingRow>) -> PostingRequest {
    PostingRequest {
        created_by: Uuid::new_v4(),
        trans_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        memo: "Generated".to_string(),
        rows,
    }
}

/// Splits every debit into a matching credit on another account.
fn balanced_rows() -> impl Strategy<Value = Vec<PostingRow>> {
    prop::collection::vec((positive_amount(), account_id(), account_id()), 1..10).prop_map(
        |pairs| {
            pairs
                .into_iter()
                .flat_map(|(amount, debit, credit)| {
                    [PostingRow::new(debit, amount), PostingRow::new(credit, -amount)]
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balanced rows post, the lines sum to zero and the amount is the debit total.
    #[test]
    fn prop_balanced_rows_post(rows in balanced_rows()) {
        let expected: Decimal = rows.iter().map(|r| r.amount).filter(|a| *a > Decimal::ZERO).sum();

        let posting = PostingService::prepare(&make_request(rows.clone()))
            .unwrap()
            .unwrap();

        prop_assert_eq!(posting.line_total(), Decimal::ZERO);
        prop_assert_eq!(posting.amount, expected);
        prop_assert_eq!(posting.lines.len(), rows.len());
    }

    /// Any non-zero imbalance is rejected with the offending total.
    #[test]
    fn prop_unbalanced_rows_fail(rows in balanced_rows(), skew in positive_amount(), account in account_id()) {
        let mut rows = rows;
        rows.push(PostingRow::new(account, skew));

        let result = PostingService::prepare(&make_request(rows));
        prop_assert_eq!(result, Err(AccountingError::TransactionNotBalance { total: skew }));
    }

    /// Zero rows interleaved anywhere are dropped.
    #[test]
    fn prop_zero_rows_are_dropped(rows in balanced_rows(), zeros in prop::collection::vec(account_id(), 0..5)) {
        let mut all = rows.clone();
        all.extend(zeros.iter().map(|id| PostingRow::new(*id, Decimal::ZERO)));

        let posting = PostingService::prepare(&make_request(all)).unwrap().unwrap();

        prop_assert_eq!(posting.lines.len(), rows.len());
        prop_assert!(posting.lines.iter().all(|line| !line.amount.is_zero()));
    }

    /// Rows that are all zero never produce a journal.
    #[test]
    fn prop_all_zero_rows_are_noop(zeros in prop::collection::vec(account_id(), 0..8)) {
        let rows = zeros.into_iter().map(|id| PostingRow::new(id, Decimal::ZERO)).collect();
        prop_assert_eq!(PostingService::prepare(&make_request(rows)), Ok(None));
    }
}

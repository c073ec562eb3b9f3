//! Typed filter builder for list queries.
//!
//! Each list endpoint has a plain filter struct whose fields are all optional.
//! The struct converts itself into a [`Filter`], which only adds a clause for
//! the fields that are set, and the resulting [`Condition`] is handed to
//! `QueryFilter::filter`.
//!
//! ```ignore
//! let condition = Filter::new()
//!     .eq(accounts::Column::GroupId, filter.group_id)
//!     .like(accounts::Column::Name, filter.name.as_deref())
//!     .into_condition();
//! ```

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, Value};

/// Escape character for `LIKE` patterns built from user input.
const LIKE_ESCAPE: char = '\\';

/// Builds a lowercase substring pattern in which `%`, `_` and the escape
/// character match themselves.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Accumulates `AND`-ed clauses over optional inputs.
#[derive(Debug, Clone)]
pub struct Filter {
    condition: Condition,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    /// Creates an empty filter that matches every row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
        }
    }

    fn push(mut self, expr: SimpleExpr) -> Self {
        self.condition = self.condition.add(expr);
        self
    }

    /// Adds `column = value` when `value` is set.
    #[must_use]
    pub fn eq<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        match value {
            Some(value) => self.push(column.eq(value)),
            None => self,
        }
    }

    /// Adds `column <> value` when `value` is set.
    #[must_use]
    pub fn not_eq<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        match value {
            Some(value) => self.push(column.ne(value)),
            None => self,
        }
    }

    /// Adds `LOWER(column) LIKE '%value%'` when `value` is set and not blank.
    ///
    /// Wildcards in `value` are escaped and match literally.
    #[must_use]
    pub fn like<C>(self, column: C, value: Option<&str>) -> Self
    where
        C: ColumnTrait,
    {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return self;
        };

        let pattern = LikeExpr::new(like_pattern(value)).escape(LIKE_ESCAPE);
        let expr = Expr::expr(Func::lower(Expr::col((column.entity_name(), column)))).like(pattern);
        self.push(expr)
    }

    /// Adds `column >= value` when `value` is set.
    #[must_use]
    pub fn gte<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        match value {
            Some(value) => self.push(column.gte(value)),
            None => self,
        }
    }

    /// Adds `column <= value` when `value` is set.
    #[must_use]
    pub fn lte<C, V>(self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        match value {
            Some(value) => self.push(column.lte(value)),
            None => self,
        }
    }

    /// Adds `column IN (values)` when `values` is set.
    ///
    /// An empty list matches nothing.
    #[must_use]
    pub fn is_in<C, V, I>(self, column: C, values: Option<I>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        match values {
            Some(values) => self.push(column.is_in(values)),
            None => self,
        }
    }

    /// Adds `column NOT IN (values)` when `values` is set.
    #[must_use]
    pub fn is_not_in<C, V, I>(self, column: C, values: Option<I>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        match values {
            Some(values) => self.push(column.is_not_in(values)),
            None => self,
        }
    }

    /// Adds `column IS NULL` for `Some(true)` and `IS NOT NULL` for `Some(false)`.
    #[must_use]
    pub fn is_null<C>(self, column: C, is_null: Option<bool>) -> Self
    where
        C: ColumnTrait,
    {
        match is_null {
            Some(true) => self.push(column.is_null()),
            Some(false) => self.push(column.is_not_null()),
            None => self,
        }
    }

    /// Consumes the builder and returns the combined condition.
    #[must_use]
    pub fn into_condition(self) -> Condition {
        self.condition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{accounts, fiscal_years};
    use chrono::NaiveDate;
    use rstest::rstest;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn account_sql(filter: Filter) -> String {
        accounts::Entity::find()
            .filter(filter.into_condition())
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let filter = Filter::new()
            .eq(accounts::Column::GroupId, None::<i64>)
            .like(accounts::Column::Name, None);

        assert!(!account_sql(filter).contains("WHERE"));
    }

    #[test]
    fn test_eq_and_like_are_anded() {
        let filter = Filter::new()
            .eq(accounts::Column::GroupId, Some(7_i64))
            .like(accounts::Column::Name, Some("  Cash "));

        let sql = account_sql(filter);
        assert!(sql.contains(r#""accounts"."group_id" = 7"#), "{sql}");
        assert!(sql.contains(r#"LOWER("accounts"."name") LIKE '%cash%' ESCAPE"#), "{sql}");
        assert!(sql.contains(" AND "), "{sql}");
    }

    #[rstest]
    #[case("cash", "%cash%")]
    #[case("100%", "%100\\%%")]
    #[case("Petty_Cash", "%petty\\_cash%")]
    #[case("a\\b", "%a\\\\b%")]
    fn test_like_wildcards_match_literally(#[case] value: &str, #[case] pattern: &str) {
        assert_eq!(like_pattern(value), pattern);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t")]
    fn test_blank_like_is_skipped(#[case] value: &str) {
        let filter = Filter::new().like(accounts::Column::Name, Some(value));
        assert!(!account_sql(filter).contains("WHERE"));
    }

    #[test]
    fn test_in_and_not_in() {
        let sql = account_sql(
            Filter::new()
                .is_in(accounts::Column::Id, Some(vec![1_i64, 2, 3]))
                .is_not_in(accounts::Column::GroupId, Some([9_i64])),
        );

        assert!(sql.contains(r#""accounts"."id" IN (1, 2, 3)"#), "{sql}");
        assert!(sql.contains(r#""accounts"."group_id" NOT IN (9)"#), "{sql}");
    }

    #[test]
    fn test_not_eq_and_null_checks() {
        let sql = account_sql(
            Filter::new()
                .not_eq(accounts::Column::Inactive, Some(true))
                .is_null(accounts::Column::GroupId, Some(false)),
        );

        assert!(sql.contains(r#""accounts"."inactive" <> TRUE"#), "{sql}");
        assert!(sql.contains(r#""accounts"."group_id" IS NOT NULL"#), "{sql}");
    }

    #[test]
    fn test_date_range() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        let sql = fiscal_years::Entity::find()
            .filter(
                Filter::new()
                    .gte(fiscal_years::Column::StartDate, Some(from))
                    .lte(fiscal_years::Column::EndDate, Some(to))
                    .into_condition(),
            )
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""fiscal_years"."start_date" >= '2024-01-01'"#), "{sql}");
        assert!(sql.contains(r#""fiscal_years"."end_date" <= '2024-12-31'"#), "{sql}");
    }
}

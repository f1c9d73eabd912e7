/// Date-range and pagination handling for the report queries
///
/// Every report endpoint accepts optional `from`/`to` query parameters and
/// appends them to its base query as `AND <column> >= ?` / `AND <column>
/// <= ?` conditions via `QueryBuilder`. The SQL text only ever contains
/// column names chosen by the handler; the user's values reach PostgreSQL
/// exclusively through bind parameters.
///
/// # Example
///
/// ```
/// use botboard_shared::filters::DateRange;
/// use sqlx::{Postgres, QueryBuilder};
///
/// # fn example() -> Result<(), botboard_shared::filters::FilterError> {
/// let range = DateRange::parse(Some("2025-01-01"), None)?;
///
/// let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE 1=1");
/// range.apply(&mut builder, "u.first_seen");
/// assert_eq!(
///     builder.sql(),
///     "SELECT COUNT(*) FROM users u WHERE 1=1 AND u.first_seen >= $1"
/// );
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};

/// Error type for filter parsing
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A `from`/`to` value was neither a date nor an RFC 3339 timestamp
    #[error("Invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),
}

/// An optional inclusive date range, parsed from `from`/`to` query parameters
///
/// Bare dates mean midnight UTC, so `from=2025-01-01&to=2025-01-31` covers
/// January except the final day's activity after midnight; callers wanting
/// the whole final day pass the next midnight or a full timestamp. This
/// matches how the bounds have always behaved when handed to PostgreSQL as
/// date literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,
}

/// Echo of the raw filter parameters, returned alongside every report so the
/// dashboard can display what a chart was computed over.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FilterEcho {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn parse_bound(value: &str) -> Result<DateTime<Utc>, FilterError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| FilterError::InvalidDate(value.to_string()))
}

impl DateRange {
    /// Parses optional `from`/`to` strings into a range
    ///
    /// An empty range (`from > to`) is allowed and simply matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidDate` if either value fails to parse.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            from: from.map(parse_bound).transpose()?,
            to: to.map(parse_bound).transpose()?,
        })
    }

    /// True when neither bound is set
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Appends the range conditions for `column` to a query under
    /// construction, binding the present bounds
    ///
    /// The builder must already be inside its WHERE clause (the callers all
    /// use `WHERE 1=1` or an existing condition as the anchor).
    pub fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>, column: &str) {
        if let Some(from) = self.from {
            builder.push(format!(" AND {} >= ", column));
            builder.push_bind(from);
        }
        if let Some(to) = self.to {
            builder.push(format!(" AND {} <= ", column));
            builder.push_bind(to);
        }
    }

    /// The raw-parameter echo included in report responses
    pub fn echo(from: Option<&str>, to: Option<&str>) -> FilterEcho {
        FilterEcho {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }
}

/// Page/offset arithmetic for the per-user conversation history
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: i64,

    /// Rows per page, clamped to 1..=100
    pub page_size: i64,
}

impl Pagination {
    /// Default rows per page
    pub const DEFAULT_PAGE_SIZE: i64 = 20;

    /// Upper bound on rows per page
    pub const MAX_PAGE_SIZE: i64 = 100;

    /// Builds pagination from optional query parameters, clamping both
    pub fn from_params(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(Self::DEFAULT_PAGE_SIZE)
            .clamp(1, Self::MAX_PAGE_SIZE);

        Self { page, page_size }
    }

    /// OFFSET for the current page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Number of pages needed for `total` rows
    pub fn total_pages(&self, total: i64) -> i64 {
        if total == 0 {
            0
        } else {
            (total + self.page_size - 1) / self.page_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sql_for(range: &DateRange, column: &str) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 WHERE 1=1");
        range.apply(&mut builder, column);
        builder.sql().to_string()
    }

    #[test]
    fn test_parse_bare_date_is_midnight_utc() {
        let range = DateRange::parse(Some("2025-03-15"), None).unwrap();
        assert_eq!(
            range.from,
            Some(Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap())
        );
        assert!(range.to.is_none());
    }

    #[test]
    fn test_parse_rfc3339() {
        let range = DateRange::parse(None, Some("2025-03-15T18:30:00Z")).unwrap();
        assert_eq!(
            range.to,
            Some(Utc.with_ymd_and_hms(2025, 3, 15, 18, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_invalid_date() {
        let result = DateRange::parse(Some("15/03/2025"), None);
        assert!(matches!(result, Err(FilterError::InvalidDate(_))));

        let result = DateRange::parse(None, Some("soon"));
        assert!(matches!(result, Err(FilterError::InvalidDate(_))));
    }

    #[test]
    fn test_empty_range_appends_nothing() {
        let range = DateRange::parse(None, None).unwrap();
        assert!(range.is_empty());
        assert_eq!(sql_for(&range, "started_at"), "SELECT 1 WHERE 1=1");
    }

    #[test]
    fn test_apply_numbers_both_bounds() {
        let range = DateRange::parse(Some("2025-01-01"), Some("2025-02-01")).unwrap();
        assert_eq!(
            sql_for(&range, "u.first_seen"),
            "SELECT 1 WHERE 1=1 AND u.first_seen >= $1 AND u.first_seen <= $2"
        );
    }

    #[test]
    fn test_apply_numbers_continue_after_existing_binds() {
        let range = DateRange::parse(None, Some("2025-02-01")).unwrap();

        // A query that already bound a parameter (e.g. a user id)
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT 1 FROM conversations WHERE user_id = ");
        builder.push_bind(7_i64);
        range.apply(&mut builder, "started_at");

        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM conversations WHERE user_id = $1 AND started_at <= $2"
        );
    }

    #[test]
    fn test_echo_preserves_raw_values() {
        let echo = DateRange::echo(Some("2025-01-01"), None);
        assert_eq!(echo.from.as_deref(), Some("2025-01-01"));
        assert!(echo.to.is_none());
    }

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::from_params(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 20);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::from_params(Some(0), Some(100_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, Pagination::MAX_PAGE_SIZE);

        let p = Pagination::from_params(Some(-3), Some(0));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 1);
    }

    #[test]
    fn test_pagination_offset_and_total_pages() {
        let p = Pagination::from_params(Some(3), Some(20));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(20), 1);
        assert_eq!(p.total_pages(21), 2);
        assert_eq!(p.total_pages(61), 4);
    }
}

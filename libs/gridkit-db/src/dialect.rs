//! Per-dialect SQL strategies for the operators SeaORM does not cover
//! portably (case-insensitive LIKE, regex matching, date-part extraction).
//!
//! The strategy is selected once per store session from the connection's
//! backend and injected into the compiler, instead of re-branching inside
//! every operator handler. Column names passed in here have already been
//! resolved through the whitelist registry.

use chrono::{NaiveDate, NaiveTime};
use gridkit_core::DatePart;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::DbBackend;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    MySql,
    Sqlite,
}

impl From<DbBackend> for SqlDialect {
    fn from(backend: DbBackend) -> Self {
        match backend {
            DbBackend::Postgres => Self::Postgres,
            DbBackend::MySql => Self::MySql,
            DbBackend::Sqlite => Self::Sqlite,
        }
    }
}

impl SqlDialect {
    /// Case-insensitive LIKE: native `ILIKE` on Postgres, case-folded
    /// `LOWER(col) LIKE` with a lowercased pattern elsewhere.
    pub(crate) fn ilike(&self, col: &str, pattern: String) -> SimpleExpr {
        match self {
            Self::Postgres => Expr::cust_with_values(format!("{col} ILIKE ?"), [pattern]),
            Self::MySql | Self::Sqlite => Expr::cust_with_values(
                format!("LOWER({col}) LIKE ?"),
                [pattern.to_lowercase()],
            ),
        }
    }

    /// Regex match. SQLite has no built-in regexp function, so it yields no
    /// predicate there.
    pub(crate) fn regex(&self, col: &str, pattern: &str, case_insensitive: bool) -> Option<SimpleExpr> {
        let expr = match (self, case_insensitive) {
            (Self::Postgres, false) => {
                Expr::cust_with_values(format!("{col} ~ ?"), [pattern.to_owned()])
            }
            (Self::Postgres, true) => {
                Expr::cust_with_values(format!("{col} ~* ?"), [pattern.to_owned()])
            }
            (Self::MySql, false) => {
                Expr::cust_with_values(format!("{col} REGEXP BINARY ?"), [pattern.to_owned()])
            }
            (Self::MySql, true) => {
                Expr::cust_with_values(format!("{col} REGEXP ?"), [pattern.to_owned()])
            }
            (Self::Sqlite, _) => return None,
        };
        Some(expr)
    }

    /// Date-part equality. Postgres-flavored (`DATE()`/`TIME()` casts,
    /// `EXTRACT` for the rest, `DOW` 0=Sunday / `ISODOW` 1=Monday); other
    /// dialects yield no predicate — extension point.
    pub(crate) fn date_part(&self, part: DatePart, col: &str, raw: &str) -> Option<SimpleExpr> {
        if *self != Self::Postgres {
            return None;
        }
        let expr = match part {
            DatePart::Date => {
                let date: NaiveDate = raw.trim().parse().ok()?;
                Expr::cust_with_values(
                    format!("DATE({col}) = ?"),
                    [sea_orm::Value::ChronoDate(Some(Box::new(date)))],
                )
            }
            DatePart::Time => {
                let time: NaiveTime = raw.trim().parse().ok()?;
                Expr::cust_with_values(
                    format!("TIME({col}) = ?"),
                    [sea_orm::Value::ChronoTime(Some(Box::new(time)))],
                )
            }
            _ => {
                let value = numeric_value(raw)?;
                Expr::cust_with_values(
                    format!("EXTRACT({} FROM {col}) = ?", extract_keyword(part)),
                    [value],
                )
            }
        };
        Some(expr)
    }
}

fn extract_keyword(part: DatePart) -> &'static str {
    match part {
        DatePart::Year => "YEAR",
        DatePart::IsoYear => "ISOYEAR",
        DatePart::Quarter => "QUARTER",
        DatePart::Month => "MONTH",
        DatePart::Week => "WEEK",
        DatePart::WeekDay => "DOW",
        DatePart::IsoWeekDay => "ISODOW",
        DatePart::Day => "DAY",
        DatePart::Hour => "HOUR",
        DatePart::Minute => "MINUTE",
        DatePart::Second => "SECOND",
        DatePart::Microsecond => "MICROSECONDS",
        // handled by the cast branches above
        DatePart::Date | DatePart::Time => "",
    }
}

/// `EXTRACT` returns a numeric, so the comparison value must bind numeric.
fn numeric_value(raw: &str) -> Option<sea_orm::Value> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(sea_orm::Value::BigInt(Some(i)));
    }
    raw.parse::<f64>()
        .ok()
        .map(|f| sea_orm::Value::Double(Some(f)))
}

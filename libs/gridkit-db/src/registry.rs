//! Per-entity column whitelists.
//!
//! Only names present in a [`FieldMap`] may reach generated SQL — filtering,
//! ordering and projection all resolve through it. A miss is not an error;
//! callers drop the entry.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::EntityTrait;

/// Storage kind of a whitelisted column; drives filter-value coercion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    DateTimeUtc,
    Date,
    Time,
}

#[derive(Clone)]
pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

/// Case-insensitive external-name → column table, built once per entity
/// (typically in a `Lazy` static) and never mutated at runtime.
#[derive(Clone)]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, name: impl Into<String>, col: E::Column, kind: FieldKind) -> Self {
        self.map
            .insert(name.into().to_lowercase(), Field { col, kind });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&name.trim().to_lowercase())
    }
}

/// Coerce a raw filter value into a typed bind value.
///
/// The store driver binds typed parameters, so string literals are parsed
/// per the whitelisted column's kind. `None` means the entry yields no
/// predicate (fail-open).
pub fn coerce_value(kind: FieldKind, raw: &str) -> Option<sea_orm::Value> {
    let value = match kind {
        FieldKind::String => sea_orm::Value::String(Some(Box::new(raw.to_owned()))),
        FieldKind::I64 => sea_orm::Value::BigInt(Some(raw.trim().parse::<i64>().ok()?)),
        FieldKind::F64 => sea_orm::Value::Double(Some(raw.trim().parse::<f64>().ok()?)),
        FieldKind::Bool => sea_orm::Value::Bool(Some(parse_bool(raw)?)),
        FieldKind::DateTimeUtc => {
            sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(parse_datetime(raw)?)))
        }
        FieldKind::Date => {
            sea_orm::Value::ChronoDate(Some(Box::new(raw.trim().parse::<NaiveDate>().ok()?)))
        }
        FieldKind::Time => {
            sea_orm::Value::ChronoTime(Some(Box::new(raw.trim().parse::<NaiveTime>().ok()?)))
        }
    };
    Some(value)
}

/// Same coercion for JSON array elements (`in`, `not_in`, `range` values);
/// scalar numbers and bools are accepted alongside strings.
pub(crate) fn coerce_json_scalar(kind: FieldKind, v: &serde_json::Value) -> Option<sea_orm::Value> {
    match v {
        serde_json::Value::String(s) => coerce_value(kind, s),
        serde_json::Value::Number(n) => coerce_value(kind, &n.to_string()),
        serde_json::Value::Bool(b) => coerce_value(kind, if *b { "true" } else { "false" }),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    // date-only literals compare from midnight
    let date = raw.parse::<NaiveDate>().ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

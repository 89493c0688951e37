//! Filter-expression compiler: turns parsed filter groups into SeaORM
//! conditions against a whitelisted column registry.
//!
//! Every stage is fail-open. An entry that cannot be compiled (unknown
//! field, unknown operator, uncoercible value, malformed list) contributes
//! no predicate; it never aborts the query.

use gridkit_core::{parse_filter_expression, FilterGroup, FilterKey, FilterOp, OpToken};
use sea_orm::sea_query::{Condition, Expr, SimpleExpr};
use sea_orm::{ColumnTrait, EntityTrait, IdenStatic};

use crate::dialect::SqlDialect;
use crate::registry::{coerce_json_scalar, coerce_value, Field, FieldKind, FieldMap};

/// Compiles one `(key, value)` filter entry into a predicate.
///
/// Returns `None` when the entry yields nothing: empty value, malformed
/// key, field not present in the registry, or a value the operator cannot
/// use.
pub fn compile_entry<E>(
    dialect: SqlDialect,
    fields: &FieldMap<E>,
    key: &str,
    value: &str,
) -> Option<SimpleExpr>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    if value.is_empty() {
        return None;
    }
    let key = FilterKey::parse(key)?;
    let Some(field) = fields.get(&key.field) else {
        tracing::debug!(field = %key.field, "filter field not in whitelist, dropping");
        return None;
    };
    match key.op {
        None => Some(field.col.eq(coerce_value(field.kind, value)?)),
        Some(OpToken::Cmp(op)) => compile_cmp(dialect, field, op, value),
        Some(OpToken::Part(part)) => dialect.date_part(part, field.col.as_str(), value),
    }
}

fn compile_cmp<E>(
    dialect: SqlDialect,
    field: &Field<E>,
    op: FilterOp,
    value: &str,
) -> Option<SimpleExpr>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let col = field.col;
    let expr = match op {
        FilterOp::Not => col.ne(coerce_value(field.kind, value)?),
        FilterOp::In => {
            let values = decode_list(field.kind, value)?;
            if values.is_empty() {
                // IN over an empty set matches nothing
                Expr::cust("1=0")
            } else {
                col.is_in(values)
            }
        }
        FilterOp::NotIn => {
            let values = decode_list(field.kind, value)?;
            if values.is_empty() {
                return None;
            }
            col.is_not_in(values)
        }
        FilterOp::Gte => col.gte(coerce_value(field.kind, value)?),
        FilterOp::Gt => col.gt(coerce_value(field.kind, value)?),
        FilterOp::Lte => col.lte(coerce_value(field.kind, value)?),
        FilterOp::Lt => col.lt(coerce_value(field.kind, value)?),
        FilterOp::Range => {
            let values = decode_list(field.kind, value)?;
            let [low, high] = <[sea_orm::Value; 2]>::try_from(values).ok()?;
            col.between(low, high)
        }
        FilterOp::IsNull => col.is_null(),
        FilterOp::NotIsNull => col.is_not_null(),
        FilterOp::Contains => col.like(contains_pattern(value)),
        FilterOp::IContains => dialect.ilike(col.as_str(), contains_pattern(value)),
        FilterOp::StartsWith => col.like(starts_with_pattern(value)),
        FilterOp::IStartsWith => dialect.ilike(col.as_str(), starts_with_pattern(value)),
        FilterOp::EndsWith => col.like(ends_with_pattern(value)),
        FilterOp::IEndsWith => dialect.ilike(col.as_str(), ends_with_pattern(value)),
        // exact matching goes through LIKE, so wildcard characters in the
        // value keep their LIKE meaning
        FilterOp::Exact => col.like(value),
        FilterOp::IExact => dialect.ilike(col.as_str(), value.to_owned()),
        FilterOp::Regex => dialect.regex(col.as_str(), value, false)?,
        FilterOp::IRegex => dialect.regex(col.as_str(), value, true)?,
        // accepted token with no backing implementation
        FilterOp::Search => return None,
    };
    Some(expr)
}

/// Compiles one filter group into a conjunction of its entries'
/// predicates. `None` when no entry compiled.
pub fn compile_group<E>(
    dialect: SqlDialect,
    fields: &FieldMap<E>,
    group: &FilterGroup,
) -> Option<Condition>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let mut cond = Condition::all();
    let mut compiled = false;
    for (key, value) in group.entries() {
        if let Some(expr) = compile_entry(dialect, fields, key, value) {
            cond = cond.add(expr);
            compiled = true;
        }
    }
    compiled.then_some(cond)
}

/// Builds the full filter condition for a request from its AND filter
/// string and its OR filter string.
///
/// The boolean shape is fixed: `(a1 AND .. AND an) OR o1 OR .. OR om`,
/// where `a*` are the predicates compiled from `query` and `o*` the ones
/// from `or_query`. Either side may be absent; `None` means the request
/// carries no filter at all.
pub fn build_condition<E>(
    dialect: SqlDialect,
    fields: &FieldMap<E>,
    query: Option<&str>,
    or_query: Option<&str>,
) -> Option<Condition>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let ands = collect_predicates(dialect, fields, query);
    let ors = collect_predicates(dialect, fields, or_query);
    match (ands.is_empty(), ors.is_empty()) {
        (true, true) => None,
        (false, true) => Some(ands.into_iter().fold(Condition::all(), |c, e| c.add(e))),
        (true, false) => Some(ors.into_iter().fold(Condition::any(), |c, e| c.add(e))),
        (false, false) => {
            let base = ands.into_iter().fold(Condition::all(), |c, e| c.add(e));
            Some(ors.into_iter().fold(Condition::any().add(base), |c, e| c.add(e)))
        }
    }
}

fn collect_predicates<E>(
    dialect: SqlDialect,
    fields: &FieldMap<E>,
    raw: Option<&str>,
) -> Vec<SimpleExpr>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let Some(raw) = raw else {
        return Vec::new();
    };
    let groups = parse_filter_expression(raw);
    groups
        .iter()
        .flat_map(|group| group.entries())
        .filter_map(|(key, value)| compile_entry(dialect, fields, key, value))
        .collect()
}

fn decode_list(kind: FieldKind, raw: &str) -> Option<Vec<sea_orm::Value>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    items
        .iter()
        .map(|item| coerce_json_scalar(kind, item))
        .collect()
}

fn contains_pattern(value: &str) -> String {
    format!("%{value}%")
}

fn starts_with_pattern(value: &str) -> String {
    format!("{value}%")
}

fn ends_with_pattern(value: &str) -> String {
    format!("%{value}")
}

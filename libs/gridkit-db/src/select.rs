//! Extension traits mounting the composer stages onto `sea_orm::Select`.
//!
//! Each stage is a pure builder step: it consumes the select, applies its
//! clause, and returns it. Stages never touch another stage's clause, so
//! the usual order (paging, ordering, projection, safe limit, filters) is
//! a caller convention rather than a hidden dependency.

use gridkit_core::{OrderKey, PagePlan, SortDir};
use sea_orm::sea_query::Order;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};

use crate::compile::build_condition;
use crate::dialect::SqlDialect;
use crate::registry::FieldMap;

/// Applies the AND/OR filter strings of a request.
pub trait SelectFilterExt<E: EntityTrait>: Sized {
    fn apply_filter_query(
        self,
        dialect: SqlDialect,
        fields: &FieldMap<E>,
        query: Option<&str>,
        or_query: Option<&str>,
    ) -> Self;
}

impl<E> SelectFilterExt<E> for Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_filter_query(
        self,
        dialect: SqlDialect,
        fields: &FieldMap<E>,
        query: Option<&str>,
        or_query: Option<&str>,
    ) -> Self {
        match build_condition(dialect, fields, query, or_query) {
            Some(cond) => self.filter(cond),
            None => self,
        }
    }
}

/// Applies an ordered list of `field` / `-field` sort tokens. Tokens that
/// do not resolve through the registry are dropped; the surviving tokens
/// keep their relative order.
pub trait SelectOrderExt<E: EntityTrait>: Sized {
    fn apply_order_by(self, fields: &FieldMap<E>, order_by: &[String]) -> Self;
}

impl<E> SelectOrderExt<E> for Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_order_by(self, fields: &FieldMap<E>, order_by: &[String]) -> Self {
        let mut select = self;
        for raw in order_by {
            let Some(key) = OrderKey::parse(raw) else {
                continue;
            };
            let Some(field) = fields.get(&key.field) else {
                tracing::debug!(field = %key.field, "order field not in whitelist, dropping");
                continue;
            };
            let order = match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };
            select = select.order_by(field.col, order);
        }
        select
    }
}

/// Restricts the selected columns to a field mask. An empty mask, or a
/// mask where no path resolves through the registry, leaves the select
/// untouched (all columns).
pub trait SelectProjectionExt<E: EntityTrait>: Sized {
    fn apply_field_mask(self, fields: &FieldMap<E>, mask: &[String]) -> Self;
}

impl<E> SelectProjectionExt<E> for Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_field_mask(self, fields: &FieldMap<E>, mask: &[String]) -> Self {
        let mut cols = Vec::new();
        for path in mask {
            match fields.get(path) {
                Some(field) => cols.push(field.col),
                None => tracing::debug!(field = %path, "mask field not in whitelist, dropping"),
            }
        }
        if cols.is_empty() {
            return self;
        }
        let mut select = self.select_only();
        for col in cols {
            select = select.column(col);
        }
        select
    }
}

/// Applies a resolved page plan as OFFSET/LIMIT clauses.
pub trait SelectPagingExt: Sized {
    fn apply_page_plan(self, plan: PagePlan) -> Self;
}

impl<E: EntityTrait> SelectPagingExt for Select<E> {
    fn apply_page_plan(self, plan: PagePlan) -> Self {
        let mut select = self;
        if let Some(offset) = plan.offset {
            select = select.offset(offset);
        }
        if let Some(limit) = plan.limit {
            select = select.limit(limit);
        }
        select
    }
}

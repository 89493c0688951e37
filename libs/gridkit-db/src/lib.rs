//! SeaORM bridge for gridkit list queries: per-entity column whitelists,
//! the SQL dialect strategy, the (field, operator, value) → predicate
//! compiler, and extension traits that apply whole list requests to a
//! `sea_orm::Select<E>`.

pub mod compile;
pub mod dialect;
pub mod registry;
pub mod select;

pub use compile::{build_condition, compile_entry, compile_group};
pub use dialect::SqlDialect;
pub use registry::{coerce_value, Field, FieldKind, FieldMap};
pub use select::{SelectFilterExt, SelectOrderExt, SelectPagingExt, SelectProjectionExt};

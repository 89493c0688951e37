//! Organizational directory module: departments, roles, and the
//! role↔department bindings, backed by the gridkit query toolkit.
//!
//! Layout follows the hexagonal split: `contract` holds the exposable
//! models and error taxonomy, `domain` the repository ports, `infra` the
//! SeaORM storage adapters.

pub mod contract;
pub mod domain;
pub mod infra;

pub use contract::error::DirectoryError;
pub use contract::model::{Department, Role};

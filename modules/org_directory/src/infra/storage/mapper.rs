use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::contract::model::{Department, Role};
use crate::infra::storage::entity::{department, role};

/// Convert a database entity to a contract model
pub fn department_to_contract(entity: department::Model) -> Department {
    Department {
        id: entity.id,
        parent_id: entity.parent_id,
        name: entity.name,
        status: entity.status,
        sort_order: entity.sort_order,
        remark: entity.remark,
        created_by: entity.created_by,
        updated_by: entity.updated_by,
        created_at: Some(entity.created_at),
        updated_at: Some(entity.updated_at),
        children: Vec::new(),
    }
}

/// Convert a database entity to a contract model
pub fn role_to_contract(entity: role::Model) -> Role {
    Role {
        id: entity.id,
        name: entity.name,
        code: entity.code,
        status: entity.status,
        sort_order: entity.sort_order,
        remark: entity.remark,
        created_by: entity.created_by,
        updated_by: entity.updated_by,
        created_at: Some(entity.created_at),
        updated_at: Some(entity.updated_at),
    }
}

/// Row shape for masked (projected) department reads. Columns dropped by
/// the mask are absent from the JSON row, so every field defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SparseDepartmentRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub status: i32,
    pub sort_order: i32,
    pub remark: String,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub(crate) fn sparse_department_to_contract(row: SparseDepartmentRow) -> Department {
    Department {
        id: row.id,
        parent_id: row.parent_id,
        name: row.name,
        status: row.status,
        sort_order: row.sort_order,
        remark: row.remark,
        created_by: row.created_by,
        updated_by: row.updated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
        children: Vec::new(),
    }
}

/// Row shape for masked (projected) role reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SparseRoleRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub status: i32,
    pub sort_order: i32,
    pub remark: String,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub(crate) fn sparse_role_to_contract(row: SparseRoleRow) -> Role {
    Role {
        id: row.id,
        name: row.name,
        code: row.code,
        status: row.status,
        sort_order: row.sort_order,
        remark: row.remark,
        created_by: row.created_by,
        updated_by: row.updated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn de_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Timestamps come back from JSON rows in whatever text shape the driver
/// stores; accept the common ones.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f %:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

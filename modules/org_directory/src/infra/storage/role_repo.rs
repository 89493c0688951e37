use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};

use gridkit_core::{ListPage, PagePlan, PageRequest, DEFAULT_SAFE_LIMIT};
use gridkit_db::{
    FieldKind, FieldMap, SelectFilterExt, SelectOrderExt, SelectPagingExt, SelectProjectionExt,
    SqlDialect,
};

use crate::contract::error::DirectoryError;
use crate::contract::model::Role;
use crate::domain::repo::RoleRepository;
use crate::infra::storage::entity::role::{ActiveModel, Column, Entity};
use crate::infra::storage::mapper::{self, SparseRoleRow};
use crate::infra::storage::storage_error;

/// Whitelist of externally addressable role columns.
static FIELDS: Lazy<FieldMap<Entity>> = Lazy::new(|| {
    FieldMap::<Entity>::new()
        .insert("id", Column::Id, FieldKind::I64)
        .insert("name", Column::Name, FieldKind::String)
        .insert("code", Column::Code, FieldKind::String)
        .insert("status", Column::Status, FieldKind::I64)
        .insert("sort_order", Column::SortOrder, FieldKind::I64)
        .insert("remark", Column::Remark, FieldKind::String)
        .insert("created_by", Column::CreatedBy, FieldKind::I64)
        .insert("updated_by", Column::UpdatedBy, FieldKind::I64)
        .insert("created_at", Column::CreatedAt, FieldKind::DateTimeUtc)
        .insert("updated_at", Column::UpdatedAt, FieldKind::DateTimeUtc)
});

/// SeaORM-backed role repository.
pub struct SqlRoleRepository {
    db: DatabaseConnection,
    dialect: SqlDialect,
}

impl SqlRoleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        let dialect = SqlDialect::from(db.get_database_backend());
        Self { db, dialect }
    }
}

#[async_trait]
impl RoleRepository for SqlRoleRepository {
    async fn count(
        &self,
        query: Option<&str>,
        or_query: Option<&str>,
    ) -> Result<u64, DirectoryError> {
        Entity::find()
            .apply_filter_query(self.dialect, &FIELDS, query, or_query)
            .count(&self.db)
            .await
            .map_err(|err| storage_error("count roles", err))
    }

    async fn list(&self, req: &PageRequest) -> Result<ListPage<Role>, DirectoryError> {
        let total = self
            .count(req.query.as_deref(), req.or_query.as_deref())
            .await?;

        let plan = PagePlan::from_request(req.no_paging, req.page, req.page_size)
            .with_safe_limit(DEFAULT_SAFE_LIMIT);
        let select = Entity::find()
            .apply_page_plan(plan)
            .apply_order_by(&FIELDS, &req.order_by)
            .apply_field_mask(&FIELDS, &req.field_mask)
            .apply_filter_query(
                self.dialect,
                &FIELDS,
                req.query.as_deref(),
                req.or_query.as_deref(),
            );

        let masked = req.field_mask.iter().any(|path| FIELDS.get(path).is_some());
        let items = if masked {
            let rows = select
                .into_json()
                .all(&self.db)
                .await
                .map_err(|err| storage_error("list roles", err))?;
            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                let sparse: SparseRoleRow = serde_json::from_value(row).map_err(|err| {
                    tracing::error!("decode masked role row failed: {err}");
                    DirectoryError::internal()
                })?;
                items.push(mapper::sparse_role_to_contract(sparse));
            }
            items
        } else {
            select
                .all(&self.db)
                .await
                .map_err(|err| storage_error("list roles", err))?
                .into_iter()
                .map(mapper::role_to_contract)
                .collect()
        };

        Ok(ListPage::new(items, total))
    }

    async fn get(&self, id: i64) -> Result<Role, DirectoryError> {
        let model = Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|err| storage_error("get role", err))?;
        model
            .map(mapper::role_to_contract)
            .ok_or_else(|| DirectoryError::not_found("role", id))
    }

    async fn get_by_code(&self, code: &str) -> Result<Role, DirectoryError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(DirectoryError::bad_request("role code is required"));
        }
        let model = Entity::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|err| storage_error("get role by code", err))?;
        model
            .map(mapper::role_to_contract)
            .ok_or_else(|| DirectoryError::not_found("role", code))
    }

    async fn create(&self, role: Role) -> Result<Role, DirectoryError> {
        let now = Utc::now();
        let code = role.code.clone();
        let mut model = ActiveModel {
            name: Set(role.name),
            code: Set(role.code),
            status: Set(role.status),
            sort_order: Set(role.sort_order),
            remark: Set(role.remark),
            created_by: Set(role.created_by),
            updated_by: Set(role.updated_by),
            created_at: Set(role.created_at.unwrap_or(now)),
            updated_at: Set(role.updated_at.unwrap_or(now)),
            ..Default::default()
        };
        if role.id > 0 {
            model.id = Set(role.id);
        }
        let created = model
            .insert(&self.db)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    DirectoryError::conflict(format!("role code '{code}' already exists"))
                }
                _ => storage_error("create role", err),
            })?;
        Ok(mapper::role_to_contract(created))
    }

    async fn update(
        &self,
        mut role: Role,
        update_mask: &[String],
        allow_missing: bool,
    ) -> Result<(), DirectoryError> {
        if role.id <= 0 {
            return Err(DirectoryError::bad_request("role id is required"));
        }
        if allow_missing {
            let exists = Entity::find_by_id(role.id)
                .count(&self.db)
                .await
                .map_err(|err| storage_error("probe role", err))?
                > 0;
            if !exists {
                // the attempted update's author becomes the creator
                role.created_by = role.updated_by.take();
                self.create(role).await?;
                return Ok(());
            }
        }

        let code = role.code.clone();
        let updates = mask_updates(&role, update_mask);
        if updates.is_empty() {
            return Ok(());
        }

        let mut stamped = false;
        let mut query = Entity::update_many().filter(Column::Id.eq(role.id));
        for (col, value) in updates {
            if col.as_str() == Column::UpdatedAt.as_str() {
                stamped = true;
            }
            query = query.col_expr(col, Expr::value(value));
        }
        if !stamped {
            query = query.col_expr(Column::UpdatedAt, Expr::value(Utc::now()));
        }
        query
            .exec(&self.db)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    DirectoryError::conflict(format!("role code '{code}' already exists"))
                }
                _ => storage_error("update role", err),
            })?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DirectoryError> {
        Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|err| storage_error("delete role", err))?;
        Ok(())
    }
}

/// Resolves an update mask into column/value assignments. Unrecognized
/// entries are dropped; repeated entries keep their first value.
fn mask_updates(role: &Role, mask: &[String]) -> Vec<(Column, sea_orm::Value)> {
    let mut updates: Vec<(Column, sea_orm::Value)> = Vec::new();
    for path in mask {
        let entry: Option<(Column, sea_orm::Value)> = match path.trim().to_lowercase().as_str() {
            "name" => Some((Column::Name, role.name.clone().into())),
            "code" => Some((Column::Code, role.code.clone().into())),
            "status" => Some((Column::Status, role.status.into())),
            "sort_order" => Some((Column::SortOrder, role.sort_order.into())),
            "remark" => Some((Column::Remark, role.remark.clone().into())),
            "created_by" => Some((Column::CreatedBy, role.created_by.into())),
            "updated_by" => Some((Column::UpdatedBy, role.updated_by.into())),
            "created_at" => Some((
                Column::CreatedAt,
                role.created_at.unwrap_or_else(Utc::now).into(),
            )),
            "updated_at" => Some((
                Column::UpdatedAt,
                role.updated_at.unwrap_or_else(Utc::now).into(),
            )),
            other => {
                tracing::debug!(field = %other, "update mask field not recognized, dropping");
                None
            }
        };
        if let Some((col, value)) = entry {
            if updates.iter().any(|(seen, _)| seen.as_str() == col.as_str()) {
                continue;
            }
            updates.push((col, value));
        }
    }
    updates
}

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, IdenStatic, PaginatorTrait, QueryFilter, Set, SqlErr, Statement,
    TransactionTrait,
};

use gridkit_core::{assemble_forest, ListPage, PagePlan, PageRequest, DEFAULT_SAFE_LIMIT};
use gridkit_db::{
    FieldKind, FieldMap, SelectFilterExt, SelectOrderExt, SelectPagingExt, SelectProjectionExt,
    SqlDialect,
};

use crate::contract::error::DirectoryError;
use crate::contract::model::Department;
use crate::domain::repo::DepartmentRepository;
use crate::infra::storage::entity::department::{ActiveModel, Column, Entity};
use crate::infra::storage::mapper::{self, SparseDepartmentRow};
use crate::infra::storage::{storage_error, tx_error};

/// Whitelist of externally addressable department columns.
static FIELDS: Lazy<FieldMap<Entity>> = Lazy::new(|| {
    FieldMap::<Entity>::new()
        .insert("id", Column::Id, FieldKind::I64)
        .insert("parent_id", Column::ParentId, FieldKind::I64)
        .insert("name", Column::Name, FieldKind::String)
        .insert("status", Column::Status, FieldKind::I64)
        .insert("sort_order", Column::SortOrder, FieldKind::I64)
        .insert("remark", Column::Remark, FieldKind::String)
        .insert("created_by", Column::CreatedBy, FieldKind::I64)
        .insert("updated_by", Column::UpdatedBy, FieldKind::I64)
        .insert("created_at", Column::CreatedAt, FieldKind::DateTimeUtc)
        .insert("updated_at", Column::UpdatedAt, FieldKind::DateTimeUtc)
});

/// SeaORM-backed department repository.
pub struct SqlDepartmentRepository {
    db: DatabaseConnection,
    dialect: SqlDialect,
}

impl SqlDepartmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        let dialect = SqlDialect::from(db.get_database_backend());
        Self { db, dialect }
    }
}

#[async_trait]
impl DepartmentRepository for SqlDepartmentRepository {
    async fn count(
        &self,
        query: Option<&str>,
        or_query: Option<&str>,
    ) -> Result<u64, DirectoryError> {
        Entity::find()
            .apply_filter_query(self.dialect, &FIELDS, query, or_query)
            .count(&self.db)
            .await
            .map_err(|err| storage_error("count departments", err))
    }

    async fn list(&self, req: &PageRequest) -> Result<ListPage<Department>, DirectoryError> {
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

        // a mask that resolved to at least one column switched the select
        // to a projection, so typed Model decode no longer applies
        let masked = req.field_mask.iter().any(|path| FIELDS.get(path).is_some());
        let mut items = if masked {
            let rows = select
                .into_json()
                .all(&self.db)
                .await
                .map_err(|err| storage_error("list departments", err))?;
            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                let sparse: SparseDepartmentRow = serde_json::from_value(row).map_err(|err| {
                    tracing::error!("decode masked department row failed: {err}");
                    DirectoryError::internal()
                })?;
                items.push(mapper::sparse_department_to_contract(sparse));
            }
            items
        } else {
            select
                .all(&self.db)
                .await
                .map_err(|err| storage_error("list departments", err))?
                .into_iter()
                .map(mapper::department_to_contract)
                .collect()
        };

        items.sort_by_key(|dept| dept.sort_order);
        Ok(ListPage::new(assemble_forest(items), total))
    }

    async fn get(&self, id: i64) -> Result<Department, DirectoryError> {
        let model = Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|err| storage_error("get department", err))?;
        model
            .map(mapper::department_to_contract)
            .ok_or_else(|| DirectoryError::not_found("department", id))
    }

    async fn create(&self, dept: Department) -> Result<Department, DirectoryError> {
        let now = Utc::now();
        let mut model = ActiveModel {
            parent_id: Set(dept.parent_id),
            name: Set(dept.name),
            status: Set(dept.status),
            sort_order: Set(dept.sort_order),
            remark: Set(dept.remark),
            created_by: Set(dept.created_by),
            updated_by: Set(dept.updated_by),
            created_at: Set(dept.created_at.unwrap_or(now)),
            updated_at: Set(dept.updated_at.unwrap_or(now)),
            ..Default::default()
        };
        if dept.id > 0 {
            model.id = Set(dept.id);
        }
        let created = model
            .insert(&self.db)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    DirectoryError::conflict("department already exists")
                }
                _ => storage_error("create department", err),
            })?;
        Ok(mapper::department_to_contract(created))
    }

    async fn update(
        &self,
        mut dept: Department,
        update_mask: &[String],
        allow_missing: bool,
    ) -> Result<(), DirectoryError> {
        if dept.id <= 0 {
            return Err(DirectoryError::bad_request("department id is required"));
        }
        if allow_missing {
            let exists = Entity::find_by_id(dept.id)
                .count(&self.db)
                .await
                .map_err(|err| storage_error("probe department", err))?
                > 0;
            if !exists {
                // the attempted update's author becomes the creator
                dept.created_by = dept.updated_by.take();
                self.create(dept).await?;
                return Ok(());
            }
        }

        let updates = mask_updates(&dept, update_mask);
        if updates.is_empty() {
            return Ok(());
        }

        let mut stamped = false;
        let mut query = Entity::update_many().filter(Column::Id.eq(dept.id));
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
            .map_err(|err| storage_error("update department", err))?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DirectoryError> {
        let backend = self.db.get_database_backend();
        self.db
            .transaction::<_, (), DbErr>(move |tx| {
                Box::pin(async move {
                    let placeholder = match backend {
                        DbBackend::Postgres => "$1",
                        _ => "?",
                    };
                    let sql = format!(
                        "WITH RECURSIVE subtree AS ( \
                         SELECT id FROM departments WHERE id = {placeholder} \
                         UNION ALL \
                         SELECT d.id FROM departments d \
                         INNER JOIN subtree s ON d.parent_id = s.id \
                         ) SELECT id FROM subtree"
                    );
                    let rows = tx
                        .query_all(Statement::from_sql_and_values(backend, sql, [id.into()]))
                        .await?;
                    let mut ids = Vec::with_capacity(rows.len());
                    for row in rows {
                        ids.push(row.try_get::<i64>("", "id")?);
                    }
                    if ids.is_empty() {
                        return Ok(());
                    }
                    Entity::delete_many()
                        .filter(Column::Id.is_in(ids))
                        .exec(tx)
                        .await?;
                    Ok(())
                })
            })
            .await
            .map_err(|err| tx_error("delete department subtree", err))
    }
}

/// Resolves an update mask into column/value assignments. Unrecognized
/// entries are dropped; repeated entries keep their first value.
fn mask_updates(dept: &Department, mask: &[String]) -> Vec<(Column, sea_orm::Value)> {
    let mut updates: Vec<(Column, sea_orm::Value)> = Vec::new();
    for path in mask {
        let entry: Option<(Column, sea_orm::Value)> = match path.trim().to_lowercase().as_str() {
            "parent_id" => Some((Column::ParentId, dept.parent_id.into())),
            "name" => Some((Column::Name, dept.name.clone().into())),
            "status" => Some((Column::Status, dept.status.into())),
            "sort_order" => Some((Column::SortOrder, dept.sort_order.into())),
            "remark" => Some((Column::Remark, dept.remark.clone().into())),
            "created_by" => Some((Column::CreatedBy, dept.created_by.into())),
            "updated_by" => Some((Column::UpdatedBy, dept.updated_by.into())),
            "created_at" => Some((
                Column::CreatedAt,
                dept.created_at.unwrap_or_else(Utc::now).into(),
            )),
            "updated_at" => Some((
                Column::UpdatedAt,
                dept.updated_at.unwrap_or_else(Utc::now).into(),
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

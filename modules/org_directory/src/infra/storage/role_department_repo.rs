use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};

use crate::contract::error::DirectoryError;
use crate::domain::repo::RoleDepartmentRepository;
use crate::infra::storage::entity::role_department::{ActiveModel, Column, Entity};
use crate::infra::storage::{storage_error, tx_error, INSERT_CHUNK_SIZE};

/// SeaORM-backed role↔department binding repository.
pub struct SqlRoleDepartmentRepository {
    db: DatabaseConnection,
}

impl SqlRoleDepartmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleDepartmentRepository for SqlRoleDepartmentRepository {
    async fn assign_departments(
        &self,
        role_id: i64,
        department_ids: &[i64],
        operator_id: Option<i64>,
    ) -> Result<(), DirectoryError> {
        let now = Utc::now();
        let rows: Vec<ActiveModel> = department_ids
            .iter()
            .map(|&department_id| ActiveModel {
                role_id: Set(role_id),
                department_id: Set(department_id),
                created_by: Set(operator_id),
                updated_by: Set(operator_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .collect();

        self.db
            .transaction::<_, (), DbErr>(move |tx| {
                Box::pin(async move {
                    Entity::delete_many()
                        .filter(Column::RoleId.eq(role_id))
                        .exec(tx)
                        .await?;
                    for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
                        Entity::insert_many(chunk.to_vec()).exec(tx).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|err| tx_error("assign role departments", err))
    }

    async fn department_ids(&self, role_id: i64) -> Result<Vec<i64>, DirectoryError> {
        Entity::find()
            .select_only()
            .column(Column::DepartmentId)
            .filter(Column::RoleId.eq(role_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|err| storage_error("list role departments", err))
    }

    async fn remove_departments(
        &self,
        role_id: i64,
        department_ids: &[i64],
    ) -> Result<(), DirectoryError> {
        if department_ids.is_empty() {
            return Ok(());
        }
        Entity::delete_many()
            .filter(Column::RoleId.eq(role_id))
            .filter(Column::DepartmentId.is_in(department_ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|err| storage_error("remove role departments", err))?;
        Ok(())
    }
}

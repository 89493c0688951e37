use anyhow::Result;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, Schema,
};

use gridkit_core::PageRequest;
use org_directory::contract::model::Role;
use org_directory::domain::repo::{RoleDepartmentRepository, RoleRepository};
use org_directory::infra::storage::entity::{role as role_entity, role_department};
use org_directory::infra::storage::role_department_repo::SqlRoleDepartmentRepository;
use org_directory::infra::storage::role_repo::SqlRoleRepository;
use org_directory::DirectoryError;

/// Create a fresh test database for each test
async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    let schema = Schema::new(DbBackend::Sqlite);
    for stmt in [
        schema.create_table_from_entity(role_entity::Entity),
        schema.create_table_from_entity(role_department::Entity),
    ] {
        db.execute(db.get_database_backend().build(&stmt))
            .await
            .expect("Failed to create schema");
    }

    db
}

fn role(name: &str, code: &str) -> Role {
    Role {
        name: name.to_string(),
        code: code.to_string(),
        status: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_and_get_by_code() -> Result<()> {
    let repo = SqlRoleRepository::new(create_test_db().await);

    let created = repo.create(role("Admin", "admin")).await?;
    assert!(created.id > 0);

    let by_code = repo.get_by_code("admin").await?;
    assert_eq!(by_code.id, created.id);
    assert_eq!(by_code.name, "Admin");

    let missing = repo.get_by_code("nope").await;
    assert!(matches!(missing, Err(DirectoryError::NotFound { .. })));

    let empty = repo.get_by_code("   ").await;
    assert!(matches!(empty, Err(DirectoryError::BadRequest { .. })));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_code_conflicts() -> Result<()> {
    let repo = SqlRoleRepository::new(create_test_db().await);

    repo.create(role("Admin", "admin")).await?;
    let result = repo.create(role("Admin Again", "admin")).await;
    assert!(matches!(result, Err(DirectoryError::Conflict { .. })));

    Ok(())
}

#[tokio::test]
async fn test_update_allow_missing_upserts() -> Result<()> {
    let repo = SqlRoleRepository::new(create_test_db().await);

    let mut ghost = role("Ghost", "ghost");
    ghost.id = 900;
    ghost.updated_by = Some(4);
    repo.update(ghost, &["name".to_string()], true).await?;

    let fetched = repo.get(900).await?;
    assert_eq!(fetched.name, "Ghost");
    assert_eq!(fetched.created_by, Some(4)); // re-keyed from updated_by
    assert_eq!(fetched.updated_by, None);

    // the loser of an upsert race surfaces the store's uniqueness error
    let mut loser = role("Ghost Copy", "ghost");
    loser.id = 901;
    let result = repo.update(loser, &["name".to_string()], true).await;
    assert!(matches!(result, Err(DirectoryError::Conflict { .. })));

    Ok(())
}

#[tokio::test]
async fn test_list_pagination_and_safe_limit() -> Result<()> {
    let repo = SqlRoleRepository::new(create_test_db().await);

    for i in 1..=120 {
        repo.create(role(&format!("Role {i}"), &format!("role_{i}")))
            .await?;
    }

    let req = PageRequest {
        page: 2,
        page_size: 50,
        ..Default::default()
    };
    let page = repo.list(&req).await?;
    assert_eq!(page.total, 120);
    assert_eq!(page.items.len(), 50);

    // no_paging is still capped by the safe limit
    let unpaged = PageRequest {
        no_paging: true,
        ..Default::default()
    };
    let page = repo.list(&unpaged).await?;
    assert_eq!(page.total, 120);
    assert_eq!(page.items.len(), 100);

    // page/page_size of zero fall back to 1/10
    let page = repo.list(&PageRequest::default()).await?;
    assert_eq!(page.items.len(), 10);

    Ok(())
}

#[tokio::test]
async fn test_list_filters_and_orders() -> Result<()> {
    let repo = SqlRoleRepository::new(create_test_db().await);

    repo.create(role("Viewer", "viewer")).await?;
    repo.create(role("Editor", "editor")).await?;
    repo.create(role("Owner", "owner")).await?;

    let req = PageRequest {
        no_paging: true,
        order_by: vec!["-code".to_string()],
        query: Some(r#"{"code__not":"owner"}"#.to_string()),
        ..Default::default()
    };
    let page = repo.list(&req).await?;

    assert_eq!(page.total, 2);
    // flat lists keep the requested descending order
    assert_eq!(page.items[0].code, "viewer");
    assert_eq!(page.items[1].code, "editor");

    Ok(())
}

#[tokio::test]
async fn test_assign_and_replace_bindings() -> Result<()> {
    let db = create_test_db().await;
    let repo = SqlRoleDepartmentRepository::new(db.clone());

    repo.assign_departments(1, &[10, 20, 30], Some(7)).await?;
    let mut ids = repo.department_ids(1).await?;
    ids.sort();
    assert_eq!(ids, vec![10, 20, 30]);

    // every binding row carries the operator in both audit columns
    let rows = role_department::Entity::find()
        .filter(role_department::Column::RoleId.eq(1))
        .all(&db)
        .await?;
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.created_by, Some(7));
        assert_eq!(row.updated_by, Some(7));
        assert_eq!(row.created_at, row.updated_at);
    }

    // assignment replaces the whole set
    repo.assign_departments(1, &[20, 40], Some(7)).await?;
    let mut ids = repo.department_ids(1).await?;
    ids.sort();
    assert_eq!(ids, vec![20, 40]);

    // an empty set clears the role's bindings, other roles untouched
    repo.assign_departments(2, &[10], None).await?;
    repo.assign_departments(1, &[], Some(7)).await?;
    assert!(repo.department_ids(1).await?.is_empty());
    assert_eq!(repo.department_ids(2).await?, vec![10]);

    Ok(())
}

#[tokio::test]
async fn test_remove_departments() -> Result<()> {
    let repo = SqlRoleDepartmentRepository::new(create_test_db().await);

    repo.assign_departments(1, &[10, 20, 30], None).await?;
    repo.remove_departments(1, &[20]).await?;

    let mut ids = repo.department_ids(1).await?;
    ids.sort();
    assert_eq!(ids, vec![10, 30]);

    // removing nothing is a no-op
    repo.remove_departments(1, &[]).await?;
    let mut ids = repo.department_ids(1).await?;
    ids.sort();
    assert_eq!(ids, vec![10, 30]);

    Ok(())
}

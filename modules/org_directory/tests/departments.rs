use anyhow::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

use gridkit_core::PageRequest;
use org_directory::contract::model::Department;
use org_directory::domain::repo::DepartmentRepository;
use org_directory::infra::storage::department_repo::SqlDepartmentRepository;
use org_directory::infra::storage::entity::department;
use org_directory::DirectoryError;

/// Create a fresh test database for each test
async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    let schema = Schema::new(DbBackend::Sqlite);
    let stmt = schema.create_table_from_entity(department::Entity);
    db.execute(db.get_database_backend().build(&stmt))
        .await
        .expect("Failed to create schema");

    db
}

fn dept(name: &str, parent_id: Option<i64>, sort_order: i32) -> Department {
    Department {
        name: name.to_string(),
        parent_id,
        sort_order,
        status: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_and_get() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    let created = repo.create(dept("Engineering", None, 1)).await?;
    assert!(created.id > 0);
    assert_eq!(created.name, "Engineering");
    assert!(created.created_at.is_some());

    let fetched = repo.get(created.id).await?;
    assert_eq!(fetched.name, "Engineering");
    assert_eq!(fetched.status, 1);

    let missing = repo.get(9999).await;
    assert!(matches!(missing, Err(DirectoryError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_list_assembles_tree() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    let platform = repo.create(dept("Platform", None, 2)).await?;
    let support = repo.create(dept("Support", None, 1)).await?;
    let backend = repo.create(dept("Backend", Some(platform.id), 1)).await?;
    let frontend = repo.create(dept("Frontend", Some(platform.id), 2)).await?;

    let req = PageRequest {
        no_paging: true,
        ..Default::default()
    };
    let page = repo.list(&req).await?;

    // total counts flat rows; items are the assembled roots
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 2);

    // roots ordered by sort_order
    assert_eq!(page.items[0].id, support.id);
    assert_eq!(page.items[1].id, platform.id);

    let children = &page.items[1].children;
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].id, backend.id);
    assert_eq!(children[1].id, frontend.id);

    Ok(())
}

#[tokio::test]
async fn test_count_and_filters() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    repo.create(dept("Engineering", None, 1)).await?;
    repo.create(dept("Finance", None, 2)).await?;
    let mut legacy = dept("Legacy", None, 3);
    legacy.status = 0;
    repo.create(legacy).await?;

    assert_eq!(repo.count(Some(r#"{"status":"1"}"#), None).await?, 2);

    let req = PageRequest {
        no_paging: true,
        query: Some(r#"{"name__contains":"ineer"}"#.to_string()),
        ..Default::default()
    };
    let page = repo.list(&req).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Engineering");

    // (status = 0) OR (name = Finance)
    let total = repo
        .count(Some(r#"{"status":"0"}"#), Some(r#"{"name":"Finance"}"#))
        .await?;
    assert_eq!(total, 2);

    // unparsable filter degrades to no filter
    assert_eq!(repo.count(Some("not json"), None).await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_list_orders_and_pages() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    for i in 1..=5 {
        repo.create(dept(&format!("d{i}"), None, i)).await?;
    }

    let req = PageRequest {
        page: 1,
        page_size: 2,
        order_by: vec!["-sort_order".to_string()],
        ..Default::default()
    };
    let page = repo.list(&req).await?;

    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    // the page is cut in descending order, then re-sorted ascending
    assert_eq!(page.items[0].sort_order, 4);
    assert_eq!(page.items[1].sort_order, 5);

    Ok(())
}

#[tokio::test]
async fn test_list_field_mask_projects() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    repo.create(dept("Engineering", None, 1)).await?;

    let req = PageRequest {
        no_paging: true,
        field_mask: vec!["id".to_string(), "name".to_string(), "bogus".to_string()],
        ..Default::default()
    };
    let page = repo.list(&req).await?;

    assert_eq!(page.items.len(), 1);
    let item = &page.items[0];
    assert!(item.id > 0);
    assert_eq!(item.name, "Engineering");
    // columns outside the mask come back as defaults
    assert_eq!(item.status, 0);
    assert!(item.created_at.is_none());

    Ok(())
}

#[tokio::test]
async fn test_update_masks_columns() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    let created = repo.create(dept("Engineering", None, 1)).await?;

    let mut patch = created.clone();
    patch.name = "Platform".to_string();
    patch.remark = "changed".to_string();
    repo.update(patch, &["name".to_string(), "bogus".to_string()], false)
        .await?;

    let fetched = repo.get(created.id).await?;
    assert_eq!(fetched.name, "Platform");
    assert_eq!(fetched.remark, ""); // not in the mask
    assert!(fetched.updated_at >= created.updated_at);

    // a mask with zero recognized columns is a no-op success
    let mut noop = fetched.clone();
    noop.name = "Ignored".to_string();
    repo.update(noop, &["bogus".to_string()], false).await?;
    assert_eq!(repo.get(created.id).await?.name, "Platform");

    Ok(())
}

#[tokio::test]
async fn test_update_allow_missing_creates() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    let mut ghost = dept("Ghost", None, 1);
    ghost.id = 777;
    ghost.updated_by = Some(9);
    repo.update(ghost, &["name".to_string()], true).await?;

    let fetched = repo.get(777).await?;
    assert_eq!(fetched.name, "Ghost");
    assert_eq!(fetched.created_by, Some(9)); // re-keyed from updated_by
    assert_eq!(fetched.updated_by, None);

    Ok(())
}

#[tokio::test]
async fn test_plain_update_of_missing_id_is_noop() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    let mut ghost = dept("Ghost", None, 1);
    ghost.id = 555;
    repo.update(ghost, &["name".to_string()], false).await?;

    let missing = repo.get(555).await;
    assert!(matches!(missing, Err(DirectoryError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_subtree() -> Result<()> {
    let repo = SqlDepartmentRepository::new(create_test_db().await);

    let root = repo.create(dept("Root", None, 1)).await?;
    let child = repo.create(dept("Child", Some(root.id), 1)).await?;
    let grand = repo.create(dept("Grand", Some(child.id), 1)).await?;
    repo.create(dept("Great", Some(grand.id), 1)).await?;
    let other = repo.create(dept("Other", None, 2)).await?;

    repo.delete(root.id).await?;

    assert_eq!(repo.count(None, None).await?, 1);
    assert!(repo.get(other.id).await.is_ok());
    assert!(matches!(
        repo.get(child.id).await,
        Err(DirectoryError::NotFound { .. })
    ));

    // deleting a missing id is a no-op
    repo.delete(12345).await?;

    Ok(())
}

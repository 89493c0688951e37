use async_trait::async_trait;

use gridkit_core::{ListPage, PageRequest};

use crate::contract::error::DirectoryError;
use crate::contract::model::{Department, Role};

/// Storage port for the department hierarchy.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Count departments matching the request's filter strings
    async fn count(
        &self,
        query: Option<&str>,
        or_query: Option<&str>,
    ) -> Result<u64, DirectoryError>;

    /// List departments as a forest assembled from the filtered flat rows
    async fn list(&self, req: &PageRequest) -> Result<ListPage<Department>, DirectoryError>;

    /// Get a department by ID
    async fn get(&self, id: i64) -> Result<Department, DirectoryError>;

    /// Create a new department
    async fn create(&self, dept: Department) -> Result<Department, DirectoryError>;

    /// Update the columns named in `update_mask`; with `allow_missing`, a
    /// nonexistent target becomes a create with re-keyed audit fields
    async fn update(
        &self,
        dept: Department,
        update_mask: &[String],
        allow_missing: bool,
    ) -> Result<(), DirectoryError>;

    /// Delete a department and its whole descendant subtree
    async fn delete(&self, id: i64) -> Result<(), DirectoryError>;
}

/// Storage port for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Count roles matching the request's filter strings
    async fn count(
        &self,
        query: Option<&str>,
        or_query: Option<&str>,
    ) -> Result<u64, DirectoryError>;

    /// List roles as a flat page
    async fn list(&self, req: &PageRequest) -> Result<ListPage<Role>, DirectoryError>;

    /// Get a role by ID
    async fn get(&self, id: i64) -> Result<Role, DirectoryError>;

    /// Get a role by its unique code
    async fn get_by_code(&self, code: &str) -> Result<Role, DirectoryError>;

    /// Create a new role
    async fn create(&self, role: Role) -> Result<Role, DirectoryError>;

    /// Update the columns named in `update_mask`; with `allow_missing`, a
    /// nonexistent target becomes a create with re-keyed audit fields
    async fn update(
        &self,
        role: Role,
        update_mask: &[String],
        allow_missing: bool,
    ) -> Result<(), DirectoryError>;

    /// Delete a role by ID
    async fn delete(&self, id: i64) -> Result<(), DirectoryError>;
}

/// Storage port for the role↔department binding table.
#[async_trait]
pub trait RoleDepartmentRepository: Send + Sync {
    /// Replace all department bindings of a role with the given set; an
    /// empty set clears the role's bindings
    async fn assign_departments(
        &self,
        role_id: i64,
        department_ids: &[i64],
        operator_id: Option<i64>,
    ) -> Result<(), DirectoryError>;

    /// Department IDs currently bound to a role
    async fn department_ids(&self, role_id: i64) -> Result<Vec<i64>, DirectoryError>;

    /// Remove specific department bindings from a role
    async fn remove_departments(
        &self,
        role_id: i64,
        department_ids: &[i64],
    ) -> Result<(), DirectoryError>;
}

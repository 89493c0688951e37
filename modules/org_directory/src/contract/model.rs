use chrono::{DateTime, Utc};

use gridkit_core::TreeNode;

/// Pure department model for inter-module communication (no serde).
///
/// Timestamps are optional so masked (projected) reads can omit them;
/// `children` is only populated by list calls that assemble the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Department {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub status: i32,
    pub sort_order: i32,
    pub remark: String,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub children: Vec<Department>,
}

impl TreeNode for Department {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_node_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn add_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

/// Pure role model for inter-module communication (no serde).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub status: i32,
    pub sort_order: i32,
    pub remark: String,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

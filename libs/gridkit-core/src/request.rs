//! Caller-facing list-request parameters.

use serde::{Deserialize, Serialize};

use crate::filter::to_snake_case;

/// Paging, ordering, projection and filter parameters for one list call.
///
/// `query` combines with AND semantics, `or_query` with OR semantics; both
/// carry the filter-expression wire shape decoded by
/// [`crate::parse_filter_expression`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub page_size: i32,
    #[serde(default)]
    pub no_paging: bool,
    #[serde(default)]
    pub order_by: Vec<String>,
    #[serde(default)]
    pub field_mask: Vec<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub or_query: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// One parsed order-by token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

impl OrderKey {
    /// Parse one token; a single leading `-` sorts descending. The field
    /// name is normalized to snake_case. Empty tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (dir, name) = match token.strip_prefix('-') {
            Some(rest) => (SortDir::Desc, rest),
            None => (SortDir::Asc, token),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            field: to_snake_case(name),
            dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_by_default() {
        let key = OrderKey::parse("name").unwrap();
        assert_eq!(key.field, "name");
        assert_eq!(key.dir, SortDir::Asc);
    }

    #[test]
    fn leading_dash_sorts_descending() {
        let key = OrderKey::parse("-created_at").unwrap();
        assert_eq!(key.field, "created_at");
        assert_eq!(key.dir, SortDir::Desc);
    }

    #[test]
    fn camel_case_normalizes() {
        let key = OrderKey::parse("-createdAt").unwrap();
        assert_eq!(key.field, "created_at");
        assert_eq!(key.dir, SortDir::Desc);
    }

    #[test]
    fn empty_tokens_yield_none() {
        assert_eq!(OrderKey::parse(""), None);
        assert_eq!(OrderKey::parse("-"), None);
        assert_eq!(OrderKey::parse("  "), None);
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.page, 0);
        assert_eq!(req.page_size, 0);
        assert!(!req.no_paging);
        assert!(req.order_by.is_empty());
        assert!(req.query.is_none());
    }
}

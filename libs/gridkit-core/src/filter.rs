//! Raw filter-expression decoding.
//!
//! The wire shape is either a single JSON object of string→string pairs or a
//! JSON array of such objects. Anything else — wrong value types included —
//! decodes to *no filter*, never an error (fail-open by contract).

use std::collections::BTreeMap;

use crate::ops::{DatePart, FilterOp};

/// Separates the field segment from the operator segment in a filter key.
pub const OPERATOR_DELIMITER: &str = "__";

/// One decoded field-map; keys are unique and iterate in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterGroup(pub BTreeMap<String, String>);

impl FilterGroup {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for FilterGroup {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Decode a raw filter string into zero or more ordered groups.
///
/// Groups from an array are processed in array order. A string that is
/// neither shape (or is empty/whitespace) yields an empty vec.
pub fn parse_filter_expression(raw: &str) -> Vec<FilterGroup> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    if let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(raw) {
        return vec![FilterGroup(map)];
    }
    if let Ok(maps) = serde_json::from_str::<Vec<BTreeMap<String, String>>>(raw) {
        return maps.into_iter().map(FilterGroup).collect();
    }
    Vec::new()
}

/// Operator suffix of a filter key: either a comparison or a date-part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpToken {
    Cmp(FilterOp),
    Part(DatePart),
}

/// A split filter key. `op == None` means plain equality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterKey {
    pub field: String,
    pub op: Option<OpToken>,
}

impl FilterKey {
    /// Split `field` / `field__operator` on [`OPERATOR_DELIMITER`].
    ///
    /// Returns `None` for keys that can never yield a predicate: an empty
    /// field segment, an unrecognized operator token, or three or more
    /// segments. The field segment is normalized to snake_case.
    pub fn parse(key: &str) -> Option<Self> {
        let segments: Vec<&str> = key.split(OPERATOR_DELIMITER).collect();
        match segments.as_slice() {
            [field] if !field.is_empty() => Some(Self {
                field: to_snake_case(field),
                op: None,
            }),
            [field, op] if !field.is_empty() => {
                let token = FilterOp::parse(op)
                    .map(OpToken::Cmp)
                    .or_else(|| DatePart::parse(op).map(OpToken::Part))?;
                Some(Self {
                    field: to_snake_case(field),
                    op: Some(token),
                })
            }
            _ => None,
        }
    }
}

/// Normalize a caller-facing field name (`createdAt`, `CreatedAt`) to the
/// snake_case form the whitelist tables are keyed by.
pub(crate) fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for ch in s.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_yields_one_group() {
        let groups = parse_filter_expression(r#"{"name":"ops","status__not":"OFF"}"#);
        assert_eq!(groups.len(), 1);
        let entries: Vec<_> = groups[0].entries().collect();
        assert_eq!(entries, vec![("name", "ops"), ("status__not", "OFF")]);
    }

    #[test]
    fn array_yields_groups_in_array_order() {
        let groups =
            parse_filter_expression(r#"[{"a":"1"},{"b":"2"},{"c":"3"}]"#);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].entries().next(), Some(("a", "1")));
        assert_eq!(groups[1].entries().next(), Some(("b", "2")));
        assert_eq!(groups[2].entries().next(), Some(("c", "3")));
    }

    #[test]
    fn blank_input_yields_no_groups() {
        assert!(parse_filter_expression("").is_empty());
        assert!(parse_filter_expression("   \t\n").is_empty());
    }

    #[test]
    fn malformed_json_degrades_to_no_filter() {
        assert!(parse_filter_expression("{not json").is_empty());
        assert!(parse_filter_expression(r#""just a string""#).is_empty());
        assert!(parse_filter_expression("42").is_empty());
        assert!(parse_filter_expression(r#"[1,2,3]"#).is_empty());
    }

    #[test]
    fn non_string_values_degrade_to_no_filter() {
        // The wire contract is string values only; a typed mismatch anywhere
        // drops the whole expression.
        assert!(parse_filter_expression(r#"{"age":30}"#).is_empty());
        assert!(parse_filter_expression(r#"[{"ok":"1"},{"bad":true}]"#).is_empty());
    }

    #[test]
    fn key_without_operator_is_equality() {
        let key = FilterKey::parse("name").unwrap();
        assert_eq!(key.field, "name");
        assert_eq!(key.op, None);
    }

    #[test]
    fn key_with_operator_splits() {
        let key = FilterKey::parse("created_at__gte").unwrap();
        assert_eq!(key.field, "created_at");
        assert_eq!(key.op, Some(OpToken::Cmp(FilterOp::Gte)));

        let key = FilterKey::parse("created_at__year").unwrap();
        assert_eq!(key.op, Some(OpToken::Part(DatePart::Year)));
    }

    #[test]
    fn camel_case_fields_normalize() {
        let key = FilterKey::parse("createdAt__lte").unwrap();
        assert_eq!(key.field, "created_at");
        let key = FilterKey::parse("SortOrder").unwrap();
        assert_eq!(key.field, "sort_order");
    }

    #[test]
    fn invalid_keys_are_rejected() {
        assert_eq!(FilterKey::parse(""), None);
        assert_eq!(FilterKey::parse("__gte"), None);
        assert_eq!(FilterKey::parse("name__"), None);
        assert_eq!(FilterKey::parse("name__unknown"), None);
        assert_eq!(FilterKey::parse("a__b__c"), None);
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("CreatedAt"), "created_at");
        assert_eq!(to_snake_case("created_at"), "created_at");
        assert_eq!(to_snake_case("userID"), "user_id");
        assert_eq!(to_snake_case("id"), "id");
    }
}

//! User filter predicates

use serde_json::Value;

use crate::intent::FilterOperator;
use super::literal::{like_pattern, scalar_literal, LikeShape};

/// Render one user filter over an already-validated, authorized column.
///
/// Returns `None` when the operator needs a value and none usable was given:
/// an absent value, or a value of a kind the operator cannot embed (objects,
/// nested arrays, a list where a scalar is expected). `in`/`not_in` accept a
/// scalar as a one-element list.
pub fn filter_predicate(field: &str, operator: FilterOperator, value: Option<&Value>) -> Option<String> {
    let sql = match operator {
        FilterOperator::IsNull => format!("{field} IS NULL"),
        FilterOperator::IsNotNull => format!("{field} IS NOT NULL"),
        FilterOperator::Eq => format!("{field} = {}", scalar_literal(value?)?),
        FilterOperator::Neq => format!("{field} <> {}", scalar_literal(value?)?),
        FilterOperator::Gt => format!("{field} > {}", scalar_literal(value?)?),
        FilterOperator::Gte => format!("{field} >= {}", scalar_literal(value?)?),
        FilterOperator::Lt => format!("{field} < {}", scalar_literal(value?)?),
        FilterOperator::Lte => format!("{field} <= {}", scalar_literal(value?)?),
        FilterOperator::Like => format!("{field} ILIKE {}", like_pattern(value?, LikeShape::Contains)?),
        FilterOperator::StartsWith => format!("{field} ILIKE {}", like_pattern(value?, LikeShape::StartsWith)?),
        FilterOperator::EndsWith => format!("{field} ILIKE {}", like_pattern(value?, LikeShape::EndsWith)?),
        FilterOperator::In => match list_literals(value?)? {
            items if items.is_empty() => "FALSE".to_string(),
            items => format!("{field} = ANY(ARRAY[{}])", items.join(", ")),
        },
        FilterOperator::NotIn => match list_literals(value?)? {
            items if items.is_empty() => "TRUE".to_string(),
            items => format!("{field} <> ALL(ARRAY[{}])", items.join(", ")),
        },
    };
    Some(sql)
}

/// Every element escaped on its own; one unusable element rejects the list
fn list_literals(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(scalar_literal).collect(),
        scalar => scalar_literal(scalar).map(|lit| vec![lit]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(op: FilterOperator, value: Value) -> Option<String> {
        filter_predicate("status", op, Some(&value))
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(render(FilterOperator::Eq, json!("open")).unwrap(), "status = 'open'");
        assert_eq!(render(FilterOperator::Neq, json!("open")).unwrap(), "status <> 'open'");
        assert_eq!(render(FilterOperator::Gt, json!(10)).unwrap(), "status > 10");
        assert_eq!(render(FilterOperator::Gte, json!(10.5)).unwrap(), "status >= 10.5");
        assert_eq!(render(FilterOperator::Lt, json!(0)).unwrap(), "status < 0");
        assert_eq!(render(FilterOperator::Lte, json!(false)).unwrap(), "status <= FALSE");
    }

    #[test]
    fn test_like_family() {
        assert_eq!(render(FilterOperator::Like, json!("acme")).unwrap(), "status ILIKE '%acme%'");
        assert_eq!(render(FilterOperator::StartsWith, json!("acme")).unwrap(), "status ILIKE 'acme%'");
        assert_eq!(render(FilterOperator::EndsWith, json!("acme")).unwrap(), "status ILIKE '%acme'");
    }

    #[test]
    fn test_in_and_not_in() {
        assert_eq!(
            render(FilterOperator::In, json!(["a", "b'c", 3])).unwrap(),
            "status = ANY(ARRAY['a', 'b''c', 3])"
        );
        assert_eq!(
            render(FilterOperator::NotIn, json!(["a"])).unwrap(),
            "status <> ALL(ARRAY['a'])"
        );
        assert_eq!(render(FilterOperator::In, json!("a")).unwrap(), "status = ANY(ARRAY['a'])");
        assert_eq!(render(FilterOperator::In, json!([])).unwrap(), "FALSE");
        assert_eq!(render(FilterOperator::NotIn, json!([])).unwrap(), "TRUE");
    }

    #[test]
    fn test_null_checks_ignore_value() {
        assert_eq!(filter_predicate("status", FilterOperator::IsNull, None).unwrap(), "status IS NULL");
        assert_eq!(
            filter_predicate("status", FilterOperator::IsNotNull, Some(&json!("ignored"))).unwrap(),
            "status IS NOT NULL"
        );
    }

    #[test]
    fn test_missing_or_unusable_value() {
        assert_eq!(filter_predicate("status", FilterOperator::Eq, None), None);
        assert_eq!(render(FilterOperator::Eq, json!({"a": 1})), None);
        assert_eq!(render(FilterOperator::Eq, json!(["a"])), None);
        assert_eq!(render(FilterOperator::In, json!(["a", ["nested"]])), None);
        assert_eq!(render(FilterOperator::In, json!([null])), None);
        assert_eq!(render(FilterOperator::Like, json!(["a"])), None);
    }

    #[test]
    fn test_injection_value_stays_inside_literal() {
        let sql = render(FilterOperator::Eq, json!("x'); DROP TABLE orders;--")).unwrap();
        assert_eq!(sql, "status = 'x''); DROP TABLE orders;--'");
    }
}

//! Turn loosely-shaped JSON filters into typed `FilterExpr` trees.
//!
//! Accepted inputs, tried in order:
//!
//! 1. typed maps carrying a `"type"` key (`condition`, `and`, `or`, `not`)
//! 2. boolean shorthand: `{"and": [..]}`, `{"or": [..]}`, `{"not": {..}}`
//! 3. explicit conditions: `{"field": .., "operator" | "op": .., "value": ..}`
//! 4. legacy single-field maps: `{"status": "active"}`, `{"age": {"gt": 30}}`

use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::ast::values::kind_of;
use crate::ast::{Condition, FieldType, FilterExpr, Operator};
use crate::error::{UqlError, UqlResult};

/// A filter that may or may not be typed yet.
#[derive(Debug, Clone)]
pub enum FilterInput {
    Typed(FilterExpr),
    Raw(Value),
}

impl From<FilterExpr> for FilterInput {
    fn from(expr: FilterExpr) -> Self {
        FilterInput::Typed(expr)
    }
}

impl From<Value> for FilterInput {
    fn from(value: Value) -> Self {
        FilterInput::Raw(value)
    }
}

/// Typed input is returned unchanged; raw JSON goes through [`normalize`].
pub fn normalize_input(input: impl Into<FilterInput>) -> UqlResult<FilterExpr> {
    match input.into() {
        FilterInput::Typed(expr) => Ok(expr),
        FilterInput::Raw(value) => normalize(&value),
    }
}

/// Normalize a JSON filter into a typed expression tree.
pub fn normalize(value: &Value) -> UqlResult<FilterExpr> {
    let Value::Object(map) = value else {
        return Err(UqlError::Normalize(format!(
            "filter expression must be an object, got {}",
            kind_of(value)
        )));
    };

    if let Some(kind) = map.get("type") {
        return normalize_typed(kind, map);
    }

    for key in ["and", "or", "not"] {
        if let Some(inner) = map.get(key) {
            if map.len() != 1 {
                return Err(UqlError::Normalize(format!(
                    "'{key}' must be the only key of a boolean shorthand"
                )));
            }
            return normalize_boolean(key, inner);
        }
    }

    if map.contains_key("field") && (map.contains_key("operator") || map.contains_key("op")) {
        return explicit_condition(map);
    }

    trace!(keys = ?map.keys().collect::<Vec<_>>(), "legacy filter map");
    let (field, operator, value) = parse_legacy_condition(map)?;
    Ok(Condition::new(field, operator, value)?.into())
}

fn normalize_typed(kind: &Value, map: &Map<String, Value>) -> UqlResult<FilterExpr> {
    match kind.as_str() {
        Some("condition") => explicit_condition(map),
        Some(key @ ("and" | "or")) => {
            let children = map.get("expressions").ok_or_else(|| {
                UqlError::Normalize(format!("'{key}' node requires 'expressions'"))
            })?;
            normalize_boolean(key, children)
        }
        Some("not") => {
            let child = map
                .get("expression")
                .ok_or_else(|| UqlError::Normalize("'not' node requires 'expression'".into()))?;
            normalize_boolean("not", child)
        }
        _ => Err(UqlError::Normalize(format!("unknown node type {kind}"))),
    }
}

fn normalize_boolean(key: &str, inner: &Value) -> UqlResult<FilterExpr> {
    if key == "not" {
        return Ok(FilterExpr::negate(normalize(inner)?));
    }

    let Value::Array(items) = inner else {
        return Err(UqlError::Normalize(format!(
            "'{key}' requires a list, got {}",
            kind_of(inner)
        )));
    };
    let children = items.iter().map(normalize).collect::<UqlResult<Vec<_>>>()?;
    if key == "and" {
        FilterExpr::and(children)
    } else {
        FilterExpr::or(children)
    }
}

fn explicit_condition(map: &Map<String, Value>) -> UqlResult<FilterExpr> {
    let field = map
        .get("field")
        .and_then(Value::as_str)
        .ok_or_else(|| UqlError::Normalize("condition 'field' must be a string".into()))?;

    let op_value = match (map.get("operator"), map.get("op")) {
        (Some(op), Some(alias)) => {
            if op != alias {
                warn!(%field, "both 'operator' and 'op' given; using 'operator'");
            }
            op
        }
        (Some(op), None) | (None, Some(op)) => op,
        (None, None) => {
            return Err(UqlError::Normalize(format!(
                "condition on '{field}' has no operator"
            )));
        }
    };
    let operator: Operator = op_value
        .as_str()
        .ok_or_else(|| UqlError::Normalize("condition 'operator' must be a string".into()))?
        .parse()?;

    let value = map.get("value").cloned().unwrap_or(Value::Null);
    let mut condition = Condition::new(field, operator, value)?;

    match map.get("field_type") {
        None | Some(Value::Null) => {}
        Some(Value::String(ft)) => {
            condition = condition.with_field_type(ft.parse::<FieldType>()?);
        }
        Some(other) => {
            return Err(UqlError::Normalize(format!(
                "field_type must be a string, got {}",
                kind_of(other)
            )));
        }
    }

    Ok(condition.into())
}

/// Split a legacy `{field: value}` / `{field: {op: value}}` map.
pub fn parse_legacy_condition(map: &Map<String, Value>) -> UqlResult<(String, Operator, Value)> {
    let mut entries = map.iter();
    let (field, raw) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => return Err(UqlError::Normalize("empty filter map".into())),
        (Some(_), Some(_)) => {
            return Err(UqlError::Normalize(format!(
                "legacy condition must have exactly one field, got {} keys",
                map.len()
            )));
        }
    };

    let Value::Object(ops) = raw else {
        return Ok((field.clone(), Operator::Eq, raw.clone()));
    };

    let mut ops_iter = ops.iter();
    match (ops_iter.next(), ops_iter.next()) {
        (Some((op, value)), None) => Ok((field.clone(), op.parse()?, value.clone())),
        _ => Err(UqlError::Normalize(format!(
            "operator map for '{field}' must have exactly one key, got {}",
            ops.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(expr: &FilterExpr) -> &Condition {
        expr.as_condition().expect("expected a condition")
    }

    #[test]
    fn test_legacy_equality() {
        let expr = normalize(&json!({"status": "active"})).unwrap();
        let c = leaf(&expr);
        assert_eq!(c.field(), "status");
        assert_eq!(c.operator(), Operator::Eq);
        assert_eq!(c.value(), &json!("active"));
    }

    #[test]
    fn test_legacy_operator_map() {
        let expr = normalize(&json!({"age": {"gt": 30}})).unwrap();
        assert_eq!(leaf(&expr).operator(), Operator::Gt);
        assert_eq!(leaf(&expr).value(), &json!(30));
    }

    #[test]
    fn test_shorthand_nesting() {
        let expr = normalize(&json!({
            "or": [
                {"a": 1},
                {"not": {"b": {"in": [1, 2]}}},
                {"and": [{"c": {"exists": true}}]}
            ]
        }))
        .unwrap();

        let FilterExpr::Or(or) = expr else {
            panic!("expected OR");
        };
        assert_eq!(or.expressions().len(), 3);
        assert!(matches!(or.expressions()[1], FilterExpr::Not(_)));
        assert!(matches!(or.expressions()[2], FilterExpr::And(_)));
    }

    #[test]
    fn test_explicit_and_typed_forms() {
        let explicit = normalize(&json!({
            "field": "name", "op": "starts_with", "value": "Al", "field_type": "string"
        }))
        .unwrap();
        assert_eq!(leaf(&explicit).field_type(), Some(FieldType::String));

        let typed = normalize(&json!({
            "type": "and",
            "expressions": [{"type": "condition", "field": "x", "operator": "exists"}]
        }))
        .unwrap();
        assert!(matches!(typed, FilterExpr::And(_)));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(normalize(&json!([1, 2])), Err(UqlError::Normalize(_))));
        assert!(matches!(normalize(&json!({})), Err(UqlError::Normalize(_))));
        assert!(matches!(
            normalize(&json!({"a": 1, "b": 2})),
            Err(UqlError::Normalize(_))
        ));
        assert!(matches!(
            normalize(&json!({"a": {"gt": 1, "lt": 5}})),
            Err(UqlError::Normalize(_))
        ));
        assert!(matches!(
            normalize(&json!({"a": {"like": "x"}})),
            Err(UqlError::UnknownOperator(op)) if op == "like"
        ));
        assert!(matches!(
            normalize(&json!({"and": [{"a": 1}], "b": 2})),
            Err(UqlError::Normalize(_))
        ));
        assert!(matches!(
            normalize(&json!({"and": {"a": 1}})),
            Err(UqlError::Normalize(_))
        ));
        assert!(matches!(
            normalize(&json!({"or": []})),
            Err(UqlError::EmptyExpression("OR"))
        ));
    }

    #[test]
    fn test_typed_input_passes_through() {
        let expr: FilterExpr = Condition::new("a", Operator::Eq, 1).unwrap().into();
        assert_eq!(normalize_input(expr.clone()).unwrap(), expr);
        assert_eq!(normalize_input(json!({"a": 1})).unwrap(), expr);
    }

    #[test]
    fn test_parse_legacy_condition() {
        let map = json!({"tags": {"array_contains": "x"}});
        let (field, op, value) = parse_legacy_condition(map.as_object().unwrap()).unwrap();
        assert_eq!((field.as_str(), op, value), ("tags", Operator::ArrayContains, json!("x")));
    }
}

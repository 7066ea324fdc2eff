//! Filter expression tree.
//!
//! Nodes are built bottom-up through validating constructors and never
//! mutated afterwards. Fields are private so a `Condition` that exists is
//! always well-formed for its operator.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::ops::{BitAnd, BitOr, Not};

use super::operators::{FieldType, Operator, ValueShape};
use super::values::{FilterValue, kind_of};
use super::visitor::FilterVisitor;
use crate::error::{UqlError, UqlResult};
use crate::validator::{NameRules, validate_qualified_name};

/// A leaf comparison: `field <operator> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: String,
    operator: Operator,
    value: Value,
    field_type: Option<FieldType>,
}

impl Condition {
    /// Build a condition, checking the field grammar and the value shape.
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> UqlResult<Self> {
        let field = field.into();
        validate_qualified_name(&field, NameRules::STRICT)?;
        let value = check_shape(operator, value.into().into_inner())?;
        Ok(Self {
            field,
            operator,
            value,
            field_type: None,
        })
    }

    pub fn with_field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn field_type(&self) -> Option<FieldType> {
        self.field_type
    }

    /// The string operand of a text operator.
    pub fn text_value(&self) -> UqlResult<&str> {
        self.value
            .as_str()
            .ok_or_else(|| UqlError::invalid_value(self.operator, "expected a string"))
    }

    /// The list operand, rejecting empty lists.
    ///
    /// An empty membership list would render as a vacuous clause, so every
    /// target refuses it instead.
    pub fn non_empty_list(&self) -> UqlResult<&[Value]> {
        match &self.value {
            Value::Array(items) if !items.is_empty() => Ok(items),
            Value::Array(_) => Err(UqlError::EmptyList {
                operator: self.operator.to_string(),
                field: self.field.clone(),
            }),
            other => Err(UqlError::invalid_value(
                self.operator,
                format!("expected a list, got {}", kind_of(other)),
            )),
        }
    }

    /// The `[low, high]` operand of `between`.
    pub fn bounds(&self) -> UqlResult<(&Value, &Value)> {
        match self.value.as_array().map(Vec::as_slice) {
            Some([low, high]) => Ok((low, high)),
            _ => Err(UqlError::invalid_value(
                self.operator,
                "expected a 2-item list",
            )),
        }
    }

    /// The same condition with its operator replaced by the exact inverse,
    /// when one exists.
    pub fn inverted(&self) -> Option<Condition> {
        self.operator.inverse().map(|operator| Condition {
            field: self.field.clone(),
            operator,
            value: self.value.clone(),
            field_type: self.field_type,
        })
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("condition"));
        out.insert("field".into(), Value::from(self.field.clone()));
        out.insert("operator".into(), Value::from(self.operator.as_str()));
        out.insert("value".into(), self.value.clone());
        if let Some(ft) = self.field_type {
            out.insert("field_type".into(), json!(ft));
        }
        Value::Object(out)
    }
}

fn check_shape(operator: Operator, value: Value) -> UqlResult<Value> {
    match (operator.value_shape(), value) {
        (ValueShape::Nothing, _) => Ok(Value::Null),
        (ValueShape::Any, v) => Ok(v),
        (ValueShape::List, v @ Value::Array(_)) => Ok(v),
        (ValueShape::Pair, Value::Array(items)) if items.len() == 2 => Ok(Value::Array(items)),
        (ValueShape::Pair, v) => Err(UqlError::invalid_value(
            operator,
            format!("requires a 2-item list, got {}", describe(&v)),
        )),
        (ValueShape::Text, v @ Value::String(_)) => Ok(v),
        (ValueShape::Object, v @ Value::Object(_)) => Ok(v),
        (shape, v) => {
            let wanted = match shape {
                ValueShape::List => "a list",
                ValueShape::Text => "a string",
                _ => "an object",
            };
            Err(UqlError::invalid_value(
                operator,
                format!("requires {wanted}, got {}", kind_of(&v)),
            ))
        }
    }
}

fn describe(v: &Value) -> String {
    match v {
        Value::Array(items) => format!("a list of {}", items.len()),
        other => kind_of(other).to_string(),
    }
}

/// Conjunction of one or more expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct AndExpr {
    expressions: Vec<FilterExpr>,
}

impl AndExpr {
    pub fn new(expressions: Vec<FilterExpr>) -> UqlResult<Self> {
        if expressions.is_empty() {
            return Err(UqlError::EmptyExpression("AND"));
        }
        Ok(Self { expressions })
    }

    pub fn expressions(&self) -> &[FilterExpr] {
        &self.expressions
    }
}

/// Disjunction of one or more expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct OrExpr {
    expressions: Vec<FilterExpr>,
}

impl OrExpr {
    pub fn new(expressions: Vec<FilterExpr>) -> UqlResult<Self> {
        if expressions.is_empty() {
            return Err(UqlError::EmptyExpression("OR"));
        }
        Ok(Self { expressions })
    }

    pub fn expressions(&self) -> &[FilterExpr] {
        &self.expressions
    }
}

/// Negation of a single expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NotExpr {
    expression: Box<FilterExpr>,
}

impl NotExpr {
    pub fn new(expression: FilterExpr) -> Self {
        Self {
            expression: Box::new(expression),
        }
    }

    pub fn expression(&self) -> &FilterExpr {
        &self.expression
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Condition(Condition),
    And(AndExpr),
    Or(OrExpr),
    Not(NotExpr),
}

impl FilterExpr {
    /// Dispatch to the visitor method for this node's variant.
    pub fn accept<V: FilterVisitor + ?Sized>(&self, visitor: &mut V) -> UqlResult<V::Output> {
        match self {
            FilterExpr::Condition(c) => visitor.visit_condition(c),
            FilterExpr::And(e) => visitor.visit_and(e),
            FilterExpr::Or(e) => visitor.visit_or(e),
            FilterExpr::Not(e) => visitor.visit_not(e),
        }
    }

    pub fn and(expressions: impl IntoIterator<Item = FilterExpr>) -> UqlResult<Self> {
        AndExpr::new(expressions.into_iter().collect()).map(FilterExpr::And)
    }

    pub fn or(expressions: impl IntoIterator<Item = FilterExpr>) -> UqlResult<Self> {
        OrExpr::new(expressions.into_iter().collect()).map(FilterExpr::Or)
    }

    pub fn negate(expression: FilterExpr) -> Self {
        FilterExpr::Not(NotExpr::new(expression))
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            FilterExpr::Condition(c) => Some(c),
            _ => None,
        }
    }

    /// The typed JSON form: `{"type": "condition" | "and" | "or" | "not", ...}`.
    pub fn to_json(&self) -> Value {
        match self {
            FilterExpr::Condition(c) => c.to_json(),
            FilterExpr::And(e) => json!({
                "type": "and",
                "expressions": e.expressions.iter().map(FilterExpr::to_json).collect::<Vec<_>>(),
            }),
            FilterExpr::Or(e) => json!({
                "type": "or",
                "expressions": e.expressions.iter().map(FilterExpr::to_json).collect::<Vec<_>>(),
            }),
            FilterExpr::Not(e) => json!({
                "type": "not",
                "expression": e.expression.to_json(),
            }),
        }
    }
}

impl From<Condition> for FilterExpr {
    fn from(c: Condition) -> Self {
        FilterExpr::Condition(c)
    }
}

impl From<AndExpr> for FilterExpr {
    fn from(e: AndExpr) -> Self {
        FilterExpr::And(e)
    }
}

impl From<OrExpr> for FilterExpr {
    fn from(e: OrExpr) -> Self {
        FilterExpr::Or(e)
    }
}

impl From<NotExpr> for FilterExpr {
    fn from(e: NotExpr) -> Self {
        FilterExpr::Not(e)
    }
}

impl BitAnd for FilterExpr {
    type Output = FilterExpr;

    fn bitand(self, rhs: FilterExpr) -> FilterExpr {
        FilterExpr::And(AndExpr {
            expressions: vec![self, rhs],
        })
    }
}

impl BitOr for FilterExpr {
    type Output = FilterExpr;

    fn bitor(self, rhs: FilterExpr) -> FilterExpr {
        FilterExpr::Or(OrExpr {
            expressions: vec![self, rhs],
        })
    }
}

impl Not for FilterExpr {
    type Output = FilterExpr;

    fn not(self) -> FilterExpr {
        FilterExpr::negate(self)
    }
}

impl Serialize for FilterExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        crate::normalize::normalize(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_validates_field_name() {
        let err = Condition::new("bad-name", Operator::Eq, 1).unwrap_err();
        assert!(matches!(err, UqlError::InvalidField { .. }));
    }

    #[test]
    fn test_unary_ops_clear_value() {
        let c = Condition::new("a", Operator::Exists, true).unwrap();
        assert_eq!(c.value(), &Value::Null);
        let c = Condition::new("a", Operator::Nexists, "x").unwrap();
        assert_eq!(c.value(), &Value::Null);
    }

    #[test]
    fn test_list_operators_require_lists() {
        assert!(Condition::new("a", Operator::In, vec![1, 2, 3]).is_ok());
        assert!(Condition::new("a", Operator::Nin, "not-a-list").is_err());
        assert!(Condition::new("a", Operator::ArrayOverlap, json!({"a": 1})).is_err());
    }

    #[test]
    fn test_between_requires_two_items() {
        assert!(Condition::new("a", Operator::Between, vec![1, 2]).is_ok());
        assert!(Condition::new("a", Operator::Between, vec![1]).is_err());
        assert!(Condition::new("a", Operator::Between, "nope").is_err());
    }

    #[test]
    fn test_string_and_geo_shapes() {
        assert!(Condition::new("name", Operator::Contains, "ali").is_ok());
        assert!(Condition::new("name", Operator::Icontains, 123).is_err());
        assert!(Condition::new("geo", Operator::GeoWithin, vec!["not", "dict"]).is_err());
        let ok = Condition::new("geo", Operator::GeoIntersects, json!({"type": "Polygon"})).unwrap();
        assert_eq!(ok.value(), &json!({"type": "Polygon"}));
    }

    #[test]
    fn test_empty_boolean_nodes_rejected() {
        assert!(matches!(
            AndExpr::new(vec![]),
            Err(UqlError::EmptyExpression("AND"))
        ));
        assert!(FilterExpr::or(Vec::new()).is_err());
    }

    #[test]
    fn test_operator_composition() {
        let a: FilterExpr = Condition::new("a", Operator::Eq, "x").unwrap().into();
        let b: FilterExpr = Condition::new("b", Operator::Gt, 10).unwrap().into();

        match a.clone() & b.clone() {
            FilterExpr::And(e) => assert_eq!(e.expressions().len(), 2),
            other => panic!("expected AND, got {other:?}"),
        }
        assert!(matches!(a.clone() | b, FilterExpr::Or(_)));
        assert!(matches!(!a, FilterExpr::Not(_)));
    }

    #[test]
    fn test_non_empty_list_reports_field() {
        let c = Condition::new("status", Operator::In, Vec::<String>::new()).unwrap();
        match c.non_empty_list() {
            Err(UqlError::EmptyList { operator, field }) => {
                assert_eq!(operator, "in");
                assert_eq!(field, "status");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_typed_json_round_trip() {
        let expr: FilterExpr = Condition::new("age", Operator::Gt, 30)
            .unwrap()
            .with_field_type(FieldType::Number)
            .into();
        let expr = !expr;
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["type"], "not");
        assert_eq!(json["expression"]["field_type"], "number");
        let back: FilterExpr = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }
}

//! Fluent field-first builder.

use super::conditions as c;
use crate::ast::{FieldType, FilterExpr, FilterValue};
use crate::error::UqlResult;

/// Entry point: `Where::field("age").gt(30)`.
pub struct Where;

impl Where {
    pub fn field(name: impl Into<String>) -> FieldRef {
        FieldRef {
            name: name.into(),
            field_type: None,
        }
    }

    /// Like [`Where::field`], tagging every condition with a type hint.
    pub fn typed_field(name: impl Into<String>, field_type: FieldType) -> FieldRef {
        FieldRef {
            name: name.into(),
            field_type: Some(field_type),
        }
    }

    pub fn and(expressions: impl IntoIterator<Item = FilterExpr>) -> UqlResult<FilterExpr> {
        FilterExpr::and(expressions)
    }

    pub fn or(expressions: impl IntoIterator<Item = FilterExpr>) -> UqlResult<FilterExpr> {
        FilterExpr::or(expressions)
    }

    pub fn not(expression: FilterExpr) -> FilterExpr {
        FilterExpr::negate(expression)
    }
}

/// A field awaiting its operator.
#[derive(Debug, Clone)]
pub struct FieldRef {
    name: String,
    field_type: Option<FieldType>,
}

impl FieldRef {
    fn finish(&self, built: UqlResult<FilterExpr>) -> UqlResult<FilterExpr> {
        match (built?, self.field_type) {
            (FilterExpr::Condition(c), Some(ft)) => Ok(c.with_field_type(ft).into()),
            (expr, _) => Ok(expr),
        }
    }

    pub fn eq(&self, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::eq(&self.name, value))
    }

    pub fn neq(&self, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::neq(&self.name, value))
    }

    pub fn gt(&self, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::gt(&self.name, value))
    }

    pub fn gte(&self, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::gte(&self.name, value))
    }

    pub fn lt(&self, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::lt(&self.name, value))
    }

    pub fn lte(&self, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::lte(&self.name, value))
    }

    pub fn is_in<V: Into<FilterValue>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> UqlResult<FilterExpr> {
        self.finish(c::is_in(&self.name, values))
    }

    pub fn not_in<V: Into<FilterValue>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> UqlResult<FilterExpr> {
        self.finish(c::not_in(&self.name, values))
    }

    pub fn is_null(&self) -> UqlResult<FilterExpr> {
        self.finish(c::eq(&self.name, FilterValue::null()))
    }

    pub fn is_not_null(&self) -> UqlResult<FilterExpr> {
        self.finish(c::neq(&self.name, FilterValue::null()))
    }

    pub fn exists(&self) -> UqlResult<FilterExpr> {
        self.finish(c::exists(&self.name))
    }

    pub fn not_exists(&self) -> UqlResult<FilterExpr> {
        self.finish(c::not_exists(&self.name))
    }

    pub fn between(
        &self,
        low: impl Into<FilterValue>,
        high: impl Into<FilterValue>,
    ) -> UqlResult<FilterExpr> {
        self.finish(c::between(&self.name, low, high))
    }

    pub fn contains(&self, text: &str) -> UqlResult<FilterExpr> {
        self.finish(c::contains(&self.name, text))
    }

    pub fn not_contains(&self, text: &str) -> UqlResult<FilterExpr> {
        self.finish(c::not_contains(&self.name, text))
    }

    pub fn icontains(&self, text: &str) -> UqlResult<FilterExpr> {
        self.finish(c::icontains(&self.name, text))
    }

    pub fn starts_with(&self, text: &str) -> UqlResult<FilterExpr> {
        self.finish(c::starts_with(&self.name, text))
    }

    pub fn ends_with(&self, text: &str) -> UqlResult<FilterExpr> {
        self.finish(c::ends_with(&self.name, text))
    }

    pub fn ilike(&self, pattern: &str) -> UqlResult<FilterExpr> {
        self.finish(c::ilike(&self.name, pattern))
    }

    pub fn regex(&self, pattern: &str) -> UqlResult<FilterExpr> {
        self.finish(c::regex(&self.name, pattern))
    }

    pub fn array_contains(&self, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::array_contains(&self.name, value))
    }

    pub fn array_overlap<V: Into<FilterValue>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> UqlResult<FilterExpr> {
        self.finish(c::array_overlap(&self.name, values))
    }

    pub fn array_contained<V: Into<FilterValue>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> UqlResult<FilterExpr> {
        self.finish(c::array_contained(&self.name, values))
    }

    pub fn geo_within(&self, shape: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::geo_within(&self.name, shape))
    }

    pub fn geo_intersects(&self, shape: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
        self.finish(c::geo_intersects(&self.name, shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Operator;

    #[test]
    fn test_fluent_chain() {
        let expr = Where::field("age").gt(30).unwrap() & !Where::field("status").eq("inactive").unwrap();
        match &expr {
            FilterExpr::And(and) => {
                let first = and.expressions()[0].as_condition().unwrap();
                assert_eq!(first.operator(), Operator::Gt);
                assert!(matches!(and.expressions()[1], FilterExpr::Not(_)));
            }
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn test_typed_field_tags_conditions() {
        let expr = Where::typed_field("born", FieldType::Date).gte("2000-01-01").unwrap();
        assert_eq!(expr.as_condition().unwrap().field_type(), Some(FieldType::Date));
    }

    #[test]
    fn test_null_helpers() {
        let c = Where::field("deleted_at").is_null().unwrap();
        let c = c.as_condition().unwrap();
        assert_eq!(c.operator(), Operator::Eq);
        assert!(c.value().is_null());
    }
}

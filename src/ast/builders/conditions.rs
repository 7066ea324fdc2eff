//! Condition builders for filter trees.

use crate::ast::{Condition, FilterExpr, FilterValue, Operator};
use crate::error::UqlResult;

/// Helper to create a condition node
fn make_condition(field: &str, op: Operator, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    Condition::new(field, op, value).map(FilterExpr::Condition)
}

/// Equality (`field = value`); a null value means "is null".
pub fn eq(field: &str, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Eq, value)
}

/// Inequality; a null value means "is not null".
pub fn neq(field: &str, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Neq, value)
}

pub fn gt(field: &str, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Gt, value)
}

pub fn gte(field: &str, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Gte, value)
}

pub fn lt(field: &str, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Lt, value)
}

pub fn lte(field: &str, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Lte, value)
}

/// Membership (`field IN (values)`).
pub fn is_in<V: Into<FilterValue>>(
    field: &str,
    values: impl IntoIterator<Item = V>,
) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::In, collect(values))
}

/// Negated membership (`field NOT IN (values)`).
pub fn not_in<V: Into<FilterValue>>(
    field: &str,
    values: impl IntoIterator<Item = V>,
) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Nin, collect(values))
}

pub fn exists(field: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Exists, FilterValue::null())
}

pub fn not_exists(field: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Nexists, FilterValue::null())
}

/// Inclusive range `low <= field <= high`.
pub fn between(
    field: &str,
    low: impl Into<FilterValue>,
    high: impl Into<FilterValue>,
) -> UqlResult<FilterExpr> {
    let pair = vec![low.into().into_inner(), high.into().into_inner()];
    make_condition(field, Operator::Between, pair)
}

/// Substring match on the literal text.
pub fn contains(field: &str, text: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Contains, text)
}

pub fn not_contains(field: &str, text: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Ncontains, text)
}

/// Case-insensitive substring match.
pub fn icontains(field: &str, text: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Icontains, text)
}

pub fn starts_with(field: &str, text: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::StartsWith, text)
}

pub fn ends_with(field: &str, text: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::EndsWith, text)
}

/// Case-insensitive LIKE; `%` and `_` in `pattern` are wildcards.
pub fn ilike(field: &str, pattern: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Ilike, pattern)
}

pub fn regex(field: &str, pattern: &str) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::Regex, pattern)
}

/// Array field holds `value`.
pub fn array_contains(field: &str, value: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::ArrayContains, value)
}

/// Array field shares at least one element with `values`.
pub fn array_overlap<V: Into<FilterValue>>(
    field: &str,
    values: impl IntoIterator<Item = V>,
) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::ArrayOverlap, collect(values))
}

/// Every element of the array field is one of `values`.
pub fn array_contained<V: Into<FilterValue>>(
    field: &str,
    values: impl IntoIterator<Item = V>,
) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::ArrayContained, collect(values))
}

/// Field geometry lies within the GeoJSON `shape`.
pub fn geo_within(field: &str, shape: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::GeoWithin, shape)
}

pub fn geo_intersects(field: &str, shape: impl Into<FilterValue>) -> UqlResult<FilterExpr> {
    make_condition(field, Operator::GeoIntersects, shape)
}

fn collect<V: Into<FilterValue>>(values: impl IntoIterator<Item = V>) -> FilterValue {
    values.into_iter().map(Into::into).collect::<Vec<FilterValue>>().into()
}

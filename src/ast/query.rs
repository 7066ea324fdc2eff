//! The structured query handed to every translator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::filter::FilterExpr;
use super::operators::SortOrder;
use crate::error::{UqlError, UqlResult};
use crate::normalize::normalize;
use crate::validator::{NameRules, validate_qualified_name};

/// Sort key: `{"field": "created_at", "order": "DESC"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// `where` block: every `must` entry holds and no `must_not` entry holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WhereClause {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FilterExpr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<FilterExpr>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty()
    }

    /// Parse the JSON `where` value.
    ///
    /// A map whose keys are only `must` / `must_not` is the structured form.
    /// Anything else is taken as a single filter expression and wrapped into
    /// `must`.
    pub fn from_json(value: &Value) -> UqlResult<Self> {
        let Some(map) = value.as_object() else {
            return Err(UqlError::Normalize(format!(
                "where must be an object, got {value}"
            )));
        };

        let structured = !map.is_empty()
            && map.keys().all(|k| k == "must" || k == "must_not");
        if !structured {
            return Ok(Self {
                must: vec![normalize(value)?],
                must_not: Vec::new(),
            });
        }

        Ok(Self {
            must: filter_list(map.get("must"), "must")?,
            must_not: filter_list(map.get("must_not"), "must_not")?,
        })
    }
}

fn filter_list(value: Option<&Value>, key: &str) -> UqlResult<Vec<FilterExpr>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(normalize).collect(),
        Some(other) => Err(UqlError::Validation(format!(
            "where.{key} must be a list, got {other}"
        ))),
    }
}

impl<'de> Deserialize<'de> for WhereClause {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        WhereClause::from_json(&raw).map_err(serde::de::Error::custom)
    }
}

/// A backend-agnostic query.
///
/// ```
/// use uql::ast::{Query, OrderBy};
/// use uql::ast::builders::Where;
///
/// let q = Query::new("users")
///     .select(["id", "name"])
///     .must(Where::field("age").gt(30).unwrap())
///     .order_by(OrderBy::desc("created_at"))
///     .limit(10);
/// assert!(q.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default = "select_all")]
    pub select: Vec<String>,
    pub from: String,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

fn select_all() -> Vec<String> {
    vec!["*".to_string()]
}

impl Query {
    /// `SELECT *` from `from`, no filter, no ordering.
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            select: select_all(),
            from: from.into(),
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn from_json(value: &Value) -> UqlResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn must(mut self, expr: FilterExpr) -> Self {
        self.where_clause.get_or_insert_with(Default::default).must.push(expr);
        self
    }

    pub fn must_not(mut self, expr: FilterExpr) -> Self {
        self.where_clause
            .get_or_insert_with(Default::default)
            .must_not
            .push(expr);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn must_clauses(&self) -> &[FilterExpr] {
        self.where_clause.as_ref().map_or(&[], |w| w.must.as_slice())
    }

    pub fn must_not_clauses(&self) -> &[FilterExpr] {
        self.where_clause
            .as_ref()
            .map_or(&[], |w| w.must_not.as_slice())
    }

    pub fn has_filter(&self) -> bool {
        self.where_clause.as_ref().is_some_and(|w| !w.is_empty())
    }

    /// True when the projection is everything (`["*"]` or empty).
    pub fn selects_all(&self) -> bool {
        self.select.is_empty() || (self.select.len() == 1 && self.select[0] == "*")
    }

    /// Offset, with `0` treated as absent.
    pub fn effective_offset(&self) -> Option<u64> {
        self.offset.filter(|&n| n > 0)
    }

    /// Check the identifier grammar of `from`, `select` and `orderBy`.
    pub fn validate(&self) -> UqlResult<()> {
        validate_qualified_name(&self.from, NameRules::STRICT)?;

        if self.select.is_empty() {
            return Err(UqlError::Validation("select must not be empty".into()));
        }
        if self.select.len() > 1 && self.select.iter().any(|s| s == "*") {
            return Err(UqlError::Validation(
                "'*' must be the only entry in select".into(),
            ));
        }
        if !self.selects_all() {
            for field in &self.select {
                validate_qualified_name(field, NameRules::PROJECTION)?;
            }
        }

        for order in &self.order_by {
            validate_qualified_name(&order.field, NameRules::STRICT)?;
        }
        Ok(())
    }
}

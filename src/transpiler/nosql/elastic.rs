//! Elasticsearch query DSL.
//!
//! `ToElastic` renders a [`Query`] into a search request body.
//! [`ElasticQueryBuilder`] exposes the full bool-query surface (filter
//! context, should clauses, aggregations) for callers who need more than
//! the must / must_not split.

use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{UqlError, UqlResult};

const TARGET: &str = "Elasticsearch";

/// Every element of `doc[field]` must be one of `allowed`.
const CONTAINED_SCRIPT: &str = "for (def v : doc[params.field]) { if (!params.allowed.contains(v)) { return false; } } return true;";

/// Extra request sections not expressible in a [`Query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElasticOptions {
    /// Named aggregation bodies, emitted as `aggs`.
    pub aggregations: Map<String, Value>,
    pub highlight_fields: Vec<String>,
    /// Sort values of the previous page's last hit.
    pub search_after: Option<Vec<Value>>,
}

pub trait ToElastic {
    fn to_elastic(&self) -> UqlResult<Value> {
        self.to_elastic_with(&ElasticOptions::default())
    }

    fn to_elastic_with(&self, options: &ElasticOptions) -> UqlResult<Value>;
}

impl ToElastic for Query {
    fn to_elastic_with(&self, options: &ElasticOptions) -> UqlResult<Value> {
        debug!(target_store = "elasticsearch", index = %self.from, "building search");
        let mut visitor = ElasticConditionVisitor;

        let mut bool_query = Map::new();
        if !self.must_clauses().is_empty() {
            bool_query.insert("must".into(), accept_all(self.must_clauses(), &mut visitor)?);
        }
        if !self.must_not_clauses().is_empty() {
            bool_query.insert(
                "must_not".into(),
                accept_all(self.must_not_clauses(), &mut visitor)?,
            );
        }

        let mut out = Map::new();
        out.insert("query".into(), wrap_bool(bool_query));
        if !self.selects_all() {
            out.insert("_source".into(), json!(self.select));
        }

        let request = RequestTail {
            sort: &self.order_by,
            size: self.limit,
            from: self.effective_offset(),
            options,
        };
        request.apply(&mut out)?;
        Ok(Value::Object(out))
    }
}

fn accept_all(exprs: &[FilterExpr], visitor: &mut ElasticConditionVisitor) -> UqlResult<Value> {
    let items = exprs
        .iter()
        .map(|e| e.accept(visitor))
        .collect::<UqlResult<Vec<_>>>()?;
    Ok(Value::Array(items))
}

fn wrap_bool(bool_query: Map<String, Value>) -> Value {
    if bool_query.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": bool_query })
    }
}

/// Sort, pagination and the optional sections, shared by the translator
/// and the builder.
struct RequestTail<'a> {
    sort: &'a [OrderBy],
    size: Option<u64>,
    from: Option<u64>,
    options: &'a ElasticOptions,
}

impl RequestTail<'_> {
    fn apply(&self, out: &mut Map<String, Value>) -> UqlResult<()> {
        if self.options.search_after.is_some() && self.from.is_some() {
            return Err(UqlError::unsupported(
                TARGET,
                "search_after combined with a non-zero offset",
            ));
        }

        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|o| json!({ o.field.as_str(): { "order": o.order.as_sql().to_lowercase() } }))
                .collect();
            out.insert("sort".into(), Value::Array(sort));
        }
        if let Some(n) = self.size {
            out.insert("size".into(), json!(n));
        }
        if let Some(n) = self.from {
            out.insert("from".into(), json!(n));
        }
        if let Some(cursor) = &self.options.search_after {
            out.insert("search_after".into(), json!(cursor));
        }
        if !self.options.aggregations.is_empty() {
            out.insert("aggs".into(), Value::Object(self.options.aggregations.clone()));
        }
        if !self.options.highlight_fields.is_empty() {
            let fields: Map<String, Value> = self
                .options
                .highlight_fields
                .iter()
                .map(|f| (f.clone(), json!({})))
                .collect();
            out.insert("highlight".into(), json!({ "fields": fields }));
        }
        Ok(())
    }
}

/// Escape wildcard metacharacters (`\`, `*`, `?`), backslash first.
fn escape_wildcard(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('*', "\\*")
        .replace('?', "\\?")
}

/// SQL LIKE to wildcard syntax: `%` is `*`, `_` is `?`, the rest is literal.
fn like_to_wildcard(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '%' => "*".to_string(),
            '_' => "?".to_string(),
            other => escape_wildcard(&other.to_string()),
        })
        .collect()
}

fn must_not(clause: Value) -> Value {
    json!({ "bool": { "must_not": [clause] } })
}

fn wildcard_ci(field: &str, pattern: String) -> Value {
    json!({ "wildcard": { field: { "value": pattern, "case_insensitive": true } } })
}

/// Filter visitor producing query DSL clauses.
pub struct ElasticConditionVisitor;

impl FilterVisitor for ElasticConditionVisitor {
    type Output = Value;

    fn visit_condition(&mut self, cond: &Condition) -> UqlResult<Value> {
        let field = cond.field();
        let value = cond.value();
        let exists = json!({ "exists": { "field": field } });

        let clause = match cond.operator() {
            Operator::Eq if value.is_null() => must_not(exists),
            Operator::Neq if value.is_null() => exists,
            Operator::Eq => json!({ "term": { field: value } }),
            Operator::Neq => must_not(json!({ "term": { field: value } })),
            Operator::Gt => json!({ "range": { field: { "gt": value } } }),
            Operator::Gte => json!({ "range": { field: { "gte": value } } }),
            Operator::Lt => json!({ "range": { field: { "lt": value } } }),
            Operator::Lte => json!({ "range": { field: { "lte": value } } }),
            Operator::Between => {
                let (low, high) = cond.bounds()?;
                json!({ "range": { field: { "gte": low, "lte": high } } })
            }
            Operator::In => json!({ "terms": { field: cond.non_empty_list()? } }),
            Operator::Nin => must_not(json!({ "terms": { field: cond.non_empty_list()? } })),
            Operator::Exists => exists,
            Operator::Nexists => must_not(exists),
            Operator::Contains => {
                json!({ "wildcard": { field: format!("*{}*", escape_wildcard(cond.text_value()?)) } })
            }
            Operator::Ncontains => must_not(json!({
                "wildcard": { field: format!("*{}*", escape_wildcard(cond.text_value()?)) }
            })),
            Operator::Icontains => {
                wildcard_ci(field, format!("*{}*", escape_wildcard(cond.text_value()?)))
            }
            Operator::StartsWith => json!({ "prefix": { field: cond.text_value()? } }),
            Operator::EndsWith => {
                json!({ "wildcard": { field: format!("*{}", escape_wildcard(cond.text_value()?)) } })
            }
            Operator::Ilike => wildcard_ci(field, like_to_wildcard(cond.text_value()?)),
            Operator::Regex => json!({ "regexp": { field: cond.text_value()? } }),
            Operator::ArrayContains => json!({ "term": { field: value } }),
            Operator::ArrayOverlap => json!({ "terms": { field: cond.non_empty_list()? } }),
            Operator::ArrayContained => json!({
                "script": {
                    "script": {
                        "source": CONTAINED_SCRIPT,
                        "lang": "painless",
                        "params": { "field": field, "allowed": cond.non_empty_list()? }
                    }
                }
            }),
            Operator::GeoWithin => {
                json!({ "geo_shape": { field: { "shape": value, "relation": "within" } } })
            }
            Operator::GeoIntersects => {
                json!({ "geo_shape": { field: { "shape": value, "relation": "intersects" } } })
            }
        };

        trace!(%clause, "elastic condition");
        Ok(clause)
    }

    fn visit_and(&mut self, expr: &AndExpr) -> UqlResult<Value> {
        let subs = accept_all(expr.expressions(), self)?;
        Ok(json!({ "bool": { "must": subs } }))
    }

    fn visit_or(&mut self, expr: &OrExpr) -> UqlResult<Value> {
        let subs = accept_all(expr.expressions(), self)?;
        Ok(json!({ "bool": { "should": subs, "minimum_should_match": 1 } }))
    }

    fn visit_not(&mut self, expr: &NotExpr) -> UqlResult<Value> {
        Ok(must_not(expr.expression().accept(self)?))
    }
}

/// Builder for search requests beyond what a [`Query`] describes.
///
/// ```
/// use uql::ast::builders::Where;
/// use uql::transpiler::ElasticQueryBuilder;
///
/// let body = ElasticQueryBuilder::new()
///     .filter(Where::field("status").eq("published").unwrap())
///     .should(Where::field("title").icontains("rust").unwrap())
///     .size(20)
///     .build()
///     .unwrap();
/// assert_eq!(body["query"]["bool"]["minimum_should_match"], 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElasticQueryBuilder {
    filters: Vec<FilterExpr>,
    must: Vec<FilterExpr>,
    must_not: Vec<FilterExpr>,
    should: Vec<FilterExpr>,
    minimum_should_match: Option<u32>,
    sort: Vec<OrderBy>,
    size: Option<u64>,
    from: Option<u64>,
    options: ElasticOptions,
}

impl ElasticQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add filter context (no scoring).
    pub fn filter(mut self, expr: FilterExpr) -> Self {
        self.filters.push(expr);
        self
    }

    pub fn must(mut self, expr: FilterExpr) -> Self {
        self.must.push(expr);
        self
    }

    pub fn must_not(mut self, expr: FilterExpr) -> Self {
        self.must_not.push(expr);
        self
    }

    pub fn should(mut self, expr: FilterExpr) -> Self {
        self.should.push(expr);
        self
    }

    /// Only meaningful with at least one `should` clause; [`build`](Self::build)
    /// fails otherwise.
    pub fn minimum_should_match(mut self, n: u32) -> Self {
        self.minimum_should_match = Some(n);
        self
    }

    pub fn aggregation(mut self, name: impl Into<String>, body: Value) -> Self {
        self.options.aggregations.insert(name.into(), body);
        self
    }

    pub fn highlight(mut self, field: impl Into<String>) -> Self {
        self.options.highlight_fields.push(field.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push(OrderBy {
            field: field.into(),
            order,
        });
        self
    }

    pub fn size(mut self, n: u64) -> Self {
        self.size = Some(n);
        self
    }

    pub fn from(mut self, n: u64) -> Self {
        self.from = Some(n);
        self
    }

    pub fn search_after(mut self, values: Vec<Value>) -> Self {
        self.options.search_after = Some(values);
        self
    }

    pub fn build(&self) -> UqlResult<Value> {
        if self.should.is_empty() && self.minimum_should_match.is_some() {
            return Err(UqlError::Validation(
                "minimum_should_match requires at least one should clause".into(),
            ));
        }

        let mut visitor = ElasticConditionVisitor;
        let mut bool_query = Map::new();

        if !self.filters.is_empty() {
            bool_query.insert("filter".into(), accept_all(&self.filters, &mut visitor)?);
        }
        if !self.must.is_empty() {
            bool_query.insert("must".into(), accept_all(&self.must, &mut visitor)?);
        }
        if !self.must_not.is_empty() {
            bool_query.insert("must_not".into(), accept_all(&self.must_not, &mut visitor)?);
        }
        if !self.should.is_empty() {
            bool_query.insert("should".into(), accept_all(&self.should, &mut visitor)?);
            bool_query.insert(
                "minimum_should_match".into(),
                json!(self.minimum_should_match.unwrap_or(1)),
            );
        }

        let mut out = Map::new();
        out.insert("query".into(), wrap_bool(bool_query));
        RequestTail {
            sort: &self.sort,
            size: self.size,
            from: self.from.filter(|&n| n > 0),
            options: &self.options,
        }
        .apply(&mut out)?;
        Ok(Value::Object(out))
    }
}

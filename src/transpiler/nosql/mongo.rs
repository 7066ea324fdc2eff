use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{UqlError, UqlResult};
use crate::validator::{NameRules, QualifiedName};

/// A `find` command: filter plus cursor options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MongoFind {
    pub filter: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<(String, i32)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
}

pub trait ToMongo {
    fn to_mongo(&self) -> UqlResult<MongoFind>;
    fn to_mongo_pipeline(&self) -> UqlResult<Vec<Value>>;
}

impl ToMongo for Query {
    fn to_mongo(&self) -> UqlResult<MongoFind> {
        debug!(target_store = "mongodb", from = %self.from, "building find");
        let sort = (!self.order_by.is_empty()).then(|| {
            self.order_by
                .iter()
                .map(|o| (o.field.clone(), o.order.as_sign()))
                .collect()
        });

        Ok(MongoFind {
            filter: build_filter(self)?.unwrap_or_else(|| json!({})),
            projection: build_projection(self)?,
            sort,
            limit: self.limit,
            skip: self.effective_offset(),
        })
    }

    fn to_mongo_pipeline(&self) -> UqlResult<Vec<Value>> {
        debug!(target_store = "mongodb", from = %self.from, "building pipeline");
        let mut stages = Vec::new();

        // 1. $match
        if let Some(filter) = build_filter(self)? {
            stages.push(json!({ "$match": filter }));
        }

        // 2. $sort, $skip, $limit
        if !self.order_by.is_empty() {
            let spec: Map<String, Value> = self
                .order_by
                .iter()
                .map(|o| (o.field.clone(), Value::from(o.order.as_sign())))
                .collect();
            stages.push(json!({ "$sort": spec }));
        }
        if let Some(n) = self.effective_offset() {
            stages.push(json!({ "$skip": n }));
        }
        if let Some(n) = self.limit {
            stages.push(json!({ "$limit": n }));
        }

        // 3. $project
        if let Some(proj) = build_projection(self)? {
            stages.push(json!({ "$project": proj }));
        }

        Ok(stages)
    }
}

/// Combined must / must_not filter, or `None` when there is nothing to match.
fn build_filter(query: &Query) -> UqlResult<Option<Value>> {
    let mut visitor = MongoConditionVisitor;
    let mut clauses = Vec::new();
    for expr in query.must_clauses() {
        clauses.push(expr.accept(&mut visitor)?);
    }
    for expr in query.must_not_clauses() {
        clauses.push(json!({ "$nor": [expr.accept(&mut visitor)?] }));
    }

    Ok(match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ "$and": clauses })),
    })
}

/// Inclusion projection. `a.b.*` projects the whole `a.b` subdocument.
fn build_projection(query: &Query) -> UqlResult<Option<Value>> {
    if query.selects_all() {
        return Ok(None);
    }
    let mut proj = Map::new();
    for f in &query.select {
        let parsed = QualifiedName::parse(f, NameRules::PROJECTION)?;
        if parsed.segments.is_empty() {
            return Err(UqlError::unsupported("MongoDB", format!("projection '{f}'")));
        }
        proj.insert(parsed.segments.join("."), Value::from(1));
    }
    Ok(Some(Value::Object(proj)))
}

/// Convert a SQL LIKE pattern to an anchored regex: `%` is `.*`, `_` is
/// `.`, everything else matches literally.
fn like_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut literal = String::new();
    for ch in pattern.chars() {
        let wildcard = match ch {
            '%' => ".*",
            '_' => ".",
            _ => {
                literal.push(ch);
                continue;
            }
        };
        out.push_str(&::regex::escape(&literal));
        literal.clear();
        out.push_str(wildcard);
    }
    out.push_str(&::regex::escape(&literal));
    out.push('$');
    out
}

/// `{field: value}`, or `{field: {"$eq": value}}` for documents so their
/// keys are never read as query operators.
fn equality(field: &str, value: &Value) -> Value {
    if value.is_object() {
        json!({ field: { "$eq": value } })
    } else {
        json!({ field: value })
    }
}

/// Filter visitor producing MongoDB query documents.
pub struct MongoConditionVisitor;

impl FilterVisitor for MongoConditionVisitor {
    type Output = Value;

    fn visit_condition(&mut self, cond: &Condition) -> UqlResult<Value> {
        let field = cond.field();
        let value = cond.value();

        let doc = match cond.operator() {
            Operator::Eq => equality(field, value),
            Operator::Neq => json!({ field: { "$ne": value } }),
            Operator::Gt => json!({ field: { "$gt": value } }),
            Operator::Gte => json!({ field: { "$gte": value } }),
            Operator::Lt => json!({ field: { "$lt": value } }),
            Operator::Lte => json!({ field: { "$lte": value } }),
            Operator::Between => {
                let (low, high) = cond.bounds()?;
                json!({ field: { "$gte": low, "$lte": high } })
            }
            Operator::In => json!({ field: { "$in": cond.non_empty_list()? } }),
            Operator::Nin => json!({ field: { "$nin": cond.non_empty_list()? } }),
            Operator::Exists => json!({ field: { "$exists": true, "$ne": null } }),
            // missing or explicitly null
            Operator::Nexists => {
                json!({ "$or": [{ field: { "$exists": false } }, { field: null }] })
            }
            Operator::Contains => {
                json!({ field: { "$regex": ::regex::escape(cond.text_value()?) } })
            }
            Operator::Ncontains => {
                json!({ field: { "$not": { "$regex": ::regex::escape(cond.text_value()?) } } })
            }
            Operator::Icontains => json!({
                field: { "$regex": ::regex::escape(cond.text_value()?), "$options": "i" }
            }),
            Operator::StartsWith => {
                json!({ field: { "$regex": format!("^{}", ::regex::escape(cond.text_value()?)) } })
            }
            Operator::EndsWith => {
                json!({ field: { "$regex": format!("{}$", ::regex::escape(cond.text_value()?)) } })
            }
            Operator::Ilike => json!({
                field: { "$regex": like_to_regex(cond.text_value()?), "$options": "i" }
            }),
            Operator::Regex => json!({ field: { "$regex": cond.text_value()? } }),
            // equality on an array field matches any element
            Operator::ArrayContains => equality(field, value),
            Operator::ArrayOverlap => json!({ field: { "$in": cond.non_empty_list()? } }),
            // no element outside the allowed set
            Operator::ArrayContained => json!({
                field: { "$not": { "$elemMatch": { "$nin": cond.non_empty_list()? } } }
            }),
            Operator::GeoWithin => json!({ field: { "$geoWithin": { "$geometry": value } } }),
            Operator::GeoIntersects => {
                json!({ field: { "$geoIntersects": { "$geometry": value } } })
            }
        };

        trace!(%doc, "mongo condition");
        Ok(doc)
    }

    fn visit_and(&mut self, expr: &AndExpr) -> UqlResult<Value> {
        let subs = expr
            .expressions()
            .iter()
            .map(|e| e.accept(self))
            .collect::<UqlResult<Vec<_>>>()?;
        Ok(json!({ "$and": subs }))
    }

    fn visit_or(&mut self, expr: &OrExpr) -> UqlResult<Value> {
        let subs = expr
            .expressions()
            .iter()
            .map(|e| e.accept(self))
            .collect::<UqlResult<Vec<_>>>()?;
        Ok(json!({ "$or": subs }))
    }

    fn visit_not(&mut self, expr: &NotExpr) -> UqlResult<Value> {
        Ok(json!({ "$nor": [expr.expression().accept(self)?] }))
    }
}

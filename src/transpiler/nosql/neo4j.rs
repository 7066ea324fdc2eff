use serde_json::Value;
use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{UqlError, UqlResult};
use crate::validator::{NameRules, QualifiedName};

const TARGET: &str = "Neo4j";
const ALIAS: &str = "n";

pub trait ToNeo4j {
    fn to_cypher(&self) -> UqlResult<String>;
}

impl ToNeo4j for Query {
    fn to_cypher(&self) -> UqlResult<String> {
        debug!(target_store = "neo4j", label = %self.from, "building Cypher");
        let label = graph_label(TARGET, &self.from)?;

        let mut parts = vec![format!("MATCH ({}:{})", ALIAS, label)];

        let mut visitor = CypherConditionVisitor;
        if let Some(clause) = graph_where(self, &mut visitor)? {
            parts.push(format!("WHERE {}", clause));
        }

        parts.push(format!("RETURN {}", graph_projection(TARGET, self)?));
        if let Some(order) = graph_order_by(self)? {
            parts.push(order);
        }
        if let Some(n) = self.effective_offset() {
            parts.push(format!("SKIP {}", n)); // Cypher uses SKIP, not OFFSET
        }
        if let Some(n) = self.limit {
            parts.push(format!("LIMIT {}", n));
        }

        Ok(format!("{};", parts.join(" ")))
    }
}

/// Node label / class name: a single identifier segment.
pub(crate) fn graph_label(target: &'static str, from: &str) -> UqlResult<String> {
    let name = QualifiedName::parse(from, NameRules::STRICT)?;
    if name.segments.len() != 1 {
        return Err(UqlError::unsupported(target, format!("qualified label '{from}'")));
    }
    Ok(from.to_string())
}

/// `n.a.b` for a validated field name.
pub(crate) fn node_field(name: &str) -> UqlResult<String> {
    let parsed = QualifiedName::parse(name, NameRules::STRICT)?;
    Ok(format!("{}.{}", ALIAS, parsed.render(str::to_string)))
}

pub(crate) fn graph_projection(target: &'static str, query: &Query) -> UqlResult<String> {
    if query.selects_all() {
        return Ok(ALIAS.to_string());
    }
    let fields = query
        .select
        .iter()
        .map(|f| -> UqlResult<String> {
            let parsed = QualifiedName::parse(f, NameRules::PROJECTION)?;
            if parsed.trailing_star {
                return Err(UqlError::unsupported(target, format!("projection '{f}'")));
            }
            node_field(f)
        })
        .collect::<UqlResult<Vec<_>>>()?;
    Ok(fields.join(", "))
}

pub(crate) fn graph_order_by(query: &Query) -> UqlResult<Option<String>> {
    if query.order_by.is_empty() {
        return Ok(None);
    }
    let keys = query
        .order_by
        .iter()
        .map(|o| -> UqlResult<String> {
            Ok(format!("{} {}", node_field(&o.field)?, o.order.as_sql()))
        })
        .collect::<UqlResult<Vec<String>>>()?;
    Ok(Some(format!("ORDER BY {}", keys.join(", "))))
}

/// `(m1 AND m2) AND (NOT (n1) AND NOT (n2))`, or `None` without a filter.
pub(crate) fn graph_where<V>(query: &Query, visitor: &mut V) -> UqlResult<Option<String>>
where
    V: FilterVisitor<Output = String>,
{
    let mut groups = Vec::new();
    if !query.must_clauses().is_empty() {
        let must = query
            .must_clauses()
            .iter()
            .map(|e| e.accept(&mut *visitor))
            .collect::<UqlResult<Vec<_>>>()?;
        groups.push(format!("({})", must.join(" AND ")));
    }
    if !query.must_not_clauses().is_empty() {
        let must_not = query
            .must_not_clauses()
            .iter()
            .map(|e| -> UqlResult<String> { Ok(format!("NOT ({})", e.accept(&mut *visitor)?)) })
            .collect::<UqlResult<Vec<String>>>()?;
        groups.push(format!("({})", must_not.join(" AND ")));
    }
    Ok((!groups.is_empty()).then(|| groups.join(" AND ")))
}

/// Single-quoted string with `\` and `'` backslash-escaped.
pub(crate) fn graph_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub(crate) fn graph_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => graph_string(s),
        Value::Array(items) => graph_list(items),
        Value::Object(_) => graph_string(&value.to_string()),
    }
}

pub(crate) fn graph_list(items: &[Value]) -> String {
    let items: Vec<String> = items.iter().map(graph_literal).collect();
    format!("[{}]", items.join(", "))
}

/// LIKE pattern to an unanchored regex body (Cypher `=~` matches the
/// whole string).
fn like_to_regex(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '%' => ".*".to_string(),
            '_' => ".".to_string(),
            other => ::regex::escape(&other.to_string()),
        })
        .collect()
}

/// Filter visitor producing Cypher predicates over the node `n`.
pub struct CypherConditionVisitor;

impl FilterVisitor for CypherConditionVisitor {
    type Output = String;

    fn visit_condition(&mut self, cond: &Condition) -> UqlResult<String> {
        let lhs = node_field(cond.field())?;
        let value = cond.value();

        let cypher = match cond.operator() {
            Operator::Eq if value.is_null() => format!("{} IS NULL", lhs),
            Operator::Neq if value.is_null() => format!("{} IS NOT NULL", lhs),
            Operator::Eq => format!("{} = {}", lhs, graph_literal(value)),
            Operator::Neq => format!("{} <> {}", lhs, graph_literal(value)),
            Operator::Gt => format!("{} > {}", lhs, graph_literal(value)),
            Operator::Gte => format!("{} >= {}", lhs, graph_literal(value)),
            Operator::Lt => format!("{} < {}", lhs, graph_literal(value)),
            Operator::Lte => format!("{} <= {}", lhs, graph_literal(value)),
            Operator::Exists => format!("{} IS NOT NULL", lhs),
            Operator::Nexists => format!("{} IS NULL", lhs),
            Operator::In => format!("{} IN {}", lhs, graph_list(cond.non_empty_list()?)),
            Operator::Nin => format!("NOT ({} IN {})", lhs, graph_list(cond.non_empty_list()?)),
            Operator::Between => {
                let (low, high) = cond.bounds()?;
                format!(
                    "({lhs} >= {} AND {lhs} <= {})",
                    graph_literal(low),
                    graph_literal(high)
                )
            }
            Operator::Contains => {
                format!("{} CONTAINS {}", lhs, graph_string(cond.text_value()?))
            }
            Operator::Ncontains => {
                format!("NOT ({} CONTAINS {})", lhs, graph_string(cond.text_value()?))
            }
            Operator::Icontains => format!(
                "toLower({}) CONTAINS toLower({})",
                lhs,
                graph_string(cond.text_value()?)
            ),
            Operator::StartsWith => {
                format!("{} STARTS WITH {}", lhs, graph_string(cond.text_value()?))
            }
            Operator::EndsWith => {
                format!("{} ENDS WITH {}", lhs, graph_string(cond.text_value()?))
            }
            Operator::Ilike => {
                let regex = format!("(?i){}", like_to_regex(cond.text_value()?));
                format!("{} =~ {}", lhs, graph_string(&regex))
            }
            Operator::Regex => format!("{} =~ {}", lhs, graph_string(cond.text_value()?)),
            Operator::ArrayContains => format!("{} IN {}", graph_literal(value), lhs),
            Operator::ArrayOverlap => format!(
                "any(x IN {} WHERE x IN {})",
                lhs,
                graph_list(cond.non_empty_list()?)
            ),
            Operator::ArrayContained => format!(
                "all(x IN {} WHERE x IN {})",
                lhs,
                graph_list(cond.non_empty_list()?)
            ),
            op @ (Operator::GeoWithin | Operator::GeoIntersects) => {
                return Err(UqlError::unsupported(TARGET, format!("operator '{op}'")));
            }
        };

        trace!(%cypher, "cypher condition");
        Ok(cypher)
    }

    fn visit_and(&mut self, expr: &AndExpr) -> UqlResult<String> {
        let parts = expr
            .expressions()
            .iter()
            .map(|e| e.accept(self))
            .collect::<UqlResult<Vec<_>>>()?;
        Ok(format!("({})", parts.join(" AND ")))
    }

    fn visit_or(&mut self, expr: &OrExpr) -> UqlResult<String> {
        let parts = expr
            .expressions()
            .iter()
            .map(|e| e.accept(self))
            .collect::<UqlResult<Vec<_>>>()?;
        Ok(format!("({})", parts.join(" OR ")))
    }

    fn visit_not(&mut self, expr: &NotExpr) -> UqlResult<String> {
        Ok(format!("NOT ({})", expr.expression().accept(self)?))
    }
}

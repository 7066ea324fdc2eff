use serde_json::Value;
use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{UqlError, UqlResult};
use crate::validator::{NameRules, QualifiedName};

const TARGET: &str = "Cassandra";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CqlOptions {
    /// Append `ALLOW FILTERING` to SELECTs that carry a WHERE clause.
    pub allow_filtering: bool,
}

pub trait ToCassandra {
    fn to_cql(&self) -> UqlResult<String> {
        self.to_cql_with(&CqlOptions::default())
    }

    fn to_cql_with(&self, options: &CqlOptions) -> UqlResult<String>;
}

impl ToCassandra for Query {
    fn to_cql_with(&self, options: &CqlOptions) -> UqlResult<String> {
        debug!(target_store = "cassandra", from = %self.from, "building CQL");

        if !self.order_by.is_empty() {
            return Err(UqlError::unsupported(TARGET, "ORDER BY"));
        }
        if self.effective_offset().is_some() {
            return Err(UqlError::unsupported(TARGET, "OFFSET"));
        }

        let mut parts = Vec::new();
        if self.selects_all() {
            parts.push("SELECT *".to_string());
        } else {
            let cols = self
                .select
                .iter()
                .map(|c| identifier(c, NameRules::PROJECTION))
                .collect::<UqlResult<Vec<_>>>()?;
            parts.push(format!("SELECT {}", cols.join(", ")));
        }
        parts.push(format!("FROM {}", identifier(&self.from, NameRules::STRICT)?));

        let mut visitor = CqlConditionVisitor;
        let mut where_groups = Vec::new();
        if !self.must_clauses().is_empty() {
            let must = self
                .must_clauses()
                .iter()
                .map(|e| e.accept(&mut visitor))
                .collect::<UqlResult<Vec<_>>>()?;
            where_groups.push(format!("({})", must.join(" AND ")));
        }
        if !self.must_not_clauses().is_empty() {
            let negated = self
                .must_not_clauses()
                .iter()
                .map(|e| negate(e, &mut visitor))
                .collect::<UqlResult<Vec<_>>>()?;
            where_groups.push(format!("({})", negated.join(" AND ")));
        }
        let has_where = !where_groups.is_empty();
        if has_where {
            parts.push(format!("WHERE {}", where_groups.join(" AND ")));
        }

        if let Some(n) = self.limit {
            parts.push(format!("LIMIT {}", n));
        }
        if options.allow_filtering && has_where {
            parts.push("ALLOW FILTERING".to_string());
        }

        Ok(format!("{};", parts.join(" ")))
    }
}

/// Negate a must_not entry: leaves with an exact inverse operator are
/// rewritten, everything else is wrapped in `NOT (...)`.
fn negate(expr: &FilterExpr, visitor: &mut CqlConditionVisitor) -> UqlResult<String> {
    if let Some(inverted) = expr.as_condition().and_then(Condition::inverted) {
        return visitor.visit_condition(&inverted);
    }
    Ok(format!("NOT ({})", expr.accept(visitor)?))
}

/// Validated, unquoted identifier.
fn identifier(name: &str, rules: NameRules) -> UqlResult<String> {
    let parsed = QualifiedName::parse(name, rules)?;
    if parsed.trailing_star {
        return Err(UqlError::unsupported(TARGET, format!("projection '{name}'")));
    }
    Ok(parsed.render(str::to_string))
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        other => quote(&other.to_string()),
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn list(values: &[Value]) -> String {
    values.iter().map(literal).collect::<Vec<_>>().join(", ")
}

/// CQL `LIKE` has no escape syntax, so a literal `%` cannot be expressed.
fn like_literal(cond: &Condition, prefix: &str, suffix: &str) -> UqlResult<String> {
    let text = cond.text_value()?;
    if text.contains('%') {
        return Err(UqlError::unsupported(
            TARGET,
            format!("'%' inside a '{}' value", cond.operator()),
        ));
    }
    Ok(quote(&format!("{}{}{}", prefix, text, suffix)))
}

/// Filter visitor producing CQL boolean expressions.
pub struct CqlConditionVisitor;

impl FilterVisitor for CqlConditionVisitor {
    type Output = String;

    fn visit_condition(&mut self, cond: &Condition) -> UqlResult<String> {
        let f = identifier(cond.field(), NameRules::STRICT)?;
        let value = cond.value();

        let cql = match cond.operator() {
            Operator::Eq if value.is_null() => format!("{} IS NULL", f),
            Operator::Neq if value.is_null() => format!("{} IS NOT NULL", f),
            Operator::Eq => format!("{} = {}", f, literal(value)),
            Operator::Neq => format!("{} != {}", f, literal(value)),
            Operator::Gt => format!("{} > {}", f, literal(value)),
            Operator::Gte => format!("{} >= {}", f, literal(value)),
            Operator::Lt => format!("{} < {}", f, literal(value)),
            Operator::Lte => format!("{} <= {}", f, literal(value)),
            Operator::Exists => format!("{} IS NOT NULL", f),
            Operator::Nexists => format!("{} IS NULL", f),
            Operator::In => format!("{} IN ({})", f, list(cond.non_empty_list()?)),
            Operator::Nin => format!("{} NOT IN ({})", f, list(cond.non_empty_list()?)),
            Operator::Between => {
                let (low, high) = cond.bounds()?;
                format!("({f} >= {} AND {f} <= {})", literal(low), literal(high))
            }
            Operator::Contains => format!("{} LIKE {}", f, like_literal(cond, "%", "%")?),
            Operator::Ncontains => format!("{} NOT LIKE {}", f, like_literal(cond, "%", "%")?),
            Operator::StartsWith => format!("{} LIKE {}", f, like_literal(cond, "", "%")?),
            Operator::EndsWith => format!("{} LIKE {}", f, like_literal(cond, "%", "")?),
            Operator::ArrayContains => format!("{} CONTAINS {}", f, literal(value)),
            op @ (Operator::ArrayOverlap | Operator::ArrayContained) => {
                // empty lists are rejected before the operator itself
                cond.non_empty_list()?;
                return Err(UqlError::unsupported(TARGET, format!("operator '{op}'")));
            }
            op @ (Operator::Icontains
            | Operator::Ilike
            | Operator::Regex
            | Operator::GeoWithin
            | Operator::GeoIntersects) => {
                return Err(UqlError::unsupported(TARGET, format!("operator '{op}'")));
            }
        };

        trace!(%cql, "cql condition");
        Ok(cql)
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

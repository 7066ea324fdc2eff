use tracing::{debug, trace};

use super::neo4j::{
    graph_label, graph_list, graph_literal, graph_order_by, graph_projection, graph_string,
    graph_where,
};
use crate::ast::*;
use crate::error::{UqlError, UqlResult};
use crate::validator::{NameRules, QualifiedName};

const TARGET: &str = "OrientDB";

pub trait ToOrientDb {
    fn to_orientdb(&self) -> UqlResult<String>;
}

impl ToOrientDb for Query {
    fn to_orientdb(&self) -> UqlResult<String> {
        debug!(target_store = "orientdb", class = %self.from, "building MATCH");
        let class = graph_label(TARGET, &self.from)?;

        let mut visitor = OrientConditionVisitor;
        let node = match graph_where(self, &mut visitor)? {
            Some(clause) => format!("{{class: {}, as: n, where: ({})}}", class, clause),
            None => format!("{{class: {}, as: n}}", class),
        };

        let mut parts = vec![
            format!("MATCH {}", node),
            format!("RETURN {}", graph_projection(TARGET, self)?),
        ];
        if let Some(order) = graph_order_by(self)? {
            parts.push(order);
        }
        if let Some(n) = self.effective_offset() {
            parts.push(format!("SKIP {}", n));
        }
        if let Some(n) = self.limit {
            parts.push(format!("LIMIT {}", n));
        }

        Ok(format!("{};", parts.join(" ")))
    }
}

/// Field inside a `where:` block, relative to the bound node.
fn field(name: &str) -> UqlResult<String> {
    Ok(QualifiedName::parse(name, NameRules::STRICT)?.render(str::to_string))
}

/// OrientDB LIKE cannot escape `%`.
fn like_literal(cond: &Condition, prefix: &str, suffix: &str) -> UqlResult<String> {
    let text = cond.text_value()?;
    if text.contains('%') {
        return Err(UqlError::unsupported(
            TARGET,
            format!("'%' inside a '{}' value", cond.operator()),
        ));
    }
    Ok(graph_string(&format!("{}{}{}", prefix, text, suffix)))
}

/// Filter visitor producing OrientDB `where:` predicates.
pub struct OrientConditionVisitor;

impl FilterVisitor for OrientConditionVisitor {
    type Output = String;

    fn visit_condition(&mut self, cond: &Condition) -> UqlResult<String> {
        let f = field(cond.field())?;
        let value = cond.value();

        let sql = match cond.operator() {
            Operator::Eq if value.is_null() => format!("{} IS NULL", f),
            Operator::Neq if value.is_null() => format!("{} IS NOT NULL", f),
            Operator::Eq => format!("{} = {}", f, graph_literal(value)),
            Operator::Neq => format!("{} <> {}", f, graph_literal(value)),
            Operator::Gt => format!("{} > {}", f, graph_literal(value)),
            Operator::Gte => format!("{} >= {}", f, graph_literal(value)),
            Operator::Lt => format!("{} < {}", f, graph_literal(value)),
            Operator::Lte => format!("{} <= {}", f, graph_literal(value)),
            Operator::Exists => format!("{} IS NOT NULL", f),
            Operator::Nexists => format!("{} IS NULL", f),
            Operator::In => format!("{} IN {}", f, graph_list(cond.non_empty_list()?)),
            Operator::Nin => format!("{} NOT IN {}", f, graph_list(cond.non_empty_list()?)),
            Operator::Between => {
                let (low, high) = cond.bounds()?;
                format!("{} BETWEEN {} AND {}", f, graph_literal(low), graph_literal(high))
            }
            Operator::Contains => {
                format!("{} CONTAINSTEXT {}", f, graph_string(cond.text_value()?))
            }
            Operator::Ncontains => {
                format!("NOT ({} CONTAINSTEXT {})", f, graph_string(cond.text_value()?))
            }
            Operator::Icontains => format!(
                "{}.toLowerCase() CONTAINSTEXT {}",
                f,
                graph_string(&cond.text_value()?.to_lowercase())
            ),
            Operator::StartsWith => format!("{} LIKE {}", f, like_literal(cond, "", "%")?),
            Operator::EndsWith => format!("{} LIKE {}", f, like_literal(cond, "%", "")?),
            Operator::Ilike => format!(
                "{}.toLowerCase() LIKE {}",
                f,
                graph_string(&cond.text_value()?.to_lowercase())
            ),
            Operator::Regex => format!("{} MATCHES {}", f, graph_string(cond.text_value()?)),
            Operator::ArrayContains => format!("{} CONTAINS {}", f, graph_literal(value)),
            Operator::ArrayOverlap => {
                format!("{} CONTAINSANY {}", f, graph_list(cond.non_empty_list()?))
            }
            Operator::ArrayContained => {
                cond.non_empty_list()?;
                return Err(UqlError::unsupported(TARGET, "operator 'array_contained'"));
            }
            op @ (Operator::GeoWithin | Operator::GeoIntersects) => {
                return Err(UqlError::unsupported(TARGET, format!("operator '{op}'")));
            }
        };

        trace!(%sql, "orientdb condition");
        Ok(sql)
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

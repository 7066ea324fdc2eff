//! SELECT SQL generation.

use serde_json::Value;
use tracing::debug;

use crate::ast::Query;
use crate::error::UqlResult;
use crate::transpiler::conditions::{ParamContext, SqlConditionVisitor, quote_qualified};
use crate::transpiler::dialect::Dialect;
use crate::validator::NameRules;

/// Generate SELECT SQL with inlined literals.
pub fn build_select(query: &Query, dialect: Dialect) -> UqlResult<String> {
    render(query, dialect, None)
}

/// Generate SELECT SQL with placeholders, returning the bound values in order.
pub fn build_select_parameterized(
    query: &Query,
    dialect: Dialect,
) -> UqlResult<(String, Vec<Value>)> {
    let mut ctx = ParamContext::new();
    let sql = render(query, dialect, Some(&mut ctx))?;
    Ok((sql, ctx.params))
}

fn render(query: &Query, dialect: Dialect, params: Option<&mut ParamContext>) -> UqlResult<String> {
    let generator = dialect.generator();
    let generator = generator.as_ref();
    debug!(dialect = %dialect, from = %query.from, parameterized = params.is_some(), "building SELECT");

    let mut parts: Vec<String> = Vec::new();

    // Columns
    if query.selects_all() {
        parts.push("SELECT *".to_string());
    } else {
        let cols = query
            .select
            .iter()
            .map(|c| quote_qualified(c, NameRules::PROJECTION, generator))
            .collect::<UqlResult<Vec<_>>>()?;
        parts.push(format!("SELECT {}", cols.join(", ")));
    }

    // FROM
    parts.push(format!(
        "FROM {}",
        quote_qualified(&query.from, NameRules::STRICT, generator)?
    ));

    // WHERE: (must...) AND (NOT (x) AND NOT (y) ...)
    let mut visitor = SqlConditionVisitor::new(generator, params);
    let mut where_groups = Vec::new();
    if !query.must_clauses().is_empty() {
        let must = query
            .must_clauses()
            .iter()
            .map(|e| e.accept(&mut visitor))
            .collect::<UqlResult<Vec<_>>>()?;
        where_groups.push(format!("({})", must.join(" AND ")));
    }
    if !query.must_not_clauses().is_empty() {
        let must_not = query
            .must_not_clauses()
            .iter()
            .map(|e| -> UqlResult<String> { Ok(format!("NOT ({})", e.accept(&mut visitor)?)) })
            .collect::<UqlResult<Vec<_>>>()?;
        where_groups.push(format!("({})", must_not.join(" AND ")));
    }
    if !where_groups.is_empty() {
        parts.push(format!("WHERE {}", where_groups.join(" AND ")));
    }

    // ORDER BY
    if !query.order_by.is_empty() {
        let keys = query
            .order_by
            .iter()
            .map(|o| -> UqlResult<String> {
                let col = quote_qualified(&o.field, NameRules::STRICT, generator)?;
                Ok(format!("{} {}", col, o.order.as_sql()))
            })
            .collect::<UqlResult<Vec<_>>>()?;
        parts.push(format!("ORDER BY {}", keys.join(", ")));
    }

    // LIMIT / OFFSET
    let pagination = generator.limit_offset(
        query.limit,
        query.effective_offset(),
        !query.order_by.is_empty(),
    );
    if !pagination.is_empty() {
        parts.push(pagination);
    }

    Ok(format!("{};", parts.join(" ")))
}

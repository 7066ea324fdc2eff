use serde_json::Value;
use tracing::trace;

use super::traits::{SqlGenerator, escape_like};
use crate::ast::{AndExpr, Condition, FilterVisitor, NotExpr, Operator, OrExpr};
use crate::error::UqlResult;
use crate::validator::{NameRules, QualifiedName};

/// Context for parameterized query building.
#[derive(Debug, Default)]
pub struct ParamContext {
    /// Current parameter index (1-based for Postgres $1, $2, etc.)
    pub index: usize,
    /// Collected parameter values in order
    pub params: Vec<Value>,
}

impl ParamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value and return the placeholder for it.
    pub fn add_param(&mut self, value: Value, generator: &dyn SqlGenerator) -> String {
        self.index += 1;
        self.params.push(value);
        generator.placeholder(self.index)
    }
}

/// Render a dotted name with every segment quoted by the dialect.
pub fn quote_qualified(
    name: &str,
    rules: NameRules,
    generator: &dyn SqlGenerator,
) -> UqlResult<String> {
    Ok(QualifiedName::parse(name, rules)?.render(|s| generator.quote_identifier(s)))
}

/// Filter visitor producing SQL boolean expressions.
///
/// With a [`ParamContext`] attached, leaf values become placeholders and
/// are collected in order; without one they are inlined as escaped
/// literals.
pub struct SqlConditionVisitor<'a> {
    generator: &'a dyn SqlGenerator,
    params: Option<&'a mut ParamContext>,
}

impl<'a> SqlConditionVisitor<'a> {
    pub fn new(generator: &'a dyn SqlGenerator, params: Option<&'a mut ParamContext>) -> Self {
        Self { generator, params }
    }

    fn column(&self, field: &str) -> UqlResult<String> {
        quote_qualified(field, NameRules::STRICT, self.generator)
    }

    /// Inline literal for `value`, regardless of parameter mode.
    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.generator.bool_literal(*b),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.generator.string_literal(s),
            // nested structures travel as JSON text
            other => self.generator.string_literal(&other.to_string()),
        }
    }

    /// Operand for `value`: a placeholder in parameter mode, else a literal.
    /// NULL is always inlined.
    fn operand(&mut self, value: &Value) -> String {
        if value.is_null() {
            return "NULL".to_string();
        }
        if let Some(ctx) = self.params.as_deref_mut() {
            return ctx.add_param(value.clone(), self.generator);
        }
        self.literal(value)
    }

    fn operands(&mut self, values: &[Value]) -> Vec<String> {
        values.iter().map(|v| self.operand(v)).collect()
    }

    /// LIKE operand built from an escaped literal plus wildcards.
    fn like_operand(&mut self, prefix: &str, text: &str, suffix: &str) -> String {
        let pattern = format!("{}{}{}", prefix, escape_like(text), suffix);
        self.operand(&Value::String(pattern))
    }

    fn escape_clause(&self) -> String {
        format!("ESCAPE {}", self.generator.string_literal("\\"))
    }

    fn like(&mut self, col: &str, keyword: &str, cond: &Condition) -> UqlResult<String> {
        let text = cond.text_value()?;
        let (prefix, suffix) = match cond.operator() {
            Operator::StartsWith => ("", "%"),
            Operator::EndsWith => ("%", ""),
            _ => ("%", "%"),
        };
        let pattern = self.like_operand(prefix, text, suffix);
        Ok(format!("{} {} {} {}", col, keyword, pattern, self.escape_clause()))
    }
}

impl FilterVisitor for SqlConditionVisitor<'_> {
    type Output = String;

    fn visit_condition(&mut self, cond: &Condition) -> UqlResult<String> {
        let col = self.column(cond.field())?;
        let value = cond.value();

        let sql = match cond.operator() {
            Operator::Eq if value.is_null() => format!("{} IS NULL", col),
            Operator::Neq if value.is_null() => format!("{} IS NOT NULL", col),
            Operator::Eq => format!("{} = {}", col, self.operand(value)),
            Operator::Neq => format!("{} != {}", col, self.operand(value)),
            Operator::Gt => format!("{} > {}", col, self.operand(value)),
            Operator::Gte => format!("{} >= {}", col, self.operand(value)),
            Operator::Lt => format!("{} < {}", col, self.operand(value)),
            Operator::Lte => format!("{} <= {}", col, self.operand(value)),
            Operator::Exists => format!("{} IS NOT NULL", col),
            Operator::Nexists => format!("{} IS NULL", col),
            Operator::In => {
                let items = self.operands(cond.non_empty_list()?);
                format!("{} IN ({})", col, items.join(", "))
            }
            Operator::Nin => {
                let items = self.operands(cond.non_empty_list()?);
                format!("{} NOT IN ({})", col, items.join(", "))
            }
            Operator::Between => {
                let (low, high) = cond.bounds()?;
                let low = self.operand(low);
                let high = self.operand(high);
                format!("{} BETWEEN {} AND {}", col, low, high)
            }
            Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
                self.like(&col, "LIKE", cond)?
            }
            Operator::Ncontains => self.like(&col, "NOT LIKE", cond)?,
            Operator::Icontains => {
                let pattern = self.like_operand("%", cond.text_value()?, "%");
                format!(
                    "{} {}",
                    self.generator.case_insensitive_like(&col, &pattern),
                    self.escape_clause()
                )
            }
            Operator::Ilike => {
                let pattern = self.operand(value);
                self.generator.case_insensitive_like(&col, &pattern)
            }
            Operator::Regex => {
                let pattern = self.operand(value);
                self.generator.regex_match(&col, &pattern)?
            }
            Operator::ArrayContains => {
                let item = self.operand(value);
                self.generator
                    .array_condition(Operator::ArrayContains, &col, &[item])?
            }
            op @ (Operator::ArrayOverlap | Operator::ArrayContained) => {
                let items = self.operands(cond.non_empty_list()?);
                self.generator.array_condition(op, &col, &items)?
            }
            op @ (Operator::GeoWithin | Operator::GeoIntersects) => {
                let geojson = self.operand(&Value::String(serde_json::to_string(value)?));
                self.generator.geo_condition(op, &col, &geojson)?
            }
        };

        trace!(dialect = self.generator.name(), %sql, "condition");
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

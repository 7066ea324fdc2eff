use crate::ast::Operator;
use crate::error::{UqlError, UqlResult};
use crate::transpiler::traits::SqlGenerator;

/// PostgreSQL generator (default dialect).
pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "TRUE".to_string() } else { "FALSE".to_string() }
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn case_insensitive_like(&self, col: &str, pattern: &str) -> String {
        format!("{} ILIKE {}", col, pattern)
    }

    fn regex_match(&self, col: &str, pattern: &str) -> UqlResult<String> {
        Ok(format!("{} ~ {}", col, pattern))
    }

    fn array_condition(&self, op: Operator, col: &str, values: &[String]) -> UqlResult<String> {
        match op {
            Operator::ArrayContains => Ok(format!("{} = ANY({})", values.join(", "), col)),
            Operator::ArrayOverlap => Ok(format!("{} && ARRAY[{}]", col, values.join(", "))),
            Operator::ArrayContained => Ok(format!("{} <@ ARRAY[{}]", col, values.join(", "))),
            other => Err(UqlError::unsupported(self.name(), format!("operator '{other}'"))),
        }
    }
}

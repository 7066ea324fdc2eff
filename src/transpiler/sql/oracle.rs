use super::super::traits::SqlGenerator;
use crate::error::UqlResult;

pub struct OracleGenerator;

impl SqlGenerator for OracleGenerator {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn quote_identifier(&self, id: &str) -> String {
        format!("\"{}\"", id.replace('"', "\"\""))
    }

    fn placeholder(&self, index: usize) -> String {
        // 1-based positional binds
        format!(":{}", index)
    }

    fn regex_match(&self, col: &str, pattern: &str) -> UqlResult<String> {
        Ok(format!("REGEXP_LIKE({}, {})", col, pattern))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, _has_order: bool) -> String {
        // 12c row-limiting clause
        match (limit, offset) {
            (Some(n), Some(m)) => format!("OFFSET {} ROWS FETCH NEXT {} ROWS ONLY", m, n),
            (Some(n), None) => format!("FETCH FIRST {} ROWS ONLY", n),
            (None, Some(m)) => format!("OFFSET {} ROWS", m),
            (None, None) => String::new(),
        }
    }
}

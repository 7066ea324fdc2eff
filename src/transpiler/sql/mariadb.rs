use super::mysql::{comma_limit, json_array_condition, spatial_condition};
use crate::ast::Operator;
use crate::error::UqlResult;
use crate::transpiler::traits::SqlGenerator;

/// MariaDB shares MySQL's quoting, escaping and pagination.
pub struct MariaDbGenerator;

impl SqlGenerator for MariaDbGenerator {
    fn name(&self) -> &'static str {
        "MariaDB"
    }

    fn quote_identifier(&self, id: &str) -> String {
        format!("`{}`", id.replace('`', "``"))
    }

    fn escape_string(&self, s: &str) -> String {
        s.replace('\\', "\\\\").replace('\'', "''")
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn regex_match(&self, col: &str, pattern: &str) -> UqlResult<String> {
        Ok(format!("{} REGEXP {}", col, pattern))
    }

    fn array_condition(&self, op: Operator, col: &str, values: &[String]) -> UqlResult<String> {
        json_array_condition(self.name(), op, col, values)
    }

    fn geo_condition(&self, op: Operator, col: &str, geojson: &str) -> UqlResult<String> {
        spatial_condition(self.name(), op, col, geojson)
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, _has_order: bool) -> String {
        comma_limit(limit, offset)
    }
}

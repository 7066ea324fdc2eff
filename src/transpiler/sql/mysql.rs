use crate::ast::Operator;
use crate::error::{UqlError, UqlResult};
use crate::transpiler::traits::SqlGenerator;

/// MySQL Generator.
pub struct MysqlGenerator;

/// `LIMIT m, n` needs a row count; this is the documented "all rows" value.
const MAX_ROWS: &str = "18446744073709551615";

impl SqlGenerator for MysqlGenerator {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn escape_string(&self, s: &str) -> String {
        // backslash is an escape character inside MySQL string literals
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

/// JSON-array predicates shared by MySQL and MariaDB.
pub(crate) fn json_array_condition(
    target: &'static str,
    op: Operator,
    col: &str,
    values: &[String],
) -> UqlResult<String> {
    let array = format!("JSON_ARRAY({})", values.join(", "));
    match op {
        Operator::ArrayContains => Ok(format!("JSON_CONTAINS({}, {})", col, array)),
        Operator::ArrayOverlap => Ok(format!("JSON_OVERLAPS({}, {})", col, array)),
        Operator::ArrayContained => Ok(format!("JSON_CONTAINS({}, {})", array, col)),
        other => Err(UqlError::unsupported(target, format!("operator '{other}'"))),
    }
}

pub(crate) fn spatial_condition(
    target: &'static str,
    op: Operator,
    col: &str,
    geojson: &str,
) -> UqlResult<String> {
    let func = match op {
        Operator::GeoWithin => "ST_Within",
        Operator::GeoIntersects => "ST_Intersects",
        other => return Err(UqlError::unsupported(target, format!("operator '{other}'"))),
    };
    Ok(format!("{}({}, ST_GeomFromGeoJSON({}))", func, col, geojson))
}

/// `LIMIT n`, `LIMIT m, n`, or `LIMIT m, <max>` when only an offset is given.
pub(crate) fn comma_limit(limit: Option<u64>, offset: Option<u64>) -> String {
    match (limit, offset) {
        (Some(n), Some(m)) => format!("LIMIT {}, {}", m, n),
        (Some(n), None) => format!("LIMIT {}", n),
        (None, Some(m)) => format!("LIMIT {}, {}", m, MAX_ROWS),
        (None, None) => String::new(),
    }
}

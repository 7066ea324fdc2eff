//! Transpiler traits and utilities.

use crate::ast::Operator;
use crate::error::{UqlError, UqlResult};

/// Escape `\`, `%` and `_` so a literal can sit inside a LIKE pattern
/// whose escape character is `\`.
pub fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Trait for dialect-specific SQL generation.
///
/// The shared engine in `dml::select` and `conditions` does the clause
/// assembly; a dialect overrides only the hooks where it differs.
pub trait SqlGenerator {
    /// Human-readable dialect name used in error messages.
    fn name(&self) -> &'static str;

    /// Quote a single identifier segment (no dots).
    fn quote_identifier(&self, name: &str) -> String;

    /// Escape the body of a single-quoted string literal.
    fn escape_string(&self, s: &str) -> String {
        s.replace('\'', "''")
    }

    /// A complete string literal, quotes included.
    fn string_literal(&self, s: &str) -> String {
        format!("'{}'", self.escape_string(s))
    }

    /// Get the boolean literal (TRUE/FALSE vs 1/0).
    fn bool_literal(&self, val: bool) -> String {
        if val { "1".to_string() } else { "0".to_string() }
    }

    /// Generate the parameter placeholder (e.g., $1, ?, @p1) for a given index.
    fn placeholder(&self, index: usize) -> String;

    /// Case-insensitive LIKE. `pattern` is an already-rendered SQL operand.
    fn case_insensitive_like(&self, col: &str, pattern: &str) -> String {
        format!("LOWER({}) LIKE LOWER({})", col, pattern)
    }

    fn regex_match(&self, _col: &str, _pattern: &str) -> UqlResult<String> {
        Err(UqlError::unsupported(self.name(), "operator 'regex'"))
    }

    /// Array membership operators. `values` are rendered operands; for
    /// `array_contains` there is exactly one.
    fn array_condition(&self, op: Operator, _col: &str, _values: &[String]) -> UqlResult<String> {
        Err(UqlError::unsupported(self.name(), format!("operator '{op}'")))
    }

    /// Geo operators. `geojson` is a rendered operand holding GeoJSON text.
    fn geo_condition(&self, op: Operator, _col: &str, _geojson: &str) -> UqlResult<String> {
        Err(UqlError::unsupported(self.name(), format!("operator '{op}'")))
    }

    /// Trailing pagination clause, or an empty string. `offset` is already
    /// `None` when zero.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, _has_order: bool) -> String {
        match (limit, offset) {
            (Some(n), Some(m)) => format!("LIMIT {} OFFSET {}", n, m),
            (Some(n), None) => format!("LIMIT {}", n),
            (None, Some(m)) => format!("OFFSET {}", m),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_backslash_first() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}

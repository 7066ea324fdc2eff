use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::UqlError;

/// Comparison, membership, string, array and geo operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
    Nexists,
    Between,
    Contains,
    Ncontains,
    Icontains,
    StartsWith,
    EndsWith,
    Ilike,
    Regex,
    ArrayContains,
    ArrayOverlap,
    ArrayContained,
    GeoWithin,
    GeoIntersects,
}

/// What a condition's value must look like for a given operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Any JSON value.
    Any,
    /// Value is ignored and stored as null.
    Nothing,
    List,
    Pair,
    Text,
    Object,
}

impl Operator {
    pub const ALL: [Operator; 23] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::Nin,
        Operator::Exists,
        Operator::Nexists,
        Operator::Between,
        Operator::Contains,
        Operator::Ncontains,
        Operator::Icontains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Ilike,
        Operator::Regex,
        Operator::ArrayContains,
        Operator::ArrayOverlap,
        Operator::ArrayContained,
        Operator::GeoWithin,
        Operator::GeoIntersects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::Exists => "exists",
            Operator::Nexists => "nexists",
            Operator::Between => "between",
            Operator::Contains => "contains",
            Operator::Ncontains => "ncontains",
            Operator::Icontains => "icontains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Ilike => "ilike",
            Operator::Regex => "regex",
            Operator::ArrayContains => "array_contains",
            Operator::ArrayOverlap => "array_overlap",
            Operator::ArrayContained => "array_contained",
            Operator::GeoWithin => "geo_within",
            Operator::GeoIntersects => "geo_intersects",
        }
    }

    /// The value shape this operator accepts.
    pub fn value_shape(&self) -> ValueShape {
        match self {
            Operator::Exists | Operator::Nexists => ValueShape::Nothing,
            Operator::In | Operator::Nin | Operator::ArrayOverlap | Operator::ArrayContained => {
                ValueShape::List
            }
            Operator::Between => ValueShape::Pair,
            Operator::Contains
            | Operator::Ncontains
            | Operator::Icontains
            | Operator::StartsWith
            | Operator::EndsWith
            | Operator::Ilike
            | Operator::Regex => ValueShape::Text,
            Operator::GeoWithin | Operator::GeoIntersects => ValueShape::Object,
            Operator::Eq
            | Operator::Neq
            | Operator::Gt
            | Operator::Gte
            | Operator::Lt
            | Operator::Lte
            | Operator::ArrayContains => ValueShape::Any,
        }
    }

    /// The operator matching exactly the complement of this one, if any.
    ///
    /// Only pairs whose meaning is preserved under negation are listed;
    /// `gt` inverts to `lte` and so on.
    pub fn inverse(&self) -> Option<Operator> {
        match self {
            Operator::Eq => Some(Operator::Neq),
            Operator::Neq => Some(Operator::Eq),
            Operator::Gt => Some(Operator::Lte),
            Operator::Gte => Some(Operator::Lt),
            Operator::Lt => Some(Operator::Gte),
            Operator::Lte => Some(Operator::Gt),
            Operator::In => Some(Operator::Nin),
            Operator::Nin => Some(Operator::In),
            Operator::Exists => Some(Operator::Nexists),
            Operator::Nexists => Some(Operator::Exists),
            Operator::Contains => Some(Operator::Ncontains),
            Operator::Ncontains => Some(Operator::Contains),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = UqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UqlError::UnknownOperator(s.to_string()))
    }
}

/// Optional hint about a field's value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Datetime,
    Array,
    Object,
    Unknown,
}

impl FromStr for FieldType {
    type Err = UqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "date" => Ok(FieldType::Date),
            "datetime" => Ok(FieldType::Datetime),
            "array" => Ok(FieldType::Array),
            "object" => Ok(FieldType::Object),
            "unknown" => Ok(FieldType::Unknown),
            other => Err(UqlError::Validation(format!("unknown field type '{other}'"))),
        }
    }
}

/// Sort direction for `orderBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// `1` / `-1`, as document stores expect.
    pub fn as_sign(&self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_strings_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, serde_json::Value::String(op.as_str().to_string()));
        }
    }

    #[test]
    fn test_unknown_operator() {
        assert!(matches!(
            "like".parse::<Operator>(),
            Err(UqlError::UnknownOperator(s)) if s == "like"
        ));
    }

    #[test]
    fn test_inverse_pairs_are_symmetric() {
        for op in Operator::ALL {
            if let Some(inv) = op.inverse() {
                assert_eq!(inv.inverse(), Some(op), "{op} <-> {inv}");
            }
        }
        assert_eq!(Operator::Regex.inverse(), None);
        assert_eq!(Operator::Between.inverse(), None);
    }

    #[test]
    fn test_sort_order_serde() {
        let asc: SortOrder = serde_json::from_str("\"ASC\"").unwrap();
        assert_eq!(asc, SortOrder::Asc);
        let desc: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(desc, SortOrder::Desc);
        assert!(serde_json::from_str::<SortOrder>("\"UP\"").is_err());
    }
}

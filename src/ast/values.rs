//! Condition values.
//!
//! Values are stored as `serde_json::Value` so every node stays
//! transport-safe. `FilterValue` is the conversion funnel used by the
//! builders: temporal types become ISO-8601 strings on the way in, even
//! when nested inside lists or maps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Display;

/// A JSON-compatible condition value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValue(Value);

impl FilterValue {
    pub fn null() -> Self {
        Self(Value::Null)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<FilterValue> for Value {
    fn from(v: FilterValue) -> Self {
        v.0
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        Self(v)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self(Value::String(s))
    }
}

impl From<&String> for FilterValue {
    fn from(s: &String) -> Self {
        Self(Value::String(s.clone()))
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self(Value::Bool(b))
    }
}

macro_rules! number_into_filter_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(n: $t) -> Self {
                    Self(Value::from(n))
                }
            }
        )*
    };
}

number_into_filter_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<NaiveDate> for FilterValue {
    fn from(d: NaiveDate) -> Self {
        Self(Value::String(d.format("%Y-%m-%d").to_string()))
    }
}

impl From<NaiveTime> for FilterValue {
    fn from(t: NaiveTime) -> Self {
        Self(Value::String(t.format("%H:%M:%S%.f").to_string()))
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self(Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
    }
}

impl<Tz> From<DateTime<Tz>> for FilterValue
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn from(dt: DateTime<Tz>) -> Self {
        Self(Value::String(dt.to_rfc3339()))
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_else(FilterValue::null)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        Self(Value::Array(
            items.into_iter().map(|v| v.into().into_inner()).collect(),
        ))
    }
}

impl<T: Into<FilterValue>, const N: usize> From<[T; N]> for FilterValue {
    fn from(items: [T; N]) -> Self {
        Self(Value::Array(
            items.into_iter().map(|v| v.into().into_inner()).collect(),
        ))
    }
}

impl<T: Into<FilterValue>> From<BTreeMap<String, T>> for FilterValue {
    fn from(entries: BTreeMap<String, T>) -> Self {
        let map: Map<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k, v.into().into_inner()))
            .collect();
        Self(Value::Object(map))
    }
}

/// Short human-readable name of a JSON value's kind, for error messages.
pub fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_dates_become_iso_strings() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(FilterValue::from(d).into_inner(), Value::from("2024-01-02"));

        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            FilterValue::from(dt).into_inner(),
            Value::from("2024-01-02T03:04:05+00:00")
        );

        let naive = d.and_hms_opt(3, 4, 5).unwrap();
        assert_eq!(
            FilterValue::from(naive).into_inner(),
            Value::from("2024-01-02T03:04:05")
        );
    }

    #[test]
    fn test_nested_dates_in_lists() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let v = FilterValue::from(vec![d, d]).into_inner();
        assert_eq!(v, serde_json::json!(["2024-01-02", "2024-01-02"]));
    }

    #[test]
    fn test_option_none_is_null() {
        assert_eq!(FilterValue::from(None::<i32>).into_inner(), Value::Null);
        assert_eq!(FilterValue::from(Some(3)).into_inner(), Value::from(3));
    }
}

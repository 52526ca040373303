//! Values flowing through a filter chain.
//!
//! Raw input enters a chain as `Text`, `List` or `Null`. Filters may convert
//! it to a richer shape (a number, a date) that later filters in the chain and
//! record population work with.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A value at some point of a filter chain.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// `Null`, an empty string, or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Empty, or text holding only whitespace. Typed filters read a blank
    /// form input as absent.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            other => other.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Date(_) => "date",
            FieldValue::Time(_) => "time",
            FieldValue::List(_) => "list",
        }
    }

    /// Apply `f` to text, or to every text element of a list. Other values
    /// pass through untouched.
    pub fn map_text(self, f: impl Fn(&str) -> String) -> FieldValue {
        self.map_text_dyn(&f)
    }

    fn map_text_dyn(self, f: &dyn Fn(&str) -> String) -> FieldValue {
        match self {
            FieldValue::Text(s) => FieldValue::Text(f(&s)),
            FieldValue::List(items) => {
                FieldValue::List(items.into_iter().map(|v| v.map_text_dyn(f)).collect())
            }
            other => other,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Float(n) => write!(f, "{n}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            FieldValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(n) => serializer.serialize_i64(*n),
            FieldValue::Float(n) => serializer.serialize_f64(*n),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            FieldValue::Time(t) => serializer.serialize_str(&t.format("%H:%M:%S").to_string()),
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::from(" ").is_empty());
        assert!(!FieldValue::Integer(0).is_empty());
        assert!(FieldValue::from("  ").is_blank());
        assert!(FieldValue::Null.is_blank());
        assert!(!FieldValue::from(" x ").is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
    }

    #[test]
    fn serializes_dates_and_times_as_iso_strings() {
        let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let time = FieldValue::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(serde_json::to_value(&date).unwrap(), json!("2024-02-29"));
        assert_eq!(serde_json::to_value(&time).unwrap(), json!("08:30:00"));
    }

    #[test]
    fn serializes_lists_and_scalars() {
        let value = FieldValue::List(vec![
            FieldValue::Integer(3),
            FieldValue::Float(1.5),
            FieldValue::Bool(true),
            FieldValue::Null,
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!([3, 1.5, true, null])
        );
    }

    #[test]
    fn displays_like_it_serializes() {
        let value = FieldValue::List(vec![FieldValue::Integer(4), "x".into(), FieldValue::Null]);
        assert_eq!(value.to_string(), "4, x, ");
        let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(date.to_string(), "2024-02-29");
    }

    #[test]
    fn map_text_reaches_list_elements() {
        let value = FieldValue::List(vec![" a ".into(), FieldValue::Integer(1)]);
        let mapped = value.map_text(|s| s.trim().to_string());
        assert_eq!(
            mapped,
            FieldValue::List(vec!["a".into(), FieldValue::Integer(1)])
        );
    }
}

use crate::filter::{Filter, FilterError};
use crate::value::FieldValue;

pub struct Trim;

impl Filter for Trim {
    fn description(&self) -> &'static str {
        "Strip leading and trailing whitespace"
    }

    fn apply(
        &self,
        _label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        Ok(value.map_text(|s| s.trim().to_string()))
    }
}

pub struct Lower;

impl Filter for Lower {
    fn description(&self) -> &'static str {
        "Convert to lower case"
    }

    fn apply(
        &self,
        _label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        Ok(value.map_text(str::to_lowercase))
    }
}

pub struct Upper;

impl Filter for Upper {
    fn description(&self) -> &'static str {
        "Convert to upper case"
    }

    fn apply(
        &self,
        _label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        Ok(value.map_text(str::to_uppercase))
    }
}

/// `"  jOHN   o'neil "` becomes `"John O'neil"`.
pub struct Capitalize;

impl Filter for Capitalize {
    fn description(&self) -> &'static str {
        "Lower-case, collapse whitespace and capitalize each word"
    }

    fn apply(
        &self,
        _label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        Ok(value.map_text(capitalize))
    }
}

fn capitalize(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checkbox style booleans. An absent value is `false`.
pub struct Bool;

impl Filter for Bool {
    fn description(&self) -> &'static str {
        "Boolean: true/on/yes/1 or false/off/no/0, absent is false"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        match value {
            FieldValue::Bool(_) => Ok(value),
            FieldValue::Null => Ok(FieldValue::Bool(false)),
            FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "false" | "off" | "no" | "0" => Ok(FieldValue::Bool(false)),
                "true" | "on" | "yes" | "1" => Ok(FieldValue::Bool(true)),
                _ => Err(FilterError::rejected(format!(
                    "{label} must be a valid boolean value"
                ))),
            },
            FieldValue::Integer(0) => Ok(FieldValue::Bool(false)),
            FieldValue::Integer(1) => Ok(FieldValue::Bool(true)),
            _ => Err(FilterError::rejected(format!(
                "{label} must be a valid boolean value"
            ))),
        }
    }
}

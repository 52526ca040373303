use crate::filter::{Filter, FilterError};
use crate::filters::{group_thousands, parse_arg};
use crate::value::FieldValue;

/// Rejects absent and empty values.
pub struct Required;

impl Filter for Required {
    fn description(&self) -> &'static str {
        "Value must be present and not empty"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        if value.is_empty() {
            Err(FilterError::rejected(format!("{label} field is required")))
        } else {
            Ok(value)
        }
    }
}

/// Bounds the character count of text or the item count of a list.
pub struct Length;

impl Length {
    fn bounds(args: &[String]) -> Result<(i64, i64), String> {
        let min: i64 = parse_arg(args, 0, "minimum")?;
        let max: i64 = parse_arg(args, 1, "maximum")?;
        if min < 0 {
            return Err(format!("minimum length {min} is negative"));
        }
        if max < min {
            return Err(format!("maximum length {max} is below minimum {min}"));
        }
        Ok((min, max))
    }
}

impl Filter for Length {
    fn description(&self) -> &'static str {
        "Text length or item count within (min,max)"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        Self::bounds(args).map(|_| ())
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        let (min, max) = Self::bounds(args).map_err(FilterError::Misconfigured)?;
        let within = |n: usize| (min..=max).contains(&(n as i64));
        match &value {
            FieldValue::Null => Ok(value),
            FieldValue::Text(s) if s.is_empty() => Ok(value),
            FieldValue::Text(s) if within(s.chars().count()) => Ok(value),
            FieldValue::Text(_) => Err(FilterError::rejected(format!(
                "{label} must be within {} and {} characters long",
                group_thousands(min),
                group_thousands(max)
            ))),
            FieldValue::List(items) if within(items.len()) => Ok(value),
            FieldValue::List(_) => Err(FilterError::rejected(format!(
                "{label} field must contain at least {} items and no more than {}.",
                group_thousands(min),
                group_thousands(max)
            ))),
            other => Err(FilterError::misconfigured(format!(
                "length applies to text or lists, got {}",
                other.kind()
            ))),
        }
    }
}

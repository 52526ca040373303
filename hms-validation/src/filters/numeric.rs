use crate::filter::{Filter, FilterError};
use crate::filters::parse_arg;
use crate::value::FieldValue;

/// `input` with its `,` thousands separators removed, `None` when they are
/// misplaced (`1,,2`, `,5`, `12,34`).
fn strip_grouping(input: &str) -> Option<String> {
    let input = input.trim();
    if !input.contains(',') {
        return Some(input.to_string());
    }

    let unsigned = input.trim_start_matches(['+', '-']);
    let sign = &input[..input.len() - unsigned.len()];
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |group: &str| group.chars().all(|c| c.is_ascii_digit());

    let mut groups = whole.split(',');
    let lead = groups.next()?;
    if !(1..=3).contains(&lead.len()) || !digits(lead) {
        return None;
    }
    let mut out = format!("{sign}{lead}");
    for group in groups {
        if group.len() != 3 || !digits(group) {
            return None;
        }
        out.push_str(group);
    }
    if let Some(fraction) = fraction {
        if fraction.contains(',') {
            return None;
        }
        out.push('.');
        out.push_str(fraction);
    }
    Some(out)
}

/// Parse a whole number, allowing `,` thousands separators.
pub(crate) fn parse_integer(input: &str) -> Option<i64> {
    strip_grouping(input)?.parse().ok()
}

/// Parse a finite decimal number, allowing `,` thousands separators.
pub(crate) fn parse_decimal(input: &str) -> Option<f64> {
    strip_grouping(input)?
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// The numeric reading of a value: numbers as-is, text parsed.
fn numeric(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Text(s) => parse_decimal(s),
        other => other.as_f64(),
    }
}

/// Whole numbers. `int` is bounded to 32 bits, `long` to 64.
pub struct Integer {
    description: &'static str,
    min: i64,
    max: i64,
}

impl Integer {
    pub const fn int() -> Self {
        Self {
            description: "32-bit whole number",
            min: i32::MIN as i64,
            max: i32::MAX as i64,
        }
    }

    pub const fn long() -> Self {
        Self {
            description: "64-bit whole number",
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    fn convert(&self, value: &FieldValue) -> Option<i64> {
        let n = match value {
            FieldValue::Integer(n) => *n,
            FieldValue::Text(s) => parse_integer(s)?,
            _ => return None,
        };
        (self.min..=self.max).contains(&n).then_some(n)
    }
}

impl Filter for Integer {
    fn description(&self) -> &'static str {
        self.description
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        if value.is_blank() {
            return Ok(FieldValue::Null);
        }
        self.convert(&value)
            .map(FieldValue::Integer)
            .ok_or_else(|| FilterError::rejected(format!("{label} must be a valid whole number")))
    }
}

pub struct Double;

impl Filter for Double {
    fn description(&self) -> &'static str {
        "Decimal number"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        if value.is_blank() {
            return Ok(FieldValue::Null);
        }
        let n = match &value {
            FieldValue::Float(n) => Some(*n),
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Text(s) => parse_decimal(s),
            _ => None,
        };
        n.map(FieldValue::Float)
            .ok_or_else(|| FilterError::rejected(format!("{label} must be a valid numeric value")))
    }
}

/// Exact decimal, e.g. a price. The value stays text, normalized to plain
/// digits (`1,250.50` becomes `1250.50`), so no precision is lost.
pub struct Decimal;

impl Decimal {
    fn normalize(input: &str) -> Option<String> {
        let cleaned = strip_grouping(input)?;
        let unsigned = cleaned.strip_prefix(['+', '-']).unwrap_or(&cleaned);
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        let well_formed = !(whole.is_empty() && fraction.is_empty())
            && digits(whole)
            && digits(fraction)
            && !unsigned.ends_with('.');
        well_formed.then(|| cleaned.strip_prefix('+').unwrap_or(&cleaned).to_string())
    }
}

impl Filter for Decimal {
    fn description(&self) -> &'static str {
        "Exact decimal number, kept as text"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        if value.is_blank() {
            return Ok(FieldValue::Null);
        }
        let normalized = match &value {
            FieldValue::Text(s) => Self::normalize(s),
            FieldValue::Integer(n) => Some(n.to_string()),
            _ => None,
        };
        normalized
            .map(FieldValue::Text)
            .ok_or_else(|| FilterError::rejected(format!("{label} must be a valid numeric value")))
    }
}

/// A multi-valued field of whole numbers, e.g. a checkbox group of ids.
///
/// Duplicates are dropped, keeping the first occurrence.
pub struct LongArray;

impl Filter for LongArray {
    fn description(&self) -> &'static str {
        "List of whole numbers, duplicates removed"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        let items = match value {
            FieldValue::Null => return Ok(FieldValue::Null),
            FieldValue::List(items) => items,
            single => vec![single],
        };

        let mut numbers: Vec<i64> = Vec::with_capacity(items.len());
        for item in &items {
            let n = match item {
                FieldValue::Integer(n) => Some(*n),
                FieldValue::Text(s) => parse_integer(s),
                _ => None,
            }
            .ok_or_else(|| {
                FilterError::rejected(format!(
                    "One of the values contained in the {label} field is not a valid number"
                ))
            })?;
            if !numbers.contains(&n) {
                numbers.push(n);
            }
        }
        Ok(FieldValue::List(
            numbers.into_iter().map(FieldValue::Integer).collect(),
        ))
    }
}

/// Zero or greater.
pub struct Positive;

impl Filter for Positive {
    fn description(&self) -> &'static str {
        "Number greater than or equal to zero"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        if value.is_empty() {
            return Ok(value);
        }
        match numeric(&value) {
            Some(n) if n >= 0.0 => Ok(value),
            _ => Err(FilterError::rejected(format!(
                "{label} must be a positive number"
            ))),
        }
    }
}

/// Number within `(min,max)` inclusive.
pub struct Range;

impl Range {
    fn bounds(args: &[String]) -> Result<(f64, f64), String> {
        let min: f64 = parse_arg(args, 0, "minimum")?;
        let max: f64 = parse_arg(args, 1, "maximum")?;
        if !min.is_finite() || !max.is_finite() {
            return Err(format!("bounds ({min},{max}) must be finite numbers"));
        }
        if min > max {
            return Err(format!("lower bound {min} is above upper bound {max}"));
        }
        Ok((min, max))
    }
}

impl Filter for Range {
    fn description(&self) -> &'static str {
        "Number within (min,max) inclusive"
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
        if value.is_empty() {
            return Ok(value);
        }
        let within = numeric(&value).is_some_and(|n| (min..=max).contains(&n));
        if within {
            return Ok(value);
        }
        // Whole-number fields print bounds as written, e.g. `0` and `500`.
        let message = match value {
            FieldValue::Integer(_) => format!("{label} must be between {min} and {max}."),
            _ => format!("{label} must be between {min:.2} and {max:.2}."),
        };
        Err(FilterError::rejected(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_long_parses_with_grouping_and_sign() {
        let long = Integer::long();
        assert_eq!(long.apply("Qty", "1,250".into(), &[]), Ok(FieldValue::Integer(1250)));
        assert_eq!(long.apply("Qty", " -5 ".into(), &[]), Ok(FieldValue::Integer(-5)));
        assert_eq!(
            long.apply("Qty", "-1,000,000".into(), &[]),
            Ok(FieldValue::Integer(-1_000_000))
        );
        assert_eq!(
            long.apply("Qty", "12a".into(), &[]),
            Err(FilterError::rejected("Qty must be a valid whole number"))
        );
        assert_eq!(long.apply("Qty", FieldValue::Null, &[]), Ok(FieldValue::Null));
    }

    #[test]
    fn test_misplaced_grouping_is_rejected() {
        let long = Integer::long();
        for input in ["1,,2", ",5", "5,", "12,34", "1,2345", "1,234,56"] {
            assert!(long.apply("Qty", input.into(), &[]).is_err(), "{input} was accepted");
        }
        assert_eq!(parse_decimal("1,234.5"), Some(1234.5));
        assert_eq!(parse_decimal("1,23.5"), None);
        assert_eq!(parse_decimal("1,234.5,6"), None);
    }

    #[test]
    fn test_blank_numbers_become_null() {
        for blank in ["", "   "] {
            assert_eq!(Integer::int().apply("Rate", blank.into(), &[]), Ok(FieldValue::Null));
            assert_eq!(Double.apply("Weight", blank.into(), &[]), Ok(FieldValue::Null));
            assert_eq!(Decimal.apply("Price", blank.into(), &[]), Ok(FieldValue::Null));
        }
    }

    #[test]
    fn test_int_is_bounded_to_32_bits() {
        let int = Integer::int();
        assert!(int.apply("Rate", "2147483647".into(), &[]).is_ok());
        assert!(int.apply("Rate", "2147483648".into(), &[]).is_err());
        assert!(Integer::long().apply("Rate", "2147483648".into(), &[]).is_ok());
    }

    #[test]
    fn test_double() {
        assert_eq!(Double.apply("Price", "12.50".into(), &[]), Ok(FieldValue::Float(12.5)));
        assert_eq!(Double.apply("Price", FieldValue::Integer(3), &[]), Ok(FieldValue::Float(3.0)));
        assert_eq!(
            Double.apply("Price", "NaN".into(), &[]),
            Err(FilterError::rejected("Price must be a valid numeric value"))
        );
    }

    #[test]
    fn test_decimal_keeps_exact_digits() {
        assert_eq!(Decimal.apply("Price", "1,250.50".into(), &[]), Ok("1250.50".into()));
        assert_eq!(
            Decimal.apply("Price", "0.10000000000000000001".into(), &[]),
            Ok("0.10000000000000000001".into())
        );
        assert_eq!(Decimal.apply("Price", "+.5".into(), &[]), Ok(".5".into()));
        assert_eq!(Decimal.apply("Price", "-3".into(), &[]), Ok("-3".into()));
        assert_eq!(Decimal.apply("Price", FieldValue::Integer(7), &[]), Ok("7".into()));
        for bad in ["1e5", "12.", ".", "1.2.3", "abc", "--1"] {
            assert_eq!(
                Decimal.apply("Price", bad.into(), &[]),
                Err(FilterError::rejected("Price must be a valid numeric value")),
                "{bad} was accepted"
            );
        }
    }

    #[test]
    fn test_long_array_dedupes_in_order() {
        let list = FieldValue::List(vec!["3".into(), "1".into(), "3".into(), "2".into()]);
        assert_eq!(
            LongArray.apply("Drugs", list, &[]),
            Ok(FieldValue::List(vec![
                FieldValue::Integer(3),
                FieldValue::Integer(1),
                FieldValue::Integer(2),
            ]))
        );
        assert_eq!(
            LongArray.apply("Drugs", FieldValue::List(vec!["x".into()]), &[]),
            Err(FilterError::rejected(
                "One of the values contained in the Drugs field is not a valid number"
            ))
        );
        assert_eq!(
            LongArray.apply("Drugs", "7".into(), &[]),
            Ok(FieldValue::List(vec![FieldValue::Integer(7)]))
        );
    }

    #[test]
    fn test_positive_accepts_zero() {
        assert!(Positive.apply("Qty", FieldValue::Integer(0), &[]).is_ok());
        assert!(Positive.apply("Price", FieldValue::Float(0.5), &[]).is_ok());
        assert_eq!(
            Positive.apply("Qty", FieldValue::Integer(-5), &[]),
            Err(FilterError::rejected("Qty must be a positive number"))
        );
    }

    #[test]
    fn test_range_messages() {
        let bounds = args(&["0", "500"]);
        assert!(Range.apply("Heart rate", FieldValue::Integer(72), &bounds).is_ok());
        assert_eq!(
            Range.apply("Heart rate", FieldValue::Integer(501), &bounds),
            Err(FilterError::rejected("Heart rate must be between 0 and 500."))
        );
        assert_eq!(
            Range.apply("Weight", FieldValue::Float(0.5), &args(&["1", "500"])),
            Err(FilterError::rejected("Weight must be between 1.00 and 500.00."))
        );
    }

    #[test]
    fn test_range_keeps_fractional_bounds_in_whole_number_message() {
        assert_eq!(
            Range.apply("Dose", FieldValue::Integer(3), &args(&["0.5", "2.5"])),
            Err(FilterError::rejected("Dose must be between 0.5 and 2.5."))
        );
    }

    #[test]
    fn test_range_arguments_are_checked() {
        assert!(Range.check_args(&args(&["1", "2"])).is_ok());
        assert!(Range.check_args(&args(&["2", "1"])).is_err());
        assert!(Range.check_args(&args(&["1"])).is_err());
        assert!(Range.check_args(&args(&["nan", "5"])).is_err());
        assert!(Range.check_args(&args(&["0", "inf"])).is_err());
    }
}

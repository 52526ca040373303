use std::marker::PhantomData;

use crate::filter::{Filter, FilterError};
use crate::hospital::{is_country_code, Choice, SubjectType};
use crate::value::FieldValue;

/// Accepts one of the variants of a hospital enumeration, case-insensitively,
/// and normalizes the value to the canonical variant name.
pub struct ChoiceFilter<E> {
    message: &'static str,
    choice: PhantomData<fn() -> E>,
}

impl<E: Choice> ChoiceFilter<E> {
    /// `message` may reference the field label as `{label}`.
    pub const fn new(message: &'static str) -> Self {
        Self {
            message,
            choice: PhantomData,
        }
    }
}

impl<E: Choice> Filter for ChoiceFilter<E> {
    fn description(&self) -> &'static str {
        E::SUMMARY
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
        match value {
            FieldValue::Text(ref s) => E::parse_loose(s)
                .map(|choice| FieldValue::Text(choice.as_str().to_string()))
                .ok_or_else(|| FilterError::rejected(self.message.replace("{label}", label))),
            _ => Err(FilterError::rejected(self.message.replace("{label}", label))),
        }
    }
}

/// Set membership against the filter arguments, e.g. `one_of(cash,card)`.
pub struct OneOf;

impl Filter for OneOf {
    fn description(&self) -> &'static str {
        "Exactly one of the listed values (v1,v2,...)"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        if args.is_empty() {
            Err("expected at least one allowed value".to_string())
        } else {
            Ok(())
        }
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        self.check_args(args).map_err(FilterError::Misconfigured)?;
        crate::filters::check_text(
            value,
            || format!("{label} has an invalid value"),
            |s| args.iter().any(|allowed| allowed == s),
        )
    }
}

/// Who a record belongs to. `subject_type(name)`, the default, reads the
/// variant name or code (`Patient`, `STP`); `subject_type(ordinal)` reads its
/// position (`0` for patients, `1` for accounts).
pub struct SubjectTypeFilter;

impl SubjectTypeFilter {
    fn by_ordinal(args: &[String]) -> Result<bool, String> {
        match args.first().map(|a| a.trim().to_ascii_lowercase()) {
            None => Ok(false),
            Some(mode) if mode == "name" => Ok(false),
            Some(mode) if mode == "ordinal" => Ok(true),
            Some(mode) => Err(format!(
                "unknown subject type mode '{mode}', expected name or ordinal"
            )),
        }
    }
}

impl Filter for SubjectTypeFilter {
    fn description(&self) -> &'static str {
        "Subject type by (name) or (ordinal), default name"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        Self::by_ordinal(args).map(|_| ())
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        let by_ordinal = Self::by_ordinal(args).map_err(FilterError::Misconfigured)?;
        if value.is_blank() {
            return Ok(FieldValue::Null);
        }
        let subject = match &value {
            FieldValue::Text(s) if by_ordinal => s
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| SubjectType::ALL.get(i).copied()),
            FieldValue::Integer(i) if by_ordinal => usize::try_from(*i)
                .ok()
                .and_then(|i| SubjectType::ALL.get(i).copied()),
            FieldValue::Text(s) => SubjectType::parse_loose(s),
            _ => None,
        };
        subject
            .map(|subject| FieldValue::Text(subject.as_str().to_string()))
            .ok_or_else(|| {
                FilterError::rejected(format!("{label} contains invalid subject type value"))
            })
    }
}

/// ISO 3166-1 alpha-2 country code, normalized to upper case.
pub struct Country;

impl Filter for Country {
    fn description(&self) -> &'static str {
        "Country code, ISO 3166-1 alpha-2"
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
        match value.as_text().map(str::trim) {
            Some(code) if is_country_code(code) => Ok(FieldValue::Text(code.to_ascii_uppercase())),
            _ => Err(FilterError::rejected(format!(
                "Unknown country selected for {label}"
            ))),
        }
    }
}

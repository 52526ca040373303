//! Built-in filters.
//!
//! Unless a filter says otherwise it passes `Null` and empty text through
//! untouched, so optional fields are only checked when something was
//! submitted. Converting filters (numbers, dates, times, years and the
//! choices) turn blank text into `Null` so an empty optional input stays
//! absent in the record. Presence is the job of `required`.

use std::sync::Arc;

use crate::filter::{Filter, FilterError};
use crate::hospital::{
    AccountType, AdmissionType, BloodGroup, IdType, PatientType, Portal, RelationshipType, Sex,
    TemperatureUnit,
};
use crate::value::FieldValue;

mod choice;
mod numeric;
mod pattern;
mod presence;
mod temporal;
mod text;

pub use choice::{ChoiceFilter, Country, OneOf, SubjectTypeFilter};
pub use numeric::{Decimal, Double, Integer, LongArray, Positive, Range};
pub use pattern::{PatternFilter, TextFilter};
pub use presence::{Length, Required};
pub use temporal::{java_pattern_to_strftime, Age, DateFilter, Future, Past, TimeFilter, Year};
pub use text::{Bool, Capitalize, Lower, Trim, Upper};

/// Every built-in filter with the name it is registered under.
pub(crate) fn builtins() -> Vec<(&'static str, Arc<dyn Filter>)> {
    fn entry(
        name: &'static str,
        filter: impl Filter + 'static,
    ) -> (&'static str, Arc<dyn Filter>) {
        (name, Arc::new(filter))
    }

    vec![
        entry("required", Required),
        entry("length", Length),
        entry("trim", Trim),
        entry("lower", Lower),
        entry("upper", Upper),
        entry("capitalize", Capitalize),
        entry("text", TextFilter),
        entry("alpha", PatternFilter::alpha()),
        entry("alphanumeric", PatternFilter::alphanumeric()),
        entry("name", PatternFilter::person_name()),
        entry("email", PatternFilter::email()),
        entry("mrn", PatternFilter::mrn()),
        entry("phone", PatternFilter::phone()),
        entry("int", Integer::int()),
        entry("long", Integer::long()),
        entry("double", Double),
        entry("decimal", Decimal),
        entry("long_array", LongArray),
        entry("positive", Positive),
        entry("range", Range),
        entry("bool", Bool),
        entry("date", DateFilter),
        entry("time", TimeFilter),
        entry("future", Future),
        entry("past", Past),
        entry("age", Age),
        entry("year", Year),
        entry("one_of", OneOf),
        entry("country", Country),
        entry("subject_type", SubjectTypeFilter),
        entry(
            "sex",
            ChoiceFilter::<Sex>::new("{label} must be Male or Female. Unknown value specified"),
        ),
        entry(
            "blood_group",
            ChoiceFilter::<BloodGroup>::new("{label} has invalid blood group value."),
        ),
        entry(
            "patient_type",
            ChoiceFilter::<PatientType>::new("{label} is not a valid patient type"),
        ),
        entry(
            "id_type",
            ChoiceFilter::<IdType>::new("{label} is not a valid ID type"),
        ),
        entry(
            "relationship",
            ChoiceFilter::<RelationshipType>::new("Unknown relationship type for field {label}"),
        ),
        entry(
            "temp_unit",
            ChoiceFilter::<TemperatureUnit>::new("{label} has invalid temperature units"),
        ),
        entry(
            "admission_type",
            ChoiceFilter::<AdmissionType>::new("{label} is not a valid admission type"),
        ),
        entry(
            "portal",
            ChoiceFilter::<Portal>::new("{label} is not a valid login portal"),
        ),
        entry(
            "account_type",
            ChoiceFilter::<AccountType>::new("{label} is not a valid account type"),
        ),
    ]
}

/// Run `check` on text, or on every text element of a list, rejecting with
/// `message` on the first miss. Empty values pass through.
pub(crate) fn check_text(
    value: FieldValue,
    message: impl FnOnce() -> String,
    check: impl Fn(&str) -> bool,
) -> Result<FieldValue, FilterError> {
    if value.is_empty() {
        return Ok(value);
    }
    let ok = match &value {
        FieldValue::Text(s) => check(s),
        FieldValue::List(items) => items.iter().all(|item| match item {
            FieldValue::Text(s) => s.is_empty() || check(s),
            FieldValue::Null => true,
            _ => false,
        }),
        _ => false,
    };
    if ok {
        Ok(value)
    } else {
        Err(FilterError::rejected(message()))
    }
}

/// Format with `,` thousands separators, e.g. `1,024`.
pub(crate) fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Parse a required argument at `index`.
pub(crate) fn parse_arg<T: std::str::FromStr>(
    args: &[String],
    index: usize,
    what: &str,
) -> Result<T, String> {
    let raw = args
        .get(index)
        .ok_or_else(|| format!("missing {what} argument"))?;
    raw.trim()
        .parse()
        .map_err(|_| format!("{what} argument '{raw}' is not a valid number"))
}

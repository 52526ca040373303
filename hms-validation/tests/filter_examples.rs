//! One accepted and one rejected example for every registered filter, with
//! the exact message a user sees.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use hms_validation::{FieldValue, FilterError, FilterRegistry};

/// Filters that only reshape text and never reject.
const TRANSFORMS: &[&str] = &["trim", "lower", "upper", "capitalize"];

enum Expect {
    Pass(FieldValue),
    Reject(&'static str),
}

struct Example {
    filter: &'static str,
    args: &'static [&'static str],
    input: FieldValue,
    expect: Expect,
}

fn pass(
    filter: &'static str,
    args: &'static [&'static str],
    input: FieldValue,
    output: FieldValue,
) -> Example {
    Example {
        filter,
        args,
        input,
        expect: Expect::Pass(output),
    }
}

fn reject(
    filter: &'static str,
    args: &'static [&'static str],
    input: FieldValue,
    message: &'static str,
) -> Example {
    Example {
        filter,
        args,
        input,
        expect: Expect::Reject(message),
    }
}

fn text(s: &str) -> FieldValue {
    FieldValue::from(s)
}

fn date(y: i32, m: u32, d: u32) -> FieldValue {
    FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn list(items: &[&str]) -> FieldValue {
    FieldValue::List(items.iter().map(|s| text(s)).collect())
}

fn examples() -> Vec<Example> {
    vec![
        pass("required", &[], text("x"), text("x")),
        reject("required", &[], text(""), "Field field is required"),
        pass("length", &["2", "5"], text("abc"), text("abc")),
        reject("length", &["2", "5"], text("a"), "Field must be within 2 and 5 characters long"),
        pass("trim", &[], text(" a "), text("a")),
        pass("lower", &[], text("AbC"), text("abc")),
        pass("upper", &[], text("abc"), text("ABC")),
        pass("capitalize", &[], text(" jOHN  doe "), text("John Doe")),
        pass("text", &[], text("Hello, world"), text("Hello, world")),
        reject("text", &[], text("<b>"), "Field contains invalid characters"),
        pass("alpha", &[], text("Ama Mensah"), text("Ama Mensah")),
        reject("alpha", &[], text("R2D2"), "Field must only contain letters"),
        pass("alphanumeric", &[], text("Ward 7_b"), text("Ward 7_b")),
        reject("alphanumeric", &[], text("a-b"), "Field can only be alphanumeric"),
        pass("name", &[], text("Kofi O'Neil"), text("Kofi O'Neil")),
        reject(
            "name",
            &[],
            text("Kofi2"),
            "Field contains invalid characters. Valid characters are a-z, A-Z, ', and space.",
        ),
        pass("email", &[], text("ama@example.com"), text("ama@example.com")),
        reject("email", &[], text("ama@"), "Field contains an invalid email address."),
        pass("mrn", &[], text("ABCD123"), text("ABCD123")),
        reject("mrn", &[], text("ABC123"), "Field is not a valid medical records number."),
        pass("phone", &[], text("(024) 555-0100"), text("(024) 555-0100")),
        reject(
            "phone",
            &[],
            text("12345"),
            "Field is not a valid phone number. Must be at least 10 digits",
        ),
        pass("int", &[], text("1,024"), FieldValue::Integer(1024)),
        reject("int", &[], text("3000000000"), "Field must be a valid whole number"),
        pass("long", &[], text("3000000000"), FieldValue::Integer(3_000_000_000)),
        reject("long", &[], text("1.5"), "Field must be a valid whole number"),
        pass("double", &[], text("2.5"), FieldValue::Float(2.5)),
        reject("double", &[], text("abc"), "Field must be a valid numeric value"),
        pass("decimal", &[], text("1,024.50"), text("1024.50")),
        reject("decimal", &[], text("1e3"), "Field must be a valid numeric value"),
        pass(
            "long_array",
            &[],
            list(&["2", "2", "5"]),
            FieldValue::List(vec![FieldValue::Integer(2), FieldValue::Integer(5)]),
        ),
        reject(
            "long_array",
            &[],
            list(&["x"]),
            "One of the values contained in the Field field is not a valid number",
        ),
        pass("positive", &[], FieldValue::Integer(0), FieldValue::Integer(0)),
        reject("positive", &[], FieldValue::Integer(-1), "Field must be a positive number"),
        pass("range", &["1", "10"], FieldValue::Integer(5), FieldValue::Integer(5)),
        reject("range", &["1", "10"], FieldValue::Integer(11), "Field must be between 1 and 10."),
        pass("bool", &[], text("on"), FieldValue::Bool(true)),
        reject("bool", &[], text("maybe"), "Field must be a valid boolean value"),
        pass("date", &[], text("2024-02-29"), date(2024, 2, 29)),
        reject("date", &[], text("2023-02-29"), "Field has an invalid date format"),
        pass(
            "time",
            &[],
            text("23:59"),
            FieldValue::Time(NaiveTime::from_hms_opt(23, 59, 0).unwrap()),
        ),
        reject("time", &[], text("24:00"), "Field has an invalid time format"),
        pass("future", &[], date(2999, 1, 1), date(2999, 1, 1)),
        reject("future", &[], date(2000, 1, 1), "Field may only be after today"),
        pass("past", &[], date(2000, 1, 1), date(2000, 1, 1)),
        reject("past", &[], date(2999, 1, 1), "Field may only be before today"),
        pass("age", &[], date(1950, 1, 1), date(1950, 1, 1)),
        reject("age", &[], date(2999, 1, 1), "Field must be at least 18 years ago"),
        pass("year", &[], text("1999"), FieldValue::Integer(1999)),
        reject("year", &[], text("last year"), "Field must be a valid year"),
        pass("one_of", &["cash", "card"], text("cash"), text("cash")),
        reject("one_of", &["cash", "card"], text("cheque"), "Field has an invalid value"),
        pass("country", &[], text("gh"), text("GH")),
        reject("country", &[], text("ZZ"), "Unknown country selected for Field"),
        pass("subject_type", &[], text("STA"), text("Account")),
        reject("subject_type", &[], text("Robot"), "Field contains invalid subject type value"),
        pass("sex", &[], text("m"), text("Male")),
        reject("sex", &[], text("x"), "Field must be Male or Female. Unknown value specified"),
        pass("blood_group", &[], text("ab+"), text("ABPositive")),
        reject("blood_group", &[], text("C+"), "Field has invalid blood group value."),
        pass("patient_type", &[], text("inpatient"), text("Inpatient")),
        reject("patient_type", &[], text("visitor"), "Field is not a valid patient type"),
        pass("id_type", &[], text("passport"), text("Passport")),
        reject("id_type", &[], text("library card"), "Field is not a valid ID type"),
        pass("relationship", &[], text("spouse"), text("Spouse")),
        reject("relationship", &[], text("rival"), "Unknown relationship type for field Field"),
        pass("temp_unit", &[], text("c"), text("Celsius")),
        reject("temp_unit", &[], text("kelvin"), "Field has invalid temperature units"),
        pass("admission_type", &[], text("shortstay"), text("ShortStay")),
        reject("admission_type", &[], text("day"), "Field is not a valid admission type"),
        pass("portal", &[], text("STAFF"), text("Staff")),
        reject("portal", &[], text("admin"), "Field is not a valid login portal"),
        pass("account_type", &[], text("nurse"), text("Nurse")),
        reject("account_type", &[], text("janitor"), "Field is not a valid account type"),
    ]
}

#[test]
fn test_every_example_behaves_as_documented() {
    let registry = FilterRegistry::with_builtins();
    for example in examples() {
        let filter = registry
            .get(example.filter)
            .unwrap_or_else(|| panic!("{} is not registered", example.filter));
        let args: Vec<String> = example.args.iter().map(|a| a.to_string()).collect();
        assert!(filter.check_args(&args).is_ok(), "{} rejected {args:?}", example.filter);

        let result = filter.apply("Field", example.input.clone(), &args);
        match example.expect {
            Expect::Pass(output) => {
                assert_eq!(result, Ok(output), "{} on {:?}", example.filter, example.input)
            }
            Expect::Reject(message) => assert_eq!(
                result,
                Err(FilterError::rejected(message)),
                "{} on {:?}",
                example.filter,
                example.input
            ),
        }
    }
}

#[test]
fn test_every_registered_filter_has_examples() {
    let registry = FilterRegistry::with_builtins();
    let examples = examples();
    let passing: HashSet<_> = examples
        .iter()
        .filter(|e| matches!(e.expect, Expect::Pass(_)))
        .map(|e| e.filter)
        .collect();
    let rejecting: HashSet<_> = examples
        .iter()
        .filter(|e| matches!(e.expect, Expect::Reject(_)))
        .map(|e| e.filter)
        .collect();

    for name in registry.names() {
        assert!(passing.contains(name), "{name} has no accepted example");
        if !TRANSFORMS.contains(&name) {
            assert!(rejecting.contains(name), "{name} has no rejected example");
        }
    }
}

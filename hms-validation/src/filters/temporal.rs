use chrono::format::{Fixed, Item, Numeric, StrftimeItems};
use chrono::{Datelike, Local, Months, NaiveDate, NaiveTime};

use crate::filter::{Filter, FilterError};
use crate::value::FieldValue;

const DEFAULT_DATE_PATTERN: &str = "yyyy-MM-dd";
const DEFAULT_TIME_PATTERN: &str = "HH:mm";
const DEFAULT_MINIMUM_AGE: u32 = 18;

/// Translate a date pattern such as `dd/MM/yyyy` into `strftime` form.
///
/// Patterns that already contain `%` are taken as `strftime` and only
/// checked. Text in single quotes is literal; `''` is a quote.
pub fn java_pattern_to_strftime(pattern: &str) -> Result<String, String> {
    if pattern.contains('%') {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(format!("invalid strftime pattern '{pattern}'"));
        }
        return Ok(pattern.to_string());
    }

    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            i += 1;
            if chars.get(i) == Some(&'\'') {
                out.push('\'');
                i += 1;
                continue;
            }
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                out.push(chars[i]);
                i += 1;
            }
            if i == chars.len() {
                return Err(format!("unterminated quote in pattern '{pattern}'"));
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            out.push(c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|x| **x == c).count();
        let directive = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1 | 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1 | 2) => "%d",
            ('H', 1 | 2) => "%H",
            ('h', 1 | 2) => "%I",
            ('m', 1 | 2) => "%M",
            ('s', 1 | 2) => "%S",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            _ => return Err(format!("unknown pattern letter '{c}' in '{pattern}'")),
        };
        out.push_str(directive);
        i += run;
    }
    Ok(out)
}

fn pattern_arg(args: &[String], default: &str) -> Result<String, String> {
    let pattern = args.first().map(String::as_str).unwrap_or(default);
    java_pattern_to_strftime(pattern.trim())
}

/// Which calendar and clock fields a `strftime` format reads.
#[derive(Debug, Default)]
struct Components {
    year: bool,
    month: bool,
    day: bool,
    hour: bool,
    minute: bool,
}

impl Components {
    fn of(format: &str) -> Self {
        let mut found = Self::default();
        for item in StrftimeItems::new(format) {
            match item {
                Item::Numeric(Numeric::Year | Numeric::YearMod100, _) => found.year = true,
                Item::Numeric(Numeric::Month, _)
                | Item::Fixed(Fixed::ShortMonthName | Fixed::LongMonthName) => found.month = true,
                Item::Numeric(Numeric::Day, _) => found.day = true,
                Item::Numeric(Numeric::Hour | Numeric::Hour12, _) => found.hour = true,
                Item::Numeric(Numeric::Minute, _) => found.minute = true,
                _ => {}
            }
        }
        found
    }
}

/// The `strftime` format of a `date` filter. It must read a whole date.
fn date_format(args: &[String]) -> Result<String, String> {
    let format = pattern_arg(args, DEFAULT_DATE_PATTERN)?;
    let found = Components::of(&format);
    if found.year && found.month && found.day {
        Ok(format)
    } else {
        Err(format!(
            "date pattern '{}' must include a year, a month and a day",
            args.first().map(String::as_str).unwrap_or(DEFAULT_DATE_PATTERN)
        ))
    }
}

/// The `strftime` format of a `time` filter. It must read hours and minutes.
fn time_format(args: &[String]) -> Result<String, String> {
    let format = pattern_arg(args, DEFAULT_TIME_PATTERN)?;
    let found = Components::of(&format);
    if found.hour && found.minute {
        Ok(format)
    } else {
        Err(format!(
            "time pattern '{}' must include hours and minutes",
            args.first().map(String::as_str).unwrap_or(DEFAULT_TIME_PATTERN)
        ))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses text into a date. Optional argument: the pattern, `yyyy-MM-dd` by
/// default.
pub struct DateFilter;

impl Filter for DateFilter {
    fn description(&self) -> &'static str {
        "Date, optional (pattern), default yyyy-MM-dd"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        date_format(args).map(|_| ())
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        let format = date_format(args).map_err(FilterError::Misconfigured)?;
        if value.is_blank() {
            return Ok(FieldValue::Null);
        }
        match value {
            FieldValue::Text(s) => NaiveDate::parse_from_str(s.trim(), &format)
                .map(FieldValue::Date)
                .map_err(|_| FilterError::rejected(format!("{label} has an invalid date format"))),
            FieldValue::Date(_) => Ok(value),
            _ => Err(FilterError::rejected(format!(
                "{label} has an invalid date format"
            ))),
        }
    }
}

/// Parses text into a time of day. Optional argument: the pattern, `HH:mm`
/// by default.
pub struct TimeFilter;

impl Filter for TimeFilter {
    fn description(&self) -> &'static str {
        "Time of day, optional (pattern), default HH:mm"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        time_format(args).map(|_| ())
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        let format = time_format(args).map_err(FilterError::Misconfigured)?;
        if value.is_blank() {
            return Ok(FieldValue::Null);
        }
        match value {
            FieldValue::Text(s) => NaiveTime::parse_from_str(s.trim(), &format)
                .map(FieldValue::Time)
                .map_err(|_| FilterError::rejected(format!("{label} has an invalid time format"))),
            FieldValue::Time(_) => Ok(value),
            _ => Err(FilterError::rejected(format!(
                "{label} has an invalid time format"
            ))),
        }
    }
}

/// The date carried by `value`, `None` when empty.
fn date_of(filter: &str, value: &FieldValue) -> Result<Option<NaiveDate>, FilterError> {
    match value {
        FieldValue::Date(d) => Ok(Some(*d)),
        v if v.is_empty() => Ok(None),
        other => Err(FilterError::misconfigured(format!(
            "{filter} expects a date but got {}; put a date filter before it",
            other.kind()
        ))),
    }
}

/// Strictly after today.
pub struct Future;

impl Filter for Future {
    fn description(&self) -> &'static str {
        "Date strictly after today"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        match date_of("future", &value)? {
            Some(d) if d <= today() => Err(FilterError::rejected(format!(
                "{label} may only be after today"
            ))),
            _ => Ok(value),
        }
    }
}

/// Strictly before today.
pub struct Past;

impl Filter for Past {
    fn description(&self) -> &'static str {
        "Date strictly before today"
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        match date_of("past", &value)? {
            Some(d) if d >= today() => Err(FilterError::rejected(format!(
                "{label} may only be before today"
            ))),
            _ => Ok(value),
        }
    }
}

/// A date at least N years ago (default 18), e.g. a date of birth.
pub struct Age;

impl Age {
    fn years(args: &[String]) -> Result<u32, String> {
        match args.first() {
            None => Ok(DEFAULT_MINIMUM_AGE),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("age '{raw}' is not a whole number of years")),
        }
    }
}

impl Filter for Age {
    fn description(&self) -> &'static str {
        "Date at least (years) ago, default 18"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        Self::years(args).map(|_| ())
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        let years = Self::years(args).map_err(FilterError::Misconfigured)?;
        let Some(date) = date_of("age", &value)? else {
            return Ok(value);
        };
        let cutoff = years
            .checked_mul(12)
            .and_then(|months| today().checked_sub_months(Months::new(months)))
            .ok_or_else(|| FilterError::misconfigured(format!("age {years} is out of range")))?;
        if date <= cutoff {
            Ok(value)
        } else {
            Err(FilterError::rejected(format!(
                "{label} must be at least {years} years ago"
            )))
        }
    }
}

/// How a `year` compares the submitted year with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearRule {
    Any,
    Same,
    Before,
    After,
    BeforeOrSame,
    AfterOrSame,
}

impl YearRule {
    fn from_args(args: &[String]) -> Result<Self, String> {
        let Some(raw) = args.first() else {
            return Ok(Self::Any);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Ok(Self::Any),
            "same" => Ok(Self::Same),
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            "before_or_same" => Ok(Self::BeforeOrSame),
            "after_or_same" => Ok(Self::AfterOrSame),
            _ => Err(format!(
                "unknown year comparison '{raw}', expected same, before, after, \
                 before_or_same or after_or_same"
            )),
        }
    }

    fn check(self, label: &str, year: i64, this_year: i64) -> Result<(), FilterError> {
        let (ok, rule) = match self {
            Self::Any => (true, ""),
            Self::Same => (year == this_year, "must be the same as"),
            Self::Before => (year < this_year, "may only come before"),
            Self::After => (year > this_year, "may only be after"),
            Self::BeforeOrSame => (year <= this_year, "may only be the same as or before"),
            Self::AfterOrSame => (year >= this_year, "may only be the same as or come after"),
        };
        if ok {
            Ok(())
        } else {
            Err(FilterError::rejected(format!(
                "{label} {rule} this year ({this_year})"
            )))
        }
    }
}

/// A calendar year, optionally compared with the current year:
/// `year(same)`, `year(before)`, `year(after)`, `year(before_or_same)` or
/// `year(after_or_same)`.
pub struct Year;

impl Year {
    fn check_against(
        label: &str,
        value: FieldValue,
        args: &[String],
        this_year: i64,
    ) -> Result<FieldValue, FilterError> {
        let rule = YearRule::from_args(args).map_err(FilterError::Misconfigured)?;
        if value.is_blank() {
            return Ok(FieldValue::Null);
        }
        let year = match &value {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .filter(|n| (1..=9999).contains(n))
        .ok_or_else(|| FilterError::rejected(format!("{label} must be a valid year")))?;
        rule.check(label, year, this_year)?;
        Ok(FieldValue::Integer(year))
    }
}

impl Filter for Year {
    fn description(&self) -> &'static str {
        "Calendar year, optional (same|before|after|before_or_same|after_or_same) this year"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        YearRule::from_args(args).map(|_| ())
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        Self::check_against(label, value, args, i64::from(today().year()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> FieldValue {
        FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_pattern_translation() {
        assert_eq!(java_pattern_to_strftime("yyyy-MM-dd").unwrap(), "%Y-%m-%d");
        assert_eq!(java_pattern_to_strftime("dd/MM/yy").unwrap(), "%d/%m/%y");
        assert_eq!(java_pattern_to_strftime("HH:mm:ss").unwrap(), "%H:%M:%S");
        assert_eq!(java_pattern_to_strftime("hh:mm a").unwrap(), "%I:%M %p");
        assert_eq!(
            java_pattern_to_strftime("yyyy-MM-dd'T'HH:mm").unwrap(),
            "%Y-%m-%dT%H:%M"
        );
        assert_eq!(java_pattern_to_strftime("%d.%m.%Y").unwrap(), "%d.%m.%Y");
    }

    #[test]
    fn test_pattern_translation_rejects_unknown_letters() {
        assert!(java_pattern_to_strftime("yyyy-QQ").is_err());
        assert!(java_pattern_to_strftime("yyyy-MM-dd'T").is_err());
        assert!(DateFilter.check_args(&["yyyy-ww".to_string()]).is_err());
        assert!(DateFilter.check_args(&[]).is_ok());
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(DateFilter.apply("Expiry", "2030-01-31".into(), &[]), Ok(date(2030, 1, 31)));
        assert_eq!(
            DateFilter.apply("Expiry", "31/01/2030".into(), &["dd/MM/yyyy".to_string()]),
            Ok(date(2030, 1, 31))
        );
        assert_eq!(
            DateFilter.apply("Expiry", "2030-02-31".into(), &[]),
            Err(FilterError::rejected("Expiry has an invalid date format"))
        );
        assert_eq!(DateFilter.apply("Expiry", "".into(), &[]), Ok(FieldValue::Null));
        assert_eq!(DateFilter.apply("Expiry", "  ".into(), &[]), Ok(FieldValue::Null));
    }

    #[test]
    fn test_time_parsing() {
        assert_eq!(
            TimeFilter.apply("Start time", "08:30".into(), &[]),
            Ok(FieldValue::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap()))
        );
        assert_eq!(
            TimeFilter.apply("Start time", "25:00".into(), &[]),
            Err(FilterError::rejected("Start time has an invalid time format"))
        );
    }

    #[test]
    fn test_future_and_past() {
        assert!(Future.apply("Expiry", date(2999, 1, 1), &[]).is_ok());
        assert_eq!(
            Future.apply("Expiry", date(2000, 1, 1), &[]),
            Err(FilterError::rejected("Expiry may only be after today"))
        );
        assert!(Future.apply("Expiry", FieldValue::Date(today()), &[]).is_err());
        assert!(Past.apply("Born", date(2000, 1, 1), &[]).is_ok());
        assert_eq!(
            Past.apply("Born", date(2999, 1, 1), &[]),
            Err(FilterError::rejected("Born may only be before today"))
        );
        assert!(matches!(
            Past.apply("Born", "2000-01-01".into(), &[]),
            Err(FilterError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_age() {
        assert!(Age.apply("Date of birth", date(1970, 6, 1), &[]).is_ok());
        assert_eq!(
            Age.apply("Date of birth", FieldValue::Date(today()), &[]),
            Err(FilterError::rejected("Date of birth must be at least 18 years ago"))
        );
        assert!(Age.apply("Date of birth", FieldValue::Date(today()), &["0".to_string()]).is_ok());
        assert!(Age.check_args(&["old".to_string()]).is_err());
    }

    #[test]
    fn test_patterns_must_name_every_component() {
        assert!(DateFilter.check_args(&["HH:mm".to_string()]).is_err());
        assert!(DateFilter.check_args(&["yyyy-MM".to_string()]).is_err());
        assert!(DateFilter.check_args(&["dd MMM yyyy".to_string()]).is_ok());
        assert!(DateFilter.check_args(&["%F".to_string()]).is_ok());
        assert!(TimeFilter.check_args(&["HH".to_string()]).is_err());
        assert!(TimeFilter.check_args(&["yyyy-MM-dd".to_string()]).is_err());
        assert!(TimeFilter.check_args(&["hh:mm a".to_string()]).is_ok());
        assert!(TimeFilter.check_args(&[]).is_ok());
    }

    #[test]
    fn test_blank_dates_and_times_become_null() {
        assert_eq!(TimeFilter.apply("Start time", "".into(), &[]), Ok(FieldValue::Null));
        assert_eq!(TimeFilter.apply("Start time", " ".into(), &[]), Ok(FieldValue::Null));
        assert_eq!(DateFilter.apply("Expiry", FieldValue::Null, &[]), Ok(FieldValue::Null));
    }

    #[test]
    fn test_year_comparisons() {
        let rule = |name: &str| vec![name.to_string()];
        let check =
            |value: &str, args: &[String]| Year::check_against("Year", value.into(), args, 2024);

        assert_eq!(check("1999", &[]), Ok(FieldValue::Integer(1999)));
        assert_eq!(check("2024", &rule("same")), Ok(FieldValue::Integer(2024)));
        assert_eq!(
            check("2023", &rule("same")),
            Err(FilterError::rejected("Year must be the same as this year (2024)"))
        );
        assert!(check("2023", &rule("before")).is_ok());
        assert_eq!(
            check("2024", &rule("before")),
            Err(FilterError::rejected("Year may only come before this year (2024)"))
        );
        assert_eq!(
            check("2024", &rule("after")),
            Err(FilterError::rejected("Year may only be after this year (2024)"))
        );
        assert!(check("2024", &rule("before_or_same")).is_ok());
        assert_eq!(
            check("2025", &rule("before_or_same")),
            Err(FilterError::rejected(
                "Year may only be the same as or before this year (2024)"
            ))
        );
        assert!(check("2024", &rule("after_or_same")).is_ok());
        assert_eq!(
            check("2023", &rule("after_or_same")),
            Err(FilterError::rejected(
                "Year may only be the same as or come after this year (2024)"
            ))
        );
        assert_eq!(
            check("twenty", &[]),
            Err(FilterError::rejected("Year must be a valid year"))
        );
        assert_eq!(check("", &rule("after")), Ok(FieldValue::Null));
        assert!(Year.check_args(&rule("sometime")).is_err());
        assert!(Year.check_args(&[]).is_ok());
    }
}

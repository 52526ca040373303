use std::sync::OnceLock;

use regex::Regex;

use crate::filter::{Filter, FilterError};
use crate::filters::check_text;
use crate::value::FieldValue;

/// A text filter backed by a single regular expression.
///
/// The expression is compiled on first use and shared afterwards.
pub struct PatternFilter {
    description: &'static str,
    message: &'static str,
    pattern: &'static str,
    regex: OnceLock<Regex>,
}

impl PatternFilter {
    /// `message` may reference the field label as `{label}`.
    pub const fn new(
        description: &'static str,
        pattern: &'static str,
        message: &'static str,
    ) -> Self {
        Self {
            description,
            message,
            pattern,
            regex: OnceLock::new(),
        }
    }

    pub const fn alpha() -> Self {
        Self::new(
            "Letters and spaces only",
            r"^[A-Za-z ]+$",
            "{label} must only contain letters",
        )
    }

    pub const fn alphanumeric() -> Self {
        Self::new(
            "Word characters and whitespace only",
            r"^[\w\s]+$",
            "{label} can only be alphanumeric",
        )
    }

    pub const fn person_name() -> Self {
        Self::new(
            "Person name: letters, apostrophes and single spaces",
            r"^(?:[a-zA-Z]+['\s]?)+$",
            "{label} contains invalid characters. Valid characters are a-z, A-Z, ', and space.",
        )
    }

    pub const fn email() -> Self {
        Self::new(
            "Email address",
            r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$",
            "{label} contains an invalid email address.",
        )
    }

    /// Medical records number: four letters followed by 3 to 16 hex digits.
    pub const fn mrn() -> Self {
        Self::new(
            "Medical records number: 4 letters + 3-16 hex digits",
            r"^[a-zA-Z]{4}[a-fA-F0-9]{3,16}$",
            "{label} is not a valid medical records number.",
        )
    }

    pub const fn phone() -> Self {
        Self::new(
            "Phone number: 10-30 digits, spaces, ( ) - +",
            r"^[0-9()\-\x20+]{10,30}$",
            "{label} is not a valid phone number. Must be at least 10 digits",
        )
    }

    fn regex(&self) -> &Regex {
        self.regex.get_or_init(|| {
            Regex::new(self.pattern).expect("built-in filter pattern must compile")
        })
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.regex().is_match(input)
    }
}

impl Filter for PatternFilter {
    fn description(&self) -> &'static str {
        self.description
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        _args: &[String],
    ) -> Result<FieldValue, FilterError> {
        check_text(
            value,
            || self.message.replace("{label}", label),
            |s| self.is_match(s),
        )
    }
}

static SINGLE_LINE: OnceLock<Regex> = OnceLock::new();
static MULTI_LINE: OnceLock<Regex> = OnceLock::new();

/// Printable ASCII without markup characters. `text(true)` also allows line
/// breaks.
pub struct TextFilter;

impl TextFilter {
    fn multiline(args: &[String]) -> Result<bool, String> {
        match args.first() {
            None => Ok(false),
            Some(flag) => flag
                .trim()
                .to_ascii_lowercase()
                .parse()
                .map_err(|_| format!("multiline flag '{flag}' must be true or false")),
        }
    }

    fn regex(multiline: bool) -> &'static Regex {
        if multiline {
            MULTI_LINE.get_or_init(|| {
                Regex::new(r"^[\x20-\x3B=\x3F-\x7E\n\r]+$").expect("Invalid multiline text regex")
            })
        } else {
            SINGLE_LINE.get_or_init(|| {
                Regex::new(r"^[\x20-\x3B=\x3F-\x7E]+$").expect("Invalid text regex")
            })
        }
    }
}

impl Filter for TextFilter {
    fn description(&self) -> &'static str {
        "Printable text without < or >, optional (multiline)"
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        Self::multiline(args).map(|_| ())
    }

    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError> {
        let regex = Self::regex(Self::multiline(args).map_err(FilterError::Misconfigured)?);
        check_text(
            value,
            || format!("{label} contains invalid characters"),
            |s| regex.is_match(s),
        )
    }
}

//! The filter contract and the compact chain notation.
//!
//! A filter validates and/or transforms one field value. Filters are chained
//! per field and run in declaration order; the output of one is the input of
//! the next. Chains are usually written in a compact notation:
//!
//! ```text
//! trim|required|length(2,50)|upper
//! ```
//!
//! Each segment is a filter name optionally followed by comma separated
//! arguments in parentheses or square brackets.

use std::fmt;

use crate::value::FieldValue;

/// A named, composable validation/transformation function.
///
/// Implementations are stateless and shared between threads. A filter must
/// only look at the value it is given.
pub trait Filter: Send + Sync {
    /// One-line description shown in filter listings.
    fn description(&self) -> &'static str;

    /// Check arguments when a schema is built. Return a reason on failure.
    fn check_args(&self, _args: &[String]) -> Result<(), String> {
        Ok(())
    }

    /// Validate and/or transform `value`. `label` is the human readable field
    /// name used in rejection messages.
    fn apply(
        &self,
        label: &str,
        value: FieldValue,
        args: &[String],
    ) -> Result<FieldValue, FilterError>;
}

/// Outcome of a failing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The value does not satisfy the filter. Shown to the user.
    Rejected(String),
    /// The filter's arguments are unusable. A configuration defect.
    Misconfigured(String),
}

impl FilterError {
    pub fn rejected(message: impl Into<String>) -> Self {
        FilterError::Rejected(message.into())
    }

    pub fn misconfigured(reason: impl Into<String>) -> Self {
        FilterError::Misconfigured(reason.into())
    }
}

/// A filter reference with its arguments, as written in a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterDescriptor {
    /// Parse `name`, `name(a,b)` or `name[a,b]`. Returns `None` when the
    /// segment is malformed.
    pub fn parse(segment: &str) -> Option<Self> {
        let segment = segment.trim();
        let Some(open) = segment.find(['(', '[']) else {
            return is_identifier(segment).then(|| Self {
                name: segment.to_string(),
                args: Vec::new(),
            });
        };

        let name = &segment[..open];
        let close = match segment.as_bytes()[open] {
            b'(' => ')',
            _ => ']',
        };
        let inner = segment[open + 1..].strip_suffix(close)?;
        if !is_identifier(name) || inner.contains(['(', ')', '[', ']']) {
            return None;
        }

        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner.split(',').map(|a| a.trim().to_string()).collect()
        };
        Some(Self {
            name: name.to_string(),
            args,
        })
    }
}

impl fmt::Display for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}({})", self.name, self.args.join(","))
        }
    }
}

/// Split a `|` separated chain into its segments, dropping empty ones.
pub fn split_chain(chain: &str) -> Vec<String> {
    chain
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

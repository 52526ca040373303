//! Raw submitted form data.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::Serialize;

/// String-keyed, possibly multi-valued form data as submitted.
///
/// Keys keep submission order. Validation only reads from it; transformed
/// values are produced separately, so a rejected form can be redisplayed with
/// exactly what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawInput {
    values: IndexMap<String, Vec<String>>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs. Repeated keys accumulate values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut input = Self::new();
        for (key, value) in pairs {
            input.insert(key, value);
        }
        input
    }

    /// Decode an `application/x-www-form-urlencoded` body or query string.
    pub fn from_urlencoded(body: &str) -> Self {
        let body = body.strip_prefix('?').unwrap_or(body);
        Self::from_pairs(url::form_urlencoded::parse(body.as_bytes()).into_owned())
    }

    /// Build from a flat JSON object.
    ///
    /// Strings, numbers and booleans become single values, arrays of those
    /// become multi-valued fields and `null` means the field is absent.
    /// Nested objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let object = value
            .as_object()
            .ok_or_else(|| serde_json::Error::custom("form input must be a JSON object"))?;

        let mut input = Self::new();
        for (key, value) in object {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::Array(items) => {
                    let entry = input.values.entry(key.clone()).or_default();
                    for item in items {
                        entry.push(json_scalar(key, item)?);
                    }
                }
                scalar => input.insert(key.clone(), json_scalar(key, scalar)?),
            }
        }
        Ok(input)
    }

    /// Append a value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// First value submitted for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value submitted for `key`, in submission order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every value of a multi-valued field: those submitted as `key`
    /// followed by those submitted as `key[]`.
    pub fn get_array(&self, key: &str) -> Vec<&str> {
        self.get_all(key)
            .iter()
            .chain(self.get_all(&format!("{key}[]")))
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_scalar(key: &str, value: &serde_json::Value) -> Result<String, serde_json::Error> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(serde_json::Error::custom(format!(
            "field '{key}' must hold a string, number, boolean or an array of those"
        ))),
    }
}

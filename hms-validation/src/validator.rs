//! Applying schemas to submitted input.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::SchemaCache;
use crate::error::{Result, ValidationError, ValidatorError};
use crate::filter::FilterError;
use crate::input::RawInput;
use crate::registry::FilterRegistry;
use crate::schema::{EntitySchema, FieldRule, Validatable};
use crate::stage::Stage;
use crate::value::FieldValue;

/// The transformed values of a successful run, keyed by property in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, property: &str) -> Option<&FieldValue> {
        self.values.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), field_to_json(v)))
                .collect(),
        )
    }

    /// Populate a typed record. Properties the type does not know are
    /// ignored unless the type denies unknown fields.
    pub fn deserialize<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }

    fn insert(&mut self, property: String, value: FieldValue) {
        self.values.insert(property, value);
    }
}

fn field_to_json(value: &FieldValue) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Field errors of a failed submission together with the input as it was
/// submitted, for redisplaying the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub errors: Vec<ValidationError>,
    pub raw: RawInput,
}

impl Rejection {
    /// The error recorded for input key `field`.
    pub fn error_for(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Rejection),
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Validation::Valid(_) => &[],
            Validation::Invalid(rejection) => &rejection.errors,
        }
    }

    pub fn into_result(self) -> std::result::Result<T, Rejection> {
        match self {
            Validation::Valid(value) => Ok(value),
            Validation::Invalid(rejection) => Err(rejection),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U> {
        match self {
            Validation::Valid(value) => Validation::Valid(f(value)),
            Validation::Invalid(rejection) => Validation::Invalid(rejection),
        }
    }
}

/// Everything one run produced: values of the fields that passed and the
/// errors of those that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub values: Record,
    pub errors: Vec<ValidationError>,
}

/// Validates submissions against cached schemas.
#[derive(Debug)]
pub struct Validator {
    registry: Arc<FilterRegistry>,
    cache: SchemaCache,
}

impl Validator {
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self {
            registry,
            cache: SchemaCache::new(),
        }
    }

    /// A validator over the built-in filters.
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(FilterRegistry::with_builtins()))
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// The compiled schema of `T`, built on first use.
    pub fn schema<T: Validatable>(&self) -> Result<Arc<EntitySchema>> {
        self.cache.get_or_build::<T>(&self.registry)
    }

    /// Validate `raw` for `stage` and populate a `T` on success.
    pub fn validate<T>(&self, raw: &RawInput, stage: &Stage) -> Result<Validation<T>>
    where
        T: Validatable + DeserializeOwned,
    {
        let schema = self.schema::<T>()?;
        match self.validate_record(&schema, raw, stage)? {
            Validation::Valid(record) => {
                let entity = record
                    .deserialize::<T>()
                    .map_err(|source| ValidatorError::Population {
                        entity: schema.entity().to_string(),
                        source,
                    })?;
                Ok(Validation::Valid(entity))
            }
            Validation::Invalid(rejection) => Ok(Validation::Invalid(rejection)),
        }
    }

    /// Validate `raw` against an already compiled schema.
    pub fn validate_record(
        &self,
        schema: &EntitySchema,
        raw: &RawInput,
        stage: &Stage,
    ) -> Result<Validation<Record>> {
        let report = self.run(schema, raw, stage)?;
        if report.errors.is_empty() {
            Ok(Validation::Valid(report.values))
        } else {
            Ok(Validation::Invalid(Rejection {
                errors: report.errors,
                raw: raw.clone(),
            }))
        }
    }

    /// Run every rule selected by `stage` and report values and errors.
    pub fn run(&self, schema: &EntitySchema, raw: &RawInput, stage: &Stage) -> Result<RunReport> {
        let mut report = RunReport::default();
        for rule in schema.rules_for(stage) {
            match run_chain(schema.entity(), rule, read_raw(rule, raw))? {
                Ok(value) => report.values.insert(rule.property.clone(), value),
                Err(message) => report
                    .errors
                    .push(ValidationError::new(&rule.name, &rule.label, message)),
            }
        }

        debug!(
            entity = %schema.entity(),
            stage = %stage,
            passed = report.values.len(),
            failed = report.errors.len(),
            "Validated submission"
        );
        Ok(report)
    }
}

fn read_raw(rule: &FieldRule, raw: &RawInput) -> FieldValue {
    if rule.array {
        let values = raw.get_array(&rule.name);
        if values.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::List(values.into_iter().map(FieldValue::from).collect())
        }
    } else {
        raw.get(&rule.name).map(FieldValue::from).unwrap_or(FieldValue::Null)
    }
}

/// Outer `Err` is fatal, inner `Err` is the field's rejection message.
fn run_chain(
    entity: &str,
    rule: &FieldRule,
    mut value: FieldValue,
) -> Result<std::result::Result<FieldValue, String>> {
    for filter in &rule.filters {
        value = match filter.apply(&rule.label, value) {
            Ok(next) => next,
            Err(FilterError::Rejected(message)) => return Ok(Err(message)),
            Err(FilterError::Misconfigured(reason)) => {
                return Err(ValidatorError::MisconfiguredFilter {
                    entity: entity.to_string(),
                    field: rule.property.clone(),
                    filter: filter.name().to_string(),
                    reason,
                })
            }
        };
    }
    Ok(Ok(value))
}

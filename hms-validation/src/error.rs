//! Error types for the validation engine
//!
//! Two kinds of failure exist and they never mix:
//!
//! - [`ValidatorError`] is a configuration or programming defect (unknown
//!   filter, bad filter arguments, empty schema, unreadable schema file). It is
//!   returned as `Err` and should abort startup or the request that hit it.
//! - [`ValidationError`] is an ordinary per-field rejection of user input. It is
//!   collected into a rejection and never returned as `Err`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for validation engine operations
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Fatal configuration and programming errors
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// A chain references a filter that was never registered
    #[error("unknown filter function '{filter}' on {entity}.{field}. Did you forget to register it?")]
    FilterNotFound {
        entity: String,
        field: String,
        filter: String,
    },

    /// Two filters registered under the same name
    #[error("duplicate filter name: {name}")]
    DuplicateFilter { name: String },

    /// A filter descriptor does not match `name`, `name(args)` or `name[args]`
    #[error("invalid filter format '{descriptor}' on {entity}.{field}. Must be <filter-name>(optional,parameters)")]
    MalformedFilter {
        entity: String,
        field: String,
        descriptor: String,
    },

    /// A filter rejected its arguments at schema-build time
    #[error("filter '{filter}' on {entity}.{field} has invalid arguments: {reason}")]
    InvalidFilterArguments {
        entity: String,
        field: String,
        filter: String,
        reason: String,
    },

    /// A filter found its arguments unusable while validating
    #[error("filter '{filter}' on {entity}.{field} is misconfigured: {reason}")]
    MisconfiguredFilter {
        entity: String,
        field: String,
        filter: String,
        reason: String,
    },

    /// A field declared without any filters
    #[error("{entity}.{field} did not specify any validation filters")]
    EmptyFilterChain { entity: String, field: String },

    /// An entity declared without any validated fields
    #[error("{entity} did not specify fields to be validated")]
    NoValidatedFields { entity: String },

    /// Two schema definitions share a name within one source
    #[error("duplicate entity schema '{name}' in {source_name}")]
    DuplicateEntity { name: String, source_name: String },

    /// Entity schema not found by name
    #[error("entity schema not found: {name}")]
    EntityNotFound { name: String },

    /// `extends` names an entity that does not exist
    #[error("entity schema '{entity}' extends unknown schema '{parent}'")]
    UnknownParent { entity: String, parent: String },

    /// `extends` chain loops back on itself
    #[error("inheritance cycle in entity schemas: {chain}")]
    InheritanceCycle { chain: String },

    /// A validated record could not be deserialized into its target type
    #[error("validated values for {entity} do not fit the record type: {source}")]
    Population {
        entity: String,
        #[source]
        source: serde_json::Error,
    },

    /// Schema file could not be parsed
    #[error("invalid schema definition {path}: {source}")]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Schema directory not found
    #[error("schema directory not found: {path}")]
    NotInitialized { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single field that failed validation.
///
/// Carries the input key so a form can show the message next to the right
/// control, and the label the message was written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub label: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

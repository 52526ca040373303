//! Declarative form validation for the hospital management system
//!
//! `hms-validation` turns submitted form data into typed records. Each record
//! type declares an ordered list of field rules; each rule runs the raw value
//! through a chain of named filters such as `trim|required|length(2,50)`.
//! A failing field records one message and the remaining fields still run, so
//! a rejected form can be redisplayed with every problem at once.
//!
//! # Architecture
//!
//! - **Filters**: small named functions that validate and/or transform a value
//! - **Registry**: name to filter lookup, built once and shared via `Arc`
//! - **Schemas**: ordered field rules per entity, declared in code
//!   ([`Validatable`]) or in YAML ([`SchemaCatalog`]), compiled once
//! - **Validator**: runs a schema against [`RawInput`] for a [`Stage`] and
//!   returns either a populated record or a [`Rejection`]
//!
//! ```rust,ignore
//! let validator = Validator::with_builtins();
//! match validator.validate::<Medicine>(&raw, &Stage::Create)? {
//!     Validation::Valid(medicine) => save(medicine),
//!     Validation::Invalid(rejection) => redisplay(rejection.errors, rejection.raw),
//! }
//! ```

pub mod cache;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod filter;
pub mod filters;
pub mod hospital;
pub mod input;
pub mod registry;
pub mod schema;
pub mod stage;
pub mod validator;
pub mod value;

pub use cache::SchemaCache;
pub use catalog::{builtin_definitions, SchemaCatalog, SchemaCatalogBuilder, SchemaSource};
pub use definition::{EntityDef, FieldRuleDef, FilterChain};
pub use error::{Result, ValidationError, ValidatorError};
pub use filter::{Filter, FilterDescriptor, FilterError};
pub use input::RawInput;
pub use registry::FilterRegistry;
pub use schema::{EntitySchema, FieldDecl, FieldRule, SchemaBuilder, Validatable};
pub use stage::Stage;
pub use validator::{Record, Rejection, RunReport, Validation, Validator};
pub use value::FieldValue;

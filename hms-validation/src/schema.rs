//! Entity schemas: the ordered field rules of one record type.
//!
//! A schema is declared through [`SchemaBuilder`], either by a Rust type
//! implementing [`Validatable`] or from a YAML definition, and compiled once
//! against a [`FilterRegistry`]. Compilation resolves every filter and checks
//! its arguments, so a compiled [`EntitySchema`] can no longer fail for
//! configuration reasons other than arguments a filter only rejects at run
//! time.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, ValidatorError};
use crate::filter::{split_chain, Filter, FilterDescriptor, FilterError};
use crate::registry::FilterRegistry;
use crate::stage::Stage;
use crate::value::FieldValue;

/// A type whose instances are produced by validating submitted forms.
///
/// ```rust,ignore
/// impl Validatable for Medicine {
///     const ENTITY: &'static str = "medicine";
///
///     fn declare(schema: &mut SchemaBuilder) {
///         schema
///             .field("name")
///             .label("Medicine name")
///             .filters("trim|required|length(2,50)")
///             .stages([Stage::Create, Stage::Update]);
///     }
/// }
/// ```
pub trait Validatable: 'static {
    /// Entity name used in diagnostics and catalog lookups.
    const ENTITY: &'static str;

    /// Declare the field rules. A subtype calls
    /// [`SchemaBuilder::extend`] first to inherit its parent's rules.
    fn declare(schema: &mut SchemaBuilder);
}

/// An uncompiled field rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub property: String,
    pub name: Option<String>,
    pub label: Option<String>,
    pub filters: Vec<String>,
    pub stages: Vec<Stage>,
    pub array: bool,
}

impl FieldDecl {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            name: None,
            label: None,
            filters: Vec::new(),
            stages: Vec::new(),
            array: false,
        }
    }
}

/// Collects field declarations for one entity.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    entity: String,
    parent: Option<String>,
    fields: Vec<FieldDecl>,
}

impl SchemaBuilder {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            parent: None,
            fields: Vec::new(),
        }
    }

    /// Builder for the schema of `T`.
    pub fn for_type<T: Validatable>() -> Self {
        let mut builder = Self::new(T::ENTITY);
        T::declare(&mut builder);
        builder
    }

    /// Inherit every rule of `P`. Call before declaring own fields so the
    /// parent's rules come first.
    pub fn extend<P: Validatable>(&mut self) -> &mut Self {
        if self.parent.is_none() {
            self.parent = Some(P::ENTITY.to_string());
        }
        P::declare(self);
        self
    }

    pub(crate) fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = Some(parent.into());
    }

    /// Start declaring `property`. Redeclaring a property already present
    /// (typically inherited) replaces that rule in its original position.
    pub fn field(&mut self, property: impl Into<String>) -> FieldBuilder<'_> {
        let index = self.push(FieldDecl::new(property));
        FieldBuilder {
            decl: &mut self.fields[index],
        }
    }

    /// Add a complete declaration, replacing any rule for the same property.
    pub fn push(&mut self, decl: FieldDecl) -> usize {
        match self.fields.iter().position(|f| f.property == decl.property) {
            Some(index) => {
                self.fields[index] = decl;
                index
            }
            None => {
                self.fields.push(decl);
                self.fields.len() - 1
            }
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn declarations(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Resolve filters and check arguments.
    pub fn compile(self, registry: &FilterRegistry) -> Result<EntitySchema> {
        if self.fields.is_empty() {
            return Err(ValidatorError::NoValidatedFields {
                entity: self.entity,
            });
        }

        let mut rules = Vec::with_capacity(self.fields.len());
        for decl in self.fields {
            rules.push(compile_rule(&self.entity, decl, registry)?);
        }

        debug!(entity = %self.entity, fields = rules.len(), "Compiled entity schema");
        Ok(EntitySchema {
            entity: self.entity,
            parent: self.parent,
            rules,
        })
    }
}

fn compile_rule(entity: &str, decl: FieldDecl, registry: &FilterRegistry) -> Result<FieldRule> {
    if decl.filters.is_empty() {
        return Err(ValidatorError::EmptyFilterChain {
            entity: entity.to_string(),
            field: decl.property,
        });
    }

    let mut filters = Vec::with_capacity(decl.filters.len());
    for segment in &decl.filters {
        let descriptor =
            FilterDescriptor::parse(segment).ok_or_else(|| ValidatorError::MalformedFilter {
                entity: entity.to_string(),
                field: decl.property.clone(),
                descriptor: segment.clone(),
            })?;
        let filter = registry.resolve(entity, &decl.property, &descriptor.name)?;
        filter
            .check_args(&descriptor.args)
            .map_err(|reason| ValidatorError::InvalidFilterArguments {
                entity: entity.to_string(),
                field: decl.property.clone(),
                filter: descriptor.name.clone(),
                reason,
            })?;
        filters.push(BoundFilter { descriptor, filter });
    }

    let name = decl.name.unwrap_or_else(|| decl.property.clone());
    let label = decl.label.unwrap_or_else(|| name.clone());
    let stages = if decl.stages.is_empty() {
        vec![Stage::All]
    } else {
        decl.stages
    };

    Ok(FieldRule {
        property: decl.property,
        name,
        label,
        filters,
        stages,
        array: decl.array,
    })
}

/// Fluent declaration of one field.
pub struct FieldBuilder<'a> {
    decl: &'a mut FieldDecl,
}

impl FieldBuilder<'_> {
    /// Input key to read, when it differs from the property.
    pub fn name(self, name: impl Into<String>) -> Self {
        self.decl.name = Some(name.into());
        self
    }

    pub fn label(self, label: impl Into<String>) -> Self {
        self.decl.label = Some(label.into());
        self
    }

    /// Append a `|` separated chain, e.g. `"trim|required|length(2,50)"`.
    pub fn filters(self, chain: &str) -> Self {
        self.decl.filters.extend(split_chain(chain));
        self
    }

    /// Append a single filter descriptor.
    pub fn filter(self, descriptor: impl Into<String>) -> Self {
        self.decl.filters.push(descriptor.into());
        self
    }

    pub fn stages(self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.decl.stages.extend(stages);
        self
    }

    /// Multi-valued field, read as a list.
    pub fn array(self) -> Self {
        self.decl.array = true;
        self
    }
}

/// A resolved filter together with the arguments it was declared with.
#[derive(Clone)]
pub struct BoundFilter {
    descriptor: FilterDescriptor,
    filter: Arc<dyn Filter>,
}

impl BoundFilter {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn args(&self) -> &[String] {
        &self.descriptor.args
    }

    pub fn apply(
        &self,
        label: &str,
        value: FieldValue,
    ) -> std::result::Result<FieldValue, FilterError> {
        self.filter.apply(label, value, &self.descriptor.args)
    }
}

impl fmt::Display for BoundFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.descriptor, f)
    }
}

impl fmt::Debug for BoundFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundFilter({})", self.descriptor)
    }
}

/// One field's compiled rule.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Record property the final value is assigned to.
    pub property: String,
    /// Input key.
    pub name: String,
    pub label: String,
    pub filters: Vec<BoundFilter>,
    pub stages: Vec<Stage>,
    pub array: bool,
}

impl FieldRule {
    pub fn applies_to(&self, stage: &Stage) -> bool {
        stage.selects(&self.stages)
    }

    /// The chain in compact notation.
    pub fn chain(&self) -> String {
        self.filters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// The compiled, ordered rules of one entity. Parent rules come first.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    entity: String,
    parent: Option<String>,
    rules: Vec<FieldRule>,
}

impl EntitySchema {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, property: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.property == property)
    }

    /// Rules taking part in `stage`, in declaration order.
    pub fn rules_for<'a>(&'a self, stage: &'a Stage) -> impl Iterator<Item = &'a FieldRule> + 'a {
        self.rules.iter().filter(move |r| r.applies_to(stage))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

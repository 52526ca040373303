//! SchemaCatalog: named entity schemas loaded from YAML definitions.
//!
//! Built-in definitions are embedded in the library. A schema directory can
//! add entities or replace built-in ones by name. Every schema is compiled
//! when the catalog is built, so configuration errors surface at startup.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use include_dir::{include_dir, Dir};
use indexmap::IndexMap;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::definition::EntityDef;
use crate::error::{Result, ValidatorError};
use crate::registry::FilterRegistry;
use crate::schema::{EntitySchema, SchemaBuilder};

static BUILTIN_SCHEMAS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/schemas");

/// Where a definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Builtin,
    File(PathBuf),
    Inline,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Builtin => f.write_str("builtin"),
            SchemaSource::File(path) => write!(f, "{}", path.display()),
            SchemaSource::Inline => f.write_str("inline"),
        }
    }
}

/// The definitions embedded in the library, sorted by file name.
pub fn builtin_definitions() -> Result<Vec<EntityDef>> {
    let mut files: Vec<_> = BUILTIN_SCHEMAS
        .files()
        .filter(|file| is_yaml(file.path()))
        .collect();
    files.sort_by(|a, b| a.path().cmp(b.path()));

    let mut defs = Vec::with_capacity(files.len());
    for file in files {
        let content = file.contents_utf8().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8", file.path().display()),
            )
        })?;
        let def = EntityDef::from_yaml(content).map_err(|source| ValidatorError::SchemaFile {
            path: file.path().to_path_buf(),
            source,
        })?;
        defs.push(def);
    }
    Ok(defs)
}

/// Builder for [`SchemaCatalog`]. Created by [`SchemaCatalog::open`].
pub struct SchemaCatalogBuilder {
    registry: Arc<FilterRegistry>,
    builtins: bool,
    directories: Vec<PathBuf>,
    inline: Vec<EntityDef>,
}

impl SchemaCatalogBuilder {
    /// Include the built-in definitions. They load first, so anything else
    /// with the same name replaces them.
    pub fn with_builtins(mut self) -> Self {
        self.builtins = true;
        self
    }

    /// Load every `*.yaml` / `*.yml` file in `dir`.
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Add a definition constructed in code. Loaded last.
    pub fn with_definition(mut self, def: EntityDef) -> Self {
        self.inline.push(def);
        self
    }

    /// Load all definitions, resolve inheritance and compile every schema.
    pub async fn build(self) -> Result<SchemaCatalog> {
        let mut loaded = Loaded::default();

        if self.builtins {
            let mut seen = HashSet::new();
            for def in builtin_definitions()? {
                if !seen.insert(def.name.clone()) {
                    return Err(ValidatorError::DuplicateEntity {
                        name: def.name,
                        source_name: "built-in schemas".to_string(),
                    });
                }
                loaded.insert(def, SchemaSource::Builtin);
            }
        }

        for dir in &self.directories {
            load_directory(dir, &mut loaded).await?;
        }

        let mut seen = HashSet::new();
        for def in self.inline {
            if !seen.insert(def.name.clone()) {
                return Err(ValidatorError::DuplicateEntity {
                    name: def.name,
                    source_name: "inline definitions".to_string(),
                });
            }
            loaded.insert(def, SchemaSource::Inline);
        }

        let mut schemas = IndexMap::with_capacity(loaded.definitions.len());
        for name in loaded.definitions.keys() {
            let schema = compile_definition(name, &loaded.definitions, &self.registry)?;
            schemas.insert(name.clone(), Arc::new(schema));
        }

        info!(entities = schemas.len(), "Schema catalog ready");

        Ok(SchemaCatalog {
            registry: self.registry,
            definitions: loaded.definitions,
            sources: loaded.sources,
            schemas,
        })
    }
}

#[derive(Default)]
struct Loaded {
    definitions: IndexMap<String, EntityDef>,
    sources: HashMap<String, SchemaSource>,
}

impl Loaded {
    fn insert(&mut self, def: EntityDef, source: SchemaSource) {
        if let Some(previous) = self.sources.get(&def.name) {
            warn!(
                entity = %def.name,
                replaced = %previous,
                by = %source,
                "Schema definition overrides an earlier one"
            );
        }
        debug!(entity = %def.name, %source, "Loaded schema definition");
        self.sources.insert(def.name.clone(), source);
        self.definitions.insert(def.name.clone(), def);
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

async fn load_directory(dir: &Path, loaded: &mut Loaded) -> Result<()> {
    if !fs::try_exists(dir).await? {
        return Err(ValidatorError::NotInitialized {
            path: dir.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_yaml(&path) && entry.file_type().await?.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut seen = HashSet::new();
    for path in paths {
        let content = fs::read_to_string(&path).await?;
        let def = EntityDef::from_yaml(&content).map_err(|source| ValidatorError::SchemaFile {
            path: path.clone(),
            source,
        })?;
        if !seen.insert(def.name.clone()) {
            return Err(ValidatorError::DuplicateEntity {
                name: def.name,
                source_name: dir.display().to_string(),
            });
        }
        loaded.insert(def, SchemaSource::File(path));
    }
    Ok(())
}

/// Compile `name`, prepending the fields of every ancestor.
fn compile_definition(
    name: &str,
    definitions: &IndexMap<String, EntityDef>,
    registry: &FilterRegistry,
) -> Result<EntitySchema> {
    let mut lineage: Vec<&EntityDef> = Vec::new();
    let mut current = definitions
        .get(name)
        .ok_or_else(|| ValidatorError::EntityNotFound {
            name: name.to_string(),
        })?;
    loop {
        if lineage.iter().any(|d| d.name == current.name) {
            let mut chain: Vec<&str> = lineage.iter().map(|d| d.name.as_str()).collect();
            chain.push(&current.name);
            return Err(ValidatorError::InheritanceCycle {
                chain: chain.join(" -> "),
            });
        }
        lineage.push(current);
        let Some(parent) = &current.extends else {
            break;
        };
        current = definitions
            .get(parent)
            .ok_or_else(|| ValidatorError::UnknownParent {
                entity: current.name.clone(),
                parent: parent.clone(),
            })?;
    }

    let mut builder = SchemaBuilder::new(name);
    if let Some(parent) = &lineage[0].extends {
        builder.set_parent(parent.clone());
    }
    for def in lineage.iter().rev() {
        for field in &def.fields {
            builder.push(field.to_decl());
        }
    }
    builder.compile(registry)
}

/// Compiled, named entity schemas.
#[derive(Debug)]
pub struct SchemaCatalog {
    registry: Arc<FilterRegistry>,
    definitions: IndexMap<String, EntityDef>,
    sources: HashMap<String, SchemaSource>,
    schemas: IndexMap<String, Arc<EntitySchema>>,
}

impl SchemaCatalog {
    /// Start building a catalog over `registry`.
    ///
    /// ```rust,ignore
    /// let catalog = SchemaCatalog::open(registry)
    ///     .with_builtins()
    ///     .with_directory("schemas")
    ///     .build()
    ///     .await?;
    /// ```
    pub fn open(registry: Arc<FilterRegistry>) -> SchemaCatalogBuilder {
        SchemaCatalogBuilder {
            registry,
            builtins: false,
            directories: Vec::new(),
            inline: Vec::new(),
        }
    }

    /// The compiled schema of entity `name`.
    pub fn get(&self, name: &str) -> Result<Arc<EntitySchema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| ValidatorError::EntityNotFound {
                name: name.to_string(),
            })
    }

    pub fn definition(&self, name: &str) -> Option<&EntityDef> {
        self.definitions.get(name)
    }

    pub fn source(&self, name: &str) -> Option<&SchemaSource> {
        self.sources.get(name)
    }

    /// Entity names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

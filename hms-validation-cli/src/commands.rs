//! Command handlers. Each returns the process exit code or an error that
//! `main` reports on stderr.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use hms_validation::{
    FilterRegistry, RawInput, Rejection, SchemaCatalog, Stage, Validation, Validator,
};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::cli::InputSource;
use crate::config::ValidatorConfig;
use crate::list;

/// Exit code for a submission that failed validation.
pub const INVALID_EXIT_CODE: i32 = 2;

/// Build the catalog the configuration describes.
pub async fn load_catalog(
    registry: Arc<FilterRegistry>,
    config: &ValidatorConfig,
) -> hms_validation::Result<SchemaCatalog> {
    let mut builder = SchemaCatalog::open(registry);
    if config.builtin_schemas {
        builder = builder.with_builtins();
    }
    if let Some(dir) = &config.schema_dir {
        builder = builder.with_directory(dir);
    }
    builder.build().await
}

/// The stage named on the command line, or the configured default.
pub fn resolve_stage(requested: Option<&str>, config: &ValidatorConfig) -> Stage {
    requested
        .unwrap_or(config.default_stage.as_str())
        .parse()
        .unwrap_or_default()
}

pub fn run_filters(registry: &FilterRegistry, json: bool) -> Result<i32> {
    if json {
        println!("{}", serde_json::to_string_pretty(&list::filters_json(registry))?);
    } else {
        println!("{}", list::filters_table(registry));
        println!();
        println!("{} filter(s) registered", registry.len());
    }
    Ok(0)
}

pub fn run_schemas(catalog: &SchemaCatalog, json: bool) -> Result<i32> {
    if json {
        println!("{}", serde_json::to_string_pretty(&list::schemas_json(catalog))?);
    } else if catalog.is_empty() {
        println!("No schemas loaded.");
    } else {
        println!("{}", list::schemas_table(catalog));
        println!();
        println!("{} schema(s) loaded", catalog.len());
    }
    Ok(0)
}

pub fn run_show(catalog: &SchemaCatalog, entity: &str, stage: Option<&Stage>) -> Result<i32> {
    let schema = catalog.get(entity)?;
    if let Some(definition) = catalog.definition(entity) {
        if let Some(description) = &definition.description {
            println!("{entity}: {description}");
        }
    }
    if let Some(parent) = schema.parent() {
        println!("extends {parent}");
    }
    println!("{}", list::rules_table(&schema, stage));
    Ok(0)
}

pub fn run_check(catalog: &SchemaCatalog) -> Result<i32> {
    println!("✓ {} schema(s) compiled", catalog.len());
    for name in catalog.names() {
        let source = catalog
            .source(name)
            .map(ToString::to_string)
            .unwrap_or_default();
        println!("  {name} ({source})");
    }
    Ok(0)
}

/// Read the submission named by `source`.
pub async fn read_input(source: &InputSource) -> Result<RawInput> {
    match (&source.form, &source.input) {
        (Some(form), _) => Ok(RawInput::from_urlencoded(form)),
        (None, Some(path)) => {
            let body = read_body(path).await?;
            parse_body(&body)
        }
        (None, None) => bail!("either --form or --input is required"),
    }
}

async fn read_body(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        tokio::io::stdin()
            .read_to_string(&mut body)
            .await
            .context("reading submission from stdin")?;
        return Ok(body);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading submission from {}", path.display()))
}

/// A JSON object when the body looks like one, otherwise a urlencoded body.
pub fn parse_body(body: &str) -> Result<RawInput> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(trimmed).context("submission is not valid JSON")?;
        Ok(RawInput::from_json(&value)?)
    } else {
        Ok(RawInput::from_urlencoded(trimmed))
    }
}

pub fn run_validate(
    validator: &Validator,
    catalog: &SchemaCatalog,
    entity: &str,
    stage: &Stage,
    raw: &RawInput,
    json: bool,
) -> Result<i32> {
    let schema = catalog.get(entity)?;
    let outcome = validator.validate_record(&schema, raw, stage)?;
    debug!(entity, stage = %stage, valid = outcome.is_valid(), "Validate command finished");

    match outcome {
        Validation::Valid(record) => {
            if json {
                let report = json!({ "valid": true, "entity": entity, "record": record });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✓ {entity} is valid ({stage})");
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec!["Field", "Value"]);
                for (property, value) in record.iter() {
                    table.add_row(vec![property.to_string(), value.to_string()]);
                }
                println!("{table}");
            }
            Ok(0)
        }
        Validation::Invalid(rejection) => {
            if json {
                let report = json!({
                    "valid": false,
                    "entity": entity,
                    "errors": rejection.errors,
                    "raw": rejection.raw,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_rejection(entity, stage, &rejection);
            }
            Ok(INVALID_EXIT_CODE)
        }
    }
}

fn print_rejection(entity: &str, stage: &Stage, rejection: &Rejection) {
    println!(
        "✗ {entity} has {} invalid field(s) ({stage})",
        rejection.errors.len()
    );
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Submitted", "Error"]);
    for error in &rejection.errors {
        let submitted = rejection.raw.get_array(&error.field).join(", ");
        table.add_row(vec![error.field.clone(), submitted, error.message.clone()]);
    }
    println!("{table}");
}

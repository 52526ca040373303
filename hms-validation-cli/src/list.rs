//! Tabular and JSON listings of filters, schemas and field rules.

use comfy_table::{presets::UTF8_FULL, Table};
use hms_validation::{EntitySchema, FilterRegistry, SchemaCatalog, Stage};
use serde_json::{json, Value};

/// Maximum length of a description cell before truncation.
const MAX_DESCRIPTION_LENGTH: usize = 60;

pub fn filters_table(registry: &FilterRegistry) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Filter", "Description"]);
    for (name, description) in registry.describe() {
        table.add_row(vec![
            name.to_string(),
            truncate_description(description, MAX_DESCRIPTION_LENGTH),
        ]);
    }
    table
}

pub fn filters_json(registry: &FilterRegistry) -> Value {
    Value::Array(
        registry
            .describe()
            .into_iter()
            .map(|(name, description)| json!({ "name": name, "description": description }))
            .collect(),
    )
}

pub fn schemas_table(catalog: &SchemaCatalog) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Entity", "Extends", "Fields", "Source"]);
    for row in schema_rows(catalog) {
        table.add_row(vec![
            row.name.to_string(),
            row.parent.unwrap_or("-").to_string(),
            row.fields.to_string(),
            row.source,
        ]);
    }
    table
}

pub fn schemas_json(catalog: &SchemaCatalog) -> Value {
    Value::Array(
        schema_rows(catalog)
            .into_iter()
            .map(|row| {
                json!({
                    "name": row.name,
                    "extends": row.parent,
                    "fields": row.fields,
                    "source": row.source,
                })
            })
            .collect(),
    )
}

struct SchemaRow<'a> {
    name: &'a str,
    parent: Option<&'a str>,
    fields: usize,
    source: String,
}

fn schema_rows(catalog: &SchemaCatalog) -> Vec<SchemaRow<'_>> {
    catalog
        .names()
        .into_iter()
        .filter_map(|name| {
            let schema = catalog.get(name).ok()?;
            let definition = catalog.definition(name)?;
            Some(SchemaRow {
                name,
                parent: definition.extends.as_deref(),
                fields: schema.len(),
                source: catalog
                    .source(name)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// The rules of `schema`, restricted to `stage` when given.
pub fn rules_table(schema: &EntitySchema, stage: Option<&Stage>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Input", "Label", "Filters", "Stages"]);
    for rule in schema.rules() {
        if stage.is_some_and(|s| !rule.applies_to(s)) {
            continue;
        }
        let input = if rule.array {
            format!("{}[]", rule.name)
        } else {
            rule.name.clone()
        };
        let stages = rule
            .stages
            .iter()
            .map(Stage::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            rule.property.clone(),
            input,
            rule.label.clone(),
            rule.chain(),
            stages,
        ]);
    }
    table
}

fn truncate_description(desc: &str, max_len: usize) -> String {
    if desc.chars().count() <= max_len {
        desc.to_string()
    } else {
        let kept: String = desc.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

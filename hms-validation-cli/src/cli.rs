//! CLI definition for `hms-validate`.
//!
//! Only depends on `clap` and `std`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// HMS form validation
///
/// Inspect the filter registry and schema catalog, and validate form
/// submissions from the command line.
#[derive(Parser, Debug)]
#[command(name = "hms-validate")]
#[command(version)]
#[command(about = "Check HMS form schemas and validate submissions")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file (defaults to hms-validate.toml|yaml|json in the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of YAML schema definitions, overriding the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub schemas: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered filters
    Filters {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the entities of the schema catalog
    Schemas {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the field rules of one entity
    Show {
        /// Entity name, e.g. patient
        entity: String,
        /// Only show fields validated in this stage
        #[arg(long)]
        stage: Option<String>,
    },
    /// Load and compile every schema, reporting configuration errors
    Check,
    /// Validate one submission against an entity schema
    Validate {
        /// Entity name, e.g. medicine
        entity: String,
        /// Validation stage (create, update, find, all or a custom name)
        #[arg(long)]
        stage: Option<String>,
        #[command(flatten)]
        source: InputSource,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where the submission comes from. Exactly one is required.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct InputSource {
    /// Urlencoded form body, e.g. 'name=Aspirin&quantity=10'
    #[arg(long, value_name = "QUERY")]
    pub form: Option<String>,

    /// File holding a JSON object or urlencoded body, `-` for stdin
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

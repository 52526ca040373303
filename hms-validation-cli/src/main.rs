//! hms-validate - check HMS form schemas and validate submissions.
//!
//! Commands:
//! - `hms-validate filters`: list registered filters
//! - `hms-validate schemas`: list catalog entities
//! - `hms-validate show <entity>`: show one entity's field rules
//! - `hms-validate check`: compile every schema
//! - `hms-validate validate <entity> --form QUERY | --input FILE`: validate a submission
//!
//! Exit codes:
//! - 0: Success, or the submission is valid
//! - 1: Error (configuration, schema or I/O)
//! - 2: The submission is invalid

use std::sync::Arc;

use clap::Parser;
use hms_validate::commands::{self, INVALID_EXIT_CODE};
use hms_validate::{logging, Cli, Commands, ValidatorConfig};
use hms_validation::{FilterRegistry, Stage, Validator};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match ValidatorConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = &cli.schemas {
        config.schema_dir = Some(dir.clone());
    }

    logging::init(cli.debug, &config.log_level, config.log_file.as_deref());

    let exit_code = result_to_exit(dispatch_command(cli.command, &config).await);
    std::process::exit(exit_code);
}

/// Dispatch a parsed subcommand to its handler.
async fn dispatch_command(command: Commands, config: &ValidatorConfig) -> anyhow::Result<i32> {
    let registry = Arc::new(FilterRegistry::with_builtins());

    match command {
        Commands::Filters { json } => commands::run_filters(&registry, json),
        Commands::Schemas { json } => {
            let catalog = commands::load_catalog(registry, config).await?;
            commands::run_schemas(&catalog, json)
        }
        Commands::Show { entity, stage } => {
            let catalog = commands::load_catalog(registry, config).await?;
            let stage = stage.as_deref().map(|s| commands::resolve_stage(Some(s), config));
            commands::run_show(&catalog, &entity, stage.as_ref())
        }
        Commands::Check => {
            let catalog = commands::load_catalog(registry, config).await?;
            commands::run_check(&catalog)
        }
        Commands::Validate {
            entity,
            stage,
            source,
            json,
        } => {
            let catalog = commands::load_catalog(Arc::clone(&registry), config).await?;
            let stage: Stage = commands::resolve_stage(stage.as_deref(), config);
            let raw = commands::read_input(&source).await?;
            let validator = Validator::new(registry);
            commands::run_validate(&validator, &catalog, &entity, &stage, &raw, json)
        }
    }
}

/// Convert a command result to an exit code, reporting errors on stderr.
fn result_to_exit(result: anyhow::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_validate::InputSource;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing_filters() {
        let cli = Cli::parse_from(["hms-validate", "filters", "--json"]);
        assert!(!cli.debug);
        assert!(matches!(cli.command, Commands::Filters { json: true }));
    }

    #[test]
    fn test_cli_parsing_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "hms-validate",
            "schemas",
            "--debug",
            "--schemas",
            "forms",
            "--config",
            "hms.toml",
        ]);
        assert!(cli.debug);
        assert_eq!(cli.schemas, Some(PathBuf::from("forms")));
        assert_eq!(cli.config, Some(PathBuf::from("hms.toml")));
        assert!(matches!(cli.command, Commands::Schemas { json: false }));
    }

    #[test]
    fn test_cli_parsing_show_with_stage() {
        let cli = Cli::parse_from(["hms-validate", "show", "medicine", "--stage", "update"]);
        match cli.command {
            Commands::Show { entity, stage } => {
                assert_eq!(entity, "medicine");
                assert_eq!(stage.as_deref(), Some("update"));
            }
            other => panic!("Expected Show command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parsing_check() {
        let cli = Cli::parse_from(["hms-validate", "check"]);
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_cli_parsing_validate_form() {
        let cli = Cli::parse_from([
            "hms-validate",
            "validate",
            "dispense",
            "--form",
            "mrn=ABCD123&drug_ids=4",
        ]);
        match cli.command {
            Commands::Validate {
                entity,
                stage,
                source,
                json,
            } => {
                assert_eq!(entity, "dispense");
                assert_eq!(stage, None);
                assert!(!json);
                assert_eq!(
                    source,
                    InputSource {
                        form: Some("mrn=ABCD123&drug_ids=4".into()),
                        input: None,
                    }
                );
            }
            other => panic!("Expected Validate command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parsing_validate_stdin() {
        let cli = Cli::parse_from([
            "hms-validate",
            "validate",
            "patient",
            "--stage",
            "create",
            "--input",
            "-",
            "--json",
        ]);
        match cli.command {
            Commands::Validate { source, json, .. } => {
                assert_eq!(source.input, Some(PathBuf::from("-")));
                assert!(json);
            }
            other => panic!("Expected Validate command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_validate_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["hms-validate", "validate", "patient"]).is_err());
        assert!(Cli::try_parse_from([
            "hms-validate",
            "validate",
            "patient",
            "--form",
            "a=1",
            "--input",
            "x.json",
        ])
        .is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["hms-validate"]).is_err());
    }

    #[test]
    fn test_invalid_exit_code_is_two() {
        assert_eq!(INVALID_EXIT_CODE, 2);
    }

    #[test]
    fn test_result_to_exit() {
        assert_eq!(result_to_exit(Ok(0)), 0);
        assert_eq!(result_to_exit(Ok(INVALID_EXIT_CODE)), 2);
        assert_eq!(result_to_exit(Err(anyhow::anyhow!("broken schema"))), 1);
    }
}

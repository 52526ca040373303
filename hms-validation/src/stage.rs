//! Validation stages.
//!
//! A stage selects which fields of a schema are validated for a given
//! operation, so one schema can serve a create form, an update form and a
//! lookup by id.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    /// Wildcard: a field tagged `All` is validated in every stage.
    #[default]
    All,
    Create,
    Update,
    Find,
    Custom(String),
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::All => "all",
            Stage::Create => "create",
            Stage::Update => "update",
            Stage::Find => "find",
            Stage::Custom(name) => name,
        }
    }

    /// Whether a field tagged with `tags` takes part in this stage.
    pub fn selects(&self, tags: &[Stage]) -> bool {
        tags.iter().any(|tag| tag == &Stage::All || tag == self)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Stage::from(s.to_string()))
    }
}

impl From<String> for Stage {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Stage::All,
            "create" => Stage::Create,
            "update" => Stage::Update,
            "find" => Stage::Find,
            other => Stage::Custom(other.to_string()),
        }
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_and_custom_stages() {
        assert_eq!("Create".parse::<Stage>().unwrap(), Stage::Create);
        assert_eq!(" update ".parse::<Stage>().unwrap(), Stage::Update);
        assert_eq!(
            "discharge".parse::<Stage>().unwrap(),
            Stage::Custom("discharge".into())
        );
    }

    #[test]
    fn all_tag_is_a_wildcard() {
        assert!(Stage::Update.selects(&[Stage::All]));
        assert!(Stage::Update.selects(&[Stage::Find, Stage::Update]));
        assert!(!Stage::Update.selects(&[Stage::Create]));
        assert!(!Stage::All.selects(&[Stage::Create]));
    }

    #[test]
    fn yaml_round_trip_uses_lowercase_names() {
        let stages = vec![Stage::Create, Stage::Custom("x".into())];
        let yaml = serde_yaml_ng::to_string(&stages).unwrap();
        assert_eq!(yaml, "- create\n- x\n");
        let parsed: Vec<Stage> = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, vec![Stage::Create, Stage::Custom("x".into())]);
    }
}

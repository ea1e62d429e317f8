//! Declarative YAML scenario specification
//!
//! Scenarios that need no Rust-side verification can be written as YAML
//! documents and dropped into a spec directory. The code-defined suite in
//! [`crate::scenarios`] covers the contractual cases; this layer exists for
//! ad-hoc smoke checks against a running board.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::E2eResult;
use crate::step::PageStep;

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<PageStep>,
}

impl ScenarioSpec {
    /// Parse a scenario spec from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a scenario spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all scenario specs from a directory
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}

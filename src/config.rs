//! YAML configuration for layouts and cluster naming.
//!
//! Every section is optional; missing values fall back to defaults.

use crate::graph::{default_naming_rules, NamingRule};
use crate::layout::{ForceParams, LayeredParams};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Cluster naming settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Naming rules replacing the built-in domain rules
    pub rules: Option<Vec<NamingRule>>,
    /// Extra rules checked before the active rule set
    pub extra_rules: Vec<NamingRule>,
}

impl ClusterConfig {
    /// Rules in evaluation order
    pub fn naming_rules(&self) -> Vec<NamingRule> {
        let base = self.rules.clone().unwrap_or_else(default_naming_rules);
        self.extra_rules.iter().cloned().chain(base).collect()
    }
}

/// Complete YAML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Force simulation constants
    pub force: ForceParams,
    /// Layered layout spacing and direction
    pub layered: LayeredParams,
    /// Cluster naming
    pub clusters: ClusterConfig,
}

impl AtlasConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: AtlasConfig = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }
}

//! Configuration loading from irmetrics.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::classify::{RegexPredicate, SyntheticNamePredicate, VariablePredicate};
use crate::lines::SourceLayout;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "irmetrics.toml";

/// Main configuration structure for irmetrics.toml.
#[derive(Debug, Deserialize, Default)]
pub struct IrMetricsConfig {
    /// Classes to generate; all classpath classes when absent.
    pub class_list: Option<Vec<String>>,
    /// Enables the line-tag propagation pre-transform.
    pub pre_transform: Option<bool>,
    /// Delete the output tree before generating.
    pub replace_existing: Option<bool>,
    pub classifier: Option<ClassifierConfig>,
    pub lines: Option<LinesConfig>,
    pub output: Option<OutputConfig>,
}

/// Stack variable naming convention.
#[derive(Debug, Deserialize, Default)]
pub struct ClassifierConfig {
    pub stack_variable_pattern: Option<String>,
}

/// Source layout used by line resolution.
#[derive(Debug, Deserialize, Default)]
pub struct LinesConfig {
    pub source_roots: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl IrMetricsConfig {
    /// Variable predicate, the default naming convention unless a pattern is set.
    pub fn predicate(&self) -> Result<Box<dyn VariablePredicate>> {
        match self
            .classifier
            .as_ref()
            .and_then(|c| c.stack_variable_pattern.as_deref())
        {
            Some(pattern) => Ok(Box::new(
                RegexPredicate::new(pattern).context("Invalid stack_variable_pattern")?,
            )),
            None => Ok(Box::new(SyntheticNamePredicate)),
        }
    }

    /// Source layout with configured overrides.
    pub fn source_layout(&self) -> SourceLayout {
        let mut layout = SourceLayout::default();
        if let Some(lines) = &self.lines {
            if let Some(roots) = &lines.source_roots {
                layout.source_roots = roots.clone();
            }
            if let Some(exts) = &lines.extensions {
                layout.extensions = exts.iter().map(|e| e.trim_start_matches('.').to_string()).collect();
            }
        }
        layout
    }

    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads configuration from `path` if it exists.
pub fn load_config(path: &Path) -> Result<Option<IrMetricsConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg = toml::from_str(&content)
        .with_context(|| format!("Invalid {}", path.display()))?;
    Ok(Some(cfg))
}

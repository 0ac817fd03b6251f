//! Runtime configuration for the template versioning services.
//!
//! Defaults are suitable for most deployments. A host can override any value
//! through `MODELFOLIO_*` environment variables via [`VersioningConfig::from_env`].

use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GENERATION_LABEL_PREFIX, DEFAULT_TEMPLATE_NAME, ENV_PREFIX};
use crate::errors::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VersioningConfig {
    /// Per-call timeout for Fund Catalog and Product Registry lookups (default: 5000)
    pub collaborator_timeout_ms: u64,

    /// Max concurrent registry lookups while building a checklist (default: 4)
    pub checklist_concurrency: usize,

    /// Products started more than this many days ago are high priority (default: 365)
    pub high_priority_after_days: i64,

    /// Products started at least this many days ago are medium priority (default: 180)
    pub medium_priority_after_days: i64,

    /// Label used when a template is created with an empty name
    pub default_template_name: String,

    /// Prefix of the positional label for unnamed generations
    pub generation_label_prefix: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_ms: 5_000,
            checklist_concurrency: 4,
            high_priority_after_days: 365,
            medium_priority_after_days: 180,
            default_template_name: DEFAULT_TEMPLATE_NAME.to_string(),
            generation_label_prefix: DEFAULT_GENERATION_LABEL_PREFIX.to_string(),
        }
    }
}

impl VersioningConfig {
    /// Builds a configuration from defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays values from an arbitrary key lookup. Unparseable values are
    /// logged and skipped.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = parse_var::<u64>("COLLABORATOR_TIMEOUT_MS", var("COLLABORATOR_TIMEOUT_MS")) {
            config.collaborator_timeout_ms = v;
        }
        if let Some(v) = parse_var::<usize>("CHECKLIST_CONCURRENCY", var("CHECKLIST_CONCURRENCY")) {
            config.checklist_concurrency = v;
        }
        if let Some(v) = parse_var::<i64>("HIGH_PRIORITY_AFTER_DAYS", var("HIGH_PRIORITY_AFTER_DAYS")) {
            config.high_priority_after_days = v;
        }
        if let Some(v) =
            parse_var::<i64>("MEDIUM_PRIORITY_AFTER_DAYS", var("MEDIUM_PRIORITY_AFTER_DAYS"))
        {
            config.medium_priority_after_days = v;
        }
        if let Some(v) = var("DEFAULT_TEMPLATE_NAME").filter(|s| !s.trim().is_empty()) {
            config.default_template_name = v;
        }
        if let Some(v) = var("GENERATION_LABEL_PREFIX").filter(|s| !s.trim().is_empty()) {
            config.generation_label_prefix = v;
        }

        config
    }

    /// Rejects settings that would make the services misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.collaborator_timeout_ms == 0 {
            return Err(Error::InvalidConfigValue(
                "collaboratorTimeoutMs must be greater than zero".to_string(),
            ));
        }
        if self.checklist_concurrency == 0 {
            return Err(Error::InvalidConfigValue(
                "checklistConcurrency must be greater than zero".to_string(),
            ));
        }
        if self.medium_priority_after_days < 0
            || self.medium_priority_after_days >= self.high_priority_after_days
        {
            return Err(Error::InvalidConfigValue(format!(
                "mediumPriorityAfterDays ({}) must be non-negative and below highPriorityAfterDays ({})",
                self.medium_priority_after_days, self.high_priority_after_days
            )));
        }
        Ok(())
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring invalid value '{}' for {}{}", raw, ENV_PREFIX, name);
            None
        }
    }
}

//! Pretty-printed JSON view of the active server configuration file.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::registry::{ContentKind, Resource, ResourceContent};

const FALLBACK: &str = "Configuration not found. Run the installer first.";

pub struct ConfigSnapshotResource {
    path: PathBuf,
}

impl ConfigSnapshotResource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Resource for ConfigSnapshotResource {
    fn uri(&self) -> &str {
        "config://appscope"
    }

    fn name(&self) -> &str {
        "AppScope Configuration"
    }

    fn description(&self) -> &str {
        "Current AppScope server configuration and status"
    }

    fn read(&self) -> Result<ResourceContent> {
        if !self.path.is_file() {
            return Ok(ResourceContent {
                text: FALLBACK.to_string(),
                kind: ContentKind::Text,
            });
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let parsed: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        let text = serde_json::to_string_pretty(&serde_json::to_value(parsed)?)?;
        Ok(ResourceContent {
            text,
            kind: ContentKind::Json,
        })
    }
}

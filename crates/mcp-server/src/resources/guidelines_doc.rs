//! The project-level guidelines document, served whole as markdown.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::registry::{ContentKind, Resource, ResourceContent};

const FALLBACK: &str = "Guidelines not yet installed. Run the installer first.";

pub struct GuidelinesResource {
    path: PathBuf,
}

impl GuidelinesResource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Resource for GuidelinesResource {
    fn uri(&self) -> &str {
        "guidelines://core"
    }

    fn name(&self) -> &str {
        "Framework and Application Guidelines"
    }

    fn description(&self) -> &str {
        "Framework and application guidelines and best practices"
    }

    fn read(&self) -> Result<ResourceContent> {
        if !self.path.is_file() {
            return Ok(ResourceContent {
                text: FALLBACK.to_string(),
                kind: ContentKind::Text,
            });
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(ResourceContent {
            text,
            kind: ContentKind::Markdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serves_the_document_as_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GUIDELINES.md");
        std::fs::write(&path, "# Project Guidelines\n\nUse migrations.\n").unwrap();

        let content = GuidelinesResource::new(path).read().unwrap();
        assert_eq!(content.kind, ContentKind::Markdown);
        assert_eq!(content.text, "# Project Guidelines\n\nUse migrations.\n");
    }

    #[test]
    fn missing_document_falls_back_to_installer_hint() {
        let dir = tempfile::tempdir().unwrap();
        let content = GuidelinesResource::new(dir.path().join("GUIDELINES.md"))
            .read()
            .unwrap();
        assert_eq!(content.kind, ContentKind::Text);
        assert_eq!(
            content.text,
            "Guidelines not yet installed. Run the installer first."
        );
    }
}

//! Guideline document listing and retrieval with heuristic scoring.

use std::sync::Arc;

use anyhow::Result;
use regex::Regex;
use serde_json::{json, Value};

use crate::host::{GuidelineDoc, GuidelineStore};
use crate::registry::Tool;

static TITLE_RE: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("valid regex"));

pub struct SearchGuidelinesTool {
    guidelines: Arc<dyn GuidelineStore>,
}

impl SearchGuidelinesTool {
    pub fn new(guidelines: Arc<dyn GuidelineStore>) -> Self {
        Self { guidelines }
    }

    fn list_topics(&self, docs: &[GuidelineDoc], category: &str) -> String {
        // Grouped by directory in first-encountered order.
        let mut topics: Vec<(String, Vec<(String, f64)>)> = Vec::new();
        for doc in docs {
            let cat = file_category(&doc.path);
            if category != "all" && cat != category {
                continue;
            }
            let name = file_name(&doc.path);
            let stem = name.strip_suffix(".md").unwrap_or(name);
            let title = TITLE_RE
                .captures(&doc.content)
                .and_then(|c| c.get(1))
                .map_or_else(|| stem.to_string(), |m| m.as_str().to_string());
            let size_kb = (doc.content.len() as f64 / 1024.0 * 10.0).round() / 10.0;
            match topics.iter_mut().find(|(known, _)| known == cat) {
                Some((_, items)) => items.push((title, size_kb)),
                None => topics.push((cat.to_string(), vec![(title, size_kb)])),
            }
        }

        if topics.is_empty() {
            let scope = if category != "all" {
                format!(" in category '{category}'")
            } else {
                String::new()
            };
            return format!("No guidelines found{scope}.");
        }

        let mut output = String::from("Available Application Guidelines:\n\n");
        for (cat, items) in &topics {
            output.push_str(&format!("## {cat}\n"));
            for (title, size) in items {
                output.push_str(&format!("  - {title} ({size}KB)\n"));
            }
            output.push('\n');
        }
        output.push_str(
            "Use search_guidelines with a query to get full content (e.g., query: 'migration')",
        );
        output
    }

    /// Filename hits weigh 10, content occurrences cap at 5, top three
    /// documents come back in full.
    fn search(&self, docs: &[GuidelineDoc], query: &str, category: &str) -> String {
        let mut results: Vec<(&GuidelineDoc, u32)> = Vec::new();
        for doc in docs {
            let cat = file_category(&doc.path);
            if category != "all" && cat != category && !cat.contains(category) {
                continue;
            }

            let mut score = 0u32;
            if file_name(&doc.path).to_lowercase().contains(query) {
                score += 10;
            }
            let occurrences = doc.content.to_lowercase().matches(query).count();
            score += occurrences.min(5) as u32;

            if score > 0 {
                results.push((doc, score));
            }
        }

        results.sort_by(|a, b| b.1.cmp(&a.1));

        let top: Vec<_> = results.into_iter().take(3).collect();
        if top.is_empty() {
            return format!(
                "No guidelines found matching '{query}'. Use empty query to list available topics."
            );
        }

        let mut output = format!("Found {} relevant guidelines:\n\n", top.len());
        for (doc, _) in top {
            output.push_str(&format!("--- File: {} ---\n{}\n\n", doc.path, doc.content));
        }
        output
    }
}

fn file_category(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => ".",
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

impl Tool for SearchGuidelinesTool {
    fn name(&self) -> &str {
        "search_guidelines"
    }

    fn description(&self) -> &str {
        "Searches the local application guidelines for framework-specific context, best practices, and code examples. Use this when the user asks \"How do I...\" questions about the framework."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search term (e.g., \"migration\", \"active record\"). Leave empty to list all available topics.",
                },
                "category": {
                    "type": "string",
                    "description": "Optional category to filter results",
                    "default": "all",
                },
            },
            "required": [],
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        let category = args.get("category").and_then(Value::as_str).unwrap_or("all");

        if !self.guidelines.available() {
            return Ok(json!(format!(
                "No guidelines found at {}. Run the installer first.",
                self.guidelines.location()
            )));
        }

        let docs = self.guidelines.documents()?;
        let text = if query.is_empty() {
            self.list_topics(&docs, category)
        } else {
            self.search(&docs, &query, category)
        };
        Ok(Value::String(text))
    }
}

//! Tool and resource registries.
//!
//! Both registries are built once at startup and never mutated afterwards.
//! The dispatcher owns them; there is no ambient global state.

use anyhow::Result;
use serde_json::Value;

use appscope_protocol::{ResourceDescriptor, ToolDescriptor};

/// A named, schema-described operation exposed through `tools/call`.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON-Schema-shaped description of the accepted arguments.
    fn input_schema(&self) -> Value;
    /// Execute with the raw `arguments` object. A string result passes
    /// through `tools/call` verbatim; anything else is rendered as pretty
    /// JSON by the dispatcher.
    fn execute(&self, args: &Value) -> Result<Value>;
}

/// Registration-ordered tool set. `tools/list` preserves this order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(Box::as_ref)
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

/// Payload of a resource read, before MIME mapping.
#[derive(Debug, Clone)]
pub struct ResourceContent {
    pub text: String,
    pub kind: ContentKind,
}

/// Internal content tag, mapped to a MIME type at the protocol boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Markdown,
    Text,
}

impl ContentKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentKind::Json => "application/json",
            ContentKind::Markdown => "text/markdown",
            ContentKind::Text => "text/plain",
        }
    }
}

/// A URI-addressed piece of content exposed through `resources/read`.
pub trait Resource: Send + Sync {
    fn uri(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn read(&self) -> Result<ResourceContent>;
}

/// Registration-ordered resource set, keyed by URI.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: Vec<Box<dyn Resource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource: Box<dyn Resource>) {
        self.resources.push(resource);
    }

    pub fn get(&self, uri: &str) -> Option<&dyn Resource> {
        self.resources
            .iter()
            .find(|resource| resource.uri() == uri)
            .map(Box::as_ref)
    }

    pub fn descriptors(&self) -> Vec<ResourceDescriptor> {
        self.resources
            .iter()
            .map(|resource| ResourceDescriptor {
                uri: resource.uri().to_string(),
                name: resource.name().to_string(),
                description: resource.description().to_string(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NamedTool(&'static str);

    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        fn execute(&self, _args: &Value) -> Result<Value> {
            Ok(json!({ "from": self.0 }))
        }
    }

    #[test]
    fn lookup_finds_registered_tools_only() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NamedTool("alpha")));
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("beta").is_none());
    }

    #[test]
    fn descriptors_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NamedTool("beta")));
        registry.register(Box::new(NamedTool("alpha")));
        let names: Vec<String> = registry
            .descriptors()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["beta", "alpha"]);
    }

    #[test]
    fn content_kind_maps_to_mime_types() {
        assert_eq!(ContentKind::Json.mime_type(), "application/json");
        assert_eq!(ContentKind::Markdown.mime_type(), "text/markdown");
        assert_eq!(ContentKind::Text.mime_type(), "text/plain");
    }
}

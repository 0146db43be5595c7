//! Tool registry
//!
//! Manages the collection of available tools and their metadata.

use crate::error::ToolError;
use crate::tools::category::{OperationType, ToolCategory};
use crate::tools::executor::ToolInfo;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
// async_trait required for dyn-compatibility with Box<dyn ToolHandler>
use async_trait::async_trait;
use schemars::Schema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Compile-time tool registration entry for auto-discovery
///
/// This struct is submitted via `inventory::submit!` by the `#[gitlab_tool]` macro,
/// allowing tools to be automatically registered without explicit calls.
pub struct ToolRegistration {
    /// Function that registers the tool with a registry
    pub register_fn: fn(&mut ToolRegistry),
}

inventory::collect!(ToolRegistration);

/// A registered tool with all its metadata
pub struct RegisteredTool {
    /// Tool name
    pub name: &'static str,
    /// Tool description
    pub description: &'static str,
    /// GitLab resource area the tool works on
    pub category: ToolCategory,
    /// What the tool does to that resource
    pub operation: OperationType,
    /// JSON Schema for the tool's input
    pub input_schema: Schema,
    /// The tool handler
    handler: Box<dyn ToolHandler>,
}

/// Internal trait for type-erased tool handling
#[async_trait]
trait ToolHandler: Send + Sync {
    /// Execute the tool with raw JSON arguments
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolOutput, ToolError>;
}

/// Generic tool handler implementation
struct TypedToolHandler<T>
where
    T: ToolExecutor + DeserializeOwned + 'static,
{
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedToolHandler<T>
where
    T: ToolExecutor + DeserializeOwned + 'static,
{
    fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T> ToolHandler for TypedToolHandler<T>
where
    T: ToolExecutor + DeserializeOwned + Send + Sync + 'static,
{
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<ToolOutput, ToolError> {
        // Clients may send no arguments at all for tools without required fields
        let args = match args {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let tool: T = serde_json::from_value(args).map_err(|e| {
            ToolError::InvalidArguments(format!("Failed to parse arguments: {}", e))
        })?;

        tool.execute(ctx).await
    }
}

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<&'static str, RegisteredTool>,
    by_category: BTreeMap<ToolCategory, Vec<&'static str>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            by_category: BTreeMap::new(),
        }
    }

    /// Register a tool
    pub fn register<T>(&mut self)
    where
        T: ToolExecutor
            + DeserializeOwned
            + schemars::JsonSchema
            + ToolInfo
            + Send
            + Sync
            + 'static,
    {
        let name = <T as ToolInfo>::name();
        let description = <T as ToolInfo>::description();
        let category = <T as ToolInfo>::category();
        let operation = <T as ToolInfo>::operation_type();

        let input_schema = schemars::schema_for!(T);

        let tool = RegisteredTool {
            name,
            description,
            category,
            operation,
            input_schema,
            handler: Box::new(TypedToolHandler::<T>::new()),
        };

        if self.tools.insert(name, tool).is_some() {
            warn!(name = name, "Tool registered twice, keeping the latest");
        } else {
            self.by_category.entry(category).or_default().push(name);
        }

        debug!(name = name, category = %category, "Registered tool");
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Get all tool names
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().copied()
    }

    /// Get all tools
    pub fn tools(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.values()
    }

    /// Get tools by category
    pub fn tools_in_category(&self, category: ToolCategory) -> Vec<&RegisteredTool> {
        self.by_category
            .get(&category)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| self.tools.get(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Register all tools discovered via `#[gitlab_tool]` macro
    ///
    /// This method iterates over all `ToolRegistration` entries submitted at compile time
    /// and registers each tool with this registry.
    pub fn register_all_auto(&mut self) {
        for registration in inventory::iter::<ToolRegistration> {
            (registration.register_fn)(self);
        }
    }

    /// Execute a tool by name
    #[instrument(skip(self, ctx, args), fields(tool = %name, request_id = %ctx.request_id))]
    pub async fn execute(
        &self,
        name: &str,
        ctx: &ToolContext,
        args: Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let start = Instant::now();
        let result = tool.handler.call(ctx, args).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(
                category = %tool.category,
                duration_ms,
                "Tool call succeeded"
            ),
            Err(e) => warn!(
                category = %tool.category,
                duration_ms,
                error_kind = e.kind(),
                error = %e,
                "Tool call failed"
            ),
        }

        result
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_tool_not_found() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_auto_registration_indexes_categories() {
        let mut registry = ToolRegistry::new();
        registry.register_all_auto();

        assert!(!registry.is_empty());
        let per_category: usize = ToolCategory::all()
            .iter()
            .map(|c| registry.tools_in_category(*c).len())
            .sum();
        assert_eq!(per_category, registry.len());

        let branches: Vec<&str> = registry
            .tools_in_category(ToolCategory::Branches)
            .iter()
            .map(|t| t.name)
            .collect();
        assert!(branches.contains(&"create_branch"));
    }
}

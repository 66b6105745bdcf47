pub mod arguments;
pub mod lifecycle;
pub mod models;
pub mod traits;

pub use traits::{Tool, ToolDefinition};

use crate::error::ToolError;
use crate::lmstudio::LmStudioClient;
use crate::types::{ToolInvocation, ToolResult};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Tool registry
// ---------------------------------------------------------------------------

/// Static catalog of the model-control tools, in registration order.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: vec![
                Box::new(models::ListModels),
                Box::new(models::GetModelDetails),
                Box::new(lifecycle::LoadModel),
                Box::new(lifecycle::UnloadModel),
                Box::new(lifecycle::ConfigureModel),
            ],
        }
    }

    /// Definitions of every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Build the list of tool definitions exposed to the calling agent.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolRegistry::new().definitions()
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Routes invocations to tools and folds every outcome into a `ToolResult`.
pub struct ToolDispatcher {
    registry: ToolRegistry,
    client: LmStudioClient,
}

impl ToolDispatcher {
    pub fn new(client: LmStudioClient) -> Self {
        Self {
            registry: ToolRegistry::new(),
            client,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Execute a tool call. Never fails: errors come back flagged.
    pub async fn handle(&self, invocation: &ToolInvocation) -> ToolResult {
        match self.try_handle(invocation).await {
            Ok(output) => ToolResult::success(output),
            Err(e) => {
                if e.is_validation() {
                    debug!("Rejected call to '{}': {}", invocation.name, e);
                } else {
                    warn!("Tool '{}' failed: {}", invocation.name, e);
                }
                ToolResult::error(format!("Error: {}", e))
            }
        }
    }

    async fn try_handle(&self, invocation: &ToolInvocation) -> Result<String, ToolError> {
        let tool = self
            .registry
            .get(&invocation.name)
            .ok_or_else(|| ToolError::UnknownTool(invocation.name.clone()))?;

        arguments::validate(&tool.definition(), &invocation.arguments)?;

        debug!("Executing tool '{}'", invocation.name);
        tool.execute(&self.client, &invocation.arguments).await
    }
}

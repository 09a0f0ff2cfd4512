//! MCP Tools for Infraviz
//!
//! Exposes the infrastructure lifecycle to MCP clients: generate a stack
//! from natural language, update it, deploy it.

use infraviz_engine::InfraService;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use std::sync::Arc;

/// Infraviz MCP Service
#[derive(Clone)]
pub struct InfraVizService {
    engine: Arc<InfraService>,
    tool_router: ToolRouter<Self>,
}

impl InfraVizService {
    pub fn new(engine: Arc<InfraService>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for InfraVizService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Infraviz designs and visualizes cloud infrastructure from natural language. Use 'generate_infrastructure' to create a stack and get its graph, 'update_infrastructure' to modify it by stack id, and 'deploy' to provision it.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateRequest {
    /// What to build
    #[schemars(
        description = "Natural language description of the infrastructure, e.g. 'A Next.js app with Postgres database and S3 file storage'"
    )]
    pub description: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRequest {
    /// The change to apply
    #[schemars(
        description = "Description of the change to make, e.g. 'Add a Redis cache cluster' or 'Replace RDS with DynamoDB'"
    )]
    pub change_description: String,

    /// Which stack to change
    #[schemars(description = "The stack ID returned by generate_infrastructure")]
    pub stack_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeployRequest {
    /// Which stack to deploy
    #[schemars(description = "The stack ID to deploy")]
    pub stack_id: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl InfraVizService {
    /// Create a new stack and return its graph payload.
    #[tool(
        description = "Generate an interactive cloud infrastructure diagram from a natural language description. Use this when the user wants to design, plan, or visualize cloud infrastructure. Returns the graph with cost estimates and a stack ID for follow-up calls."
    )]
    pub async fn generate_infrastructure(
        &self,
        Parameters(request): Parameters<GenerateRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.engine.generate(&request.description).await {
            Ok(payload) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::to_string_pretty(&payload).unwrap_or_default(),
            )])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Error: {e}"
            ))])),
        }
    }

    /// Apply a change description to an existing stack.
    #[tool(
        description = "Update an existing infrastructure diagram based on a change description. Use this when the user wants to add, remove, or modify resources in an existing design."
    )]
    pub async fn update_infrastructure(
        &self,
        Parameters(request): Parameters<UpdateRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .engine
            .update(&request.stack_id, &request.change_description)
            .await
        {
            Ok(payload) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::to_string_pretty(&payload).unwrap_or_default(),
            )])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Error: {e}"
            ))])),
        }
    }

    /// Deploy a stack; the outcome is always a structured result.
    #[tool(
        description = "Deploy a generated infrastructure stack through the provisioning engine. Called by the infrastructure graph widget's Deploy button."
    )]
    pub async fn deploy(
        &self,
        Parameters(request): Parameters<DeployRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.engine.deploy(&request.stack_id).await;
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&result).unwrap_or_default(),
        )]))
    }
}

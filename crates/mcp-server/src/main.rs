//! Infraviz MCP Server
//!
//! Design and visualize cloud infrastructure through natural language.
//! Generates infrastructure programs and renders them as positioned
//! dependency graphs with cost estimates.
//!
//! ## Tools
//!
//! - `generate_infrastructure` - create a new stack from a description
//! - `update_infrastructure` - apply a change to an existing stack
//! - `deploy` - deploy a stack through the provisioning engine
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "infraviz": {
//!       "command": "infraviz-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use infraviz_engine::{
    CodeGenerator, InfraService, OpenAiCodeGenerator, Provisioner, PulumiCli,
    UnconfiguredCodeGenerator,
};
use infraviz_stack_store::StackStore;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use std::path::PathBuf;
use std::sync::Arc;

mod tools;

use tools::InfraVizService;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting Infraviz MCP server");

    let base_dir = std::env::var_os("INFRAVIZ_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    let store = Arc::new(StackStore::with_base_dir(base_dir));

    let codegen: Box<dyn CodeGenerator> = match OpenAiCodeGenerator::from_env() {
        Ok(generator) => Box::new(generator),
        Err(err) => {
            log::warn!("Code generation disabled: {err:#}");
            Box::new(UnconfiguredCodeGenerator::new(format!("{err:#}")))
        }
    };

    let provisioner = PulumiCli::new();
    log::info!(
        "Provisioning subprocess support: {}",
        if provisioner.supports_subprocess().await {
            "enabled"
        } else {
            "disabled (static parser fallback)"
        }
    );

    let engine = Arc::new(InfraService::new(store, codegen, Box::new(provisioner)));
    let service = InfraVizService::new(engine);
    let server = service.serve(stdio()).await?;

    // Wait for shutdown
    server.waiting().await?;

    log::info!("Infraviz MCP server stopped");
    Ok(())
}

//! Orchestration of the infrastructure visualization lifecycle.
//!
//! Ties the collaborators together: natural language goes to the
//! code-generation collaborator, the resulting program goes to the
//! provisioning collaborator for a change preview (with a static text scan
//! as the fallback), preview events become an annotated graph, and the
//! whole stack state is persisted per stack id. Update and deploy calls for
//! one stack are serialized through the store's per-stack lock.

mod codegen;
mod error;
mod ids;
mod program;
mod provision;
mod service;
mod static_parse;

pub use codegen::{CodeGenerator, OpenAiCodeGenerator, UnconfiguredCodeGenerator};
pub use error::{EngineError, Result};
pub use ids::new_stack_id;
pub use program::write_program;
pub use provision::{LogSink, Provisioner, PulumiCli};
pub use service::{DeployOutcome, DeployResult, GraphPayload, InfraService};
pub use static_parse::parse_resources_from_code;

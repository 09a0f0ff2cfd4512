//! Keyed record store for a stack's generated code, graph, and deploy
//! status.
//!
//! Two tiers: a process-lifetime cache (authoritative while the process is
//! alive) and one durable JSON document per stack. Writes go through both;
//! durable-tier failures are swallowed so visualization keeps working in
//! sandboxed environments. Reads fall back from cache to the durable
//! document and hydrate the cache on success.

mod record;
mod store;

pub use record::{unix_ms_now, DeployStatus, StackRecord};
pub use store::StackStore;

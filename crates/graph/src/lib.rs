//! # Infraviz Graph
//!
//! Converts infrastructure change-preview events into a positioned,
//! deduplicated dependency graph for interactive visualization.
//!
//! ## Architecture
//!
//! ```text
//! PreviewEvent[]
//!     │
//!     ├──> Event Filter (drop stack/provider bookkeeping resources)
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Parse URNs (provider, resource type, name)
//!     │      ├─ Assign dense node ids in event order
//!     │      ├─ Parent edges, then dependency edges
//!     │      └─ Collapse duplicate (source, target) pairs
//!     │
//!     └──> Layout Engine (layered top-to-bottom DAG placement)
//!            ├─ Rank = longest path from a root
//!            ├─ Barycenter ordering within ranks
//!            └─ Fixed-size boxes, fixed gaps, deterministic output
//! ```

mod types;
mod urn;
mod display;
mod builder;
mod dedup;
mod layout;

pub use types::{GraphEdge, GraphNode, InfraGraph, NodeData, Position, PreviewEvent};
pub use urn::{filter_events, parse_urn, ParsedUrn};
pub use display::short_type_for;
pub use builder::GraphBuilder;
pub use dedup::dedup_edges;
pub use layout::{layout_centers, NODE_HEIGHT, NODE_WIDTH};

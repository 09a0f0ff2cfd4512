use serde::{Deserialize, Serialize};

/// One resource's planned change, as emitted by the planning step.
///
/// `urn` is globally unique within an event set. `resource_type` carries the
/// full provider type token (e.g. `aws:s3/bucket:Bucket`) and doubles as the
/// filter key for bookkeeping pseudo-resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewEvent {
    pub urn: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    pub op: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl PreviewEvent {
    pub fn new(urn: impl Into<String>, resource_type: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            resource_type: resource_type.into(),
            op: op.into(),
            parent: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// 2-D point. Graph nodes store top-left-anchored positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Display payload attached to each graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    pub short_type: String,
    pub provider: String,
    pub op: String,
    /// Monthly USD estimate; `None` means no estimate, which is distinct
    /// from an estimate of zero and serializes as JSON null.
    pub estimated_cost: Option<f64>,
    pub resource_type: String,
}

/// Node in the visualization graph.
///
/// Ids are assigned sequentially (`node-0`, `node-1`, ...) in filtered-event
/// order and are immutable within a single conversion run. The `node_type`
/// discriminator selects the renderer on the UI side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
    #[serde(rename = "type")]
    pub node_type: String,
}

/// Edge in the visualization graph.
///
/// The id encodes the ordered pair and the edge kind: `e-<src>-<dst>` for
/// parent edges, `e-dep-<src>-<dst>` for dependency edges (animated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

/// Finished conversion output: positioned nodes plus deduplicated edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InfraGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

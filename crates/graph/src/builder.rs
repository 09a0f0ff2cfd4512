use crate::dedup::dedup_edges;
use crate::display::short_type_for;
use crate::layout::{layout_centers, NODE_HEIGHT, NODE_WIDTH};
use crate::types::{GraphEdge, GraphNode, InfraGraph, NodeData, Position, PreviewEvent};
use crate::urn::{filter_events, parse_urn};
use std::collections::HashMap;

/// Converts an ordered preview-event list into a positioned graph.
///
/// The urn→id mapping lives on the builder instance and is rebuilt per run;
/// ids are dense (`node-0..node-(N-1)`) in filtered-event order.
pub struct GraphBuilder {
    urn_to_id: HashMap<String, String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            urn_to_id: HashMap::new(),
        }
    }

    /// Run the full conversion: filter, assign ids, build edges, dedup,
    /// lay out. Dangling parent or dependency references are skipped for
    /// that relation; this is not an error.
    pub fn build(&mut self, events: &[PreviewEvent]) -> InfraGraph {
        let filtered = filter_events(events);

        self.urn_to_id.clear();
        for (index, event) in filtered.iter().enumerate() {
            self.urn_to_id
                .insert(event.urn.clone(), format!("node-{index}"));
        }

        let mut nodes: Vec<GraphNode> = filtered
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let parsed = parse_urn(&event.urn);
                let op = if event.op.is_empty() {
                    "create".to_string()
                } else {
                    event.op.clone()
                };
                GraphNode {
                    id: format!("node-{index}"),
                    position: Position::default(),
                    data: NodeData {
                        label: parsed.name,
                        short_type: short_type_for(&parsed.resource_type),
                        provider: parsed.provider,
                        op,
                        estimated_cost: None,
                        resource_type: parsed.resource_type,
                    },
                    node_type: "resourceNode".to_string(),
                }
            })
            .collect();

        let mut raw_edges: Vec<GraphEdge> = Vec::new();
        for event in &filtered {
            let Some(target_id) = self.urn_to_id.get(&event.urn) else {
                continue;
            };

            let parent_id = event
                .parent
                .as_ref()
                .and_then(|parent| self.urn_to_id.get(parent));
            if let Some(source_id) = parent_id {
                raw_edges.push(GraphEdge {
                    id: format!("e-{source_id}-{target_id}"),
                    source: source_id.clone(),
                    target: target_id.clone(),
                    animated: None,
                });
            }

            for dep in &event.dependencies {
                let Some(source_id) = self.urn_to_id.get(dep) else {
                    continue;
                };
                if parent_id == Some(source_id) {
                    continue;
                }
                // Literal duplicate dependency entries would mint the same
                // id twice; the global dedup pass runs later.
                let edge_id = format!("e-dep-{source_id}-{target_id}");
                if raw_edges.iter().any(|edge| edge.id == edge_id) {
                    continue;
                }
                raw_edges.push(GraphEdge {
                    id: edge_id,
                    source: source_id.clone(),
                    target: target_id.clone(),
                    animated: Some(true),
                });
            }
        }

        let edges = dedup_edges(raw_edges);

        let id_to_index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect();
        let edge_indices: Vec<(usize, usize)> = edges
            .iter()
            .filter_map(|edge| {
                Some((
                    *id_to_index.get(edge.source.as_str())?,
                    *id_to_index.get(edge.target.as_str())?,
                ))
            })
            .collect();

        let centers = layout_centers(nodes.len(), &edge_indices);
        for (node, center) in nodes.iter_mut().zip(centers) {
            node.position = Position {
                x: center.x - NODE_WIDTH / 2.0,
                y: center.y - NODE_HEIGHT / 2.0,
            };
        }

        log::info!(
            "Built infrastructure graph: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );

        InfraGraph { nodes, edges }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

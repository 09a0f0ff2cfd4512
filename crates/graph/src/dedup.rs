use crate::types::GraphEdge;
use std::collections::HashSet;

/// Collapse redundant edges between the same ordered `(source, target)`
/// pair, keeping the first edge encountered.
///
/// Construction emits an event's parent edge before its dependency edges
/// and scans events in order, so first-seen-wins is the explicit tie-break:
/// parent edges beat dependency edges, earlier events beat later ones. The
/// key is directional; opposite-direction edges between the same nodes both
/// survive.
pub fn dedup_edges(raw: Vec<GraphEdge>) -> Vec<GraphEdge> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .filter(|edge| seen.insert(format!("{}-{}", edge.source, edge.target)))
        .collect()
}

use crate::types::Position;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

pub const NODE_WIDTH: f64 = 180.0;
pub const NODE_HEIGHT: f64 = 80.0;

const NODE_SEP: f64 = 80.0;
const RANK_SEP: f64 = 120.0;

/// Layered top-to-bottom DAG placement.
///
/// Nodes are identified by their insertion index (`0..node_count`); `edges`
/// are `(source, target)` index pairs. Returns one center point per node,
/// in insertion order. Identical inputs always produce identical output:
/// ranking, in-rank ordering, and coordinates all resolve ties by insertion
/// order. Disconnected nodes land in rank 0.
pub fn layout_centers(node_count: usize, edges: &[(usize, usize)]) -> Vec<Position> {
    if node_count == 0 {
        return Vec::new();
    }

    let mut graph: DiGraph<(), ()> = DiGraph::new();
    let indices: Vec<NodeIndex> = (0..node_count).map(|_| graph.add_node(())).collect();
    for &(source, target) in edges {
        if source < node_count && target < node_count && source != target {
            graph.add_edge(indices[source], indices[target], ());
        }
    }

    let ranks = compute_ranks(&graph);
    let rows = order_rows(&graph, &ranks);

    // Each rank is centered around x = 0, then the whole drawing is shifted
    // so the leftmost box's top-left corner sits at x = 0.
    let mut centers = vec![Position::default(); node_count];
    let mut min_center_x = f64::MAX;
    for (rank, row) in rows.iter().enumerate() {
        let row_width = row.len() as f64 * NODE_WIDTH + (row.len() as f64 - 1.0) * NODE_SEP;
        let start_x = -row_width / 2.0;
        let center_y = rank as f64 * (NODE_HEIGHT + RANK_SEP) + NODE_HEIGHT / 2.0;
        for (slot, &node) in row.iter().enumerate() {
            let center_x = start_x + slot as f64 * (NODE_WIDTH + NODE_SEP) + NODE_WIDTH / 2.0;
            centers[node.index()] = Position { x: center_x, y: center_y };
            min_center_x = min_center_x.min(center_x);
        }
    }

    let shift = NODE_WIDTH / 2.0 - min_center_x;
    for center in &mut centers {
        center.x += shift;
    }
    centers
}

/// rank(n) = length of the longest path from any root to `n`.
///
/// Memoized DFS over incoming edges. A predecessor still on the visit stack
/// marks a cycle; that edge is ignored so the computation terminates with
/// the same result on every run.
fn compute_ranks(graph: &DiGraph<(), ()>) -> Vec<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        graph: &DiGraph<(), ()>,
        node: NodeIndex,
        states: &mut [State],
        ranks: &mut [usize],
    ) -> usize {
        match states[node.index()] {
            State::Done => return ranks[node.index()],
            State::InProgress => return 0,
            State::Unvisited => {}
        }
        states[node.index()] = State::InProgress;

        let mut rank = 0;
        for pred in graph.neighbors_directed(node, Direction::Incoming) {
            if states[pred.index()] == State::InProgress {
                continue;
            }
            rank = rank.max(visit(graph, pred, states, ranks) + 1);
        }

        states[node.index()] = State::Done;
        ranks[node.index()] = rank;
        rank
    }

    let mut states = vec![State::Unvisited; graph.node_count()];
    let mut ranks = vec![0usize; graph.node_count()];
    for node in graph.node_indices() {
        visit(graph, node, &mut states, &mut ranks);
    }
    ranks
}

/// Group nodes into rank rows and order each row to reduce edge crossings.
///
/// One downward barycenter sweep: a node's sort key is the mean slot of its
/// lower-ranked predecessors; nodes without placed predecessors keep their
/// current slot. Stable insertion-order tie-break throughout.
fn order_rows(graph: &DiGraph<(), ()>, ranks: &[usize]) -> Vec<Vec<NodeIndex>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut rows: Vec<Vec<NodeIndex>> = vec![Vec::new(); max_rank + 1];
    for node in graph.node_indices() {
        rows[ranks[node.index()]].push(node);
    }

    let mut slot_of = vec![0usize; graph.node_count()];
    for row in &rows {
        for (slot, &node) in row.iter().enumerate() {
            slot_of[node.index()] = slot;
        }
    }

    for rank in 1..=max_rank {
        let mut keyed: Vec<(f64, usize, NodeIndex)> = rows[rank]
            .iter()
            .enumerate()
            .map(|(slot, &node)| {
                let preds: Vec<NodeIndex> = graph
                    .neighbors_directed(node, Direction::Incoming)
                    .filter(|pred| ranks[pred.index()] < rank)
                    .collect();
                let barycenter = if preds.is_empty() {
                    slot as f64
                } else {
                    preds.iter().map(|p| slot_of[p.index()] as f64).sum::<f64>()
                        / preds.len() as f64
                };
                (barycenter, slot, node)
            })
            .collect();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        rows[rank] = keyed.iter().map(|&(_, _, node)| node).collect();
        for (slot, &node) in rows[rank].iter().enumerate() {
            slot_of[node.index()] = slot;
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_node_sits_at_origin_box() {
        let centers = layout_centers(1, &[]);
        assert_eq!(centers.len(), 1);
        assert_eq!(centers[0].x, NODE_WIDTH / 2.0);
        assert_eq!(centers[0].y, NODE_HEIGHT / 2.0);
    }

    #[test]
    fn test_chain_descends_by_rank() {
        let centers = layout_centers(3, &[(0, 1), (1, 2)]);
        assert_eq!(centers[0].y, 40.0);
        assert_eq!(centers[1].y, 240.0);
        assert_eq!(centers[2].y, 440.0);
        // Single-node ranks all share the same x.
        assert_eq!(centers[0].x, centers[1].x);
        assert_eq!(centers[1].x, centers[2].x);
    }

    #[test]
    fn test_rank_is_longest_path_not_shortest() {
        // Diamond with a shortcut: 0 -> 3 directly and 0 -> 1 -> 3.
        let centers = layout_centers(4, &[(0, 3), (0, 1), (1, 3)]);
        assert_eq!(centers[0].y, 40.0);
        assert_eq!(centers[1].y, 240.0);
        assert_eq!(centers[3].y, 440.0);
    }

    #[test]
    fn test_disconnected_nodes_form_rank_zero_row() {
        let centers = layout_centers(3, &[]);
        assert!(centers.iter().all(|c| c.y == NODE_HEIGHT / 2.0));
        // Spaced one box plus one gap apart, in insertion order.
        assert_eq!(centers[1].x - centers[0].x, 260.0);
        assert_eq!(centers[2].x - centers[1].x, 260.0);
    }

    #[test]
    fn test_barycenter_follows_parents() {
        // Two roots, each with one child; children should not cross.
        let centers = layout_centers(4, &[(0, 2), (1, 3)]);
        assert!(centers[0].x < centers[1].x);
        assert!(centers[2].x < centers[3].x);
    }

    #[test]
    fn test_cycle_terminates_deterministically() {
        let first = layout_centers(2, &[(0, 1), (1, 0)]);
        let second = layout_centers(2, &[(0, 1), (1, 0)]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3), (0, 3)];
        let first = layout_centers(5, &edges);
        let second = layout_centers(5, &edges);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
    }
}

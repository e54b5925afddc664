use crate::{Branch, Bus, BusId};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// Island summary (standard components approach, see doi:10.1016/S0378-3758(96)00112-0).
#[derive(Debug, Clone, PartialEq)]
pub struct IslandSummary {
    pub island_id: usize,
    pub buses: Vec<BusId>,
}

/// Groups buses into electrically connected islands.
///
/// Islands are ordered by their smallest bus id; buses inside an island are
/// sorted. Branches that reference unknown buses are ignored here, the
/// topology builder reports them separately.
pub fn count_islands(buses: &[Bus], branches: &[Branch]) -> Vec<IslandSummary> {
    let mut graph: UnGraph<BusId, ()> = UnGraph::new_undirected();
    let mut index: HashMap<BusId, NodeIndex> = HashMap::with_capacity(buses.len());
    for bus in buses {
        index.entry(bus.id).or_insert_with(|| graph.add_node(bus.id));
    }
    for branch in branches {
        if let (Some(&a), Some(&b)) = (index.get(&branch.from_bus), index.get(&branch.to_bus)) {
            graph.add_edge(a, b, ());
        }
    }

    let mut sets = UnionFind::new(graph.node_count());
    for edge in graph.raw_edges() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut groups: HashMap<usize, Vec<BusId>> = HashMap::new();
    for node in graph.node_indices() {
        groups
            .entry(sets.find(node.index()))
            .or_default()
            .push(graph[node]);
    }
    let mut islands: Vec<Vec<BusId>> = groups
        .into_values()
        .map(|mut members| {
            members.sort();
            members
        })
        .collect();
    islands.sort_by_key(|members| members[0]);
    islands
        .into_iter()
        .enumerate()
        .map(|(island_id, buses)| IslandSummary { island_id, buses })
        .collect()
}

//! Longest road.
//!
//! A player's roads form a graph whose nodes are vertices and whose links are
//! road edges. The longest road is the longest trail (no edge used twice) in
//! that graph. A vertex holding another player's building breaks the road: a
//! trail may end there but not pass through.

use crate::board::{Award, Board, PlayerId, LONGEST_ROAD_THRESHOLD};
use crate::hex::{EdgeCoord, VertexCoord};
use std::collections::{BTreeSet, HashMap, HashSet};

struct RoadGraph<'a> {
    board: &'a Board,
    player: PlayerId,
    links: HashMap<VertexCoord, Vec<EdgeCoord>>,
}

impl<'a> RoadGraph<'a> {
    fn new(board: &'a Board, player: PlayerId) -> Self {
        let mut links: HashMap<VertexCoord, Vec<EdgeCoord>> = HashMap::new();
        for edge in board.roads_of(player) {
            for vertex in edge.endpoint_vertices() {
                links.entry(vertex).or_default().push(edge);
            }
        }
        Self {
            board,
            player,
            links,
        }
    }

    fn blocked(&self, vertex: &VertexCoord) -> bool {
        self.board
            .building_at(vertex)
            .is_some_and(|b| b.owner != self.player)
    }

    fn degree(&self, vertex: &VertexCoord) -> usize {
        self.links.get(vertex).map_or(0, Vec::len)
    }

    /// Vertices a longest trail can start from: dead ends, junctions and
    /// broken vertices, plus one vertex of every component that is a plain
    /// loop.
    fn trail_ends(&self) -> Vec<VertexCoord> {
        let mut ends = Vec::new();
        let mut seen: HashSet<VertexCoord> = HashSet::new();
        // Sorted so the search order does not depend on hash order
        let vertices: BTreeSet<VertexCoord> = self.links.keys().copied().collect();

        for root in &vertices {
            if !seen.insert(*root) {
                continue;
            }
            let mut component_ends = Vec::new();
            let mut stack = vec![*root];
            while let Some(vertex) = stack.pop() {
                if self.degree(&vertex) != 2 || self.blocked(&vertex) {
                    component_ends.push(vertex);
                }
                for edge in &self.links[&vertex] {
                    if let Some(next) = edge.other_endpoint(vertex) {
                        if seen.insert(next) {
                            stack.push(next);
                        }
                    }
                }
            }
            if component_ends.is_empty() {
                component_ends.push(*root);
            }
            ends.extend(component_ends);
        }
        ends
    }

    /// Longest trail leaving `vertex` without reusing an edge in `used`
    fn walk(&self, vertex: VertexCoord, used: &mut HashSet<EdgeCoord>) -> u32 {
        let mut best = 0;
        for edge in &self.links[&vertex] {
            if used.contains(edge) {
                continue;
            }
            let Some(next) = edge.other_endpoint(vertex) else {
                continue;
            };
            used.insert(*edge);
            let onward = if self.blocked(&next) {
                0
            } else {
                self.walk(next, used)
            };
            used.remove(edge);
            best = best.max(1 + onward);
        }
        best
    }
}

/// Length of `player`'s longest road
pub fn longest_road(board: &Board, player: PlayerId) -> u32 {
    let graph = RoadGraph::new(board, player);
    graph
        .trail_ends()
        .into_iter()
        .map(|start| graph.walk(start, &mut HashSet::new()))
        .max()
        .unwrap_or(0)
}

/// Recompute the longest road bonus across `players`.
///
/// Nobody holds it unless their road is longer than the threshold. The
/// current holder keeps it while tied for the lead; otherwise a sole leader
/// takes it and a tie leaves it unclaimed. Returns the new award when it
/// changed.
pub fn update_longest_road(
    board: &mut Board,
    players: impl IntoIterator<Item = PlayerId>,
) -> Option<Award> {
    let lengths: Vec<(PlayerId, u32)> = players
        .into_iter()
        .map(|p| (p, longest_road(board, p)))
        .collect();
    let best = lengths.iter().map(|(_, len)| *len).max().unwrap_or(0);
    let current = board.longest_road();

    let next = if best <= LONGEST_ROAD_THRESHOLD {
        Award::unclaimed(LONGEST_ROAD_THRESHOLD)
    } else {
        let leaders: Vec<PlayerId> = lengths
            .iter()
            .filter(|(_, len)| *len == best)
            .map(|(p, _)| *p)
            .collect();
        let owner = match current.owner {
            Some(holder) if leaders.contains(&holder) => Some(holder),
            _ if leaders.len() == 1 => Some(leaders[0]),
            _ => None,
        };
        match owner {
            Some(_) => Award { size: best, owner },
            None => Award::unclaimed(LONGEST_ROAD_THRESHOLD),
        }
    };

    if next == current {
        return None;
    }
    tracing::debug!(?current, ?next, "longest road changed");
    board.set_longest_road(next);
    Some(next)
}

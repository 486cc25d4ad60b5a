//! A* pathfinding over the room graph
//!
//! Every edge costs 1. The heuristic is the straight-line distance between
//! grid coordinates. The open list is scanned linearly for the lowest f-score,
//! so on ties the earliest inserted node wins; room graphs are small enough
//! that a heap buys nothing here.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::level::{GridPos, RoomGraph};

/// Rooms from a start to a goal, both inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    rooms: Vec<GridPos>,
}

impl Path {
    /// Wrap a room sequence
    #[must_use]
    pub fn new(rooms: Vec<GridPos>) -> Self {
        Self { rooms }
    }

    /// Rooms in walking order
    #[must_use]
    pub fn rooms(&self) -> &[GridPos] {
        &self.rooms
    }

    /// Room at a cursor position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<GridPos> {
        self.rooms.get(index).copied()
    }

    #[must_use]
    pub fn first(&self) -> Option<GridPos> {
        self.rooms.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<GridPos> {
        self.rooms.last().copied()
    }

    /// Number of rooms
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

fn heuristic(a: GridPos, b: GridPos) -> f32 {
    a.distance(b)
}

/// Find a path from `start` to `goal`.
///
/// Returns `None` if either room is missing or the goal is unreachable.
/// `start == goal` yields a single-room path.
#[must_use]
pub fn find_path(graph: &RoomGraph, start: GridPos, goal: GridPos) -> Option<Path> {
    if !graph.has_room(start) || !graph.has_room(goal) {
        return None;
    }

    let mut open: Vec<GridPos> = vec![start];
    let mut closed: FxHashSet<GridPos> = FxHashSet::default();
    let mut came_from: FxHashMap<GridPos, GridPos> = FxHashMap::default();
    let mut g_score: FxHashMap<GridPos, f32> = FxHashMap::default();
    let mut f_score: FxHashMap<GridPos, f32> = FxHashMap::default();

    g_score.insert(start, 0.0);
    f_score.insert(start, heuristic(start, goal));

    while !open.is_empty() {
        // Lowest f-score; strict comparison keeps the earliest on ties
        let mut best = 0;
        let mut best_f = f_score.get(&open[0]).copied().unwrap_or(f32::MAX);
        for (i, pos) in open.iter().enumerate().skip(1) {
            let f = f_score.get(pos).copied().unwrap_or(f32::MAX);
            if f < best_f {
                best = i;
                best_f = f;
            }
        }

        let current = open.remove(best);
        if current == goal {
            return Some(reconstruct_path(&came_from, current));
        }
        closed.insert(current);

        let Some(room) = graph.room(current) else {
            continue;
        };
        let current_g = g_score.get(&current).copied().unwrap_or(f32::MAX);

        for &neighbor in room.neighbors() {
            if closed.contains(&neighbor) {
                continue;
            }

            let tentative_g = current_g + 1.0;
            if !open.contains(&neighbor) {
                open.push(neighbor);
            } else if tentative_g >= g_score.get(&neighbor).copied().unwrap_or(f32::MAX) {
                continue;
            }

            came_from.insert(neighbor, current);
            g_score.insert(neighbor, tentative_g);
            f_score.insert(neighbor, tentative_g + heuristic(neighbor, goal));
        }
    }

    None
}

fn reconstruct_path(came_from: &FxHashMap<GridPos, GridPos>, goal: GridPos) -> Path {
    let mut rooms = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        rooms.push(prev);
        current = prev;
    }

    rooms.reverse();
    Path::new(rooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GenerationConfig;
    use crate::level::{LevelGenerator, RoomKind};

    fn graph_from_edges(rooms: &[(i32, i32)], edges: &[((i32, i32), (i32, i32))]) -> RoomGraph {
        let mut graph = RoomGraph::new(10.0);
        for (i, &(x, y)) in rooms.iter().enumerate() {
            let kind = if i == 0 { RoomKind::Entrance } else { RoomKind::Normal };
            graph.add_room(GridPos::new(x, y), kind).unwrap();
        }
        for &((ax, ay), (bx, by)) in edges {
            graph.connect(GridPos::new(ax, ay), GridPos::new(bx, by)).unwrap();
        }
        graph
    }

    fn assert_walkable(graph: &RoomGraph, path: &Path, start: GridPos, goal: GridPos) {
        assert_eq!(path.first(), Some(start));
        assert_eq!(path.last(), Some(goal));
        for pair in path.rooms().windows(2) {
            assert!(
                graph.room(pair[0]).unwrap().is_neighbor(pair[1]),
                "{} -> {} is not an edge",
                pair[0],
                pair[1]
            );
        }
    }

    /// Reference distance by breadth-first search
    fn bfs_len(graph: &RoomGraph, start: GridPos, goal: GridPos) -> Option<usize> {
        let mut dist = FxHashMap::default();
        let mut queue = std::collections::VecDeque::from([start]);
        dist.insert(start, 1usize);
        while let Some(pos) = queue.pop_front() {
            if pos == goal {
                return dist.get(&pos).copied();
            }
            let d = dist[&pos];
            for &n in graph.room(pos).unwrap().neighbors() {
                if !dist.contains_key(&n) {
                    dist.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }
        None
    }

    #[test]
    fn test_direct_path() {
        let graph = graph_from_edges(
            &[(0, 0), (1, 0), (2, 0), (3, 0)],
            &[((0, 0), (1, 0)), ((1, 0), (2, 0)), ((2, 0), (3, 0))],
        );

        let path = find_path(&graph, GridPos::ZERO, GridPos::new(3, 0)).unwrap();
        assert_eq!(path.len(), 4);
        assert_walkable(&graph, &path, GridPos::ZERO, GridPos::new(3, 0));
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = graph_from_edges(&[(0, 0), (1, 0)], &[((0, 0), (1, 0))]);
        let path = find_path(&graph, GridPos::EAST, GridPos::EAST).unwrap();
        assert_eq!(path.rooms(), &[GridPos::EAST]);
    }

    #[test]
    fn test_no_path_between_components() {
        let graph = graph_from_edges(&[(0, 0), (1, 0), (5, 5)], &[((0, 0), (1, 0))]);
        assert!(find_path(&graph, GridPos::ZERO, GridPos::new(5, 5)).is_none());
    }

    #[test]
    fn test_missing_endpoint() {
        let graph = graph_from_edges(&[(0, 0)], &[]);
        assert!(find_path(&graph, GridPos::ZERO, GridPos::new(9, 9)).is_none());
        assert!(find_path(&graph, GridPos::new(9, 9), GridPos::ZERO).is_none());
    }

    #[test]
    fn test_walls_force_detour() {
        // Adjacent cells (0,0) and (1,0) are not connected; the only route is
        // around through the row above.
        let graph = graph_from_edges(
            &[(0, 0), (0, 1), (1, 1), (1, 0)],
            &[((0, 0), (0, 1)), ((0, 1), (1, 1)), ((1, 1), (1, 0))],
        );

        let path = find_path(&graph, GridPos::ZERO, GridPos::EAST).unwrap();
        assert_eq!(path.len(), 4);
        assert_walkable(&graph, &path, GridPos::ZERO, GridPos::EAST);
    }

    #[test]
    fn test_equal_cost_routes_prefer_earliest_inserted() {
        // Square loop: both routes to (1,1) cost 2 with equal f-scores, and
        // (1,0) enters the open list before (0,1).
        let graph = graph_from_edges(
            &[(0, 0), (1, 0), (0, 1), (1, 1)],
            &[
                ((0, 0), (1, 0)),
                ((0, 0), (0, 1)),
                ((1, 0), (1, 1)),
                ((0, 1), (1, 1)),
            ],
        );

        let path = find_path(&graph, GridPos::ZERO, GridPos::new(1, 1)).unwrap();
        assert_eq!(path.rooms(), &[GridPos::ZERO, GridPos::EAST, GridPos::new(1, 1)]);
    }

    #[test]
    fn test_paths_on_generated_trees_are_unique_and_correct() {
        // Main path plus branches, each room attached once: always a tree.
        let generator = LevelGenerator::new(
            GenerationConfig::default()
                .with_main_path_length(12)
                .with_branches(0.7, 5),
        )
        .unwrap();

        for seed in 0..40 {
            let level = generator.generate_with_seed(seed);
            let graph = &level.graph;
            let rooms: Vec<GridPos> = graph.rooms().map(|r| r.pos()).collect();

            for &start in &rooms {
                for &goal in &rooms {
                    let path = find_path(graph, start, goal)
                        .unwrap_or_else(|| panic!("seed {seed}: no path {start} -> {goal}"));
                    assert_walkable(graph, &path, start, goal);
                    assert_eq!(Some(path.len()), bfs_len(graph, start, goal), "seed {seed}");
                }
            }
        }
    }
}

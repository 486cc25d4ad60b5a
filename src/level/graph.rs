//! Room graph: rooms on an integer grid with symmetric adjacency

use std::collections::VecDeque;
use std::fmt;
use std::ops::Add;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Height of room centres in world space
pub const ROOM_HEIGHT: f32 = 1.0;

/// Integer grid coordinate, the identity of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const ZERO: Self = Self::new(0, 0);
    /// +y on the grid, +z in the world
    pub const NORTH: Self = Self::new(0, 1);
    pub const SOUTH: Self = Self::new(0, -1);
    /// +x on the grid and in the world
    pub const EAST: Self = Self::new(1, 0);
    pub const WEST: Self = Self::new(-1, 0);

    /// The four cardinal offsets
    pub const CARDINALS: [Self; 4] = [Self::EAST, Self::WEST, Self::NORTH, Self::SOUTH];

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance between two grid coordinates
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for GridPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Role of a room in the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoomKind {
    /// Where the player starts
    Entrance,
    #[default]
    Normal,
    /// End of the main path
    Objective,
}

/// A room in the graph
#[derive(Debug, Clone)]
pub struct RoomNode {
    pos: GridPos,
    kind: RoomKind,
    neighbors: SmallVec<[GridPos; 4]>,
}

impl RoomNode {
    /// Grid coordinate (unique key)
    #[must_use]
    pub fn pos(&self) -> GridPos {
        self.pos
    }

    #[must_use]
    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    /// Connected rooms, in the order the connections were made
    #[must_use]
    pub fn neighbors(&self) -> &[GridPos] {
        &self.neighbors
    }

    /// Check whether `other` is connected to this room
    #[must_use]
    pub fn is_neighbor(&self, other: GridPos) -> bool {
        self.neighbors.contains(&other)
    }
}

/// Invariant violations while building a graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("grid cell {0} is already occupied")]
    Occupied(GridPos),
    #[error("no room at {0}")]
    MissingRoom(GridPos),
    #[error("cannot connect room {0} to itself")]
    SelfLoop(GridPos),
}

/// Rooms keyed by grid coordinate, kept in insertion order
#[derive(Debug, Clone)]
pub struct RoomGraph {
    cell_size: f32,
    rooms: Vec<RoomNode>,
    lookup: FxHashMap<GridPos, usize>,
}

impl RoomGraph {
    /// Create an empty graph whose rooms are `cell_size` world units apart
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            rooms: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    /// World units between room centres
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Add a room at an unoccupied cell
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Occupied`] if a room already sits at `pos`
    pub fn add_room(&mut self, pos: GridPos, kind: RoomKind) -> Result<&RoomNode, GraphError> {
        if self.lookup.contains_key(&pos) {
            return Err(GraphError::Occupied(pos));
        }

        let index = self.rooms.len();
        self.rooms.push(RoomNode {
            pos,
            kind,
            neighbors: SmallVec::new(),
        });
        self.lookup.insert(pos, index);
        Ok(&self.rooms[index])
    }

    /// Check if a cell is occupied
    #[must_use]
    pub fn has_room(&self, pos: GridPos) -> bool {
        self.lookup.contains_key(&pos)
    }

    /// Look up a room by coordinate
    #[must_use]
    pub fn room(&self, pos: GridPos) -> Option<&RoomNode> {
        self.lookup.get(&pos).map(|&index| &self.rooms[index])
    }

    /// Connect two rooms in both directions. Connecting an already connected
    /// pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if either room is missing or `a == b`
    pub fn connect(&mut self, a: GridPos, b: GridPos) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        let ia = *self.lookup.get(&a).ok_or(GraphError::MissingRoom(a))?;
        let ib = *self.lookup.get(&b).ok_or(GraphError::MissingRoom(b))?;

        if !self.rooms[ia].neighbors.contains(&b) {
            self.rooms[ia].neighbors.push(b);
        }
        if !self.rooms[ib].neighbors.contains(&a) {
            self.rooms[ib].neighbors.push(a);
        }
        Ok(())
    }

    /// Retag a room
    pub(crate) fn set_kind(&mut self, pos: GridPos, kind: RoomKind) -> Result<(), GraphError> {
        let index = *self.lookup.get(&pos).ok_or(GraphError::MissingRoom(pos))?;
        self.rooms[index].kind = kind;
        Ok(())
    }

    /// All rooms in insertion order
    pub fn rooms(&self) -> impl Iterator<Item = &RoomNode> {
        self.rooms.iter()
    }

    /// Room by insertion index
    #[must_use]
    pub fn room_at(&self, index: usize) -> Option<&RoomNode> {
        self.rooms.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// The entrance room, if any
    #[must_use]
    pub fn entrance(&self) -> Option<&RoomNode> {
        self.rooms.iter().find(|room| room.kind == RoomKind::Entrance)
    }

    /// The objective room, if any
    #[must_use]
    pub fn objective(&self) -> Option<&RoomNode> {
        self.rooms.iter().find(|room| room.kind == RoomKind::Objective)
    }

    /// Centre of a room in world space
    #[must_use]
    pub fn grid_to_world(&self, pos: GridPos) -> Vec3 {
        Vec3::new(
            pos.x as f32 * self.cell_size,
            ROOM_HEIGHT,
            pos.y as f32 * self.cell_size,
        )
    }

    /// Room whose centre is nearest to `world_pos`.
    ///
    /// Linear scan; ties go to the earliest inserted room. `None` on an empty
    /// graph.
    #[must_use]
    pub fn closest_room(&self, world_pos: Vec3) -> Option<&RoomNode> {
        let mut closest = None;
        let mut best = f32::MAX;

        for room in &self.rooms {
            let d = self.grid_to_world(room.pos).distance(world_pos);
            if d < best {
                best = d;
                closest = Some(room);
            }
        }

        closest
    }

    /// Check that every room is reachable from the entrance (or from the first
    /// room when there is no entrance). An empty graph counts as connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.entrance().or_else(|| self.rooms.first()) else {
            return true;
        };

        let mut seen: FxHashSet<GridPos> = FxHashSet::default();
        let mut queue = VecDeque::from([start.pos]);
        seen.insert(start.pos);

        while let Some(pos) = queue.pop_front() {
            let Some(room) = self.room(pos) else {
                continue;
            };
            for &next in &room.neighbors {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        seen.len() == self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(length: i32) -> RoomGraph {
        let mut graph = RoomGraph::new(10.0);
        graph.add_room(GridPos::ZERO, RoomKind::Entrance).unwrap();
        for x in 1..length {
            graph.add_room(GridPos::new(x, 0), RoomKind::Normal).unwrap();
            graph.connect(GridPos::new(x - 1, 0), GridPos::new(x, 0)).unwrap();
        }
        graph
    }

    #[test]
    fn test_add_room_rejects_occupied_cell() {
        let mut graph = RoomGraph::new(10.0);
        graph.add_room(GridPos::new(2, 3), RoomKind::Normal).unwrap();

        let err = graph.add_room(GridPos::new(2, 3), RoomKind::Objective).unwrap_err();
        assert_eq!(err, GraphError::Occupied(GridPos::new(2, 3)));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.room(GridPos::new(2, 3)).unwrap().kind(), RoomKind::Normal);
    }

    #[test]
    fn test_connect_is_symmetric_and_idempotent() {
        let mut graph = line(2);
        graph.connect(GridPos::ZERO, GridPos::EAST).unwrap();
        graph.connect(GridPos::EAST, GridPos::ZERO).unwrap();

        let a = graph.room(GridPos::ZERO).unwrap();
        let b = graph.room(GridPos::EAST).unwrap();
        assert_eq!(a.neighbors(), &[GridPos::EAST]);
        assert_eq!(b.neighbors(), &[GridPos::ZERO]);
    }

    #[test]
    fn test_connect_rejects_missing_and_self() {
        let mut graph = line(1);
        assert_eq!(
            graph.connect(GridPos::ZERO, GridPos::new(5, 5)),
            Err(GraphError::MissingRoom(GridPos::new(5, 5)))
        );
        assert_eq!(
            graph.connect(GridPos::ZERO, GridPos::ZERO),
            Err(GraphError::SelfLoop(GridPos::ZERO))
        );
    }

    #[test]
    fn test_closest_room() {
        let graph = line(4);

        let room = graph.closest_room(Vec3::new(21.0, 0.0, 3.0)).unwrap();
        assert_eq!(room.pos(), GridPos::new(2, 0));

        let room = graph.closest_room(Vec3::new(-50.0, 1.0, 0.0)).unwrap();
        assert_eq!(room.pos(), GridPos::ZERO);
    }

    #[test]
    fn test_closest_room_tie_prefers_first_inserted() {
        let graph = line(2);
        // Exactly halfway between (0,0) and (1,0)
        let room = graph.closest_room(Vec3::new(5.0, 1.0, 0.0)).unwrap();
        assert_eq!(room.pos(), GridPos::ZERO);
    }

    #[test]
    fn test_closest_room_empty_graph() {
        let graph = RoomGraph::new(10.0);
        assert!(graph.closest_room(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_grid_to_world() {
        let graph = RoomGraph::new(4.0);
        assert_eq!(graph.grid_to_world(GridPos::new(2, -3)), Vec3::new(8.0, ROOM_HEIGHT, -12.0));
    }

    #[test]
    fn test_connectivity_check() {
        let mut graph = line(3);
        assert!(graph.is_connected());

        graph.add_room(GridPos::new(0, 5), RoomKind::Normal).unwrap();
        assert!(!graph.is_connected());
    }

    #[test]
    fn test_set_kind() {
        let mut graph = line(3);
        graph.set_kind(GridPos::new(2, 0), RoomKind::Objective).unwrap();
        assert_eq!(graph.objective().unwrap().pos(), GridPos::new(2, 0));
        assert_eq!(graph.entrance().unwrap().pos(), GridPos::ZERO);
    }
}

//! Procedural level layout
//!
//! Builds a branching dungeon on a square grid:
//!
//! 1. The entrance sits at the grid origin.
//! 2. A main path walks away from it, one random free cardinal step at a time.
//! 3. Main-path rooms (except the last) may sprout short side branches.
//! 4. The last main-path room becomes the objective.
//!
//! Every step that cannot find a free cell simply ends its path early; the
//! generator never fails, it hands back whatever the budget allowed.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::{ConfigError, GenerationConfig};
use crate::level::graph::{GraphError, GridPos, RoomGraph, RoomKind};

/// Result of one generation run
#[derive(Debug, Clone)]
pub struct Level {
    /// The finished room graph
    pub graph: Arc<RoomGraph>,
    /// Seed the layout stream was started from
    pub seed: u64,
    /// Main-path rooms, entrance first
    pub main_path: Vec<GridPos>,
    /// Branches attempted (including ones that found no room to grow)
    pub branch_count: u32,
}

/// Seeded room-graph generator
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    config: GenerationConfig,
}

impl LevelGenerator {
    /// Create a generator after validating its parameters
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if any bound is violated
    pub fn new(config: GenerationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a fresh level, seeding from the configured [`SeedMode`].
    ///
    /// [`SeedMode`]: crate::core::SeedMode
    pub fn generate(&self) -> Level {
        self.generate_with_seed(self.config.seed.resolve())
    }

    /// Generate a level from an explicit seed
    pub fn generate_with_seed(&self, seed: u64) -> Level {
        let mut builder = Builder {
            config: &self.config,
            graph: RoomGraph::new(self.config.cell_size),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };

        let main_path = builder.main_path();
        let branch_count = builder.branches(&main_path);

        if main_path.len() > 1 {
            if let Some(&last) = main_path.last() {
                builder.mark(last, RoomKind::Objective);
            }
        }

        let graph = builder.graph;
        log::info!(
            "Generated layout with {} rooms ({} on main path, {} branches, seed {})",
            graph.len(),
            main_path.len(),
            branch_count,
            seed
        );

        Level {
            graph: Arc::new(graph),
            seed,
            main_path,
            branch_count,
        }
    }
}

/// Working state for a single run
struct Builder<'a> {
    config: &'a GenerationConfig,
    graph: RoomGraph,
    rng: ChaCha8Rng,
}

impl Builder<'_> {
    fn budget_exhausted(&self) -> bool {
        self.graph.len() >= self.config.max_total_rooms as usize
    }

    fn main_path(&mut self) -> Vec<GridPos> {
        let mut path = Vec::with_capacity(self.config.main_path_length as usize);

        if let Err(err) = self.graph.add_room(GridPos::ZERO, RoomKind::Entrance) {
            log::error!("Could not place entrance: {err}");
            return path;
        }
        path.push(GridPos::ZERO);

        let mut current = GridPos::ZERO;
        for step in 1..self.config.main_path_length {
            if self.budget_exhausted() {
                break;
            }

            let Some(next) = self.free_step(current) else {
                log::warn!("Could not find a new cell for main path step {step}");
                break;
            };

            if let Err(err) = self.extend(current, next) {
                log::error!("Main path aborted at step {step}: {err}");
                break;
            }

            path.push(next);
            current = next;
        }

        path
    }

    fn branches(&mut self, main_path: &[GridPos]) -> u32 {
        let mut created = 0;

        // The last main-path room (the objective end) never branches.
        let sources = main_path.len().saturating_sub(1);
        for &base in &main_path[..sources] {
            if created >= self.config.max_branches || self.budget_exhausted() {
                break;
            }

            let roll: f64 = self.rng.gen_range(0.0..1.0);
            if roll > self.config.branch_chance_per_room {
                continue;
            }

            let length = self
                .rng
                .gen_range(self.config.min_branch_length..=self.config.max_branch_length);
            let grown = self.branch_from(base, length);
            log::debug!("Branch from {base}: {grown}/{length} rooms");
            created += 1;
        }

        created
    }

    fn branch_from(&mut self, base: GridPos, length: u32) -> u32 {
        let mut current = base;
        let mut grown = 0;

        for _ in 0..length {
            if self.budget_exhausted() {
                break;
            }
            let Some(next) = self.free_step(current) else {
                break;
            };
            if let Err(err) = self.extend(current, next) {
                log::error!("Branch from {base} aborted: {err}");
                break;
            }
            current = next;
            grown += 1;
        }

        grown
    }

    /// Add a normal room at `next` and link it back to `from`
    fn extend(&mut self, from: GridPos, next: GridPos) -> Result<(), GraphError> {
        self.graph.add_room(next, RoomKind::Normal)?;
        self.graph.connect(from, next)
    }

    fn mark(&mut self, pos: GridPos, kind: RoomKind) {
        if let Err(err) = self.graph.set_kind(pos, kind) {
            log::error!("Could not mark {pos} as {kind:?}: {err}");
        }
    }

    /// First unoccupied neighbour of `from`, trying the cardinal directions in
    /// a freshly shuffled order.
    fn free_step(&mut self, from: GridPos) -> Option<GridPos> {
        let mut directions = GridPos::CARDINALS;

        // Fisher-Yates, front to back
        for i in 0..directions.len() - 1 {
            let j = self.rng.gen_range(i..directions.len());
            directions.swap(i, j);
        }

        directions
            .into_iter()
            .map(|dir| from + dir)
            .find(|&candidate| !self.graph.has_room(candidate))
    }
}

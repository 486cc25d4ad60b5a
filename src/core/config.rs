//! Tuning for level generation, pursuit and vision
//!
//! All configuration is plain data with `serde` support so it can be kept in a
//! RON file next to the game's other assets:
//!
//! ```ron
//! (
//!     generation: (main_path_length: 12, seed: Fixed(7)),
//!     pursuit: (chase_speed: 6.0),
//!     vision: (),
//! )
//! ```
//!
//! Missing fields fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// How a random stream is seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedMode {
    /// Draw a fresh seed from OS entropy every time
    #[default]
    Random,
    /// Always use this seed
    Fixed(u64),
}

impl SeedMode {
    /// Resolve to a concrete seed value
    #[must_use]
    pub fn resolve(self) -> u64 {
        match self {
            SeedMode::Random => rand::random(),
            SeedMode::Fixed(seed) => seed,
        }
    }
}

/// Errors from loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("serialization error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive number"))
    }
}

// ============================================================================
// Level Generation
// ============================================================================

/// Level generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Requested number of rooms on the main path, entrance included
    pub main_path_length: u32,
    /// World units between room centres
    pub cell_size: f32,
    /// Seed for the layout stream
    pub seed: SeedMode,
    /// Probability that a main-path room sprouts a branch
    pub branch_chance_per_room: f64,
    /// Shortest branch, in rooms (inclusive)
    pub min_branch_length: u32,
    /// Longest branch, in rooms (inclusive)
    pub max_branch_length: u32,
    /// Upper bound on branches per level
    pub max_branches: u32,
    /// Hard cap on rooms per level
    pub max_total_rooms: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            main_path_length: 10,
            cell_size: 10.0,
            seed: SeedMode::Random,
            branch_chance_per_room: 0.5,
            min_branch_length: 1,
            max_branch_length: 3,
            max_branches: 4,
            max_total_rooms: 40,
        }
    }
}

impl GenerationConfig {
    /// Set the main path length
    pub fn with_main_path_length(mut self, length: u32) -> Self {
        self.main_path_length = length;
        self
    }

    /// Set the cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Use a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = SeedMode::Fixed(seed);
        self
    }

    /// Set the branch probability and count limit
    pub fn with_branches(mut self, chance: f64, max_branches: u32) -> Self {
        self.branch_chance_per_room = chance;
        self.max_branches = max_branches;
        self
    }

    /// Set the inclusive branch length range
    pub fn with_branch_length(mut self, min: u32, max: u32) -> Self {
        self.min_branch_length = min;
        self.max_branch_length = max;
        self
    }

    /// Set the total room cap
    pub fn with_max_total_rooms(mut self, max: u32) -> Self {
        self.max_total_rooms = max;
        self
    }

    /// Check every bound
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.main_path_length < 1 {
            return Err(invalid("main_path_length", "must be at least 1"));
        }
        require_positive("cell_size", self.cell_size)?;
        if !(0.0..=1.0).contains(&self.branch_chance_per_room) {
            return Err(invalid("branch_chance_per_room", "must be within [0, 1]"));
        }
        if self.min_branch_length < 1 {
            return Err(invalid("min_branch_length", "must be at least 1"));
        }
        if self.max_branch_length < self.min_branch_length {
            return Err(invalid(
                "max_branch_length",
                "must not be less than min_branch_length",
            ));
        }
        if self.max_total_rooms < 1 {
            return Err(invalid("max_total_rooms", "must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Pursuit
// ============================================================================

/// Pursuit controller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Speed while walking a room path (Patrol and Search)
    pub patrol_speed: f32,
    /// Speed while steering straight at the player
    pub chase_speed: f32,
    /// Distance at which the encounter resolves
    pub kill_distance: f32,
    /// Seconds line of sight may be missing before Chase degrades to Search
    pub lose_sight_delay: f32,
    /// Distance at which a path node counts as reached
    pub waypoint_tolerance: f32,
    /// Rotation smoothing rate while path following
    pub patrol_turn_rate: f32,
    /// Rotation smoothing rate while chasing
    pub chase_turn_rate: f32,
    /// Draws allowed when picking a patrol target different from the current room
    pub patrol_pick_attempts: u32,
    /// Seed for patrol target picks
    pub seed: SeedMode,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 2.5,
            chase_speed: 5.0,
            kill_distance: 1.2,
            lose_sight_delay: 0.25,
            waypoint_tolerance: 0.25,
            patrol_turn_rate: 6.0,
            chase_turn_rate: 10.0,
            patrol_pick_attempts: 20,
            seed: SeedMode::Random,
        }
    }
}

impl PursuitConfig {
    /// Set patrol and chase speeds
    pub fn with_speeds(mut self, patrol: f32, chase: f32) -> Self {
        self.patrol_speed = patrol;
        self.chase_speed = chase;
        self
    }

    /// Set the kill distance
    pub fn with_kill_distance(mut self, distance: f32) -> Self {
        self.kill_distance = distance;
        self
    }

    /// Set the lose-sight grace period
    pub fn with_lose_sight_delay(mut self, seconds: f32) -> Self {
        self.lose_sight_delay = seconds;
        self
    }

    /// Use a fixed seed for patrol picks
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = SeedMode::Fixed(seed);
        self
    }

    /// Check every bound
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("patrol_speed", self.patrol_speed)?;
        require_positive("chase_speed", self.chase_speed)?;
        require_positive("kill_distance", self.kill_distance)?;
        require_positive("waypoint_tolerance", self.waypoint_tolerance)?;
        require_positive("patrol_turn_rate", self.patrol_turn_rate)?;
        require_positive("chase_turn_rate", self.chase_turn_rate)?;
        if !(self.lose_sight_delay.is_finite() && self.lose_sight_delay >= 0.0) {
            return Err(invalid("lose_sight_delay", "must be zero or positive"));
        }
        if self.patrol_pick_attempts < 1 {
            return Err(invalid("patrol_pick_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Vision
// ============================================================================

/// Sight parameters for the hunting agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Maximum sight distance
    pub view_distance: f32,
    /// Full horizontal field of view, in degrees
    pub view_angle: f32,
    /// Eye lift above the agent's position
    pub eye_height: f32,
    /// Eye push along the facing direction
    pub eye_forward: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            view_distance: 22.0,
            view_angle: 140.0,
            eye_height: 0.15,
            eye_forward: 0.45,
        }
    }
}

impl VisionConfig {
    /// Set range and full field of view
    pub fn with_view(mut self, distance: f32, angle_degrees: f32) -> Self {
        self.view_distance = distance;
        self.view_angle = angle_degrees;
        self
    }

    /// Set the eye offset
    pub fn with_eye_offset(mut self, height: f32, forward: f32) -> Self {
        self.eye_height = height;
        self.eye_forward = forward;
        self
    }

    /// Half of the field of view, in degrees
    #[must_use]
    pub fn half_fov_degrees(&self) -> f32 {
        self.view_angle * 0.5
    }

    /// Check every bound
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("view_distance", self.view_distance)?;
        if !(self.view_angle > 0.0 && self.view_angle <= 360.0) {
            return Err(invalid("view_angle", "must be within (0, 360]"));
        }
        if !(self.eye_height.is_finite() && self.eye_forward.is_finite()) {
            return Err(invalid("eye_height", "eye offsets must be finite"));
        }
        Ok(())
    }
}

// ============================================================================
// Game Config
// ============================================================================

/// Everything the core needs, in one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub generation: GenerationConfig,
    pub pursuit: PursuitConfig,
    pub vision: VisionConfig,
}

impl GameConfig {
    /// Validate all sections
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()?;
        self.pursuit.validate()?;
        self.vision.validate()
    }

    /// Parse and validate a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Save to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }
}

//! Read-only inspection of the pursuit controller

use crate::ai::PursuitState;
use crate::level::GridPos;

/// Point-in-time copy of the controller's internals, for overlays and logs
#[derive(Debug, Clone, PartialEq)]
pub struct DebugSnapshot {
    /// Current behavior
    pub state: PursuitState,
    /// Line-of-sight result from the latest tick
    pub can_see_player: bool,
    /// Room nearest the agent
    pub agent_room: Option<GridPos>,
    /// Room nearest the player
    pub player_room: Option<GridPos>,
    /// Where the player was last seen
    pub last_known_room: Option<GridPos>,
    /// Rooms in the active path (0 when there is none)
    pub path_len: usize,
    /// Cursor into the active path
    pub path_cursor: usize,
    /// Seconds since line of sight was lost while chasing
    pub lost_sight_timer: f32,
    /// What the controller did last
    pub note: &'static str,
}

impl DebugSnapshot {
    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "{:?} | sees player: {} | path {}/{} | lost sight {:.2}s",
            self.state, self.can_see_player, self.path_cursor, self.path_len, self.lost_sight_timer
        )
    }

    /// Get all debug lines
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.format_stats(),
            format!("agent room: {}", room_label(self.agent_room)),
            format!("player room: {}", room_label(self.player_room)),
            format!("last known room: {}", room_label(self.last_known_room)),
            self.note.to_string(),
        ]
    }
}

fn room_label(room: Option<GridPos>) -> String {
    room.map_or_else(|| "none".to_string(), |pos| pos.to_string())
}

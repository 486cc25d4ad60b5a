//! Event Queue System for Decoupled Communication
//!
//! A double-buffered event queue between the core and its collaborators.
//! Events are written during one tick and read in the next, so what a
//! collaborator sees does not depend on update order.
//!
//! # Example
//!
//! ```ignore
//! controller.tick(&input, &mut events);
//!
//! events.swap();
//! for event in events.iter() {
//!     if let GameEvent::EncounterResolved { .. } = event {
//!         restart_level();
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;

use crate::ai::PursuitState;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened in the core, for collaborators to react to.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    /// A new level replaced the previous one.
    LevelGenerated {
        /// Room count
        rooms: usize,
        /// Seed the layout was generated from
        seed: u64,
    },

    /// The hunting agent switched behavior.
    PursuitStateChanged {
        from: PursuitState,
        to: PursuitState,
    },

    /// The agent reached the player.
    EncounterResolved {
        /// Agent position at the moment of contact
        agent_position: Vec3,
        /// Player position at the moment of contact
        player_position: Vec3,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
///
/// Events pushed during tick N are available for reading during tick N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<GameEvent>,
    /// Events from previous tick, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 16;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next tick.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Call this once per tick, at the tick boundary. After swapping:
    /// - `iter()` returns events from the previous tick
    /// - `push()` writes to the new pending queue
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Events written since the last swap.
    #[inline]
    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    /// Get the number of events pending for next tick.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    ///
    /// Used when a level is thrown away.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

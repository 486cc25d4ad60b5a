//! Finite State Machine for AI Behavior
//!
//! Provides a generic state machine for managing AI entity behavior.
//! States encapsulate behavior logic with clean enter/update/exit lifecycle hooks.
//!
//! # Example
//!
//! ```ignore
//! struct PatrolState;
//!
//! impl State<PursuitContext> for PatrolState {
//!     fn name(&self) -> &'static str { "Patrol" }
//!
//!     fn update(&mut self, ctx: &mut PursuitContext) -> Transition<PursuitContext> {
//!         if ctx.can_see_player {
//!             Transition::to(ChaseState)
//!         } else {
//!             Transition::None
//!         }
//!     }
//! }
//!
//! let mut fsm = StateMachine::new(PatrolState);
//! fsm.update(&mut ctx);  // May transition to ChaseState
//! ```

use std::fmt;

// ============================================================================
// State Trait
// ============================================================================

/// A state in the finite state machine.
///
/// The lifecycle is:
///
/// 1. `enter()` - Called once when entering this state
/// 2. `update()` - Called each tick while in this state
/// 3. `exit()` - Called once when leaving this state
pub trait State<Ctx>: fmt::Debug {
    /// State name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Called when entering this state.
    fn enter(&mut self, _ctx: &mut Ctx) {}

    /// Called each tick while in this state.
    ///
    /// Returns a `Transition` to indicate whether to stay or change states.
    fn update(&mut self, ctx: &mut Ctx) -> Transition<Ctx>;

    /// Called when exiting this state.
    fn exit(&mut self, _ctx: &mut Ctx) {}
}

// ============================================================================
// Transition
// ============================================================================

/// A state transition decision returned from `State::update()`.
pub enum Transition<Ctx> {
    /// Stay in the current state.
    None,
    /// Transition to a new state.
    To(Box<dyn State<Ctx>>),
}

impl<Ctx> Transition<Ctx> {
    /// Create a transition to a new state.
    pub fn to<S: State<Ctx> + 'static>(state: S) -> Self {
        Transition::To(Box::new(state))
    }
}

impl<Ctx> fmt::Debug for Transition<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "Transition::None"),
            Transition::To(state) => write!(f, "Transition::To({})", state.name()),
        }
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// Owns the current state and drives its lifecycle.
///
/// - `Ctx`: data shared by all states (blackboard, per-tick inputs)
pub struct StateMachine<Ctx> {
    /// Current active state
    current: Box<dyn State<Ctx>>,
    /// Whether enter() has been called on current state
    entered: bool,
}

impl<Ctx> StateMachine<Ctx> {
    /// Create a new state machine with an initial state.
    ///
    /// The initial state's `enter()` will be called on the first `update()`.
    pub fn new<S: State<Ctx> + 'static>(initial: S) -> Self {
        Self {
            current: Box::new(initial),
            entered: false,
        }
    }

    /// Update the state machine.
    ///
    /// Calls `enter()` on first update, then `update()` each tick.
    /// A returned transition exits the old state and enters the new one
    /// within the same call.
    pub fn update(&mut self, ctx: &mut Ctx) {
        if !self.entered {
            self.current.enter(ctx);
            self.entered = true;
        }

        let transition = self.current.update(ctx);

        if let Transition::To(mut new_state) = transition {
            self.current.exit(ctx);
            new_state.enter(ctx);
            self.current = new_state;
        }
    }

    /// Force a transition to a new state.
    ///
    /// Immediately exits the current state (if it was entered) and enters the
    /// new one.
    pub fn transition<S: State<Ctx> + 'static>(&mut self, ctx: &mut Ctx, new_state: S) {
        if self.entered {
            self.current.exit(ctx);
        }

        self.current = Box::new(new_state);
        self.current.enter(ctx);
        self.entered = true;
    }

    /// Get the name of the current state.
    #[must_use]
    pub fn current_state_name(&self) -> &'static str {
        self.current.name()
    }

    /// Check if the FSM is in a state with the given name.
    #[must_use]
    pub fn is_in_state(&self, name: &str) -> bool {
        self.current.name() == name
    }
}

impl<Ctx> fmt::Debug for StateMachine<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current.name())
            .field("entered", &self.entered)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

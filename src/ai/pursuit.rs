//! Pursuit controller for the hunting agent
//!
//! Three behaviors share one blackboard:
//!
//! - **Patrol** walks room paths between random rooms.
//! - **Chase** steers straight at the player while it is visible.
//! - **Search** walks to the room the player was last seen in.
//!
//! Line of sight is evaluated once per tick, before the state update, so every
//! decision within a tick sees the same answer.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::fsm::{State, StateMachine, Transition};
use super::pathfinding::{Path, find_path};
use super::steering::Seek;
use super::vision::{OcclusionQuery, VisionGate};
use crate::core::{ConfigError, DebugSnapshot, EventQueue, GameEvent, Pose, PursuitConfig};
use crate::level::{GridPos, RoomGraph, RoomNode};

// ============================================================================
// Public Types
// ============================================================================

/// Behavior the agent is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PursuitState {
    #[default]
    Patrol,
    Chase,
    Search,
}

impl fmt::Display for PursuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PursuitState::Patrol => "Patrol",
            PursuitState::Chase => "Chase",
            PursuitState::Search => "Search",
        };
        f.write_str(name)
    }
}

/// Why a tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No level attached
    NoLevel,
    /// The attached level has no rooms
    EmptyLevel,
    /// No player position supplied
    NoPlayer,
    /// No occlusion query supplied
    NoVision,
}

impl SkipReason {
    /// Short human-readable description
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::NoLevel => "no level attached",
            SkipReason::EmptyLevel => "level has no rooms",
            SkipReason::NoPlayer => "missing player position",
            SkipReason::NoVision => "missing occlusion query",
        }
    }
}

/// Result of [`PursuitController::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// The state machine ran; carries the state after the update
    Updated(PursuitState),
    /// Nothing changed
    Skipped(SkipReason),
}

/// Per-tick inputs from the controller's collaborators
#[derive(Clone, Copy)]
pub struct TickInput<'a> {
    /// Seconds since the previous tick
    pub delta_time: f32,
    /// Player position in world space
    pub player_position: Option<Vec3>,
    /// Blocking-geometry test for line of sight
    pub occlusion: Option<&'a dyn OcclusionQuery>,
}

impl<'a> TickInput<'a> {
    /// Input with no collaborators wired
    #[must_use]
    pub fn new(delta_time: f32) -> Self {
        Self {
            delta_time,
            player_position: None,
            occlusion: None,
        }
    }

    /// Set the player position
    #[must_use]
    pub fn with_player(mut self, position: Vec3) -> Self {
        self.player_position = Some(position);
        self
    }

    /// Set the occlusion query
    #[must_use]
    pub fn with_occlusion(mut self, occlusion: &'a dyn OcclusionQuery) -> Self {
        self.occlusion = Some(occlusion);
        self
    }
}

impl fmt::Debug for TickInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickInput")
            .field("delta_time", &self.delta_time)
            .field("player_position", &self.player_position)
            .field("occlusion", &self.occlusion.is_some())
            .finish()
    }
}

// ============================================================================
// Blackboard
// ============================================================================

/// State shared by the behaviors, rebuilt piecewise every tick
#[derive(Debug)]
struct PursuitContext {
    config: PursuitConfig,
    graph: Option<Arc<RoomGraph>>,
    agent: Pose,
    player: Vec3,
    can_see: bool,
    delta_time: f32,
    /// `None` means a new path is needed
    path: Option<Path>,
    cursor: usize,
    last_known_room: Option<GridPos>,
    lost_sight_timer: f32,
    /// Patrol target picks; nothing else draws from it
    rng: ChaCha8Rng,
    state: PursuitState,
    note: &'static str,
}

impl PursuitContext {
    fn closest_room(&self, position: Vec3) -> Option<GridPos> {
        self.graph.as_ref()?.closest_room(position).map(RoomNode::pos)
    }

    fn clear_path(&mut self) {
        self.path = None;
        self.cursor = 0;
    }

    fn path_exhausted(&self) -> bool {
        self.path.as_ref().is_none_or(|path| self.cursor >= path.len())
    }

    /// Path from the agent's room to a random other room
    fn pick_patrol_path(&mut self) {
        let Some(graph) = self.graph.clone() else {
            return;
        };
        let Some(current) = self.closest_room(self.agent.position) else {
            self.note = "patrol: agent is in no room";
            return;
        };

        // Gives up after the attempt budget and keeps whatever was drawn last
        let mut target = current;
        for _ in 0..self.config.patrol_pick_attempts {
            if target != current {
                break;
            }
            let index = self.rng.gen_range(0..graph.len());
            if let Some(room) = graph.room_at(index) {
                target = room.pos();
            }
        }

        self.path = find_path(&graph, current, target);
        self.cursor = 0;
        self.note = if self.path.is_some() {
            "patrol: new path"
        } else {
            "patrol: target unreachable"
        };
        log::trace!(
            "Patrol path {current} -> {target}: {} rooms",
            self.path.as_ref().map_or(0, Path::len)
        );
    }

    /// Walk toward the room under the cursor, advancing the cursor on arrival
    fn follow_path(&mut self, speed: f32) {
        let Some(node) = self.path.as_ref().and_then(|path| path.get(self.cursor)) else {
            return;
        };
        let Some(cell_size) = self.graph.as_ref().map(|graph| graph.cell_size()) else {
            return;
        };

        // Room centre at the agent's own height
        let target = Vec3::new(
            node.x as f32 * cell_size,
            self.agent.position.y,
            node.y as f32 * cell_size,
        );

        let seek = Seek::new(target, speed, self.config.patrol_turn_rate);
        let step = seek.apply(&mut self.agent, self.delta_time);

        if !step.is_moving() || self.agent.position.distance(target) < self.config.waypoint_tolerance {
            self.cursor += 1;
        }
    }

    /// Steer straight at the player, ignoring the room graph
    fn chase_directly(&mut self) {
        let seek = Seek::new(self.player, self.config.chase_speed, self.config.chase_turn_rate);
        seek.apply(&mut self.agent, self.delta_time);
    }
}

// ============================================================================
// States
// ============================================================================

#[derive(Debug)]
struct PatrolState;

impl State<PursuitContext> for PatrolState {
    fn name(&self) -> &'static str {
        "Patrol"
    }

    fn enter(&mut self, ctx: &mut PursuitContext) {
        ctx.state = PursuitState::Patrol;
        ctx.clear_path();
    }

    fn update(&mut self, ctx: &mut PursuitContext) -> Transition<PursuitContext> {
        if ctx.can_see {
            ctx.note = "patrol: saw player";
            return Transition::to(ChaseState);
        }

        if ctx.path_exhausted() {
            ctx.pick_patrol_path();
        }

        let speed = ctx.config.patrol_speed;
        ctx.follow_path(speed);
        Transition::None
    }
}

#[derive(Debug)]
struct ChaseState;

impl State<PursuitContext> for ChaseState {
    fn name(&self) -> &'static str {
        "Chase"
    }

    fn enter(&mut self, ctx: &mut PursuitContext) {
        ctx.state = PursuitState::Chase;
        ctx.lost_sight_timer = 0.0;
        ctx.clear_path();
    }

    fn update(&mut self, ctx: &mut PursuitContext) -> Transition<PursuitContext> {
        let player_room = ctx.closest_room(ctx.player);

        if ctx.can_see {
            ctx.lost_sight_timer = 0.0;
            ctx.last_known_room = player_room;
            ctx.chase_directly();
            ctx.note = "chase: direct pursuit";
            return Transition::None;
        }

        ctx.lost_sight_timer += ctx.delta_time;
        if ctx.lost_sight_timer < ctx.config.lose_sight_delay {
            ctx.note = "chase: sight lost, holding";
            return Transition::None;
        }

        if ctx.last_known_room.is_none() {
            ctx.last_known_room = player_room;
        }
        ctx.note = "chase: sight lost, searching last known room";
        Transition::to(SearchState)
    }
}

#[derive(Debug)]
struct SearchState;

impl State<PursuitContext> for SearchState {
    fn name(&self) -> &'static str {
        "Search"
    }

    fn enter(&mut self, ctx: &mut PursuitContext) {
        ctx.state = PursuitState::Search;
        ctx.clear_path();
    }

    fn update(&mut self, ctx: &mut PursuitContext) -> Transition<PursuitContext> {
        if ctx.can_see {
            ctx.note = "search: saw player";
            return Transition::to(ChaseState);
        }

        let Some(goal) = ctx.last_known_room else {
            ctx.note = "search: nothing to search";
            return Transition::to(PatrolState);
        };

        if ctx.path_exhausted() {
            let Some(start) = ctx.closest_room(ctx.agent.position) else {
                ctx.note = "search: agent is in no room";
                return Transition::to(PatrolState);
            };

            match ctx.graph.as_ref().and_then(|graph| find_path(graph, start, goal)) {
                Some(path) if !path.is_empty() => {
                    ctx.path = Some(path);
                    ctx.cursor = 0;
                    ctx.note = "search: heading to last known room";
                }
                _ => {
                    ctx.note = "search: last known room unreachable";
                    return Transition::to(PatrolState);
                }
            }
        }

        let speed = ctx.config.patrol_speed;
        ctx.follow_path(speed);

        if ctx.path_exhausted() {
            ctx.note = "search: last known room reached, player not found";
            return Transition::to(PatrolState);
        }
        Transition::None
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Drives one hunting agent through Patrol, Chase and Search.
///
/// The controller owns the agent's pose and never mutates the room graph.
/// Collaborators hand in the player position and an occlusion query on every
/// tick; missing ones make the tick a no-op.
#[derive(Debug)]
pub struct PursuitController {
    vision: VisionGate,
    machine: StateMachine<PursuitContext>,
    ctx: PursuitContext,
    /// Player position from the latest tick
    player: Option<Vec3>,
    /// Agent and player currently within kill distance
    in_contact: bool,
    last_skip: Option<SkipReason>,
}

impl PursuitController {
    /// Create a controller in Patrol with no level attached
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either config is out of bounds
    pub fn new(config: PursuitConfig, vision: VisionGate, agent: Pose) -> Result<Self, ConfigError> {
        config.validate()?;
        vision.config().validate()?;

        let seed = config.seed.resolve();
        log::debug!("Pursuit controller seeded with {seed}");

        Ok(Self {
            vision,
            machine: StateMachine::new(PatrolState),
            ctx: PursuitContext {
                config,
                graph: None,
                agent,
                player: Vec3::ZERO,
                can_see: false,
                delta_time: 0.0,
                path: None,
                cursor: 0,
                last_known_room: None,
                lost_sight_timer: 0.0,
                rng: ChaCha8Rng::seed_from_u64(seed),
                state: PursuitState::Patrol,
                note: "waiting for first tick",
            },
            player: None,
            in_contact: false,
            last_skip: None,
        })
    }

    /// Replace the level. Any path and last-known room from the old level are
    /// dropped.
    pub fn attach_level(&mut self, graph: Arc<RoomGraph>) {
        log::debug!("Pursuit controller attached to level with {} rooms", graph.len());
        self.ctx.graph = Some(graph);
        self.ctx.clear_path();
        self.ctx.last_known_room = None;
        self.ctx.note = "level attached";
    }

    /// Drop the level; ticks are skipped until another is attached
    pub fn detach_level(&mut self) {
        self.ctx.graph = None;
        self.ctx.clear_path();
        self.ctx.last_known_room = None;
    }

    /// Put the agent back in Patrol at `agent`, forgetting everything it knew
    /// about the player
    pub fn reset(&mut self, agent: Pose) {
        self.ctx.agent = agent;
        self.ctx.last_known_room = None;
        self.ctx.can_see = false;
        self.ctx.lost_sight_timer = 0.0;
        self.in_contact = false;
        self.player = None;
        self.machine.transition(&mut self.ctx, PatrolState);
        self.ctx.note = "reset";
    }

    /// Advance one tick.
    ///
    /// Emits [`GameEvent::PursuitStateChanged`] on every transition and
    /// [`GameEvent::EncounterResolved`] once each time the agent closes to
    /// within kill distance.
    pub fn tick(&mut self, input: &TickInput<'_>, events: &mut EventQueue) -> TickStatus {
        let (player, occlusion) = match self.collaborators(input) {
            Ok(wired) => wired,
            Err(reason) => return self.skip(reason),
        };

        if self.last_skip.take().is_some() {
            log::info!("Pursuit controller resumed");
        }

        self.player = Some(player);
        self.ctx.player = player;
        self.ctx.delta_time = input.delta_time.max(0.0);
        self.ctx.can_see = self.vision.can_see(&self.ctx.agent, player, occlusion);

        let before = self.ctx.state;
        self.machine.update(&mut self.ctx);
        let after = self.ctx.state;

        if before != after {
            log::debug!("Pursuit {before} -> {after}: {}", self.ctx.note);
            events.push(GameEvent::PursuitStateChanged { from: before, to: after });
        }

        self.check_contact(events);
        TickStatus::Updated(after)
    }

    fn collaborators<'a>(
        &self,
        input: &TickInput<'a>,
    ) -> Result<(Vec3, &'a dyn OcclusionQuery), SkipReason> {
        let graph = self.ctx.graph.as_ref().ok_or(SkipReason::NoLevel)?;
        if graph.is_empty() {
            return Err(SkipReason::EmptyLevel);
        }
        let player = input.player_position.ok_or(SkipReason::NoPlayer)?;
        let occlusion = input.occlusion.ok_or(SkipReason::NoVision)?;
        Ok((player, occlusion))
    }

    fn skip(&mut self, reason: SkipReason) -> TickStatus {
        if self.last_skip != Some(reason) {
            log::warn!("Pursuit tick skipped: {}", reason.describe());
            self.last_skip = Some(reason);
        }
        self.ctx.note = reason.describe();
        TickStatus::Skipped(reason)
    }

    fn check_contact(&mut self, events: &mut EventQueue) {
        let agent_position = self.ctx.agent.position;
        let player_position = self.ctx.player;

        if agent_position.distance(player_position) > self.ctx.config.kill_distance {
            self.in_contact = false;
            return;
        }

        if !self.in_contact {
            self.in_contact = true;
            log::info!("Encounter resolved at {agent_position}");
            events.push(GameEvent::EncounterResolved {
                agent_position,
                player_position,
            });
        }
    }

    /// Current behavior
    #[must_use]
    pub fn state(&self) -> PursuitState {
        self.ctx.state
    }

    /// Name of the running state
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.machine.current_state_name()
    }

    #[must_use]
    pub fn agent_pose(&self) -> &Pose {
        &self.ctx.agent
    }

    /// Teleport the agent
    pub fn set_agent_pose(&mut self, pose: Pose) {
        self.ctx.agent = pose;
    }

    #[must_use]
    pub fn config(&self) -> &PursuitConfig {
        &self.ctx.config
    }

    #[must_use]
    pub fn vision(&self) -> &VisionGate {
        &self.vision
    }

    /// Currently attached level
    #[must_use]
    pub fn graph(&self) -> Option<&Arc<RoomGraph>> {
        self.ctx.graph.as_ref()
    }

    /// Where the player was last seen
    #[must_use]
    pub fn last_known_room(&self) -> Option<GridPos> {
        self.ctx.last_known_room
    }

    /// Read-only copy of the controller's internals
    #[must_use]
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            state: self.ctx.state,
            can_see_player: self.ctx.can_see,
            agent_room: self.ctx.closest_room(self.ctx.agent.position),
            player_room: self.player.and_then(|player| self.ctx.closest_room(player)),
            last_known_room: self.ctx.last_known_room,
            path_len: self.ctx.path.as_ref().map_or(0, Path::len),
            path_cursor: self.ctx.cursor,
            lost_sight_timer: self.ctx.lost_sight_timer,
            note: self.ctx.note,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::core::{VisionConfig, look_rotation};
    use crate::level::RoomKind;

    const DT: f32 = 0.1;

    /// Rooms (0,0) .. (length-1, 0) in a straight line, cell size 10
    fn corridor(length: i32) -> Arc<RoomGraph> {
        let mut graph = RoomGraph::new(10.0);
        graph.add_room(GridPos::ZERO, RoomKind::Entrance).unwrap();
        for x in 1..length {
            let kind = if x == length - 1 {
                RoomKind::Objective
            } else {
                RoomKind::Normal
            };
            graph.add_room(GridPos::new(x, 0), kind).unwrap();
            graph.connect(GridPos::new(x - 1, 0), GridPos::new(x, 0)).unwrap();
        }
        Arc::new(graph)
    }

    /// Controller that sees all around, so only the occlusion query decides
    fn controller(graph: Arc<RoomGraph>, agent: Vec3) -> PursuitController {
        let vision = VisionGate::new(VisionConfig::default().with_view(100.0, 360.0));
        let config = PursuitConfig::default().with_seed(3);
        let pose = Pose::from_position_rotation(agent, look_rotation(Vec3::X));
        let mut controller = PursuitController::new(config, vision, pose).unwrap();
        controller.attach_level(graph);
        controller
    }

    /// Occlusion that hides the player unless `visible` is set
    fn sight(visible: &Cell<bool>) -> impl Fn(Vec3, Vec3) -> bool + '_ {
        move |_, _| !visible.get()
    }

    fn tick(controller: &mut PursuitController, player: Vec3, occlusion: &dyn OcclusionQuery) -> TickStatus {
        let mut events = EventQueue::new();
        controller.tick(
            &TickInput::new(DT).with_player(player).with_occlusion(occlusion),
            &mut events,
        )
    }

    fn encounters(events: &EventQueue) -> usize {
        events
            .pending()
            .filter(|event| matches!(event, GameEvent::EncounterResolved { .. }))
            .count()
    }

    #[test]
    fn test_patrol_picks_path_while_unseen() {
        let visible = Cell::new(false);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(4), Vec3::new(0.0, 1.0, 0.0));

        let status = tick(&mut controller, Vec3::new(30.0, 1.0, 5.0), &occlusion);

        assert_eq!(status, TickStatus::Updated(PursuitState::Patrol));
        let snapshot = controller.debug_snapshot();
        assert!(snapshot.path_len >= 2, "patrol target must differ from the current room");
        assert_eq!(snapshot.agent_room, Some(GridPos::ZERO));
    }

    #[test]
    fn test_patrol_to_chase_clears_path() {
        let visible = Cell::new(false);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(4), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(30.0, 1.0, 5.0);

        tick(&mut controller, player, &occlusion);
        assert!(controller.debug_snapshot().path_len > 0);

        visible.set(true);
        let mut events = EventQueue::new();
        let status = controller.tick(
            &TickInput::new(DT).with_player(player).with_occlusion(&occlusion),
            &mut events,
        );

        assert_eq!(status, TickStatus::Updated(PursuitState::Chase));
        assert_eq!(controller.debug_snapshot().path_len, 0);
        assert!(events.pending().any(|event| matches!(
            event,
            GameEvent::PursuitStateChanged {
                from: PursuitState::Patrol,
                to: PursuitState::Chase
            }
        )));
    }

    #[test]
    fn test_chase_steers_directly_at_player() {
        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(4), Vec3::new(0.0, 1.0, 0.0));
        // Off the corridor entirely: chase ignores the room graph
        let player = Vec3::new(0.0, 1.0, 8.0);

        tick(&mut controller, player, &occlusion);
        tick(&mut controller, player, &occlusion);

        let position = controller.agent_pose().position;
        assert!((position.z - 5.0 * DT).abs() < 1e-4);
        assert!(position.x.abs() < 1e-4);
        assert_eq!(controller.last_known_room(), Some(GridPos::ZERO));
    }

    #[test]
    fn test_chase_grace_period_then_search() {
        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(4), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(20.0, 1.0, 4.0);

        tick(&mut controller, player, &occlusion); // Patrol -> Chase
        tick(&mut controller, player, &occlusion); // sees player in room (2, 0)
        assert_eq!(controller.state(), PursuitState::Chase);

        // Player slips into the next room unseen
        visible.set(false);
        let hidden = Vec3::new(30.0, 1.0, 4.0);

        // 0.1s and 0.2s lost: still inside the 0.25s grace period
        tick(&mut controller, hidden, &occlusion);
        tick(&mut controller, hidden, &occlusion);
        assert_eq!(controller.state(), PursuitState::Chase);
        assert!((controller.debug_snapshot().lost_sight_timer - 0.2).abs() < 1e-5);

        // 0.3s lost
        let status = tick(&mut controller, hidden, &occlusion);
        assert_eq!(status, TickStatus::Updated(PursuitState::Search));
        assert_eq!(controller.last_known_room(), Some(GridPos::new(2, 0)));
    }

    #[test]
    fn test_regained_sight_resets_grace_timer() {
        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(4), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(20.0, 1.0, 4.0);

        tick(&mut controller, player, &occlusion);
        for _ in 0..5 {
            visible.set(false);
            tick(&mut controller, player, &occlusion);
            tick(&mut controller, player, &occlusion);
            visible.set(true);
            tick(&mut controller, player, &occlusion);
        }

        assert_eq!(controller.state(), PursuitState::Chase);
        assert!(controller.debug_snapshot().lost_sight_timer.abs() < f32::EPSILON);
    }

    #[test]
    fn test_search_exhaustion_returns_to_patrol() {
        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(4), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(20.0, 1.0, 4.0);

        tick(&mut controller, player, &occlusion);
        tick(&mut controller, player, &occlusion);
        visible.set(false);
        for _ in 0..3 {
            tick(&mut controller, player, &occlusion);
        }
        assert_eq!(controller.state(), PursuitState::Search);

        let mut ticks = 0;
        while controller.state() == PursuitState::Search && ticks < 500 {
            tick(&mut controller, player, &occlusion);
            ticks += 1;
        }

        assert_eq!(controller.state(), PursuitState::Patrol);
        assert_eq!(controller.debug_snapshot().path_len, 0);
        // Ended in the last known room
        assert_eq!(controller.debug_snapshot().agent_room, Some(GridPos::new(2, 0)));
    }

    #[test]
    fn test_search_without_last_known_room_patrols() {
        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(3), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(20.0, 1.0, 4.0);

        tick(&mut controller, player, &occlusion);
        tick(&mut controller, player, &occlusion);
        visible.set(false);
        for _ in 0..3 {
            tick(&mut controller, player, &occlusion);
        }
        assert_eq!(controller.state(), PursuitState::Search);

        // A new level forgets the last known room
        controller.attach_level(corridor(3));
        assert_eq!(controller.last_known_room(), None);
        assert_eq!(controller.debug_snapshot().path_len, 0);

        let status = tick(&mut controller, player, &occlusion);
        assert_eq!(status, TickStatus::Updated(PursuitState::Patrol));
    }

    #[test]
    fn test_search_unreachable_last_known_room_patrols() {
        // Two rooms with no door between them
        let mut graph = RoomGraph::new(10.0);
        graph.add_room(GridPos::ZERO, RoomKind::Entrance).unwrap();
        graph.add_room(GridPos::EAST, RoomKind::Normal).unwrap();

        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(Arc::new(graph), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(10.0, 1.0, 0.0);

        tick(&mut controller, player, &occlusion); // Patrol -> Chase
        tick(&mut controller, player, &occlusion);
        assert_eq!(controller.last_known_room(), Some(GridPos::EAST));

        visible.set(false);
        for _ in 0..3 {
            tick(&mut controller, player, &occlusion);
        }
        assert_eq!(controller.state(), PursuitState::Search);

        let status = tick(&mut controller, player, &occlusion);
        assert_eq!(status, TickStatus::Updated(PursuitState::Patrol));
        assert_eq!(controller.debug_snapshot().path_len, 0);
    }

    #[test]
    fn test_single_room_patrol_settles_on_centre() {
        let occlusion = |_: Vec3, _: Vec3| true;
        let mut controller = controller(corridor(1), Vec3::new(0.0, 1.0, 0.0));
        controller.set_agent_pose(Pose::from_position(Vec3::new(3.0, 1.0, 0.0)));
        let player = Vec3::new(50.0, 1.0, 50.0);

        for _ in 0..40 {
            let status = tick(&mut controller, player, &occlusion);
            assert_eq!(status, TickStatus::Updated(PursuitState::Patrol));
        }

        // Only one room to pick, so the agent walks to its centre and stays
        assert!((controller.agent_pose().position - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        let snapshot = controller.debug_snapshot();
        assert_eq!(snapshot.path_len, 1);
        assert_eq!(snapshot.path_cursor, 1);
    }

    #[test]
    fn test_detach_level_skips_ticks() {
        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(3), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(20.0, 1.0, 0.0);

        tick(&mut controller, player, &occlusion);
        tick(&mut controller, player, &occlusion);
        assert_eq!(controller.last_known_room(), Some(GridPos::new(2, 0)));

        controller.detach_level();
        let position = controller.agent_pose().position;

        assert!(controller.graph().is_none());
        assert_eq!(controller.last_known_room(), None);
        assert_eq!(
            tick(&mut controller, player, &occlusion),
            TickStatus::Skipped(SkipReason::NoLevel)
        );
        assert_eq!(controller.agent_pose().position, position);
    }

    #[test]
    fn test_kill_fires_once_per_contact() {
        let visible = Cell::new(false);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(1), Vec3::new(0.0, 1.0, 0.0));
        let mut events = EventQueue::new();

        let near = TickInput::new(DT)
            .with_player(Vec3::new(1.0, 1.0, 0.0))
            .with_occlusion(&occlusion);
        let far = TickInput::new(DT)
            .with_player(Vec3::new(5.0, 1.0, 0.0))
            .with_occlusion(&occlusion);

        controller.tick(&near, &mut events);
        controller.tick(&near, &mut events);
        controller.tick(&near, &mut events);
        assert_eq!(encounters(&events), 1);

        controller.tick(&far, &mut events);
        controller.tick(&near, &mut events);
        assert_eq!(encounters(&events), 2);
    }

    #[test]
    fn test_kill_distance_is_inclusive() {
        let occlusion = |_: Vec3, _: Vec3| true;
        let config = PursuitConfig::default().with_seed(1).with_kill_distance(1.0);
        let pose = Pose::from_position(Vec3::new(0.0, 1.0, 0.0));
        let mut controller = PursuitController::new(config, VisionGate::default(), pose).unwrap();
        controller.attach_level(corridor(1));
        let mut events = EventQueue::new();

        let input = TickInput::new(DT)
            .with_player(Vec3::new(1.0, 1.0, 0.0))
            .with_occlusion(&occlusion);
        controller.tick(&input, &mut events);

        assert_eq!(encounters(&events), 1);
    }

    #[test]
    fn test_missing_collaborators_skip_tick() {
        let vision = VisionGate::default();
        let pose = Pose::from_position(Vec3::new(0.0, 1.0, 0.0));
        let mut controller = PursuitController::new(PursuitConfig::default(), vision, pose).unwrap();
        let mut events = EventQueue::new();
        let occlusion = |_: Vec3, _: Vec3| false;
        let player = Vec3::new(0.5, 1.0, 0.0);

        let full = TickInput::new(DT).with_player(player).with_occlusion(&occlusion);
        assert_eq!(controller.tick(&full, &mut events), TickStatus::Skipped(SkipReason::NoLevel));

        controller.attach_level(Arc::new(RoomGraph::new(10.0)));
        assert_eq!(controller.tick(&full, &mut events), TickStatus::Skipped(SkipReason::EmptyLevel));

        controller.attach_level(corridor(2));
        let no_player = TickInput::new(DT).with_occlusion(&occlusion);
        assert_eq!(controller.tick(&no_player, &mut events), TickStatus::Skipped(SkipReason::NoPlayer));

        let no_vision = TickInput::new(DT).with_player(player);
        assert_eq!(controller.tick(&no_vision, &mut events), TickStatus::Skipped(SkipReason::NoVision));

        assert_eq!(controller.state(), PursuitState::Patrol);
        assert_eq!(controller.agent_pose().position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(events.pending_count(), 0);
    }

    #[test]
    fn test_reset_returns_to_patrol() {
        let visible = Cell::new(true);
        let occlusion = sight(&visible);
        let mut controller = controller(corridor(3), Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(20.0, 1.0, 0.0);

        tick(&mut controller, player, &occlusion);
        assert_eq!(controller.state(), PursuitState::Chase);

        controller.reset(Pose::from_position(Vec3::new(10.0, 1.0, 0.0)));

        assert_eq!(controller.state(), PursuitState::Patrol);
        assert_eq!(controller.state_name(), "Patrol");
        assert_eq!(controller.last_known_room(), None);
        assert_eq!(controller.debug_snapshot().agent_room, Some(GridPos::new(1, 0)));
    }

    #[test]
    fn test_patrol_is_deterministic_for_fixed_seed() {
        let occlusion = |_: Vec3, _: Vec3| true;
        let graph = corridor(6);
        let mut a = controller(Arc::clone(&graph), Vec3::new(0.0, 1.0, 0.0));
        let mut b = controller(graph, Vec3::new(0.0, 1.0, 0.0));
        let player = Vec3::new(100.0, 1.0, 100.0);

        for _ in 0..200 {
            tick(&mut a, player, &occlusion);
            tick(&mut b, player, &occlusion);
        }

        assert_eq!(a.agent_pose().position, b.agent_pose().position);
        assert_eq!(a.debug_snapshot(), b.debug_snapshot());
    }
}

//! Headless demo: the agent hunts a player walking back to the entrance
//!
//! Pass a RON config file as the first argument to override the defaults.
//! Run with `RUST_LOG=info` (or `debug`) to follow the hunt.

use std::process::ExitCode;
use std::sync::Arc;

use pursuit::prelude::*;

/// Fixed simulation step
const TICK: f32 = 1.0 / 60.0;
/// Give up on a round after two minutes
const MAX_TICKS: u32 = 60 * 120;
/// Levels played, each from the next seed
const ROUNDS: u64 = 3;
/// Body centre above the floor
const BODY_LIFT: f32 = 0.9;
const PLAYER_SPEED: f32 = 3.0;

fn main() -> ExitCode {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::load_ron(&path) {
            Ok(config) => {
                log::info!("Loaded config from {path}");
                config
            }
            Err(err) => {
                log::error!("Failed to load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Invalid configuration: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &GameConfig) -> Result<(), ConfigError> {
    let generator = LevelGenerator::new(config.generation.clone())?;
    let vision = VisionGate::new(config.vision.clone());
    let mut controller = PursuitController::new(config.pursuit.clone(), vision, Pose::new())?;
    let mut physics = Physics::new();
    let mut events = EventQueue::new();

    let base_seed = config.generation.seed.resolve();
    for round in 0..ROUNDS {
        let level = generator.generate_with_seed(base_seed.wrapping_add(round));

        // A new level makes any queued events stale
        events.clear();
        events.push(GameEvent::LevelGenerated {
            rooms: level.graph.len(),
            seed: level.seed,
        });

        physics.build_level(&level.graph, &LevelGeometry::from_graph(&level.graph));
        controller.attach_level(Arc::clone(&level.graph));

        log::info!("Round {} of {ROUNDS}", round + 1);
        play_round(&level, &mut controller, &mut physics, &mut events);
    }

    Ok(())
}

fn play_round(
    level: &Level,
    controller: &mut PursuitController,
    physics: &mut Physics,
    events: &mut EventQueue,
) {
    let graph = &level.graph;
    let lift = Vec3::Y * BODY_LIFT;

    let Some(entrance) = graph.entrance().map(|room| graph.grid_to_world(room.pos()) + lift) else {
        log::warn!("Level has no entrance, skipping round");
        return;
    };

    // The player retraces the main path from its far end
    let route: Vec<Vec3> = level
        .main_path
        .iter()
        .rev()
        .map(|&pos| graph.grid_to_world(pos) + lift)
        .collect();
    let mut player = route.first().copied().unwrap_or(entrance);
    let mut waypoint = 0;

    controller.reset(Pose::from_position(entrance));
    physics.add_target_capsule(player, 0.5, 0.4);

    for tick in 0..MAX_TICKS {
        if let Some(&target) = route.get(waypoint) {
            let mut pose = Pose::from_position(player);
            let step = Seek::new(target, PLAYER_SPEED, 10.0).apply(&mut pose, TICK);
            player = pose.position;
            if !step.is_moving() {
                waypoint += 1;
            }
        }
        physics.set_target_position(player);

        events.swap();
        for event in events.drain() {
            report(&event);
        }

        let occlusion = physics.occlusion();
        let input = TickInput::new(TICK)
            .with_player(player)
            .with_occlusion(&occlusion);
        controller.tick(&input, events);

        let caught = events
            .pending()
            .any(|event| matches!(event, GameEvent::EncounterResolved { .. }));
        if caught {
            log::info!("Round over after {:.1}s", tick as f32 * TICK);
            break;
        }
    }

    events.swap();
    for event in events.drain() {
        report(&event);
    }
    for line in controller.debug_snapshot().lines() {
        log::info!("{line}");
    }
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::LevelGenerated { rooms, seed } => {
            log::info!("Level ready: {rooms} rooms (seed {seed})");
        }
        GameEvent::PursuitStateChanged { from, to } => log::info!("Agent {from} -> {to}"),
        GameEvent::EncounterResolved {
            agent_position,
            player_position,
        } => log::info!("Player caught at {player_position} by agent at {agent_position}"),
        _ => {}
    }
}

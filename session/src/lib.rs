#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Encounter session wiring the world, the director and the spawn table.
//!
//! An [`Encounter`] owns every piece of mutable encounter state and the
//! host-supplied collaborators. Hosts feed it wall-clock frame durations
//! through [`Encounter::advance`]; the session converts them into fixed
//! simulation steps, applies queued commands, lets the director react to the
//! step's events, and fans observer notifications out to the sink.

use std::time::Duration;

use horde_core::{
    ActorId, Characters, Command, Event, Notification, NotificationSink, PlayerId,
    SpawnPointProvider, Species, Vec3,
};
use horde_system_director::{Config as DirectorConfig, Director, Views};
use horde_system_spawning::SpawnPointTable;
use horde_world::{apply, query, World, WorldConfig};
use tracing::{info, warn};

mod clock;
mod config;
mod seeds;
mod sinks;

pub use config::{ConfigError, EncounterConfig, PlayerConfig, ScheduleOverride, StatsOverride};
pub use sinks::{RecordingSink, TracingSink};

use crate::{
    clock::plan_steps,
    seeds::{derive_labeled_seed, DIRECTOR_STREAM, SPAWN_POINT_STREAM, WORLD_STREAM},
};

/// Running encounter bound to its character layer and notification sink.
#[derive(Debug)]
pub struct Encounter<C, S> {
    world: World,
    director: Director,
    spawn_points: SpawnPointTable,
    characters: C,
    sink: S,
    fixed_dt: Duration,
    max_steps_per_frame: u32,
    accumulator: Duration,
    pending: Vec<Command>,
    events: Vec<Event>,
    steps: u64,
}

impl<C: Characters, S: NotificationSink> Encounter<C, S> {
    /// Validates `config` and builds a fresh encounter at time zero.
    pub fn new(config: &EncounterConfig, characters: C, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = World::new(WorldConfig {
            seed: derive_labeled_seed(config.seed, WORLD_STREAM),
            actor_cadence: config.actor_cadence()?,
            species: config.species_table()?,
            terrain: config.terrain(),
        });
        let director = Director::new(DirectorConfig {
            tuning: config.director,
            schedule: config.spawn_schedule()?,
            seed: derive_labeled_seed(config.seed, DIRECTOR_STREAM),
        });
        let spawn_points = SpawnPointTable::new(
            config.spawn_points.clone(),
            config.spawning,
            derive_labeled_seed(config.seed, SPAWN_POINT_STREAM),
        );

        info!(
            seed = config.seed,
            tick_rate_hz = config.tick_rate_hz,
            spawn_points = spawn_points.points().len(),
            characters = characters.characters().len(),
            "encounter started"
        );

        Ok(Self {
            world,
            director,
            spawn_points,
            characters,
            sink,
            fixed_dt: config.fixed_dt()?,
            max_steps_per_frame: config.max_steps_per_frame,
            accumulator: Duration::ZERO,
            pending: Vec::new(),
            events: Vec::new(),
            steps: 0,
        })
    }

    /// Feeds one frame of wall-clock time, running as many fixed steps as fit.
    ///
    /// Returns the number of steps run. Backlog beyond the per-frame clamp is
    /// dropped and logged.
    pub fn advance(&mut self, frame_dt: Duration) -> u32 {
        let accumulated = self.accumulator.saturating_add(frame_dt);
        let plan = plan_steps(accumulated, self.fixed_dt, self.max_steps_per_frame);
        for _ in 0..plan.ticks_to_run {
            let _ = self.step();
        }
        self.accumulator = plan.remaining_accumulator;

        if plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                max_steps_per_frame = self.max_steps_per_frame,
                "simulation clamp triggered"
            );
        }
        plan.ticks_to_run
    }

    /// Runs exactly one fixed step and returns the events it produced.
    pub fn step(&mut self) -> &[Event] {
        self.events.clear();
        for command in std::mem::take(&mut self.pending) {
            apply(
                &mut self.world,
                command,
                &mut self.characters,
                &mut self.events,
            );
        }
        apply(
            &mut self.world,
            Command::Tick { dt: self.fixed_dt },
            &mut self.characters,
            &mut self.events,
        );

        let snapshots = self.characters.characters();
        let active = query::active_counts(&self.world);
        let views = Views {
            characters: &snapshots,
            active: &active,
            species: query::species_table(&self.world),
        };
        let mut selection = self.spawn_points.select(
            query::now(&self.world),
            &snapshots,
            query::terrain(&self.world),
        );
        let mut director_events = Vec::new();
        self.director.handle(
            &self.events,
            views,
            &mut selection,
            &mut self.pending,
            &mut director_events,
        );
        self.events.extend(director_events);

        notify(&mut self.sink, &self.events);
        self.steps = self.steps.saturating_add(1);
        &self.events
    }

    /// Queues a host command (weapon damage, contacts, rescues) for the next step.
    pub fn submit(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Freezes director spawning, e.g. while the party is in a safe room.
    pub fn pause_spawning(&mut self) {
        self.director.pause_spawning();
    }

    /// Resumes director spawning.
    pub fn resume_spawning(&mut self) {
        self.director.resume_spawning();
    }

    /// Debug hook: spawns up to `count` common actors at common spawn points.
    pub fn spawn_commons(&mut self, count: u32) -> Vec<ActorId> {
        let mut spawned = Vec::new();
        for _ in 0..count {
            match self.spawn_species(Species::Common, None) {
                Some(actor) => spawned.push(actor),
                None => break,
            }
        }
        info!(requested = count, spawned = spawned.len(), "debug spawn of commons");
        spawned
    }

    /// Debug hook: spawns one actor at `position`, or at a spawn point of the
    /// species' kind when no position is given.
    pub fn spawn_species(&mut self, species: Species, position: Option<Vec3>) -> Option<ActorId> {
        let position = match position {
            Some(position) => position,
            None => {
                let snapshots = self.characters.characters();
                let mut selection = self.spawn_points.select(
                    query::now(&self.world),
                    &snapshots,
                    query::terrain(&self.world),
                );
                let Some(position) = selection.get_spawn_point(species.spawn_kind(), false, 0.0)
                else {
                    warn!(species = species.name(), "debug spawn found no spawn point");
                    return None;
                };
                position
            }
        };

        let events = self.apply_now(Command::SpawnActor { species, position });
        events.iter().find_map(|event| match event {
            Event::ActorSpawned { actor, .. } => Some(*actor),
            _ => None,
        })
    }

    /// Debug hook: removes every actor, releasing held victims. Returns the
    /// number of actors removed.
    pub fn kill_all(&mut self) -> usize {
        let mut removed = 0;
        for actor in query::actor_ids(&self.world) {
            let events = self.apply_now(Command::RemoveActor { actor });
            removed += events
                .iter()
                .filter(|event| matches!(event, Event::ActorRemoved { .. }))
                .count();
        }
        info!(removed, "debug kill-all");
        removed
    }

    /// Debug hook: restores a character to full health. Returns `false` for
    /// unknown characters.
    pub fn heal_player(&mut self, player: PlayerId) -> bool {
        if self.characters.character(player).is_none() {
            warn!(player = player.get(), "debug heal for unknown character");
            return false;
        }
        self.characters.heal_player(player);
        info!(player = player.get(), "debug heal");
        true
    }

    fn apply_now(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut self.characters, &mut events);
        notify(&mut self.sink, &events);
        events
    }

    /// Authoritative world, for read-only queries.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Pacing director.
    pub fn director(&self) -> &Director {
        &self.director
    }

    /// Spawn point table with usage history.
    pub fn spawn_points(&self) -> &SpawnPointTable {
        &self.spawn_points
    }

    /// Character collaborator.
    pub fn characters(&self) -> &C {
        &self.characters
    }

    /// Mutable character collaborator, for hosts that move characters.
    pub fn characters_mut(&mut self) -> &mut C {
        &mut self.characters
    }

    /// Notification sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Current simulation time.
    pub fn now(&self) -> Duration {
        query::now(&self.world)
    }

    /// Number of fixed steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Events produced by the most recent step.
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Commands queued for the next step.
    pub fn pending_commands(&self) -> &[Command] {
        &self.pending
    }
}

fn notify<S: NotificationSink>(sink: &mut S, events: &[Event]) {
    for event in events {
        if let Some((kind, payload)) = Notification::from_event(event) {
            sink.broadcast(kind, payload);
        }
    }
}

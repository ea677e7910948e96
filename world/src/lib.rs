#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative actor world for the Horde encounter engine.
//!
//! The world owns every actor, the victim locks between actors and
//! characters, the deferred-callback queue, and lingering hazards. It is
//! mutated exclusively through [`apply`], which consumes one [`Command`] and
//! appends the resulting [`Event`] values. Characters are reached through the
//! [`Characters`] collaborator passed to every call; the world never stores
//! them.

use std::time::Duration;

use horde_core::{ActorState, Characters, Command, Event, SpeciesTable, DEFAULT_ACTOR_CADENCE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

mod actor;
mod context;
mod hazards;
mod locks;
mod party;
mod registry;
mod scheduler;
mod species;
mod terrain;
#[cfg(test)]
mod testing;

pub use party::{Party, INCAPACITATED_HEALTH, MAX_HEALTH, RESCUE_RANGE, REVIVE_HEALTH};
pub use registry::MAX_CONSECUTIVE_FAULTS;
pub use terrain::{Occluder, Terrain};

use crate::{
    context::Ctx,
    hazards::Hazards,
    locks::VictimLocks,
    registry::ActorRegistry,
    scheduler::{Deferred, Scheduler},
};

/// Parameters used to construct a [`World`].
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Seed for the world's random stream (stagger rolls).
    pub seed: u64,
    /// Minimum interval between two updates of the same actor.
    pub actor_cadence: Duration,
    /// Per-species parameters and caps.
    pub species: SpeciesTable,
    /// Blocking geometry used for line-of-sight checks.
    pub terrain: Terrain,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            actor_cadence: DEFAULT_ACTOR_CADENCE,
            species: SpeciesTable::default(),
            terrain: Terrain::default(),
        }
    }
}

/// Represents the authoritative encounter world state.
#[derive(Debug)]
pub struct World {
    clock: Duration,
    registry: ActorRegistry,
    locks: VictimLocks,
    scheduler: Scheduler,
    hazards: Hazards,
    terrain: Terrain,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world at time zero.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            clock: Duration::ZERO,
            registry: ActorRegistry::new(config.species, config.actor_cadence),
            locks: VictimLocks::new(),
            scheduler: Scheduler::new(),
            hazards: Hazards::new(),
            terrain: config.terrain,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    fn split<'a>(
        &'a mut self,
        characters: &'a mut dyn Characters,
        events: &'a mut Vec<Event>,
    ) -> (&'a mut ActorRegistry, Ctx<'a>) {
        (
            &mut self.registry,
            Ctx {
                now: self.clock,
                characters,
                sight: &self.terrain,
                locks: &mut self.locks,
                scheduler: &mut self.scheduler,
                hazards: &mut self.hazards,
                rng: &mut self.rng,
                events,
            },
        )
    }

    fn run_deferred(&mut self, characters: &mut dyn Characters, out_events: &mut Vec<Event>) {
        let due = self.scheduler.drain_due(self.clock);
        for call in due {
            let (registry, mut ctx) = self.split(&mut *characters, &mut *out_events);
            let current = registry.get(call.actor).map(|actor| actor.body.generation);
            if current != Some(call.generation) {
                ctx.scheduler.record_stale();
                debug!(
                    actor = call.actor.get(),
                    action = ?call.action,
                    "stale deferred call skipped"
                );
                continue;
            }

            match call.action {
                Deferred::Destroy => {
                    let _ = registry.remove(call.actor, &mut ctx);
                }
                Deferred::ResolvePounce | Deferred::ResolveCharge => {
                    let expected = if call.action == Deferred::ResolvePounce {
                        ActorState::Leap
                    } else {
                        ActorState::Charge
                    };
                    if let Some(actor) = registry.get_mut(call.actor) {
                        actor.resolve_timeout(expected, &mut ctx);
                    }
                }
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(
    world: &mut World,
    command: Command,
    characters: &mut dyn Characters,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                now: world.clock,
            });
            world.run_deferred(characters, out_events);
            let (registry, mut ctx) = world.split(characters, out_events);
            registry.tick_all(&mut ctx);
            ctx.tick_hazards(dt);
        }
        Command::SpawnActor { species, position } => {
            let now = world.clock;
            match world.registry.spawn(species, position, now) {
                Ok(actor) => out_events.push(Event::ActorSpawned {
                    actor,
                    species,
                    position,
                }),
                Err(reason) => {
                    debug!(species = species.name(), %reason, "spawn rejected");
                    out_events.push(Event::SpawnRejected { species, reason });
                }
            }
        }
        Command::RemoveActor { actor } => {
            let (registry, mut ctx) = world.split(characters, out_events);
            let _ = registry.remove(actor, &mut ctx);
        }
        Command::DamageActor {
            actor,
            amount,
            source,
        } => {
            let (registry, mut ctx) = world.split(characters, out_events);
            if let Some(target) = registry.get_mut(actor) {
                target.take_damage(amount, source, &mut ctx);
            }
        }
        Command::TransitionActor { actor, state } => {
            let (registry, mut ctx) = world.split(characters, out_events);
            if let Some(target) = registry.get_mut(actor) {
                target.force_transition(state, &mut ctx);
            }
        }
        Command::ReportContact { actor, player } => {
            let (registry, mut ctx) = world.split(characters, out_events);
            if let Some(target) = registry.get_mut(actor) {
                target.contact(player, &mut ctx);
            }
        }
        Command::RescueVictim { rescuer, victim } => {
            let outcome = characters.attempt_rescue(rescuer, victim);
            if outcome.success {
                let (registry, mut ctx) = world.split(characters, out_events);
                if let Some((holder, _)) = ctx.locks.holder_of(victim) {
                    if let Some(actor) = registry.get_mut(holder) {
                        actor.force_transition(ActorState::Stagger, &mut ctx);
                    }
                    ctx.release_victim(holder);
                }
            }
            info!(
                rescuer = rescuer.get(),
                victim = victim.get(),
                success = outcome.success,
                reason = %outcome.reason,
                "rescue attempted"
            );
            out_events.push(Event::RescueAttempted {
                rescuer,
                victim,
                success: outcome.success,
                reason: outcome.reason,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use horde_core::{
        ActorId, ActorSnapshot, ActorView, LockKind, PlayerId, SpeciesCounts, SpeciesTable,
    };

    use super::{Terrain, World};

    /// Current simulation time.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Snapshot of a single actor, if it is still registered.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        world.registry.get(actor).map(|actor| actor.body.snapshot())
    }

    /// Captures a read-only view of every registered actor.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .registry
                .iter()
                .map(|actor| actor.body.snapshot())
                .collect(),
        )
    }

    /// Identifiers of every registered actor in ascending order.
    #[must_use]
    pub fn actor_ids(world: &World) -> Vec<ActorId> {
        world.registry.ids()
    }

    /// Number of registered actors per species. Corpses count until destroyed.
    #[must_use]
    pub fn active_counts(world: &World) -> SpeciesCounts {
        world.registry.counts()
    }

    /// Species parameters the registry was configured with.
    #[must_use]
    pub fn species_table(world: &World) -> &SpeciesTable {
        world.registry.species()
    }

    /// Actor holding `player`, together with the lock mechanic.
    #[must_use]
    pub fn victim_lock(world: &World, player: PlayerId) -> Option<(ActorId, LockKind)> {
        world.locks.holder_of(player)
    }

    /// Victim held by `actor`, if any.
    #[must_use]
    pub fn held_victim(world: &World, actor: ActorId) -> Option<PlayerId> {
        world.locks.victim_of(actor)
    }

    /// Tank frustration, or `None` for other species.
    #[must_use]
    pub fn frustration(world: &World, actor: ActorId) -> Option<f32> {
        world
            .registry
            .get(actor)
            .and_then(|actor| actor.data.frustration())
    }

    /// Reports whether `player` currently carries a bile mark.
    #[must_use]
    pub fn is_marked(world: &World, player: PlayerId) -> bool {
        world.hazards.is_marked(player, world.clock)
    }

    /// Number of acid pools that have not yet expired.
    #[must_use]
    pub fn acid_pool_count(world: &World) -> usize {
        world.hazards.pools().len()
    }

    /// Number of thrown rocks still in flight.
    #[must_use]
    pub fn rocks_in_flight(world: &World) -> usize {
        world.hazards.rocks_in_flight()
    }

    /// Deferred callbacks waiting to fire.
    #[must_use]
    pub fn pending_callbacks(world: &World) -> usize {
        world.scheduler.pending()
    }

    /// Deferred callbacks skipped because their actor had moved on.
    #[must_use]
    pub fn stale_callbacks(world: &World) -> u64 {
        world.scheduler.stale()
    }

    /// Blocking geometry used for line-of-sight checks.
    #[must_use]
    pub fn terrain(world: &World) -> &Terrain {
        &world.terrain
    }
}

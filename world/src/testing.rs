//! Single-actor harness used by the unit tests.

use std::time::Duration;

use glam::Vec3;
use horde_core::{ActorId, ActorState, Event, PlayerId, Species, SpeciesStats, DEFAULT_ACTOR_CADENCE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    actor::Actor,
    context::Ctx,
    hazards::Hazards,
    locks::VictimLocks,
    party::Party,
    scheduler::{Deferred, Scheduler},
    terrain::Terrain,
};

pub(crate) struct Harness {
    pub(crate) now: Duration,
    pub(crate) party: Party,
    pub(crate) terrain: Terrain,
    pub(crate) locks: VictimLocks,
    pub(crate) scheduler: Scheduler,
    pub(crate) hazards: Hazards,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) events: Vec<Event>,
    next_id: u64,
}

impl Harness {
    pub(crate) fn with_player(position: Vec3) -> Self {
        let mut harness = Self {
            now: Duration::ZERO,
            party: Party::new(),
            terrain: Terrain::default(),
            locks: VictimLocks::new(),
            scheduler: Scheduler::new(),
            hazards: Hazards::new(),
            rng: ChaCha8Rng::seed_from_u64(7),
            events: Vec::new(),
            next_id: 1,
        };
        harness.join(PlayerId::new(1), position);
        harness
    }

    pub(crate) fn join(&mut self, player: PlayerId, position: Vec3) {
        self.party.join(player, position, Vec3::NEG_X);
    }

    pub(crate) fn actor(&mut self, species: Species, position: Vec3) -> Actor {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        Actor::new(
            id,
            species,
            SpeciesStats::defaults_for(species),
            position,
            self.now,
            DEFAULT_ACTOR_CADENCE,
        )
    }

    pub(crate) fn ctx(&mut self) -> Ctx<'_> {
        Ctx {
            now: self.now,
            characters: &mut self.party,
            sight: &self.terrain,
            locks: &mut self.locks,
            scheduler: &mut self.scheduler,
            hazards: &mut self.hazards,
            rng: &mut self.rng,
            events: &mut self.events,
        }
    }

    /// Advances one actor cadence: deferred calls, the update, then hazards.
    pub(crate) fn step(&mut self, actor: &mut Actor) {
        self.now += DEFAULT_ACTOR_CADENCE;
        let due = self.scheduler.drain_due(self.now);
        let mut ctx = self.ctx();
        for call in due {
            if call.actor != actor.body.id || call.generation != actor.body.generation {
                continue;
            }
            match call.action {
                Deferred::ResolvePounce => actor.resolve_timeout(ActorState::Leap, &mut ctx),
                Deferred::ResolveCharge => actor.resolve_timeout(ActorState::Charge, &mut ctx),
                Deferred::Destroy => {}
            }
        }
        actor.update(&mut ctx).expect("actor update");
        ctx.tick_hazards(DEFAULT_ACTOR_CADENCE);
    }

    pub(crate) fn run(&mut self, actor: &mut Actor, duration: Duration) {
        self.run_until(actor, duration, |_| false);
    }

    pub(crate) fn run_until(
        &mut self,
        actor: &mut Actor,
        duration: Duration,
        mut done: impl FnMut(&Actor) -> bool,
    ) {
        let end = self.now + duration;
        while self.now < end {
            self.step(actor);
            if done(actor) {
                return;
            }
        }
    }
}

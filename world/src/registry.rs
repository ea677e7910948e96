//! Authoritative actor storage, identifier allocation and the update pass.

use std::{
    collections::BTreeMap,
    panic::{self, AssertUnwindSafe},
    time::Duration,
};

use glam::Vec3;
use horde_core::{ActorFault, ActorId, Event, Species, SpeciesCounts, SpeciesTable, SpawnError};
use tracing::{debug, warn};

use crate::{actor::Actor, context::Ctx};

/// Consecutive faults after which an actor is force-removed.
pub const MAX_CONSECUTIVE_FAULTS: u32 = 5;

/// Registry that owns every actor and allocates identifiers.
#[derive(Debug)]
pub(crate) struct ActorRegistry {
    entries: BTreeMap<ActorId, Actor>,
    next_actor_id: ActorId,
    species: SpeciesTable,
    cadence: Duration,
}

impl ActorRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new(species: SpeciesTable, cadence: Duration) -> Self {
        Self {
            entries: BTreeMap::new(),
            next_actor_id: ActorId::new(1),
            species,
            cadence,
        }
    }

    /// Builds an actor in `Idle` and inserts it, unless the species is at cap.
    pub(crate) fn spawn(
        &mut self,
        species: Species,
        position: Vec3,
        now: Duration,
    ) -> Result<ActorId, SpawnError> {
        if !position.is_finite() {
            return Err(SpawnError::NonFinitePosition);
        }
        let cap = self.species.cap(species);
        if self.count(species) >= cap {
            return Err(SpawnError::CapReached { species, cap });
        }

        let id = self.next_actor_id;
        self.next_actor_id = ActorId::new(id.get().saturating_add(1));
        let actor = Actor::new(
            id,
            species,
            *self.species.stats(species),
            position,
            now,
            self.cadence,
        );
        let _ = self.entries.insert(id, actor);
        debug!(actor = id.get(), species = species.name(), "actor spawned");
        Ok(id)
    }

    /// Detaches an actor, releasing any victim it holds. Idempotent.
    pub(crate) fn remove(&mut self, id: ActorId, ctx: &mut Ctx<'_>) -> Option<Actor> {
        let actor = self.entries.remove(&id)?;
        ctx.release_victim(id);
        ctx.hazards.forget(id);
        debug!(actor = id.get(), species = actor.body.species.name(), "actor removed");
        ctx.events.push(Event::ActorRemoved {
            actor: id,
            species: actor.body.species,
        });
        Some(actor)
    }

    /// Runs one update pass, honouring each actor's self-throttle.
    ///
    /// Every update runs inside a failure boundary: faults and panics are
    /// logged, the actor is rolled back to its last good position and
    /// skipped, and repeat offenders are evicted.
    pub(crate) fn tick_all(&mut self, ctx: &mut Ctx<'_>) {
        let mut evicted = Vec::new();

        for (id, actor) in self.entries.iter_mut() {
            if !actor.is_due(ctx.now) {
                continue;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| actor.update(ctx)))
                .unwrap_or_else(|payload| Err(panic_fault(payload.as_ref())));

            match outcome {
                Ok(()) => actor.body.record_success(),
                Err(fault) => {
                    let faults = actor.body.record_fault();
                    warn!(
                        actor = id.get(),
                        species = actor.body.species.name(),
                        faults,
                        %fault,
                        "actor update faulted"
                    );
                    if faults >= MAX_CONSECUTIVE_FAULTS {
                        evicted.push((*id, faults));
                    }
                }
            }
        }

        for (id, faults) in evicted {
            if let Some(actor) = self.remove(id, ctx) {
                warn!(
                    actor = id.get(),
                    species = actor.body.species.name(),
                    faults,
                    "actor evicted"
                );
                ctx.events.push(Event::ActorEvicted {
                    actor: id,
                    species: actor.body.species,
                    faults,
                });
            }
        }
    }

    pub(crate) fn get(&self, id: ActorId) -> Option<&Actor> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.entries.values()
    }

    pub(crate) fn ids(&self) -> Vec<ActorId> {
        self.entries.keys().copied().collect()
    }

    /// Number of actors of `species` held by the registry, corpses included.
    pub(crate) fn count(&self, species: Species) -> u32 {
        let count = self
            .entries
            .values()
            .filter(|actor| actor.body.species == species)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub(crate) fn counts(&self) -> SpeciesCounts {
        let mut counts = SpeciesCounts::default();
        for actor in self.entries.values() {
            counts.increment(actor.body.species);
        }
        counts
    }

    pub(crate) fn species(&self) -> &SpeciesTable {
        &self.species
    }
}

fn panic_fault(payload: &(dyn std::any::Any + Send)) -> ActorFault {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned());
    ActorFault::Panicked { message }
}

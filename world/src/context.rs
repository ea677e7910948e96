//! Borrowed world services handed to actor updates.

use std::time::Duration;

use glam::Vec3;
use horde_core::{ActorId, CharacterSnapshot, Characters, Event, LineOfSight, LockKind, PlayerId};
use rand_chacha::ChaCha8Rng;

use crate::{
    hazards::Hazards,
    locks::VictimLocks,
    scheduler::{Deferred, Scheduler},
};

/// Everything an actor may touch while updating, except other actors.
pub(crate) struct Ctx<'a> {
    pub(crate) now: Duration,
    pub(crate) characters: &'a mut dyn Characters,
    pub(crate) sight: &'a dyn LineOfSight,
    pub(crate) locks: &'a mut VictimLocks,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) hazards: &'a mut Hazards,
    pub(crate) rng: &'a mut ChaCha8Rng,
    pub(crate) events: &'a mut Vec<Event>,
}

impl Ctx<'_> {
    pub(crate) fn character(&self, player: PlayerId) -> Option<CharacterSnapshot> {
        self.characters.character(player)
    }

    pub(crate) fn has_line_of_sight(&self, origin: Vec3, target: Vec3) -> bool {
        self.sight.has_line_of_sight(origin, target)
    }

    pub(crate) fn damage_player(
        &mut self,
        attacker: ActorId,
        player: PlayerId,
        amount: f32,
        source: Vec3,
    ) {
        damage_player(
            &mut *self.characters,
            self.events,
            Some(attacker),
            player,
            amount,
            source,
        );
    }

    pub(crate) fn lock_victim(&mut self, actor: ActorId, player: PlayerId, kind: LockKind) -> bool {
        self.locks
            .acquire(actor, player, kind, &mut *self.characters, self.events)
    }

    pub(crate) fn release_victim(&mut self, actor: ActorId) {
        self.locks
            .release_actor(actor, &mut *self.characters, self.events);
    }

    pub(crate) fn victim_of(&self, actor: ActorId) -> Option<PlayerId> {
        self.locks.victim_of(actor)
    }

    pub(crate) fn schedule(
        &mut self,
        delay: Duration,
        actor: ActorId,
        generation: u64,
        action: Deferred,
    ) {
        self.scheduler
            .schedule(self.now.saturating_add(delay), actor, generation, action);
    }

    pub(crate) fn mark_area(&mut self, center: Vec3, radius: f32, duration: Duration) {
        self.hazards.mark_area(
            center,
            radius,
            self.now.saturating_add(duration),
            &*self.characters,
            self.events,
        );
    }

    pub(crate) fn is_marked(&self, player: PlayerId) -> bool {
        self.hazards.is_marked(player, self.now)
    }

    pub(crate) fn tick_hazards(&mut self, dt: Duration) {
        self.hazards
            .tick(self.now, dt, &mut *self.characters, self.events);
    }
}

/// Applies damage through the health model and reports what changed.
pub(crate) fn damage_player(
    characters: &mut dyn Characters,
    events: &mut Vec<Event>,
    attacker: Option<ActorId>,
    player: PlayerId,
    amount: f32,
    source: Vec3,
) {
    if !amount.is_finite() || amount <= 0.0 {
        return;
    }
    let Some(before) = characters.character(player) else {
        return;
    };
    if !before.is_targetable() {
        return;
    }

    characters.damage_player(player, amount, source);
    events.push(Event::PlayerDamaged {
        player,
        amount,
        attacker,
    });

    let went_down = characters
        .character(player)
        .is_some_and(|after| !before.incapacitated && (after.incapacitated || !after.alive));
    if went_down {
        events.push(Event::PlayerIncapacitated { player, attacker });
    }
}

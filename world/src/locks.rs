//! Victim-lock bookkeeping shared by grappling species.

use std::collections::BTreeMap;

use horde_core::{ActorId, Characters, Event, LockKind, PlayerId};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LockEntry {
    actor: ActorId,
    kind: LockKind,
}

/// Mutually exclusive association between grappling actors and their victims.
///
/// A player can be held by at most one actor and an actor holds at most one
/// player. Releasing is symmetric and idempotent.
#[derive(Debug, Default)]
pub(crate) struct VictimLocks {
    entries: BTreeMap<PlayerId, LockEntry>,
}

impl VictimLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Locks `player` to `actor`, freezing the player's movement.
    ///
    /// Fails when either side is already part of a lock.
    pub(crate) fn acquire(
        &mut self,
        actor: ActorId,
        player: PlayerId,
        kind: LockKind,
        characters: &mut dyn Characters,
        events: &mut Vec<Event>,
    ) -> bool {
        if self.entries.contains_key(&player) || self.victim_of(actor).is_some() {
            return false;
        }

        let _ = self.entries.insert(player, LockEntry { actor, kind });
        characters.set_movement_locked(player, true);
        debug!(actor = actor.get(), player = player.get(), ?kind, "victim locked");
        events.push(Event::VictimLocked {
            actor,
            player,
            kind,
        });
        true
    }

    /// Releases whatever victim `actor` holds. No-op when it holds none.
    pub(crate) fn release_actor(
        &mut self,
        actor: ActorId,
        characters: &mut dyn Characters,
        events: &mut Vec<Event>,
    ) {
        if let Some(player) = self.victim_of(actor) {
            self.release_player(player, characters, events);
        }
    }

    /// Releases `player` from whichever actor holds it. No-op when unheld.
    pub(crate) fn release_player(
        &mut self,
        player: PlayerId,
        characters: &mut dyn Characters,
        events: &mut Vec<Event>,
    ) {
        let Some(entry) = self.entries.remove(&player) else {
            return;
        };

        characters.set_movement_locked(player, false);
        debug!(actor = entry.actor.get(), player = player.get(), "victim released");
        events.push(Event::VictimReleased {
            actor: entry.actor,
            player,
            kind: entry.kind,
        });
    }

    pub(crate) fn victim_of(&self, actor: ActorId) -> Option<PlayerId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.actor == actor)
            .map(|(player, _)| *player)
    }

    pub(crate) fn holder_of(&self, player: PlayerId) -> Option<(ActorId, LockKind)> {
        self.entries
            .get(&player)
            .map(|entry| (entry.actor, entry.kind))
    }
}

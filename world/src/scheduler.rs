//! Time-ordered deferred callbacks keyed to actor generations.

use std::{collections::BTreeMap, time::Duration};

use horde_core::ActorId;

/// Work that an actor schedules for later execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Deferred {
    /// Hunter leap timed out without contact.
    ResolvePounce,
    /// Charger charge timed out without contact.
    ResolveCharge,
    /// Corpse destruction after the death delay.
    Destroy,
}

/// Deferred call captured together with the generation it was scheduled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Scheduled {
    pub(crate) actor: ActorId,
    pub(crate) generation: u64,
    pub(crate) action: Deferred,
}

#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    queue: BTreeMap<(Duration, u64), Scheduled>,
    next_sequence: u64,
    stale: u64,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(
        &mut self,
        due: Duration,
        actor: ActorId,
        generation: u64,
        action: Deferred,
    ) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        let _ = self.queue.insert(
            (due, sequence),
            Scheduled {
                actor,
                generation,
                action,
            },
        );
    }

    /// Removes and returns every call due at or before `now`, oldest first.
    pub(crate) fn drain_due(&mut self, now: Duration) -> Vec<Scheduled> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    pub(crate) fn record_stale(&mut self) {
        self.stale = self.stale.saturating_add(1);
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn stale(&self) -> u64 {
        self.stale
    }
}

//! Lingering effects that outlive the actor that created them.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;
use horde_core::{ActorId, Characters, Event, PlayerId};

use crate::context::damage_player;

/// Persistent acid zone dealing flat damage per second once active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct AcidPool {
    pub(crate) owner: ActorId,
    pub(crate) center: Vec3,
    pub(crate) radius: f32,
    pub(crate) damage_per_second: f32,
    pub(crate) active_from: Duration,
    pub(crate) expires_at: Duration,
}

/// Projectile in flight that lands on a fixed point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rock {
    pub(crate) owner: ActorId,
    pub(crate) impact: Vec3,
    pub(crate) radius: f32,
    pub(crate) damage: f32,
    pub(crate) impact_at: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct Hazards {
    marks: BTreeMap<PlayerId, Duration>,
    pools: Vec<AcidPool>,
    rocks: Vec<Rock>,
    rock_hits: BTreeMap<ActorId, u32>,
}

impl Hazards {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks every targetable character within `radius` of `center`.
    pub(crate) fn mark_area(
        &mut self,
        center: Vec3,
        radius: f32,
        until: Duration,
        characters: &dyn Characters,
        events: &mut Vec<Event>,
    ) {
        for character in characters.characters() {
            if !character.is_targetable() || character.position.distance(center) > radius {
                continue;
            }
            let expiry = self.marks.entry(character.id).or_insert(until);
            *expiry = (*expiry).max(until);
            events.push(Event::PlayerMarked {
                player: character.id,
                until: *expiry,
            });
        }
    }

    pub(crate) fn is_marked(&self, player: PlayerId, now: Duration) -> bool {
        self.marks.get(&player).is_some_and(|until| *until > now)
    }

    pub(crate) fn add_pool(&mut self, pool: AcidPool) {
        self.pools.push(pool);
    }

    pub(crate) fn throw_rock(&mut self, rock: Rock) {
        self.rocks.push(rock);
    }

    /// Drains the number of rocks thrown by `owner` that landed on someone.
    pub(crate) fn take_rock_hits(&mut self, owner: ActorId) -> u32 {
        self.rock_hits.remove(&owner).unwrap_or(0)
    }

    /// Drops bookkeeping for an actor that left the world.
    pub(crate) fn forget(&mut self, owner: ActorId) {
        let _ = self.rock_hits.remove(&owner);
    }

    pub(crate) fn pools(&self) -> &[AcidPool] {
        &self.pools
    }

    pub(crate) fn rocks_in_flight(&self) -> usize {
        self.rocks.len()
    }

    /// Advances every hazard by `dt`, ending at `now`.
    pub(crate) fn tick(
        &mut self,
        now: Duration,
        dt: Duration,
        characters: &mut dyn Characters,
        events: &mut Vec<Event>,
    ) {
        self.marks.retain(|_, until| *until > now);

        let seconds = dt.as_secs_f32();
        for pool in &self.pools {
            if now <= pool.active_from {
                continue;
            }
            let exposure = now
                .min(pool.expires_at)
                .saturating_sub(pool.active_from.max(now.saturating_sub(dt)))
                .as_secs_f32()
                .min(seconds);
            if exposure <= 0.0 {
                continue;
            }
            for character in characters.characters() {
                if character.is_targetable() && character.position.distance(pool.center) <= pool.radius
                {
                    damage_player(
                        characters,
                        events,
                        Some(pool.owner),
                        character.id,
                        pool.damage_per_second * exposure,
                        pool.center,
                    );
                }
            }
        }
        self.pools.retain(|pool| pool.expires_at > now);

        let (landed, flying): (Vec<Rock>, Vec<Rock>) =
            self.rocks.drain(..).partition(|rock| rock.impact_at <= now);
        self.rocks = flying;
        for rock in landed {
            let mut hit = false;
            for character in characters.characters() {
                if character.is_targetable() && character.position.distance(rock.impact) <= rock.radius
                {
                    hit = true;
                    damage_player(
                        characters,
                        events,
                        Some(rock.owner),
                        character.id,
                        rock.damage,
                        rock.impact,
                    );
                }
            }
            if hit {
                *self.rock_hits.entry(rock.owner).or_insert(0) += 1;
            }
        }
    }
}

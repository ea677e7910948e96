//! In-memory character roster implementing the character collaborator traits.
//!
//! Hosts that own real characters implement [`PlayerHealthModel`] and
//! [`CharacterMotor`] themselves. The party exists for headless runs and
//! tests: it keeps a health pool per character, drops characters into an
//! incapacitated state with a bleed-out buffer, and resolves rescues by
//! distance.

use std::collections::BTreeMap;

use glam::Vec3;
use horde_core::{CharacterMotor, CharacterSnapshot, PlayerHealthModel, PlayerId, RescueOutcome};

/// Health assigned to a character when it joins or is healed.
pub const MAX_HEALTH: f32 = 100.0;
/// Damage an incapacitated character absorbs before dying.
pub const INCAPACITATED_HEALTH: f32 = 300.0;
/// Health restored when an incapacitated character is revived.
pub const REVIVE_HEALTH: f32 = 30.0;
/// Maximum distance between rescuer and victim.
pub const RESCUE_RANGE: f32 = 3.0;

#[derive(Clone, Debug)]
struct Member {
    position: Vec3,
    facing: Vec3,
    health: f32,
    incapacitated_health: f32,
    incapacitated: bool,
    alive: bool,
    movement_locked: bool,
}

impl Member {
    fn snapshot(&self, id: PlayerId) -> CharacterSnapshot {
        CharacterSnapshot {
            id,
            position: self.position,
            facing: self.facing,
            alive: self.alive,
            incapacitated: self.incapacitated,
        }
    }
}

/// Reference character roster.
#[derive(Clone, Debug, Default)]
pub struct Party {
    members: BTreeMap<PlayerId, Member>,
}

impl Party {
    /// Creates an empty party.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a healthy character, replacing any previous entry with the same id.
    pub fn join(&mut self, id: PlayerId, position: Vec3, facing: Vec3) {
        let _ = self.members.insert(
            id,
            Member {
                position,
                facing: facing.try_normalize().unwrap_or(Vec3::Z),
                health: MAX_HEALTH,
                incapacitated_health: INCAPACITATED_HEALTH,
                incapacitated: false,
                alive: true,
                movement_locked: false,
            },
        );
    }

    /// Removes a character from the party.
    pub fn leave(&mut self, id: PlayerId) {
        let _ = self.members.remove(&id);
    }

    /// Moves a character unless its movement is locked. Returns whether it moved.
    pub fn walk_to(&mut self, id: PlayerId, position: Vec3) -> bool {
        match self.members.get_mut(&id) {
            Some(member) if member.alive && !member.incapacitated && !member.movement_locked => {
                member.position = position;
                true
            }
            _ => false,
        }
    }

    /// Teleports a character regardless of locks.
    pub fn set_position(&mut self, id: PlayerId, position: Vec3) {
        if let Some(member) = self.members.get_mut(&id) {
            member.position = position;
        }
    }

    /// Points a character in a new direction.
    pub fn set_facing(&mut self, id: PlayerId, facing: Vec3) {
        if let Some(member) = self.members.get_mut(&id) {
            member.facing = facing.try_normalize().unwrap_or(member.facing);
        }
    }

    /// Remaining health of a character; `None` when unknown.
    #[must_use]
    pub fn health(&self, id: PlayerId) -> Option<f32> {
        self.members.get(&id).map(|member| {
            if member.incapacitated {
                member.incapacitated_health
            } else {
                member.health
            }
        })
    }

    /// Reports whether a character's movement is currently locked by an actor.
    #[must_use]
    pub fn is_movement_locked(&self, id: PlayerId) -> bool {
        self.members
            .get(&id)
            .is_some_and(|member| member.movement_locked)
    }
}

impl PlayerHealthModel for Party {
    fn characters(&self) -> Vec<CharacterSnapshot> {
        self.members
            .iter()
            .map(|(id, member)| member.snapshot(*id))
            .collect()
    }

    fn character(&self, id: PlayerId) -> Option<CharacterSnapshot> {
        self.members.get(&id).map(|member| member.snapshot(id))
    }

    fn damage_player(&mut self, target: PlayerId, amount: f32, _source_position: Vec3) {
        let Some(member) = self.members.get_mut(&target) else {
            return;
        };
        if !member.alive || !amount.is_finite() || amount <= 0.0 {
            return;
        }

        if member.incapacitated {
            member.incapacitated_health = (member.incapacitated_health - amount).max(0.0);
            if member.incapacitated_health <= 0.0 {
                member.alive = false;
                member.movement_locked = false;
            }
        } else {
            member.health = (member.health - amount).max(0.0);
            if member.health <= 0.0 {
                member.incapacitated = true;
                member.incapacitated_health = INCAPACITATED_HEALTH;
            }
        }
    }

    fn attempt_rescue(&mut self, rescuer: PlayerId, target: PlayerId) -> RescueOutcome {
        if rescuer == target {
            return RescueOutcome::failed("cannot rescue self");
        }
        let Some(helper) = self.members.get(&rescuer).cloned() else {
            return RescueOutcome::failed("unknown rescuer");
        };
        if !helper.alive || helper.incapacitated || helper.movement_locked {
            return RescueOutcome::failed("rescuer is unable to help");
        }
        let Some(victim) = self.members.get_mut(&target) else {
            return RescueOutcome::failed("unknown victim");
        };
        if !victim.alive {
            return RescueOutcome::failed("victim is dead");
        }
        if helper.position.distance(victim.position) > RESCUE_RANGE {
            return RescueOutcome::failed("out of reach");
        }

        if victim.movement_locked {
            victim.movement_locked = false;
            RescueOutcome::succeeded("freed from hold")
        } else if victim.incapacitated {
            victim.incapacitated = false;
            victim.health = REVIVE_HEALTH;
            RescueOutcome::succeeded("revived")
        } else {
            RescueOutcome::failed("nothing to rescue")
        }
    }

    fn heal_player(&mut self, target: PlayerId) {
        if let Some(member) = self.members.get_mut(&target) {
            member.health = MAX_HEALTH;
            member.incapacitated_health = INCAPACITATED_HEALTH;
            member.incapacitated = false;
            member.alive = true;
        }
    }
}

impl CharacterMotor for Party {
    fn set_movement_locked(&mut self, player: PlayerId, locked: bool) {
        if let Some(member) = self.members.get_mut(&player) {
            member.movement_locked = locked;
        }
    }

    fn apply_impulse(&mut self, player: PlayerId, impulse: Vec3) {
        if let Some(member) = self.members.get_mut(&player) {
            if impulse.is_finite() {
                member.position += impulse;
            }
        }
    }

    fn pull_toward(&mut self, player: PlayerId, position: Vec3, max_step: f32) {
        let Some(member) = self.members.get_mut(&player) else {
            return;
        };
        let offset = position - member.position;
        let distance = offset.length();
        if distance <= f32::EPSILON || max_step <= 0.0 {
            return;
        }
        member.position += offset / distance * max_step.min(distance);
    }
}

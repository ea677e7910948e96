//! Tether grappler: aim, shoot the tongue, drag the victim in.

use std::time::Duration;

use glam::Vec3;
use horde_core::{ActorState, LockKind};

use crate::{actor::ActorBody, context::Ctx};

const AIM: Duration = Duration::from_secs(1);
const TONGUE_SPEED: f32 = 40.0;
const TONGUE_REACH: f32 = 1.0;
const DRAG_SPEED: f32 = 3.0;
const CHOKE_DISTANCE: f32 = 1.5;
const DRAG_TICK: f32 = 1.0;
/// Cooldown after the tongue misses or snaps.
const RETRY_COOLDOWN: f32 = 3.0;

#[derive(Clone, Debug)]
pub(crate) struct SmokerData {
    tongue_tip: Vec3,
}

impl SmokerData {
    pub(crate) fn new(position: Vec3) -> Self {
        Self {
            tongue_tip: position,
        }
    }
}

pub(super) fn update(body: &mut ActorBody, data: &mut SmokerData, dt: f32, ctx: &mut Ctx<'_>) {
    match body.state {
        ActorState::Stalk => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            let distance = body.position.distance(target.position);
            let visible = ctx.has_line_of_sight(body.position, target.position);
            if distance > body.stats.attack_range || !visible {
                body.move_toward(target.position, body.stats.move_speed, dt);
            } else if body.cooldown_ready() && target.is_grabbable() {
                body.transition(ActorState::Aim, ctx);
            } else {
                body.face(target.position);
            }
        }
        ActorState::Aim => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            body.face(target.position);
            if !ctx.has_line_of_sight(body.position, target.position) {
                body.transition(ActorState::Stalk, ctx);
            } else if body.in_state_for() >= AIM {
                data.tongue_tip = body.position;
                body.transition(ActorState::Grab, ctx);
            }
        }
        ActorState::Grab => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            let travel_limit = body.stats.attack_range / TONGUE_SPEED + 0.5;
            if !ctx.has_line_of_sight(body.position, target.position)
                || body.in_state_for().as_secs_f32() > travel_limit
            {
                snap(body, ctx);
                return;
            }

            let offset = target.position - data.tongue_tip;
            let distance = offset.length();
            let step = TONGUE_SPEED * dt;
            if distance > step + TONGUE_REACH {
                data.tongue_tip += offset / distance * step;
                return;
            }

            data.tongue_tip = target.position;
            if target.is_grabbable() && ctx.lock_victim(body.id, target.id, LockKind::Drag) {
                body.transition(ActorState::Drag, ctx);
                body.attack_ready_at = body.now;
            } else {
                snap(body, ctx);
            }
        }
        ActorState::Drag => {
            let Some(victim) = ctx.victim_of(body.id).and_then(|victim| ctx.character(victim))
            else {
                body.transition(ActorState::Idle, ctx);
                return;
            };
            if !ctx.has_line_of_sight(body.position, victim.position) {
                snap(body, ctx);
                return;
            }
            body.face(victim.position);
            if victim.position.distance(body.position) > CHOKE_DISTANCE {
                ctx.characters
                    .pull_toward(victim.id, body.position, DRAG_SPEED * dt);
            }
            if body.cooldown_ready() {
                ctx.damage_player(body.id, victim.id, body.stats.attack_damage, body.position);
                body.start_cooldown(DRAG_TICK);
            }
        }
        _ => {}
    }
}

/// Breaks the tether and falls back to stalking after a short cooldown.
fn snap(body: &mut ActorBody, ctx: &mut Ctx<'_>) {
    body.transition(ActorState::Stalk, ctx);
    body.start_cooldown(RETRY_COOLDOWN);
}

#[cfg(test)]
mod tests {
    use horde_core::{PlayerHealthModel, PlayerId, Species};

    use crate::{terrain::Occluder, testing::Harness};

    use super::*;

    #[test]
    fn tongue_drags_victim_toward_smoker() {
        let mut harness = Harness::with_player(Vec3::new(20.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Smoker, Vec3::ZERO);

        harness.run_until(&mut actor, Duration::from_secs(5), |actor| {
            actor.body.state == ActorState::Drag
        });
        assert_eq!(actor.body.state, ActorState::Drag);
        assert_eq!(harness.locks.victim_of(actor.body.id), Some(PlayerId::new(1)));

        harness.run(&mut actor, Duration::from_secs(2));
        let position = harness
            .party
            .character(PlayerId::new(1))
            .expect("member")
            .position;
        assert!(position.x < 20.0);
    }

    #[test]
    fn broken_sight_line_snaps_the_tongue() {
        let mut harness = Harness::with_player(Vec3::new(20.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Smoker, Vec3::ZERO);
        harness.run_until(&mut actor, Duration::from_secs(5), |actor| {
            actor.body.state == ActorState::Drag
        });

        harness.terrain = crate::terrain::Terrain::new(vec![Occluder::new(
            Vec3::new(10.0, 0.0, 0.0),
            2.0,
        )]);
        harness.run_until(&mut actor, Duration::from_secs(1), |actor| {
            actor.body.state == ActorState::Stalk
        });

        assert_eq!(actor.body.state, ActorState::Stalk);
        assert!(harness.locks.victim_of(actor.body.id).is_none());
        assert!(!harness.party.is_movement_locked(PlayerId::new(1)));
    }
}

//! Charging bruiser: wind up, charge in a line, carry and slam the first hit.

use std::time::Duration;

use glam::Vec3;
use horde_core::{ActorState, LockKind, PlayerId};

use crate::{actor::ActorBody, context::Ctx, scheduler::Deferred};

const WINDUP: Duration = Duration::from_millis(500);
const CHARGE_SPEED: f32 = 16.0;
const CHARGE_TIMEOUT: Duration = Duration::from_millis(2_500);
const CONTACT_RADIUS: f32 = 1.5;
const IMPACT_DAMAGE: f32 = 10.0;
const IMPACT_KNOCKBACK: f32 = 6.0;
const CARRY: Duration = Duration::from_secs(1);
const SLAM_PERIOD: f32 = 1.0;

#[derive(Clone, Debug, Default)]
pub(crate) struct ChargerData {
    direction: Vec3,
}

pub(super) fn update(body: &mut ActorBody, data: &mut ChargerData, dt: f32, ctx: &mut Ctx<'_>) {
    match body.state {
        ActorState::Chase => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            let distance = body.position.distance(target.position);
            if distance <= body.stats.attack_range
                && body.cooldown_ready()
                && ctx.has_line_of_sight(body.position, target.position)
            {
                body.face(target.position);
                body.transition(ActorState::Windup, ctx);
            } else if distance > CONTACT_RADIUS {
                body.move_toward(target.position, body.stats.move_speed, dt);
            }
        }
        ActorState::Windup => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            body.face(target.position);
            if body.in_state_for() >= WINDUP {
                data.direction = body.facing;
                body.start_cooldown(body.stats.attack_cooldown);
                body.transition(ActorState::Charge, ctx);
                ctx.schedule(CHARGE_TIMEOUT, body.id, body.generation, Deferred::ResolveCharge);
            }
        }
        ActorState::Charge => {
            body.position += data.direction * CHARGE_SPEED * dt;
            let touched = ctx.characters.characters().into_iter().find(|character| {
                character.is_targetable()
                    && character.position.distance(body.position) <= CONTACT_RADIUS
            });
            if let Some(character) = touched {
                on_contact(body, character.id, ctx);
            }
        }
        ActorState::Grab => {
            let Some(victim) = ctx.victim_of(body.id) else {
                body.transition(ActorState::Idle, ctx);
                return;
            };
            body.position += data.direction * CHARGE_SPEED * 0.5 * dt;
            ctx.characters
                .pull_toward(victim, body.position, CHARGE_SPEED * dt);
            if body.in_state_for() >= CARRY {
                body.transition(ActorState::Slam, ctx);
                body.attack_ready_at = body.now;
            }
        }
        ActorState::Slam => {
            let Some(victim) = ctx.victim_of(body.id) else {
                body.transition(ActorState::Idle, ctx);
                return;
            };
            if body.cooldown_ready() {
                ctx.damage_player(body.id, victim, body.stats.attack_damage, body.position);
                body.start_cooldown(SLAM_PERIOD);
            }
        }
        _ => {}
    }
}

/// Resolves the first character hit during a charge.
///
/// Grabbable characters are carried; anyone else is only knocked aside.
pub(super) fn on_contact(body: &mut ActorBody, player: PlayerId, ctx: &mut Ctx<'_>) {
    if body.state != ActorState::Charge {
        return;
    }
    let Some(character) = ctx.character(player).filter(|c| c.is_targetable()) else {
        return;
    };
    if !body.accept_hit() {
        return;
    }

    ctx.damage_player(body.id, player, IMPACT_DAMAGE, body.position);
    let grabbed = ctx
        .character(player)
        .is_some_and(|after| after.is_grabbable())
        && ctx.lock_victim(body.id, player, LockKind::Carry);
    if grabbed {
        body.target = Some(player);
        body.transition(ActorState::Grab, ctx);
    } else {
        let mut push = character.position - body.position;
        push.y = 0.0;
        let side = push.try_normalize().unwrap_or(perpendicular(body.facing));
        ctx.characters.apply_impulse(player, side * IMPACT_KNOCKBACK);
    }
}

fn perpendicular(facing: Vec3) -> Vec3 {
    Vec3::new(-facing.z, 0.0, facing.x)
}

#[cfg(test)]
mod tests {
    use horde_core::{Event, PlayerHealthModel, Species};

    use crate::testing::Harness;

    use super::*;

    #[test]
    fn charge_grabs_then_slams() {
        let mut harness = Harness::with_player(Vec3::new(10.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Charger, Vec3::ZERO);

        harness.run_until(&mut actor, Duration::from_secs(4), |actor| {
            actor.body.state == ActorState::Slam
        });
        assert_eq!(actor.body.state, ActorState::Slam);
        assert_eq!(
            harness.locks.holder_of(PlayerId::new(1)),
            Some((actor.body.id, LockKind::Carry))
        );

        harness.run(&mut actor, Duration::from_millis(1_500));
        let slams = harness
            .events
            .iter()
            .filter(|event| matches!(event, Event::PlayerDamaged { amount, .. } if *amount == 15.0))
            .count();
        assert!(slams >= 2);
    }

    #[test]
    fn only_the_first_contact_of_a_charge_counts() {
        let mut harness = Harness::with_player(Vec3::new(10.0, 0.0, 0.0));
        harness.join(PlayerId::new(2), Vec3::new(10.0, 0.0, 0.5));
        harness
            .party
            .damage_player(PlayerId::new(1), 150.0, Vec3::ZERO);
        let mut actor = harness.actor(Species::Charger, Vec3::ZERO);

        harness.run_until(&mut actor, Duration::from_secs(4), |actor| {
            actor.body.state == ActorState::Stagger
        });

        let impacts = harness
            .events
            .iter()
            .filter(|event| {
                matches!(event, Event::PlayerDamaged { amount, .. } if *amount == IMPACT_DAMAGE)
            })
            .count();
        assert_eq!(impacts, 1);
        assert_eq!(actor.body.state, ActorState::Stagger);
        assert_eq!(harness.locks.holder_of(PlayerId::new(2)), None);
    }
}

//! Pouncer: stalk a range band, leap, pin the first character touched.

use std::time::Duration;

use glam::Vec3;
use horde_core::{ActorState, LockKind, PlayerId};

use crate::{actor::ActorBody, context::Ctx, scheduler::Deferred};

const MIN_BAND: f32 = 4.0;
const WINDUP: Duration = Duration::from_millis(600);
const LEAP_SPEED: f32 = 18.0;
const LEAP_LIFT: f32 = 6.0;
const GRAVITY: f32 = 20.0;
const LEAP_TIMEOUT: Duration = Duration::from_millis(1_500);
const CONTACT_RADIUS: f32 = 1.2;
const PIN_TICK: f32 = 0.5;

#[derive(Clone, Debug)]
pub(crate) struct HunterData {
    velocity: Vec3,
    floor: f32,
}

impl HunterData {
    pub(crate) fn new(position: Vec3) -> Self {
        Self {
            velocity: Vec3::ZERO,
            floor: position.y,
        }
    }
}

pub(super) fn update(body: &mut ActorBody, data: &mut HunterData, dt: f32, ctx: &mut Ctx<'_>) {
    match body.state {
        ActorState::Stalk => stalk(body, dt, ctx),
        ActorState::Windup => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            body.face(target.position);
            if body.in_state_for() < WINDUP {
                return;
            }
            let mut planar = target.position - body.position;
            planar.y = 0.0;
            let direction = planar.try_normalize().unwrap_or(body.facing);
            data.velocity = direction * LEAP_SPEED + Vec3::Y * LEAP_LIFT;
            data.floor = body.position.y;
            body.start_cooldown(body.stats.attack_cooldown);
            body.transition(ActorState::Leap, ctx);
            ctx.schedule(LEAP_TIMEOUT, body.id, body.generation, Deferred::ResolvePounce);
        }
        ActorState::Leap => {
            body.position += data.velocity * dt;
            data.velocity.y -= GRAVITY * dt;
            if body.position.y < data.floor {
                body.position.y = data.floor;
                data.velocity.y = 0.0;
            }
            let touched = ctx.characters.characters().into_iter().find(|character| {
                character.is_grabbable()
                    && ctx.locks.holder_of(character.id).is_none()
                    && character.position.distance(body.position) <= CONTACT_RADIUS
            });
            if let Some(character) = touched {
                on_contact(body, character.id, ctx);
            }
        }
        ActorState::Pin => {
            let Some(victim) = ctx.victim_of(body.id) else {
                body.transition(ActorState::Idle, ctx);
                return;
            };
            if body.cooldown_ready() {
                ctx.damage_player(body.id, victim, body.stats.attack_damage, body.position);
                body.start_cooldown(PIN_TICK);
            }
        }
        _ => {}
    }
}

fn stalk(body: &mut ActorBody, dt: f32, ctx: &mut Ctx<'_>) {
    let Some(target) = body.resolve_target(ctx) else {
        return;
    };
    let distance = body.position.distance(target.position);
    if distance > body.stats.attack_range {
        body.move_toward(target.position, body.stats.move_speed, dt);
    } else if distance < MIN_BAND {
        body.move_away(target.position, body.stats.move_speed, dt);
    } else if body.cooldown_ready()
        && target.is_grabbable()
        && ctx.has_line_of_sight(body.position, target.position)
    {
        body.transition(ActorState::Windup, ctx);
    } else {
        body.face(target.position);
    }
}

/// Pins the first grabbable character touched during a leap.
pub(super) fn on_contact(body: &mut ActorBody, player: PlayerId, ctx: &mut Ctx<'_>) {
    if body.state != ActorState::Leap {
        return;
    }
    let grabbable = ctx
        .character(player)
        .is_some_and(|character| character.is_grabbable());
    if !grabbable || ctx.locks.holder_of(player).is_some() || !body.accept_hit() {
        return;
    }
    if ctx.lock_victim(body.id, player, LockKind::Pin) {
        body.target = Some(player);
        body.transition(ActorState::Pin, ctx);
        body.attack_ready_at = body.now;
    }
}

//! Boss bruiser: melee with knockback, rock throws, frustration-driven rage.

use std::time::Duration;

use glam::Vec3;
use horde_core::{ActorState, PlayerId};

use crate::{actor::ActorBody, context::Ctx, hazards::Rock};

const PUNCH_WINDUP: Duration = Duration::from_millis(400);
const KNOCKBACK: f32 = 10.0;
const THROW_MIN: f32 = 8.0;
const THROW_MAX: f32 = 40.0;
const THROW_WINDUP: Duration = Duration::from_millis(1_200);
const THROW_COOLDOWN: Duration = Duration::from_secs(6);
const ROCK_SPEED: f32 = 25.0;
const ROCK_RADIUS: f32 = 2.0;
const FRUSTRATION_RATE: f32 = 10.0;
const FRUSTRATION_LIMIT: f32 = 100.0;
const HIT_RELIEF: f32 = 25.0;
const RAGE_DURATION: Duration = Duration::from_secs(10);
const RAGE_MULTIPLIER: f32 = 1.5;
const MELEE_SLACK: f32 = 1.2;

#[derive(Clone, Debug, Default)]
pub(crate) struct TankData {
    pub(crate) frustration: f32,
    throw_ready_at: Duration,
}

impl TankData {
    fn relieve(&mut self, hits: u32) {
        self.frustration = (self.frustration - HIT_RELIEF * hits as f32).max(0.0);
    }
}

pub(super) fn update(body: &mut ActorBody, data: &mut TankData, dt: f32, ctx: &mut Ctx<'_>) {
    let landed = ctx.hazards.take_rock_hits(body.id);
    if landed > 0 {
        data.relieve(landed);
    }

    let Some(target) = body.resolve_target(ctx) else {
        return;
    };
    let distance = body.position.distance(target.position);
    let raging = body.state == ActorState::Rage;
    let multiplier = if raging { RAGE_MULTIPLIER } else { 1.0 };

    // Frustration only builds while pursuing a target out of reach.
    if body.state == ActorState::Chase && distance > body.stats.attack_range * MELEE_SLACK {
        data.frustration = (data.frustration + FRUSTRATION_RATE * dt).min(FRUSTRATION_LIMIT);
        if data.frustration >= FRUSTRATION_LIMIT {
            data.frustration = 0.0;
            body.transition(ActorState::Rage, ctx);
            return;
        }
    }

    match body.state {
        ActorState::Chase => {
            if distance <= body.stats.attack_range {
                body.transition(ActorState::Attack, ctx);
            } else if (THROW_MIN..=THROW_MAX).contains(&distance)
                && body.now >= data.throw_ready_at
                && ctx.has_line_of_sight(body.position, target.position)
            {
                body.face(target.position);
                body.transition(ActorState::RangedThrow, ctx);
            } else {
                body.move_toward(target.position, body.stats.move_speed, dt);
            }
        }
        ActorState::Attack => {
            body.face(target.position);
            if distance > body.stats.attack_range * MELEE_SLACK {
                body.transition(ActorState::Chase, ctx);
            } else if body.in_state_for() >= PUNCH_WINDUP && body.cooldown_ready() {
                punch(body, data, target.id, target.position, multiplier, ctx);
            }
        }
        ActorState::RangedThrow => {
            body.face(target.position);
            if body.in_state_for() >= THROW_WINDUP {
                let flight = Duration::from_secs_f32(distance / ROCK_SPEED);
                ctx.hazards.throw_rock(Rock {
                    owner: body.id,
                    impact: target.position,
                    radius: ROCK_RADIUS,
                    damage: body.stats.attack_damage,
                    impact_at: ctx.now.saturating_add(flight),
                });
                data.throw_ready_at = body.now.saturating_add(THROW_COOLDOWN);
                body.transition(ActorState::Chase, ctx);
            }
        }
        ActorState::Rage => {
            if body.in_state_for() >= RAGE_DURATION {
                body.transition(ActorState::Chase, ctx);
            } else if distance > body.stats.attack_range {
                body.move_toward(target.position, body.stats.move_speed * multiplier, dt);
            } else if body.cooldown_ready() {
                body.face(target.position);
                punch(body, data, target.id, target.position, multiplier, ctx);
            }
        }
        _ => {}
    }
}

fn punch(
    body: &mut ActorBody,
    data: &mut TankData,
    player: PlayerId,
    position: Vec3,
    multiplier: f32,
    ctx: &mut Ctx<'_>,
) {
    ctx.damage_player(body.id, player, body.stats.attack_damage * multiplier, body.position);
    let mut push = position - body.position;
    push.y = 0.0;
    let direction = push.try_normalize().unwrap_or(body.facing);
    ctx.characters.apply_impulse(player, direction * KNOCKBACK);
    data.relieve(1);
    body.start_cooldown(body.stats.attack_cooldown);
}

#[cfg(test)]
mod tests {
    use horde_core::{PlayerHealthModel, Species};

    use crate::{party::MAX_HEALTH, species::SpeciesData, testing::Harness};

    use super::*;

    #[test]
    fn punch_knocks_the_target_back() {
        let mut harness = Harness::with_player(Vec3::new(2.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Tank, Vec3::ZERO);

        harness.run(&mut actor, Duration::from_secs(1));

        let character = harness.party.character(PlayerId::new(1)).expect("member");
        assert!(character.position.x > 2.0);
        assert!(harness.party.health(PlayerId::new(1)).expect("member") < MAX_HEALTH);
    }

    #[test]
    fn kiting_target_builds_frustration_into_rage() {
        let mut harness = Harness::with_player(Vec3::new(30.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Tank, Vec3::ZERO);

        for _ in 0..400 {
            let ahead = actor.body.position + Vec3::new(30.0, 0.0, 0.0);
            harness.party.set_position(PlayerId::new(1), ahead);
            harness.step(&mut actor);
            if actor.body.state == ActorState::Rage {
                break;
            }
        }

        assert_eq!(actor.body.state, ActorState::Rage);
        assert_eq!(actor.data.frustration(), Some(0.0));
    }

    #[test]
    fn throw_windup_holds_frustration_and_a_landed_rock_relieves_it() {
        let mut harness = Harness::with_player(Vec3::new(20.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Tank, Vec3::ZERO);
        if let SpeciesData::Tank(tank) = &mut actor.data {
            tank.frustration = 50.0;
        }

        harness.run_until(&mut actor, Duration::from_secs(2), |actor| {
            actor.body.state == ActorState::RangedThrow
        });
        assert_eq!(actor.body.state, ActorState::RangedThrow);
        let winding = actor.data.frustration().expect("tank");
        harness.run(&mut actor, Duration::from_secs(1));
        assert_eq!(actor.body.state, ActorState::RangedThrow);
        assert_eq!(actor.data.frustration(), Some(winding));

        harness.run_until(&mut actor, Duration::from_secs(1), |actor| {
            actor.body.state == ActorState::Chase
        });
        assert_eq!(harness.hazards.rocks_in_flight(), 1);
        for _ in 0..32 {
            if harness.hazards.rocks_in_flight() == 0 {
                break;
            }
            harness.step(&mut actor);
        }
        assert_eq!(harness.hazards.rocks_in_flight(), 0);
        assert_eq!(
            harness.party.health(PlayerId::new(1)),
            Some(MAX_HEALTH - 24.0)
        );

        let before = actor.data.frustration().expect("tank");
        harness.step(&mut actor);
        let after = actor.data.frustration().expect("tank");
        assert!(after < before, "{before} -> {after}");
    }
}

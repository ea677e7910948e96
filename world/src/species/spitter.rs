//! Area denier: lob acid that pools on the ground, then back off.

use std::time::Duration;

use horde_core::ActorState;

use crate::{actor::ActorBody, context::Ctx, hazards::AcidPool};

const MIN_BAND: f32 = 4.0;
const WINDUP: Duration = Duration::from_millis(500);
const GLOB_SPEED: f32 = 20.0;
const POOL_RADIUS: f32 = 3.5;
const POOL_DURATION: Duration = Duration::from_secs(7);
const RETREAT: Duration = Duration::from_secs(3);

pub(super) fn update(body: &mut ActorBody, dt: f32, ctx: &mut Ctx<'_>) {
    let Some(target) = body.resolve_target(ctx) else {
        return;
    };
    let distance = body.position.distance(target.position);

    match body.state {
        ActorState::Chase => {
            if distance > body.stats.attack_range
                || !ctx.has_line_of_sight(body.position, target.position)
            {
                body.move_toward(target.position, body.stats.move_speed, dt);
            } else if distance < MIN_BAND {
                body.move_away(target.position, body.stats.move_speed, dt);
            } else if body.cooldown_ready() {
                body.face(target.position);
                body.transition(ActorState::Spit, ctx);
            } else {
                body.face(target.position);
            }
        }
        ActorState::Spit => {
            body.face(target.position);
            if body.in_state_for() < WINDUP {
                return;
            }
            let active_from = ctx
                .now
                .saturating_add(Duration::from_secs_f32(distance / GLOB_SPEED));
            ctx.hazards.add_pool(AcidPool {
                owner: body.id,
                center: target.position,
                radius: POOL_RADIUS,
                damage_per_second: body.stats.attack_damage,
                active_from,
                expires_at: active_from.saturating_add(POOL_DURATION),
            });
            body.start_cooldown(body.stats.attack_cooldown);
            body.transition(ActorState::Retreat, ctx);
        }
        ActorState::Retreat => {
            if body.in_state_for() >= RETREAT {
                body.transition(ActorState::Chase, ctx);
            } else {
                body.move_away(target.position, body.stats.move_speed, dt);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use horde_core::{Species, Vec3};

    use crate::testing::Harness;

    use super::*;

    #[test]
    fn spit_leaves_a_pool_and_retreats() {
        let mut harness = Harness::with_player(Vec3::new(15.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Spitter, Vec3::ZERO);

        harness.run_until(&mut actor, Duration::from_secs(2), |actor| {
            actor.body.state == ActorState::Retreat
        });

        assert_eq!(actor.body.state, ActorState::Retreat);
        let pools = harness.hazards.pools();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].center, Vec3::new(15.0, 0.0, 0.0));
        assert!(pools[0].active_from > harness.now);

        let start = actor.body.position;
        harness.run(&mut actor, Duration::from_secs(1));
        assert!(actor.body.position.x < start.x);
    }
}

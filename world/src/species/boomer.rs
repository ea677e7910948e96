//! Bile carrier: close in and burst, marking characters for the horde.

use std::time::Duration;

use horde_core::ActorState;

use crate::{actor::ActorBody, context::Ctx};

const BURST_WINDUP: Duration = Duration::from_millis(500);
const BURST_RADIUS: f32 = 5.0;
const MARK_DURATION: Duration = Duration::from_secs(20);

pub(super) fn update(body: &mut ActorBody, dt: f32, ctx: &mut Ctx<'_>) {
    let Some(target) = body.resolve_target(ctx) else {
        return;
    };
    let distance = body.position.distance(target.position);

    match body.state {
        ActorState::Chase => {
            if distance <= body.stats.attack_range && body.cooldown_ready() {
                body.face(target.position);
                body.transition(ActorState::Burst, ctx);
            } else if distance > body.stats.attack_range * 0.5 {
                body.move_toward(target.position, body.stats.move_speed, dt);
            }
        }
        ActorState::Burst => {
            if body.in_state_for() >= BURST_WINDUP {
                ctx.mark_area(body.position, BURST_RADIUS, MARK_DURATION);
                body.start_cooldown(body.stats.attack_cooldown);
                body.transition(ActorState::Chase, ctx);
            }
        }
        _ => {}
    }
}

/// Bursting on death covers everyone nearby.
pub(super) fn on_death(body: &ActorBody, ctx: &mut Ctx<'_>) {
    ctx.mark_area(body.position, BURST_RADIUS, MARK_DURATION);
}

#[cfg(test)]
mod tests {
    use horde_core::{DamageSource, Event, PlayerId, Species, Vec3};

    use crate::testing::Harness;

    use super::*;

    #[test]
    fn burst_marks_nearby_characters() {
        let mut harness = Harness::with_player(Vec3::new(8.0, 0.0, 0.0));
        harness.join(PlayerId::new(2), Vec3::new(60.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Boomer, Vec3::ZERO);

        harness.run(&mut actor, Duration::from_secs(3));

        assert!(harness.hazards.is_marked(PlayerId::new(1), harness.now));
        assert!(!harness.hazards.is_marked(PlayerId::new(2), harness.now));
    }

    #[test]
    fn death_marks_the_area() {
        let mut harness = Harness::with_player(Vec3::new(3.0, 0.0, 0.0));
        let mut actor = harness.actor(Species::Boomer, Vec3::ZERO);
        let mut ctx = harness.ctx();
        actor.take_damage(
            100.0,
            DamageSource::player(PlayerId::new(1), Vec3::new(3.0, 0.0, 0.0)),
            &mut ctx,
        );
        drop(ctx);

        assert_eq!(actor.body.state, ActorState::Dead);
        assert!(harness
            .events
            .iter()
            .any(|event| matches!(event, Event::PlayerMarked { player, .. } if *player == PlayerId::new(1))));
    }
}

//! Horde filler: pursue and melee.

use horde_core::ActorState;

use crate::{actor::ActorBody, context::Ctx};

/// Extra reach tolerated before an attacking common resumes the chase.
const ATTACK_SLACK: f32 = 1.2;

pub(super) fn update(body: &mut ActorBody, dt: f32, ctx: &mut Ctx<'_>) {
    if let Some(current) = body.target {
        if !ctx.is_marked(current) {
            if let Some(marked) = body.detect_target(ctx).filter(|player| ctx.is_marked(*player)) {
                body.target = Some(marked);
            }
        }
    }

    let Some(target) = body.resolve_target(ctx) else {
        return;
    };
    let distance = body.position.distance(target.position);

    match body.state {
        ActorState::Chase => {
            if distance <= body.stats.attack_range {
                body.transition(ActorState::Attack, ctx);
            } else {
                body.move_toward(target.position, body.stats.move_speed, dt);
            }
        }
        ActorState::Attack => {
            body.face(target.position);
            if distance > body.stats.attack_range * ATTACK_SLACK {
                body.transition(ActorState::Chase, ctx);
            } else if body.cooldown_ready() {
                ctx.damage_player(body.id, target.id, body.stats.attack_damage, body.position);
                body.start_cooldown(body.stats.attack_cooldown);
            }
        }
        _ => {}
    }
}

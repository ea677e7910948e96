//! Passive avoider that answers a disturbance with one overwhelming strike.

use std::time::Duration;

use horde_core::{ActorState, DamageSource, PlayerId};

use crate::{actor::ActorBody, context::Ctx};

const STARTLE: Duration = Duration::from_secs(2);
/// Multiple of the trigger radius beyond which a startled witch settles.
const CALM_FACTOR: f32 = 2.0;
const RETALIATE_TIMEOUT: Duration = Duration::from_secs(12);
const CALM_DOWN: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Default)]
pub(crate) struct WitchData {
    calm_until: Duration,
}

pub(super) fn update(body: &mut ActorBody, data: &mut WitchData, dt: f32, ctx: &mut Ctx<'_>) {
    match body.state {
        ActorState::Idle => {
            if body.now < data.calm_until {
                return;
            }
            if let Some(player) = body.detect_target(ctx) {
                body.target = Some(player);
                body.transition(ActorState::Startled, ctx);
            }
        }
        ActorState::Startled => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            body.face(target.position);
            let trigger = body.stats.detection_radius;
            if body.position.distance(target.position) > trigger * CALM_FACTOR {
                body.target = None;
                body.transition(ActorState::Idle, ctx);
            } else if body.in_state_for() >= STARTLE {
                body.transition(ActorState::Retaliate, ctx);
            }
        }
        ActorState::Retaliate => {
            let Some(target) = body.resolve_target(ctx) else {
                return;
            };
            if body.in_state_for() >= RETALIATE_TIMEOUT {
                settle(body, data, ctx);
                return;
            }
            if body.position.distance(target.position) > body.stats.attack_range {
                body.move_toward(target.position, body.stats.move_speed, dt);
                return;
            }
            if body.accept_hit() {
                body.face(target.position);
                ctx.damage_player(body.id, target.id, body.stats.attack_damage, body.position);
                settle(body, data, ctx);
            }
        }
        _ => {}
    }
}

/// Damage skips the startle and retaliates against the shooter.
pub(super) fn on_damaged(
    body: &mut ActorBody,
    source: DamageSource,
    ctx: &mut Ctx<'_>,
) -> bool {
    if !matches!(body.state, ActorState::Idle | ActorState::Startled) {
        return true;
    }
    let culprit: Option<PlayerId> = source
        .player
        .filter(|player| ctx.character(*player).is_some_and(|c| c.is_targetable()))
        .or(body.target);
    if let Some(player) = culprit {
        body.target = Some(player);
        body.transition(ActorState::Retaliate, ctx);
    }
    true
}

fn settle(body: &mut ActorBody, data: &mut WitchData, ctx: &mut Ctx<'_>) {
    data.calm_until = body.now.saturating_add(CALM_DOWN);
    body.target = None;
    body.transition(ActorState::Idle, ctx);
}

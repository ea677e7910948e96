//! Shared actor framework: identity, transitions, damage and death.

use std::time::Duration;

use glam::Vec3;
use horde_core::{
    ActorFault, ActorId, ActorSnapshot, ActorState, CharacterSnapshot, DamageSource, Event,
    PlayerId, Species, SpeciesStats,
};
use rand::Rng;
use tracing::trace;

use crate::{
    context::Ctx,
    scheduler::Deferred,
    species::{self, SpeciesData},
};

/// Delay between death and removal from the registry.
pub(crate) const DEATH_DELAY: Duration = Duration::from_secs(3);
/// Reaction window between acquiring a target and engaging it.
pub(crate) const DETECT_REACTION: Duration = Duration::from_millis(250);
/// Time spent recovering from a stagger.
pub(crate) const STAGGER_RECOVERY: Duration = Duration::from_secs(1);
/// Factor applied to the detection radius against bile-marked characters.
pub(crate) const MARKED_DETECTION_FACTOR: f32 = 3.0;

/// Mutable state every species shares.
#[derive(Clone, Debug)]
pub(crate) struct ActorBody {
    pub(crate) id: ActorId,
    pub(crate) species: Species,
    pub(crate) stats: SpeciesStats,
    pub(crate) state: ActorState,
    pub(crate) generation: u64,
    pub(crate) state_entered_at: Duration,
    pub(crate) health: f32,
    pub(crate) position: Vec3,
    pub(crate) facing: Vec3,
    pub(crate) target: Option<PlayerId>,
    pub(crate) last_update: Duration,
    pub(crate) cadence: Duration,
    pub(crate) attack_ready_at: Duration,
    pub(crate) now: Duration,
    hit_accepted: bool,
    consecutive_faults: u32,
    last_good_position: Vec3,
}

impl ActorBody {
    fn new(
        id: ActorId,
        species: Species,
        stats: SpeciesStats,
        position: Vec3,
        now: Duration,
        cadence: Duration,
    ) -> Self {
        Self {
            id,
            species,
            stats,
            state: ActorState::Idle,
            generation: 0,
            state_entered_at: now,
            health: stats.health,
            position,
            facing: Vec3::Z,
            target: None,
            last_update: now,
            cadence,
            attack_ready_at: now,
            now,
            hit_accepted: false,
            consecutive_faults: 0,
            last_good_position: position,
        }
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.state == ActorState::Dead
    }

    pub(crate) fn in_state_for(&self) -> Duration {
        self.now.saturating_sub(self.state_entered_at)
    }

    pub(crate) fn cooldown_ready(&self) -> bool {
        self.now >= self.attack_ready_at
    }

    pub(crate) fn start_cooldown(&mut self, seconds: f32) {
        self.attack_ready_at = self.now.saturating_add(Duration::from_secs_f32(seconds.max(0.0)));
    }

    /// Moves the actor into `to` if its state machine admits the change.
    ///
    /// Dead actors, self-transitions and states outside the species set are
    /// ignored. Leaving a victim-holding state releases the victim first.
    pub(crate) fn transition(&mut self, to: ActorState, ctx: &mut Ctx<'_>) {
        let from = self.state;
        if from == ActorState::Dead || from == to || !self.species.admits(to) {
            return;
        }

        if self.species.holds_victim(from) && !self.species.holds_victim(to) {
            ctx.release_victim(self.id);
        }

        self.state = to;
        self.generation = self.generation.saturating_add(1);
        self.state_entered_at = self.now;
        self.hit_accepted = false;
        trace!(
            actor = self.id.get(),
            species = self.species.name(),
            from = from.name(),
            to = to.name(),
            "actor transition"
        );
        ctx.events.push(Event::ActorStateChanged {
            actor: self.id,
            species: self.species,
            from,
            to,
        });
    }

    /// Accepts the first hit of the current action and rejects the rest.
    pub(crate) fn accept_hit(&mut self) -> bool {
        if self.hit_accepted {
            return false;
        }
        self.hit_accepted = true;
        true
    }

    pub(crate) fn resolve_target(&self, ctx: &Ctx<'_>) -> Option<CharacterSnapshot> {
        self.target
            .and_then(|player| ctx.character(player))
            .filter(CharacterSnapshot::is_targetable)
    }

    /// Nearest targetable character inside the detection radius.
    ///
    /// Commons see bile-marked characters from further away and prefer them.
    pub(crate) fn detect_target(&self, ctx: &Ctx<'_>) -> Option<PlayerId> {
        let radius = self.stats.detection_radius;
        let prefer_marked = self.species == Species::Common;
        let mut best: Option<(bool, f32, PlayerId)> = None;

        for character in ctx.characters.characters() {
            if !character.is_targetable() {
                continue;
            }
            let distance = self.position.distance(character.position);
            let marked = prefer_marked && ctx.is_marked(character.id);
            let reach = if marked {
                radius * MARKED_DETECTION_FACTOR
            } else {
                radius
            };
            if distance.is_nan() || distance > reach {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_marked, best_distance, _)) => {
                    (marked && !best_marked) || (marked == best_marked && distance < best_distance)
                }
            };
            if better {
                best = Some((marked, distance, character.id));
            }
        }

        best.map(|(_, _, player)| player)
    }

    pub(crate) fn face(&mut self, point: Vec3) {
        let mut offset = point - self.position;
        offset.y = 0.0;
        if let Some(direction) = offset.try_normalize() {
            self.facing = direction;
        }
    }

    pub(crate) fn move_toward(&mut self, destination: Vec3, speed: f32, dt: f32) {
        let offset = destination - self.position;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let step = (speed * dt).min(distance);
        let direction = offset / distance;
        self.face(destination);
        self.position += direction * step;
    }

    pub(crate) fn move_away(&mut self, threat: Vec3, speed: f32, dt: f32) {
        let mut offset = self.position - threat;
        offset.y = 0.0;
        let direction = offset.try_normalize().unwrap_or(-self.facing);
        self.position += direction * speed * dt;
        self.face(threat);
    }

    /// Re-validates weak references to the target and any held victim.
    fn revalidate(&mut self, ctx: &mut Ctx<'_>) {
        if self.species.holds_victim(self.state) {
            let victim_alive = ctx
                .victim_of(self.id)
                .and_then(|victim| ctx.character(victim))
                .is_some_and(|victim| victim.alive);
            if !victim_alive {
                self.target = None;
                self.transition(ActorState::Idle, ctx);
                return;
            }
        }

        if self.target.is_some() && self.resolve_target(ctx).is_none() {
            self.target = None;
            if self.state.is_engaged() || self.state == ActorState::Detect {
                self.transition(ActorState::Idle, ctx);
            }
        }
    }

    /// Runs the states every species shares. Returns whether one applied.
    fn update_shared(&mut self, ctx: &mut Ctx<'_>) -> bool {
        match self.state {
            ActorState::Idle if self.species != Species::Witch => {
                if let Some(player) = self.detect_target(ctx) {
                    self.target = Some(player);
                    self.transition(ActorState::Detect, ctx);
                }
                true
            }
            ActorState::Detect => {
                if let Some(target) = self.resolve_target(ctx) {
                    self.face(target.position);
                }
                if self.in_state_for() >= DETECT_REACTION {
                    self.transition(self.species.engage_state(), ctx);
                }
                true
            }
            ActorState::Stagger => {
                if self.in_state_for() >= STAGGER_RECOVERY {
                    self.transition(ActorState::Idle, ctx);
                }
                true
            }
            _ => false,
        }
    }

    fn check_finite(&self) -> Result<(), ActorFault> {
        if !self.position.is_finite() || !self.facing.is_finite() {
            return Err(ActorFault::NonFinitePosition);
        }
        if !self.health.is_finite() {
            return Err(ActorFault::NonFiniteHealth);
        }
        Ok(())
    }

    pub(crate) fn record_fault(&mut self) -> u32 {
        self.consecutive_faults = self.consecutive_faults.saturating_add(1);
        self.position = self.last_good_position;
        if !self.facing.is_finite() {
            self.facing = Vec3::Z;
        }
        if !self.health.is_finite() {
            self.health = 0.0;
        }
        self.consecutive_faults
    }

    pub(crate) fn record_success(&mut self) {
        self.consecutive_faults = 0;
        self.last_good_position = self.position;
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            species: self.species,
            state: self.state,
            health: self.health,
            position: self.position,
            facing: self.facing,
            target: self.target,
            generation: self.generation,
        }
    }
}

/// A single simulated actor: shared body plus species-specific data.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) body: ActorBody,
    pub(crate) data: SpeciesData,
}

impl Actor {
    pub(crate) fn new(
        id: ActorId,
        species: Species,
        stats: SpeciesStats,
        position: Vec3,
        now: Duration,
        cadence: Duration,
    ) -> Self {
        Self {
            body: ActorBody::new(id, species, stats, position, now, cadence),
            data: SpeciesData::for_species(species, position),
        }
    }

    pub(crate) fn is_due(&self, now: Duration) -> bool {
        now.saturating_sub(self.body.last_update) >= self.body.cadence
    }

    /// Runs one throttled update and validates the result.
    pub(crate) fn update(&mut self, ctx: &mut Ctx<'_>) -> Result<(), ActorFault> {
        let dt = ctx.now.saturating_sub(self.body.last_update).as_secs_f32();
        self.body.last_update = ctx.now;
        self.body.now = ctx.now;

        if self.body.is_dead() {
            return Ok(());
        }

        self.body.revalidate(ctx);
        if !self.body.update_shared(ctx) {
            species::update(&mut self.body, &mut self.data, dt, ctx);
        }
        self.body.check_finite()
    }

    /// Applies incoming damage.
    pub(crate) fn take_damage(&mut self, amount: f32, source: DamageSource, ctx: &mut Ctx<'_>) {
        let body = &mut self.body;
        if body.is_dead() || !amount.is_finite() || amount <= 0.0 {
            return;
        }
        body.now = ctx.now;
        body.health = (body.health - amount).max(0.0);

        if body.health <= 0.0 {
            self.die(source.player, ctx);
            return;
        }

        if species::on_damaged(body, &mut self.data, source, ctx) {
            return;
        }

        if body.species.holds_victim(body.state) {
            body.transition(ActorState::Stagger, ctx);
        } else if body.state.is_engaged() && body.species.admits(ActorState::Stagger) {
            let threshold = body.stats.stagger_threshold.max(f32::EPSILON);
            let chance = (amount / threshold).min(1.0);
            if ctx.rng.gen::<f32>() < chance {
                body.transition(ActorState::Stagger, ctx);
            }
        }
    }

    /// Kills the actor, releasing any victim and scheduling destruction.
    pub(crate) fn die(&mut self, killer: Option<PlayerId>, ctx: &mut Ctx<'_>) {
        if self.body.is_dead() {
            return;
        }
        self.body.now = ctx.now;
        self.body.health = 0.0;
        self.body.transition(ActorState::Dead, ctx);
        ctx.release_victim(self.body.id);
        ctx.events.push(Event::ActorKilled {
            actor: self.body.id,
            species: self.body.species,
            position: self.body.position,
            killer,
        });
        ctx.schedule(
            DEATH_DELAY,
            self.body.id,
            self.body.generation,
            Deferred::Destroy,
        );
        species::on_death(&mut self.body, ctx);
    }

    /// Forces a transition requested from outside the actor.
    pub(crate) fn force_transition(&mut self, state: ActorState, ctx: &mut Ctx<'_>) {
        self.body.now = ctx.now;
        if state == ActorState::Dead {
            self.die(None, ctx);
        } else {
            self.body.transition(state, ctx);
        }
    }

    /// Handles a deferred timeout; no-op unless still in `expected`.
    pub(crate) fn resolve_timeout(&mut self, expected: ActorState, ctx: &mut Ctx<'_>) {
        self.body.now = ctx.now;
        if self.body.state == expected {
            self.body.transition(ActorState::Stagger, ctx);
        }
    }

    /// Handles a physics contact with `player` reported by the host.
    pub(crate) fn contact(&mut self, player: PlayerId, ctx: &mut Ctx<'_>) {
        self.body.now = ctx.now;
        if self.body.is_dead() {
            return;
        }
        species::on_contact(&mut self.body, &mut self.data, player, ctx);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde encounter engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative actor world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems such as the director to react to. Everything the core calls
//! into but does not own (character health, character motion, level
//! geometry, spawn placement, observer notification) is described here as a
//! trait.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use glam::Vec3;

mod species;

pub use species::{
    ActorState, Species, SpeciesCounts, SpeciesStats, SpeciesTable, SpawnPointKind,
};

/// Upper bound of the director's intensity scale.
pub const MAX_INTENSITY: f32 = 100.0;

/// Default interval between two updates of the same actor (16 Hz).
pub const DEFAULT_ACTOR_CADENCE: Duration = Duration::from_micros(62_500);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an actor of the given species be created.
    SpawnActor {
        /// Species to construct.
        species: Species,
        /// World position the actor appears at.
        position: Vec3,
    },
    /// Detaches an actor from the registry, releasing any victim it holds.
    RemoveActor {
        /// Identifier of the actor to remove.
        actor: ActorId,
    },
    /// Applies damage to an actor, typically from a weapon hit-scan.
    DamageActor {
        /// Identifier of the actor being hit.
        actor: ActorId,
        /// Amount of damage dealt.
        amount: f32,
        /// Origin of the damage.
        source: DamageSource,
    },
    /// Forces an actor into the provided state, subject to its state machine.
    TransitionActor {
        /// Identifier of the actor to transition.
        actor: ActorId,
        /// Requested state.
        state: ActorState,
    },
    /// Reports a physics contact between an actor and a character.
    ReportContact {
        /// Actor whose body touched the character.
        actor: ActorId,
        /// Character that was touched.
        player: PlayerId,
    },
    /// Requests that a character free a locked victim.
    RescueVictim {
        /// Character attempting the rescue.
        rescuer: PlayerId,
        /// Character currently held by an actor.
        victim: PlayerId,
    },
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation time after the tick.
        now: Duration,
    },
    /// Confirms that an actor was created.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Species of the actor.
        species: Species,
        /// Position the actor was created at.
        position: Vec3,
    },
    /// Reports that a spawn request was refused.
    SpawnRejected {
        /// Species requested.
        species: Species,
        /// Reason the request was refused.
        reason: SpawnError,
    },
    /// Reports a completed state transition.
    ActorStateChanged {
        /// Identifier of the actor.
        actor: ActorId,
        /// Species of the actor.
        species: Species,
        /// State before the transition.
        from: ActorState,
        /// State after the transition.
        to: ActorState,
    },
    /// Reports that an actor's health reached zero.
    ActorKilled {
        /// Identifier of the actor.
        actor: ActorId,
        /// Species of the actor.
        species: Species,
        /// Position the actor died at.
        position: Vec3,
        /// Character credited with the kill, if any.
        killer: Option<PlayerId>,
    },
    /// Confirms that an actor left the registry.
    ActorRemoved {
        /// Identifier of the actor.
        actor: ActorId,
        /// Species of the actor.
        species: Species,
    },
    /// Reports that an actor was force-removed after repeated update faults.
    ActorEvicted {
        /// Identifier of the actor.
        actor: ActorId,
        /// Species of the actor.
        species: Species,
        /// Number of consecutive faults observed.
        faults: u32,
    },
    /// Reports damage applied to a character.
    PlayerDamaged {
        /// Character that was hurt.
        player: PlayerId,
        /// Damage dealt.
        amount: f32,
        /// Actor responsible for the damage, if still known.
        attacker: Option<ActorId>,
    },
    /// Reports that a character became incapacitated.
    PlayerIncapacitated {
        /// Character that went down.
        player: PlayerId,
        /// Actor responsible for the final hit, if known.
        attacker: Option<ActorId>,
    },
    /// Reports that a character was covered in bile.
    PlayerMarked {
        /// Character that was marked.
        player: PlayerId,
        /// Simulation time at which the mark expires.
        until: Duration,
    },
    /// Reports that an actor locked a victim.
    VictimLocked {
        /// Actor holding the victim.
        actor: ActorId,
        /// Victim character.
        player: PlayerId,
        /// Mechanic that holds the victim.
        kind: LockKind,
    },
    /// Reports that a victim lock was released.
    VictimReleased {
        /// Actor that held the victim.
        actor: ActorId,
        /// Victim character, whose movement is restored.
        player: PlayerId,
        /// Mechanic that held the victim.
        kind: LockKind,
    },
    /// Reports the outcome of a rescue request.
    RescueAttempted {
        /// Character attempting the rescue.
        rescuer: PlayerId,
        /// Character being rescued.
        victim: PlayerId,
        /// Whether the victim was freed.
        success: bool,
        /// Explanation provided by the health model.
        reason: String,
    },
    /// Reports that the director entered a new pacing phase.
    PacingPhaseChanged {
        /// Phase that ended.
        from: PacingPhase,
        /// Phase that started.
        to: PacingPhase,
        /// Intensity at the moment of the change.
        intensity: f32,
    },
}

/// Unique identifier assigned to an actor. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Identifier of a player-controlled character owned by the health model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Director pacing phases, visited in a fixed cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingPhase {
    /// Pressure ramps up until intensity peaks.
    BuildUp,
    /// Peak pressure is held for a short randomized window.
    SustainPeak,
    /// Intensity is allowed to drain below the peak threshold.
    PeakFade,
    /// Quiet window with common spawns suppressed.
    Relax,
}

impl PacingPhase {
    /// Phase that follows this one in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::BuildUp => Self::SustainPeak,
            Self::SustainPeak => Self::PeakFade,
            Self::PeakFade => Self::Relax,
            Self::Relax => Self::BuildUp,
        }
    }

    /// Snake-case identifier used in logs and notifications.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BuildUp => "build_up",
            Self::SustainPeak => "sustain_peak",
            Self::PeakFade => "peak_fade",
            Self::Relax => "relax",
        }
    }
}

/// Mechanic through which an actor holds a victim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKind {
    /// Hunter pin.
    Pin,
    /// Smoker tether drag.
    Drag,
    /// Charger carry and slam.
    Carry,
}

/// Origin of damage dealt to an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageSource {
    /// Character responsible for the damage, if any.
    pub player: Option<PlayerId>,
    /// World position the damage originated from.
    pub position: Vec3,
}

impl DamageSource {
    /// Damage dealt by a character standing at the provided position.
    #[must_use]
    pub const fn player(player: PlayerId, position: Vec3) -> Self {
        Self {
            player: Some(player),
            position,
        }
    }

    /// Damage without an attributable character.
    #[must_use]
    pub const fn environment(position: Vec3) -> Self {
        Self {
            player: None,
            position,
        }
    }
}

/// Read-only view of a character exposed by the health model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterSnapshot {
    /// Identifier of the character.
    pub id: PlayerId,
    /// Current world position.
    pub position: Vec3,
    /// Unit vector the character faces.
    pub facing: Vec3,
    /// Whether the character is alive (possibly incapacitated).
    pub alive: bool,
    /// Whether the character is incapacitated and awaiting rescue.
    pub incapacitated: bool,
}

impl CharacterSnapshot {
    /// Reports whether hostile actors may attack the character.
    #[must_use]
    pub const fn is_targetable(&self) -> bool {
        self.alive
    }

    /// Reports whether a new victim lock may be placed on the character.
    #[must_use]
    pub const fn is_grabbable(&self) -> bool {
        self.alive && !self.incapacitated
    }
}

/// Outcome of a rescue attempt reported by the health model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RescueOutcome {
    /// Whether the rescue succeeded.
    pub success: bool,
    /// Human-readable explanation.
    pub reason: String,
}

impl RescueOutcome {
    /// Successful rescue with the provided explanation.
    #[must_use]
    pub fn succeeded(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: reason.into(),
        }
    }

    /// Failed rescue with the provided explanation.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: reason.into(),
        }
    }
}

/// Immutable representation of a single actor used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier of the actor.
    pub id: ActorId,
    /// Species of the actor.
    pub species: Species,
    /// Current state.
    pub state: ActorState,
    /// Remaining health.
    pub health: f32,
    /// Current position.
    pub position: Vec3,
    /// Unit vector the actor faces.
    pub facing: Vec3,
    /// Character currently targeted, if any.
    pub target: Option<PlayerId>,
    /// Counter incremented on every state transition.
    pub generation: u64,
}

/// Read-only snapshot describing every live actor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no actors were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

/// Candidate spawn location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// World position of the point.
    pub position: Vec3,
    /// Which species family may use the point.
    pub kind: SpawnPointKind,
    /// Simulation time the point was last handed out.
    #[serde(skip)]
    pub last_used: Option<Duration>,
}

impl SpawnPoint {
    /// Creates an unused spawn point.
    #[must_use]
    pub const fn new(position: Vec3, kind: SpawnPointKind) -> Self {
        Self {
            position,
            kind,
            last_used: None,
        }
    }
}

/// Reasons a spawn request can be refused by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The species already has its maximum number of active actors.
    #[error("active count for {species:?} already at cap {cap}")]
    CapReached {
        /// Species requested.
        species: Species,
        /// Configured cap.
        cap: u32,
    },
    /// The requested position contains NaN or infinite components.
    #[error("spawn position is not finite")]
    NonFinitePosition,
}

/// Faults raised by a single actor update; contained by the registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActorFault {
    /// The update produced a non-finite position.
    #[error("actor position became non-finite")]
    NonFinitePosition,
    /// The update produced non-finite health.
    #[error("actor health became non-finite")]
    NonFiniteHealth,
    /// The update panicked.
    #[error("actor update panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },
}

/// Health and incapacitation model for player characters.
///
/// Implementations must never panic; damage against unknown characters is
/// ignored.
pub trait PlayerHealthModel {
    /// Snapshots of every character currently present.
    fn characters(&self) -> Vec<CharacterSnapshot>;

    /// Re-resolves a single character, returning `None` if it despawned.
    fn character(&self, id: PlayerId) -> Option<CharacterSnapshot> {
        self.characters()
            .into_iter()
            .find(|character| character.id == id)
    }

    /// Applies damage, triggering incapacitation semantics internally.
    fn damage_player(&mut self, target: PlayerId, amount: f32, source_position: Vec3);

    /// Attempts to free `target` from whatever holds it.
    fn attempt_rescue(&mut self, rescuer: PlayerId, target: PlayerId) -> RescueOutcome;

    /// Restores a character to full health. Used by debug hooks.
    fn heal_player(&mut self, target: PlayerId);
}

/// Movement side of the character layer, driven by victim locks and knockback.
pub trait CharacterMotor {
    /// Disables or restores player-driven movement for the character.
    fn set_movement_locked(&mut self, player: PlayerId, locked: bool);

    /// Applies an instantaneous displacement impulse.
    fn apply_impulse(&mut self, player: PlayerId, impulse: Vec3);

    /// Moves the character toward `position` by at most `max_step` units.
    fn pull_toward(&mut self, player: PlayerId, position: Vec3, max_step: f32);
}

/// Combined character collaborator used by the world.
pub trait Characters: PlayerHealthModel + CharacterMotor {}

impl<T: PlayerHealthModel + CharacterMotor> Characters for T {}

/// Level geometry query used for visibility checks.
pub trait LineOfSight {
    /// Reports whether `target` is visible from `origin`.
    fn has_line_of_sight(&self, origin: Vec3, target: Vec3) -> bool;
}

/// Supplies candidate spawn locations.
pub trait SpawnPointProvider {
    /// Picks a spawn location of the requested kind.
    ///
    /// When `exclude_visible_to_any_player` is set, points inside any player's
    /// line of sight are rejected. `prefer_behind_player_ratio` is the
    /// probability of choosing among points behind the nearest player's
    /// facing direction when such points exist.
    fn get_spawn_point(
        &mut self,
        kind: SpawnPointKind,
        exclude_visible_to_any_player: bool,
        prefer_behind_player_ratio: f32,
    ) -> Option<Vec3>;
}

/// Categories of notifications delivered to remote observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An actor entered the encounter.
    EntitySpawned,
    /// An actor changed state.
    EntityStateChanged,
    /// The director changed pacing phase.
    PacingPhaseChanged,
}

/// Payload delivered to remote observers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// An actor entered the encounter.
    EntitySpawned {
        /// Identifier of the actor.
        actor: ActorId,
        /// Species of the actor.
        species: Species,
        /// Spawn position.
        position: [f32; 3],
    },
    /// An actor changed state.
    EntityStateChanged {
        /// Identifier of the actor.
        actor: ActorId,
        /// Species of the actor.
        species: Species,
        /// Previous state.
        from: ActorState,
        /// New state.
        to: ActorState,
    },
    /// The director changed pacing phase.
    PacingPhaseChanged {
        /// Previous phase.
        from: PacingPhase,
        /// New phase.
        to: PacingPhase,
        /// Intensity at the change.
        intensity: f32,
    },
}

impl Notification {
    /// Derives the observer notification for an event, if it has one.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<(NotificationKind, Self)> {
        match *event {
            Event::ActorSpawned {
                actor,
                species,
                position,
            } => Some((
                NotificationKind::EntitySpawned,
                Self::EntitySpawned {
                    actor,
                    species,
                    position: position.to_array(),
                },
            )),
            Event::ActorStateChanged {
                actor,
                species,
                from,
                to,
            } => Some((
                NotificationKind::EntityStateChanged,
                Self::EntityStateChanged {
                    actor,
                    species,
                    from,
                    to,
                },
            )),
            Event::PacingPhaseChanged {
                from,
                to,
                intensity,
            } => Some((
                NotificationKind::PacingPhaseChanged,
                Self::PacingPhaseChanged {
                    from,
                    to,
                    intensity,
                },
            )),
            _ => None,
        }
    }
}

/// Fire-and-forget transport toward remote observers.
pub trait NotificationSink {
    /// Delivers a notification. Implementations must not block or retry.
    fn broadcast(&mut self, kind: NotificationKind, payload: Notification);
}

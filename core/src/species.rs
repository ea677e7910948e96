//! Species tags, actor states, and the static species parameter table.

use serde::{Deserialize, Serialize};

/// Closed set of hostile species simulated by the encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    /// Horde filler that pursues and melees.
    Common,
    /// Pursuer that leaps onto a victim and pins it.
    Hunter,
    /// Grappler that drags a victim with a tether.
    Smoker,
    /// Fragile disruptor that marks characters with bile.
    Boomer,
    /// Boss-tier bruiser with a frustration-driven rage.
    Tank,
    /// Passive avoider that retaliates once when disturbed.
    Witch,
    /// Bruiser that charges, carries and slams a victim.
    Charger,
    /// Area-denier that leaves damage-over-time pools.
    Spitter,
}

impl Species {
    /// Number of species in the closed set.
    pub const COUNT: usize = 8;

    /// Every species in dense index order.
    pub const ALL: [Species; Self::COUNT] = [
        Species::Common,
        Species::Hunter,
        Species::Smoker,
        Species::Boomer,
        Species::Tank,
        Species::Witch,
        Species::Charger,
        Species::Spitter,
    ];

    /// Dense index used by per-species tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Common => 0,
            Self::Hunter => 1,
            Self::Smoker => 2,
            Self::Boomer => 3,
            Self::Tank => 4,
            Self::Witch => 5,
            Self::Charger => 6,
            Self::Spitter => 7,
        }
    }

    /// Lowercase identifier used in logs and configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Hunter => "hunter",
            Self::Smoker => "smoker",
            Self::Boomer => "boomer",
            Self::Tank => "tank",
            Self::Witch => "witch",
            Self::Charger => "charger",
            Self::Spitter => "spitter",
        }
    }

    /// Parses the lowercase identifier produced by [`Species::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|species| species.name().eq_ignore_ascii_case(name))
    }

    /// Kind of spawn point the species is placed at.
    #[must_use]
    pub const fn spawn_kind(self) -> SpawnPointKind {
        match self {
            Self::Common => SpawnPointKind::Common,
            _ => SpawnPointKind::Special,
        }
    }

    /// State entered once a target has been detected.
    #[must_use]
    pub const fn engage_state(self) -> ActorState {
        match self {
            Self::Hunter | Self::Smoker => ActorState::Stalk,
            Self::Witch => ActorState::Startled,
            _ => ActorState::Chase,
        }
    }

    /// Reports whether the species state machine admits the provided state.
    #[must_use]
    pub const fn admits(self, state: ActorState) -> bool {
        use ActorState as S;

        match state {
            S::Idle | S::Dead => true,
            S::Detect => !matches!(self, Self::Witch),
            _ => match self {
                Self::Common => matches!(state, S::Chase | S::Attack),
                Self::Hunter => matches!(
                    state,
                    S::Stalk | S::Windup | S::Leap | S::Pin | S::Stagger
                ),
                Self::Smoker => matches!(
                    state,
                    S::Stalk | S::Aim | S::Grab | S::Drag | S::Stagger
                ),
                Self::Boomer => matches!(state, S::Chase | S::Burst | S::Stagger),
                Self::Tank => matches!(
                    state,
                    S::Chase | S::Attack | S::RangedThrow | S::Rage | S::Stagger
                ),
                Self::Witch => matches!(state, S::Startled | S::Retaliate),
                Self::Charger => matches!(
                    state,
                    S::Chase | S::Windup | S::Charge | S::Grab | S::Slam | S::Stagger
                ),
                Self::Spitter => matches!(
                    state,
                    S::Chase | S::Spit | S::Retreat | S::Stagger
                ),
            },
        }
    }

    /// Reports whether the provided state keeps a victim locked for this species.
    #[must_use]
    pub const fn holds_victim(self, state: ActorState) -> bool {
        match self {
            Self::Hunter => matches!(state, ActorState::Pin),
            Self::Smoker => matches!(state, ActorState::Drag),
            Self::Charger => matches!(state, ActorState::Grab | ActorState::Slam),
            _ => false,
        }
    }
}

/// Dense state enumeration shared by every species state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorState {
    /// Waiting for a target.
    Idle,
    /// Short reaction window after acquiring a target.
    Detect,
    /// Moving directly toward the target.
    Chase,
    /// Melee swing against the target.
    Attack,
    /// Holding a range band around the target.
    Stalk,
    /// Telegraphing an action before committing.
    Windup,
    /// Ballistic leap in flight.
    Leap,
    /// Victim pinned to the ground.
    Pin,
    /// Tether aim telegraph.
    Aim,
    /// Grab in progress: tether in flight or victim being carried.
    Grab,
    /// Victim dragged by the tether.
    Drag,
    /// Bile burst.
    Burst,
    /// Throwing a projectile.
    RangedThrow,
    /// Timed escalation with speed and damage multipliers.
    Rage,
    /// Disturbed and building up to retaliation.
    Startled,
    /// Single overwhelming strike against the disturbance source.
    Retaliate,
    /// Straight-line charge.
    Charge,
    /// Repeating slam of a carried victim.
    Slam,
    /// Acid spit.
    Spit,
    /// Backing away after an attack.
    Retreat,
    /// Interrupted and recovering.
    Stagger,
    /// Terminal state awaiting destruction.
    Dead,
}

impl ActorState {
    /// Snake-case identifier used in logs and notifications.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Detect => "detect",
            Self::Chase => "chase",
            Self::Attack => "attack",
            Self::Stalk => "stalk",
            Self::Windup => "windup",
            Self::Leap => "leap",
            Self::Pin => "pin",
            Self::Aim => "aim",
            Self::Grab => "grab",
            Self::Drag => "drag",
            Self::Burst => "burst",
            Self::RangedThrow => "ranged_throw",
            Self::Rage => "rage",
            Self::Startled => "startled",
            Self::Retaliate => "retaliate",
            Self::Charge => "charge",
            Self::Slam => "slam",
            Self::Spit => "spit",
            Self::Retreat => "retreat",
            Self::Stagger => "stagger",
            Self::Dead => "dead",
        }
    }

    /// Reports whether the state counts as engaged with a target.
    ///
    /// Only engaged actors can be knocked into `Stagger` by damage.
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        !matches!(self, Self::Idle | Self::Detect | Self::Stagger | Self::Dead)
    }
}

/// Classification of spawn points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnPointKind {
    /// Points used for mobs of common actors.
    Common,
    /// Points used for special and boss-tier actors.
    Special,
}

/// Static parameters describing a single species.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    /// Health assigned at spawn.
    pub health: f32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Radius inside which a target is acquired.
    pub detection_radius: f32,
    /// Reach of the species' primary attack or ability.
    pub attack_range: f32,
    /// Cooldown in seconds between primary attacks or ability uses.
    pub attack_cooldown: f32,
    /// Damage dealt per hit, per periodic tick, or per second for area effects.
    pub attack_damage: f32,
    /// Damage that guarantees a stagger from an engaged state.
    pub stagger_threshold: f32,
    /// Maximum number of simultaneously active actors of the species.
    pub cap: u32,
}

impl SpeciesStats {
    /// Default parameters for the provided species.
    #[must_use]
    pub const fn defaults_for(species: Species) -> Self {
        match species {
            Species::Common => Self::new(50.0, 6.5, 25.0, 1.5, 1.0, 2.0, 50.0, 30),
            Species::Hunter => Self::new(250.0, 7.0, 40.0, 25.0, 1.0, 5.0, 40.0, 2),
            Species::Smoker => Self::new(250.0, 5.5, 45.0, 30.0, 15.0, 3.0, 40.0, 1),
            Species::Boomer => Self::new(50.0, 5.0, 30.0, 4.0, 20.0, 0.0, 10.0, 1),
            Species::Tank => Self::new(4_000.0, 7.0, 60.0, 2.5, 1.5, 24.0, 800.0, 1),
            Species::Witch => Self::new(1_000.0, 12.0, 4.0, 1.5, 0.0, 100.0, 1_000.0, 1),
            Species::Charger => Self::new(600.0, 6.5, 40.0, 20.0, 12.0, 15.0, 60.0, 1),
            Species::Spitter => Self::new(100.0, 6.0, 40.0, 25.0, 20.0, 8.0, 20.0, 1),
        }
    }

    #[allow(clippy::too_many_arguments)]
    const fn new(
        health: f32,
        move_speed: f32,
        detection_radius: f32,
        attack_range: f32,
        attack_cooldown: f32,
        attack_damage: f32,
        stagger_threshold: f32,
        cap: u32,
    ) -> Self {
        Self {
            health,
            move_speed,
            detection_radius,
            attack_range,
            attack_cooldown,
            attack_damage,
            stagger_threshold,
            cap,
        }
    }
}

/// Per-species parameter table indexed by [`Species::index`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesTable {
    stats: [SpeciesStats; Species::COUNT],
}

impl SpeciesTable {
    /// Returns the parameters for the provided species.
    #[must_use]
    pub fn stats(&self, species: Species) -> &SpeciesStats {
        &self.stats[species.index()]
    }

    /// Returns a mutable reference to the parameters for the provided species.
    pub fn stats_mut(&mut self, species: Species) -> &mut SpeciesStats {
        &mut self.stats[species.index()]
    }

    /// Maximum number of active actors permitted for the species.
    #[must_use]
    pub fn cap(&self, species: Species) -> u32 {
        self.stats(species).cap
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self {
            stats: Species::ALL.map(SpeciesStats::defaults_for),
        }
    }
}

/// Number of active actors per species.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpeciesCounts {
    counts: [u32; Species::COUNT],
}

impl SpeciesCounts {
    /// Active count for the provided species.
    #[must_use]
    pub const fn get(&self, species: Species) -> u32 {
        self.counts[species.index()]
    }

    /// Increments the count for the provided species.
    pub fn increment(&mut self, species: Species) {
        let slot = &mut self.counts[species.index()];
        *slot = slot.saturating_add(1);
    }

    /// Total number of active actors across every species.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().copied().sum()
    }
}

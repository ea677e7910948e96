//! Tuning knobs for the pacing machine and the per-species spawn schedule.

use std::time::Duration;

use horde_core::{Species, MAX_INTENSITY};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

/// Closed range of seconds from which randomized windows are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecondsRange {
    /// Shortest window in seconds.
    pub min: f32,
    /// Longest window in seconds.
    pub max: f32,
}

impl SecondsRange {
    /// Creates a range spanning `min..=max` seconds.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Reports whether both bounds are finite, non-negative and ordered.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }

    /// Draws a duration uniformly from the range.
    ///
    /// Malformed bounds are repaired rather than rejected: negative or
    /// non-finite values collapse to zero and swapped bounds are reordered.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (low, high) = ordered(non_negative(self.min), non_negative(self.max));
        let seconds = if high > low {
            Uniform::new_inclusive(low, high).sample(rng)
        } else {
            low
        };
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
    }
}

/// Closed range of actors spawned together when a schedule fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRange {
    /// Smallest batch.
    pub min: u32,
    /// Largest batch.
    pub max: u32,
}

impl BatchRange {
    /// A batch of exactly one actor.
    pub const SINGLE: Self = Self::new(1, 1);

    /// Creates a range spanning `min..=max` actors.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Reports whether the range is ordered and spawns at least one actor.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.min >= 1 && self.min <= self.max
    }

    /// Draws a batch size uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let (low, high) = (self.min.min(self.max), self.min.max(self.max));
        if high > low {
            Uniform::new_inclusive(low, high).sample(rng)
        } else {
            low
        }
    }
}

/// Spawn cadence for a single species.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSchedule {
    /// Window between two spawns of the species.
    pub interval: SecondsRange,
    /// Number of actors placed each time the schedule fires.
    pub batch: BatchRange,
}

impl SpeciesSchedule {
    /// Default schedule for the provided species.
    #[must_use]
    pub const fn defaults_for(species: Species) -> Self {
        match species {
            Species::Common => Self {
                interval: SecondsRange::new(90.0, 180.0),
                batch: BatchRange::new(8, 15),
            },
            Species::Tank => Self {
                interval: SecondsRange::new(120.0, 180.0),
                batch: BatchRange::SINGLE,
            },
            Species::Witch => Self {
                interval: SecondsRange::new(150.0, 240.0),
                batch: BatchRange::SINGLE,
            },
            Species::Hunter
            | Species::Smoker
            | Species::Boomer
            | Species::Charger
            | Species::Spitter => Self {
                interval: SecondsRange::new(15.0, 30.0),
                batch: BatchRange::SINGLE,
            },
        }
    }
}

/// Spawn schedules for every species, indexed by [`Species::index`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnSchedule {
    entries: [SpeciesSchedule; Species::COUNT],
}

impl SpawnSchedule {
    /// Schedule for the provided species.
    #[must_use]
    pub fn get(&self, species: Species) -> &SpeciesSchedule {
        &self.entries[species.index()]
    }

    /// Mutable schedule for the provided species.
    pub fn get_mut(&mut self, species: Species) -> &mut SpeciesSchedule {
        &mut self.entries[species.index()]
    }
}

impl Default for SpawnSchedule {
    fn default() -> Self {
        Self {
            entries: Species::ALL.map(SpeciesSchedule::defaults_for),
        }
    }
}

/// Parameters of the intensity signal and the pacing phase machine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Intensity at which build-up turns into a sustained peak.
    pub peak_threshold: f32,
    /// Intensity drained per second while the encounter is quiet.
    pub decay_per_second: f32,
    /// Seconds after a qualifying event during which decay is held off.
    pub recency_window: f32,
    /// Multiplier applied to damage taken by characters.
    pub damage_factor: f32,
    /// Intensity added when a character is incapacitated.
    pub incapacitation_bonus: f32,
    /// Intensity added when a hostile dies near a character.
    pub kill_bonus: f32,
    /// Distance from any character within which kills count.
    pub kill_radius: f32,
    /// Window the peak is held before fading.
    pub sustain_peak: SecondsRange,
    /// Quiet window after the fade.
    pub relax: SecondsRange,
    /// Probability of preferring spawn points behind a character.
    pub prefer_behind_ratio: f32,
    /// Whether spawn points visible to a character are rejected.
    pub exclude_visible: bool,
}

impl DirectorTuning {
    /// Recency window as a duration.
    #[must_use]
    pub fn recency(&self) -> Duration {
        Duration::try_from_secs_f32(non_negative(self.recency_window))
            .unwrap_or(Duration::MAX)
    }

    /// Reports whether every knob lies in its meaningful range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let threshold_ok = self.peak_threshold > 0.0 && self.peak_threshold <= MAX_INTENSITY;
        let rates_ok = [
            self.decay_per_second,
            self.recency_window,
            self.damage_factor,
            self.incapacitation_bonus,
            self.kill_bonus,
            self.kill_radius,
        ]
        .iter()
        .all(|value| value.is_finite() && *value >= 0.0);
        threshold_ok
            && rates_ok
            && self.decay_per_second > 0.0
            && self.sustain_peak.is_valid()
            && self.relax.is_valid()
            && (0.0..=1.0).contains(&self.prefer_behind_ratio)
    }
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            peak_threshold: 70.0,
            decay_per_second: 5.0,
            recency_window: 1.5,
            damage_factor: 0.5,
            incapacitation_bonus: 15.0,
            kill_bonus: 3.0,
            kill_radius: 15.0,
            sustain_peak: SecondsRange::new(3.0, 5.0),
            relax: SecondsRange::new(30.0, 45.0),
            prefer_behind_ratio: 0.75,
            exclude_visible: true,
        }
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    (a.min(b), a.max(b))
}

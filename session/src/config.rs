//! TOML-backed encounter configuration.

use std::{collections::BTreeMap, fs, path::Path, path::PathBuf, time::Duration};

use horde_core::{PlayerId, SpawnPoint, Species, SpeciesStats, SpeciesTable, Vec3};
use horde_system_director::{BatchRange, DirectorTuning, SecondsRange, SpawnSchedule};
use horde_system_spawning::SelectorTuning;
use horde_world::{Occluder, Party, Terrain};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating an [`EncounterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read encounter config from {}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or does not match the schema.
    #[error("failed to parse encounter config")]
    Parse(#[from] toml::de::Error),
    /// A species table key does not name a known species.
    #[error("unknown species `{name}` in [{section}]")]
    UnknownSpecies {
        /// Table the key appeared in.
        section: &'static str,
        /// Offending key.
        name: String,
    },
    /// A value lies outside its meaningful range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending value.
        field: String,
        /// Constraint that was violated.
        reason: &'static str,
    },
}

fn invalid(field: impl Into<String>, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason,
    }
}

/// Partial override of a species' spawn cadence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleOverride {
    /// Replacement spawn interval.
    pub interval: Option<SecondsRange>,
    /// Replacement batch size.
    pub batch: Option<BatchRange>,
}

/// Partial override of a species' static parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsOverride {
    /// Health assigned at spawn.
    pub health: Option<f32>,
    /// Movement speed in units per second.
    pub move_speed: Option<f32>,
    /// Target acquisition radius.
    pub detection_radius: Option<f32>,
    /// Reach of the primary attack or ability.
    pub attack_range: Option<f32>,
    /// Seconds between primary attacks.
    pub attack_cooldown: Option<f32>,
    /// Damage per hit, per tick, or per second.
    pub attack_damage: Option<f32>,
    /// Damage that guarantees a stagger.
    pub stagger_threshold: Option<f32>,
    /// Maximum simultaneously active actors.
    pub cap: Option<u32>,
}

impl StatsOverride {
    fn apply(&self, stats: &mut SpeciesStats) {
        let fields = [
            (self.health, &mut stats.health),
            (self.move_speed, &mut stats.move_speed),
            (self.detection_radius, &mut stats.detection_radius),
            (self.attack_range, &mut stats.attack_range),
            (self.attack_cooldown, &mut stats.attack_cooldown),
            (self.attack_damage, &mut stats.attack_damage),
            (self.stagger_threshold, &mut stats.stagger_threshold),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(cap) = self.cap {
            stats.cap = cap;
        }
    }

    fn values(&self) -> [(&'static str, Option<f32>); 7] {
        [
            ("health", self.health),
            ("move_speed", self.move_speed),
            ("detection_radius", self.detection_radius),
            ("attack_range", self.attack_range),
            ("attack_cooldown", self.attack_cooldown),
            ("attack_damage", self.attack_damage),
            ("stagger_threshold", self.stagger_threshold),
        ]
    }
}

/// Character placed in the headless reference party.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    /// Identifier of the character.
    pub id: u32,
    /// Starting position.
    pub position: Vec3,
    /// Starting facing direction.
    #[serde(default = "default_facing")]
    pub facing: Vec3,
}

fn default_facing() -> Vec3 {
    Vec3::X
}

/// Complete description of an encounter.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncounterConfig {
    /// Root seed from which every random stream is derived.
    pub seed: u64,
    /// Fixed simulation steps per second.
    pub tick_rate_hz: u32,
    /// Steps run per frame before backlog is dropped.
    pub max_steps_per_frame: u32,
    /// Maximum update frequency of a single actor.
    pub actor_cadence_hz: f32,
    /// Intensity and pacing tuning.
    pub director: DirectorTuning,
    /// Spawn point filtering distances.
    pub spawning: SelectorTuning,
    /// Per-species spawn cadence overrides, keyed by species name.
    pub schedule: BTreeMap<String, ScheduleOverride>,
    /// Per-species stat overrides, keyed by species name.
    pub species: BTreeMap<String, StatsOverride>,
    /// Candidate spawn locations.
    pub spawn_points: Vec<SpawnPoint>,
    /// Blocking geometry.
    pub occluders: Vec<Occluder>,
    /// Characters for headless runs.
    pub players: Vec<PlayerConfig>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_rate_hz: 60,
            max_steps_per_frame: 5,
            actor_cadence_hz: 16.0,
            director: DirectorTuning::default(),
            spawning: SelectorTuning::default(),
            schedule: BTreeMap::new(),
            species: BTreeMap::new(),
            spawn_points: Vec::new(),
            occluders: Vec::new(),
            players: Vec::new(),
        }
    }
}

impl EncounterConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects inverted ranges, non-positive rates and unknown species.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(invalid("tick_rate_hz", "must be positive"));
        }
        if self.max_steps_per_frame == 0 {
            return Err(invalid("max_steps_per_frame", "must be positive"));
        }
        if !(self.actor_cadence_hz.is_finite() && self.actor_cadence_hz > 0.0) {
            return Err(invalid("actor_cadence_hz", "must be a positive rate"));
        }
        if !self.director.is_valid() {
            return Err(invalid("director", "ranges must be ordered and rates positive"));
        }
        if !self.spawning.is_valid() {
            return Err(invalid("spawning", "distances must be finite and non-negative"));
        }

        for (name, entry) in &self.schedule {
            let _ = parse_species("schedule", name)?;
            if entry.interval.is_some_and(|range| !range.is_valid()) {
                return Err(invalid(
                    format!("schedule.{name}.interval"),
                    "min must not exceed max",
                ));
            }
            if entry.batch.is_some_and(|range| !range.is_valid()) {
                return Err(invalid(
                    format!("schedule.{name}.batch"),
                    "batch must spawn at least one actor and min must not exceed max",
                ));
            }
        }

        for (name, entry) in &self.species {
            let _ = parse_species("species", name)?;
            for (field, value) in entry.values() {
                if value.is_some_and(|value| !(value.is_finite() && value >= 0.0)) {
                    return Err(invalid(
                        format!("species.{name}.{field}"),
                        "must be finite and non-negative",
                    ));
                }
            }
        }

        if self.spawn_points.iter().any(|point| !point.position.is_finite()) {
            return Err(invalid("spawn_points", "positions must be finite"));
        }
        if self
            .occluders
            .iter()
            .any(|occluder| !(occluder.center.is_finite() && occluder.radius.is_finite()))
        {
            return Err(invalid("occluders", "centres and radii must be finite"));
        }

        let mut seen = Vec::with_capacity(self.players.len());
        for player in &self.players {
            if seen.contains(&player.id) {
                return Err(invalid(format!("players.{}", player.id), "duplicate id"));
            }
            if !(player.position.is_finite() && player.facing.is_finite()) {
                return Err(invalid(
                    format!("players.{}", player.id),
                    "position and facing must be finite",
                ));
            }
            seen.push(player.id);
        }
        Ok(())
    }

    /// Duration of one simulation step.
    pub fn fixed_dt(&self) -> Result<Duration, ConfigError> {
        Duration::from_secs(1)
            .checked_div(self.tick_rate_hz)
            .filter(|dt| !dt.is_zero())
            .ok_or_else(|| invalid("tick_rate_hz", "must be positive"))
    }

    /// Minimum interval between two updates of one actor.
    pub fn actor_cadence(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(1.0 / f64::from(self.actor_cadence_hz))
            .map_err(|_| invalid("actor_cadence_hz", "must be a positive rate"))
    }

    /// Default species table with overrides applied.
    pub fn species_table(&self) -> Result<SpeciesTable, ConfigError> {
        let mut table = SpeciesTable::default();
        for (name, entry) in &self.species {
            let species = parse_species("species", name)?;
            entry.apply(table.stats_mut(species));
        }
        Ok(table)
    }

    /// Default spawn schedule with overrides applied.
    pub fn spawn_schedule(&self) -> Result<SpawnSchedule, ConfigError> {
        let mut schedule = SpawnSchedule::default();
        for (name, entry) in &self.schedule {
            let species = parse_species("schedule", name)?;
            let slot = schedule.get_mut(species);
            if let Some(interval) = entry.interval {
                slot.interval = interval;
            }
            if let Some(batch) = entry.batch {
                slot.batch = batch;
            }
        }
        Ok(schedule)
    }

    /// Blocking geometry built from the occluder list.
    #[must_use]
    pub fn terrain(&self) -> Terrain {
        Terrain::new(self.occluders.clone())
    }

    /// Reference party seeded with the configured characters.
    #[must_use]
    pub fn party(&self) -> Party {
        let mut party = Party::new();
        for player in &self.players {
            party.join(PlayerId::new(player.id), player.position, player.facing);
        }
        party
    }
}

fn parse_species(section: &'static str, name: &str) -> Result<Species, ConfigError> {
    Species::from_name(name).ok_or_else(|| ConfigError::UnknownSpecies {
        section,
        name: name.to_owned(),
    })
}

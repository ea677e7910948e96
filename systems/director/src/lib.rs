#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pacing director that turns combat events into spawn commands.
//!
//! The director tracks a scalar intensity signal, walks the pacing phases
//! `BuildUp → SustainPeak → PeakFade → Relax`, and decides when and where
//! each species is spawned. It never touches the world directly: it reads the
//! events produced by the previous world tick plus immutable views, and
//! emits [`Command::SpawnActor`] requests and [`Event::PacingPhaseChanged`]
//! notices.

use std::time::Duration;

use horde_core::{
    CharacterSnapshot, Command, Event, PacingPhase, Species, SpeciesCounts, SpeciesTable,
    SpawnPointProvider, Vec3,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

mod intensity;
mod tuning;

pub use intensity::Intensity;
pub use tuning::{BatchRange, DirectorTuning, SecondsRange, SpawnSchedule, SpeciesSchedule};

/// Configuration parameters required to construct the director.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Intensity and phase tuning.
    pub tuning: DirectorTuning,
    /// Per-species spawn cadence.
    pub schedule: SpawnSchedule,
    /// Seed for the director's random stream.
    pub seed: u64,
}

#[derive(Clone, Copy, Debug)]
struct SpawnTimer {
    last_spawn: Duration,
    next_interval: Duration,
    forced: bool,
}

/// Read-only inputs the director consults each tick.
#[derive(Clone, Copy, Debug)]
pub struct Views<'a> {
    /// Characters present in the encounter.
    pub characters: &'a [CharacterSnapshot],
    /// Registered actors per species.
    pub active: &'a SpeciesCounts,
    /// Species parameters, including caps.
    pub species: &'a SpeciesTable,
}

/// Pure system owning the pacing state.
#[derive(Debug)]
pub struct Director {
    tuning: DirectorTuning,
    schedule: SpawnSchedule,
    rng: ChaCha8Rng,
    now: Duration,
    phase: PacingPhase,
    phase_entered_at: Duration,
    phase_hold: Duration,
    intensity: Intensity,
    timers: [SpawnTimer; Species::COUNT],
    paused: bool,
}

impl Director {
    /// Creates a director in `BuildUp` with every spawn timer started at zero.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let timers = Species::ALL.map(|species| SpawnTimer {
            last_spawn: Duration::ZERO,
            next_interval: config.schedule.get(species).interval.sample(&mut rng),
            forced: false,
        });
        Self {
            tuning: config.tuning,
            schedule: config.schedule,
            rng,
            now: Duration::ZERO,
            phase: PacingPhase::BuildUp,
            phase_entered_at: Duration::ZERO,
            phase_hold: Duration::ZERO,
            intensity: Intensity::new(),
            timers,
            paused: false,
        }
    }

    /// Current pacing phase.
    #[must_use]
    pub const fn phase(&self) -> PacingPhase {
        self.phase
    }

    /// Current intensity.
    #[must_use]
    pub const fn intensity(&self) -> f32 {
        self.intensity.value()
    }

    /// Simulation time at which the current phase began.
    #[must_use]
    pub const fn phase_entered_at(&self) -> Duration {
        self.phase_entered_at
    }

    /// Simulation time of the last processed tick.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Reports whether spawn decisions are frozen.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Simulation time at which the species' schedule next fires.
    #[must_use]
    pub fn next_spawn_at(&self, species: Species) -> Duration {
        let timer = &self.timers[species.index()];
        if timer.forced {
            return self.now;
        }
        timer.last_spawn.saturating_add(timer.next_interval)
    }

    /// Freezes spawn decisions. Intensity and phase timers keep running.
    pub fn pause_spawning(&mut self) {
        if !self.paused {
            self.paused = true;
            info!(now = ?self.now, "director spawning paused");
        }
    }

    /// Resumes spawn decisions. Overdue schedules fire on the next tick.
    pub fn resume_spawning(&mut self) {
        if self.paused {
            self.paused = false;
            info!(now = ?self.now, "director spawning resumed");
        }
    }

    /// Consumes world events and views to advance pacing and emit spawns.
    pub fn handle(
        &mut self,
        events: &[Event],
        views: Views<'_>,
        spawn_points: &mut dyn SpawnPointProvider,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt, now } = *event {
                elapsed = elapsed.saturating_add(dt);
                self.now = now;
            }
        }
        for event in events {
            self.observe(event, views.characters);
        }
        if elapsed.is_zero() {
            return;
        }

        self.decay(elapsed);
        self.advance_phase(out_events);
        if !self.paused {
            self.schedule_spawns(views, spawn_points, out_commands);
        }
    }

    fn observe(&mut self, event: &Event, characters: &[CharacterSnapshot]) {
        match *event {
            Event::PlayerDamaged { amount, .. } => {
                self.intensity
                    .bump(amount * self.tuning.damage_factor, self.now);
            }
            Event::PlayerIncapacitated { .. } => {
                self.intensity
                    .bump(self.tuning.incapacitation_bonus, self.now);
            }
            Event::ActorKilled { position, .. } => {
                if near_any(characters, position, self.tuning.kill_radius) {
                    self.intensity.bump(self.tuning.kill_bonus, self.now);
                }
            }
            Event::PlayerMarked { player, .. } => {
                self.timers[Species::Common.index()].forced = true;
                debug!(player = player.get(), "bile mark forces a mob");
            }
            _ => {}
        }
    }

    fn decay(&mut self, elapsed: Duration) {
        let rate = self.tuning.decay_per_second;
        if self.phase == PacingPhase::PeakFade {
            self.intensity.fade(elapsed, self.now, rate);
        } else {
            self.intensity
                .settle(self.now, self.tuning.recency(), rate);
        }
    }

    fn advance_phase(&mut self, out_events: &mut Vec<Event>) {
        let held = self.now.saturating_sub(self.phase_entered_at);
        let intensity = self.intensity.value();
        let ready = match self.phase {
            PacingPhase::BuildUp => intensity >= self.tuning.peak_threshold,
            PacingPhase::SustainPeak | PacingPhase::Relax => held >= self.phase_hold,
            PacingPhase::PeakFade => intensity < self.tuning.peak_threshold,
        };
        if !ready {
            return;
        }

        let from = self.phase;
        let to = from.next();
        self.phase = to;
        self.phase_entered_at = self.now;
        self.phase_hold = match to {
            PacingPhase::SustainPeak => self.tuning.sustain_peak.sample(&mut self.rng),
            PacingPhase::Relax => self.tuning.relax.sample(&mut self.rng),
            PacingPhase::BuildUp | PacingPhase::PeakFade => Duration::ZERO,
        };
        info!(
            from = from.name(),
            to = to.name(),
            intensity,
            hold = ?self.phase_hold,
            "pacing phase changed"
        );
        out_events.push(Event::PacingPhaseChanged {
            from,
            to,
            intensity,
        });
    }

    fn schedule_spawns(
        &mut self,
        views: Views<'_>,
        spawn_points: &mut dyn SpawnPointProvider,
        out: &mut Vec<Command>,
    ) {
        for species in Species::ALL {
            let timer = self.timers[species.index()];
            let suppressed = species == Species::Common
                && self.phase == PacingPhase::Relax
                && !timer.forced;
            if suppressed {
                continue;
            }
            let due = timer.forced
                || self.now.saturating_sub(timer.last_spawn) >= timer.next_interval;
            if !due {
                continue;
            }
            let room = views
                .species
                .cap(species)
                .saturating_sub(views.active.get(species));
            if room == 0 {
                continue;
            }

            let batch = self
                .schedule
                .get(species)
                .batch
                .sample(&mut self.rng)
                .min(room);
            let mut placed = 0_u32;
            for _ in 0..batch {
                let Some(position) = spawn_points.get_spawn_point(
                    species.spawn_kind(),
                    self.tuning.exclude_visible,
                    self.tuning.prefer_behind_ratio,
                ) else {
                    break;
                };
                out.push(Command::SpawnActor { species, position });
                placed += 1;
            }

            if placed == 0 {
                debug!(species = species.name(), "no spawn point available, retrying");
                continue;
            }
            debug!(species = species.name(), placed, "director spawned");
            let next_interval = self.schedule.get(species).interval.sample(&mut self.rng);
            self.timers[species.index()] = SpawnTimer {
                last_spawn: self.now,
                next_interval,
                forced: false,
            };
        }
    }
}

fn near_any(characters: &[CharacterSnapshot], position: Vec3, radius: f32) -> bool {
    characters
        .iter()
        .filter(|character| character.alive)
        .any(|character| character.position.distance(position) <= radius)
}

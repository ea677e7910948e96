#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a horde encounter headlessly.
//!
//! The encounter is driven with fixed wall-clock frames against the in-memory
//! reference party. Debug hooks can be fired at a chosen simulation time and
//! the director can be paused to emulate a safe room.

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use horde_core::{PlayerId, Species, Vec3};
use horde_session::{Encounter, EncounterConfig, TracingSink};
use horde_world::{query, Party};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_LAYOUT: &str = include_str!("../layouts/demo.toml");

#[derive(Debug, Parser)]
#[command(name = "horde", version, about = "Run a horde encounter headlessly")]
struct Cli {
    /// Encounter layout to load instead of the bundled demo.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the layout's root seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// Wall-clock frame length fed to the session, in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Pauses director spawning at this simulated second.
    #[arg(long, value_name = "SECONDS")]
    pause_at: Option<f32>,
    /// Resumes director spawning at this simulated second.
    #[arg(long, value_name = "SECONDS")]
    resume_at: Option<f32>,
    /// Debug hook fired once during the run.
    #[command(subcommand)]
    hook: Option<Hook>,
}

#[derive(Clone, Debug, Subcommand)]
enum Hook {
    /// Spawns common actors at common spawn points.
    SpawnCommons {
        /// Number of actors to spawn.
        count: u32,
        /// Simulated second at which the hook fires.
        #[arg(long, default_value_t = 0.0)]
        at: f32,
    },
    /// Spawns one actor of the named species.
    SpawnSpecies {
        /// Species name, e.g. `hunter`.
        #[arg(value_parser = parse_species)]
        species: Species,
        /// Explicit position; a spawn point is used when omitted.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        position: Option<Vec<f32>>,
        /// Simulated second at which the hook fires.
        #[arg(long, default_value_t = 0.0)]
        at: f32,
    },
    /// Removes every actor.
    KillAll {
        /// Simulated second at which the hook fires.
        #[arg(long, default_value_t = 0.0)]
        at: f32,
    },
    /// Restores a character to full health.
    HealPlayer {
        /// Identifier of the character.
        player: u32,
        /// Simulated second at which the hook fires.
        #[arg(long, default_value_t = 0.0)]
        at: f32,
    },
}

impl Hook {
    fn at(&self) -> f32 {
        match self {
            Self::SpawnCommons { at, .. }
            | Self::SpawnSpecies { at, .. }
            | Self::KillAll { at }
            | Self::HealPlayer { at, .. } => *at,
        }
    }

    fn fire(&self, encounter: &mut Encounter<Party, TracingSink>) -> Result<()> {
        match self {
            Self::SpawnCommons { count, .. } => {
                let spawned = encounter.spawn_commons(*count);
                println!("spawned {} of {count} common actors", spawned.len());
            }
            Self::SpawnSpecies {
                species, position, ..
            } => {
                let position = match position.as_deref() {
                    Some(&[x, y, z]) => Some(Vec3::new(x, y, z)),
                    Some(other) => bail!("--position expects 3 values, got {}", other.len()),
                    None => None,
                };
                match encounter.spawn_species(*species, position) {
                    Some(actor) => println!("spawned {} #{}", species.name(), actor.get()),
                    None => println!("could not spawn {}", species.name()),
                }
            }
            Self::KillAll { .. } => {
                let removed = encounter.kill_all();
                println!("removed {removed} actors");
            }
            Self::HealPlayer { player, .. } => {
                if !encounter.heal_player(PlayerId::new(*player)) {
                    bail!("no character with id {player}");
                }
                println!("healed character {player}");
            }
        }
        Ok(())
    }
}

fn parse_species(name: &str) -> Result<Species, String> {
    Species::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Species::ALL.iter().map(|species| species.name()).collect();
        format!("unknown species `{name}`; expected one of {}", known.join(", "))
    })
}

fn seconds(value: f32, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f32(value)
        .with_context(|| format!("{flag} must be a non-negative number of seconds"))
}

fn load_config(cli: &Cli) -> Result<EncounterConfig> {
    let mut config = match &cli.config {
        Some(path) => EncounterConfig::load(path)
            .with_context(|| format!("failed to load encounter layout {}", path.display()))?,
        None => EncounterConfig::from_toml_str(DEMO_LAYOUT)
            .context("bundled demo layout is invalid")?,
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Runs the encounter described by `cli` and returns it for reporting.
fn run(cli: &Cli) -> Result<Encounter<Party, TracingSink>> {
    let config = load_config(cli)?;
    let mut encounter = Encounter::new(&config, config.party(), TracingSink)
        .context("failed to build encounter")?;

    let total = seconds(cli.seconds, "--seconds")?;
    let frame = Duration::from_millis(cli.frame_ms.max(1));
    let pause_at = cli.pause_at.map(|at| seconds(at, "--pause-at")).transpose()?;
    let resume_at = cli.resume_at.map(|at| seconds(at, "--resume-at")).transpose()?;
    let mut hook = match &cli.hook {
        Some(hook) => Some((seconds(hook.at(), "--at")?, hook)),
        None => None,
    };

    while encounter.now() < total {
        let now = encounter.now();
        if pause_at.is_some_and(|at| now >= at) && !resume_at.is_some_and(|at| now >= at) {
            encounter.pause_spawning();
        } else if resume_at.is_some_and(|at| now >= at) {
            encounter.resume_spawning();
        }
        if hook.is_some_and(|(at, _)| at <= now) {
            if let Some((_, pending)) = hook.take() {
                pending.fire(&mut encounter)?;
            }
        }
        let _ = encounter.advance(frame);
    }
    // Hooks scheduled past the end of the run fire once it completes.
    if let Some((_, pending)) = hook {
        pending.fire(&mut encounter)?;
    }
    Ok(encounter)
}

fn report(encounter: &Encounter<Party, TracingSink>) {
    let director = encounter.director();
    let active = query::active_counts(encounter.world());
    println!("steps: {}", encounter.steps());
    println!("simulated: {:.2}s", encounter.now().as_secs_f32());
    println!(
        "phase: {} (intensity {:.1})",
        director.phase().name(),
        director.intensity()
    );
    for species in Species::ALL {
        let count = active.get(species);
        if count > 0 {
            println!("{}: {count}", species.name());
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Entry point for the horde command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let encounter = run(&cli)?;
    info!(steps = encounter.steps(), "encounter finished");
    report(&encounter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("horde").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn bundled_layout_is_valid() {
        let config = EncounterConfig::from_toml_str(DEMO_LAYOUT).expect("demo layout");
        assert_eq!(config.players.len(), 4);
        assert!(!config.spawn_points.is_empty());
    }

    #[test]
    fn species_hook_parses_position() {
        let parsed = cli(&[
            "--seconds",
            "1",
            "spawn-species",
            "charger",
            "--position",
            "-4",
            "0",
            "12",
            "--at",
            "0.5",
        ]);
        match parsed.hook {
            Some(Hook::SpawnSpecies {
                species,
                position,
                at,
            }) => {
                assert_eq!(species, Species::Charger);
                assert_eq!(position, Some(vec![-4.0, 0.0, 12.0]));
                assert_eq!(at, 0.5);
            }
            other => panic!("unexpected hook {other:?}"),
        }
    }

    #[test]
    fn unknown_species_is_a_usage_error() {
        let result = Cli::try_parse_from(["horde", "spawn-species", "jockey"]);
        assert!(result.is_err());
    }

    #[test]
    fn hooks_fire_during_the_run() {
        let parsed = cli(&["--seconds", "1", "spawn-commons", "4", "--at", "0.2"]);
        let encounter = run(&parsed).expect("run");
        assert!(encounter.now() >= Duration::from_secs(1));
        assert!(query::active_counts(encounter.world()).get(Species::Common) >= 4);
    }

    #[test]
    fn late_hooks_fire_after_the_run() {
        let parsed = cli(&["--seconds", "2", "kill-all", "--at", "100"]);
        let encounter = run(&parsed).expect("run");
        assert!(encounter.now() >= Duration::from_secs(2));
        assert!(query::actor_ids(encounter.world()).is_empty());
    }

    #[test]
    fn paused_run_spawns_nothing() {
        let parsed = cli(&["--seconds", "3", "--pause-at", "0"]);
        let encounter = run(&parsed).expect("run");
        assert!(encounter.director().is_paused());
        assert_eq!(query::active_counts(encounter.world()).total(), 0);
    }

    #[test]
    fn healing_an_unknown_character_fails() {
        let parsed = cli(&["--seconds", "0.1", "heal-player", "99"]);
        assert!(run(&parsed).is_err());
    }
}

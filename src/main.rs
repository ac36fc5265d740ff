use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tank_tactics::config::TacticsConfig;
use tank_tactics::game::constants::sim;
use tank_tactics::game::game_loop::{GameLoop, GameLoopConfig};
use tank_tactics::game::kinematics::Kinematics;
use tank_tactics::game::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "tank-tactics", version)]
#[command(about = "Run enemy tank and turret AI headless against a scenario")]
struct Cli {
    /// Scenario JSON file; the built-in demo arena when omitted
    #[arg(env = "SCENARIO_PATH")]
    scenario: Option<PathBuf>,

    /// Ticks to simulate, overriding the scenario's own count
    #[arg(short, long, env = "SIM_TICKS", value_parser = clap::value_parser!(u64).range(1..))]
    ticks: Option<u64>,

    /// Write every tick report to stdout as a JSON line
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging, RUST_LOG overrides the default level. Logs go to
    // stderr so --json output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Tank Tactics v{}", env!("CARGO_PKG_VERSION"));

    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::load(path).with_context(|| format!("loading scenario {}", path.display()))?,
        None => {
            info!("No scenario given, running the built-in demo");
            Scenario::demo()
        }
    };

    // TACTICS_CONFIG replaces the scenario's config; scalar overrides apply either way
    if std::env::var("TACTICS_CONFIG").is_ok() {
        scenario.config = TacticsConfig::load_or_default();
    } else {
        scenario.config.apply_env_overrides();
    }
    scenario.config.validate().context("invalid tactics configuration")?;

    let ticks = cli.ticks.unwrap_or(scenario.ticks);
    let simulation = scenario.build().context("building simulation")?;
    info!(
        "Scenario ready: {} colliders, {} enemies, {} turrets, seed={}",
        simulation.world.len(),
        simulation.enemies.len(),
        simulation.turrets.len(),
        scenario.seed
    );

    let mut game_loop = GameLoop::new(simulation, GameLoopConfig::default());
    info!("Running {} ticks at {} Hz", ticks, sim::TICK_RATE);
    let summary = if cli.json {
        let mut out = std::io::BufWriter::new(std::io::stdout().lock());
        let mut failure = None;
        let summary = game_loop.run_with(ticks, |report| {
            if failure.is_some() {
                return;
            }
            let written = serde_json::to_writer(&mut out, report)
                .map_err(anyhow::Error::from)
                .and_then(|()| writeln!(out).map_err(anyhow::Error::from));
            if let Err(e) = written {
                failure = Some(e);
            }
        });
        if let Some(e) = failure {
            return Err(e.context("writing tick reports"));
        }
        out.flush().context("writing tick reports")?;
        summary
    } else {
        game_loop.run(ticks)
    };

    info!(
        "Ran {} ticks: {} mode changes, {} turret transitions, {} shots fired",
        summary.ticks, summary.mode_changes, summary.turret_transitions, summary.shots_fired
    );

    let state = game_loop.state();
    for enemy in state.enemies_in_order() {
        let position = enemy.body.position();
        info!(
            "Enemy {} at ({:.2}, {:.2}) heading {:.1}, mode {:?}",
            enemy.id,
            position.x,
            position.z,
            enemy.body.heading(),
            enemy.controller.brain().mode()
        );
    }
    for turret in state.turrets_in_order() {
        info!(
            "Turret {} heading {:.1}, {:?}, {} shots",
            turret.id,
            turret.body.heading(),
            turret.ai.state(),
            turret.weapon.fired
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["tank-tactics", "arena.json", "--ticks", "42", "--json"]).unwrap();
        assert_eq!(cli.scenario, Some(PathBuf::from("arena.json")));
        assert_eq!(cli.ticks, Some(42));
        assert!(cli.json);

        let cli = Cli::try_parse_from(["tank-tactics", "-t", "7"]).unwrap();
        assert_eq!(cli.ticks, Some(7));
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_rejects_bad_ticks() {
        for bad in ["0", "-3", "many"] {
            assert!(Cli::try_parse_from(["tank-tactics", "--ticks", bad]).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_help_prints_usage() {
        let err = Cli::try_parse_from(["tank-tactics", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        let help = err.to_string();
        assert!(help.contains("Usage"));
        assert!(help.contains("--ticks"));
        assert!(help.contains("SCENARIO_PATH"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

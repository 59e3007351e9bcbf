#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for lane defence sessions.
//!
//! Plays one campaign or custom level by replaying a defense plan against
//! the simulation at a fixed timestep, printing the result and recording
//! campaign progress. Plans can also be encoded to and decoded from
//! shareable transfer strings without running a session.

mod plan;
mod plan_transfer;
mod runner;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use lane_defence_core::level::{LevelConfig, RawLevel};
use lane_defence_core::{LevelId, SessionReport};
use lane_defence_persistence::ProgressStore;
use lane_defence_session::SessionController;
use lane_defence_world::query;

use crate::plan::DefensePlan;
use crate::runner::{run, RunConfig, RunEnd};

/// Identifier custom levels run under; sessions on it are never recorded.
const CUSTOM_LEVEL: LevelId = LevelId::new(0);

#[derive(Debug, Parser)]
#[command(name = "lane-defence")]
#[command(about = "Headless lane defence simulator", version)]
struct Args {
    /// Campaign level to play (defaults to the furthest unlocked level)
    #[arg(long, conflicts_with = "level_file")]
    level: Option<u32>,

    /// Play a custom level definition in JSON form instead of the campaign
    #[arg(long, value_name = "PATH")]
    level_file: Option<PathBuf>,

    /// Defense plan to replay, in TOML form
    #[arg(long, value_name = "PATH", conflicts_with = "plan_string")]
    plan: Option<PathBuf>,

    /// Defense plan to replay, as a transfer string
    #[arg(long, value_name = "STRING")]
    plan_string: Option<String>,

    /// Seed for the session's resource drop schedule
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated seconds after which an undecided session stops
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,

    /// File holding campaign progress and statistics
    #[arg(long, value_name = "PATH", default_value = "lane-defence-save.json")]
    save_file: PathBuf,

    /// Run without reading or writing the save file
    #[arg(long)]
    no_save: bool,

    /// Discard saved progress and statistics, then exit
    #[arg(long)]
    reset_progress: bool,

    /// Encode the plan at PATH into a transfer string, then exit
    #[arg(long, value_name = "PATH")]
    encode_plan: Option<PathBuf>,

    /// Decode STRING back into plan TOML, then exit
    #[arg(long, value_name = "STRING")]
    decode_plan: Option<String>,
}

/// Entry point for the lane defence command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
    let args = Args::parse();

    if let Some(path) = &args.encode_plan {
        let plan = load_plan_file(path)?;
        println!("{}", plan_transfer::encode(&plan));
        return Ok(());
    }
    if let Some(transfer) = &args.decode_plan {
        let plan = plan_transfer::decode(transfer).context("transfer string did not decode")?;
        print!("{}", plan.to_toml());
        return Ok(());
    }

    let mut store = if args.no_save {
        ProgressStore::in_memory()
    } else {
        ProgressStore::open(&args.save_file)
    };

    if args.reset_progress {
        store.reset();
        println!("progress reset");
        return Ok(());
    }

    let plan = load_plan(&args)?;
    let (level_id, level) = select_level(&args, &store)?;

    log::info!("playing '{}' with seed {}", level.name, args.seed);
    if let Some(name) = &plan.name {
        log::info!("replaying plan '{name}'");
    }

    let mut controller = SessionController::new(level_id, level, args.seed);
    let config = RunConfig {
        time_cap: Duration::from_secs(args.max_seconds),
        ..RunConfig::default()
    };

    match run(&mut controller, &plan, &config) {
        RunEnd::Finished(report) => {
            print_report(&report, &controller);
            if level_id != CUSTOM_LEVEL {
                store.record_session(&report);
            }
        }
        RunEnd::CapReached(elapsed) => {
            println!(
                "undecided after {:.1}s of simulated time, stopping",
                elapsed.as_secs_f32()
            );
        }
    }
    Ok(())
}

/// Resolves the plan to replay from the provided arguments.
fn load_plan(args: &Args) -> Result<DefensePlan> {
    if let Some(path) = &args.plan {
        return load_plan_file(path);
    }
    if let Some(transfer) = &args.plan_string {
        return plan_transfer::decode(transfer).context("plan transfer string did not decode");
    }
    Ok(DefensePlan::default())
}

fn load_plan_file(path: &Path) -> Result<DefensePlan> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file {}", path.display()))?;
    DefensePlan::from_toml(&text)
        .with_context(|| format!("plan file {} is not a valid defense plan", path.display()))
}

/// Resolves the level to play: a custom file, an explicit campaign pick, or
/// the furthest unlocked campaign level.
fn select_level(args: &Args, store: &ProgressStore) -> Result<(LevelId, LevelConfig)> {
    if let Some(path) = &args.level_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read level file {}", path.display()))?;
        let raw: RawLevel = serde_json::from_str(&text)
            .with_context(|| format!("level file {} is not valid JSON", path.display()))?;
        let level = LevelConfig::from_raw(raw)
            .with_context(|| format!("level file {} is not playable", path.display()))?;
        return Ok((CUSTOM_LEVEL, level));
    }

    let id = args.level.map_or_else(|| store.current_level(), LevelId::new);
    let level = lane_defence_content::level(id)
        .with_context(|| format!("campaign level {} failed to load", id.get()))?;
    if !store.is_unlocked(id) {
        bail!(
            "campaign level {} is locked, complete level {} first",
            id.get(),
            id.get().saturating_sub(1),
        );
    }
    Ok((id, level))
}

fn print_report(report: &SessionReport, controller: &SessionController) {
    println!("outcome: {:?}", report.outcome);
    println!("level: {}", controller.level().name);
    println!("duration: {:.1}s", report.duration.as_secs_f32());
    println!("attackers defeated: {}", report.attackers_defeated);
    println!("defenders lost: {}", report.defenders_lost);
    println!("resources left: {}", query::resources(controller.world()));
}

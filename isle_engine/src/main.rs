use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use isle_engine::scenario::{run_frames, Scenario, ScenarioReport};
use isle_engine::state::GameState;
use isle_engine::tickle::DEFAULT_TICKLE_INTERVAL_MS;
use isle_engine::{IsleContext, World};
use isle_formats::StateFile;
use serde::Serialize;

mod cli;
use cli::{Command, RunArgs};

#[derive(Serialize)]
struct EventLog<'a> {
    world: &'a str,
    events: &'a [String],
}

fn main() -> Result<()> {
    env_logger::init();

    match cli::parse()? {
        Command::DumpSave(path) => dump_save(&path),
        Command::Run(args) => run(args),
    }
}

fn dump_save(path: &Path) -> Result<()> {
    let mut file = StateFile::open(path)?;
    let mut game_state = GameState::new();
    game_state
        .serialize(&mut file)
        .with_context(|| format!("decoding save {}", path.display()))?;
    let json = serde_json::to_string_pretty(&game_state.to_json())
        .context("serializing save contents to JSON")?;
    println!("{json}");
    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    let mut ctx = IsleContext::new();
    if let Some(path) = args.load.as_ref() {
        let mut file = StateFile::open(path)?;
        ctx.game_state
            .serialize(&mut file)
            .with_context(|| format!("restoring mission state from {}", path.display()))?;
        println!("Restored {} states from {}", ctx.game_state.len(), path.display());
    }

    let scenario = match args.scenario.as_ref() {
        Some(path) => Some(Scenario::from_json_file(path)?),
        None => None,
    };
    let world_name = scenario
        .as_ref()
        .map(|scenario| scenario.world.clone())
        .unwrap_or_else(|| "ISLE".to_string());
    let mut world = World::new(world_name);
    world.set_trace_tickles(args.trace_tickles);

    let mut report = match scenario.as_ref() {
        Some(scenario) => scenario.run(&mut ctx, &mut world)?,
        None => ScenarioReport::default(),
    };

    if args.frames > 0 {
        let frame_ms = args
            .frame_ms
            .or_else(|| scenario.as_ref().map(|scenario| scenario.frame_ms))
            .unwrap_or(u64::from(DEFAULT_TICKLE_INTERVAL_MS));
        run_frames(&mut ctx, &mut world, &mut report.clock_ms, frame_ms, args.frames);
        report.frames = report.frames.saturating_add(args.frames);
    }

    describe_run(&report, &ctx, args.verbose);

    if let Some(path) = args.events_json.as_ref() {
        persist_events(path, &world)?;
    }

    if let Some(path) = args.save.as_ref() {
        let mut file = StateFile::writer();
        ctx.game_state
            .serialize(&mut file)
            .context("encoding mission state")?;
        file.save(path)?;
        println!("Saved mission state to {}", path.display());
    }

    world.teardown(&mut ctx);
    Ok(())
}

fn describe_run(report: &ScenarioReport, ctx: &IsleContext, verbose: bool) {
    println!(
        "Actors created: {} | failed: {} | frames: {} ({} ms)",
        report.created.len(),
        report.failed.len(),
        report.frames,
        report.clock_ms
    );
    for actor in &report.created {
        println!("  - {:<12} {:<10} {}", actor.label, actor.class, actor.id);
    }
    if verbose {
        for step in &report.steps {
            match step.result {
                Some(result) => println!("  {:>2}. {} => {result}", step.index, step.summary),
                None => println!("  {:>2}. {}", step.index, step.summary),
            }
        }
    }
    let tags: Vec<&str> = ctx.game_state.tags().collect();
    println!(
        "Game state: actor {} | states [{}]",
        ctx.game_state.actor_id(),
        tags.join(", ")
    );
}

fn persist_events(path: &Path, world: &World) -> Result<()> {
    let log = EventLog {
        world: world.name(),
        events: world.events(),
    };
    let json =
        serde_json::to_string_pretty(&log).context("serializing event log to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing event log to {}", path.display()))?;
    println!("Saved event log to {}", path.display());
    Ok(())
}

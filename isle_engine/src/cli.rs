use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Drives island actors through a scripted session and persists their mission state",
    version
)]
pub struct Args {
    /// JSON scenario describing actors to create and steps to run
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Save file to restore before the scenario runs
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Path to write the mission state after the run
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Print a save file as JSON and exit
    #[arg(long, value_name = "SAVE")]
    pub dump_save: Option<PathBuf>,

    /// Extra tickle frames to run after the scenario
    #[arg(long, default_value_t = 0)]
    pub frames: u32,

    /// Milliseconds per frame for --frames (defaults to the scenario's value)
    #[arg(long)]
    pub frame_ms: Option<u64>,

    /// Path to write the world event log as JSON
    #[arg(long)]
    pub events_json: Option<PathBuf>,

    /// Record every delivered tickle in the event log
    #[arg(long)]
    pub trace_tickles: bool,

    /// Print every step outcome instead of the compact summary
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub enum Command {
    DumpSave(PathBuf),
    Run(RunArgs),
}

#[derive(Debug)]
pub struct RunArgs {
    pub scenario: Option<PathBuf>,
    pub load: Option<PathBuf>,
    pub save: Option<PathBuf>,
    pub frames: u32,
    pub frame_ms: Option<u64>,
    pub events_json: Option<PathBuf>,
    pub trace_tickles: bool,
    pub verbose: bool,
}

pub fn parse() -> Result<Command> {
    let args = Args::parse();
    args.into_command()
}

impl Args {
    fn into_command(self) -> Result<Command> {
        if let Some(path) = self.dump_save {
            if self.scenario.is_some() || self.load.is_some() || self.save.is_some() {
                bail!("--dump-save cannot be combined with --scenario, --load or --save");
            }
            return Ok(Command::DumpSave(path));
        }

        if self.frame_ms == Some(0) {
            bail!("--frame-ms must be greater than zero");
        }

        Ok(Command::Run(RunArgs {
            scenario: self.scenario,
            load: self.load,
            save: self.save,
            frames: self.frames,
            frame_ms: self.frame_ms,
            events_json: self.events_json,
            trace_tickles: self.trace_tickles,
            verbose: self.verbose,
        }))
    }
}

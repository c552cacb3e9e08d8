use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::action::ScriptedAction;
use crate::actors::ActorClass;
use crate::context::IsleContext;
use crate::notify::Notification;
use crate::tickle::DEFAULT_TICKLE_INTERVAL_MS;
use crate::world::{ActorId, World};

/// Scripted session used by the CLI and regression tests: which actors to
/// load and what happens to them, in order.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub actor_id: Option<u8>,
    #[serde(default = "default_world")]
    pub world: String,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default)]
    pub actors: Vec<ActorSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_world() -> String {
    "ISLE".to_string()
}

fn default_frame_ms() -> u64 {
    u64::from(DEFAULT_TICKLE_INTERVAL_MS)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActorSpec {
    pub label: String,
    pub class: ActorClass,
    pub action: ScriptedAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Frames {
        count: u32,
    },
    Focus {
        actor: String,
    },
    /// Without `actor` the notification goes to the focused actor.
    Notify {
        #[serde(default)]
        actor: Option<String>,
        notification: Notification,
    },
    EnterMission {
        actor: String,
        object_id: u32,
    },
    Destroy {
        actor: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedActor {
    pub label: String,
    pub class: ActorClass,
    pub id: ActorId,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub summary: String,
    pub result: Option<i32>,
}

#[derive(Debug, Default, Serialize)]
pub struct ScenarioReport {
    pub created: Vec<CreatedActor>,
    pub failed: Vec<String>,
    pub steps: Vec<StepOutcome>,
    pub frames: u32,
    pub clock_ms: u64,
}

impl Scenario {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(raw)?;
        if scenario.frame_ms == 0 {
            bail!("scenario frame_ms must be greater than zero");
        }
        Ok(scenario)
    }

    pub fn run(&self, ctx: &mut IsleContext, world: &mut World) -> Result<ScenarioReport> {
        if let Some(actor_id) = self.actor_id {
            ctx.game_state.set_actor_id(actor_id);
        }

        let mut report = ScenarioReport::default();
        let mut labels: BTreeMap<String, ActorId> = BTreeMap::new();

        for spec in &self.actors {
            match world.create_actor(ctx, spec.class, &spec.action) {
                Ok(id) => {
                    labels.insert(spec.label.clone(), id);
                    report.created.push(CreatedActor {
                        label: spec.label.clone(),
                        class: spec.class,
                        id,
                    });
                }
                Err(err) => {
                    warn!("[scenario] {} not created: {err}", spec.label);
                    report.failed.push(spec.label.clone());
                }
            }
        }

        let lookup = |labels: &BTreeMap<String, ActorId>, label: &str| {
            labels
                .get(label)
                .copied()
                .ok_or_else(|| anyhow!("scenario refers to unknown actor `{label}`"))
        };

        for (index, step) in self.steps.iter().enumerate() {
            let outcome = match step {
                Step::Frames { count } => {
                    let tickled =
                        run_frames(ctx, world, &mut report.clock_ms, self.frame_ms, *count);
                    report.frames = report.frames.saturating_add(*count);
                    StepOutcome {
                        index,
                        summary: format!("ran {count} frames ({tickled} tickles)"),
                        result: None,
                    }
                }
                Step::Focus { actor } => {
                    let id = lookup(&labels, actor)?;
                    let focused = world.set_focus(id);
                    StepOutcome {
                        index,
                        summary: format!("focus {actor}"),
                        result: Some(i32::from(focused)),
                    }
                }
                Step::Notify {
                    actor,
                    notification,
                } => {
                    let result = match actor {
                        Some(label) => {
                            let id = lookup(&labels, label)?;
                            world.notify(ctx, id, notification)
                        }
                        None => Some(world.dispatch(ctx, notification)),
                    };
                    StepOutcome {
                        index,
                        summary: format!(
                            "{} -> {}",
                            notification.kind(),
                            actor.as_deref().unwrap_or("<focus>")
                        ),
                        result: result.map(|result| result.0),
                    }
                }
                Step::EnterMission { actor, object_id } => {
                    let id = lookup(&labels, actor)?;
                    world
                        .enter_mission(ctx, id, *object_id)
                        .with_context(|| format!("entering mission for {actor}"))?;
                    StepOutcome {
                        index,
                        summary: format!("{actor} entered mission {object_id}"),
                        result: None,
                    }
                }
                Step::Destroy { actor } => {
                    let id = lookup(&labels, actor)?;
                    let destroyed = world.destroy_actor(ctx, id);
                    StepOutcome {
                        index,
                        summary: format!("destroy {actor}"),
                        result: Some(i32::from(destroyed)),
                    }
                }
            };
            report.steps.push(outcome);
        }

        Ok(report)
    }
}

/// Advance the clock by `count` frames, running a tickle pass after each.
/// Returns the total number of tickles delivered.
pub fn run_frames(
    ctx: &mut IsleContext,
    world: &mut World,
    clock_ms: &mut u64,
    frame_ms: u64,
    count: u32,
) -> usize {
    let mut tickled = 0;
    for _ in 0..count {
        *clock_ms = clock_ms.saturating_add(frame_ms);
        tickled += world.run_frame(ctx, *clock_ms);
    }
    tickled
}

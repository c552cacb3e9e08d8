use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::action::ScriptedAction;
use crate::actors::{Actor, ActorClass, Lifecycle};
use crate::context::IsleContext;
use crate::error::{CreateError, MissionError};
use crate::notify::{Notification, NotifyResult};

/// Generational index into a [`World`]. A destroyed actor's id never
/// resolves again, even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        ActorId { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Occupant {
    actor: Actor,
    created_seq: u64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    occupant: Option<Occupant>,
}

/// Arena of live actors for one loaded world, plus the focus used for
/// routing notifications.
#[derive(Debug)]
pub struct World {
    name: String,
    slots: Vec<Slot>,
    focus: Option<ActorId>,
    next_seq: u64,
    events: Vec<String>,
    trace_tickles: bool,
}

impl World {
    pub fn new(name: impl Into<String>) -> Self {
        World {
            name: name.into(),
            slots: Vec::new(),
            focus: None,
            next_seq: 0,
            events: Vec::new(),
            trace_tickles: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn log(&mut self, message: String) {
        self.events.push(message);
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Also record one event per delivered tickle. Off by default since a
    /// long run would otherwise grow the log every frame.
    pub fn set_trace_tickles(&mut self, enabled: bool) {
        self.trace_tickles = enabled;
    }

    pub fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    /// Build an actor from `action`, place it in the world and register it
    /// for tickles. Nothing is inserted or registered if creation fails.
    pub fn create_actor(
        &mut self,
        ctx: &mut IsleContext,
        class: ActorClass,
        action: &ScriptedAction,
    ) -> Result<ActorId, CreateError> {
        let mut actor = Actor::new(class);
        if let Err(err) = actor.create(ctx, self, action) {
            warn!("[world] {class} {} failed to create: {err}", action.object_id);
            self.log(format!("actor.{class}.create_failed {}", action.object_id));
            return Err(err);
        }

        let id = self.insert(actor);
        ctx.tickle.register_client(id, class.tickle_interval());
        if let Some(actor) = self.get_mut(id) {
            actor.base_mut().activate(id);
        }
        info!("[world] {class} {} created as {id}", action.object_name);
        self.log(format!("actor.{id}.create {class} {}", action.object_name));
        Ok(id)
    }

    fn insert(&mut self, actor: Actor) -> ActorId {
        let occupant = Occupant {
            actor,
            created_seq: self.next_seq,
        };
        self.next_seq += 1;

        if let Some(index) = self.slots.iter().position(|slot| slot.occupant.is_none()) {
            let slot = &mut self.slots[index];
            slot.occupant = Some(occupant);
            return ActorId::new(index as u32, slot.generation);
        }
        self.slots.push(Slot {
            generation: 0,
            occupant: Some(occupant),
        });
        ActorId::new((self.slots.len() - 1) as u32, 0)
    }

    /// Unregister `id` from the scheduler, then drop it. Destroying a dead
    /// or unknown id is a no-op.
    pub fn destroy_actor(&mut self, ctx: &mut IsleContext, id: ActorId) -> bool {
        if self.occupant(id).is_none() {
            return false;
        }
        ctx.tickle.unregister_client(id);

        let slot = &mut self.slots[id.index as usize];
        slot.occupant = None;
        slot.generation = slot.generation.wrapping_add(1);

        if self.focus == Some(id) {
            self.focus = None;
        }
        debug!("[world] destroyed {id}");
        self.log(format!("actor.{id}.destroy"));
        true
    }

    /// Destroy every live actor, newest first.
    pub fn teardown(&mut self, ctx: &mut IsleContext) {
        let mut live: Vec<(u64, ActorId)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.occupant.as_ref().map(|occupant| {
                    (
                        occupant.created_seq,
                        ActorId::new(index as u32, slot.generation),
                    )
                })
            })
            .collect();
        live.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, id) in live {
            self.destroy_actor(ctx, id);
        }
    }

    fn occupant(&self, id: ActorId) -> Option<&Occupant> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.occupant.as_ref()
    }

    fn occupant_mut(&mut self, id: ActorId) -> Option<&mut Occupant> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.occupant.as_mut()
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.occupant(id).map(|occupant| &occupant.actor)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.occupant_mut(id).map(|occupant| &mut occupant.actor)
    }

    /// Lifecycle of `id`; ids whose slot has moved on report `Destroyed`.
    pub fn lifecycle(&self, id: ActorId) -> Option<Lifecycle> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation > id.generation {
            return Some(Lifecycle::Destroyed);
        }
        self.get(id).map(Actor::lifecycle)
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.occupant(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.occupant.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.occupant
                .as_ref()
                .map(|_| ActorId::new(index as u32, slot.generation))
        })
    }

    /// Find a live actor by object name among those loaded from `owner`.
    pub fn find(&self, owner: &str, name: &str) -> Option<ActorId> {
        self.actor_ids().find(|id| {
            self.get(*id).is_some_and(|actor| {
                let base = actor.base();
                base.atom_id.eq_ignore_ascii_case(owner) && base.name.eq_ignore_ascii_case(name)
            })
        })
    }

    pub fn set_focus(&mut self, id: ActorId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.focus = Some(id);
        self.log(format!("actor.{id}.focus"));
        true
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    pub fn focus(&self) -> Option<ActorId> {
        self.focus
    }

    /// Deliver `notification` to the focused actor.
    pub fn dispatch(&mut self, ctx: &mut IsleContext, notification: &Notification) -> NotifyResult {
        match self.focus {
            Some(id) => self.notify(ctx, id, notification).unwrap_or(NotifyResult::UNHANDLED),
            None => {
                debug!("[world] no focused actor for {}", notification.kind());
                NotifyResult::UNHANDLED
            }
        }
    }

    /// Deliver `notification` to a specific actor. Returns `None` when the
    /// actor is no longer alive.
    pub fn notify(
        &mut self,
        ctx: &mut IsleContext,
        id: ActorId,
        notification: &Notification,
    ) -> Option<NotifyResult> {
        let Some(occupant) = self.occupant_mut(id) else {
            warn!("[world] dropped {} for dead actor {id}", notification.kind());
            return None;
        };
        let result = occupant.actor.notify(ctx, notification);
        if matches!(notification, Notification::Tickle) && !self.trace_tickles {
            return Some(result);
        }
        self.log(format!(
            "actor.{id}.{} -> {}",
            notification.kind(),
            result.0
        ));
        Some(result)
    }

    /// Run one cooperative tickle pass at time `now` (milliseconds).
    /// Returns how many actors were tickled.
    pub fn run_frame(&mut self, ctx: &mut IsleContext, now: u64) -> usize {
        let due = ctx.tickle.begin_pass(now);
        let mut tickled = 0;
        for id in due {
            if !ctx.tickle.is_registered(id) {
                continue;
            }
            if self.notify(ctx, id, &Notification::Tickle).is_some() {
                tickled += 1;
            }
        }
        ctx.tickle.end_pass();
        tickled
    }

    pub fn enter_mission(
        &mut self,
        ctx: &mut IsleContext,
        id: ActorId,
        object_id: u32,
    ) -> Result<(), MissionError> {
        let actor = self.get_mut(id).ok_or(MissionError::ActorNotFound(id))?;
        actor.enter_mission(id, ctx, object_id)?;
        self.log(format!("actor.{id}.enter_mission {object_id}"));
        Ok(())
    }
}

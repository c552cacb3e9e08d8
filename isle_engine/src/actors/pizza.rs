use log::{debug, info};

use super::IsleActor;
use crate::action::ScriptedAction;
use crate::context::{IsleContext, IsleFlags};
use crate::error::{CreateError, MissionError};
use crate::notify::{
    Handler, HandlerTable, Notification, NotificationKind, NotificationTarget, NotifyResult,
};
use crate::state::act1::PIZZA_CHAPTER;
use crate::state::pizza_mission::{ENTRY_IN_PROGRESS, MISSION_RUNNING};
use crate::state::{Act1State, PizzaMissionState, StateHandle, StateType};
use crate::world::{ActorId, World};

pub const TICKLE_INTERVAL_MS: u32 = 10;

/// Name of the prop actor the pizza delivery rides on.
pub const SKATEBOARD_ACTOR: &str = "SkateBoard";

/// Marker for "no sub-task cached".
pub const NO_SUB_TASK: i32 = -1;

const PIZZA_HANDLER_ENTRIES: &[(NotificationKind, Handler<Pizza>)] = &[
    (NotificationKind::Click, Pizza::handle_click),
    (NotificationKind::PathStruct, Pizza::handle_path_struct),
    (NotificationKind::EndAction, Pizza::handle_end_action),
    (NotificationKind::Tickle, Pizza::tickle),
];

static PIZZA_HANDLERS: HandlerTable<Pizza> = HandlerTable::new(PIZZA_HANDLER_ENTRIES);

/// The pizza delivery actor. Mission records belong to the game state
/// registry; the actor only keeps handles to them.
#[derive(Debug)]
pub struct Pizza {
    base: IsleActor,
    state: Option<StateHandle>,
    entry: Option<u8>,
    skateboard: Option<ActorId>,
    act1_state: Option<StateHandle>,
    unknown_0x8c: i32,
    unknown_0x90: u32,
    unknown_0x98: u32,
}

impl Default for Pizza {
    fn default() -> Self {
        Self::new()
    }
}

impl Pizza {
    pub fn new() -> Self {
        Pizza {
            base: IsleActor::default(),
            state: None,
            entry: None,
            skateboard: None,
            act1_state: None,
            unknown_0x8c: NO_SUB_TASK,
            unknown_0x90: 0x8000_0000,
            unknown_0x98: 0,
        }
    }

    pub fn create(
        &mut self,
        ctx: &mut IsleContext,
        world: &World,
        action: &ScriptedAction,
    ) -> Result<(), CreateError> {
        let base = IsleActor::create(action)?;
        self.create_state(ctx)?;

        let companion = action.extra_value("companion").unwrap_or(SKATEBOARD_ACTOR);
        self.skateboard = world.find(&base.atom_id, companion);
        if self.skateboard.is_none() {
            debug!("[pizza] {} has no `{companion}` companion", base.name);
        }
        self.base = base;
        Ok(())
    }

    fn create_state(&mut self, ctx: &mut IsleContext) -> Result<(), CreateError> {
        let state = match ctx.game_state.get_state(PizzaMissionState::CLASS_NAME) {
            Some(handle) => handle,
            None => ctx.game_state.create_state(PizzaMissionState::CLASS_NAME)?,
        };

        let act1_state = match ctx.game_state.get_state(Act1State::CLASS_NAME) {
            Some(handle) => handle,
            None => ctx.game_state.create_state(Act1State::CLASS_NAME)?,
        };

        self.state = Some(state);
        self.act1_state = Some(act1_state);
        Ok(())
    }

    /// Start the delivery for the character the player is controlling.
    ///
    /// Every lookup happens before the first write, so a failure leaves the
    /// mission state, the act progress and the island switches untouched.
    pub fn enter_mission(
        &mut self,
        ctx: &mut IsleContext,
        object_id: u32,
    ) -> Result<(), MissionError> {
        let state = self
            .state
            .ok_or(MissionError::Unbound(PizzaMissionState::CLASS_NAME))?;
        let act1_state = self
            .act1_state
            .ok_or(MissionError::Unbound(Act1State::CLASS_NAME))?;
        let actor_id = ctx.game_state.actor_id();

        let has_entry = ctx
            .game_state
            .state::<PizzaMissionState>(state)
            .ok_or(MissionError::Unbound(PizzaMissionState::CLASS_NAME))?
            .entry(actor_id)
            .is_some();
        if !has_entry {
            return Err(MissionError::MissingEntry(actor_id));
        }
        if ctx.game_state.state::<Act1State>(act1_state).is_none() {
            return Err(MissionError::Unbound(Act1State::CLASS_NAME));
        }

        ctx.animation.clear_current_anim();

        if let Some(mission) = ctx.game_state.state_mut::<PizzaMissionState>(state) {
            mission.unknown_0x0c = MISSION_RUNNING;
            if let Some(entry) = mission.entry_mut(actor_id) {
                entry.unknown_0x10 = ENTRY_IN_PROGRESS;
            }
        }
        self.entry = Some(actor_id);
        if let Some(act1) = ctx.game_state.state_mut::<Act1State>(act1_state) {
            act1.chapter = PIZZA_CHAPTER;
        }

        ctx.isle_flags.remove(IsleFlags::PLAY_MUSIC);
        ctx.animation.enable_cam_anims(false);
        ctx.animation.enable_ambient_anims(false);
        self.play_action(object_id, false);
        self.unknown_0x8c = NO_SUB_TASK;

        info!("[pizza] mission started for actor id {actor_id}");
        Ok(())
    }

    // Placeholder: the delivery cutscenes are not modelled.
    fn play_action(&mut self, object_id: u32, _looping: bool) {
        debug!("[pizza] play action {object_id}");
    }

    fn handle_click(&mut self, _: &mut IsleContext, _: &Notification) -> NotifyResult {
        NotifyResult::UNHANDLED
    }

    fn handle_path_struct(&mut self, _: &mut IsleContext, _: &Notification) -> NotifyResult {
        NotifyResult::UNHANDLED
    }

    fn handle_end_action(&mut self, _: &mut IsleContext, _: &Notification) -> NotifyResult {
        NotifyResult::UNHANDLED
    }

    fn tickle(&mut self, _: &mut IsleContext, _: &Notification) -> NotifyResult {
        NotifyResult::UNHANDLED
    }

    pub fn base(&self) -> &IsleActor {
        &self.base
    }

    pub(crate) fn base_mut(&mut self) -> &mut IsleActor {
        &mut self.base
    }

    pub fn mission_state(&self) -> Option<StateHandle> {
        self.state
    }

    pub fn act1_state(&self) -> Option<StateHandle> {
        self.act1_state
    }

    /// Id of the mission entry bound by the last [`Pizza::enter_mission`].
    pub fn entry_id(&self) -> Option<u8> {
        self.entry
    }

    pub fn skateboard(&self) -> Option<ActorId> {
        self.skateboard
    }

    pub fn act_chapter(&self, ctx: &IsleContext) -> Option<u32> {
        self.act1_state
            .and_then(|handle| ctx.game_state.state::<Act1State>(handle))
            .map(|act1| act1.chapter)
    }

    pub fn unknown_0x8c(&self) -> i32 {
        self.unknown_0x8c
    }

    pub fn unknown_0x90(&self) -> u32 {
        self.unknown_0x90
    }

    pub fn unknown_0x98(&self) -> u32 {
        self.unknown_0x98
    }
}

impl NotificationTarget for Pizza {
    fn handlers() -> &'static HandlerTable<Self> {
        &PIZZA_HANDLERS
    }
}

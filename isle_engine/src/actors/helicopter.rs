use log::{debug, info};

use super::IsleActor;
use crate::action::ScriptedAction;
use crate::context::IsleContext;
use crate::error::CreateError;
use crate::notify::{
    Handler, HandlerTable, Notification, NotificationKind, NotificationTarget, NotifyResult,
};
use crate::state::{Act1State, HelicopterState, StateHandle, StateType};

pub const TICKLE_INTERVAL_MS: u32 = 20;

// Dashboard controls of the helicopter cockpit.
pub const TAKE_OFF_CONTROL: u32 = 0x1a;
pub const LAND_CONTROL: u32 = 0x1b;
pub const EXIT_CONTROL: u32 = 0x1c;

pub const TAKE_OFF_ANIM: u32 = 0x2a;
pub const LANDING_ANIM: u32 = 0x2b;

// Values of `HelicopterState::unknown_0x08`.
pub const GROUNDED: u32 = 0;
pub const TAKING_OFF: u32 = 1;
pub const AIRBORNE: u32 = 2;
pub const LANDING: u32 = 3;

const HELICOPTER_HANDLER_ENTRIES: &[(NotificationKind, Handler<Helicopter>)] = &[
    (NotificationKind::Click, Helicopter::handle_click),
    (NotificationKind::Control, Helicopter::handle_control),
    (NotificationKind::EndAnim, Helicopter::handle_end_anim),
    (NotificationKind::Tickle, Helicopter::tickle),
];

static HELICOPTER_HANDLERS: HandlerTable<Helicopter> =
    HandlerTable::new(HELICOPTER_HANDLER_ENTRIES);

#[derive(Debug, Default)]
pub struct Helicopter {
    base: IsleActor,
    state: Option<StateHandle>,
    act1_state: Option<StateHandle>,
    script: String,
    boarded: bool,
}

impl Helicopter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        ctx: &mut IsleContext,
        action: &ScriptedAction,
    ) -> Result<(), CreateError> {
        let base = IsleActor::create(action)?;
        self.create_state(ctx)?;
        self.script = base.atom_id.clone();
        self.base = base;
        Ok(())
    }

    fn create_state(&mut self, ctx: &mut IsleContext) -> Result<(), CreateError> {
        let state = match ctx.game_state.get_state(HelicopterState::CLASS_NAME) {
            Some(handle) => handle,
            None => ctx.game_state.create_state(HelicopterState::CLASS_NAME)?,
        };

        let act1_state = match ctx.game_state.get_state(Act1State::CLASS_NAME) {
            Some(handle) => handle,
            None => ctx.game_state.create_state(Act1State::CLASS_NAME)?,
        };

        self.state = Some(state);
        self.act1_state = Some(act1_state);
        Ok(())
    }

    /// Climb out of the cockpit. Only possible on the ground.
    pub fn exit(&mut self, ctx: &mut IsleContext) -> bool {
        if self.flight_status(ctx) != Some(GROUNDED) {
            return false;
        }
        self.boarded = false;
        ctx.animation.enable_cam_anims(true);
        info!("[helicopter] {} exited", self.base.name);
        true
    }

    fn handle_click(&mut self, ctx: &mut IsleContext, _: &Notification) -> NotifyResult {
        if !self.boarded {
            self.boarded = true;
            self.set_flight_status(ctx, GROUNDED);
            ctx.animation.enable_cam_anims(false);
            if let Some(id) = self.base.id() {
                ctx.tickle.register_client(id, TICKLE_INTERVAL_MS);
            }
            info!("[helicopter] {} boarded", self.base.name);
        }
        NotifyResult::HANDLED
    }

    /// An empty helicopter on the ground drops off the scheduler until
    /// someone boards it again.
    fn tickle(&mut self, ctx: &mut IsleContext, _: &Notification) -> NotifyResult {
        if self.boarded || self.flight_status(ctx) != Some(GROUNDED) {
            return NotifyResult::HANDLED;
        }
        if let Some(id) = self.base.id() {
            if ctx.tickle.unregister_client(id) {
                debug!("[helicopter] {} parked", self.base.name);
            }
        }
        NotifyResult::HANDLED
    }

    fn handle_control(
        &mut self,
        ctx: &mut IsleContext,
        notification: &Notification,
    ) -> NotifyResult {
        let Notification::Control(event) = notification else {
            return NotifyResult::UNHANDLED;
        };
        if !self.boarded {
            return NotifyResult::UNHANDLED;
        }

        let status = self.flight_status(ctx);
        match (event.control_id, status) {
            (TAKE_OFF_CONTROL, Some(GROUNDED)) => {
                self.set_flight_status(ctx, TAKING_OFF);
                ctx.animation.start_anim(TAKE_OFF_ANIM);
                NotifyResult::HANDLED
            }
            (LAND_CONTROL, Some(AIRBORNE)) => {
                self.set_flight_status(ctx, LANDING);
                ctx.animation.start_anim(LANDING_ANIM);
                NotifyResult::HANDLED
            }
            (EXIT_CONTROL, _) if self.exit(ctx) => NotifyResult::HANDLED,
            _ => {
                debug!(
                    "[helicopter] control {:#x} ignored in status {status:?}",
                    event.control_id
                );
                NotifyResult::UNHANDLED
            }
        }
    }

    fn handle_end_anim(
        &mut self,
        ctx: &mut IsleContext,
        notification: &Notification,
    ) -> NotifyResult {
        let Notification::EndAnim(event) = notification else {
            return NotifyResult::UNHANDLED;
        };
        let next = match (self.flight_status(ctx), event.anim) {
            (Some(TAKING_OFF), TAKE_OFF_ANIM) => AIRBORNE,
            (Some(LANDING), LANDING_ANIM) => GROUNDED,
            _ => return NotifyResult::UNHANDLED,
        };
        self.set_flight_status(ctx, next);
        ctx.animation.clear_current_anim();
        NotifyResult::HANDLED
    }

    fn set_flight_status(&self, ctx: &mut IsleContext, status: u32) {
        if let Some(state) = self
            .state
            .and_then(|handle| ctx.game_state.state_mut::<HelicopterState>(handle))
        {
            state.unknown_0x08 = status;
        }
    }

    pub fn flight_status(&self, ctx: &IsleContext) -> Option<u32> {
        self.state
            .and_then(|handle| ctx.game_state.state::<HelicopterState>(handle))
            .map(|state| state.unknown_0x08)
    }

    pub fn act_chapter(&self, ctx: &IsleContext) -> Option<u32> {
        self.act1_state
            .and_then(|handle| ctx.game_state.state::<Act1State>(handle))
            .map(|act1| act1.chapter)
    }

    pub fn base(&self) -> &IsleActor {
        &self.base
    }

    pub(crate) fn base_mut(&mut self) -> &mut IsleActor {
        &mut self.base
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn is_boarded(&self) -> bool {
        self.boarded
    }
}

impl NotificationTarget for Helicopter {
    fn handlers() -> &'static HandlerTable<Self> {
        &HELICOPTER_HANDLERS
    }
}

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::action::ScriptedAction;
use crate::context::IsleContext;
use crate::error::{CreateError, MissionError};
use crate::notify::{Capabilities, Notification, NotificationTarget, NotifyResult};
use crate::world::{ActorId, World};

pub mod helicopter;
pub mod pizza;

pub use helicopter::Helicopter;
pub use pizza::Pizza;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorClass {
    Pizza,
    Helicopter,
}

impl ActorClass {
    pub fn class_name(self) -> &'static str {
        match self {
            ActorClass::Pizza => "Pizza",
            ActorClass::Helicopter => "Helicopter",
        }
    }

    pub fn tickle_interval(self) -> u32 {
        match self {
            ActorClass::Pizza => pizza::TICKLE_INTERVAL_MS,
            ActorClass::Helicopter => helicopter::TICKLE_INTERVAL_MS,
        }
    }
}

impl FromStr for ActorClass {
    type Err = CreateError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Pizza" => Ok(ActorClass::Pizza),
            "Helicopter" => Ok(ActorClass::Helicopter),
            other => Err(CreateError::UnknownClass(other.to_string())),
        }
    }
}

impl fmt::Display for ActorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Created,
    Active,
    Destroyed,
}

/// Identity and placement shared by every island actor, resolved from the
/// scripted action before any actor-specific setup runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IsleActor {
    pub object_id: u32,
    pub name: String,
    pub atom_id: String,
    pub location: [f32; 3],
    pub direction: [f32; 3],
    pub up: [f32; 3],
    id: Option<ActorId>,
    lifecycle: Lifecycle,
}

impl IsleActor {
    pub fn create(action: &ScriptedAction) -> Result<Self, CreateError> {
        let missing = |field| CreateError::MissingDescriptorData {
            object_id: action.object_id,
            field,
        };
        if action.object_name.trim().is_empty() {
            return Err(missing("object name"));
        }
        if action.atom_id.trim().is_empty() {
            return Err(missing("atom id"));
        }
        let location = action.location.ok_or_else(|| missing("location"))?;

        Ok(IsleActor {
            object_id: action.object_id,
            name: action.object_name.clone(),
            atom_id: action.atom_id.clone(),
            location,
            direction: action.direction.unwrap_or([0.0, 0.0, 1.0]),
            up: action.up.unwrap_or([0.0, 1.0, 0.0]),
            id: None,
            lifecycle: Lifecycle::Created,
        })
    }

    /// World id, bound once the actor has been placed and registered.
    pub fn id(&self) -> Option<ActorId> {
        self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn activate(&mut self, id: ActorId) {
        self.id = Some(id);
        self.lifecycle = Lifecycle::Active;
    }

    /// Fallback for notifications the concrete actor left unhandled.
    pub fn default_notify(&self, notification: &Notification) -> NotifyResult {
        debug!(
            "[actor] {} ignored {} notification",
            self.name,
            notification.kind()
        );
        NotifyResult::UNHANDLED
    }
}

#[derive(Debug)]
pub enum Actor {
    Pizza(Pizza),
    Helicopter(Helicopter),
}

impl Actor {
    pub fn new(class: ActorClass) -> Self {
        match class {
            ActorClass::Pizza => Actor::Pizza(Pizza::new()),
            ActorClass::Helicopter => Actor::Helicopter(Helicopter::new()),
        }
    }

    /// Run the creation step for the wrapped actor. `world` is consulted for
    /// companion lookups only; the new actor is not part of it yet.
    pub fn create(
        &mut self,
        ctx: &mut IsleContext,
        world: &World,
        action: &ScriptedAction,
    ) -> Result<(), CreateError> {
        match self {
            Actor::Pizza(pizza) => pizza.create(ctx, world, action),
            Actor::Helicopter(helicopter) => helicopter.create(ctx, action),
        }
    }

    pub fn class(&self) -> ActorClass {
        match self {
            Actor::Pizza(_) => ActorClass::Pizza,
            Actor::Helicopter(_) => ActorClass::Helicopter,
        }
    }

    pub fn base(&self) -> &IsleActor {
        match self {
            Actor::Pizza(pizza) => pizza.base(),
            Actor::Helicopter(helicopter) => helicopter.base(),
        }
    }

    pub(crate) fn base_mut(&mut self) -> &mut IsleActor {
        match self {
            Actor::Pizza(pizza) => pizza.base_mut(),
            Actor::Helicopter(helicopter) => helicopter.base_mut(),
        }
    }

    /// `Uninitialized` until `create` succeeds, `Created` until the world
    /// activates it.
    pub fn lifecycle(&self) -> Lifecycle {
        self.base().lifecycle()
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Actor::Pizza(_) => Pizza::handlers().capabilities(),
            Actor::Helicopter(_) => Helicopter::handlers().capabilities(),
        }
    }

    pub fn notify(&mut self, ctx: &mut IsleContext, notification: &Notification) -> NotifyResult {
        let result = match self {
            Actor::Pizza(pizza) => Pizza::handlers().dispatch(pizza, ctx, notification),
            Actor::Helicopter(helicopter) => {
                Helicopter::handlers().dispatch(helicopter, ctx, notification)
            }
        };
        if result.is_handled() {
            result
        } else {
            self.base().default_notify(notification)
        }
    }

    pub fn enter_mission(
        &mut self,
        id: ActorId,
        ctx: &mut IsleContext,
        object_id: u32,
    ) -> Result<(), MissionError> {
        match self {
            Actor::Pizza(pizza) => pizza.enter_mission(ctx, object_id),
            Actor::Helicopter(_) => Err(MissionError::NoMission(id)),
        }
    }

    pub fn as_pizza(&self) -> Option<&Pizza> {
        match self {
            Actor::Pizza(pizza) => Some(pizza),
            _ => None,
        }
    }

    pub fn as_helicopter(&self) -> Option<&Helicopter> {
        match self {
            Actor::Helicopter(helicopter) => Some(helicopter),
            _ => None,
        }
    }
}

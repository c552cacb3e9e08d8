//! Persistent mission-state records and the registry that owns them.
//!
//! Every state type is addressed by its class name. Actors never own these
//! records; they hold a [`StateHandle`] into the [`GameState`] registry and
//! resolve it through the session context whenever they need the data.

use std::any::Any;
use std::fmt;

use isle_formats::StateFile;
use serde::Serialize;

use crate::error::StateError;

pub mod act1;
pub mod game_state;
pub mod helicopter;
pub mod pizza_mission;

pub use act1::Act1State;
pub use game_state::{GameState, SAVE_VERSION};
pub use helicopter::HelicopterState;
pub use pizza_mission::{PizzaMissionEntry, PizzaMissionState};

/// Stable index of a state inside the registry. Two handles compare equal
/// exactly when they name the same state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StateHandle(pub(crate) usize);

pub trait LegoState: Any + fmt::Debug {
    fn class_name(&self) -> &'static str;

    /// States that return `false` live only for the session and are skipped
    /// when the registry is saved.
    fn is_serializable(&self) -> bool {
        true
    }

    /// Read or write the state body depending on the file direction.
    fn serialize(&mut self, file: &mut StateFile) -> Result<(), StateError>;

    fn to_json(&self) -> serde_json::Value;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete state types the registry knows how to construct from a tag.
pub trait StateType: LegoState + Default + Sized {
    const CLASS_NAME: &'static str;
}

pub(crate) fn construct_state(tag: &str) -> Option<Box<dyn LegoState>> {
    match tag {
        PizzaMissionState::CLASS_NAME => Some(Box::new(PizzaMissionState::default())),
        Act1State::CLASS_NAME => Some(Box::new(Act1State::default())),
        HelicopterState::CLASS_NAME => Some(Box::new(HelicopterState::default())),
        _ => None,
    }
}

fn json_of<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_every_known_tag() {
        for tag in [
            PizzaMissionState::CLASS_NAME,
            Act1State::CLASS_NAME,
            HelicopterState::CLASS_NAME,
        ] {
            let state = construct_state(tag).expect("known tag");
            assert_eq!(state.class_name(), tag);
        }
        assert!(construct_state("RaceState").is_none());
    }
}

use std::any::Any;

use isle_formats::StateFile;
use serde::Serialize;

use super::{json_of, LegoState, StateType};
use crate::error::StateError;

/// Chapter value recorded while the pizza delivery mission is running.
pub const PIZZA_CHAPTER: u32 = 3;

/// Cross-mission act progress shared by every actor on the island.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Act1State {
    /// Which mission chapter the act is currently in; zero when idle.
    pub chapter: u32,
    pub unknown_0x010: u16,
}

impl StateType for Act1State {
    const CLASS_NAME: &'static str = "Act1State";
}

impl LegoState for Act1State {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn serialize(&mut self, file: &mut StateFile) -> Result<(), StateError> {
        let (mut chapter, mut flags) = (self.chapter, self.unknown_0x010);
        file.serialize_u32(&mut chapter)?;
        file.serialize_u16(&mut flags)?;
        self.chapter = chapter;
        self.unknown_0x010 = flags;
        Ok(())
    }

    fn to_json(&self) -> serde_json::Value {
        json_of(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

use std::any::Any;

use isle_formats::StateFile;
use serde::Serialize;

use super::{json_of, LegoState, StateType};
use crate::error::StateError;

/// Flight status of the island helicopter. It is rebuilt every session and
/// never written to a save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HelicopterState {
    pub unknown_0x08: u32,
}

impl StateType for HelicopterState {
    const CLASS_NAME: &'static str = "HelicopterState";
}

impl LegoState for HelicopterState {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn is_serializable(&self) -> bool {
        false
    }

    fn serialize(&mut self, file: &mut StateFile) -> Result<(), StateError> {
        file.serialize_u32(&mut self.unknown_0x08)?;
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

use std::any::Any;

use isle_formats::StateFile;
use serde::Serialize;

use super::{json_of, LegoState, StateType};
use crate::error::StateError;

/// One entry per playable character; the count is fixed and never stored.
pub const ENTRY_COUNT: usize = 5;

/// Written into [`PizzaMissionEntry::unknown_0x10`] when a delivery starts.
pub const ENTRY_IN_PROGRESS: u32 = 0x8000_0000;

/// Written into [`PizzaMissionState::unknown_0x0c`] when a delivery starts.
pub const MISSION_RUNNING: u16 = 1;

/// Per-character pizza delivery progress. Only `id` has a known meaning; the
/// remaining fields are carried verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PizzaMissionEntry {
    id: u8,
    pub unknown_0x00: i16,
    pub unknown_0x06: i16,
    pub unknown_0x10: u32,
    pub unknown_0x14: i16,
    pub unknown_0x16: i16,
    pub unknown_0x18: i16,
}

impl PizzaMissionEntry {
    pub fn new(id: u8) -> Self {
        PizzaMissionEntry {
            id,
            ..Self::default()
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    fn serialize_record(&mut self, file: &mut StateFile) -> Result<(), StateError> {
        file.serialize_u8(&mut self.id)?;
        file.serialize_i16(&mut self.unknown_0x00)?;
        file.serialize_i16(&mut self.unknown_0x06)?;
        file.serialize_u32(&mut self.unknown_0x10)?;
        file.serialize_i16(&mut self.unknown_0x14)?;
        file.serialize_i16(&mut self.unknown_0x16)?;
        file.serialize_i16(&mut self.unknown_0x18)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PizzaMissionState {
    pub unknown_0x0c: u16,
    entries: [PizzaMissionEntry; ENTRY_COUNT],
}

impl Default for PizzaMissionState {
    fn default() -> Self {
        let mut entries = [PizzaMissionEntry::default(); ENTRY_COUNT];
        for (slot, id) in entries.iter_mut().zip(1u8..) {
            *slot = PizzaMissionEntry::new(id);
        }
        PizzaMissionState {
            unknown_0x0c: 0,
            entries,
        }
    }
}

impl PizzaMissionState {
    /// Linear scan for the entry tied to `id`. A miss is an ordinary outcome.
    pub fn entry(&self, id: u8) -> Option<&PizzaMissionEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: u8) -> Option<&mut PizzaMissionEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[PizzaMissionEntry] {
        &self.entries
    }
}

impl StateType for PizzaMissionState {
    const CLASS_NAME: &'static str = "PizzaMissionState";
}

impl LegoState for PizzaMissionState {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn serialize(&mut self, file: &mut StateFile) -> Result<(), StateError> {
        let mut staged = self.entries;
        for entry in staged.iter_mut() {
            entry.serialize_record(file)?;
        }
        let mut status = self.unknown_0x0c;
        file.serialize_u16(&mut status)?;

        if file.is_read_mode() {
            for (index, entry) in staged.iter().enumerate() {
                if staged[..index].iter().any(|other| other.id == entry.id) {
                    return Err(StateError::DuplicateEntryId(entry.id));
                }
            }
        }

        self.entries = staged;
        self.unknown_0x0c = status;
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

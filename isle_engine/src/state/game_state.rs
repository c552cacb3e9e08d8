use isle_formats::StateFile;
use log::{debug, error, info};
use serde_json::{Map, Value};

use super::{construct_state, LegoState, StateHandle, StateType};
use crate::error::StateError;

/// Leading word of every save written by [`GameState::serialize`].
pub const SAVE_VERSION: u32 = 0x0001_000c;

/// Playable character selected when no save or scenario says otherwise.
pub const DEFAULT_ACTOR_ID: u8 = 1;

#[derive(Debug)]
struct StateSlot {
    tag: String,
    state: Box<dyn LegoState>,
}

/// Session-wide registry of mission states keyed by class name.
///
/// States are kept in creation order, which is also the order they are
/// written to a save. Nothing is removed during a session, so a
/// [`StateHandle`] stays valid for as long as the registry lives.
#[derive(Debug)]
pub struct GameState {
    actor_id: u8,
    states: Vec<StateSlot>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            actor_id: DEFAULT_ACTOR_ID,
            states: Vec::new(),
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the character the player is currently controlling.
    pub fn actor_id(&self) -> u8 {
        self.actor_id
    }

    pub fn set_actor_id(&mut self, actor_id: u8) {
        self.actor_id = actor_id;
    }

    pub fn get_state(&self, tag: &str) -> Option<StateHandle> {
        self.states
            .iter()
            .position(|slot| slot.tag == tag)
            .map(StateHandle)
    }

    /// Allocate a default state for `tag`. Creating a tag twice is a caller
    /// bug and is refused; the existing state is left untouched.
    pub fn create_state(&mut self, tag: &str) -> Result<StateHandle, StateError> {
        if self.get_state(tag).is_some() {
            error!("[game_state] refusing to create `{tag}` twice");
            return Err(StateError::AlreadyExists(tag.to_string()));
        }
        let state =
            construct_state(tag).ok_or_else(|| StateError::UnknownType(tag.to_string()))?;
        self.states.push(StateSlot {
            tag: tag.to_string(),
            state,
        });
        info!("[game_state] created {tag}");
        Ok(StateHandle(self.states.len() - 1))
    }

    pub fn state<T: StateType>(&self, handle: StateHandle) -> Option<&T> {
        self.states
            .get(handle.0)
            .and_then(|slot| slot.state.as_any().downcast_ref::<T>())
    }

    pub fn state_mut<T: StateType>(&mut self, handle: StateHandle) -> Option<&mut T> {
        self.states
            .get_mut(handle.0)
            .and_then(|slot| slot.state.as_any_mut().downcast_mut::<T>())
    }

    /// Typed lookup by the state's own class name.
    pub fn find<T: StateType>(&self) -> Option<&T> {
        self.get_state(T::CLASS_NAME)
            .and_then(|handle| self.state::<T>(handle))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|slot| slot.tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Save or restore every persistent state, depending on the direction of
    /// `file`. Loading decodes every body before touching the registry, then
    /// runs find-or-create per tag so handles already held by actors keep
    /// pointing at the restored data. A failed load changes nothing.
    pub fn serialize(&mut self, file: &mut StateFile) -> Result<(), StateError> {
        if file.is_write_mode() {
            let persistent: Vec<usize> = self
                .states
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.state.is_serializable())
                .map(|(index, _)| index)
                .collect();

            file.write_u32(SAVE_VERSION)?;
            file.write_u8(self.actor_id)?;
            file.write_u16(persistent.len() as u16)?;
            for index in persistent {
                let slot = &mut self.states[index];
                file.write_string(&slot.tag)?;
                slot.state.serialize(file)?;
                debug!("[game_state] wrote {}", slot.tag);
            }
            return Ok(());
        }

        let version = file.read_u32()?;
        if version != SAVE_VERSION {
            return Err(StateError::BadVersion {
                found: version,
                expected: SAVE_VERSION,
            });
        }
        let actor_id = file.read_u8()?;
        let count = file.read_u16()?;
        let mut staged: Vec<StateSlot> = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let tag = file.read_string()?;
            let mut state =
                construct_state(&tag).ok_or_else(|| StateError::UnknownType(tag.clone()))?;
            state.serialize(file)?;
            debug!("[game_state] read {tag}");
            staged.push(StateSlot { tag, state });
        }

        self.actor_id = actor_id;
        for slot in staged {
            match self.get_state(&slot.tag) {
                Some(handle) => self.states[handle.0].state = slot.state,
                None => {
                    info!("[game_state] created {} from save", slot.tag);
                    self.states.push(slot);
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let mut states = Map::new();
        for slot in &self.states {
            states.insert(slot.tag.clone(), slot.state.to_json());
        }
        let mut root = Map::new();
        root.insert("actor_id".to_string(), Value::from(self.actor_id));
        root.insert("states".to_string(), Value::Object(states));
        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Act1State, HelicopterState, PizzaMissionState};

    #[test]
    fn find_or_create_returns_the_same_state() {
        let mut game_state = GameState::new();
        assert!(game_state.get_state(Act1State::CLASS_NAME).is_none());

        let first = match game_state.get_state(Act1State::CLASS_NAME) {
            Some(handle) => handle,
            None => game_state.create_state(Act1State::CLASS_NAME).unwrap(),
        };
        let second = match game_state.get_state(Act1State::CLASS_NAME) {
            Some(handle) => handle,
            None => game_state.create_state(Act1State::CLASS_NAME).unwrap(),
        };

        assert_eq!(first, second);
        assert_eq!(game_state.len(), 1);
        let a = game_state.state::<Act1State>(first).unwrap() as *const Act1State;
        let b = game_state.state::<Act1State>(second).unwrap() as *const Act1State;
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn creating_a_tag_twice_is_refused_and_keeps_the_original() {
        let mut game_state = GameState::new();
        let handle = game_state.create_state(Act1State::CLASS_NAME).unwrap();
        game_state.state_mut::<Act1State>(handle).unwrap().chapter = 9;

        let err = game_state.create_state(Act1State::CLASS_NAME).unwrap_err();
        assert!(matches!(err, StateError::AlreadyExists(ref tag) if tag == "Act1State"));
        assert_eq!(game_state.len(), 1);
        assert_eq!(game_state.find::<Act1State>().unwrap().chapter, 9);
    }

    #[test]
    fn unknown_tags_are_not_created() {
        let mut game_state = GameState::new();
        assert!(matches!(
            game_state.create_state("JukeBoxState"),
            Err(StateError::UnknownType(_))
        ));
        assert!(game_state.is_empty());
    }

    #[test]
    fn typed_access_rejects_the_wrong_type() {
        let mut game_state = GameState::new();
        let handle = game_state.create_state(Act1State::CLASS_NAME).unwrap();
        assert!(game_state.state::<PizzaMissionState>(handle).is_none());
        assert!(game_state.state::<Act1State>(handle).is_some());
    }

    #[test]
    fn save_skips_session_only_states_and_load_rebinds_by_tag() {
        let mut game_state = GameState::new();
        game_state.set_actor_id(4);
        let pizza = game_state
            .create_state(PizzaMissionState::CLASS_NAME)
            .unwrap();
        let heli = game_state
            .create_state(HelicopterState::CLASS_NAME)
            .unwrap();
        let act = game_state.create_state(Act1State::CLASS_NAME).unwrap();
        {
            let state = game_state.state_mut::<PizzaMissionState>(pizza).unwrap();
            state.unknown_0x0c = 1;
            state.entry_mut(4).unwrap().unknown_0x10 = 0x8000_0000;
        }
        game_state
            .state_mut::<HelicopterState>(heli)
            .unwrap()
            .unknown_0x08 = 2;
        game_state.state_mut::<Act1State>(act).unwrap().chapter = 3;

        let mut writer = StateFile::writer();
        game_state.serialize(&mut writer).unwrap();

        let mut restored = GameState::new();
        let existing_act = restored.create_state(Act1State::CLASS_NAME).unwrap();
        restored
            .serialize(&mut StateFile::reader(writer.into_bytes()))
            .unwrap();

        assert_eq!(restored.actor_id(), 4);
        assert_eq!(
            restored.tags().collect::<Vec<_>>(),
            vec!["Act1State", "PizzaMissionState"]
        );
        assert_eq!(restored.state::<Act1State>(existing_act).unwrap().chapter, 3);
        assert_eq!(
            restored.find::<PizzaMissionState>(),
            game_state.find::<PizzaMissionState>()
        );
        assert!(restored.find::<HelicopterState>().is_none());
    }

    #[test]
    fn truncated_save_leaves_the_registry_as_it_was() {
        let mut saved = GameState::new();
        let act = saved.create_state(Act1State::CLASS_NAME).unwrap();
        saved.state_mut::<Act1State>(act).unwrap().chapter = 3;
        saved.create_state(PizzaMissionState::CLASS_NAME).unwrap();
        let mut writer = StateFile::writer();
        saved.serialize(&mut writer).unwrap();
        let mut bytes = writer.into_bytes();
        bytes.truncate(bytes.len() - 4);

        let mut game_state = GameState::new();
        game_state.set_actor_id(4);
        let handle = game_state.create_state(Act1State::CLASS_NAME).unwrap();
        game_state.state_mut::<Act1State>(handle).unwrap().chapter = 9;

        let err = game_state
            .serialize(&mut StateFile::reader(bytes))
            .unwrap_err();
        assert!(matches!(err, StateError::Format(_)));
        assert_eq!(game_state.actor_id(), 4);
        assert_eq!(game_state.state::<Act1State>(handle).unwrap().chapter, 9);
        assert_eq!(game_state.tags().collect::<Vec<_>>(), vec!["Act1State"]);
    }

    #[test]
    fn unknown_tag_in_save_changes_nothing() {
        let mut writer = StateFile::writer();
        writer.write_u32(SAVE_VERSION).unwrap();
        writer.write_u8(5).unwrap();
        writer.write_u16(1).unwrap();
        writer.write_string("JukeBoxState").unwrap();

        let mut game_state = GameState::new();
        let err = game_state
            .serialize(&mut StateFile::reader(writer.into_bytes()))
            .unwrap_err();
        assert!(matches!(err, StateError::UnknownType(ref tag) if tag == "JukeBoxState"));
        assert_eq!(game_state.actor_id(), DEFAULT_ACTOR_ID);
        assert!(game_state.is_empty());
    }

    #[test]
    fn load_rejects_foreign_versions() {
        let mut writer = StateFile::writer();
        writer.write_u32(0xdead_beef).unwrap();
        let mut game_state = GameState::new();
        let err = game_state
            .serialize(&mut StateFile::reader(writer.into_bytes()))
            .unwrap_err();
        assert!(matches!(err, StateError::BadVersion { found: 0xdead_beef, .. }));
    }
}

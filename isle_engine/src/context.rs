use serde::Serialize;

use crate::state::GameState;
use crate::tickle::TickleScheduler;

/// Island-wide behaviour switches that actors toggle while missions run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IsleFlags(u32);

impl IsleFlags {
    pub const PLAY_MUSIC: u32 = 0x20;
    pub const DEFAULT: u32 = 0x7f;

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn insert(&mut self, flag: u32) {
        self.0 |= flag;
    }

    pub fn remove(&mut self, flag: u32) {
        self.0 &= !flag;
    }
}

impl Default for IsleFlags {
    fn default() -> Self {
        IsleFlags(Self::DEFAULT)
    }
}

/// Narrow view of the animation manager: only the switches missions flip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationManager {
    cam_anims_enabled: bool,
    ambient_anims_enabled: bool,
    current_anim: Option<u32>,
}

impl Default for AnimationManager {
    fn default() -> Self {
        AnimationManager {
            cam_anims_enabled: true,
            ambient_anims_enabled: true,
            current_anim: None,
        }
    }
}

impl AnimationManager {
    pub fn enable_cam_anims(&mut self, enabled: bool) {
        self.cam_anims_enabled = enabled;
    }

    pub fn cam_anims_enabled(&self) -> bool {
        self.cam_anims_enabled
    }

    pub fn enable_ambient_anims(&mut self, enabled: bool) {
        self.ambient_anims_enabled = enabled;
    }

    pub fn ambient_anims_enabled(&self) -> bool {
        self.ambient_anims_enabled
    }

    pub fn start_anim(&mut self, anim: u32) {
        self.current_anim = Some(anim);
    }

    pub fn clear_current_anim(&mut self) {
        self.current_anim = None;
    }

    pub fn current_anim(&self) -> Option<u32> {
        self.current_anim
    }
}

/// Everything an actor may touch outside its own fields. Threaded by
/// `&mut` through creation, tickles and notifications, so at most one
/// handler writes to it at a time.
#[derive(Debug, Default)]
pub struct IsleContext {
    pub game_state: GameState,
    pub tickle: TickleScheduler,
    pub isle_flags: IsleFlags,
    pub animation: AnimationManager,
}

impl IsleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game_state(game_state: GameState) -> Self {
        IsleContext {
            game_state,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn music_flag_toggles_without_touching_others() {
        let mut flags = IsleFlags::default();
        assert!(flags.contains(IsleFlags::PLAY_MUSIC));
        flags.remove(IsleFlags::PLAY_MUSIC);
        assert!(!flags.contains(IsleFlags::PLAY_MUSIC));
        assert_eq!(flags.bits(), IsleFlags::DEFAULT & !IsleFlags::PLAY_MUSIC);
        flags.insert(IsleFlags::PLAY_MUSIC);
        assert_eq!(flags, IsleFlags::default());
    }
}

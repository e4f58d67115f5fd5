//! Burst/full-auto shot sequencing.

use std::collections::HashMap;

use crate::character::FiringMode;

/// Accuracy penalty applied to shots after the first in a burst/full-auto
/// sequence.
pub const BURST_AUTO_PENALTY: i32 = -20;

#[derive(Debug, Clone, Copy, Default)]
struct BurstState {
    firing_mode: Option<FiringMode>,
    shots_fired: u32,
}

/// Tracks per-character shot-in-sequence state for burst and full-auto fire.
#[derive(Debug, Clone, Default)]
pub struct BurstFireManager {
    state: HashMap<i64, BurstState>,
}

impl BurstFireManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active firing mode for a character. Changing modes clears
    /// any burst in progress.
    pub fn set_firing_mode(&mut self, character_id: i64, mode: FiringMode) {
        let entry = self.state.entry(character_id).or_default();
        if entry.firing_mode != Some(mode) {
            entry.firing_mode = Some(mode);
            entry.shots_fired = 0;
        }
    }

    /// Record a shot fired, returning its 1-based index within the current
    /// sequence (1 = first shot).
    pub fn record_shot(&mut self, character_id: i64) -> u32 {
        let entry = self.state.entry(character_id).or_default();
        entry.shots_fired += 1;
        entry.shots_fired
    }

    pub fn reset_sequence(&mut self, character_id: i64) {
        if let Some(entry) = self.state.get_mut(&character_id) {
            entry.shots_fired = 0;
        }
    }

    /// Whether the next shot by `character_id` is shot 2+ of a burst/auto
    /// sequence (i.e. aiming is disregarded and the burst penalty applies).
    pub fn is_follow_up_shot(&self, character_id: i64) -> bool {
        matches!(
            self.state.get(&character_id),
            Some(BurstState {
                firing_mode: Some(FiringMode::Burst) | Some(FiringMode::FullAuto),
                shots_fired,
            }) if *shots_fired >= 1
        )
    }
}

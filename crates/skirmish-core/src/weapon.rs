//! Weapon data and the table-driven weapon state machine.

use serde::{Deserialize, Serialize};

use crate::character::FiringMode;
use crate::clock::TICKS_PER_SECOND;

/// Base character reach added to melee weapon reach to get engagement
/// distance.
pub const BASE_MELEE_REACH_FT: f64 = 4.0;

/// Ticks from entering `melee_ready` to committing to a swing
/// (`melee_attacking`).
pub const MELEE_WINDUP_TICKS: u64 = 116;
/// Ticks from committing to a swing to its impact resolving.
pub const MELEE_IMPACT_DELAY_TICKS: u64 = 70;
/// Recovery duration after a melee swing that connects.
pub const MELEE_RECOVERY_HIT_TICKS: u64 = 120;
/// Recovery duration after a melee swing that misses.
pub const MELEE_RECOVERY_MISS_TICKS: u64 = 60;

/// Ticks between a ranged weapon firing and its shot's impact resolving,
/// derived from the shot's travel distance and the weapon's muzzle
/// velocity. Missing velocity data resolves to an effectively instant
/// (one-tick) impact.
pub fn ranged_travel_delay_ticks(distance_ft: f64, projectile_velocity_fps: Option<f64>) -> u64 {
    let velocity = match projectile_velocity_fps {
        Some(v) if v > 0.0 => v,
        _ => return 1,
    };
    let seconds = distance_ft / velocity;
    ((seconds * TICKS_PER_SECOND as f64).ceil() as u64).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Ranged,
    Melee,
}

/// A single named state in a weapon's state machine: the state it leads to
/// and the tick cost of that transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStateDef {
    pub name: String,
    pub next_state: String,
    pub tick_cost: u64,
    /// Whether reflexes/Quickdraw readying-speed modulation applies to the
    /// transition *into* this state: applies only to preparation
    /// transitions, anything before and including reaching `ready` /
    /// `melee_ready`.
    pub is_preparation: bool,
}

/// Table-driven state machine shared by ranged and melee weapons; a single
/// table of transitions rather than parallel hand-written branches per
/// weapon kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponStateMachine {
    pub initial_state: String,
    pub states: Vec<WeaponStateDef>,
}

impl WeaponStateMachine {
    /// Look up the declared transition out of `state`, if any.
    pub fn transition(&self, state: &str) -> Option<&WeaponStateDef> {
        self.states.iter().find(|s| s.name == state)
    }

    /// Whether `state` is a name declared in this machine.
    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s.name == state)
    }

    /// Standard pistol/sidearm progression.
    pub fn pistol() -> Self {
        Self {
            initial_state: "sheathed".to_owned(),
            states: vec![
                prep("sheathed", "drawing", 0),
                prep("drawing", "ready", 20),
                prep("ready", "aiming", 10),
                non_prep("aiming", "firing", 0),
                non_prep("firing", "recovering", 0),
                non_prep("recovering", "ready", 60),
            ],
        }
    }

    /// Rifle/long-gun progression: substitutes slung/unslinging for the
    /// pistol's sheathed/drawing.
    pub fn rifle() -> Self {
        Self {
            initial_state: "slung".to_owned(),
            states: vec![
                prep("slung", "unslinging", 0),
                prep("unslinging", "ready", 30),
                prep("ready", "aiming", 10),
                non_prep("aiming", "firing", 0),
                non_prep("firing", "recovering", 0),
                non_prep("recovering", "ready", 60),
            ],
        }
    }

    /// Melee progression. `melee_ready` -> `melee_attacking` is the windup
    /// before a swing is committed; `melee_attacking`'s declared cost is
    /// repurposed by the combat resolver as the windup-to-impact delay
    /// rather than a direct auto-transition, since the state reached after
    /// impact (`melee_recovering` for a hit vs. a shorter recovery for a
    /// miss) depends on the swing's outcome.
    pub fn melee() -> Self {
        Self {
            initial_state: "sheathed".to_owned(),
            states: vec![
                prep("sheathed", "unsheathing", 0),
                prep("unsheathing", "melee_ready", 59),
                non_prep("melee_ready", "melee_attacking", MELEE_WINDUP_TICKS),
                non_prep("melee_attacking", "melee_recovering", MELEE_IMPACT_DELAY_TICKS),
                non_prep("melee_recovering", "melee_ready", MELEE_RECOVERY_MISS_TICKS),
            ],
        }
    }
}

fn prep(name: &str, next: &str, tick_cost: u64) -> WeaponStateDef {
    WeaponStateDef {
        name: name.to_owned(),
        next_state: next.to_owned(),
        tick_cost,
        is_preparation: true,
    }
}

fn non_prep(name: &str, next: &str, tick_cost: u64) -> WeaponStateDef {
    WeaponStateDef {
        name: name.to_owned(),
        next_state: next.to_owned(),
        tick_cost,
        is_preparation: false,
    }
}

/// Readying-speed multiplier from reflexes: 1.2x (slower) at reflexes 1 down
/// to 0.8x (faster) at reflexes 100, linear in between.
pub fn reflexes_speed_multiplier(reflexes: i32) -> f64 {
    let r = reflexes.clamp(1, 100) as f64;
    1.2 - (r - 1.0) / 99.0 * 0.4
}

/// Quickdraw skill multiplier: 5% faster per level.
pub fn quickdraw_speed_multiplier(level: u8) -> f64 {
    1.0 - 0.05 * level as f64
}

/// Effective tick cost for a preparation transition, after applying the
/// reflexes and Quickdraw multipliers multiplicatively. Non-preparation
/// transitions are returned unmodified.
pub fn modulated_tick_cost(state: &WeaponStateDef, reflexes: i32, quickdraw_level: u8) -> u64 {
    if !state.is_preparation {
        return state.tick_cost;
    }
    let multiplier = reflexes_speed_multiplier(reflexes) * quickdraw_speed_multiplier(quickdraw_level);
    ((state.tick_cost as f64) * multiplier).round().max(0.0) as u64
}

/// Named equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub id: i64,
    pub name: String,
    pub kind: WeaponKind,
    pub damage: i32,
    pub accuracy: i32,
    pub sound_id: String,
    pub state_machine: WeaponStateMachine,

    // Ranged-only fields.
    pub projectile_velocity_fps: Option<f64>,
    pub max_range_ft: Option<f64>,
    pub ammunition: Option<u32>,
    pub firing_delay_ticks: Option<u64>,
    pub cyclic_rate_ticks: Option<u64>,
    pub burst_size: Option<u32>,
    pub firing_modes: Vec<FiringMode>,

    // Melee-only field.
    pub reach_ft: Option<f64>,
}

impl Weapon {
    /// Total melee engagement distance: base character reach plus weapon
    /// reach.
    pub fn melee_engagement_distance_ft(&self) -> Option<f64> {
        self.reach_ft.map(|reach| BASE_MELEE_REACH_FT + reach)
    }

    pub fn has_ammo(&self) -> bool {
        self.ammunition.map(|a| a > 0).unwrap_or(true)
    }

    pub fn consume_round(&mut self) {
        if let Some(ammo) = self.ammunition.as_mut() {
            *ammo = ammo.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexes_speed_multiplier_at_the_extremes() {
        assert!((reflexes_speed_multiplier(1) - 1.2).abs() < 1e-9);
        assert!((reflexes_speed_multiplier(100) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn quickdraw_five_percent_per_level() {
        assert!((quickdraw_speed_multiplier(0) - 1.0).abs() < 1e-9);
        assert!((quickdraw_speed_multiplier(5) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn preparation_transition_is_modulated_non_preparation_is_not() {
        let sm = WeaponStateMachine::pistol();
        let drawing = sm.transition("drawing").unwrap();
        let fast = modulated_tick_cost(drawing, 100, 5);
        let slow = modulated_tick_cost(drawing, 1, 0);
        assert!(fast < slow);

        let firing_to_recover = sm.transition("firing").unwrap();
        assert_eq!(
            modulated_tick_cost(firing_to_recover, 1, 0),
            firing_to_recover.tick_cost
        );
    }

    #[test]
    fn pistol_progression_chains_sheathed_to_ready_to_firing() {
        let sm = WeaponStateMachine::pistol();
        assert_eq!(sm.initial_state, "sheathed");
        assert_eq!(sm.transition("sheathed").unwrap().next_state, "drawing");
        assert_eq!(sm.transition("drawing").unwrap().next_state, "ready");
        assert_eq!(sm.transition("ready").unwrap().next_state, "aiming");
        assert_eq!(sm.transition("aiming").unwrap().next_state, "firing");
        assert_eq!(sm.transition("firing").unwrap().next_state, "recovering");
        assert_eq!(sm.transition("recovering").unwrap().next_state, "ready");
    }

    #[test]
    fn melee_progression_chains_sheathed_to_melee_ready_to_attacking() {
        let sm = WeaponStateMachine::melee();
        assert_eq!(
            sm.transition("sheathed").unwrap().next_state,
            "unsheathing"
        );
        assert_eq!(
            sm.transition("unsheathing").unwrap().next_state,
            "melee_ready"
        );
        assert_eq!(
            sm.transition("melee_ready").unwrap().next_state,
            "melee_attacking"
        );
        assert_eq!(
            sm.transition("melee_attacking").unwrap().next_state,
            "melee_recovering"
        );
        assert_eq!(
            sm.transition("melee_recovering").unwrap().next_state,
            "melee_ready"
        );
    }

    #[test]
    fn melee_engagement_distance_adds_base_reach() {
        let w = Weapon {
            id: 1,
            name: "Bowie Knife".into(),
            kind: WeaponKind::Melee,
            damage: 5,
            accuracy: 0,
            sound_id: "knife".into(),
            state_machine: WeaponStateMachine::melee(),
            projectile_velocity_fps: None,
            max_range_ft: None,
            ammunition: None,
            firing_delay_ticks: None,
            cyclic_rate_ticks: None,
            burst_size: None,
            firing_modes: vec![],
            reach_ft: Some(1.0),
        };
        assert_eq!(w.melee_engagement_distance_ft(), Some(5.0));
    }

    #[test]
    fn ranged_travel_delay_scales_with_distance_and_velocity() {
        // 900 fps, 60 ticks/s -> 15 ft/tick; 150 ft takes 10 ticks.
        assert_eq!(ranged_travel_delay_ticks(150.0, Some(900.0)), 10);
        assert_eq!(ranged_travel_delay_ticks(1.0, Some(900.0)), 1);
    }

    #[test]
    fn ranged_travel_delay_falls_back_to_one_tick_without_velocity_data() {
        assert_eq!(ranged_travel_delay_ticks(500.0, None), 1);
    }
}

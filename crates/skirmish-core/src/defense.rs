//! Per-target defensive rolls for melee attacks.

use std::collections::HashMap;

use crate::character::Character;
use crate::clock::Tick;
use crate::rng::RandomProvider;

/// Tracks per-defender cooldown state and performs defensive rolls.
#[derive(Debug, Clone, Default)]
pub struct DefenseManager {
    cooldown_until: HashMap<i64, Tick>,
}

impl DefenseManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn in_cooldown(&self, defender_id: i64, now: Tick) -> bool {
        self.cooldown_until
            .get(&defender_id)
            .map(|&until| now < until)
            .unwrap_or(false)
    }

    /// Perform a defense roll for `defender` against an incoming melee
    /// attack at `current_tick`. Returns 0 (no defensive contribution) if
    /// the defender is incapacitated or still in cooldown; otherwise rolls
    /// `next_double() * 100` plus dexterity, melee skill, and weapon
    /// contributions, and starts a new cooldown.
    pub fn perform_defense(
        &mut self,
        defender: &Character,
        current_tick: Tick,
        cooldown_ticks: u64,
        rng: &mut RandomProvider,
    ) -> f64 {
        if defender.is_incapacitated() || self.in_cooldown(defender.id, current_tick) {
            return 0.0;
        }

        let roll = rng.next_double() * 100.0;
        let dex_modifier = crate::stats::stat_to_modifier(defender.stats.dexterity) as f64;
        let skill_bonus = defender
            .melee_weapon
            .as_ref()
            .map(|_| defender.skill_level(crate::combat::MELEE_DEFENSE_SKILL) as f64 * 5.0)
            .unwrap_or(0.0);
        let weapon_contribution = defender
            .melee_weapon
            .as_ref()
            .map(|w| w.accuracy as f64 * 0.1)
            .unwrap_or(0.0);

        self.cooldown_until
            .insert(defender.id, current_tick.plus(cooldown_ticks));

        roll + dex_modifier + skill_bonus + weapon_contribution
    }
}

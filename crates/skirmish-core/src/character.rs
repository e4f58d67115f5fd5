//! Character data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clock::Tick;
use crate::weapon::{Weapon, WeaponKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    Ambidextrous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    Standing,
    Kneeling,
    Prone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementType {
    Crawl,
    Walk,
    Jog,
    Run,
}

impl MovementType {
    /// Multiplier applied to base movement speed.
    pub fn speed_multiplier(self) -> f64 {
        match self {
            MovementType::Crawl => 0.25,
            MovementType::Walk => 1.0,
            MovementType::Jog => 1.5,
            MovementType::Run => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimingSpeed {
    VeryCareful,
    Careful,
    Normal,
    Quick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringMode {
    SingleShot,
    Burst,
    FullAuto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyPart {
    Head,
    Chest,
    Abdomen,
    LeftArm,
    RightArm,
    LeftShoulder,
    RightShoulder,
    LeftLeg,
    RightLeg,
}

impl BodyPart {
    pub fn is_vital(self) -> bool {
        matches!(self, BodyPart::Head | BodyPart::Chest | BodyPart::Abdomen)
    }

    pub fn is_leg(self) -> bool {
        matches!(self, BodyPart::LeftLeg | BodyPart::RightLeg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Scratch,
    Light,
    Serious,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wound {
    pub body_part: BodyPart,
    pub severity: Severity,
    pub damage: i32,
}

/// Stats clamped to `[1, 100]` per the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub dexterity: i32,
    pub strength: i32,
    pub reflexes: i32,
    pub coolness: i32,
    pub max_health: i32,
}

/// A rectangle in pixel space, used for auto-targeting target zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetZone {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl TargetZone {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Mutable combat bookkeeping that doesn't belong in the persistent profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatScratch {
    pub first_attack_on_target: bool,
    pub shot_in_sequence: u32,
    pub recovery_until: Option<Tick>,
    pub hesitation_until: Option<Tick>,
    /// The held weapon state a transition has already been scheduled from.
    /// Cleared on every `WeaponTransition`; lets `advance_combat` tell a
    /// state it has already committed to leaving apart from one it is still
    /// merely sitting in.
    pub armed_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttackCounters {
    pub attacks_attempted: u32,
    pub attacks_successful: u32,
    pub wounds_by_severity: HashMap<String, u32>,
    pub ranged_wounds: u32,
    pub melee_wounds: u32,
}

/// A persistent combat actor. Positive ids are user-created; negative ids
/// are built-in/test fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub faction_id: i64,

    pub stats: Stats,
    pub current_health: i32,

    pub handedness: Handedness,
    pub skills: HashMap<String, u8>,

    pub ranged_weapon: Option<Weapon>,
    pub melee_weapon: Option<Weapon>,
    pub active_is_ranged: bool,
    pub weapon_state: String,

    pub stance: Stance,
    pub movement_type: MovementType,
    pub aiming_speed: AimingSpeed,
    pub firing_mode: Option<FiringMode>,

    pub target_id: Option<i64>,
    pub persistent_attack: bool,
    pub auto_targeting: bool,
    pub target_zone: Option<TargetZone>,

    pub scratch: CombatScratch,
    pub wounds: Vec<Wound>,
    pub bravery_failures: Vec<Tick>,
    pub counters: AttackCounters,
}

impl Character {
    pub fn new(id: i64, name: impl Into<String>, faction_id: i64, stats: Stats) -> Self {
        let max_health = stats.max_health;
        Self {
            id,
            name: name.into(),
            faction_id,
            stats,
            current_health: max_health,
            handedness: Handedness::Right,
            skills: HashMap::new(),
            ranged_weapon: None,
            melee_weapon: None,
            active_is_ranged: true,
            weapon_state: "sheathed".to_owned(),
            stance: Stance::Standing,
            movement_type: MovementType::Walk,
            aiming_speed: AimingSpeed::Normal,
            firing_mode: None,
            target_id: None,
            persistent_attack: false,
            auto_targeting: false,
            target_zone: None,
            scratch: CombatScratch::default(),
            wounds: Vec::new(),
            bravery_failures: Vec::new(),
            counters: AttackCounters::default(),
        }
    }

    /// Current health `<= 0`.
    pub fn is_incapacitated(&self) -> bool {
        self.current_health <= 0
    }

    pub fn skill_level(&self, skill: &str) -> u8 {
        self.skills.get(skill).copied().unwrap_or(0)
    }

    /// The currently equipped active weapon, if any.
    pub fn active_weapon(&self) -> Option<&Weapon> {
        if self.active_is_ranged {
            self.ranged_weapon.as_ref()
        } else {
            self.melee_weapon.as_ref()
        }
    }

    pub fn active_weapon_kind(&self) -> Option<WeaponKind> {
        self.active_weapon().map(|w| w.kind)
    }

    /// Equip a weapon, resetting it to its initial state and making it the
    /// active one.
    pub fn equip(&mut self, weapon: Weapon) {
        let initial_state = weapon.state_machine.initial_state.clone();
        self.active_is_ranged = weapon.kind == WeaponKind::Ranged;
        match weapon.kind {
            WeaponKind::Ranged => self.ranged_weapon = Some(weapon),
            WeaponKind::Melee => self.melee_weapon = Some(weapon),
        }
        self.weapon_state = initial_state;
        self.scratch.armed_state = None;
    }

    /// Number of wounds to each leg; both legs wounded forces crawl+prone.
    pub fn leg_wound_count(&self) -> (u32, u32) {
        let left = self
            .wounds
            .iter()
            .filter(|w| w.body_part == BodyPart::LeftLeg)
            .count() as u32;
        let right = self
            .wounds
            .iter()
            .filter(|w| w.body_part == BodyPart::RightLeg)
            .count() as u32;
        (left, right)
    }

    /// Apply the movement restrictions derived from current wounds: both
    /// legs wounded forces crawl+prone; a single leg wound disables run.
    pub fn apply_wound_movement_caps(&mut self) {
        let (left, right) = self.leg_wound_count();
        if left > 0 && right > 0 {
            self.movement_type = MovementType::Crawl;
            self.stance = Stance::Prone;
        } else if (left > 0 || right > 0) && self.movement_type == MovementType::Run {
            self.movement_type = MovementType::Jog;
        }
    }

    /// Unexpired bravery failures at `now`, per
    /// `bravery_penalty_duration_ticks`.
    pub fn active_bravery_failures(&self, now: Tick, duration_ticks: u64) -> usize {
        self.bravery_failures
            .iter()
            .filter(|&&stamp| now.since(stamp) < duration_ticks)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Stats {
        Stats {
            dexterity: 50,
            strength: 50,
            reflexes: 50,
            coolness: 50,
            max_health: 10,
        }
    }

    #[test]
    fn new_character_starts_at_full_health_not_incapacitated() {
        let c = Character::new(1, "Alice", 100, stats());
        assert_eq!(c.current_health, 10);
        assert!(!c.is_incapacitated());
    }

    #[test]
    fn zero_health_is_incapacitated() {
        let mut c = Character::new(1, "Alice", 100, stats());
        c.current_health = 0;
        assert!(c.is_incapacitated());
    }

    #[test]
    fn both_legs_wounded_forces_crawl_prone() {
        let mut c = Character::new(1, "Alice", 100, stats());
        c.wounds.push(Wound {
            body_part: BodyPart::LeftLeg,
            severity: Severity::Light,
            damage: 1,
        });
        c.wounds.push(Wound {
            body_part: BodyPart::RightLeg,
            severity: Severity::Light,
            damage: 1,
        });
        c.movement_type = MovementType::Run;
        c.apply_wound_movement_caps();
        assert_eq!(c.movement_type, MovementType::Crawl);
        assert_eq!(c.stance, Stance::Prone);
    }

    #[test]
    fn single_leg_wound_disables_run_only() {
        let mut c = Character::new(1, "Alice", 100, stats());
        c.wounds.push(Wound {
            body_part: BodyPart::LeftLeg,
            severity: Severity::Light,
            damage: 1,
        });
        c.movement_type = MovementType::Run;
        c.apply_wound_movement_caps();
        assert_eq!(c.movement_type, MovementType::Jog);
        assert_eq!(c.stance, Stance::Standing);
    }

    #[test]
    fn bravery_failures_expire_after_duration() {
        let mut c = Character::new(1, "Alice", 100, stats());
        c.bravery_failures.push(Tick(1000));
        assert_eq!(c.active_bravery_failures(Tick(1179), 180), 1);
        assert_eq!(c.active_bravery_failures(Tick(1180), 180), 0);
    }
}

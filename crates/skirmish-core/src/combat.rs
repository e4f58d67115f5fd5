//! Hit / wound / damage resolution pipeline.
//!
//! The pipeline is additive by design: every modifier is computed
//! independently and summed once, with rounding only at the final roll
//! comparison.

use crate::aiming::AimBonus;
use crate::burst::BURST_AUTO_PENALTY;
use crate::character::{BodyPart, Character, FiringMode, MovementType, Severity, Stance};
use crate::clock::Tick;
use crate::rng::RandomProvider;
use crate::stats::stat_to_modifier;
use crate::weapon::WeaponKind;
use crate::wound::{bravery_modifier, wound_accuracy_modifier};

/// Minimum hit chance for any shot within range.
pub const MIN_IN_RANGE_CHANCE: f64 = 0.01;

/// Target position modifier for a kneeling target: halfway between
/// standing (0) and prone (-15) (see DESIGN.md open-question log).
pub const KNEELING_TARGET_MODIFIER: i32 = -7;
pub const PRONE_TARGET_MODIFIER: i32 = -15;

/// Skill key a melee weapon's defensive bonus draws from. Melee combat has
/// no weapon-family skill of its own in the recognized set (pistol, rifle,
/// submachine_gun, quickdraw), so every melee weapon shares this one key
/// rather than being looked up by its free-text display name.
pub const MELEE_DEFENSE_SKILL: &str = "melee";

fn shooter_movement_modifier(is_moving: bool, movement_type: MovementType) -> i32 {
    if !is_moving {
        return 0;
    }
    match movement_type {
        MovementType::Walk => -5,
        MovementType::Crawl => -10,
        MovementType::Jog => -15,
        MovementType::Run => -25,
    }
}

fn target_position_modifier(stance: Stance) -> i32 {
    match stance {
        Stance::Standing => 0,
        Stance::Kneeling => KNEELING_TARGET_MODIFIER,
        Stance::Prone => PRONE_TARGET_MODIFIER,
    }
}

/// Piecewise range modifier: bonus for shots closer than the "optimal"
/// distance `o = 0.3 * max_range`, tapering penalty beyond it.
fn range_modifier(distance_ft: f64, max_range_ft: f64) -> f64 {
    if max_range_ft <= 0.0 {
        return 0.0;
    }
    let optimal = 0.3 * max_range_ft;
    if distance_ft <= optimal {
        10.0 * (1.0 - distance_ft / optimal)
    } else {
        -((distance_ft - optimal) / (max_range_ft - optimal)) * 20.0
    }
}

/// The weapon-type skill name a weapon's accuracy bonus draws from.
fn matching_skill_name(weapon_name_lower: &str) -> Option<&'static str> {
    match weapon_name_lower {
        n if n.contains("pistol") => Some("pistol"),
        n if n.contains("rifle") => Some("rifle"),
        n if n.contains("submachine") || n.contains("smg") => Some("submachine_gun"),
        _ => None,
    }
}

/// Everything the hit-chance formula needs, gathered from the shooter,
/// target, and the collaborators (aiming/burst/defense) that contributed a
/// modifier already.
pub struct HitChanceInputs<'a> {
    pub shooter: &'a Character,
    pub target: &'a Character,
    pub distance_ft: f64,
    pub max_range_ft: f64,
    pub weapon_accuracy: i32,
    pub weapon_skill_name: Option<&'static str>,
    pub is_melee: bool,
    pub shooter_is_moving: bool,
    pub aim: AimBonus,
    pub burst_follow_up: bool,
    pub target_perpendicular_speed_fps: f64,
    pub defense_roll: f64,
    pub stress_base: i32,
    pub now: Tick,
    pub bravery_duration_ticks: u64,
}

/// A fully broken-down hit-chance computation, useful for tests and
/// diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitChanceBreakdown {
    pub dexterity: i32,
    pub stress: i32,
    pub range: f64,
    pub weapon_accuracy: i32,
    pub shooter_movement: i32,
    pub aiming: i32,
    pub burst_penalty: i32,
    pub target_movement: f64,
    pub wound: i32,
    pub skill: i32,
    pub target_position: i32,
    pub bravery: i32,
    pub first_attack: i32,
    pub firing_state: i32,
    pub defense: f64,
    pub total: f64,
}

/// Compute the chance-to-hit percentage as an ordered sum of independent
/// modifiers. The result may be negative or exceed 100 before the caller
/// applies the in-range floor -- flooring only makes sense once the caller
/// knows the shot is in range.
pub fn compute_hit_chance(inputs: &HitChanceInputs) -> HitChanceBreakdown {
    let shooter = inputs.shooter;
    let target = inputs.target;

    let dexterity = stat_to_modifier(shooter.stats.dexterity);
    let coolness = stat_to_modifier(shooter.stats.coolness);
    let stress = (inputs.stress_base + coolness).min(0);

    let range = if inputs.is_melee {
        0.0
    } else {
        range_modifier(inputs.distance_ft, inputs.max_range_ft)
    };

    let shooter_movement =
        shooter_movement_modifier(inputs.shooter_is_moving, shooter.movement_type);

    let burst_penalty = if inputs.burst_follow_up {
        BURST_AUTO_PENALTY
    } else {
        0
    };
    // Aiming is disregarded entirely for follow-up burst/auto shots.
    let aiming = if inputs.burst_follow_up { 0 } else { inputs.aim.modifier };

    let target_movement = -2.0 * inputs.target_perpendicular_speed_fps;

    let wound = wound_accuracy_modifier(shooter);

    let skill_level = inputs
        .weapon_skill_name
        .map(|name| shooter.skill_level(name))
        .unwrap_or(0);
    let mut skill = 5 * skill_level as i32;
    if inputs.aim.very_careful_benefits {
        skill *= 2;
    }

    let target_position = target_position_modifier(target.stance);

    let bravery = bravery_modifier(shooter, inputs.now, inputs.bravery_duration_ticks);

    let first_attack = if shooter.scratch.first_attack_on_target && !inputs.aim.very_careful_benefits {
        -15
    } else {
        0
    };

    // Melee swings never carry the ranged not-aiming penalty; a ranged shot
    // fired from aiming is exempt too -- only pointed-from-hip shots pay it.
    let firing_state = if !inputs.is_melee && !inputs.aim.firing_from_aiming {
        -20
    } else {
        0
    };

    let defense = if inputs.is_melee { -inputs.defense_roll } else { 0.0 };

    let total = 50.0
        + dexterity as f64
        + stress as f64
        + range
        + inputs.weapon_accuracy as f64
        + shooter_movement as f64
        + aiming as f64
        + burst_penalty as f64
        + target_movement
        + wound as f64
        + skill as f64
        + target_position as f64
        + bravery as f64
        + first_attack as f64
        + firing_state as f64
        + defense;

    HitChanceBreakdown {
        dexterity,
        stress,
        range,
        weapon_accuracy: inputs.weapon_accuracy,
        shooter_movement,
        aiming,
        burst_penalty,
        target_movement,
        wound,
        skill,
        target_position,
        bravery,
        first_attack,
        firing_state,
        defense,
        total,
    }
}

/// Floor a computed in-range chance at the minimum guaranteed chance.
pub fn floor_in_range_chance(chance: f64) -> f64 {
    chance.clamp(MIN_IN_RANGE_CHANCE, 100.0)
}

/// Resolve a roll against a (pre-floored, in-range) chance: hit iff
/// `roll < chance`.
pub fn resolve_roll(chance: f64, rng: &mut RandomProvider) -> (bool, f64) {
    let roll = rng.next_double() * 100.0;
    (roll < chance, roll)
}

/// Body part struck, derived from the roll and the (unfloored) chance.
pub fn derive_hit_location(roll: f64, chance: f64, rng: &mut RandomProvider) -> BodyPart {
    let excellent_threshold = 0.2 * chance;
    let good_threshold = 0.7 * chance;

    if roll < excellent_threshold {
        if rng.next_double() < 0.15 {
            BodyPart::Head
        } else {
            BodyPart::Chest
        }
    } else if roll < good_threshold {
        if rng.next_double() < 0.02 {
            BodyPart::Head
        } else if rng.next_boolean() {
            BodyPart::Chest
        } else {
            BodyPart::Abdomen
        }
    } else {
        let r = rng.next_double() * 100.0;
        if r < 12.0 {
            BodyPart::LeftArm
        } else if r < 24.0 {
            BodyPart::RightArm
        } else if r < 32.0 {
            BodyPart::LeftShoulder
        } else if r < 40.0 {
            BodyPart::RightShoulder
        } else if r < 50.0 {
            BodyPart::Head
        } else if r < 65.0 {
            BodyPart::LeftLeg
        } else {
            BodyPart::RightLeg
        }
    }
}

/// Whether the shot was "excellent" (always-critical) per the same roll
/// used for location derivation.
pub fn is_excellent_shot(roll: f64, chance: f64) -> bool {
    roll < 0.2 * chance
}

/// Roll wound severity. Excellent shots are always critical and never
/// consume this roll.
pub fn derive_severity(body_part: BodyPart, rng: &mut RandomProvider) -> Severity {
    let roll = rng.next_double() * 100.0;
    if body_part.is_vital() {
        if roll < 30.0 {
            Severity::Critical
        } else if roll < 70.0 {
            Severity::Serious
        } else if roll < 95.0 {
            Severity::Light
        } else {
            Severity::Scratch
        }
    } else if roll < 10.0 {
        Severity::Critical
    } else if roll < 35.0 {
        Severity::Serious
    } else if roll < 80.0 {
        Severity::Light
    } else {
        Severity::Scratch
    }
}

/// Damage for a severity, from weapon base damage, with the head multiplier
/// applied afterward.
pub fn derive_damage(base_damage: i32, severity: Severity, body_part: BodyPart) -> i32 {
    let raw = match severity {
        Severity::Critical | Severity::Serious => base_damage,
        Severity::Light => (0.4 * base_damage as f64).round().max(1.0) as i32,
        Severity::Scratch => 1,
    };
    if body_part == BodyPart::Head {
        (raw as f64 * 1.5).round() as i32
    } else {
        raw
    }
}

/// The weapon-type skill name matching `weapon_name`, if it names one of
/// the recognized ranged-weapon skills (pistol, rifle, submachine_gun,
/// quickdraw).
pub fn skill_name_for_weapon(weapon_name: &str) -> Option<&'static str> {
    matching_skill_name(&weapon_name.to_lowercase())
}

pub fn firing_mode_requires_burst_tracking(mode: Option<FiringMode>) -> bool {
    matches!(mode, Some(FiringMode::Burst) | Some(FiringMode::FullAuto))
}

pub fn weapon_kind_matches(kind: WeaponKind, is_melee: bool) -> bool {
    matches!(
        (kind, is_melee),
        (WeaponKind::Melee, true) | (WeaponKind::Ranged, false)
    )
}

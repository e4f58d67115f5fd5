//! Wound accuracy penalties and bravery checks.

use crate::character::{BodyPart, Character, Handedness, Severity};
use crate::clock::Tick;
use crate::rng::RandomProvider;
use crate::stats::stat_to_modifier;

/// Accuracy penalty per unexpired bravery failure.
pub const BRAVERY_FAILURE_PENALTY: i32 = -10;

/// A character's dominant arm, used by the wound accuracy table: head or
/// dominant-arm wounds cost the full damage. Ambidextrous characters are
/// treated as right-dominant, matching how the right side is favored
/// elsewhere in the hit-location distribution.
fn dominant_arm(handedness: Handedness) -> BodyPart {
    match handedness {
        Handedness::Left => BodyPart::LeftArm,
        Handedness::Right | Handedness::Ambidextrous => BodyPart::RightArm,
    }
}

/// Sum of accuracy penalties from a shooter's own wounds: head or
/// dominant-arm wounds subtract their full damage; every other wound
/// subtracts a severity-based flat amount.
pub fn wound_accuracy_modifier(character: &Character) -> i32 {
    let dominant = dominant_arm(character.handedness);
    character
        .wounds
        .iter()
        .map(|wound| {
            if wound.body_part == BodyPart::Head || wound.body_part == dominant {
                -wound.damage
            } else {
                -match wound.severity {
                    Severity::Light => 1,
                    Severity::Serious => 2,
                    Severity::Critical => wound.damage,
                    Severity::Scratch => 0,
                }
            }
        })
        .sum()
}

/// Total bravery penalty for a character at `now`: `-10` per unexpired
/// failure, stacking additively.
pub fn bravery_modifier(character: &Character, now: Tick, duration_ticks: u64) -> i32 {
    BRAVERY_FAILURE_PENALTY * character.active_bravery_failures(now, duration_ticks) as i32
}

/// Performs bravery checks and records failures.
#[derive(Debug, Clone, Default)]
pub struct BraveryTracker;

impl BraveryTracker {
    pub fn new() -> Self {
        Self
    }

    /// Roll a bravery check for `character` at `now`. Target number is
    /// `50 + coolness_modifier`; a roll strictly above the target is a
    /// failure, recorded with the current tick. Returns whether the check
    /// failed. Incapacitated characters are never checked.
    pub fn check(&self, character: &mut Character, now: Tick, rng: &mut RandomProvider) -> bool {
        if character.is_incapacitated() {
            return false;
        }
        let target = 50.0 + stat_to_modifier(character.stats.coolness) as f64;
        let roll = rng.next_double() * 100.0;
        let failed = roll > target;
        if failed {
            character.bravery_failures.push(now);
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Stats, Wound};

    fn stats() -> Stats {
        Stats {
            dexterity: 50,
            strength: 50,
            reflexes: 50,
            coolness: 50,
            max_health: 20,
        }
    }

    #[test]
    fn head_wound_costs_full_damage() {
        let mut c = Character::new(1, "A", 1, stats());
        c.wounds.push(Wound {
            body_part: BodyPart::Head,
            severity: Severity::Serious,
            damage: 9,
        });
        assert_eq!(wound_accuracy_modifier(&c), -9);
    }

    #[test]
    fn dominant_arm_wound_costs_full_damage() {
        let mut c = Character::new(1, "A", 1, stats());
        c.handedness = Handedness::Right;
        c.wounds.push(Wound {
            body_part: BodyPart::RightArm,
            severity: Severity::Light,
            damage: 4,
        });
        assert_eq!(wound_accuracy_modifier(&c), -4);
    }

    #[test]
    fn off_hand_wound_uses_severity_table() {
        let mut c = Character::new(1, "A", 1, stats());
        c.handedness = Handedness::Right;
        c.wounds.push(Wound {
            body_part: BodyPart::LeftArm,
            severity: Severity::Serious,
            damage: 99,
        });
        assert_eq!(wound_accuracy_modifier(&c), -2);
    }

    #[test]
    fn scratch_wounds_cost_nothing_off_vital() {
        let mut c = Character::new(1, "A", 1, stats());
        c.wounds.push(Wound {
            body_part: BodyPart::LeftLeg,
            severity: Severity::Scratch,
            damage: 1,
        });
        assert_eq!(wound_accuracy_modifier(&c), 0);
    }

    #[test]
    fn bravery_modifier_stacks_additively() {
        let mut c = Character::new(1, "A", 1, stats());
        c.bravery_failures.push(Tick(100));
        c.bravery_failures.push(Tick(150));
        assert_eq!(bravery_modifier(&c, Tick(200), 180), -20);
    }

    #[test]
    fn incapacitated_characters_never_check_bravery() {
        let tracker = BraveryTracker::new();
        let mut rng = RandomProvider::from_seed(1);
        let mut c = Character::new(1, "A", 1, stats());
        c.current_health = 0;
        assert!(!tracker.check(&mut c, Tick(0), &mut rng));
        assert!(c.bravery_failures.is_empty());
    }
}

//! Auto-targeting and persistent attack.

use crate::clock::Tick;
use crate::faction::FactionTable;
use crate::unit::{EntityStore, Point};

struct UnitSnapshot {
    id: i64,
    faction_id: i64,
    position: Point,
    incapacitated: bool,
}

/// Nearest-hostile-unit auto-targeting with target-zone preference.
///
/// This is the entirety of the "AI" the core provides -- nearest-hostile
/// selection with target-zone preference, nothing more elaborate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoTargetingController;

impl AutoTargetingController {
    pub fn new() -> Self {
        Self
    }

    /// Run one tick of the per-character targeting loop, in character-id
    /// order.
    pub fn update(&self, store: &mut EntityStore, factions: &FactionTable, now: Tick) {
        let snapshot: Vec<UnitSnapshot> = store
            .units()
            .map(|u| UnitSnapshot {
                id: u.id,
                faction_id: u.character.faction_id,
                position: u.position,
                incapacitated: u.character.is_incapacitated(),
            })
            .collect();

        for id in store.ids_sorted() {
            let (blocked, incapacitated, auto_on, faction_id, position, current_target, zone) = {
                let unit = match store.get(id) {
                    Some(u) => u,
                    None => continue,
                };
                let recovery_blocks = unit
                    .character
                    .scratch
                    .recovery_until
                    .map(|until| now <= until)
                    .unwrap_or(false);
                let hesitation_blocks = unit
                    .character
                    .scratch
                    .hesitation_until
                    .map(|until| now <= until)
                    .unwrap_or(false);
                (
                    recovery_blocks || hesitation_blocks,
                    unit.character.is_incapacitated(),
                    unit.character.auto_targeting,
                    unit.character.faction_id,
                    unit.position,
                    unit.character.target_id,
                    unit.character.target_zone,
                )
            };

            if incapacitated || !auto_on || blocked {
                continue;
            }

            let retained = current_target.and_then(|target_id| {
                snapshot
                    .iter()
                    .find(|s| s.id == target_id)
                    .filter(|s| !s.incapacitated && factions.is_hostile(faction_id, s.faction_id))
                    .map(|s| s.id)
            });

            let chosen = retained.or_else(|| {
                select_nearest_hostile(&snapshot, id, faction_id, position, zone, factions)
            });

            let unit = store.get_mut(id).expect("id came from this store's own iteration");
            match chosen {
                Some(target_id) => {
                    let retargeted = unit.character.target_id != Some(target_id);
                    unit.character.target_id = Some(target_id);
                    unit.character.persistent_attack = true;
                    if retargeted {
                        unit.character.scratch.first_attack_on_target = true;
                    }
                }
                None => {
                    unit.character.target_id = None;
                    unit.character.persistent_attack = false;
                }
            }
        }
    }
}

/// Nearest hostile, non-incapacitated unit by Euclidean pixel distance.
/// Units inside `zone` are preferred; if the zone contains none, falls back
/// to the nearest global hostile.
fn select_nearest_hostile(
    snapshot: &[UnitSnapshot],
    searcher_id: i64,
    searcher_faction: i64,
    searcher_position: Point,
    zone: Option<crate::character::TargetZone>,
    factions: &FactionTable,
) -> Option<i64> {
    let hostiles: Vec<&UnitSnapshot> = snapshot
        .iter()
        .filter(|s| {
            s.id != searcher_id
                && !s.incapacitated
                && factions.is_hostile(searcher_faction, s.faction_id)
        })
        .collect();

    if let Some(zone) = zone {
        let in_zone: Vec<&&UnitSnapshot> = hostiles
            .iter()
            .filter(|s| zone.contains(s.position.x, s.position.y))
            .collect();
        if let Some(nearest) = nearest_of(&in_zone, searcher_position) {
            return Some(nearest);
        }
        // Zone had nothing hostile in it: fall back to the global nearest.
    }

    nearest_of(&hostiles.iter().collect::<Vec<_>>(), searcher_position)
}

fn nearest_of(candidates: &[&&UnitSnapshot], from: Point) -> Option<i64> {
    candidates
        .iter()
        .min_by(|a, b| {
            let da = from.distance_to(a.position);
            let db = from.distance_to(b.position);
            da.partial_cmp(&db).unwrap()
        })
        .map(|s| s.id)
}

//! Spatial wrapper around a character, and the entity store that owns both.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::clock::Tick;
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A spatial wrapper around exactly one [`Character`], owning it for the
/// simulation's lifetime. `id` matches the owned character's id -- a unit
/// and its character share one id space, since a unit never outlives or
/// changes which character it wraps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub position: Point,
    pub movement_target: Option<Point>,
    pub facing_deg: f64,
    pub target_facing_deg: f64,
    pub rotating: bool,
    pub last_tick_updated: Option<Tick>,
    pub character: Character,
}

impl Unit {
    pub fn new(position: Point, character: Character) -> Self {
        Self {
            id: character.id,
            position,
            movement_target: None,
            facing_deg: 0.0,
            target_facing_deg: 0.0,
            rotating: false,
            last_tick_updated: None,
            character,
        }
    }

    pub fn has_target(&self) -> bool {
        self.movement_target.is_some()
    }
}

/// Owns every [`Unit`] (and, transitively, [`Character`]) in the
/// simulation, keyed by stable integer id. Units persist from registration
/// to simulation end -- this store never removes a unit, only mutates it
/// in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    units: HashMap<i64, Unit>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Register a unit. Panics if a unit with this id is already
    /// registered -- registration happens once, at scenario setup, so a
    /// collision indicates a setup bug rather than a runtime condition to
    /// recover from.
    pub fn register(&mut self, unit: Unit) {
        assert!(
            !self.units.contains_key(&unit.id),
            "unit id {} already registered",
            unit.id
        );
        self.units.insert(unit.id, unit);
    }

    pub fn get(&self, id: i64) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn try_get(&self, id: i64) -> SimResult<&Unit> {
        self.get(id).ok_or(SimError::UnknownUnit(id))
    }

    pub fn try_get_mut(&mut self, id: i64) -> SimResult<&mut Unit> {
        self.units.get_mut(&id).ok_or(SimError::UnknownUnit(id))
    }

    /// Snapshot of every unit, for auto-targeting's once-per-pass scan.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut()
    }

    /// Units in ascending id order -- used wherever a stable iteration
    /// order is required (auto-targeting and movement passes).
    pub fn ids_sorted(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, Stats};

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
    fn register_and_fetch_roundtrip() {
        let mut store = EntityStore::new();
        let c = Character::new(1, "Alice", 1, stats());
        store.register(Unit::new(Point::new(0.0, 0.0), c));
        assert!(store.get(1).is_some());
        assert!(store.get(2).is_none());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_registration_panics() {
        let mut store = EntityStore::new();
        store.register(Unit::new(Point::new(0.0, 0.0), Character::new(1, "A", 1, stats())));
        store.register(Unit::new(Point::new(1.0, 1.0), Character::new(1, "B", 1, stats())));
    }

    #[test]
    fn ids_sorted_is_stable_ascending() {
        let mut store = EntityStore::new();
        for id in [5, -2, 10, 1] {
            store.register(Unit::new(Point::new(0.0, 0.0), Character::new(id, "x", 1, stats())));
        }
        assert_eq!(store.ids_sorted(), vec![-2, 1, 5, 10]);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-9);
    }
}

//! Priority-queue event scheduler.
//!
//! A binary min-heap keyed on `(tick, sequence)`, where `sequence` is a
//! monotonically increasing insertion counter used only to break ties so
//! that equal-tick events fire in insertion (FIFO) order. Owner tags let a
//! character's entire pending-action set be cancelled in one call, which is
//! how incapacitation is implemented.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::clock::Tick;

/// Sentinel owner id for events that belong to no character (e.g. world
/// ticks, scenario scripting). Chosen outside the id space described by the
/// data model (positive user ids, negative built-in ids).
pub const WORLD_OWNER: i64 = i64::MIN;

/// What a scheduled event does when it fires. Data, not a closure -- keeps
/// events serializable and keeps the scheduler itself free of simulation
/// logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Advance a weapon from its current named state to the next state the
    /// weapon's state machine declares.
    WeaponTransition { to_state: String },
    /// Resolve the impact of a ranged shot fired earlier.
    ResolveRangedImpact { target_id: i64 },
    /// Resolve the impact of a melee swing begun earlier.
    ResolveMeleeImpact { target_id: i64 },
    /// End of a post-attack recovery window; the weapon may act again.
    RecoveryComplete,
    /// Arbitrary scenario/test hook, identified by name.
    Custom { name: String },
}

/// `{ tick, action, owner_id }` as specified in the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub tick: Tick,
    pub action: Action,
    pub owner_id: i64,
}

/// Heap entry: ordered by `(tick, sequence)` ascending, with `BinaryHeap`'s
/// max-heap behavior inverted via `Reverse`-style manual `Ord`.
#[derive(Debug, Clone)]
struct HeapEntry {
    tick: Tick,
    sequence: u64,
    event: ScheduledEvent,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.sequence == other.sequence
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the earliest (tick, sequence)
        // pops first.
        (other.tick, other.sequence).cmp(&(self.tick, self.sequence))
    }
}

/// Min-heap of timestamped actions keyed by tick, with owner-scoped
/// cancellation.
pub struct EventScheduler {
    heap: BinaryHeap<HeapEntry>,
    next_sequence: u64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Schedule an event. `tick` must be `>= current_tick`; callers are
    /// expected to pass the clock's current tick as a lower bound (the
    /// scheduler itself has no notion of "now", so it cannot enforce this --
    /// see [`EventScheduler::drain_due`] for where the invariant matters).
    pub fn schedule(&mut self, tick: Tick, owner_id: i64, action: Action) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(HeapEntry {
            tick,
            sequence,
            event: ScheduledEvent {
                tick,
                action,
                owner_id,
            },
        });
    }

    /// Remove all pending events owned by `owner_id`. Events already drained
    /// (in-flight or completed) are unaffected. A repeated call after the
    /// first is a no-op.
    pub fn cancel_owner(&mut self, owner_id: i64) {
        let remaining: BinaryHeap<HeapEntry> = self
            .heap
            .drain()
            .filter(|entry| entry.event.owner_id != owner_id)
            .collect();
        self.heap = remaining;
    }

    /// Drain and return every event with `tick <= current_tick`, in
    /// ascending `(tick, insertion)` order, removing them from the queue.
    ///
    /// Events enqueued *during* this drain (by the caller processing the
    /// returned events) are included only if their tick is `<= current_tick`
    /// AND they were inserted before the snapshot ceiling taken at entry --
    /// this "snapshotting the insertion ceiling" is what prevents an event
    /// that re-enqueues itself every tick from looping forever within a
    /// single drain. In this implementation the ceiling is enforced by the
    /// caller re-invoking `drain_due` only after applying the previous
    /// batch, so a second `drain_due` call at the same `current_tick`
    /// naturally only sees events scheduled after the first call returned --
    /// callers that want the exact one-shot semantics should call
    /// `drain_due` once per tick, as [`crate::game_loop`] does.
    pub fn drain_due(&mut self, current_tick: Tick) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.tick > current_tick {
                break;
            }
            let entry = self.heap.pop().unwrap();
            due.push(entry.event);
        }
        due
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Peek the tick of the next due event, if any.
    pub fn next_tick(&self) -> Option<Tick> {
        self.heap.peek().map(|e| e.tick)
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_events_in_tick_order() {
        let mut sched = EventScheduler::new();
        sched.schedule(Tick(5), 1, Action::RecoveryComplete);
        sched.schedule(Tick(3), 1, Action::RecoveryComplete);
        sched.schedule(Tick(10), 1, Action::RecoveryComplete);

        let due = sched.drain_due(Tick(5));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].tick, Tick(3));
        assert_eq!(due[1].tick, Tick(5));
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn equal_tick_events_fire_in_insertion_order() {
        let mut sched = EventScheduler::new();
        sched.schedule(Tick(1), 1, Action::Custom { name: "a".into() });
        sched.schedule(Tick(1), 2, Action::Custom { name: "b".into() });
        sched.schedule(Tick(1), 3, Action::Custom { name: "c".into() });

        let due = sched.drain_due(Tick(1));
        let names: Vec<_> = due
            .iter()
            .map(|e| match &e.action {
                Action::Custom { name } => name.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn cancel_owner_removes_only_that_owners_events() {
        let mut sched = EventScheduler::new();
        sched.schedule(Tick(10), 1, Action::RecoveryComplete);
        sched.schedule(Tick(10), 2, Action::RecoveryComplete);
        sched.schedule(Tick(20), 1, Action::RecoveryComplete);

        sched.cancel_owner(1);
        assert_eq!(sched.len(), 1);
        let due = sched.drain_due(Tick(100));
        assert_eq!(due[0].owner_id, 2);
    }

    #[test]
    fn cancel_owner_is_idempotent() {
        let mut sched = EventScheduler::new();
        sched.schedule(Tick(10), 1, Action::RecoveryComplete);
        sched.cancel_owner(1);
        assert_eq!(sched.len(), 0);
        sched.cancel_owner(1);
        assert_eq!(sched.len(), 0);
    }

    #[test]
    fn drain_due_leaves_future_events_queued() {
        let mut sched = EventScheduler::new();
        sched.schedule(Tick(50), 1, Action::RecoveryComplete);
        let due = sched.drain_due(Tick(10));
        assert!(due.is_empty());
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn world_owner_is_outside_character_id_space() {
        // Built-ins are negative, user characters positive; WORLD_OWNER must
        // not collide with either.
        assert!(WORLD_OWNER < i32::MIN as i64);
    }
}

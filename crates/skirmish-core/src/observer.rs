//! Observer hooks exposed to external collaborators.
//!
//! `on_weapon_fired` and `on_hit` are the two events the core exposes to
//! callers. A trait with default no-op methods keeps that a real interface
//! boundary rather than an implicit callback list, and lets tests use
//! [`NullObserver`] with zero ceremony.

use crate::character::{BodyPart, Severity};
use crate::clock::Tick;

pub trait SimObserver {
    /// A weapon was fired; sound-tag plumbing hangs off this.
    fn on_weapon_fired(&mut self, _attacker_id: i64, _weapon_id: i64) {}

    /// An attack connected.
    fn on_hit(
        &mut self,
        _attacker_id: i64,
        _target_id: i64,
        _body_part: BodyPart,
        _severity: Severity,
        _damage: i32,
        _tick: Tick,
    ) {
    }
}

/// An observer that does nothing -- the default for tests and headless runs
/// that don't care about presentation-layer side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SimObserver for NullObserver {}

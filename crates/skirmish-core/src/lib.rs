//! Deterministic, tick-driven tactical combat simulation core.
//!
//! Ticks run at [`clock::TICKS_PER_SECOND`] per simulated second; distance is
//! measured in feet, with [`clock::PIXELS_PER_FOOT`] pixels to the foot for
//! the spatial layer. [`game_loop::GameLoop`] is the entry point: register
//! units into its [`unit::EntityStore`], declare faction relations in its
//! [`faction::FactionTable`], and call [`game_loop::GameLoop::tick`] once per
//! simulated frame.

pub mod aiming;
pub mod burst;
pub mod character;
pub mod clock;
pub mod combat;
pub mod config;
pub mod defense;
pub mod error;
pub mod faction;
pub mod game_loop;
pub mod movement;
pub mod observer;
pub mod rng;
pub mod scheduler;
pub mod stats;
pub mod targeting;
pub mod unit;
pub mod weapon;
pub mod wound;

pub mod prelude {
    pub use crate::character::{
        AimingSpeed, BodyPart, Character, FiringMode, Handedness, MovementType, Severity, Stance,
        Stats, TargetZone, Wound,
    };
    pub use crate::clock::{GameClock, Tick, PIXELS_PER_FOOT, TICKS_PER_SECOND};
    pub use crate::config::SimConfig;
    pub use crate::error::{SimError, SimResult};
    pub use crate::faction::FactionTable;
    pub use crate::game_loop::GameLoop;
    pub use crate::observer::{NullObserver, SimObserver};
    pub use crate::rng::RandomProvider;
    pub use crate::unit::{EntityStore, Point, Unit};
    pub use crate::weapon::{Weapon, WeaponKind, WeaponStateMachine};
}

//! Position, facing, and speed advancement.

use crate::character::MovementType;
use crate::clock::{Tick, TICKS_PER_SECOND};
use crate::unit::{Point, Unit};

/// Base movement speed in feet per second, converted to pixels via
/// [`crate::clock::PIXELS_PER_FOOT`] by callers that need feet (here we work
/// directly in pixels, matching `Unit.position`'s unit).
pub const BASE_SPEED_PX_PER_S: f64 = 42.0 * crate::clock::PIXELS_PER_FOOT;

/// Degrees of rotation per tick; rotations under this amount snap
/// instantly.
pub const ROTATION_DEG_PER_TICK: f64 = 6.0;
pub const ROTATION_SNAP_THRESHOLD_DEG: f64 = 15.0;

/// Effective per-tick movement speed in pixels, after the movement-type
/// multiplier.
pub fn effective_speed_px_per_tick(movement_type: MovementType) -> f64 {
    BASE_SPEED_PX_PER_S * movement_type.speed_multiplier() / TICKS_PER_SECOND as f64
}

/// Advance one unit by one tick: move toward its movement target (snapping
/// if the step would overshoot) and rotate facing toward the direction of
/// travel (or, with no movement target, leave facing as last set by the
/// caller -- combat facing-toward-target is handled by the caller setting
/// `target_facing_deg` before calling this).
pub fn advance_unit(unit: &mut Unit, now: Tick) {
    if unit.character.is_incapacitated() {
        return;
    }

    if let Some(target) = unit.movement_target {
        let dx = target.x - unit.position.x;
        let dy = target.y - unit.position.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < 1.0 {
            unit.position = target;
            unit.movement_target = None;
        } else {
            let speed = effective_speed_px_per_tick(unit.character.movement_type);
            if distance <= speed {
                unit.position = target;
                unit.movement_target = None;
            } else {
                let step_x = dx / distance * speed;
                let step_y = dy / distance * speed;
                unit.position = Point::new(unit.position.x + step_x, unit.position.y + step_y);
            }
            unit.target_facing_deg = heading_degrees(dx, dy);
        }
    }

    rotate_toward_target(unit);
    unit.last_tick_updated = Some(now);
}

/// Heading in degrees, 0 = north, clockwise, for a direction vector.
pub fn heading_degrees(dx: f64, dy: f64) -> f64 {
    // Screen space: +y is typically "south" for pixel coordinates, but the
    // Only the convention (0 = north, clockwise) is fixed -- derive it
    // from atan2 with the axes arranged so that (0, -1) (moving up/north)
    // gives 0 degrees and (1, 0) (moving right/east) gives 90 degrees.
    let angle = dx.atan2(-dy).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

fn rotate_toward_target(unit: &mut Unit) {
    let mut delta = unit.target_facing_deg - unit.facing_deg;
    delta = ((delta % 360.0) + 540.0) % 360.0 - 180.0;

    if delta.abs() <= ROTATION_SNAP_THRESHOLD_DEG {
        unit.facing_deg = unit.target_facing_deg;
        unit.rotating = false;
        return;
    }

    unit.rotating = true;
    let step = ROTATION_DEG_PER_TICK.min(delta.abs()) * delta.signum();
    unit.facing_deg = (unit.facing_deg + step).rem_euclid(360.0);
}

/// Perpendicular component of a target's velocity relative to the
/// shooter-target line of sight: `|v x los_unit|` in 2D, i.e. the
/// magnitude of the cross product between velocity and the normalized
/// line-of-sight vector.
pub fn perpendicular_speed_fps(
    target_velocity_px_per_tick: (f64, f64),
    shooter: Point,
    target: Point,
) -> f64 {
    let los_x = target.x - shooter.x;
    let los_y = target.y - shooter.y;
    let len = (los_x * los_x + los_y * los_y).sqrt();
    if len < f64::EPSILON {
        return 0.0;
    }
    let los_unit_x = los_x / len;
    let los_unit_y = los_y / len;

    let (vx, vy) = target_velocity_px_per_tick;
    let cross = (vx * los_unit_y - vy * los_unit_x).abs();

    // Convert from px/tick to ft/s.
    (cross * TICKS_PER_SECOND as f64) / crate::clock::PIXELS_PER_FOOT
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

    fn unit_at(x: f64, y: f64) -> Unit {
        Unit::new(Point::new(x, y), Character::new(1, "A", 1, stats()))
    }

    #[test]
    fn unit_moves_toward_target_without_overshooting() {
        let mut unit = unit_at(0.0, 0.0);
        unit.character.movement_type = MovementType::Walk;
        unit.movement_target = Some(Point::new(1000.0, 0.0));

        let speed = effective_speed_px_per_tick(MovementType::Walk);
        advance_unit(&mut unit, Tick(1));
        assert!((unit.position.x - speed).abs() < 1e-9);
        assert!(unit.movement_target.is_some());
    }

    #[test]
    fn unit_snaps_to_target_when_step_would_overshoot() {
        let mut unit = unit_at(0.0, 0.0);
        unit.character.movement_type = MovementType::Run;
        unit.movement_target = Some(Point::new(0.1, 0.0));

        advance_unit(&mut unit, Tick(1));
        assert_eq!(unit.position.x, 0.1);
        assert!(unit.movement_target.is_none());
    }

    #[test]
    fn unit_never_moves_more_than_effective_speed_per_tick() {
        let mut unit = unit_at(0.0, 0.0);
        unit.character.movement_type = MovementType::Run;
        unit.movement_target = Some(Point::new(10_000.0, 0.0));

        let max_step = effective_speed_px_per_tick(MovementType::Run);
        for t in 1..100 {
            let before = unit.position;
            advance_unit(&mut unit, Tick(t));
            let moved = before.distance_to(unit.position);
            assert!(moved <= max_step + 1e-9);
        }
    }

    #[test]
    fn incapacitated_unit_does_not_move() {
        let mut unit = unit_at(0.0, 0.0);
        unit.character.current_health = 0;
        unit.movement_target = Some(Point::new(100.0, 0.0));
        advance_unit(&mut unit, Tick(1));
        assert_eq!(unit.position, Point::new(0.0, 0.0));
    }

    #[test]
    fn small_rotation_snaps_instantly() {
        let mut unit = unit_at(0.0, 0.0);
        unit.facing_deg = 0.0;
        unit.target_facing_deg = 10.0;
        rotate_toward_target(&mut unit);
        assert_eq!(unit.facing_deg, 10.0);
        assert!(!unit.rotating);
    }

    #[test]
    fn large_rotation_steps_by_six_degrees() {
        let mut unit = unit_at(0.0, 0.0);
        unit.facing_deg = 0.0;
        unit.target_facing_deg = 90.0;
        rotate_toward_target(&mut unit);
        assert_eq!(unit.facing_deg, 6.0);
        assert!(unit.rotating);
    }

    #[test]
    fn perpendicular_speed_zero_when_moving_along_los() {
        let shooter = Point::new(0.0, 0.0);
        let target = Point::new(100.0, 0.0);
        let speed = perpendicular_speed_fps((5.0, 0.0), shooter, target);
        assert!(speed.abs() < 1e-9);
    }

    #[test]
    fn perpendicular_speed_nonzero_when_crossing_los() {
        let shooter = Point::new(0.0, 0.0);
        let target = Point::new(100.0, 0.0);
        let speed = perpendicular_speed_fps((0.0, 5.0), shooter, target);
        assert!(speed > 0.0);
    }
}

//! hook contract with the physics engine + cast aiming
use bevy::prelude::*;

use crate::config::FishingConfig;
use crate::error::HookError;

/// Which way the angler faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_sign(x: f32) -> Self {
        if x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }
}

/// What the fishing core needs from the physics side. The engine integrates
/// motion and resolves collisions; the core only launches and observes.
pub trait HookPhysics {
    /// Move the hook to `origin`, enable it and give it `velocity`.
    fn launch(&mut self, origin: Vec2, velocity: Vec2) -> Result<(), HookError>;
    fn position(&self) -> Result<Vec2, HookError>;
    fn is_touching_ground(&self) -> Result<bool, HookError>;
    /// Stop the hook where it is (floating on water).
    fn hold(&mut self) -> Result<(), HookError>;
    /// Hide and disable the hook.
    fn deactivate(&mut self) -> Result<(), HookError>;
}

/// Last observed hook state, kept by the state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hook {
    pub position: Vec2,
    pub velocity: Vec2,
    pub active: bool,
    pub grounded: bool,
}

/// Launch parameters for one cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastPlan {
    pub origin: Vec2,
    pub direction: Vec2,
    pub distance: f32,
    pub velocity: Vec2,
}

/// Rod tip in world space for a player standing at `player`.
pub fn rod_tip(player: Vec2, facing: Facing, cfg: &FishingConfig) -> Vec2 {
    player + Vec2::new(cfg.rod_tip_offset.x * facing.sign(), cfg.rod_tip_offset.y)
}

/// Unit cast direction from `tip` toward `pointer`.
///
/// Falls back to the facing direction with a fixed upward component when the
/// pointer has no horizontal offset from the tip (a vertical cast would just
/// drop the hook on the angler), and never points further down than
/// `cfg.max_downward`.
pub fn cast_direction(tip: Vec2, pointer: Vec2, facing: Facing, cfg: &FishingConfig) -> Vec2 {
    let offset = pointer - tip;
    let Some(dir) = offset.try_normalize().filter(|_| offset.x.abs() > f32::EPSILON) else {
        return Vec2::new(facing.sign(), cfg.fallback_upward).normalize();
    };
    if dir.y >= -cfg.max_downward {
        return dir;
    }
    // keep the horizontal side, clamp the dip and rebuild a unit vector
    let x = (1.0 - cfg.max_downward * cfg.max_downward).sqrt() * dir.x.signum();
    Vec2::new(x, -cfg.max_downward)
}

/// Direction, capped distance and launch velocity for a cast.
pub fn plan_cast(tip: Vec2, pointer: Vec2, facing: Facing, cfg: &FishingConfig) -> CastPlan {
    let direction = cast_direction(tip, pointer, facing, cfg);
    let distance = tip.distance(pointer).min(cfg.max_cast_distance);
    CastPlan {
        origin: tip,
        direction,
        distance,
        velocity: direction * distance * cfg.distance_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cfg() -> FishingConfig {
        FishingConfig::default()
    }

    #[test]
    fn rod_tip_mirrors_with_facing() {
        let c = cfg();
        let right = rod_tip(Vec2::ZERO, Facing::Right, &c);
        let left = rod_tip(Vec2::ZERO, Facing::Left, &c);
        assert_eq!(right.x, -left.x);
        assert_eq!(right.y, left.y);
        assert!(right.x > 0.0);
    }

    #[test]
    fn pointer_on_tip_falls_back_to_facing() {
        let c = cfg();
        let tip = Vec2::new(10.0, 20.0);
        let right = cast_direction(tip, tip, Facing::Right, &c);
        let left = cast_direction(tip, tip, Facing::Left, &c);

        assert_relative_eq!(right.length(), 1.0, epsilon = 1e-5);
        assert!(right.x > 0.0 && right.y > 0.0);
        assert_relative_eq!(left.x, -right.x, epsilon = 1e-6);
        assert_relative_eq!(left.y, right.y, epsilon = 1e-6);
    }

    #[test]
    fn pointer_straight_above_uses_facing_default() {
        let c = cfg();
        let tip = Vec2::new(0.0, 0.0);
        let dir = cast_direction(tip, Vec2::new(0.0, 100.0), Facing::Right, &c);
        let expected = Vec2::new(1.0, c.fallback_upward).normalize();
        assert_relative_eq!(dir.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(dir.y, expected.y, epsilon = 1e-6);
    }

    #[test]
    fn regular_aim_points_at_pointer() {
        let c = cfg();
        let dir = cast_direction(Vec2::ZERO, Vec2::new(30.0, 40.0), Facing::Left, &c);
        assert_relative_eq!(dir.x, 0.6, epsilon = 1e-6);
        assert_relative_eq!(dir.y, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn steep_downward_cast_is_capped_and_unit() {
        let c = cfg();
        let dir = cast_direction(Vec2::ZERO, Vec2::new(10.0, -200.0), Facing::Right, &c);
        assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(dir.y, -c.max_downward, epsilon = 1e-6);
        assert!(dir.x > 0.0);
    }

    #[test]
    fn steep_cast_to_the_left_keeps_its_side() {
        let c = cfg();
        let dir = cast_direction(Vec2::ZERO, Vec2::new(-5.0, -50.0), Facing::Right, &c);
        assert!(dir.x < 0.0);
        assert_relative_eq!(dir.y, -c.max_downward, epsilon = 1e-6);
        assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn distance_is_capped() {
        let c = cfg();
        let far = plan_cast(Vec2::ZERO, Vec2::new(10_000.0, 0.0), Facing::Right, &c);
        assert_relative_eq!(far.distance, c.max_cast_distance);
        assert_relative_eq!(
            far.velocity.length(),
            c.max_cast_distance * c.distance_multiplier,
            epsilon = 1e-3
        );
    }

    #[test]
    fn speed_grows_with_pointer_distance() {
        let c = cfg();
        let near = plan_cast(Vec2::ZERO, Vec2::new(50.0, 30.0), Facing::Right, &c);
        let mid = plan_cast(Vec2::ZERO, Vec2::new(150.0, 90.0), Facing::Right, &c);
        assert!(mid.velocity.length() > near.velocity.length());
        assert_relative_eq!(near.direction.x, mid.direction.x, epsilon = 1e-5);
    }
}

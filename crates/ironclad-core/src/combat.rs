//! Shared damage arithmetic.
//!
//! Both the environment-effect engine and direct-hit resolution (projectile
//! impacts, handled by the weapons layer) funnel through these functions so
//! damage behaves identically everywhere:
//!
//! 1. roll a base amount in the descriptor's `[minimum, maximum]`;
//! 2. scale by distance decay across the area of effect;
//! 3. scale by the target's armor factor;
//! 4. truncate to an integer health loss, never below zero.
//!
//! All collision checks work on the ground plane; `z` is ignored.

use glam::Vec3;
use rand::Rng;

/// Rolls a base damage amount uniformly in `[minimum, maximum]`.
///
/// A degenerate range (`maximum <= minimum`) yields `minimum`, so fixed-damage
/// descriptors simply set both bounds equal.
pub fn roll_damage<R: Rng + ?Sized>(rng: &mut R, minimum: u32, maximum: u32) -> u32 {
    if maximum <= minimum {
        return minimum;
    }
    rng.gen_range(minimum..=maximum)
}

/// Scales damage by distance from the center of an area of effect.
///
/// Linear interpolation: full damage at the center, `base * decay` at the
/// rim, clamped at zero. `decay = 1.0` disables falloff. Distances beyond the
/// radius (possible when a target's own radius produced the overlap) clamp to
/// the rim value.
#[must_use]
pub fn aoe_damage(base: u32, decay: f32, radius: f32, distance: f32) -> u32 {
    if radius <= 0.0 {
        return base;
    }

    #[allow(clippy::cast_precision_loss)]
    let raw = base as f32;
    let ratio = (distance / radius).clamp(0.0, 1.0);
    let scaled = raw - raw * ratio + raw * ratio * decay;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        scaled.max(0.0) as u32
    }
}

/// Applies a target's armor factor: `base * (1 - armor_factor)`, truncated
/// toward zero and never negative.
///
/// Armor `0.0` passes damage through untouched; armor `1.0` negates it.
#[must_use]
pub fn effective_damage(base: u32, armor_factor: f32) -> u32 {
    #[allow(clippy::cast_precision_loss)]
    let scaled = base as f32 * (1.0 - armor_factor);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        scaled.max(0.0) as u32
    }
}

/// Returns `true` if two circles on the ground plane overlap.
///
/// The test is strict (`<`): circles that merely touch do not collide.
#[must_use]
pub fn circles_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let reach = radius_a + radius_b;
    dx * dx + dy * dy < reach * reach
}

/// Ground-plane distance between two positions.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

use crate::layout;
use std::f64::consts::TAU;

/// Two candidates closer than this are treated as tied and the lower index
/// wins. Large enough to absorb accumulated floating-point noise, far below
/// any real spacing between items.
pub const TIE_TOLERANCE: f64 = 1e-6;

/// Distance of one item from the front reference angle once the ring is
/// rotated by `rotation`. Items sit at `angle + rotation` in world space.
pub fn front_distance(rotation: f64, angle: f64) -> f64 {
    let effective = layout::normalize(angle + rotation);
    effective.min(TAU - effective)
}

/// Index of the item facing the front reference, or `None` for an empty
/// ring. Read-only and deterministic for identical inputs.
pub fn front_index(rotation: f64, angles: &[f64]) -> Option<usize> {
    angles
        .iter()
        .map(|&angle| front_distance(rotation, angle))
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, distance)| match best {
            Some((_, best_distance)) if distance >= best_distance - TIE_TOLERANCE => best,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI, TAU};

// Exact layouts for the ring sizes menus actually use. Larger rings fall back
// to `i * TAU / n`, which never accumulates error across items.
const RING_1: [f64; 1] = [0.0];
const RING_2: [f64; 2] = [0.0, PI];
const RING_3: [f64; 3] = [0.0, 2.0 * FRAC_PI_3, 4.0 * FRAC_PI_3];
const RING_4: [f64; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];
const RING_5: [f64; 5] = [
    0.0,
    1.256_637_061_435_917_2,
    2.513_274_122_871_834_5,
    3.769_911_184_307_751_7,
    5.026_548_245_743_669,
];
const RING_6: [f64; 6] = [
    0.0,
    FRAC_PI_3,
    2.0 * FRAC_PI_3,
    PI,
    4.0 * FRAC_PI_3,
    5.0 * FRAC_PI_3,
];
const RING_8: [f64; 8] = [
    0.0,
    FRAC_PI_4,
    FRAC_PI_2,
    3.0 * FRAC_PI_4,
    PI,
    5.0 * FRAC_PI_4,
    3.0 * FRAC_PI_2,
    7.0 * FRAC_PI_4,
];

/// Canonical angular positions for a ring of `n` items, evenly spaced over
/// `[0, 2π)` starting at the front reference angle.
pub fn angles(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => RING_1.to_vec(),
        2 => RING_2.to_vec(),
        3 => RING_3.to_vec(),
        4 => RING_4.to_vec(),
        5 => RING_5.to_vec(),
        6 => RING_6.to_vec(),
        8 => RING_8.to_vec(),
        _ => (0..n).map(|i| i as f64 * step(n)).collect(),
    }
}

/// Angular distance between neighbouring items.
pub fn step(n: usize) -> f64 {
    if n == 0 { 0.0 } else { TAU / n as f64 }
}

/// Wraps any angle into `[0, 2π)`.
pub fn normalize(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed delta along the shorter arc from `from` to `to`, in `[-π, π)`.
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    (to - from + PI).rem_euclid(TAU) - PI
}

/// Unsigned angular distance along the shorter arc.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    shortest_delta(b, a).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angles_start_at_zero_and_are_evenly_spaced() {
        for n in 1..=24 {
            let angles = angles(n);
            assert_eq!(angles.len(), n);
            assert_eq!(angles[0], 0.0);

            for (i, angle) in angles.iter().enumerate() {
                assert!((0.0..TAU).contains(angle), "n={n} i={i} angle={angle}");
                let expected = i as f64 * TAU / n as f64;
                assert!((angle - expected).abs() < 1e-12, "n={n} i={i}");
            }

            for pair in angles.windows(2) {
                assert!(pair[1] > pair[0]);
            }
        }
    }

    #[test]
    fn test_angles_empty_ring() {
        assert!(angles(0).is_empty());
        assert_eq!(step(0), 0.0);
    }

    #[test]
    fn test_five_item_constants() {
        let expected = [0.0, 1.2566, 2.5133, 3.7699, 5.0265];
        for (a, e) in angles(5).iter().zip(expected) {
            assert!((a - e).abs() < 1e-4);
        }
    }

    #[test]
    fn test_shortest_delta_never_exceeds_pi() {
        let samples = [-20.0, -7.5, -PI, -1.0, 0.0, 0.3, PI, 4.0, 9.9, 31.0];
        for &from in &samples {
            for &to in &samples {
                let delta = shortest_delta(from, to);
                assert!(delta.abs() <= PI, "from={from} to={to} delta={delta}");
                // walking the delta lands on the same point of the circle
                assert!(angle_difference(from + delta, to) < 1e-9);
            }
        }
    }

    #[test]
    fn test_shortest_delta_takes_short_way_round() {
        assert!((shortest_delta(0.1, TAU - 0.1) + 0.2).abs() < 1e-12);
        assert!((shortest_delta(TAU - 0.1, 0.1) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_normalize() {
        assert!((normalize(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((normalize(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert_eq!(normalize(-1e-20), 0.0);
    }
}

//! Fixed-point math utilities for deterministic path costs.
//!
//! All path costs, speed modifiers, and heuristics use fixed-point
//! arithmetic so that identical queries produce identical routes on
//! every platform. Floating point appears only in serde-facing rule
//! data and in tests.

use fixed::types::I32F32;

/// Fixed-point number type for all navigation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// `sqrt(2)` in fixed-point (raw bits of `sqrt(2) * 2^32`).
pub const SQRT2: Fixed = Fixed::from_bits(6_074_001_000);

/// `sqrt(2) - 2` in fixed-point; the octile diagonal discount.
pub const SQRT2_MINUS_TWO: Fixed = Fixed::from_bits(-2_515_933_592);

/// Heuristic penalty applied when a step changes direction (0.2).
///
/// Discourages zig-zag routes. Affects candidate ranking only, never
/// which destinations are reachable.
pub const TURN_PENALTY: Fixed = Fixed::from_bits(858_993_459);

/// Octile distance between two cells given their coordinate deltas.
///
/// `|dx| + |dy| + (sqrt(2) - 2) * min(|dx|, |dy|)`: the length of the
/// cheapest 8-directional route over an unobstructed grid.
#[must_use]
pub fn octile_distance(dx: i32, dy: i32) -> Fixed {
    let dx = dx.unsigned_abs();
    let dy = dy.unsigned_abs();
    Fixed::from_num(dx + dy) + SQRT2_MINUS_TWO * Fixed::from_num(dx.min(dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Fixed, b: Fixed) {
        let epsilon = Fixed::ONE / Fixed::from_num(100_000);
        assert!((a - b).abs() < epsilon, "expected {b}, got {a}");
    }

    #[test]
    fn test_sqrt2_constant() {
        close(SQRT2 * SQRT2, Fixed::from_num(2));
        close(SQRT2_MINUS_TWO, SQRT2 - Fixed::from_num(2));
    }

    #[test]
    fn test_octile_straight() {
        assert_eq!(octile_distance(3, 0), Fixed::from_num(3));
        assert_eq!(octile_distance(0, -5), Fixed::from_num(5));
        assert_eq!(octile_distance(0, 0), Fixed::ZERO);
    }

    #[test]
    fn test_octile_diagonal() {
        close(octile_distance(1, 1), SQRT2);
        close(octile_distance(-4, 4), SQRT2 * Fixed::from_num(4));
        // 3 diagonal steps plus 2 straight steps
        close(octile_distance(5, 3), SQRT2 * Fixed::from_num(3) + Fixed::from_num(2));
    }

    #[test]
    fn test_octile_symmetry() {
        assert_eq!(octile_distance(2, 7), octile_distance(7, 2));
        assert_eq!(octile_distance(-2, 7), octile_distance(2, -7));
    }
}

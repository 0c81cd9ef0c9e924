//! Distance-to-radio volume model

use glam::Vec2;

/// Manhattan distance, matching the grid's axis-aligned travel cost
#[inline]
pub fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Volume in [0, 1]: 1 on top of the source, 0 at `radius` cells and beyond.
///
/// A non-positive radius degenerates to "audible only exactly on the source".
pub fn volume(player: Vec2, source: Vec2, radius: f32) -> f32 {
    let distance = manhattan(player, source);
    if radius <= 0.0 || radius.is_nan() {
        return if distance == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - distance / radius).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scenario_far_and_near() {
        let source = Vec2::new(10.5, 8.5);
        // Distance 8 + 6 = 14 > 12
        assert_eq!(volume(Vec2::new(2.5, 2.5), source, 12.0), 0.0);
        let near = volume(Vec2::new(9.5, 8.5), source, 12.0);
        assert!((near - (1.0 - 1.0 / 12.0)).abs() < 1e-6);
        assert!((near - 0.9167).abs() < 1e-4);
    }

    #[test]
    fn test_exact_endpoints() {
        let s = Vec2::new(4.0, 4.0);
        assert_eq!(volume(s, s, 12.0), 1.0);
        assert_eq!(volume(Vec2::new(16.0, 4.0), s, 12.0), 0.0);
        assert_eq!(volume(Vec2::new(10.0, 10.0), s, 12.0), 0.0);
    }

    #[test]
    fn test_manhattan_not_euclidean() {
        let s = Vec2::ZERO;
        // Euclidean distance would be ~8.49, Manhattan is 12
        assert_eq!(volume(Vec2::new(6.0, 6.0), s, 12.0), 0.0);
    }

    #[test]
    fn test_degenerate_radius() {
        let s = Vec2::new(1.0, 1.0);
        assert_eq!(volume(s, s, 0.0), 1.0);
        assert_eq!(volume(Vec2::new(1.5, 1.0), s, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_volume_in_unit_range(
            px in -100.0f32..100.0, py in -100.0f32..100.0,
            sx in -100.0f32..100.0, sy in -100.0f32..100.0,
            radius in 0.1f32..50.0,
        ) {
            let v = volume(Vec2::new(px, py), Vec2::new(sx, sy), radius);
            prop_assert!((0.0..=1.0).contains(&v));
        }

        #[test]
        fn prop_volume_non_increasing_with_distance(
            d1 in 0.0f32..30.0, extra in 0.0f32..30.0, radius in 0.5f32..30.0,
        ) {
            let s = Vec2::new(10.0, 10.0);
            let near = volume(s + Vec2::new(d1, 0.0), s, radius);
            let far = volume(s + Vec2::new(d1, extra), s, radius);
            prop_assert!(far <= near);
            if d1 + extra >= radius + 0.01 {
                prop_assert_eq!(far, 0.0);
            }
        }
    }
}

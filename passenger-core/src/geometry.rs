//! Spatial helpers on top of `glam` vectors shared with the host world.
use glam::Vec2;

/// Round both components of a horizontal offset to centimetre precision.
/// Non-finite components collapse to zero.
#[must_use]
pub fn round_cm(offset: Vec2) -> Vec2 {
    Vec2::new(round_component(offset.x), round_component(offset.y))
}

fn round_component(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn round_cm_keeps_two_decimals() {
        let rounded = round_cm(Vec2::new(0.456_7, -1.234_9));
        assert!((rounded.x - 0.46).abs() < 1e-5);
        assert!((rounded.y + 1.23).abs() < 1e-5);
    }

    #[test]
    fn round_cm_zeroes_non_finite_components() {
        let rounded = round_cm(Vec2::new(f32::NAN, f32::INFINITY));
        assert_eq!(rounded, Vec2::ZERO);
    }

    #[test]
    fn anchor_offsets_drop_height_before_rounding() {
        let offset = Vec3::new(-0.512_3, 1.004_9, 0.4);
        let rounded = round_cm(offset.truncate());
        assert!((rounded.x + 0.51).abs() < 1e-5);
        assert!((rounded.y - 1.0).abs() < 1e-5);
    }
}

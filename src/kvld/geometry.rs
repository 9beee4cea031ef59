//! Geometric predicates between pairs of matches.
use crate::features::ScaledOrientedFeature;
use nalgebra::{Rotation2, Vector2};
use std::f32::consts::PI;

/// Radius of the neighbourhood in which matches vote for each other.
///
/// Chosen so that a disc of this radius holds about `3 / inlier_rate`
/// of the `count` features spread over a `width × height` image.
pub fn neighbourhood_range(width: usize, height: usize, inlier_rate: f32, count: usize) -> f32 {
    let area = (width * height) as f32;
    let denom = inlier_rate * count.max(1) as f32 * PI;
    if denom <= 0.0 {
        return f32::INFINITY;
    }
    (3.0 * area / denom).sqrt()
}

/// Relative error of the segment `b1 → b2` predicted from `a1 → a2` by the
/// similarity implied by either endpoint match.
///
/// Each match `a ↔ b` carries a rotation (orientation difference) and a
/// scale ratio. The smaller of the two normalized prediction errors is
/// returned; `f32::INFINITY` for degenerate segments.
pub fn geometric_inconsistency(
    a1: &ScaledOrientedFeature,
    a2: &ScaledOrientedFeature,
    b1: &ScaledOrientedFeature,
    b2: &ScaledOrientedFeature,
) -> f32 {
    let seg_a = Vector2::new(a2.x - a1.x, a2.y - a1.y);
    let seg_b = Vector2::new(b2.x - b1.x, b2.y - b1.y);
    let norm_b = seg_b.norm();
    if norm_b <= f32::EPSILON || seg_a.norm() <= f32::EPSILON {
        return f32::INFINITY;
    }

    let predict = |a: &ScaledOrientedFeature, b: &ScaledOrientedFeature| -> f32 {
        if a.scale <= 0.0 || b.scale <= 0.0 {
            return f32::INFINITY;
        }
        let rotation = Rotation2::new(b.orientation - a.orientation);
        let predicted = rotation * seg_a * (b.scale / a.scale);
        (predicted - seg_b).norm() / norm_b
    };

    predict(a1, b1).min(predict(a2, b2))
}

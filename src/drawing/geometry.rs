//! Geometric primitives for anti-aliased rendering
//!
//! Coverage functions used by the canvas to rasterize discs, rings,
//! and arc segments without a vector backend.

use std::f64::consts::TAU;

/// Smoothstep interpolation for anti-aliasing.
///
/// Returns smooth transition from 0 to 1 as t goes from 0 to 1.
/// Uses Hermite interpolation: 3t² - 2t³
///
/// # Properties
/// - smoothstep(0) = 0
/// - smoothstep(1) = 1
/// - First derivative is 0 at both endpoints (smooth)
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Pixel coverage from a signed distance to an edge.
///
/// # Arguments
/// * `d` - Signed distance to the shape boundary in pixels (positive = inside)
///
/// # Returns
/// * `d >= 0.5`: 1.0 (pixel fully inside)
/// * `d <= -0.5`: 0.0 (pixel fully outside)
/// * Otherwise: smooth transition across the one-pixel band
#[inline]
pub fn coverage_from_distance(d: f64) -> f32 {
    smoothstep((d + 0.5).clamp(0.0, 1.0) as f32)
}

/// Normalize an angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Coverage of a point by a disc centered at the origin.
#[inline]
pub fn disc_coverage(dist: f64, radius: f64) -> f32 {
    coverage_from_distance(radius - dist)
}

/// Coverage of a point by a ring (annulus) centered at the origin.
///
/// The ring is centered on `radius` with total thickness `line_width`,
/// which is how a stroked circle covers pixels.
#[inline]
pub fn ring_coverage(dist: f64, radius: f64, line_width: f64) -> f32 {
    let half = line_width / 2.0;
    coverage_from_distance(half - (dist - radius).abs())
}

/// Coverage of a point by the angular wedge `[start, start + span]`.
///
/// Angles follow screen convention: 0 points along +x and angles grow
/// toward +y (clockwise on screen). Edges are butt caps, so the distance
/// to a wedge edge is the arc length at the point's own radius.
///
/// # Arguments
/// * `angle` - Angle of the point, any range
/// * `dist` - Distance of the point from the center
/// * `start` - Wedge start angle, any range
/// * `span` - Wedge span in radians (`>= 2π` covers everything)
pub fn wedge_coverage(angle: f64, dist: f64, start: f64, span: f64) -> f32 {
    if span >= TAU {
        return 1.0;
    }
    if span <= 0.0 {
        return 0.0;
    }
    let rel = normalize_angle(angle - start);
    // Distance (in pixels) inside the wedge from the nearer edge.
    // Points past the end are measured back from the start when that is closer.
    let inside = if rel <= span {
        (rel.min(span - rel)) * dist
    } else {
        -((rel - span).min(TAU - rel)) * dist
    };
    coverage_from_distance(inside)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_smoothstep_boundaries() {
        assert!((smoothstep(0.0) - 0.0).abs() < 1e-6);
        assert!((smoothstep(1.0) - 1.0).abs() < 1e-6);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-9);
        assert!((normalize_angle(5.0 * PI) - PI).abs() < 1e-9);
        assert!(normalize_angle(TAU) < TAU);
    }

    #[test]
    fn test_ring_coverage() {
        // On the stroke center line
        assert_eq!(ring_coverage(90.0, 90.0, 10.0), 1.0);
        // Well inside the ring's hole and well outside it
        assert_eq!(ring_coverage(80.0, 90.0, 10.0), 0.0);
        assert_eq!(ring_coverage(100.0, 90.0, 10.0), 0.0);
        // On the outer boundary: half covered
        assert!((ring_coverage(95.0, 90.0, 10.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wedge_coverage_wraps_past_zero() {
        // Wedge from 350° spanning 20° covers 0°
        let start = 350f64.to_radians();
        let span = 20f64.to_radians();
        assert_eq!(wedge_coverage(0.0, 90.0, start, span), 1.0);
        assert_eq!(wedge_coverage(PI, 90.0, start, span), 0.0);
    }

    #[test]
    fn test_wedge_full_circle() {
        assert_eq!(wedge_coverage(1.234, 10.0, 0.0, TAU), 1.0);
    }
}

//! Wheel geometry: longitudes to canvas coordinates, and angular separation.
//!
//! The wheel puts 0° Aries at the top and runs clockwise, so a longitude `λ`
//! on radius `r` lands at `(cx + r·sin λ, cy − r·cos λ)`. Both rings, the sign
//! spokes and the glyphs share this mapping.

/// A point on the SVG canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Fixed proportions of the wheel relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelLayout {
    pub size: f64,
    pub center: Point,
    pub zodiac_radius: f64,
    pub natal_radius: f64,
    pub transit_radius: f64,
}

const ZODIAC_FRACTION: f64 = 0.35;
const NATAL_FRACTION: f64 = 0.75;
const TRANSIT_FRACTION: f64 = 0.6;

impl WheelLayout {
    /// Derive the wheel for a square canvas. `None` if any radius is degenerate.
    pub fn for_canvas(size: f64) -> Option<Self> {
        let zodiac_radius = size * ZODIAC_FRACTION;
        let layout = Self {
            size,
            center: Point {
                x: size / 2.0,
                y: size / 2.0,
            },
            zodiac_radius,
            natal_radius: zodiac_radius * NATAL_FRACTION,
            transit_radius: zodiac_radius * TRANSIT_FRACTION,
        };
        let radii = [
            layout.zodiac_radius,
            layout.natal_radius,
            layout.transit_radius,
        ];
        if radii.iter().all(|r| r.is_finite() && *r > 0.0) {
            Some(layout)
        } else {
            None
        }
    }
}

/// Point at `longitude` degrees on a circle of `radius` around `center`.
pub fn point_on_circle(center: Point, radius: f64, longitude: f64) -> Point {
    let rad = longitude.to_radians();
    Point {
        x: center.x + radius * rad.sin(),
        y: center.y - radius * rad.cos(),
    }
}

/// Shortest angular distance between two longitudes, in [0, 180].
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Longitude is usable for drawing.
pub fn is_valid_longitude(longitude: f64) -> bool {
    longitude.is_finite() && (0.0..360.0).contains(&longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn aries_point_is_at_the_top() {
        let c = Point { x: 400.0, y: 400.0 };
        let p = point_on_circle(c, 100.0, 0.0);
        assert!(approx(p.x, 400.0));
        assert!(approx(p.y, 300.0));
    }

    #[test]
    fn longitudes_run_clockwise() {
        let c = Point { x: 400.0, y: 400.0 };
        let cancer = point_on_circle(c, 100.0, 90.0);
        assert!(approx(cancer.x, 500.0));
        assert!(approx(cancer.y, 400.0));

        let libra = point_on_circle(c, 100.0, 180.0);
        assert!(approx(libra.x, 400.0));
        assert!(approx(libra.y, 500.0));
    }

    #[test]
    fn separation_wraps_across_aries() {
        assert!(approx(angular_separation(350.0, 10.0), 20.0));
        assert!(approx(angular_separation(10.0, 350.0), 20.0));
        assert!(approx(angular_separation(202.0, 22.0), 180.0));
        assert!(approx(angular_separation(0.0, 0.0), 0.0));
    }

    #[test]
    fn default_canvas_matches_documented_radii() {
        let layout = WheelLayout::for_canvas(800.0).unwrap();
        assert!(approx(layout.zodiac_radius, 280.0));
        assert!(approx(layout.natal_radius, 210.0));
        assert!(approx(layout.transit_radius, 168.0));
        assert_eq!(layout.center, Point { x: 400.0, y: 400.0 });
    }

    #[test]
    fn degenerate_canvas_has_no_layout() {
        assert!(WheelLayout::for_canvas(0.0).is_none());
        assert!(WheelLayout::for_canvas(-10.0).is_none());
        assert!(WheelLayout::for_canvas(f64::NAN).is_none());
        assert!(WheelLayout::for_canvas(f64::INFINITY).is_none());
    }

    #[test]
    fn longitude_range_is_half_open() {
        assert!(is_valid_longitude(0.0));
        assert!(is_valid_longitude(359.999));
        assert!(!is_valid_longitude(360.0));
        assert!(!is_valid_longitude(-0.5));
        assert!(!is_valid_longitude(f64::NAN));
    }
}

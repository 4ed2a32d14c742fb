//! Spherical-cap math for the geo-filtered job query.

use crate::types::GeoPoint;

/// Earth radius in meters used for radius-to-radians conversion.
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Convert a cap radius in meters to radians on the Earth sphere.
#[inline]
pub fn radius_to_radians(radius_m: f64) -> f64 {
    radius_m / EARTH_RADIUS_M
}

/// Great-circle distance between two points in meters (haversine).
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Whether `point` lies within the spherical cap of `radius_m` around `center`.
#[inline]
pub fn within_cap(center: GeoPoint, radius_m: f64, point: GeoPoint) -> bool {
    distance_m(center, point) <= radius_m
}

/// Latitude/longitude bounding box that fully contains the cap, for cheap
/// index-backed prefiltering. Longitude bounds widen to the full range near
/// the poles where the cos term degenerates. A cap that crosses the
/// antimeridian wraps its longitude bounds back into [-180, 180], so the
/// returned box has `min.lon > max.lon` in that case.
pub fn bounding_box(center: GeoPoint, radius_m: f64) -> (GeoPoint, GeoPoint) {
    let angular = radius_to_radians(radius_m).to_degrees();
    let lat_min = (center.lat - angular).max(-90.0);
    let lat_max = (center.lat + angular).min(90.0);

    let cos_lat = center.lat.to_radians().cos();
    let (lon_min, lon_max) = if cos_lat <= f64::EPSILON {
        (-180.0, 180.0)
    } else {
        let lon_delta = angular / cos_lat;
        if lon_delta >= 180.0 {
            (-180.0, 180.0)
        } else {
            let mut lon_min = center.lon - lon_delta;
            let mut lon_max = center.lon + lon_delta;
            if lon_min < -180.0 {
                lon_min += 360.0;
            }
            if lon_max > 180.0 {
                lon_max -= 360.0;
            }
            (lon_min, lon_max)
        }
    };

    (
        GeoPoint::new(lon_min, lat_min),
        GeoPoint::new(lon_max, lat_max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(-3.70, 40.42);
        assert_eq!(distance_m(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        // One degree of latitude is about 111 km on a sphere of this radius.
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let d = distance_m(a, b);
        assert!((d - 111_317.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn cap_membership() {
        let center = GeoPoint::new(0.0, 0.0);
        let near = GeoPoint::new(0.01, 0.01); // ~1.6 km out
        let far = GeoPoint::new(1.0, 1.0); // ~157 km out
        assert!(within_cap(center, 5_000.0, near));
        assert!(!within_cap(center, 5_000.0, far));
    }

    #[test]
    fn bounding_box_contains_cap() {
        let center = GeoPoint::new(13.40, 52.52);
        let radius = 10_000.0;
        let (min, max) = bounding_box(center, radius);
        // Points just inside the cap along each axis stay inside the box.
        for point in [
            GeoPoint::new(center.lon, center.lat + 0.08),
            GeoPoint::new(center.lon, center.lat - 0.08),
            GeoPoint::new(center.lon + 0.13, center.lat),
            GeoPoint::new(center.lon - 0.13, center.lat),
        ] {
            assert!(within_cap(center, radius, point));
            assert!(point.lat >= min.lat && point.lat <= max.lat);
            assert!(point.lon >= min.lon && point.lon <= max.lon);
        }
    }

    #[test]
    fn box_wraps_across_the_antimeridian() {
        let center = GeoPoint::new(179.9, 0.0);
        let (min, max) = bounding_box(center, 50_000.0);
        // Wrapped box: the eastern edge re-enters from -180.
        assert!(min.lon > max.lon, "expected wrap, got {} .. {}", min.lon, max.lon);
        let inside = GeoPoint::new(-179.9, 0.0);
        assert!(within_cap(center, 50_000.0, inside));
        assert!(inside.lon >= min.lon || inside.lon <= max.lon);
    }

    #[test]
    fn polar_box_spans_all_longitudes() {
        let (min, max) = bounding_box(GeoPoint::new(0.0, 89.9), 50_000.0);
        assert_eq!(min.lon, -180.0);
        assert_eq!(max.lon, 180.0);
    }

    #[test]
    fn radius_conversion_uses_spec_earth_radius() {
        let r = radius_to_radians(EARTH_RADIUS_M);
        assert!((r - 1.0).abs() < 1e-12);
    }
}

//! Geofence validation for report submission.
//!
//! A report must be submitted within [`GEOFENCE_RADIUS_METERS`] of the
//! task's site. Distance is great-circle (Haversine). When either side
//! has no coordinates the check is skipped.

use geo::{HaversineDistance, Point};

/// Maximum distance from the site at which a report is accepted.
pub const GEOFENCE_RADIUS_METERS: f64 = 100.0;

/// Outcome of a geofence check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeofenceDecision {
    /// Either the site or the submission has no coordinates.
    Skipped,
    /// Within the radius, with the measured distance in meters.
    Inside(f64),
    /// Outside the radius, with the measured distance in meters.
    Outside(f64),
}

impl GeofenceDecision {
    /// Whether the submission should be accepted.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, GeofenceDecision::Outside(_))
    }
}

/// Haversine distance in meters between two (latitude, longitude) pairs.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // geo points are (x, y) = (longitude, latitude)
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    a.haversine_distance(&b)
}

/// Runs the geofence check for a report submission.
pub fn check(
    site: Option<(f64, f64)>,
    submitted: Option<(f64, f64)>,
) -> GeofenceDecision {
    let (site, submitted) = match (site, submitted) {
        (Some(s), Some(p)) => (s, p),
        _ => return GeofenceDecision::Skipped,
    };

    let distance = distance_meters(site.0, site.1, submitted.0, submitted.1);
    if distance <= GEOFENCE_RADIUS_METERS {
        GeofenceDecision::Inside(distance)
    } else {
        GeofenceDecision::Outside(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYD_LAT: f64 = 17.3850;
    const HYD_LON: f64 = 78.4867;

    #[test]
    fn test_distance_zero_for_identical_points() {
        assert_eq!(distance_meters(HYD_LAT, HYD_LON, HYD_LAT, HYD_LON), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let d1 = distance_meters(HYD_LAT, HYD_LON, 17.4, 78.5);
        let d2 = distance_meters(17.4, 78.5, HYD_LAT, HYD_LON);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_distance_known_pair() {
        // Roughly 0.001 degrees of latitude is about 111 meters
        let d = distance_meters(HYD_LAT, HYD_LON, HYD_LAT + 0.001, HYD_LON);
        assert!((d - 111.0).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_check_inside_radius() {
        // About 55 meters north of the site
        let decision = check(
            Some((HYD_LAT, HYD_LON)),
            Some((HYD_LAT + 0.0005, HYD_LON)),
        );
        match decision {
            GeofenceDecision::Inside(d) => assert!(d < GEOFENCE_RADIUS_METERS),
            other => panic!("expected Inside, got {:?}", other),
        }
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_check_outside_radius() {
        // About 222 meters north of the site
        let decision = check(
            Some((HYD_LAT, HYD_LON)),
            Some((HYD_LAT + 0.002, HYD_LON)),
        );
        match decision {
            GeofenceDecision::Outside(d) => assert!(d > GEOFENCE_RADIUS_METERS),
            other => panic!("expected Outside, got {:?}", other),
        }
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_check_exact_point_is_inside() {
        let decision = check(Some((HYD_LAT, HYD_LON)), Some((HYD_LAT, HYD_LON)));
        assert_eq!(decision, GeofenceDecision::Inside(0.0));
    }

    #[test]
    fn test_check_skipped_without_coordinates() {
        assert_eq!(check(None, Some((1.0, 2.0))), GeofenceDecision::Skipped);
        assert_eq!(check(Some((1.0, 2.0)), None), GeofenceDecision::Skipped);
        assert_eq!(check(None, None), GeofenceDecision::Skipped);
        assert!(check(None, None).is_allowed());
    }
}

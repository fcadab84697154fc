//! Directional shelter selection
//!
//! Picks the shelter whose bearing from the origin is closest to the safest
//! compass direction. When the origin itself is the safest sample there is no
//! direction to aim for, so the nearest shelter wins instead.

use serde::Serialize;
use tracing::debug;

use crate::geo::{angular_distance, distance_km, initial_bearing};
use crate::models::{CompassDirection, GeoPoint, Shelter};
use crate::{Result, SafeHavenError};

/// How one shelter relates to the origin and the target direction
#[derive(Debug, Clone, Serialize)]
pub struct ShelterMatch {
    pub shelter: Shelter,
    /// Initial bearing from the origin, degrees in [0, 360)
    pub bearing: f64,
    /// Separation from the target bearing in [0, 180]; absent for `center`
    pub angular_distance: Option<f64>,
    pub distance_km: f64,
}

impl ShelterMatch {
    #[must_use]
    pub fn measure(origin: &GeoPoint, shelter: &Shelter, direction: CompassDirection) -> Self {
        let bearing = initial_bearing(origin, &shelter.location);
        Self {
            shelter: shelter.clone(),
            bearing,
            angular_distance: direction
                .target_bearing()
                .map(|target| angular_distance(bearing, target)),
            distance_km: distance_km(origin, &shelter.location),
        }
    }
}

pub struct DirectionalShelterSelector;

impl DirectionalShelterSelector {
    /// Select the shelter best aligned with `direction`.
    ///
    /// Ties go to the earliest shelter in `shelters`. For
    /// [`CompassDirection::Center`] the nearest shelter by ground distance is
    /// chosen. Fails with [`SafeHavenError::NoCandidates`] on an empty slice.
    pub fn select_best<'a>(
        origin: &GeoPoint,
        shelters: &'a [Shelter],
        direction: CompassDirection,
    ) -> Result<&'a Shelter> {
        let first = shelters.first().ok_or(SafeHavenError::NoCandidates)?;

        let target = direction.target_bearing();
        let key = |shelter: &Shelter| match target {
            Some(target) => angular_distance(initial_bearing(origin, &shelter.location), target),
            None => distance_km(origin, &shelter.location),
        };

        let mut best: Option<(&Shelter, f64)> = None;
        for shelter in shelters {
            let value = key(shelter);
            if value.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, min)| value < min) {
                best = Some((shelter, value));
            }
        }

        // only unmeasurable candidates: fall back to the first one
        let chosen = best.map_or(first, |(shelter, _)| shelter);
        debug!(
            "Selected '{}' for direction {} among {} candidates",
            chosen.name,
            direction,
            shelters.len()
        );
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn origin() -> GeoPoint {
        GeoPoint::new(13.0827, 80.2707)
    }

    /// A point roughly 5 km from the origin along `bearing`
    fn at_bearing(bearing: f64) -> GeoPoint {
        let d: f64 = 5.0 / 6371.0;
        let lat1 = origin().latitude.to_radians();
        let lon1 = origin().longitude.to_radians();
        let brg = bearing.to_radians();
        let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * brg.cos()).asin();
        let lon2 = lon1
            + (brg.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());
        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }

    fn shelter(name: &str, location: GeoPoint) -> Shelter {
        Shelter::new(name, location)
    }

    #[test]
    fn test_at_bearing_helper_is_accurate() {
        for bearing in [0.0, 45.0, 88.0, 200.0, 359.0] {
            let measured = initial_bearing(&origin(), &at_bearing(bearing));
            assert!(angular_distance(measured, bearing) < 1e-6);
        }
    }

    #[test]
    fn test_due_north_has_zero_angular_distance() {
        let north = shelter("North Post", GeoPoint::new(13.2, 80.2707));
        let measured = ShelterMatch::measure(&origin(), &north, CompassDirection::North);
        assert!(measured.angular_distance.unwrap() < 1e-9);

        let shelters = vec![shelter("East", at_bearing(90.0)), north.clone()];
        let best =
            DirectionalShelterSelector::select_best(&origin(), &shelters, CompassDirection::North)
                .unwrap();
        assert_eq!(best.name, "North Post");
    }

    #[rstest]
    #[case(CompassDirection::North, "NNW")]
    #[case(CompassDirection::East, "ENE")]
    #[case(CompassDirection::South, "SSW")]
    #[case(CompassDirection::West, "WSW")]
    fn test_selects_closest_bearing(#[case] direction: CompassDirection, #[case] expected: &str) {
        let shelters = vec![
            shelter("NNW", at_bearing(350.0)),
            shelter("ENE", at_bearing(70.0)),
            shelter("SSW", at_bearing(190.0)),
            shelter("WSW", at_bearing(250.0)),
        ];
        let best = DirectionalShelterSelector::select_best(&origin(), &shelters, direction).unwrap();
        assert_eq!(best.name, expected);
    }

    #[test]
    fn test_wraparound_near_north() {
        // 359° is 1° from north while 20° is 20° away
        let shelters = vec![
            shelter("Twenty", at_bearing(20.0)),
            shelter("AlmostNorth", at_bearing(359.0)),
        ];
        let best =
            DirectionalShelterSelector::select_best(&origin(), &shelters, CompassDirection::North)
                .unwrap();
        assert_eq!(best.name, "AlmostNorth");
    }

    #[test]
    fn test_ties_go_to_first_occurrence() {
        let shelters = vec![
            shelter("First", at_bearing(80.0)),
            shelter("Second", at_bearing(80.0)),
        ];
        let best =
            DirectionalShelterSelector::select_best(&origin(), &shelters, CompassDirection::East)
                .unwrap();
        assert_eq!(best.name, "First");
    }

    #[rstest]
    #[case(CompassDirection::North)]
    #[case(CompassDirection::South)]
    #[case(CompassDirection::Center)]
    fn test_single_shelter_always_selected(#[case] direction: CompassDirection) {
        let shelters = vec![shelter("Only", at_bearing(123.0))];
        let best = DirectionalShelterSelector::select_best(&origin(), &shelters, direction).unwrap();
        assert_eq!(best.name, "Only");
    }

    #[test]
    fn test_empty_shelters_fail_fast() {
        let result =
            DirectionalShelterSelector::select_best(&origin(), &[], CompassDirection::North);
        assert!(matches!(result, Err(SafeHavenError::NoCandidates)));
    }

    #[test]
    fn test_center_picks_nearest() {
        let shelters = vec![
            shelter("Far", GeoPoint::new(13.3, 80.2707)),
            shelter("Near", GeoPoint::new(13.09, 80.28)),
            shelter("Middle", GeoPoint::new(13.0827, 80.4)),
        ];
        let best =
            DirectionalShelterSelector::select_best(&origin(), &shelters, CompassDirection::Center)
                .unwrap();
        assert_eq!(best.name, "Near");
    }

    #[test]
    fn test_unmeasurable_candidate_does_not_block_others() {
        let shelters = vec![
            shelter("Broken", GeoPoint::new(f64::NAN, f64::NAN)),
            shelter("Fine", at_bearing(265.0)),
        ];
        let best =
            DirectionalShelterSelector::select_best(&origin(), &shelters, CompassDirection::West)
                .unwrap();
        assert_eq!(best.name, "Fine");
    }

    #[test]
    fn test_unmeasurable_candidates_fall_back_to_first() {
        let shelters = vec![
            shelter("Broken A", GeoPoint::new(f64::NAN, f64::NAN)),
            shelter("Broken B", GeoPoint::new(f64::NAN, f64::NAN)),
        ];
        let best =
            DirectionalShelterSelector::select_best(&origin(), &shelters, CompassDirection::West)
                .unwrap();
        assert_eq!(best.name, "Broken A");
    }

    #[test]
    fn test_measure_reports_distance_and_bearing() {
        let measured = ShelterMatch::measure(
            &origin(),
            &shelter("East", at_bearing(88.0)),
            CompassDirection::East,
        );
        assert!((measured.bearing - 88.0).abs() < 1e-6);
        assert!((measured.angular_distance.unwrap() - 2.0).abs() < 1e-6);
        assert!((measured.distance_km - 5.0).abs() < 0.05);

        let center = ShelterMatch::measure(
            &origin(),
            &shelter("East", at_bearing(88.0)),
            CompassDirection::Center,
        );
        assert!(center.angular_distance.is_none());
    }
}

//! Geographic eligibility.
//!
//! The travel-range check reproduces the legacy comparison verbatim: a
//! great-circle expression scaled by 3959 is compared directly against the
//! worker's configured `max_distance`, without normalising units first.
//! Whether that bound is miles, kilometres, or something else is pending
//! product confirmation; do not "fix" the formula here.

/// WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The great-circle term compared against `max_distance`.
///
/// Out-of-domain `acos` inputs produce NaN, which fails every comparison;
/// that matches the legacy behaviour, where an out-of-range SQL `ACOS`
/// drops the row.
#[must_use]
pub fn great_circle_term(shift: Coordinates, worker: Coordinates) -> f64 {
    let lat = shift.latitude.to_radians();
    let lon = shift.longitude.to_radians();
    let wlat = worker.latitude.to_radians();
    let wlon = worker.longitude.to_radians();

    3959.0 * (lat.cos() * wlat.cos() * (wlon - lon).cos() + lat.sin() * wlat.sin()).acos()
}

/// Whether a worker's configured travel bound admits a shift location.
#[must_use]
pub fn within_travel_range(max_distance: f64, shift: Coordinates, worker: Coordinates) -> bool {
    max_distance >= great_circle_term(shift, worker)
}

#[cfg(test)]
mod tests {
    //! Coverage for the preserved legacy comparison.

    use super::*;
    use rstest::rstest;

    const BOLOGNA: Coordinates = Coordinates {
        latitude: 44.4949,
        longitude: 11.3426,
    };
    // Roughly 35 km north-east of Bologna.
    const FERRARA: Coordinates = Coordinates {
        latitude: 44.8381,
        longitude: 11.6198,
    };
    const ROME: Coordinates = Coordinates {
        latitude: 41.9028,
        longitude: 12.4964,
    };

    #[test]
    fn nearby_worker_is_within_a_generous_bound() {
        assert!(within_travel_range(30.0, BOLOGNA, FERRARA));
    }

    #[test]
    fn distant_worker_exceeds_a_small_bound() {
        assert!(!within_travel_range(30.0, BOLOGNA, ROME));
    }

    #[rstest]
    #[case(BOLOGNA, FERRARA)]
    #[case(BOLOGNA, ROME)]
    fn term_is_positive_for_distinct_points(#[case] a: Coordinates, #[case] b: Coordinates) {
        assert!(great_circle_term(a, b) > 0.0);
    }

    #[test]
    fn term_grows_with_separation() {
        assert!(great_circle_term(BOLOGNA, ROME) > great_circle_term(BOLOGNA, FERRARA));
    }

    #[test]
    fn nan_term_never_satisfies_the_bound() {
        // Force an out-of-domain acos input via a degenerate worker position.
        let degenerate = Coordinates {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        assert!(great_circle_term(BOLOGNA, degenerate).is_nan());
        assert!(!within_travel_range(f64::MAX, BOLOGNA, degenerate));
    }
}

//! Geographic primitives shared by the codec and the wire contract.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
///
/// Latitude is only meaningful in `[-90, 90)`. Longitude may arrive outside
/// `[-180, 180)` and is wrapped before use. Range checks happen at the
/// encode boundary, so out-of-range input surfaces as an explicit error
/// instead of a silently clamped cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Whether `latitude` can be encoded: finite and within `[-90, 90)`.
pub fn latitude_in_range(latitude: f64) -> bool {
    latitude.is_finite() && (-90.0..90.0).contains(&latitude)
}

/// Wraps `longitude` into `[-180, 180)` by whole 360 turns, so 190
/// becomes −170. In-range values pass through untouched; everything else
/// reduces in one step, however many turns out it sits.
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid hands back the modulus itself when the remainder is a
    // hair short of a whole turn; that lands here as exactly 180.0.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitude_range_is_half_open() {
        assert!(latitude_in_range(-90.0));
        assert!(latitude_in_range(0.0));
        assert!(latitude_in_range(89.999999));
        assert!(!latitude_in_range(90.0));
        assert!(!latitude_in_range(-90.000001));
        assert!(!latitude_in_range(f64::NAN));
        assert!(!latitude_in_range(f64::INFINITY));
    }

    #[test]
    fn wraps_longitude_into_half_open_interval() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(180.0), -180.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert_eq!(wrap_longitude(540.0), -180.0);
        assert_eq!(wrap_longitude(0.0), 0.0);
    }

    #[test]
    fn wraps_extreme_longitudes() {
        assert_eq!(wrap_longitude(190.0 + 360.0 * 1.0e9), -170.0);
        assert_eq!(wrap_longitude(-170.0 - 360.0 * 1.0e9), -170.0);
        for longitude in [1.0e10, -1.0e10, 4.7e18, 1.0e308, f64::MAX, -f64::MAX] {
            let wrapped = wrap_longitude(longitude);
            assert!(
                (-180.0..180.0).contains(&wrapped),
                "{longitude} wrapped to {wrapped}"
            );
        }
    }
}

//! Base-32 geohash cell encoding.
//!
//! Cells use the standard geohash alphabet and bit layout, so emitted
//! prefixes line up with cells produced by other tooling. The encoder works
//! on fixed-point integers with one spare symbol of internal precision;
//! truncating a precision `p + 1` cell always yields the precision `p` cell
//! for the same coordinate, which is what makes stored cells queryable by
//! prefix at any coarser precision.

use std::error::Error;
use std::fmt;

use crate::geo::{latitude_in_range, wrap_longitude};

/// Symbol set shared by every geohash implementation (no `a`, `i`, `l`, `o`).
pub const ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Cell length used when the deployment does not configure one.
pub const DEFAULT_PRECISION: usize = 5;

/// Longest supported cell; 12 symbols already exceed practical coordinate
/// resolution.
pub const MAX_PRECISION: usize = 12;

/// Maps bit `i` of a 2- or 3-bit group onto bit `2i`, interleaving one axis
/// onto the even symbol bits while the other axis fills the odd ones.
const SPREAD: [u8; 8] = [0, 1, 4, 5, 16, 17, 20, 21];

/// Why a coordinate could not be turned into a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodeError {
    /// Latitude outside `[-90, 90)`, or a non-finite coordinate.
    InvalidCoordinate { latitude: f64, longitude: f64 },
    /// Requested cell length outside `1..=MAX_PRECISION`.
    InvalidPrecision { requested: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate {
                latitude,
                longitude,
            } => {
                write!(f, "coordinate ({latitude}, {longitude}) cannot be encoded")
            }
            Self::InvalidPrecision { requested } => {
                write!(
                    f,
                    "precision {requested} outside supported range 1..={MAX_PRECISION}"
                )
            }
        }
    }
}

impl Error for EncodeError {}

/// Encodes a coordinate into a geohash cell of `precision` symbols.
///
/// Longitude wraps into `[-180, 180)` first, so 190 and −170 encode
/// identically. Latitude outside `[-90, 90)` is an error, never clamped.
pub fn encode(latitude: f64, longitude: f64, precision: usize) -> Result<String, EncodeError> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(EncodeError::InvalidPrecision {
            requested: precision,
        });
    }
    if !latitude_in_range(latitude) || !longitude.is_finite() {
        return Err(EncodeError::InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    let longitude = wrap_longitude(longitude);

    // One spare symbol keeps the odd/even bit split away from the requested
    // prefix; when the symbol count is odd the longitude axis carries the
    // extra bit, matching the standard layout.
    let symbols = precision + 1;
    let lat_bits = symbols * 5 / 2;
    let lon_bits = if symbols % 2 == 1 {
        lat_bits + 1
    } else {
        lat_bits
    };

    let lat = scale(latitude / 90.0, lat_bits);
    let lon = scale(longitude / 180.0, lon_bits);

    let mut cell = interleave(lat, lon, lat_bits, lon_bits);
    cell.truncate(precision);
    Ok(cell)
}

/// Maps `fraction` in `[-1, 1)` onto `0..2^bits` with floor semantics.
///
/// The scale factor is a power of two, so the multiplication is exact in
/// f64; dropping low bits of the result can never move it across a cell
/// boundary, which is the whole truncation guarantee.
fn scale(fraction: f64, bits: usize) -> i64 {
    let half = 1_i64 << (bits - 1);
    half + (fraction * half as f64).floor() as i64
}

/// Emits symbols from the least significant end, swapping the two axes
/// after each symbol (three bits from one, two from the other), then
/// reverses. The axis holding more bits contributes the leading bit.
fn interleave(lat: i64, lon: i64, lat_bits: usize, lon_bits: usize) -> String {
    let (mut a, mut b) = if lat_bits < lon_bits {
        (lon, lat)
    } else {
        (lat, lon)
    };

    let count = (lat_bits + lon_bits) / 5;
    let mut indexes = Vec::with_capacity(count);
    for _ in 0..count {
        indexes.push(SPREAD[(a & 7) as usize] | (SPREAD[(b & 3) as usize] << 1));
        let carried = a >> 3;
        a = b >> 2;
        b = carried;
    }

    indexes
        .iter()
        .rev()
        .map(|&index| ALPHABET[index as usize] as char)
        .collect()
}

/// Which encoder implementation a deployment runs.
///
/// `Builtin` is the fixed-point encoder in this module. `Library`, behind
/// the `external-codec` feature, delegates to the `geohash` crate after the
/// same validation and wraparound; both emit the same cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    Builtin,
    #[cfg(feature = "external-codec")]
    Library,
}

impl Codec {
    pub fn encode(
        self,
        latitude: f64,
        longitude: f64,
        precision: usize,
    ) -> Result<String, EncodeError> {
        match self {
            Self::Builtin => encode(latitude, longitude, precision),
            #[cfg(feature = "external-codec")]
            Self::Library => encode_with_library(latitude, longitude, precision),
        }
    }
}

#[cfg(feature = "external-codec")]
fn encode_with_library(
    latitude: f64,
    longitude: f64,
    precision: usize,
) -> Result<String, EncodeError> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(EncodeError::InvalidPrecision {
            requested: precision,
        });
    }
    if !latitude_in_range(latitude) || !longitude.is_finite() {
        return Err(EncodeError::InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    let longitude = wrap_longitude(longitude);
    ::geohash::encode(
        ::geohash::Coord {
            x: longitude,
            y: latitude,
        },
        precision,
    )
    .map_err(|_| EncodeError::InvalidCoordinate {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPOTS: [(f64, f64); 9] = [
        (42.605, -5.603),
        (57.64911, 10.40744),
        (0.0, 0.0),
        (-33.86, 151.2),
        (37.8324, 112.5584),
        (-90.0, -180.0),
        (-89.9999, -179.9999),
        (89.9999, 179.9999),
        (0.0001, -0.0001),
    ];

    #[test]
    fn encodes_canonical_cells() {
        assert_eq!(encode(42.605, -5.603, 5).expect("encode"), "ezs42");
        assert_eq!(
            encode(57.64911, 10.40744, 11).expect("encode"),
            "u4pruydqqvj"
        );
        assert_eq!(encode(37.8324, 112.5584, 9).expect("encode"), "ww8p1r4t8");
        assert_eq!(encode(0.0, 0.0, 5).expect("encode"), "s0000");
        assert_eq!(encode(-33.86, 151.2, 2).expect("encode"), "r3");
    }

    #[test]
    fn longer_cells_extend_shorter_ones() {
        for (latitude, longitude) in SPOTS {
            for precision in 1..=11 {
                let shorter = encode(latitude, longitude, precision).expect("shorter");
                let longer = encode(latitude, longitude, precision + 1).expect("longer");
                assert!(
                    longer.starts_with(&shorter),
                    "({latitude}, {longitude}): {longer:?} does not extend {shorter:?}"
                );
            }
        }
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(matches!(
            encode(90.0, 0.0, 5),
            Err(EncodeError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode(-90.001, 0.0, 5),
            Err(EncodeError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode(f64::NAN, 0.0, 5),
            Err(EncodeError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            encode(10.0, f64::INFINITY, 5),
            Err(EncodeError::InvalidCoordinate { .. })
        ));
        assert!(encode(-90.0, 0.0, 5).is_ok());
    }

    #[test]
    fn wraps_longitude_before_encoding() {
        assert_eq!(
            encode(10.0, 190.0, 6).expect("wrapped"),
            encode(10.0, -170.0, 6).expect("direct")
        );
        assert_eq!(
            encode(10.0, 360.0, 6).expect("wrapped"),
            encode(10.0, 0.0, 6).expect("direct")
        );
    }

    #[test]
    fn encodes_extreme_longitudes() {
        let cell = encode(1.0, 1.0e308, 5).expect("encode");
        assert_eq!(cell.len(), 5);
        assert!(cell.bytes().all(|symbol| ALPHABET.contains(&symbol)));
        assert_eq!(
            encode(10.0, -170.0 + 360.0 * 1.0e9, 6).expect("wrapped"),
            encode(10.0, -170.0, 6).expect("direct")
        );
    }

    #[test]
    fn rejects_unsupported_precision() {
        assert!(matches!(
            encode(1.0, 1.0, 0),
            Err(EncodeError::InvalidPrecision { requested: 0 })
        ));
        assert!(matches!(
            encode(1.0, 1.0, 13),
            Err(EncodeError::InvalidPrecision { requested: 13 })
        ));
    }

    #[test]
    fn cells_stay_inside_the_alphabet() {
        for (latitude, longitude) in SPOTS {
            let cell = encode(latitude, longitude, MAX_PRECISION).expect("encode");
            assert_eq!(cell.len(), MAX_PRECISION);
            assert!(cell.bytes().all(|symbol| ALPHABET.contains(&symbol)));
        }
    }

    #[test]
    fn equal_input_encodes_equal_cells() {
        let first = encode(48.8566, 2.3522, 7).expect("encode");
        let second = encode(48.8566, 2.3522, 7).expect("encode");
        assert_eq!(first, second);
    }

    #[cfg(feature = "external-codec")]
    #[test]
    fn library_codec_matches_builtin() {
        for (latitude, longitude) in SPOTS {
            for precision in [1, 2, 5, 9, 12] {
                assert_eq!(
                    Codec::Builtin.encode(latitude, longitude, precision),
                    Codec::Library.encode(latitude, longitude, precision),
                    "({latitude}, {longitude}) at precision {precision}"
                );
            }
        }
    }

    #[cfg(feature = "external-codec")]
    #[test]
    fn library_codec_applies_the_same_validation() {
        assert!(matches!(
            Codec::Library.encode(90.0, 0.0, 5),
            Err(EncodeError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            Codec::Library.encode(10.0, 190.0, 5),
            Ok(cell) if cell == Codec::Builtin.encode(10.0, -170.0, 5).expect("builtin")
        ));
    }
}

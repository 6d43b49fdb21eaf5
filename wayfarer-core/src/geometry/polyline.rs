//! Encoded polyline codec at 1e5 precision.
//!
//! Each coordinate is stored as the signed delta from the previous one,
//! latitude first, using the zig-zag varint alphabet offset by 63.

use geo::Coord;
use thiserror::Error;

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ALPHABET_OFFSET: i64 = 63;

/// Errors returned by [`decode_polyline`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// A byte fell outside the encoding alphabet.
    #[error("invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidByte {
        /// Offending byte.
        byte: u8,
        /// Position of the byte within the input.
        offset: usize,
    },
    /// The input ended in the middle of a value.
    #[error("polyline ended inside a value")]
    Truncated,
    /// A value used more bits than a 64-bit accumulator can hold.
    #[error("polyline value at offset {offset} overflows")]
    Overflow {
        /// Position where the overflowing value started.
        offset: usize,
    },
}

/// Encode coordinates as a polyline string.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::encode_polyline;
///
/// let points = [
///     Coord { x: -120.2, y: 38.5 },
///     Coord { x: -120.95, y: 40.7 },
///     Coord { x: -126.453, y: 43.252 },
/// ];
/// assert_eq!(encode_polyline(&points), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
#[must_use]
pub fn encode_polyline(points: &[Coord<f64>]) -> String {
    let mut encoded = String::new();
    let mut previous = (0_i64, 0_i64);
    for point in points {
        let current = (scale(point.y), scale(point.x));
        encode_value(current.0 - previous.0, &mut encoded);
        encode_value(current.1 - previous.1, &mut encoded);
        previous = current;
    }
    encoded
}

/// Decode a polyline string into coordinates.
///
/// # Errors
/// Returns [`PolylineError`] when the input contains bytes outside the
/// alphabet, ends mid-value, or encodes an oversized value.
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coord<f64>>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut offset = 0;
    let mut lat = 0_i64;
    let mut lng = 0_i64;
    while offset < bytes.len() {
        let start = offset;
        lat = lat
            .checked_add(decode_value(bytes, &mut offset)?)
            .ok_or(PolylineError::Overflow { offset: start })?;
        let start = offset;
        lng = lng
            .checked_add(decode_value(bytes, &mut offset)?)
            .ok_or(PolylineError::Overflow { offset: start })?;
        points.push(Coord {
            x: unscale(lng),
            y: unscale(lat),
        });
    }
    Ok(points)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "coordinates in degrees scaled by 1e5 fit comfortably in i64"
)]
fn scale(value: f64) -> i64 {
    (value * PRECISION).round() as i64
}

#[expect(
    clippy::cast_precision_loss,
    reason = "scaled coordinates stay far below 2^53"
)]
fn unscale(value: i64) -> f64 {
    value as f64 / PRECISION
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION {
        out.push(alphabet_char((CONTINUATION | (value & CHUNK_MASK)) + ALPHABET_OFFSET));
        value >>= CHUNK_BITS;
    }
    out.push(alphabet_char(value + ALPHABET_OFFSET));
}

fn alphabet_char(code: i64) -> char {
    u8::try_from(code).map_or('?', char::from)
}

fn decode_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let start = *offset;
    let mut result = 0_u64;
    let mut shift = 0_u32;
    loop {
        let byte = *bytes.get(*offset).ok_or(PolylineError::Truncated)?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte {
                byte,
                offset: *offset,
            });
        }
        *offset += 1;
        let chunk = u64::from(byte) - ALPHABET_OFFSET.unsigned_abs();
        let bits = chunk & CHUNK_MASK.unsigned_abs();
        // Bits shifted past the top of the accumulator would be lost.
        if shift >= u64::BITS || bits.leading_zeros() < shift {
            return Err(PolylineError::Overflow { offset: start });
        }
        result |= bits << shift;
        shift += CHUNK_BITS;
        if chunk < CONTINUATION.unsigned_abs() {
            break;
        }
    }
    let magnitude =
        i64::try_from(result >> 1).map_err(|_| PolylineError::Overflow { offset: start })?;
    Ok(if result & 1 == 1 { !magnitude } else { magnitude })
}

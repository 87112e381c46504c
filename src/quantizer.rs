//! Maps normalized sample values to unsigned integers.
//!
//! Generators produce values nominally in the range [-1.0, 1.0]. The
//! quantizer shifts and scales them into [0, max_value] of the target
//! resolution:
//!
//! ```text
//! q = round((v + 1) / 2 * max_value)
//! ```
//!
//! Rounding is half away from zero, so 0.0 maps onto the center value
//! 2^(bits - 1). Results are clamped to the valid range, which catches both
//! rounding overshoot at the extremes and generators leaving their nominal
//! range. Non-finite values are rejected instead of clamped, they always point
//! to a broken generator.

use super::Float;
use super::error::{GenError, Result};
use super::resolution::Resolution;

use log::trace;

#[derive(Clone, Copy, Debug)]
pub struct Quantizer {
    resolution: Resolution,
    max_f: Float,
}

impl Quantizer {
    /// Create a quantizer for the given resolution.
    ///
    /// ```
    /// use wavegen::{Quantizer, Resolution};
    ///
    /// let q = Quantizer::new(Resolution::new(8).unwrap());
    /// assert_eq!(q.quantize(-1.0).unwrap(), 0);
    /// assert_eq!(q.quantize(0.0).unwrap(), 128);
    /// assert_eq!(q.quantize(1.0).unwrap(), 255);
    /// ```
    pub fn new(resolution: Resolution) -> Quantizer {
        let max_f = resolution.max_value() as Float;
        Quantizer{resolution, max_f}
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Quantize a single normalized value.
    pub fn quantize(&self, value: Float) -> Result<u64> {
        if !value.is_finite() {
            return Err(GenError::NonFiniteSample { value });
        }
        let q = ((value + 1.0) / 2.0 * self.max_f).round();

        // For 64 bits max_f rounds up to 2^64, so compare before casting
        if q <= 0.0 {
            if q < 0.0 {
                trace!("Clamping {} to 0", value);
            }
            Ok(0)
        } else if q >= self.max_f {
            if q > self.max_f {
                trace!("Clamping {} to {}", value, self.resolution.max_value());
            }
            Ok(self.resolution.max_value())
        } else {
            Ok(q as u64)
        }
    }

    /// Quantize both coordinates of an XY point.
    ///
    /// The coordinates are quantized independently with the same rules.
    pub fn quantize_xy(&self, x: Float, y: Float) -> Result<(u64, u64)> {
        Ok((self.quantize(x)?, self.quantize(y)?))
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use super::resolution::SUPPORTED_BIT_WIDTHS;

#[test]
fn extremes_map_to_range_limits() {
    for bits in SUPPORTED_BIT_WIDTHS.iter() {
        let res = Resolution::new(*bits).unwrap();
        let q = Quantizer::new(res);
        assert_eq!(q.quantize(-1.0).unwrap(), 0, "{} bits", bits);
        assert_eq!(q.quantize(1.0).unwrap(), res.max_value(), "{} bits", bits);
    }
}

#[test]
fn zero_maps_to_center() {
    for bits in SUPPORTED_BIT_WIDTHS.iter() {
        let res = Resolution::new(*bits).unwrap();
        let q = Quantizer::new(res);
        assert_eq!(q.quantize(0.0).unwrap(), res.center(), "{} bits", bits);
        assert_eq!(q.quantize(-0.0).unwrap(), res.center(), "{} bits", bits);
    }
}

#[test]
fn out_of_range_values_are_clamped() {
    let q = Quantizer::new(Resolution::new(10).unwrap());
    assert_eq!(q.quantize(-7.5).unwrap(), 0);
    assert_eq!(q.quantize(1.0001).unwrap(), 1023);
    assert_eq!(q.quantize(1e300).unwrap(), 1023);

    let q = Quantizer::new(Resolution::new(64).unwrap());
    assert_eq!(q.quantize(2.0).unwrap(), u64::MAX);
    assert_eq!(q.quantize(-2.0).unwrap(), 0);
}

#[test]
fn rounding_is_half_away_from_zero() {
    // 0.0 lands exactly on 127.5 and 2047.5
    let q = Quantizer::new(Resolution::new(8).unwrap());
    assert_eq!(q.quantize(0.0).unwrap(), 128);
    let q = Quantizer::new(Resolution::new(12).unwrap());
    assert_eq!(q.quantize(0.0).unwrap(), 2048);

    // Values just off the midpoint go to their nearest neighbour
    assert_eq!(q.quantize(-0.0001).unwrap(), 2047);
    assert_eq!(q.quantize(0.0001).unwrap(), 2048);
}

#[test]
fn non_finite_values_are_rejected() {
    let q = Quantizer::new(Resolution::new(16).unwrap());
    for v in [Float::NAN, Float::INFINITY, Float::NEG_INFINITY].iter() {
        match q.quantize(*v) {
            Err(GenError::NonFiniteSample { .. }) => (),
            other => panic!("Expected NonFiniteSample, got {:?}", other),
        }
    }
    assert!(q.quantize_xy(0.0, Float::NAN).is_err());
}

#[test]
fn xy_coordinates_are_quantized_independently() {
    let q = Quantizer::new(Resolution::new(8).unwrap());
    assert_eq!(q.quantize_xy(-1.0, 1.0).unwrap(), (0, 255));
}

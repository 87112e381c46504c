//! Two dimensional XY patterns for oscilloscope art.
//!
//! A pattern is a parametric curve. For every sample index both coordinates
//! are computed from the same curve parameter t in a single call, which keeps
//! the X and Y tables phase locked when they are played back on two DAC
//! channels.
//!
//! The global amplitude multiplies the shape scale, the global frequency
//! multiplies the speed along the curve and the phase shifts the curve
//! parameter.

use super::Float;
use super::error::{GenError, Result};
use super::wave_functions::{butterfly_radius, check_finite, WaveParams, PI, TWO_PI};

/// The available XY patterns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pattern {
    Circle { radius: Float },
    Ellipse { a: Float, b: Float },
    Lissajous { freq_x: u32, freq_y: u32, scale: Float },
    LissajousCos { freq_x: u32, freq_y: u32, scale: Float },
    Heart { scale: Float },
    Rose { k: Float, scale: Float },
    Butterfly { scale: Float },
    Infinity { scale: Float },
    SpiralArchimedes { turns: Float, scale: Float },
    SpiralLog { scale: Float, growth: Float },
    Hypotrochoid { big_r: Float, r: Float, d: Float, scale: Float },
    Cycloid { radius: Float },
    Astroid { scale: Float },
}

impl Pattern {
    /// Check shape constants and parameters before any sample is computed.
    pub fn validate(&self, generator: &'static str, params: &WaveParams) -> Result<()> {
        params.validate(generator)?;
        let domain = |parameter: &'static str, value: Float| {
            Err(GenError::MathDomain { generator, parameter, value })
        };
        match *self {
            Pattern::Circle { radius } => check_finite(generator, "radius", radius),
            Pattern::Ellipse { a, b } => {
                check_finite(generator, "a", a)?;
                check_finite(generator, "b", b)
            }
            Pattern::Lissajous { freq_x, freq_y, scale }
            | Pattern::LissajousCos { freq_x, freq_y, scale } => {
                if freq_x == 0 {
                    return domain("freq_x", 0.0);
                }
                if freq_y == 0 {
                    return domain("freq_y", 0.0);
                }
                check_finite(generator, "scale", scale)
            }
            Pattern::Rose { k, scale } => {
                check_finite(generator, "k", k)?;
                check_finite(generator, "scale", scale)
            }
            Pattern::SpiralArchimedes { turns, scale } => {
                // r = scale * t / (turns * 2pi)
                if turns == 0.0 || !turns.is_finite() {
                    return domain("turns", turns);
                }
                check_finite(generator, "scale", scale)
            }
            Pattern::SpiralLog { scale, growth } => {
                if scale == 0.0 || !scale.is_finite() {
                    return domain("scale", scale);
                }
                check_finite(generator, "growth", growth)
            }
            Pattern::Hypotrochoid { big_r, r, d, scale } => {
                // Rolling circle radius is a divisor
                if r == 0.0 || !r.is_finite() {
                    return domain("r", r);
                }
                check_finite(generator, "big_r", big_r)?;
                check_finite(generator, "d", d)?;
                check_finite(generator, "scale", scale)
            }
            Pattern::Cycloid { radius } => {
                if radius == 0.0 || !radius.is_finite() {
                    return domain("radius", radius);
                }
                Ok(())
            }
            Pattern::Heart { scale }
            | Pattern::Butterfly { scale }
            | Pattern::Infinity { scale }
            | Pattern::Astroid { scale } => check_finite(generator, "scale", scale),
        }
    }

    /// Calculate both normalized coordinates of a single sample.
    ///
    /// ```
    /// use wavegen::{Pattern, WaveParams};
    ///
    /// let circle = Pattern::Circle { radius: 0.8 };
    /// let (x, y) = circle.point(0, 256, &WaveParams::default());
    /// assert!((x - 0.8).abs() < 1e-12);
    /// assert!(y.abs() < 1e-12);
    /// ```
    pub fn point(&self, index: usize, num_samples: usize, params: &WaveParams) -> (Float, Float) {
        let amp = params.amplitude;
        // Curve parameter for one full turn over the table
        let t = params.angle(index, num_samples);
        match *self {
            Pattern::Circle { radius } => {
                let r = amp * radius;
                (r * t.cos(), r * t.sin())
            }
            Pattern::Ellipse { a, b } => (amp * a * t.cos(), amp * b * t.sin()),
            Pattern::Lissajous { freq_x, freq_y, scale } => {
                // The phase offsets X only, it controls the shape of the figure
                let tau = t - params.phase;
                let s = amp * scale;
                (s * (freq_x as Float * tau + params.phase).sin(), s * (freq_y as Float * tau).sin())
            }
            Pattern::LissajousCos { freq_x, freq_y, scale } => {
                let tau = t - params.phase;
                let s = amp * scale;
                (s * (freq_x as Float * tau + params.phase).cos(), s * (freq_y as Float * tau).sin())
            }
            Pattern::Heart { scale } => {
                let s = amp * scale;
                let x = 16.0 * t.sin().powi(3);
                let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
                (s * x, s * y)
            }
            Pattern::Rose { k, scale } => {
                let r = amp * scale * (k * t).cos();
                (r * t.cos(), r * t.sin())
            }
            Pattern::Butterfly { scale } => {
                let r = amp * scale * butterfly_radius(t);
                (clamp_unit(r * t.sin()), clamp_unit(r * t.cos()))
            }
            Pattern::Infinity { scale } => {
                // Lemniscate of Bernoulli
                let (sin_t, cos_t) = t.sin_cos();
                let denominator = 1.0 + sin_t * sin_t;
                let s = amp * scale;
                (s * cos_t / denominator, s * sin_t * cos_t / denominator)
            }
            Pattern::SpiralArchimedes { turns, scale } => {
                let t = turns * (t - params.phase) + params.phase;
                let r = amp * scale * t / (turns * TWO_PI);
                (r * t.cos(), r * t.sin())
            }
            Pattern::SpiralLog { scale, growth } => {
                // Two turns, radius limited to the unit circle
                let t = 2.0 * (t - params.phase) + params.phase;
                let r = amp * (scale * (growth * t).exp()).min(1.0);
                (r * t.cos(), r * t.sin())
            }
            Pattern::Hypotrochoid { big_r, r, d, scale } => {
                let s = amp * scale;
                let diff = big_r - r;
                let inner = diff * t / r;
                (s * (diff * t.cos() + d * inner.cos()), s * (diff * t.sin() - d * inner.sin()))
            }
            Pattern::Cycloid { radius } => {
                // Two arches, shifted and scaled into the unit square
                let t = 2.0 * (t - params.phase) + params.phase;
                let x = radius * (t - t.sin()) / (4.0 * PI * radius) * 2.0 - 1.0;
                let y = radius * (1.0 - t.cos()) / (2.0 * radius) - 1.0;
                (amp * x, amp * y)
            }
            Pattern::Astroid { scale } => {
                let s = amp * scale;
                (s * t.cos().powi(3), s * t.sin().powi(3))
            }
        }
    }
}

fn clamp_unit(value: Float) -> Float {
    value.max(-1.0).min(1.0)
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
fn is_close_to(actual: Float, expected: Float, delta: Float, index: usize) -> bool {
    let diff = actual - expected;
    if diff > delta || diff < -delta {
        println!("{}: Expected {}, actual {}, delta {}", index, expected, actual, delta);
        false
    } else {
        true
    }
}

#[test]
fn circle_points_lie_on_circle() {
    let p = WaveParams::default();
    let circle = Pattern::Circle { radius: 0.8 };
    for i in 0..128 {
        let (x, y) = circle.point(i, 128, &p);
        assert!(is_close_to((x * x + y * y).sqrt(), 0.8, 1e-12, i));
    }
}

#[test]
fn lissajous_uses_one_parameter_for_both_axes() {
    let p = WaveParams::default();
    let liss = Pattern::Lissajous { freq_x: 3, freq_y: 2, scale: 0.8 };
    for i in 0..256 {
        let t = TWO_PI * i as Float / 256.0;
        let (x, y) = liss.point(i, 256, &p);
        assert!(is_close_to(x, 0.8 * (3.0 * t).sin(), 1e-12, i));
        assert!(is_close_to(y, 0.8 * (2.0 * t).sin(), 1e-12, i));
    }
}

#[test]
fn lissajous_phase_shifts_x_only() {
    let p = WaveParams{phase: PI / 2.0, ..WaveParams::default()};
    let liss = Pattern::Lissajous { freq_x: 1, freq_y: 1, scale: 1.0 };
    let (x, y) = liss.point(0, 100, &p);
    assert!(is_close_to(x, 1.0, 1e-12, 0));
    assert!(is_close_to(y, 0.0, 1e-12, 0));
}

#[test]
fn archimedes_spiral_grows_linearly() {
    let p = WaveParams::default();
    let spiral = Pattern::SpiralArchimedes { turns: 3.0, scale: 0.8 };
    let (x, y) = spiral.point(0, 300, &p);
    assert_eq!((x, y), (0.0, 0.0));
    let (x, y) = spiral.point(150, 300, &p);
    assert!(is_close_to((x * x + y * y).sqrt(), 0.4, 1e-12, 150));
}

#[test]
fn log_spiral_radius_is_limited() {
    let p = WaveParams::default();
    let spiral = Pattern::SpiralLog { scale: 0.1, growth: 0.2 };
    for i in 0..256 {
        let (x, y) = spiral.point(i, 256, &p);
        assert!((x * x + y * y).sqrt() <= 1.0 + 1e-12);
    }
}

#[test]
fn zero_amplitude_collapses_to_origin() {
    let p = WaveParams{amplitude: 0.0, ..WaveParams::default()};
    let patterns = [
        Pattern::Circle { radius: 0.8 },
        Pattern::Heart { scale: 1.0 / 17.0 },
        Pattern::Butterfly { scale: 0.2 },
        Pattern::Cycloid { radius: 0.2 },
        Pattern::Hypotrochoid { big_r: 5.0, r: 3.0, d: 5.0, scale: 0.14 },
    ];
    for pattern in patterns.iter() {
        for i in 0..32 {
            let (x, y) = pattern.point(i, 32, &p);
            assert_eq!(x, 0.0, "{:?} at {}", pattern, i);
            assert_eq!(y, 0.0, "{:?} at {}", pattern, i);
        }
    }
}

#[test]
fn degenerate_spirals_are_rejected() {
    let p = WaveParams::default();
    match (Pattern::SpiralArchimedes { turns: 0.0, scale: 0.8 }).validate("spiral_archimedes", &p) {
        Err(GenError::MathDomain { parameter, .. }) => assert_eq!(parameter, "turns"),
        other => panic!("Expected MathDomain, got {:?}", other),
    }
    assert!(Pattern::SpiralLog { scale: 0.0, growth: 0.2 }.validate("spiral_log", &p).is_err());
    assert!(Pattern::Hypotrochoid { big_r: 5.0, r: 0.0, d: 5.0, scale: 0.1 }.validate("hypotrochoid", &p).is_err());
    assert!(Pattern::Cycloid { radius: 0.0 }.validate("cycloid", &p).is_err());
    assert!(Pattern::Lissajous { freq_x: 0, freq_y: 2, scale: 0.8 }.validate("lissajous", &p).is_err());
    assert!(Pattern::Circle { radius: 0.8 }.validate("circle", &p).is_ok());
}

//! One dimensional waveshapes.
//!
//! Every waveshape is a pure function of the sample index, the total number
//! of samples and a set of parameters. There is no state carried from one
//! sample to the next, so any index can be evaluated on its own and a table
//! can be built in any order.
//!
//! Values are nominally in the range [-1.0, 1.0], scaled by the amplitude.
//! Most shapes are periodic: with frequency 1.0 the table holds exactly one
//! cycle. The ramp and the noise generator ignore frequency and phase.

use super::Float;
use super::error::{GenError, Result};

use serde::{Serialize, Deserialize};

pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * PI;

/// Largest magnitude accepted for amplitude, frequency and phase.
///
/// Keeps every intermediate of the sample math finite, including the curve
/// parameter of the multi-turn spirals.
pub const MAX_PARAM_MAGNITUDE: Float = 1.0e6;

/// Parameters shared by all generators.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub amplitude: Float, // Output scale, 1.0 uses the full range
    pub frequency: Float, // Number of periods in one table
    pub phase: Float,     // Phase offset in radians
}

impl Default for WaveParams {
    fn default() -> Self {
        WaveParams{amplitude: 1.0, frequency: 1.0, phase: 0.0}
    }
}

impl WaveParams {
    /// Apply global multipliers and an additional phase offset.
    pub fn scaled(&self, amplitude: Float, frequency: Float, phase_offset: Float) -> WaveParams {
        WaveParams{
            amplitude: self.amplitude * amplitude,
            frequency: self.frequency * frequency,
            phase: self.phase + phase_offset,
        }
    }

    /// Reject parameters that can't produce finite samples.
    pub fn validate(&self, generator: &'static str) -> Result<()> {
        check_bounded(generator, "amplitude", self.amplitude)?;
        check_bounded(generator, "frequency", self.frequency)?;
        check_bounded(generator, "phase", self.phase)
    }

    /// Angle of the given sample in radians.
    pub fn angle(&self, index: usize, num_samples: usize) -> Float {
        TWO_PI * self.frequency * index as Float / num_samples as Float + self.phase
    }

    /// Position of the given sample inside its period, in the range [0, 1).
    pub fn position(&self, index: usize, num_samples: usize) -> Float {
        let pos = self.frequency * index as Float / num_samples as Float + self.phase / TWO_PI;
        let frac = pos - pos.floor();
        // A tiny negative pos can round up to exactly 1.0
        if frac >= 1.0 { 0.0 } else { frac }
    }
}

pub(crate) fn check_finite(generator: &'static str, parameter: &'static str, value: Float) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GenError::MathDomain { generator, parameter, value })
    }
}

fn check_bounded(generator: &'static str, parameter: &'static str, value: Float) -> Result<()> {
    if value.is_finite() && value.abs() <= MAX_PARAM_MAGNITUDE {
        Ok(())
    } else {
        Err(GenError::MathDomain { generator, parameter, value })
    }
}

/// The available one dimensional waveshapes.
///
/// Shape specific constants are part of the variant, the parameters shared
/// by all shapes are passed in as WaveParams.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square { duty_cycle: Float },
    Sawtooth,
    Ramp,
    Heart,
    Flower { petals: u32 },
    Spiral,
    Butterfly,
    Lissajous { ratio_a: u32, ratio_b: u32 },
    Chaos,
    Pulse { duty_cycle: Float },
    Noise { seed: u64 },
}

impl Waveform {
    /// Check shape constants and parameters before any sample is computed.
    pub fn validate(&self, generator: &'static str, params: &WaveParams) -> Result<()> {
        params.validate(generator)?;
        match *self {
            Waveform::Square { duty_cycle } | Waveform::Pulse { duty_cycle } => {
                if !(0.0..=1.0).contains(&duty_cycle) {
                    return Err(GenError::MathDomain { generator, parameter: "duty_cycle", value: duty_cycle });
                }
            }
            Waveform::Flower { petals } if petals == 0 => {
                return Err(GenError::MathDomain { generator, parameter: "petals", value: 0.0 });
            }
            Waveform::Lissajous { ratio_a, ratio_b } => {
                if ratio_a == 0 {
                    return Err(GenError::MathDomain { generator, parameter: "ratio_a", value: 0.0 });
                }
                if ratio_b == 0 {
                    return Err(GenError::MathDomain { generator, parameter: "ratio_b", value: 0.0 });
                }
            }
            _ => (),
        }
        Ok(())
    }

    /// Calculate the normalized value of a single sample.
    ///
    /// ```
    /// use wavegen::{Waveform, WaveParams};
    ///
    /// let params = WaveParams::default();
    /// let peak = Waveform::Sine.value(64, 256, &params);
    /// assert!((peak - 1.0).abs() < 1e-12);
    /// ```
    pub fn value(&self, index: usize, num_samples: usize, params: &WaveParams) -> Float {
        let amp = params.amplitude;
        match *self {
            Waveform::Sine => amp * params.angle(index, num_samples).sin(),
            Waveform::Triangle => amp * triangle(params.position(index, num_samples)),
            Waveform::Square { duty_cycle } | Waveform::Pulse { duty_cycle } => {
                if params.position(index, num_samples) < duty_cycle { amp } else { -amp }
            }
            Waveform::Sawtooth => amp * (2.0 * params.position(index, num_samples) - 1.0),
            Waveform::Ramp => {
                if num_samples < 2 {
                    -amp
                } else {
                    -amp + 2.0 * amp * index as Float / (num_samples - 1) as Float
                }
            }
            Waveform::Heart => {
                let t = params.angle(index, num_samples);
                let (s, c) = t.sin_cos();
                // Denominator never drops below 0.4
                amp * c * (s * c.abs().sqrt()) / (s + 1.4)
            }
            Waveform::Flower { petals } => {
                let t = params.angle(index, num_samples);
                amp * (petals as Float * t).sin() * t.cos()
            }
            Waveform::Spiral => {
                // Linearly growing envelope over the table
                let t = params.angle(index, num_samples);
                amp * (index as Float / num_samples as Float) * (3.0 * t).sin()
            }
            Waveform::Butterfly => {
                let t = params.angle(index, num_samples);
                let value = amp * t.sin() * butterfly_radius(t) / 3.0;
                value.max(-1.0).min(1.0)
            }
            Waveform::Lissajous { ratio_a, ratio_b } => {
                let t = params.angle(index, num_samples);
                amp * (ratio_a as Float * t).sin() * (ratio_b as Float * t).cos()
            }
            Waveform::Chaos => {
                // Incommensurable frequencies, never repeats exactly
                let t = params.angle(index, num_samples);
                amp * t.sin() * (Float::sqrt(2.0) * t).sin() * (Float::sqrt(3.0) * t).sin()
            }
            Waveform::Noise { seed } => amp * (2.0 * hash_to_unit(seed, index) - 1.0),
        }
    }
}

// Triangle with peak at 1/4 and trough at 3/4 of the period.
fn triangle(pos: Float) -> Float {
    if pos < 0.25 {
        4.0 * pos
    } else if pos < 0.75 {
        2.0 - 4.0 * pos
    } else {
        4.0 * pos - 4.0
    }
}

// Radius term of Temple Fay's butterfly curve.
pub(crate) fn butterfly_radius(t: Float) -> Float {
    t.cos().exp() - 2.0 * (4.0 * t).cos() - (t / 12.0).sin().powi(5)
}

// Map seed and index to a value in [0, 1).
//
// Counter based, so every index is independent of all others. One LCG step
// followed by a splitmix finalizer to decorrelate neighbouring indices.
fn hash_to_unit(seed: u64, index: usize) -> Float {
    let mut z = (seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as Float / (1_u64 << 53) as Float
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
fn all_shapes() -> Vec<Waveform> {
    vec![
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Square { duty_cycle: 0.5 },
        Waveform::Sawtooth,
        Waveform::Ramp,
        Waveform::Heart,
        Waveform::Flower { petals: 5 },
        Waveform::Spiral,
        Waveform::Butterfly,
        Waveform::Lissajous { ratio_a: 3, ratio_b: 2 },
        Waveform::Chaos,
        Waveform::Pulse { duty_cycle: 0.1 },
        Waveform::Noise { seed: 12345 },
    ]
}

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
fn sine_has_expected_quarter_points() {
    let p = WaveParams::default();
    assert!(is_close_to(Waveform::Sine.value(0, 256, &p), 0.0, 1e-12, 0));
    assert!(is_close_to(Waveform::Sine.value(64, 256, &p), 1.0, 1e-12, 64));
    assert!(is_close_to(Waveform::Sine.value(128, 256, &p), 0.0, 1e-12, 128));
    assert!(is_close_to(Waveform::Sine.value(192, 256, &p), -1.0, 1e-12, 192));
}

#[test]
fn triangle_peaks_at_quarter_and_troughs_at_three_quarters() {
    let p = WaveParams::default();
    assert!(is_close_to(Waveform::Triangle.value(0, 256, &p), 0.0, 1e-12, 0));
    assert!(is_close_to(Waveform::Triangle.value(64, 256, &p), 1.0, 1e-12, 64));
    assert!(is_close_to(Waveform::Triangle.value(128, 256, &p), 0.0, 1e-12, 128));
    assert!(is_close_to(Waveform::Triangle.value(192, 256, &p), -1.0, 1e-12, 192));
    for i in 0..256 {
        let v = Waveform::Triangle.value(i, 256, &p);
        assert!(v >= -1.0 && v <= 1.0);
    }
}

#[test]
fn sawtooth_resets_at_period_boundary() {
    let p = WaveParams{frequency: 2.0, ..WaveParams::default()};
    assert!(is_close_to(Waveform::Sawtooth.value(0, 100, &p), -1.0, 1e-12, 0));
    assert!(is_close_to(Waveform::Sawtooth.value(49, 100, &p), 0.96, 1e-12, 49));
    assert!(is_close_to(Waveform::Sawtooth.value(50, 100, &p), -1.0, 1e-12, 50));
}

#[test]
fn ramp_covers_range_exactly_once() {
    let p = WaveParams{frequency: 3.0, ..WaveParams::default()};
    assert!(is_close_to(Waveform::Ramp.value(0, 11, &p), -1.0, 1e-12, 0));
    assert!(is_close_to(Waveform::Ramp.value(5, 11, &p), 0.0, 1e-12, 5));
    assert!(is_close_to(Waveform::Ramp.value(10, 11, &p), 1.0, 1e-12, 10));
    assert!(is_close_to(Waveform::Ramp.value(0, 1, &p), -1.0, 1e-12, 0));
}

#[test]
fn square_follows_sign_of_sine() {
    let p = WaveParams::default();
    let square = Waveform::Square { duty_cycle: 0.5 };
    for i in 1..100 {
        let expected = if Waveform::Sine.value(i, 200, &p) >= 0.0 { 1.0 } else { -1.0 };
        assert_eq!(square.value(i, 200, &p), expected, "index {}", i);
    }
}

#[test]
fn pulse_respects_duty_cycle() {
    let p = WaveParams::default();
    let pulse = Waveform::Pulse { duty_cycle: 0.1 };
    let high = (0..100).filter(|i| pulse.value(*i, 100, &p) > 0.0).count();
    assert_eq!(high, 10);
}

#[test]
fn zero_amplitude_yields_silence() {
    let p = WaveParams{amplitude: 0.0, ..WaveParams::default()};
    for shape in all_shapes() {
        for i in 0..64 {
            assert_eq!(shape.value(i, 64, &p), 0.0, "{:?} at {}", shape, i);
        }
    }
}

#[test]
fn zero_frequency_yields_constant() {
    let p = WaveParams{frequency: 0.0, ..WaveParams::default()};
    for shape in [Waveform::Sine, Waveform::Triangle, Waveform::Sawtooth, Waveform::Square { duty_cycle: 0.5 }].iter() {
        let first = shape.value(0, 32, &p);
        for i in 1..32 {
            assert_eq!(shape.value(i, 32, &p), first, "{:?} at {}", shape, i);
        }
    }
    assert_eq!(Waveform::Sine.value(17, 32, &p), 0.0);
}

#[test]
fn noise_is_reproducible_and_bounded() {
    let p = WaveParams::default();
    let noise = Waveform::Noise { seed: 12345 };
    let first: Vec<Float> = (0..512).map(|i| noise.value(i, 512, &p)).collect();
    let second: Vec<Float> = (0..512).map(|i| noise.value(i, 512, &p)).collect();
    assert_eq!(first, second);
    assert!(first.iter().all(|v| *v >= -1.0 && *v < 1.0));

    // Not constant, and a different seed gives a different sequence
    assert!(first.iter().any(|v| *v != first[0]));
    let other = Waveform::Noise { seed: 54321 };
    let third: Vec<Float> = (0..512).map(|i| other.value(i, 512, &p)).collect();
    assert_ne!(first, third);

    // Evaluating out of order gives the same values
    assert_eq!(noise.value(300, 512, &p), first[300]);
}

#[test]
fn all_shapes_stay_finite_and_in_range() {
    let p = WaveParams::default();
    for shape in all_shapes() {
        for i in 0..1000 {
            let v = shape.value(i, 1000, &p);
            assert!(v.is_finite(), "{:?} at {}", shape, i);
            assert!(v >= -1.0 - 1e-12 && v <= 1.0 + 1e-12, "{:?} at {}: {}", shape, i, v);
        }
    }
}

#[test]
fn degenerate_parameters_are_rejected() {
    let p = WaveParams::default();
    assert!(Waveform::Square { duty_cycle: 1.5 }.validate("square", &p).is_err());
    assert!(Waveform::Pulse { duty_cycle: -0.1 }.validate("pulse", &p).is_err());
    assert!(Waveform::Flower { petals: 0 }.validate("flower", &p).is_err());
    assert!(Waveform::Lissajous { ratio_a: 3, ratio_b: 0 }.validate("lissajous", &p).is_err());

    let p = WaveParams{frequency: Float::INFINITY, ..WaveParams::default()};
    match Waveform::Sine.validate("sine", &p) {
        Err(GenError::MathDomain { generator, parameter, .. }) => {
            assert_eq!(generator, "sine");
            assert_eq!(parameter, "frequency");
        }
        other => panic!("Expected MathDomain, got {:?}", other),
    }
}

#[test]
fn oversized_parameters_are_rejected() {
    let p = WaveParams{frequency: 1e308, ..WaveParams::default()};
    match Waveform::Sine.validate("sine", &p) {
        Err(GenError::MathDomain { parameter, value, .. }) => {
            assert_eq!(parameter, "frequency");
            assert_eq!(value, 1e308);
        }
        other => panic!("Expected MathDomain, got {:?}", other),
    }
    let p = WaveParams{amplitude: -1e7, ..WaveParams::default()};
    assert!(Waveform::Ramp.validate("ramp", &p).is_err());
    let p = WaveParams{phase: 2e6, ..WaveParams::default()};
    assert!(Waveform::Noise { seed: 1 }.validate("noise", &p).is_err());

    let limit = MAX_PARAM_MAGNITUDE;
    let p = WaveParams{amplitude: limit, frequency: -limit, phase: limit};
    for shape in all_shapes() {
        shape.validate("any", &p).unwrap();
        for i in 0..64 {
            assert!(shape.value(i, 64, &p).is_finite(), "{:?} at {}", shape, i);
        }
    }
}

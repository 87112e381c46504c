//! Description of a single generation run.
//!
//! A GenerationRequest fully determines the generated tables. It is built
//! from command line flags or loaded from a JSON file, and passed explicitly
//! through all stages, there are no global defaults.

use super::Float;
use super::error::{GenError, Result};
use super::resolution::Resolution;
use super::wave_functions::{WaveParams, TWO_PI};

use serde::{Serialize, Deserialize};

/// Largest number of samples accepted per table.
pub const MAX_ARRAY_SIZE: usize = 1 << 20;

/// Largest number of worker threads accepted per run.
pub const MAX_THREADS: u32 = 256;

/// Which catalog entries to generate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    All,
    Names(Vec<String>),
}

impl Selection {
    /// Parse a comma separated list of names, or "all".
    ///
    /// ```
    /// use wavegen::Selection;
    ///
    /// assert_eq!(Selection::parse("all"), Selection::All);
    /// assert_eq!(Selection::parse("sine, heart"),
    ///            Selection::Names(vec!["sine".to_string(), "heart".to_string()]));
    /// ```
    pub fn parse(list: &str) -> Selection {
        if list.trim() == "all" {
            return Selection::All;
        }
        Selection::Names(list.split(',')
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string())
            .collect())
    }
}

/// Selects one frame of an animation.
///
/// The frame adds a phase offset of 2pi * frame / frames_total, rotating
/// roses and morphing Lissajous figures over the frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub frame: u32,
    pub frames_total: u32,
}

impl AnimationFrame {
    pub fn phase_offset(&self) -> Float {
        TWO_PI * self.frame as Float / self.frames_total as Float
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub bits: u32,                        // Bits per sample
    pub array_size: usize,                // Number of samples per table
    pub selection: Selection,             // Tables to generate
    pub amplitude: Float,                 // Global amplitude multiplier
    pub frequency: Float,                 // Global frequency multiplier
    pub phase: Float,                     // Global phase offset in radians
    pub output: String,                   // Name of the output target
    pub threads: u32,                     // Worker threads for building tables
    pub animation: Option<AnimationFrame>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        GenerationRequest {
            bits: 8,
            array_size: 256,
            selection: Selection::All,
            amplitude: 1.0,
            frequency: 1.0,
            phase: 0.0,
            output: "waveforms.h".to_string(),
            threads: 1,
            animation: None,
        }
    }
}

impl GenerationRequest {
    /// Load a request from JSON. Missing fields take their default values.
    ///
    /// ```
    /// use wavegen::{GenerationRequest, Selection};
    ///
    /// let req = GenerationRequest::from_json(r#"{"bits": 12, "selection": {"names": ["sine"]}}"#).unwrap();
    /// assert_eq!(req.bits, 12);
    /// assert_eq!(req.array_size, 256);
    /// assert_eq!(req.selection, Selection::Names(vec!["sine".to_string()]));
    /// ```
    pub fn from_json(json: &str) -> Result<GenerationRequest> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a request from JSON, using the given output name if the JSON
    /// has none.
    ///
    /// ```
    /// use wavegen::GenerationRequest;
    ///
    /// let req = GenerationRequest::from_json_with_output(r#"{"bits": 10}"#, "xy_patterns.h").unwrap();
    /// assert_eq!(req.output, "xy_patterns.h");
    /// ```
    pub fn from_json_with_output(json: &str, output: &str) -> Result<GenerationRequest> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(fields) = value.as_object_mut() {
            fields.entry("output").or_insert_with(|| serde_json::Value::from(output));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check everything about the request that doesn't depend on the
    /// selected generators, and derive the resolution.
    pub fn validate(&self) -> Result<Resolution> {
        if self.array_size == 0 || self.array_size > MAX_ARRAY_SIZE {
            return Err(GenError::InvalidArraySize { size: self.array_size as i64, max: MAX_ARRAY_SIZE });
        }
        let resolution = Resolution::new(self.bits)?;
        if !self.amplitude.is_finite() {
            return Err(GenError::InvalidMultiplier { name: "amplitude", value: self.amplitude });
        }
        if !self.frequency.is_finite() {
            return Err(GenError::InvalidMultiplier { name: "frequency", value: self.frequency });
        }
        if !self.phase.is_finite() {
            return Err(GenError::InvalidMultiplier { name: "phase", value: self.phase });
        }
        if self.threads == 0 || self.threads > MAX_THREADS {
            return Err(GenError::InvalidThreadCount(self.threads));
        }
        if let Some(anim) = self.animation {
            if anim.frames_total == 0 || anim.frame >= anim.frames_total {
                return Err(GenError::InvalidAnimationFrame { frame: anim.frame, frames_total: anim.frames_total });
            }
        }
        Ok(resolution)
    }

    /// Generator parameters with the global multipliers applied.
    pub fn params(&self) -> WaveParams {
        let offset = self.phase + self.animation.map_or(0.0, |a| a.phase_offset());
        WaveParams::default().scaled(self.amplitude, self.frequency, offset)
    }
}

/// Convert a signed sample count from user input.
///
/// ```
/// use wavegen::array_size_from;
///
/// assert_eq!(array_size_from(512).unwrap(), 512);
/// assert!(array_size_from(0).is_err());
/// assert!(array_size_from(-3).is_err());
/// ```
pub fn array_size_from(raw: i64) -> Result<usize> {
    if raw < 1 || raw as u64 > MAX_ARRAY_SIZE as u64 {
        return Err(GenError::InvalidArraySize { size: raw, max: MAX_ARRAY_SIZE });
    }
    Ok(raw as usize)
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn zero_array_size_is_rejected() {
    let req = GenerationRequest { array_size: 0, ..GenerationRequest::default() };
    match req.validate() {
        Err(GenError::InvalidArraySize { size, .. }) => assert_eq!(size, 0),
        other => panic!("Expected InvalidArraySize, got {:?}", other),
    }
    let req = GenerationRequest { array_size: MAX_ARRAY_SIZE + 1, ..GenerationRequest::default() };
    assert!(req.validate().is_err());
}

#[test]
fn unsupported_bits_are_rejected() {
    let req = GenerationRequest { bits: 13, ..GenerationRequest::default() };
    match req.validate() {
        Err(GenError::UnsupportedBitWidth { bits, .. }) => assert_eq!(bits, 13),
        other => panic!("Expected UnsupportedBitWidth, got {:?}", other),
    }
}

#[test]
fn non_finite_multipliers_are_rejected() {
    let req = GenerationRequest { amplitude: Float::NAN, ..GenerationRequest::default() };
    assert!(req.validate().is_err());
    let req = GenerationRequest { frequency: Float::INFINITY, ..GenerationRequest::default() };
    assert!(req.validate().is_err());
}

#[test]
fn animation_frame_must_be_in_range() {
    let req = GenerationRequest {
        animation: Some(AnimationFrame { frame: 60, frames_total: 60 }),
        ..GenerationRequest::default()
    };
    assert!(req.validate().is_err());
    let req = GenerationRequest {
        animation: Some(AnimationFrame { frame: 0, frames_total: 0 }),
        ..GenerationRequest::default()
    };
    assert!(req.validate().is_err());
    let req = GenerationRequest {
        animation: Some(AnimationFrame { frame: 15, frames_total: 60 }),
        ..GenerationRequest::default()
    };
    assert!(req.validate().is_ok());
    assert!((req.params().phase - TWO_PI / 4.0).abs() < 1e-12);
}

#[test]
fn thread_count_is_bounded() {
    for threads in [0, MAX_THREADS + 1, u32::MAX].iter() {
        let req = GenerationRequest { threads: *threads, ..GenerationRequest::default() };
        match req.validate() {
            Err(GenError::InvalidThreadCount(n)) => assert_eq!(n, *threads),
            other => panic!("Expected InvalidThreadCount, got {:?}", other),
        }
    }
    let req = GenerationRequest { threads: MAX_THREADS, ..GenerationRequest::default() };
    assert!(req.validate().is_ok());
}

#[test]
fn params_apply_global_multipliers() {
    let req = GenerationRequest { amplitude: 0.5, frequency: 3.0, phase: 1.0, ..GenerationRequest::default() };
    let params = req.params();
    assert_eq!(params.amplitude, 0.5);
    assert_eq!(params.frequency, 3.0);
    assert_eq!(params.phase, 1.0);
}

#[test]
fn request_survives_json() {
    let req = GenerationRequest {
        bits: 16,
        selection: Selection::parse("sine,noise"),
        threads: 4,
        ..GenerationRequest::default()
    };
    let json = req.to_json().unwrap();
    assert_eq!(GenerationRequest::from_json(&json).unwrap(), req);
}

#[test]
fn output_from_json_wins_over_fallback() {
    let req = GenerationRequest::from_json_with_output(r#"{"output": "tables.h"}"#, "xy_patterns.h").unwrap();
    assert_eq!(req.output, "tables.h");
    let req = GenerationRequest::from_json_with_output("{}", "xy_patterns.h").unwrap();
    assert_eq!(req.output, "xy_patterns.h");
    assert_eq!(req.bits, 8);
    assert!(GenerationRequest::from_json_with_output("[1, 2]", "x.h").is_err());
}

#[test]
fn selection_parsing_skips_empty_names() {
    assert_eq!(Selection::parse(" all "), Selection::All);
    assert_eq!(Selection::parse(",,"), Selection::Names(vec![]));
    assert_eq!(Selection::parse("a,,b"), Selection::Names(vec!["a".to_string(), "b".to_string()]));
}

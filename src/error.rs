//! Error type shared by all stages of table generation.
//!
//! Every error is fatal to a generation run. Nothing is written before the
//! whole request has been validated and rendered, so callers never see a
//! partial result.

use super::Float;
use super::request::MAX_THREADS;

use std::fmt;

#[derive(Debug)]
pub enum GenError {
    /// Requested bit-width is not one of the supported widths.
    UnsupportedBitWidth { bits: u32, supported: Vec<u32> },

    /// Sample count is zero, negative or larger than the supported maximum.
    InvalidArraySize { size: i64, max: usize },

    /// One or more requested names are not in the catalog.
    UnknownNames { kind: &'static str, names: Vec<String>, valid: Vec<&'static str> },

    /// The selection resolved to no tables at all.
    EmptySelection { kind: &'static str },

    /// A global multiplier is not a finite number.
    InvalidMultiplier { name: &'static str, value: Float },

    /// Animation frame outside of [0, frames_total).
    InvalidAnimationFrame { frame: u32, frames_total: u32 },

    /// Worker pool needs between 1 and MAX_THREADS threads.
    InvalidThreadCount(u32),

    /// A generator parameter would produce non-finite samples.
    MathDomain { generator: &'static str, parameter: &'static str, value: Float },

    /// The quantizer was handed a NaN or infinite value.
    NonFiniteSample { value: Float },

    /// A quantized value does not fit the storage type of its table.
    SampleOverflow { value: u64, storage: &'static str },

    /// JSON encoding or decoding failed.
    Serialization(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;

impl GenError {
    /// True for errors caused by the request itself rather than by a
    /// generator.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            GenError::UnsupportedBitWidth { .. }
            | GenError::InvalidArraySize { .. }
            | GenError::UnknownNames { .. }
            | GenError::EmptySelection { .. }
            | GenError::InvalidMultiplier { .. }
            | GenError::InvalidAnimationFrame { .. }
            | GenError::InvalidThreadCount(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::UnsupportedBitWidth { bits, supported } => {
                let list: Vec<String> = supported.iter().map(|b| b.to_string()).collect();
                write!(f, "Unsupported bit-width {}, valid widths are: {}", bits, list.join(", "))
            }
            GenError::InvalidArraySize { size, max } => {
                write!(f, "Invalid array size {}, must be between 1 and {}", size, max)
            }
            GenError::UnknownNames { kind, names, valid } => {
                write!(f, "Unknown {} name(s): {}. Valid names are: {}",
                    kind, names.join(", "), valid.join(", "))
            }
            GenError::EmptySelection { kind } => write!(f, "No {} selected", kind),
            GenError::InvalidMultiplier { name, value } => {
                write!(f, "Global {} multiplier must be a finite number, got {}", name, value)
            }
            GenError::InvalidAnimationFrame { frame, frames_total } => {
                write!(f, "Animation frame {} out of range for {} frames", frame, frames_total)
            }
            GenError::InvalidThreadCount(n) => {
                write!(f, "Thread count must be between 1 and {}, got {}", MAX_THREADS, n)
            }
            GenError::MathDomain { generator, parameter, value } => {
                write!(f, "Parameter {} = {} of {} would produce non-finite samples",
                    parameter, value, generator)
            }
            GenError::NonFiniteSample { value } => {
                write!(f, "Cannot quantize non-finite sample value {}", value)
            }
            GenError::SampleOverflow { value, storage } => {
                write!(f, "Sample value {} does not fit into {}", value, storage)
            }
            GenError::Serialization(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GenError {
    fn from(e: serde_json::Error) -> Self {
        GenError::Serialization(e)
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn unknown_names_message_lists_offenders_and_catalog() {
    let e = GenError::UnknownNames {
        kind: "waveform",
        names: vec!["---".to_string()],
        valid: vec!["sine", "triangle"],
    };
    let msg = e.to_string();
    assert!(msg.contains("---"));
    assert!(msg.contains("sine, triangle"));
    assert!(e.is_configuration_error());
}

#[test]
fn math_errors_are_not_configuration_errors() {
    let e = GenError::MathDomain { generator: "spiral_archimedes", parameter: "turns", value: 0.0 };
    assert!(!e.is_configuration_error());
    assert!(e.to_string().contains("turns"));
    let e = GenError::NonFiniteSample { value: Float::NAN };
    assert!(!e.is_configuration_error());
}

//! Generates quantized lookup tables of waveforms and XY patterns for
//! embedded DAC playback.
//!
//! A [`GenerationRequest`] selects catalog entries, a bit-width and a table
//! size. [`build_waveforms`] and [`build_patterns`] sample the selected
//! generators and quantize the results, an emitter renders the tables as a C
//! header or as JSON.
//!
//! ```
//! use wavegen::{build_patterns, CHeaderEmitter, GenerationRequest, Selection, TableEmitter};
//!
//! let request = GenerationRequest {
//!     bits: 12,
//!     array_size: 128,
//!     selection: Selection::parse("circle,lissajous_3_2"),
//!     output: "xy_patterns.h".to_string(),
//!     ..GenerationRequest::default()
//! };
//! let set = build_patterns(&request).unwrap();
//! let header = CHeaderEmitter::new().emit_patterns(&set).unwrap();
//! assert!(header.contains("static const uint16_t circle_x[XY_ARRAY_SIZE]"));
//! ```

mod catalog;
mod error;
mod header_writer;
mod json_writer;
mod quantizer;
mod request;
mod resolution;
mod sample_table;
mod table_builder;
mod wave_functions;
mod xy_patterns;

pub mod cli;

pub use catalog::{find, list, names, resolve};
pub use catalog::{CatalogEntry, CatalogItem, PatternSpec, WaveformSpec, PATTERNS, WAVEFORMS};
pub use error::{GenError, Result};
pub use header_writer::{display_name, include_guard, CHeaderEmitter, TableEmitter, VALUES_PER_LINE};
pub use json_writer::JsonEmitter;
pub use quantizer::Quantizer;
pub use request::{array_size_from, AnimationFrame, GenerationRequest, Selection, MAX_ARRAY_SIZE, MAX_THREADS};
pub use resolution::{Resolution, StorageType, SUPPORTED_BIT_WIDTHS};
pub use sample_table::{SampleData, SampleTable};
pub use table_builder::{build_patterns, build_waveforms, PatternTable, Table, TableBuilder, TableSet, WaveTable};
pub use wave_functions::{WaveParams, Waveform, MAX_PARAM_MAGNITUDE, PI, TWO_PI};
pub use xy_patterns::Pattern;

pub type Float = f64;

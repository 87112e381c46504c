//! Renders generated tables as JSON for host side tools.

use super::error::Result;
use super::resolution::Resolution;
use super::sample_table::SampleTable;
use super::table_builder::{PatternTable, Table, TableSet, WaveTable};
use super::header_writer::TableEmitter;

use log::debug;
use serde::Serialize;

use std::collections::BTreeMap;

#[derive(Serialize)]
struct JsonChannel<'a> {
    min: u64,
    max: u64,
    samples: &'a SampleTable,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    name: &'static str,
    description: &'static str,
    #[serde(flatten)]
    channels: BTreeMap<&'static str, JsonChannel<'a>>,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    generator: &'static str,
    version: &'static str,
    kind: &'static str,
    output: &'a str,
    resolution: &'a Resolution,
    array_size: usize,
    total_samples: usize,
    memory_bytes: usize,
    tables: Vec<JsonTable<'a>>,
}

/// Emits the table set as a pretty printed JSON document.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonEmitter {}

impl JsonEmitter {
    pub fn new() -> JsonEmitter {
        JsonEmitter{}
    }

    fn render<T: Table>(&self, set: &TableSet<T>, generator: &'static str, kind: &'static str) -> Result<String> {
        debug!("Rendering JSON for {} {}", set.tables.len(), kind);
        let tables = set.tables.iter().map(|table| {
            let channels = table.channel_names().iter()
                .zip(table.channels())
                .map(|(name, samples)| {
                    let (min, max) = samples.range().unwrap_or((0, 0));
                    (*name, JsonChannel{min, max, samples})
                })
                .collect();
            JsonTable{name: table.name(), description: table.description(), channels}
        }).collect();
        let doc = JsonDocument{
            generator,
            version: env!("CARGO_PKG_VERSION"),
            kind,
            output: &set.output,
            resolution: &set.resolution,
            array_size: set.array_size,
            total_samples: set.total_samples(),
            memory_bytes: set.memory_bytes(),
            tables,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

impl TableEmitter for JsonEmitter {
    fn emit_waveforms(&self, set: &TableSet<WaveTable>) -> Result<String> {
        self.render(set, "wavegen", "waveforms")
    }

    fn emit_patterns(&self, set: &TableSet<PatternTable>) -> Result<String> {
        self.render(set, "xy_wavegen", "patterns")
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use super::request::{GenerationRequest, Selection};
#[cfg(test)]
use super::table_builder::{build_patterns, build_waveforms};

#[test]
fn waveform_document_contains_samples_and_range() {
    let req = GenerationRequest {
        bits: 12,
        array_size: 64,
        selection: Selection::parse("sine,ramp"),
        ..GenerationRequest::default()
    };
    let set = build_waveforms(&req).unwrap();
    let text = JsonEmitter::new().emit_waveforms(&set).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(doc["kind"], "waveforms");
    assert_eq!(doc["array_size"], 64);
    assert_eq!(doc["resolution"]["bits"], 12);
    assert_eq!(doc["resolution"]["center"], 2048);
    assert_eq!(doc["resolution"]["storage"], "u16");
    assert_eq!(doc["total_samples"], 128);
    assert_eq!(doc["memory_bytes"], 256);

    let tables = doc["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["name"], "sine");
    assert_eq!(tables[0]["samples"]["samples"][0], 2048);
    assert_eq!(tables[0]["samples"]["samples"].as_array().unwrap().len(), 64);
    assert_eq!(tables[1]["name"], "ramp");
    assert_eq!(tables[1]["samples"]["min"], 0);
    assert_eq!(tables[1]["samples"]["max"], 4095);
}

#[test]
fn pattern_document_has_both_axes() {
    let req = GenerationRequest {
        array_size: 32,
        selection: Selection::parse("circle"),
        ..GenerationRequest::default()
    };
    let set = build_patterns(&req).unwrap();
    let text = JsonEmitter::new().emit_patterns(&set).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(doc["kind"], "patterns");
    let circle = &doc["tables"][0];
    assert_eq!(circle["name"], "circle");
    assert_eq!(circle["x"]["samples"].as_array().unwrap().len(), 32);
    assert_eq!(circle["y"]["samples"].as_array().unwrap().len(), 32);
    assert_eq!(circle["x"]["samples"][0], set.tables[0].x.get(0).unwrap());
}

//! The catalog of named waveforms and patterns.
//!
//! The catalog is a closed, fixed-order list. The order of the entries is
//! the order used for "all" selections and for the listing, so the generated
//! output never depends on hashing or other unstable iteration orders.

use super::Float;
use super::error::{GenError, Result};
use super::request::Selection;
use super::wave_functions::Waveform;
use super::xy_patterns::Pattern;

use log::debug;
use serde::{Serialize, Deserialize};

/// A named one dimensional waveform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveformSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub shape: Waveform,
}

/// A named XY pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub shape: Pattern,
}

/// Common access to the name and description of catalog entries.
pub trait CatalogItem: Sync + 'static {
    const KIND: &'static str;

    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

impl CatalogItem for WaveformSpec {
    const KIND: &'static str = "waveform";

    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }
}

impl CatalogItem for PatternSpec {
    const KIND: &'static str = "pattern";

    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }
}

pub const WAVEFORMS: &[WaveformSpec] = &[
    WaveformSpec { name: "sine", description: "Classic sine wave", shape: Waveform::Sine },
    WaveformSpec { name: "triangle", description: "Triangle wave", shape: Waveform::Triangle },
    WaveformSpec { name: "square", description: "Square wave", shape: Waveform::Square { duty_cycle: 0.5 } },
    WaveformSpec { name: "sawtooth", description: "Sawtooth wave", shape: Waveform::Sawtooth },
    WaveformSpec { name: "ramp", description: "Linear ramp 0 to max", shape: Waveform::Ramp },
    WaveformSpec { name: "heart", description: "Heart-shaped curve", shape: Waveform::Heart },
    WaveformSpec { name: "flower", description: "Flower pattern (5 petals)", shape: Waveform::Flower { petals: 5 } },
    WaveformSpec { name: "spiral", description: "Archimedean spiral", shape: Waveform::Spiral },
    WaveformSpec { name: "butterfly", description: "Butterfly curve", shape: Waveform::Butterfly },
    WaveformSpec { name: "lissajous", description: "Lissajous curve (3:2)", shape: Waveform::Lissajous { ratio_a: 3, ratio_b: 2 } },
    WaveformSpec { name: "chaos", description: "Chaotic signal", shape: Waveform::Chaos },
    WaveformSpec { name: "pulse", description: "Pulse train", shape: Waveform::Pulse { duty_cycle: 0.1 } },
    WaveformSpec { name: "noise", description: "Pseudo-random noise", shape: Waveform::Noise { seed: 12345 } },
];

const HEART_SCALE: Float = 1.0 / 17.0;

pub const PATTERNS: &[PatternSpec] = &[
    PatternSpec { name: "circle", description: "Perfect circle", shape: Pattern::Circle { radius: 0.8 } },
    PatternSpec { name: "ellipse", description: "Ellipse", shape: Pattern::Ellipse { a: 0.8, b: 0.6 } },
    PatternSpec { name: "lissajous_3_2", description: "Lissajous 3:2", shape: Pattern::Lissajous { freq_x: 3, freq_y: 2, scale: 0.8 } },
    PatternSpec { name: "lissajous_5_4", description: "Lissajous 5:4", shape: Pattern::Lissajous { freq_x: 5, freq_y: 4, scale: 0.8 } },
    PatternSpec { name: "lissajous_7_5", description: "Lissajous 7:5", shape: Pattern::Lissajous { freq_x: 7, freq_y: 5, scale: 0.8 } },
    PatternSpec { name: "lissajous_cos", description: "Lissajous cosine", shape: Pattern::LissajousCos { freq_x: 3, freq_y: 2, scale: 0.8 } },
    PatternSpec { name: "heart", description: "Mathematical heart", shape: Pattern::Heart { scale: HEART_SCALE } },
    PatternSpec { name: "rose_3", description: "3-petal rose", shape: Pattern::Rose { k: 3.0, scale: 0.8 } },
    PatternSpec { name: "rose_5", description: "5-petal rose", shape: Pattern::Rose { k: 5.0, scale: 0.8 } },
    PatternSpec { name: "rose_8", description: "8-petal rose", shape: Pattern::Rose { k: 8.0, scale: 0.8 } },
    PatternSpec { name: "butterfly", description: "Butterfly curve", shape: Pattern::Butterfly { scale: 0.2 } },
    PatternSpec { name: "infinity", description: "Infinity symbol", shape: Pattern::Infinity { scale: 0.8 } },
    PatternSpec { name: "spiral_archimedes", description: "Archimedes spiral", shape: Pattern::SpiralArchimedes { turns: 3.0, scale: 0.8 } },
    PatternSpec { name: "spiral_log", description: "Logarithmic spiral", shape: Pattern::SpiralLog { scale: 0.1, growth: 0.2 } },
    PatternSpec { name: "hypotrochoid", description: "Hypotrochoid (spirograph)", shape: Pattern::Hypotrochoid { big_r: 5.0, r: 3.0, d: 5.0, scale: 0.14 } },
    PatternSpec { name: "rhodonea", description: "Rhodonea curve", shape: Pattern::Rose { k: 2.5, scale: 0.8 } },
    PatternSpec { name: "cycloid", description: "Cycloid curve", shape: Pattern::Cycloid { radius: 0.2 } },
    PatternSpec { name: "astroid", description: "Astroid (4-pointed star)", shape: Pattern::Astroid { scale: 0.8 } },
];

/// Listing entry for a catalog item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: usize,           // Position in the catalog
    pub kind: String,        // "waveform" or "pattern"
    pub name: String,        // Key used for selection
    pub description: String,
}

/// Find a catalog entry by name.
///
/// ```
/// use wavegen::{find, PATTERNS, WAVEFORMS};
///
/// assert_eq!(find(WAVEFORMS, "sine").map(|w| w.description), Some("Classic sine wave"));
/// assert!(find(PATTERNS, "sine").is_none());
/// assert!(find(WAVEFORMS, "---").is_none());
/// ```
pub fn find<T: CatalogItem>(catalog: &'static [T], name: &str) -> Option<&'static T> {
    catalog.iter().find(|item| item.name() == name)
}

/// Describe all entries of a catalog, in catalog order.
pub fn list<T: CatalogItem>(catalog: &'static [T]) -> Vec<CatalogEntry> {
    catalog.iter().enumerate().map(|(id, item)| CatalogEntry {
        id,
        kind: T::KIND.to_string(),
        name: item.name().to_string(),
        description: item.description().to_string(),
    }).collect()
}

pub fn names<T: CatalogItem>(catalog: &'static [T]) -> Vec<&'static str> {
    catalog.iter().map(|item| item.name()).collect()
}

/// Resolve a selection against a catalog.
///
/// "All" returns the whole catalog in catalog order, a list of names returns
/// the entries in the order given. Repeated names are kept only once. Unknown
/// names are collected and reported together with the valid names.
///
/// ```
/// use wavegen::{resolve, Selection, WAVEFORMS};
///
/// let selected = resolve(WAVEFORMS, &Selection::parse("square,sine")).unwrap();
/// assert_eq!(selected[0].name, "square");
/// assert_eq!(selected[1].name, "sine");
/// assert!(resolve(WAVEFORMS, &Selection::parse("sine,---")).is_err());
/// ```
pub fn resolve<T: CatalogItem>(catalog: &'static [T], selection: &Selection) -> Result<Vec<&'static T>> {
    let requested = match selection {
        Selection::All => return Ok(catalog.iter().collect()),
        Selection::Names(requested) => requested,
    };
    let mut selected: Vec<&'static T> = Vec::with_capacity(requested.len());
    let mut unknown: Vec<String> = vec![];
    for name in requested {
        match find(catalog, name) {
            Some(item) => {
                if selected.iter().any(|s| s.name() == item.name()) {
                    debug!("Ignoring repeated {} {}", T::KIND, name);
                } else {
                    selected.push(item);
                }
            }
            None => {
                if !unknown.contains(name) {
                    unknown.push(name.clone());
                }
            }
        }
    }
    if !unknown.is_empty() {
        return Err(GenError::UnknownNames { kind: T::KIND, names: unknown, valid: names(catalog) });
    }
    if selected.is_empty() {
        return Err(GenError::EmptySelection { kind: T::KIND });
    }
    Ok(selected)
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
fn has_unique_identifier_names<T: CatalogItem>(catalog: &'static [T]) -> bool {
    let names = names(catalog);
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            println!("Duplicate name {}", name);
            return false;
        }
        // Names become C identifiers
        let valid = name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            println!("Invalid identifier {}", name);
            return false;
        }
    }
    true
}

#[test]
fn catalog_names_are_unique_identifiers() {
    assert!(has_unique_identifier_names(WAVEFORMS));
    assert!(has_unique_identifier_names(PATTERNS));
}

#[test]
fn catalog_entries_validate_with_default_parameters() {
    let params = super::wave_functions::WaveParams::default();
    for w in WAVEFORMS {
        w.shape.validate(w.name, &params).unwrap();
    }
    for p in PATTERNS {
        p.shape.validate(p.name, &params).unwrap();
    }
}

#[test]
fn all_selection_keeps_catalog_order() {
    let selected = resolve(PATTERNS, &Selection::All).unwrap();
    assert_eq!(selected.len(), PATTERNS.len());
    assert_eq!(selected[0].name, "circle");
    assert_eq!(selected[PATTERNS.len() - 1].name, "astroid");
}

#[test]
fn unknown_names_are_reported_with_catalog() {
    match resolve(WAVEFORMS, &Selection::parse("sine, ---, bogus, ---")) {
        Err(GenError::UnknownNames { kind, names, valid }) => {
            assert_eq!(kind, "waveform");
            assert_eq!(names, vec!["---".to_string(), "bogus".to_string()]);
            assert_eq!(valid.len(), WAVEFORMS.len());
            assert!(valid.contains(&"sine"));
        }
        other => panic!("Expected UnknownNames, got {:?}", other),
    }
}

#[test]
fn repeated_names_are_collapsed() {
    let selected = resolve(WAVEFORMS, &Selection::parse("noise,sine,noise")).unwrap();
    let names: Vec<&str> = selected.iter().map(|w| w.name).collect();
    assert_eq!(names, vec!["noise", "sine"]);
}

#[test]
fn empty_selection_is_rejected() {
    match resolve(WAVEFORMS, &Selection::Names(vec![])) {
        Err(GenError::EmptySelection { kind }) => assert_eq!(kind, "waveform"),
        other => panic!("Expected EmptySelection, got {:?}", other),
    }
}

#[test]
fn listing_follows_catalog_order() {
    let entries = list(WAVEFORMS);
    assert_eq!(entries.len(), 13);
    assert_eq!(entries[0].name, "sine");
    assert_eq!(entries[0].kind, "waveform");
    assert_eq!(entries[12].id, 12);
    assert_eq!(entries[12].name, "noise");
}

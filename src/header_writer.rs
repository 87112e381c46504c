//! Renders generated tables as a self contained C header.
//!
//! The header carries everything firmware needs to play the tables: the
//! resolution constants, one typed const array per table, an enum naming the
//! tables, pointer and display name tables and bounds checked accessors. The
//! whole text is rendered in memory, nothing is written before it is complete.
//!
//! The output contains no timestamps, the same table set always renders to
//! the same text.

use super::error::Result;
use super::resolution::Resolution;
use super::sample_table::SampleTable;
use super::table_builder::{PatternTable, Table, TableSet, WaveTable};

use log::debug;

/// Values per line in the emitted arrays.
pub const VALUES_PER_LINE: usize = 16;

/// Largest table size that can still be indexed with a uint16_t.
const MAX_U16_INDEXED: usize = 65536;

/// Renders a table set into the text of an output file.
pub trait TableEmitter {
    fn emit_waveforms(&self, set: &TableSet<WaveTable>) -> Result<String>;
    fn emit_patterns(&self, set: &TableSet<PatternTable>) -> Result<String>;
}

/// Emits a C header with static const lookup tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct CHeaderEmitter {}

impl CHeaderEmitter {
    pub fn new() -> CHeaderEmitter {
        CHeaderEmitter{}
    }
}

impl TableEmitter for CHeaderEmitter {
    /// Emit a header with one array per waveform.
    ///
    /// ```
    /// use wavegen::{build_waveforms, CHeaderEmitter, GenerationRequest, Selection, TableEmitter};
    ///
    /// let request = GenerationRequest {
    ///     selection: Selection::parse("sine"),
    ///     ..GenerationRequest::default()
    /// };
    /// let set = build_waveforms(&request).unwrap();
    /// let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    /// assert!(header.contains("static const uint8_t sine_wave[WAVEFORM_ARRAY_SIZE]"));
    /// assert!(header.contains("#define WAVEFORM_CENTER 128"));
    /// ```
    fn emit_waveforms(&self, set: &TableSet<WaveTable>) -> Result<String> {
        debug!("Rendering C header for {} waveforms", set.tables.len());
        let res = &set.resolution;
        let c_type = res.storage().c_type();
        let index_type = index_type(set.array_size);
        let mut out = String::new();

        out.push_str(&file_comment(set, "Waveform lookup tables", "wavegen"));
        open_guard(&mut out, &set.output);
        push_defines(&mut out, "WAVEFORM", res, set.array_size);

        out.push_str("/* Waveform data */\n\n");
        for table in set.tables.iter() {
            push_array(&mut out, c_type, &format!("{}_wave", table.name), "WAVEFORM_ARRAY_SIZE", &table.samples, res);
        }

        out.push_str("/* Waveform types */\n");
        push_enum(&mut out, &set.tables, "WAVE", "waveform_type_t");

        out.push_str(&format!("static const {}* const waveform_tables[WAVE_COUNT] = {{\n", c_type));
        for table in set.tables.iter() {
            out.push_str(&format!("    {}_wave,\n", table.name));
        }
        out.push_str("};\n\n");

        out.push_str("static const char* const waveform_names[WAVE_COUNT] = {\n");
        for table in set.tables.iter() {
            out.push_str(&format!("    \"{} Wave\",\n", display_name(table.name)));
        }
        out.push_str("};\n\n");

        out.push_str("/* Returns WAVEFORM_CENTER for an invalid waveform or index */\n");
        out.push_str(&format!(
            "static inline {} get_waveform_sample(waveform_type_t wave, {} index) {{\n", c_type, index_type));
        out.push_str("    if ((unsigned)wave >= WAVE_COUNT || index >= WAVEFORM_ARRAY_SIZE) {\n");
        out.push_str("        return WAVEFORM_CENTER;\n");
        out.push_str("    }\n");
        out.push_str("    return waveform_tables[wave][index];\n");
        out.push_str("}\n\n");

        out.push_str(&footer(set, "wavegen"));
        close_guard(&mut out, &set.output);
        Ok(out)
    }

    /// Emit a header with an X and a Y array per pattern.
    fn emit_patterns(&self, set: &TableSet<PatternTable>) -> Result<String> {
        debug!("Rendering C header for {} XY patterns", set.tables.len());
        let res = &set.resolution;
        let c_type = res.storage().c_type();
        let index_type = index_type(set.array_size);
        let mut out = String::new();

        out.push_str(&file_comment(set, "XY pattern lookup tables for oscilloscope display", "xy_wavegen"));
        open_guard(&mut out, &set.output);
        push_defines(&mut out, "XY", res, set.array_size);

        out.push_str("#define XY_OK 0\n");
        out.push_str("#define XY_NULL_POINTER_ERROR (-1)\n");
        out.push_str("#define XY_INVALID_PATTERN_ERROR (-2)\n\n");
        out.push_str("/* Override before including to delay between points */\n");
        out.push_str("#ifndef XY_DELAY_US\n");
        out.push_str("#define XY_DELAY_US(us) ((void)(us))\n");
        out.push_str("#endif\n\n");

        out.push_str("/* Pattern data */\n\n");
        for table in set.tables.iter() {
            push_array(&mut out, c_type, &format!("{}_x", table.name), "XY_ARRAY_SIZE", &table.x, res);
            push_array(&mut out, c_type, &format!("{}_y", table.name), "XY_ARRAY_SIZE", &table.y, res);
        }

        out.push_str("/* Pattern types */\n");
        push_enum(&mut out, &set.tables, "XY_PATTERN", "xy_pattern_t");

        for axis in ["x", "y"].iter() {
            out.push_str(&format!(
                "static const {}* const xy_{}_tables[XY_PATTERN_COUNT] = {{\n", c_type, axis));
            for table in set.tables.iter() {
                out.push_str(&format!("    {}_{},\n", table.name, axis));
            }
            out.push_str("};\n\n");
        }

        out.push_str("static const char* const xy_pattern_names[XY_PATTERN_COUNT] = {\n");
        for table in set.tables.iter() {
            out.push_str(&format!("    \"{}\",\n", display_name(table.name)));
        }
        out.push_str("};\n\n");

        out.push_str("/* Sets both coordinates to XY_CENTER for an invalid pattern or index */\n");
        out.push_str(&format!(
            "static inline void get_xy_point(xy_pattern_t pattern, {} index, {}* x, {}* y) {{\n",
            index_type, c_type, c_type));
        out.push_str("    if (x == NULL || y == NULL) {\n");
        out.push_str("        return;\n");
        out.push_str("    }\n");
        out.push_str("    if ((unsigned)pattern >= XY_PATTERN_COUNT || index >= XY_ARRAY_SIZE) {\n");
        out.push_str("        *x = XY_CENTER;\n");
        out.push_str("        *y = XY_CENTER;\n");
        out.push_str("        return;\n");
        out.push_str("    }\n");
        out.push_str("    *x = xy_x_tables[pattern][index];\n");
        out.push_str("    *y = xy_y_tables[pattern][index];\n");
        out.push_str("}\n\n");

        out.push_str(&format!("typedef void (*xy_output_fn)({} value);\n\n", c_type));
        out.push_str("/* Writes all points of a pattern to the two DAC sinks */\n");
        out.push_str("static inline int output_xy_pattern(xy_pattern_t pattern, xy_output_fn x_out, xy_output_fn y_out, uint32_t delay_us) {\n");
        out.push_str("    if (x_out == NULL || y_out == NULL) {\n");
        out.push_str("        return XY_NULL_POINTER_ERROR;\n");
        out.push_str("    }\n");
        out.push_str("    if ((unsigned)pattern >= XY_PATTERN_COUNT) {\n");
        out.push_str("        return XY_INVALID_PATTERN_ERROR;\n");
        out.push_str("    }\n");
        out.push_str("    for (uint32_t i = 0; i < XY_ARRAY_SIZE; i++) {\n");
        out.push_str("        x_out(xy_x_tables[pattern][i]);\n");
        out.push_str("        y_out(xy_y_tables[pattern][i]);\n");
        out.push_str("        XY_DELAY_US(delay_us);\n");
        out.push_str("    }\n");
        out.push_str("    return XY_OK;\n");
        out.push_str("}\n\n");

        out.push_str(&footer(set, "xy_wavegen"));
        close_guard(&mut out, &set.output);
        Ok(out)
    }
}

/// Derive the include guard from the output name.
///
/// Only the file name is used. Characters that can't appear in a C
/// identifier become underscores.
///
/// ```
/// use wavegen::include_guard;
///
/// assert_eq!(include_guard("waveforms.h"), "WAVEFORMS_H");
/// assert_eq!(include_guard("out/xy-patterns.h"), "XY_PATTERNS_H");
/// assert_eq!(include_guard("-"), "WAVEGEN_TABLES_H");
/// assert_eq!(include_guard("2d.h"), "WAVEGEN_2D_H");
/// ```
pub fn include_guard(output: &str) -> String {
    let file_name = output.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(output);
    let mut guard: String = file_name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if !guard.chars().any(|c| c.is_ascii_alphanumeric()) {
        return "WAVEGEN_TABLES_H".to_string();
    }
    // Leading digits are invalid, a leading underscore is reserved
    if !guard.starts_with(|c: char| c.is_ascii_alphabetic()) {
        guard = format!("WAVEGEN_{}", guard.trim_start_matches('_'));
    }
    guard
}

/// Turn a catalog name into a human readable name, "rose_5" becomes "Rose 5".
pub fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// Smallest index type covering all table positions.
fn index_type(array_size: usize) -> &'static str {
    if array_size > MAX_U16_INDEXED { "uint32_t" } else { "uint16_t" }
}

fn file_comment<T: Table>(set: &TableSet<T>, title: &str, generator: &str) -> String {
    let res = &set.resolution;
    let mut out = String::new();
    out.push_str("/*\n");
    out.push_str(&format!(" * {}\n", set.output));
    out.push_str(" *\n");
    out.push_str(&format!(" * {}, generated by {}.\n", title, generator));
    out.push_str(&format!(" * Resolution: {} bits, values 0 to {}, center {}, stored as {}\n",
        res.bits(), res.max_value(), res.center(), res.storage().c_type()));
    out.push_str(&format!(" * Samples per table: {}\n", set.array_size));
    out.push_str(" *\n");
    let width = set.tables.iter().map(|t| t.name().len()).max().unwrap_or(0);
    for table in set.tables.iter() {
        out.push_str(&format!(" *   {:<w$}  {}\n", table.name(), table.description(), w = width));
    }
    out.push_str(" */\n\n");
    out
}

fn open_guard(out: &mut String, output: &str) {
    let guard = include_guard(output);
    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
    out.push_str("#include <stdint.h>\n#include <stddef.h>\n\n");
}

fn close_guard(out: &mut String, output: &str) {
    out.push_str(&format!("#endif /* {} */\n", include_guard(output)));
}

fn push_defines(out: &mut String, prefix: &str, res: &Resolution, array_size: usize) {
    let suffix = res.storage().c_literal_suffix();
    out.push_str(&format!("#define {}_ARRAY_SIZE {}\n", prefix, array_size));
    out.push_str(&format!("#define {}_BITS {}\n", prefix, res.bits()));
    out.push_str(&format!("#define {}_MAX_VALUE {}{}\n", prefix, res.max_value(), suffix));
    out.push_str(&format!("#define {}_CENTER {}{}\n\n", prefix, res.center(), suffix));
}

// Emit a single const array, VALUES_PER_LINE right aligned values per line.
fn push_array(out: &mut String, c_type: &str, ident: &str, size_define: &str, samples: &SampleTable, res: &Resolution) {
    let suffix = res.storage().c_literal_suffix();
    let width = res.max_digits() + suffix.len();
    let values: Vec<String> = samples.iter()
        .map(|v| format!("{:>w$}", format!("{}{}", v, suffix), w = width))
        .collect();
    out.push_str(&format!("static const {} {}[{}] = {{\n", c_type, ident, size_define));
    let num_lines = (values.len() + VALUES_PER_LINE - 1) / VALUES_PER_LINE;
    for (line, chunk) in values.chunks(VALUES_PER_LINE).enumerate() {
        out.push_str("    ");
        out.push_str(&chunk.join(", "));
        if line + 1 < num_lines {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("};\n\n");
}

fn push_enum<T: Table>(out: &mut String, tables: &[T], prefix: &str, type_name: &str) {
    out.push_str("typedef enum {\n");
    for (i, table) in tables.iter().enumerate() {
        let ident = format!("{}_{}", prefix, table.name().to_ascii_uppercase());
        if i == 0 {
            out.push_str(&format!("    {} = 0,\n", ident));
        } else {
            out.push_str(&format!("    {},\n", ident));
        }
    }
    out.push_str(&format!("    {}_COUNT\n", prefix));
    out.push_str(&format!("}} {};\n\n", type_name));
}

fn footer<T: Table>(set: &TableSet<T>, generator: &str) -> String {
    format!("/* Generated with {} {}: {} tables, {} samples, {} bytes of table data */\n\n",
        generator, env!("CARGO_PKG_VERSION"), set.tables.len(), set.total_samples(), set.memory_bytes())
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use super::request::{GenerationRequest, Selection};
#[cfg(test)]
use super::table_builder::{build_patterns, build_waveforms};

#[cfg(test)]
fn request(bits: u32, array_size: usize, selection: &str) -> GenerationRequest {
    GenerationRequest {
        bits,
        array_size,
        selection: Selection::parse(selection),
        ..GenerationRequest::default()
    }
}

// Extract the values of an emitted array, suffixes stripped.
#[cfg(test)]
fn array_values(header: &str, ident: &str) -> Vec<u64> {
    let start = header.find(&format!(" {}[", ident)).unwrap();
    let body_start = start + header[start..].find('{').unwrap() + 1;
    let body_end = body_start + header[body_start..].find("};").unwrap();
    header[body_start..body_end]
        .split(',')
        .map(|v| v.trim().trim_end_matches(|c: char| c == 'U' || c == 'L'))
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<u64>().unwrap())
        .collect()
}

#[test]
fn sine_array_matches_table() {
    let set = build_waveforms(&request(8, 256, "sine")).unwrap();
    let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    let values = array_values(&header, "sine_wave");
    assert_eq!(values, set.tables[0].samples.to_vec());
    assert_eq!(values[0], 128);
    assert_eq!(values[64], 255);
}

#[test]
fn arrays_have_sixteen_values_per_line() {
    let set = build_waveforms(&request(12, 40, "sine")).unwrap();
    let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    let start = header.find("sine_wave[").unwrap();
    let lines: Vec<&str> = header[start..].lines().skip(1).take(3).collect();
    assert_eq!(lines[0].split(',').filter(|v| !v.trim().is_empty()).count(), 16);
    assert_eq!(lines[1].split(',').filter(|v| !v.trim().is_empty()).count(), 16);
    assert_eq!(lines[2].split(',').count(), 8);
    assert!(lines[1].ends_with(','));
    assert!(!lines[2].ends_with(','));
    // Right aligned to the width of 4095
    assert!(lines[0].starts_with("    2048, "));
}

#[test]
fn header_has_guard_defines_and_accessor() {
    let mut req = request(8, 256, "all");
    req.output = "out/waveforms.h".to_string();
    let set = build_waveforms(&req).unwrap();
    let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    assert!(header.contains("#ifndef WAVEFORMS_H\n#define WAVEFORMS_H\n"));
    assert!(header.ends_with("#endif /* WAVEFORMS_H */\n"));
    assert!(header.contains("#include <stdint.h>"));
    assert!(header.contains("#define WAVEFORM_ARRAY_SIZE 256\n"));
    assert!(header.contains("#define WAVEFORM_BITS 8\n"));
    assert!(header.contains("#define WAVEFORM_MAX_VALUE 255\n"));
    assert!(header.contains("    WAVE_SINE = 0,\n    WAVE_TRIANGLE,\n"));
    assert!(header.contains("    WAVE_NOISE,\n    WAVE_COUNT\n} waveform_type_t;"));
    assert!(header.contains("\"Sine Wave\","));
    assert!(header.contains("get_waveform_sample(waveform_type_t wave, uint16_t index)"));
    assert!(header.contains("if ((unsigned)wave >= WAVE_COUNT || index >= WAVEFORM_ARRAY_SIZE)"));
    assert!(header.contains("return WAVEFORM_CENTER;"));
    for table in set.tables.iter() {
        assert!(header.contains(&format!("static const uint8_t {}_wave[WAVEFORM_ARRAY_SIZE]", table.name)));
    }
}

#[test]
fn wide_literals_carry_suffix() {
    let set = build_waveforms(&request(64, 16, "sine")).unwrap();
    let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    assert!(header.contains("#define WAVEFORM_MAX_VALUE 18446744073709551615ULL\n"));
    assert!(header.contains("#define WAVEFORM_CENTER 9223372036854775808ULL\n"));
    assert!(header.contains("static const uint64_t sine_wave"));
    assert_eq!(array_values(&header, "sine_wave"), set.tables[0].samples.to_vec());

    let set = build_waveforms(&request(24, 16, "sine")).unwrap();
    let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    assert!(header.contains("#define WAVEFORM_CENTER 8388608UL\n"));
    assert!(header.contains("static const uint32_t sine_wave"));
}

#[test]
fn large_tables_use_wide_index() {
    let set = build_waveforms(&request(8, 65536, "ramp")).unwrap();
    let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    assert!(header.contains("uint16_t index"));
    let set = build_waveforms(&request(8, 65537, "ramp")).unwrap();
    let header = CHeaderEmitter::new().emit_waveforms(&set).unwrap();
    assert!(header.contains("uint32_t index"));
}

#[test]
fn pattern_header_has_xy_api() {
    let mut req = request(12, 128, "circle,heart");
    req.output = "xy_patterns.h".to_string();
    let set = build_patterns(&req).unwrap();
    let header = CHeaderEmitter::new().emit_patterns(&set).unwrap();
    assert!(header.contains("#ifndef XY_PATTERNS_H"));
    assert!(header.contains("#define XY_CENTER 2048\n"));
    assert!(header.contains("static const uint16_t circle_x[XY_ARRAY_SIZE]"));
    assert!(header.contains("static const uint16_t heart_y[XY_ARRAY_SIZE]"));
    assert!(header.contains("    XY_PATTERN_CIRCLE = 0,\n    XY_PATTERN_HEART,\n    XY_PATTERN_COUNT\n"));
    assert!(header.contains("return XY_NULL_POINTER_ERROR;"));
    assert!(header.contains("return XY_INVALID_PATTERN_ERROR;"));
    assert!(header.contains("for (uint32_t i = 0; i < XY_ARRAY_SIZE; i++)"));
    assert!(header.contains("XY_DELAY_US(delay_us);"));
    assert!(header.contains("#ifndef XY_DELAY_US"));
    assert!(header.contains("*x = XY_CENTER;"));
    assert_eq!(array_values(&header, "circle_x"), set.tables[0].x.to_vec());
    assert_eq!(array_values(&header, "heart_y"), set.tables[1].y.to_vec());
}

#[test]
fn rendering_is_reproducible() {
    let req = request(16, 300, "all");
    let emitter = CHeaderEmitter::new();
    let first = emitter.emit_waveforms(&build_waveforms(&req).unwrap()).unwrap();
    let second = emitter.emit_waveforms(&build_waveforms(&req).unwrap()).unwrap();
    assert_eq!(first, second);
    let first = emitter.emit_patterns(&build_patterns(&req).unwrap()).unwrap();
    let second = emitter.emit_patterns(&build_patterns(&req).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn names_are_made_readable() {
    assert_eq!(display_name("sine"), "Sine");
    assert_eq!(display_name("lissajous_3_2"), "Lissajous 3 2");
    assert_eq!(display_name("spiral_archimedes"), "Spiral Archimedes");
}

#[test]
fn include_guard_is_never_reserved() {
    assert_eq!(include_guard("2d.h"), "WAVEGEN_2D_H");
    assert_eq!(include_guard("_scope.h"), "WAVEGEN_SCOPE_H");
    assert_eq!(include_guard("out/__x.h"), "WAVEGEN_X_H");
    for output in ["2d.h", "_scope.h", "-", "9.h", "waveforms.h"].iter() {
        let guard = include_guard(output);
        assert!(guard.starts_with(|c: char| c.is_ascii_uppercase()), "{}", guard);
    }
}

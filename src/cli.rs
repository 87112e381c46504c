//! Command line handling shared by the wavegen and xy_wavegen binaries.

use crate::catalog::{list, CatalogItem};
use crate::error::GenError;
use crate::header_writer::{CHeaderEmitter, TableEmitter};
use crate::json_writer::JsonEmitter;
use crate::request::{array_size_from, AnimationFrame, GenerationRequest, Selection};
use crate::resolution::SUPPORTED_BIT_WIDTHS;
use crate::table_builder::{Table, TableSet};
use crate::Float;

use anyhow::Context;
use clap::{Args, Parser, ValueEnum};
use flexi_logger::{Logger, opt_format};
use log::info;

/// Default log specification, overridden by RUST_LOG.
pub const DEFAULT_LOG_SPEC: &str = "wavegen=warn";

/// Output file format
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// C header with static const arrays
    C,
    /// JSON document
    Json,
}

/// Options shared by both generators
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Bits per sample (8, 10, 12, 14, 16, 24, 32 or 64)
    #[arg(short, long, default_value_t = 8)]
    pub bits: u32,

    /// Number of samples per table
    #[arg(short, long, default_value_t = 256, allow_negative_numbers = true)]
    pub size: i64,

    /// Amplitude multiplier
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub amplitude: Float,

    /// Frequency multiplier (periods per table)
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub frequency: Float,

    /// Phase offset in radians
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub phase: Float,

    /// Worker threads used to build the tables
    #[arg(short, long, default_value_t = 1)]
    pub threads: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::C)]
    pub format: OutputFormat,

    /// List the available names and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,

    /// Load the request from a JSON file instead of the flags above
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Write log messages to files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<String>,
}

/// Generate waveform lookup tables as a C header
#[derive(Parser, Debug)]
#[command(name = "wavegen", version)]
pub struct WaveArgs {
    /// Comma separated list of waveforms, or "all"
    #[arg(short, long, default_value = "all")]
    pub waves: String,

    /// Output file, "-" for stdout
    #[arg(short, long, default_value = "waveforms.h")]
    pub output: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Generate XY pattern tables for oscilloscope display
#[derive(Parser, Debug)]
#[command(name = "xy_wavegen", version)]
pub struct XyArgs {
    /// Comma separated list of patterns, or "all"
    #[arg(short = 'P', long, default_value = "all")]
    pub patterns: String,

    /// Output file, "-" for stdout
    #[arg(short, long, default_value = "xy_patterns.h")]
    pub output: String,

    /// Render a single animation frame
    #[arg(long)]
    pub frame: Option<u32>,

    /// Number of frames in the animation
    #[arg(long, default_value_t = 60)]
    pub frames_total: u32,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl WaveArgs {
    pub fn to_request(&self) -> anyhow::Result<GenerationRequest> {
        self.common.to_request(&self.waves, &self.output, None)
    }
}

impl XyArgs {
    pub fn to_request(&self) -> anyhow::Result<GenerationRequest> {
        let frames_total = self.frames_total;
        let animation = self.frame.map(|frame| AnimationFrame{frame, frames_total});
        self.common.to_request(&self.patterns, &self.output, animation)
    }
}

impl CommonArgs {
    /// Build the request from the flags, or load it from the config file.
    ///
    /// A config file without an output name uses the output flag.
    pub fn to_request(&self, selection: &str, output: &str, animation: Option<AnimationFrame>)
            -> anyhow::Result<GenerationRequest> {
        if let Some(path) = &self.config {
            info!("Loading request from {}", path);
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let request = GenerationRequest::from_json_with_output(&json, output)
                .with_context(|| format!("Failed to parse config file {}", path))?;
            return Ok(request);
        }
        Ok(GenerationRequest {
            bits: self.bits,
            array_size: array_size_from(self.size)?,
            selection: Selection::parse(selection),
            amplitude: self.amplitude,
            frequency: self.frequency,
            phase: self.phase,
            output: output.to_string(),
            threads: self.threads,
            animation,
        })
    }
}

/// Start the logger, optionally writing to files in log_dir.
pub fn init_logger(log_dir: Option<&str>) -> anyhow::Result<()> {
    let logger = Logger::with_env_or_str(DEFAULT_LOG_SPEC).format(opt_format);
    let logger = match log_dir {
        Some(dir) => logger.log_to_file().directory(dir.to_string()),
        None => logger,
    };
    logger.start().context("Failed to start logger")?;
    Ok(())
}

/// Process exit code for a failed run: 2 for an invalid request, 1 for
/// everything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<GenError>() {
        Some(e) if e.is_configuration_error() => 2,
        _ => 1,
    }
}

pub fn emitter(format: OutputFormat) -> Box<dyn TableEmitter> {
    match format {
        OutputFormat::C => Box::new(CHeaderEmitter::new()),
        OutputFormat::Json => Box::new(JsonEmitter::new()),
    }
}

/// Render the catalog listing as text or JSON.
pub fn catalog_listing<T: CatalogItem>(catalog: &'static [T], json: bool) -> anyhow::Result<String> {
    let entries = list(catalog);
    if json {
        return Ok(serde_json::to_string_pretty(&entries)?);
    }
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = format!("Available {}s:\n", T::KIND);
    for entry in entries.iter() {
        out.push_str(&format!("  {:<w$}  {}\n", entry.name, entry.description, w = width));
    }
    let widths: Vec<String> = SUPPORTED_BIT_WIDTHS.iter().map(|b| b.to_string()).collect();
    out.push_str(&format!("\nSupported bit-widths: {}\n", widths.join(", ")));
    Ok(out)
}

/// Write the rendered text to a file, or to stdout for "-".
pub fn write_output(output: &str, text: &str) -> anyhow::Result<()> {
    if output == "-" {
        print!("{}", text);
        return Ok(());
    }
    std::fs::write(output, text).with_context(|| format!("Failed to write {}", output))?;
    info!("Wrote {} bytes to {}", text.len(), output);
    Ok(())
}

/// Summary of a finished run, for printing after the output was written.
pub fn statistics<T: Table>(set: &TableSet<T>, bytes_written: usize) -> String {
    let res = &set.resolution;
    let mut out = format!("Generated {} tables in {}\n", set.tables.len(), set.output);
    out.push_str(&format!("  Resolution: {} bits (0 to {}, center {}), stored as {}\n",
        res.bits(), res.max_value(), res.center(), res.storage().c_type()));
    out.push_str(&format!("  Samples per table: {}\n", set.array_size));
    let width = set.tables.iter().map(|t| t.name().len()).max().unwrap_or(0);
    for table in set.tables.iter() {
        let ranges: Vec<String> = table.channel_names().iter()
            .zip(table.channels())
            .map(|(name, samples)| match samples.range() {
                Some((min, max)) => format!("{} {}..{}", name, min, max),
                None => format!("{} empty", name),
            })
            .collect();
        out.push_str(&format!("    {:<w$}  {}\n", table.name(), ranges.join(", "), w = width));
    }
    out.push_str(&format!("  File size: {} bytes\n", bytes_written));
    out.push_str(&format!("  Total samples: {}\n", set.total_samples()));
    out.push_str(&format!("  Table memory: {} bytes\n", set.memory_bytes()));
    out
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use crate::catalog::{PATTERNS, WAVEFORMS};
#[cfg(test)]
use crate::table_builder::build_waveforms;

#[test]
fn wave_args_have_defaults() {
    let args = WaveArgs::try_parse_from(["wavegen"]).unwrap();
    let req = args.to_request().unwrap();
    assert_eq!(req, GenerationRequest::default());
    assert_eq!(args.common.format, OutputFormat::C);
}

#[test]
fn wave_args_map_to_request() {
    let args = WaveArgs::try_parse_from([
        "wavegen", "--bits", "12", "--size", "512", "--waves", "sine,square",
        "--amplitude", "0.5", "--frequency", "2", "--phase", "-1.5", "--threads", "3",
        "--output", "-", "--format", "json",
    ]).unwrap();
    let req = args.to_request().unwrap();
    assert_eq!(req.bits, 12);
    assert_eq!(req.array_size, 512);
    assert_eq!(req.selection, Selection::parse("sine,square"));
    assert_eq!(req.amplitude, 0.5);
    assert_eq!(req.frequency, 2.0);
    assert_eq!(req.phase, -1.5);
    assert_eq!(req.threads, 3);
    assert_eq!(req.output, "-");
    assert_eq!(args.common.format, OutputFormat::Json);
}

#[test]
fn negative_size_is_rejected() {
    let args = WaveArgs::try_parse_from(["wavegen", "--size", "-5"]).unwrap();
    assert!(args.to_request().is_err());
    let args = WaveArgs::try_parse_from(["wavegen", "--size", "0"]).unwrap();
    assert!(args.to_request().is_err());
}

#[test]
fn xy_args_select_animation_frame() {
    let args = XyArgs::try_parse_from(["xy_wavegen", "--patterns", "rose_5", "--frame", "10"]).unwrap();
    let req = args.to_request().unwrap();
    assert_eq!(req.output, "xy_patterns.h");
    assert_eq!(req.animation, Some(AnimationFrame{frame: 10, frames_total: 60}));

    let args = XyArgs::try_parse_from(["xy_wavegen"]).unwrap();
    assert_eq!(args.to_request().unwrap().animation, None);
}

#[test]
fn config_file_replaces_flags() {
    let path = std::env::temp_dir().join(format!("wavegen_config_test_{}.json", std::process::id()));
    std::fs::write(&path, r#"{"bits": 16, "array_size": 100, "selection": {"names": ["noise"]}}"#).unwrap();
    let path_str = path.to_str().unwrap();
    let args = WaveArgs::try_parse_from(["wavegen", "--bits", "8", "--config", path_str]).unwrap();
    let req = args.to_request().unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(req.bits, 16);
    assert_eq!(req.array_size, 100);
    assert_eq!(req.selection, Selection::parse("noise"));

    let args = WaveArgs::try_parse_from(["wavegen", "--config", "/nonexistent/wavegen.json"]).unwrap();
    assert!(args.to_request().is_err());
}

#[test]
fn config_without_output_keeps_bin_default() {
    let path = std::env::temp_dir().join(format!("wavegen_xy_config_test_{}.json", std::process::id()));
    std::fs::write(&path, r#"{"bits": 12, "selection": {"names": ["circle"]}}"#).unwrap();
    let path_str = path.to_str().unwrap();
    let args = XyArgs::try_parse_from(["xy_wavegen", "--config", path_str]).unwrap();
    let req = args.to_request().unwrap();
    assert_eq!(req.output, "xy_patterns.h");
    let args = XyArgs::try_parse_from(["xy_wavegen", "--config", path_str, "--output", "scope.h"]).unwrap();
    let req = args.to_request().unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(req.output, "scope.h");
    assert_eq!(req.bits, 12);
}

#[test]
fn exit_code_separates_request_errors() {
    let args = WaveArgs::try_parse_from(["wavegen", "--size", "0"]).unwrap();
    assert_eq!(exit_code(&args.to_request().unwrap_err()), 2);

    let args = WaveArgs::try_parse_from(["wavegen", "--waves", "sine,nope"]).unwrap();
    let err = build_waveforms(&args.to_request().unwrap()).unwrap_err();
    assert_eq!(exit_code(&anyhow::Error::from(err)), 2);

    let err = GenError::NonFiniteSample { value: Float::NAN };
    assert_eq!(exit_code(&anyhow::Error::from(err)), 1);
    let args = WaveArgs::try_parse_from(["wavegen", "--config", "/nonexistent/wavegen.json"]).unwrap();
    assert_eq!(exit_code(&args.to_request().unwrap_err()), 1);
}

#[test]
fn listing_shows_all_names() {
    let text = catalog_listing(WAVEFORMS, false).unwrap();
    assert!(text.starts_with("Available waveforms:\n"));
    for w in WAVEFORMS {
        assert!(text.contains(w.name));
    }
    assert!(text.contains("Supported bit-widths: 8, 10, 12, 14, 16, 24, 32, 64"));

    let json = catalog_listing(PATTERNS, true).unwrap();
    let entries: Vec<crate::catalog::CatalogEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(entries.len(), PATTERNS.len());
    assert_eq!(entries[0].kind, "pattern");
}

#[test]
fn output_is_written_to_file() {
    let path = std::env::temp_dir().join(format!("wavegen_output_test_{}.h", std::process::id()));
    let path_str = path.to_str().unwrap();
    write_output(path_str, "#define X 1\n").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "#define X 1\n");
    std::fs::remove_file(&path).unwrap();
    assert!(write_output("/nonexistent/dir/out.h", "x").is_err());
}

#[test]
fn statistics_report_ranges_and_memory() {
    let req = GenerationRequest {
        array_size: 100,
        selection: Selection::parse("ramp"),
        ..GenerationRequest::default()
    };
    let set = build_waveforms(&req).unwrap();
    let text = statistics(&set, 1234);
    assert!(text.contains("ramp  samples 0..255"));
    assert!(text.contains("File size: 1234 bytes"));
    assert!(text.contains("Total samples: 100"));
    assert!(text.contains("Table memory: 100 bytes"));
}

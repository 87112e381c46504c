//! Builds quantized tables for a generation request.
//!
//! Building happens in two phases. First the whole request is validated:
//! sample count, bit-width, multipliers, selected names and the parameters of
//! every selected generator. Only then are samples computed, so a bad request
//! never produces a partial result.
//!
//! Every table is independent of all others. With more than one thread the
//! tables are distributed over a scoped thread pool; results are stored by
//! selection index, so the output does not depend on the number of threads.

use super::catalog::{resolve, CatalogItem, PatternSpec, WaveformSpec, PATTERNS, WAVEFORMS};
use super::error::Result;
use super::quantizer::Quantizer;
use super::request::GenerationRequest;
use super::resolution::Resolution;
use super::sample_table::SampleTable;
use super::wave_functions::WaveParams;

use log::{debug, info};
use scoped_threadpool::Pool;
use serde::Serialize;

/// Quantized samples of one waveform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WaveTable {
    pub name: &'static str,
    pub description: &'static str,
    pub samples: SampleTable,
}

/// Quantized X and Y samples of one pattern.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatternTable {
    pub name: &'static str,
    pub description: &'static str,
    pub x: SampleTable,
    pub y: SampleTable,
}

/// Common view on generated tables, used for emitting and statistics.
pub trait Table {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// The sample sequences of the table, one per output channel.
    fn channels(&self) -> Vec<&SampleTable>;

    /// Names of the channels, in the order of channels().
    fn channel_names(&self) -> &'static [&'static str];
}

impl Table for WaveTable {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn channels(&self) -> Vec<&SampleTable> {
        vec![&self.samples]
    }

    fn channel_names(&self) -> &'static [&'static str] {
        &["samples"]
    }
}

impl Table for PatternTable {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn channels(&self) -> Vec<&SampleTable> {
        vec![&self.x, &self.y]
    }

    fn channel_names(&self) -> &'static [&'static str] {
        &["x", "y"]
    }
}

/// All tables of one run together with the shared metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableSet<T> {
    pub output: String,
    pub resolution: Resolution,
    pub array_size: usize,
    pub tables: Vec<T>,
}

impl<T: Table> TableSet<T> {
    /// Number of samples over all tables and channels.
    pub fn total_samples(&self) -> usize {
        self.tables.iter().flat_map(|t| t.channels()).map(|c| c.len()).sum()
    }

    /// Memory needed by all samples in their storage type.
    pub fn memory_bytes(&self) -> usize {
        self.tables.iter().flat_map(|t| t.channels()).map(|c| c.num_bytes()).sum()
    }
}

/// Evaluates generators over the sample grid and quantizes the results.
pub struct TableBuilder {
    quantizer: Quantizer,
    array_size: usize,
    params: WaveParams,
    threads: u32,
}

impl TableBuilder {
    /// Create a builder for a request.
    ///
    /// Fails if the request itself is invalid. The selection is not looked
    /// at here.
    pub fn new(request: &GenerationRequest) -> Result<TableBuilder> {
        let resolution = request.validate()?;
        Ok(TableBuilder {
            quantizer: Quantizer::new(resolution),
            array_size: request.array_size,
            params: request.params(),
            threads: request.threads,
        })
    }

    pub fn resolution(&self) -> &Resolution {
        self.quantizer.resolution()
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    /// Sample and quantize a single waveform.
    pub fn build_waveform(&self, spec: &WaveformSpec) -> Result<WaveTable> {
        spec.shape.validate(spec.name, &self.params)?;
        debug!("Generating waveform {}", spec.name);
        let storage = self.resolution().storage();
        let mut samples = SampleTable::new(storage, self.array_size);
        for i in 0..self.array_size {
            let value = spec.shape.value(i, self.array_size, &self.params);
            samples.push(self.quantizer.quantize(value)?)?;
        }
        Ok(WaveTable { name: spec.name, description: spec.description, samples })
    }

    /// Sample and quantize a single pattern.
    ///
    /// Both coordinates of a sample come from the same call, X and Y can't
    /// drift apart.
    pub fn build_pattern(&self, spec: &PatternSpec) -> Result<PatternTable> {
        spec.shape.validate(spec.name, &self.params)?;
        debug!("Generating pattern {}", spec.name);
        let storage = self.resolution().storage();
        let mut x = SampleTable::new(storage, self.array_size);
        let mut y = SampleTable::new(storage, self.array_size);
        for i in 0..self.array_size {
            let (x_val, y_val) = spec.shape.point(i, self.array_size, &self.params);
            let (qx, qy) = self.quantizer.quantize_xy(x_val, y_val)?;
            x.push(qx)?;
            y.push(qy)?;
        }
        Ok(PatternTable { name: spec.name, description: spec.description, x, y })
    }

    // Run build over all specs, in parallel if configured.
    fn build_all<S, T, F>(&self, specs: &[&'static S], build: F) -> Result<Vec<T>>
            where S: CatalogItem, T: Send, F: Fn(&S) -> Result<T> + Sync {
        if self.threads <= 1 || specs.len() < 2 {
            return specs.iter().map(|spec| build(*spec)).collect();
        }
        let mut results: Vec<Option<Result<T>>> = specs.iter().map(|_| None).collect();
        // At most one worker per table
        let workers = self.threads.min(specs.len() as u32);
        debug!("Building {} tables on {} threads", specs.len(), workers);
        let mut pool = Pool::new(workers);
        pool.scoped(|scope| {
            let build = &build;
            for (slot, spec) in results.iter_mut().zip(specs.iter()) {
                scope.execute(move || {
                    *slot = Some(build(*spec));
                });
            }
        });
        // Every slot was filled when the scope returned
        results.into_iter().flatten().collect()
    }
}

/// Validate the request and build all selected waveforms.
///
/// ```
/// use wavegen::{build_waveforms, GenerationRequest, Selection};
///
/// let request = GenerationRequest {
///     bits: 8,
///     array_size: 256,
///     selection: Selection::parse("sine"),
///     ..GenerationRequest::default()
/// };
/// let set = build_waveforms(&request).unwrap();
/// let sine = &set.tables[0].samples;
/// assert_eq!(sine.len(), 256);
/// assert_eq!(sine.get(0), Some(128));
/// assert_eq!(sine.get(64), Some(255));
/// ```
pub fn build_waveforms(request: &GenerationRequest) -> Result<TableSet<WaveTable>> {
    let builder = TableBuilder::new(request)?;
    let specs = resolve(WAVEFORMS, &request.selection)?;
    for spec in specs.iter() {
        spec.shape.validate(spec.name, builder.params())?;
    }
    info!("Generating {} waveforms, {} bits, {} samples",
        specs.len(), builder.resolution().bits(), request.array_size);
    let tables = builder.build_all(&specs, |spec| builder.build_waveform(spec))?;
    Ok(TableSet {
        output: request.output.clone(),
        resolution: *builder.resolution(),
        array_size: request.array_size,
        tables,
    })
}

/// Validate the request and build all selected XY patterns.
pub fn build_patterns(request: &GenerationRequest) -> Result<TableSet<PatternTable>> {
    let builder = TableBuilder::new(request)?;
    let specs = resolve(PATTERNS, &request.selection)?;
    for spec in specs.iter() {
        spec.shape.validate(spec.name, builder.params())?;
    }
    info!("Generating {} XY patterns, {} bits, {} samples",
        specs.len(), builder.resolution().bits(), request.array_size);
    let tables = builder.build_all(&specs, |spec| builder.build_pattern(spec))?;
    Ok(TableSet {
        output: request.output.clone(),
        resolution: *builder.resolution(),
        array_size: request.array_size,
        tables,
    })
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use super::Float;
#[cfg(test)]
use super::error::GenError;
#[cfg(test)]
use super::request::Selection;
#[cfg(test)]
use super::resolution::SUPPORTED_BIT_WIDTHS;
#[cfg(test)]
use super::wave_functions::TWO_PI;

#[cfg(test)]
fn request(bits: u32, array_size: usize, selection: &str) -> GenerationRequest {
    GenerationRequest {
        bits,
        array_size,
        selection: Selection::parse(selection),
        ..GenerationRequest::default()
    }
}

#[cfg(test)]
fn within_one(actual: u64, expected: u64, index: usize) -> bool {
    let diff = if actual > expected { actual - expected } else { expected - actual };
    if diff > 1 {
        println!("{}: Expected {}, actual {}", index, expected, actual);
        false
    } else {
        true
    }
}

#[test]
fn tables_have_requested_length_and_range() {
    for bits in SUPPORTED_BIT_WIDTHS.iter() {
        for size in [1, 2, 3, 255, 1000].iter() {
            let set = build_waveforms(&request(*bits, *size, "all")).unwrap();
            assert_eq!(set.tables.len(), WAVEFORMS.len());
            let max = set.resolution.max_value();
            for table in set.tables.iter() {
                assert_eq!(table.samples.len(), *size, "{} at {} bits", table.name, bits);
                assert!(table.samples.iter().all(|s| s <= max));
                assert_eq!(table.samples.storage_type(), set.resolution.storage());
            }
        }
    }
}

#[test]
fn pattern_tables_have_requested_length_and_range() {
    for bits in [8, 12, 64].iter() {
        let set = build_patterns(&request(*bits, 300, "all")).unwrap();
        assert_eq!(set.tables.len(), PATTERNS.len());
        let max = set.resolution.max_value();
        for table in set.tables.iter() {
            assert_eq!(table.x.len(), 300);
            assert_eq!(table.y.len(), 300);
            assert!(table.x.iter().chain(table.y.iter()).all(|s| s <= max));
        }
    }
}

#[test]
fn sine_8_bit_hits_center_and_peak() {
    let set = build_waveforms(&request(8, 256, "sine")).unwrap();
    let sine = &set.tables[0].samples;
    assert_eq!(sine.get(0), Some(128));
    assert_eq!(sine.get(64), Some(255));
    assert_eq!(sine.get(192), Some(0));
}

#[test]
fn sine_12_bit_stays_in_range() {
    let set = build_waveforms(&request(12, 512, "sine")).unwrap();
    assert_eq!(set.resolution.max_value(), 4095);
    assert_eq!(set.resolution.center(), 2048);
    let sine = &set.tables[0].samples;
    assert_eq!(sine.len(), 512);
    assert_eq!(sine.range(), Some((0, 4095)));
    assert_eq!(sine.get(0), Some(2048));
}

#[test]
fn zero_amplitude_gives_center_everywhere() {
    let req = GenerationRequest { amplitude: 0.0, ..request(10, 64, "all") };
    let set = build_waveforms(&req).unwrap();
    for table in set.tables.iter() {
        assert!(table.samples.iter().all(|s| s == 512), "{}", table.name);
    }
    let set = build_patterns(&GenerationRequest { amplitude: 0.0, ..request(10, 64, "circle,heart,rose_5") }).unwrap();
    for table in set.tables.iter() {
        assert!(table.x.iter().chain(table.y.iter()).all(|s| s == 512), "{}", table.name);
    }
}

#[test]
fn unknown_name_fails_before_sampling() {
    match build_waveforms(&request(8, 256, "---")) {
        Err(GenError::UnknownNames { names, valid, .. }) => {
            assert_eq!(names, vec!["---".to_string()]);
            assert!(valid.contains(&"sine"));
        }
        other => panic!("Expected UnknownNames, got {:?}", other),
    }
    assert!(build_patterns(&request(8, 256, "circle,square")).is_err());
}

#[test]
fn zero_array_size_fails() {
    match build_waveforms(&request(8, 0, "sine")) {
        Err(GenError::InvalidArraySize { size, .. }) => assert_eq!(size, 0),
        other => panic!("Expected InvalidArraySize, got {:?}", other),
    }
}

#[test]
fn selection_order_is_kept() {
    let set = build_waveforms(&request(8, 16, "noise,sine,ramp")).unwrap();
    let names: Vec<&str> = set.tables.iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["noise", "sine", "ramp"]);
}

#[test]
fn identical_requests_give_identical_tables() {
    let req = request(16, 777, "all");
    assert_eq!(build_waveforms(&req).unwrap(), build_waveforms(&req).unwrap());
    assert_eq!(build_patterns(&req).unwrap(), build_patterns(&req).unwrap());
}

#[test]
fn thread_count_does_not_change_result() {
    let single = request(12, 500, "all");
    let multi = GenerationRequest { threads: 4, ..single.clone() };
    assert_eq!(build_waveforms(&single).unwrap(), build_waveforms(&multi).unwrap());
    assert_eq!(build_patterns(&single).unwrap(), build_patterns(&multi).unwrap());
}

// Closed form of every catalog pattern at frequency 1 and phase 0.
#[cfg(test)]
fn expected_point(name: &str, t: Float) -> (Float, Float) {
    let polar = |r: Float, angle: Float| (r * angle.cos(), r * angle.sin());
    let clamp = |v: Float| v.max(-1.0).min(1.0);
    match name {
        "circle" => polar(0.8, t),
        "ellipse" => (0.8 * t.cos(), 0.6 * t.sin()),
        "lissajous_3_2" => (0.8 * (3.0 * t).sin(), 0.8 * (2.0 * t).sin()),
        "lissajous_5_4" => (0.8 * (5.0 * t).sin(), 0.8 * (4.0 * t).sin()),
        "lissajous_7_5" => (0.8 * (7.0 * t).sin(), 0.8 * (5.0 * t).sin()),
        "lissajous_cos" => (0.8 * (3.0 * t).cos(), 0.8 * (2.0 * t).sin()),
        "heart" => (
            16.0 * t.sin().powi(3) / 17.0,
            (13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos()) / 17.0,
        ),
        "rose_3" => polar(0.8 * (3.0 * t).cos(), t),
        "rose_5" => polar(0.8 * (5.0 * t).cos(), t),
        "rose_8" => polar(0.8 * (8.0 * t).cos(), t),
        "rhodonea" => polar(0.8 * (2.5 * t).cos(), t),
        "butterfly" => {
            let b = t.cos().exp() - 2.0 * (4.0 * t).cos() - (t / 12.0).sin().powi(5);
            (clamp(0.2 * t.sin() * b), clamp(0.2 * t.cos() * b))
        }
        "infinity" => {
            let d = 1.0 + t.sin() * t.sin();
            (0.8 * t.cos() / d, 0.8 * t.sin() * t.cos() / d)
        }
        "spiral_archimedes" => {
            let u = 3.0 * t;
            polar(0.8 * u / (3.0 * TWO_PI), u)
        }
        "spiral_log" => {
            let u = 2.0 * t;
            polar((0.1 * (0.2 * u).exp()).min(1.0), u)
        }
        "hypotrochoid" => (
            0.14 * (2.0 * t.cos() + 5.0 * (2.0 * t / 3.0).cos()),
            0.14 * (2.0 * t.sin() - 5.0 * (2.0 * t / 3.0).sin()),
        ),
        "cycloid" => {
            let u = 2.0 * t;
            ((u - u.sin()) / (4.0 * super::wave_functions::PI) * 2.0 - 1.0, (1.0 - u.cos()) / 2.0 - 1.0)
        }
        "astroid" => (0.8 * t.cos().powi(3), 0.8 * t.sin().powi(3)),
        other => panic!("Unexpected pattern {}", other),
    }
}

#[test]
fn xy_samples_share_the_curve_parameter() {
    let n = 360;
    let set = build_patterns(&request(16, n, "all")).unwrap();
    assert_eq!(set.tables.len(), PATTERNS.len());
    let q = Quantizer::new(set.resolution);
    for table in set.tables.iter() {
        for i in 0..n {
            let t = TWO_PI * i as Float / n as Float;
            let (x, y) = expected_point(table.name, t);
            assert!(within_one(table.x.get(i).unwrap(), q.quantize(x).unwrap(), i), "{} x", table.name);
            assert!(within_one(table.y.get(i).unwrap(), q.quantize(y).unwrap(), i), "{} y", table.name);
        }
    }
}

#[test]
fn oversized_multipliers_fail_before_sampling() {
    let req = GenerationRequest { amplitude: 1e308, ..request(8, 256, "spiral_archimedes") };
    match build_patterns(&req) {
        Err(GenError::MathDomain { generator, parameter, .. }) => {
            assert_eq!(generator, "spiral_archimedes");
            assert_eq!(parameter, "amplitude");
        }
        other => panic!("Expected MathDomain, got {:?}", other),
    }
    let req = GenerationRequest { frequency: 1e308, ..request(8, 256, "sine") };
    match build_waveforms(&req) {
        Err(GenError::MathDomain { generator, parameter, .. }) => {
            assert_eq!(generator, "sine");
            assert_eq!(parameter, "frequency");
        }
        other => panic!("Expected MathDomain, got {:?}", other),
    }
}

#[test]
fn largest_accepted_multipliers_stay_finite() {
    use super::wave_functions::MAX_PARAM_MAGNITUDE;

    let req = GenerationRequest {
        amplitude: MAX_PARAM_MAGNITUDE,
        frequency: MAX_PARAM_MAGNITUDE,
        phase: -MAX_PARAM_MAGNITUDE,
        ..request(64, 97, "all")
    };
    let max = build_waveforms(&req).unwrap().resolution.max_value();
    let set = build_patterns(&req).unwrap();
    assert_eq!(set.resolution.max_value(), max);
    for table in set.tables.iter() {
        assert_eq!(table.x.len(), 97);
        assert!(table.x.iter().chain(table.y.iter()).all(|s| s <= max));
    }
}

#[test]
fn more_threads_than_tables_is_fine() {
    use super::request::MAX_THREADS;

    let single = request(8, 64, "circle,heart");
    let wide = GenerationRequest { threads: MAX_THREADS, ..single.clone() };
    assert_eq!(build_patterns(&single).unwrap(), build_patterns(&wide).unwrap());
    let too_wide = GenerationRequest { threads: MAX_THREADS + 1, ..single };
    match build_patterns(&too_wide) {
        Err(GenError::InvalidThreadCount(n)) => assert_eq!(n, MAX_THREADS + 1),
        other => panic!("Expected InvalidThreadCount, got {:?}", other),
    }
}

#[test]
fn frequency_multiplier_sets_number_of_periods() {
    use rustfft::FftPlanner;
    use rustfft::num_complex::Complex;
    use rustfft::num_traits::Zero;

    let n = 1024;
    let req = GenerationRequest { frequency: 5.0, ..request(16, n, "sine,square") };
    let set = build_waveforms(&req).unwrap();
    let center = set.resolution.center() as Float;
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    for table in set.tables.iter() {
        let mut buffer: Vec<Complex<Float>> = vec![Complex::zero(); n];
        for (b, s) in buffer.iter_mut().zip(table.samples.iter()) {
            b.re = s as Float - center;
        }
        fft.process(&mut buffer);
        let strongest = (1..n / 2)
            .max_by(|a, b| buffer[*a].norm().partial_cmp(&buffer[*b].norm()).unwrap())
            .unwrap();
        assert_eq!(strongest, 5, "{}", table.name);
    }
}

#[test]
fn degenerate_generator_aborts_whole_run() {
    let builder = TableBuilder::new(&request(8, 64, "all")).unwrap();
    let spec = PatternSpec {
        name: "broken_spiral",
        description: "Spiral without turns",
        shape: super::xy_patterns::Pattern::SpiralArchimedes { turns: 0.0, scale: 0.8 },
    };
    match builder.build_pattern(&spec) {
        Err(GenError::MathDomain { generator, parameter, .. }) => {
            assert_eq!(generator, "broken_spiral");
            assert_eq!(parameter, "turns");
        }
        other => panic!("Expected MathDomain, got {:?}", other),
    }
}

#[test]
fn memory_estimate_uses_storage_type() {
    let set = build_waveforms(&request(12, 100, "sine,triangle")).unwrap();
    assert_eq!(set.total_samples(), 200);
    assert_eq!(set.memory_bytes(), 400);
    let set = build_patterns(&request(8, 100, "circle")).unwrap();
    assert_eq!(set.total_samples(), 200);
    assert_eq!(set.memory_bytes(), 200);
}

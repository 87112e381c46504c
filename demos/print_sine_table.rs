//! Prints a small sine table at every supported bit-width.

use wavegen::{build_waveforms, GenerationRequest, Selection, SUPPORTED_BIT_WIDTHS};

fn main() -> anyhow::Result<()> {
    for bits in SUPPORTED_BIT_WIDTHS.iter() {
        let request = GenerationRequest {
            bits: *bits,
            array_size: 16,
            selection: Selection::parse("sine"),
            ..GenerationRequest::default()
        };
        let set = build_waveforms(&request)?;
        let values: Vec<String> = set.tables[0].samples.iter().map(|v| v.to_string()).collect();
        println!("{:2} bits ({}): {}", bits, set.resolution.storage().c_type(), values.join(" "));
    }
    Ok(())
}

//! Walks the points of an XY pattern the way a DAC driver would.

use wavegen::{build_patterns, AnimationFrame, GenerationRequest, Selection};

fn main() -> anyhow::Result<()> {
    let name = std::env::args().nth(1).unwrap_or_else(|| "lissajous_3_2".to_string());
    for frame in 0..4 {
        let request = GenerationRequest {
            bits: 8,
            array_size: 12,
            selection: Selection::parse(&name),
            animation: Some(AnimationFrame{frame, frames_total: 4}),
            ..GenerationRequest::default()
        };
        let set = build_patterns(&request)?;
        let table = &set.tables[0];
        let points: Vec<String> = table.x.iter().zip(table.y.iter())
            .map(|(x, y)| format!("({},{})", x, y))
            .collect();
        println!("{} frame {}: {}", table.name, frame, points.join(" "));
    }
    Ok(())
}

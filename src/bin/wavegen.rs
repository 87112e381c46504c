use wavegen::{build_waveforms, TableEmitter, WAVEFORMS};
use wavegen::cli::{catalog_listing, emitter, exit_code, init_logger, statistics, write_output, WaveArgs};

use clap::Parser;
use log::error;

fn main() {
    let args = WaveArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn run(args: &WaveArgs) -> anyhow::Result<()> {
    init_logger(args.common.log_dir.as_deref())?;

    if args.common.list {
        print!("{}", catalog_listing(WAVEFORMS, args.common.json)?);
        return Ok(());
    }

    let request = args.to_request()?;
    let set = build_waveforms(&request).map_err(|e| {
        error!("Generation failed: {}", e);
        e
    })?;

    // Render completely before touching the output
    let text = emitter(args.common.format).emit_waveforms(&set)?;
    write_output(&set.output, &text)?;

    if set.output != "-" {
        print!("{}", statistics(&set, text.len()));
    }
    Ok(())
}

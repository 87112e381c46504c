use wavegen::{build_patterns, TableEmitter, PATTERNS};
use wavegen::cli::{catalog_listing, emitter, exit_code, init_logger, statistics, write_output, XyArgs};

use clap::Parser;
use log::error;

fn main() {
    let args = XyArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn run(args: &XyArgs) -> anyhow::Result<()> {
    init_logger(args.common.log_dir.as_deref())?;

    if args.common.list {
        print!("{}", catalog_listing(PATTERNS, args.common.json)?);
        return Ok(());
    }

    let request = args.to_request()?;
    let set = build_patterns(&request).map_err(|e| {
        error!("Generation failed: {}", e);
        e
    })?;

    let text = emitter(args.common.format).emit_patterns(&set)?;
    write_output(&set.output, &text)?;

    if set.output != "-" {
        print!("{}", statistics(&set, text.len()));
        if let Some(anim) = request.animation {
            println!("  Animation frame {} of {}", anim.frame + 1, anim.frames_total);
        }
    }
    Ok(())
}

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use kmlwalk::{
    ctx::Ctx,
    walk::{self, WalkOutcome},
};

/// Prints the feature hierarchy of a KML file.
#[derive(Parser, Debug)]
#[command(name = "kmlwalk", version, about, long_about = None)]
struct Cli {
    /// KML file to walk
    input: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .without_timestamps()
        .init()
        .context("failed to initialize logger")?;

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read `{}`", cli.input.display()))?;

    // a document that does not decode or parse is reported like a fragment
    let ctx = match std::str::from_utf8(&bytes) {
        Ok(txt) => Ctx::parse(txt).map_err(|err| err.to_string()),
        Err(err) => Err(format!("content is not valid UTF-8: {}", err)),
    };
    let ctx = match ctx {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            log::warn!("`{}` is not a usable KML document:", cli.input.display());
            for line in err.lines() {
                log::warn!("- {}", line)
            }
            None
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = match &ctx {
        Some(ctx) => walk::walk_document(&mut out, ctx, ctx.root())?,
        None => WalkOutcome::NoRootFeature,
    };
    match outcome {
        WalkOutcome::Visited(count) => log::debug!("visited {} features", count),
        WalkOutcome::NoRootFeature => {
            writeln!(out, "No root feature in {}", cli.input.display())?
        }
    }
    out.flush()?;
    Ok(())
}

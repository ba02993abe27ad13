//! weathergc — print an Environment Canada city forecast as indented JSON.
//!
//! ```text
//! weathergc on-82
//! weathergc ON-82 --section "Current Conditions"
//! weathergc on-1 --dir tests/data
//! ```

mod logger;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use weathergc::forecast::render;
use weathergc::{DirSource, FeedSource, Forecast, HttpSource};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Location code, as found in the city page URL (e.g. on-82).
    code: String,

    /// Host serving the Atom feeds.
    #[arg(long, env = "WEATHERGC_BASE_URL", default_value = weathergc::source::DEFAULT_BASE_URL)]
    base_url: String,

    /// Read <DIR>/<code>.xml instead of fetching over HTTP.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Print only this top-level key: meta, "Warnings and Watches",
    /// "Current Conditions" or "Weather Forecasts".
    #[arg(long)]
    section: Option<String>,

    /// Verbose logging.
    #[arg(short, long)]
    debug: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.debug)?;
    tracing::debug!("{:?}", cli);

    // -- pick the feed source ------------------------------------------------
    let source: Box<dyn FeedSource> = match &cli.dir {
        Some(dir) => Box::new(DirSource::new(dir)),
        None => Box::new(HttpSource::new(&cli.base_url)),
    };

    // -- fetch, parse and collate --------------------------------------------
    let forecast = Forecast::with_source(&cli.code, source)
        .with_context(|| format!("loading forecast for {:?}", cli.code))?;

    let text = match &cli.section {
        None => forecast.to_text()?,
        Some(section) => {
            let structure = forecast.to_structure()?;
            let value = structure
                .get(section)
                .ok_or_else(|| anyhow!("unknown section {:?}", section))?;
            render(value)
        }
    };
    println!("{text}");
    Ok(())
}

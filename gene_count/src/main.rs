mod alignment;
mod cli;
mod config;
mod counter;
mod error;
mod group_reader;
mod input;
mod isoform_map;
mod output;
mod process;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

use std::time::Instant;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let start = Instant::now();
    let cfg = cli::handle_cli().with_context(|| "Error processing command line arguments")?;
    process::count_genes(&cfg)?;
    info!("Done.  Elapsed secs: {:.2}", start.elapsed().as_secs_f64());
    Ok(())
}

//! extract-pf-all: extract the fixed statement files into pf_data_all.json.

use clap::Parser;
use colored::Colorize;

use pftables::{BatchEvent, BatchExtractor};

#[derive(Parser)]
#[command(name = "extract-pf-all")]
#[command(version)]
#[command(about = "Extract tables from the yearly statement PDFs into pf_data_all.json", long_about = None)]
struct Cli {}

fn main() {
    env_logger::init();

    let _cli = Cli::parse();

    if let Err(e) = cmd_extract_all() {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract_all() -> Result<(), Box<dyn std::error::Error>> {
    let batch = BatchExtractor::default();

    let report = batch.run_and_write(|event| {
        if let BatchEvent::Started { file } = event {
            println!("Extracting {}...", file);
        }
    })?;

    log::info!("{} of {} files failed", report.error_count(), report.len());
    println!("Extracted all data to {}", batch.output().display());
    Ok(())
}

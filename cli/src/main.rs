//! extract-pf: print a PDF's tables and page text as JSON.

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;

use pftables::{extract_tables_from_pdf, render, JsonFormat};

#[derive(Parser)]
#[command(name = "extract-pf")]
#[command(version)]
#[command(about = "Extract tables and text from a PDF as JSON", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "PDF_PATH")]
    input: Option<PathBuf>,

    /// Further arguments are ignored
    #[arg(hide = true, num_args = 0.., allow_hyphen_values = true)]
    rest: Vec<String>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let Some(input) = cli.input else {
        println!("Usage: extract-pf <pdf_path>");
        std::process::exit(1);
    };
    if !cli.rest.is_empty() {
        log::debug!("ignoring extra arguments: {:?}", cli.rest);
    }

    if let Err(e) = cmd_extract(&input) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = extract_tables_from_pdf(input);
    println!("{}", render::to_json(&result, JsonFormat::Pretty)?);
    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use inventory_convert::workbook::validate_input;
use inventory_convert::{ConvertOptions, Converter, SheetSelector};

#[derive(Parser)]
#[command(
    name = "convert-inventory",
    version,
    about = "Convert a customer inventory spreadsheet to a multi-category parts CSV"
)]
struct Cli {
    /// Inventory workbook (.xlsx or .xls)
    input: PathBuf,
    /// CSV file to write
    output: PathBuf,
    /// Worksheet to read (default: the sheet that was active when saved)
    #[arg(short, long)]
    sheet: Option<String>,
    /// Don't print per-row lines or the import report
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = validate_input(&cli.input) {
        println!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let sheet = cli.sheet.map(SheetSelector::Name).unwrap_or_default();
    let converter = Converter::new(ConvertOptions::new().sheet(sheet).quiet(cli.quiet));

    match converter.convert(&cli.input, &cli.output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(input = %cli.input.display(), "conversion failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

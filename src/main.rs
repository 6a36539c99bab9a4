extern crate chem_econ;

use anyhow::Context;
use chem_econ::output::FileOutput;
use chem_econ::reference_data::{multipliers_from_csv, ProjectDataTable};
use chem_econ::{run_project, ReferenceData};
use clap::Parser;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct ChemEconArgs {
    input_file: String,
    #[arg(long, short, help = "CSV of sectorwise impact multipliers")]
    multipliers: String,
    #[arg(long, short, help = "CSV of published project data by country and product")]
    project_data: Option<String>,
    #[arg(long, short, help = "Directory to write result tables to")]
    output_dir: Option<String>,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = ChemEconArgs::parse();

    let tracing_subscriber = {
        let builder = tracing_subscriber::fmt::fmt().with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        });
        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_path = Path::new(args.input_file.as_str());
    let input_file_stem = input_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    let output_dir = match args.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let reference_data = ReferenceData::new(
        match args.project_data {
            Some(path) => ProjectDataTable::from_csv(BufReader::new(
                File::open(&path).with_context(|| format!("Could not open project data {path}"))?,
            ))?,
            None => ProjectDataTable::default(),
        },
        multipliers_from_csv(BufReader::new(
            File::open(&args.multipliers)
                .with_context(|| format!("Could not open multipliers {}", args.multipliers))?,
        ))?,
    );

    let output = FileOutput::new(output_dir, format!("{input_file_stem}__{{}}.csv"));

    let results = run_project(
        BufReader::new(File::open(input_path)?),
        output,
        &reference_data,
    )?;
    info!(analyses = results.len(), "finished");

    Ok(())
}

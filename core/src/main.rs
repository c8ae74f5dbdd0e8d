use clap::Parser;
use log::{error, info};
use scintimark_core::cli::report::{WorklistReport, ZoneScoreReport};
use scintimark_core::cli::{Cli, Command, OutputFormat};
use scintimark_core::worklist::{self, Stage};
use scintimark_core::{logging, EngineConfig, LesionEngine, MemoryRegionStore, Result};
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: Failed to open log file: {}", e);
        process::exit(1);
    }

    let result = match &cli.command {
        Command::Score {
            snapshot,
            config,
            format,
        } => score(snapshot, config.as_deref(), *format),
        Command::Worklist {
            directory,
            stage,
            format,
        } => list_cases(directory, *stage, *format),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn score(snapshot: &Path, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = match config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    info!("Loading region snapshot: {}", snapshot.display());
    let store = MemoryRegionStore::from_json(&fs::read_to_string(snapshot)?)?;
    let mut engine = LesionEngine::builder().store(store).config(config).build()?;

    // Snapshots may hold half-deleted pairs
    engine.on_region_list_changed();
    let scores = engine.get_zone_scores();
    info!(
        "Scored {} lesions",
        engine.get_all_lesion_ids().len()
    );

    match format {
        OutputFormat::Text => println!("{}", ZoneScoreReport::new(&scores)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&scores)?),
    }
    Ok(())
}

fn list_cases(directory: &Path, stage: u8, format: OutputFormat) -> Result<()> {
    let stage = Stage::from_number(stage).unwrap_or(Stage::First);
    let cases = worklist::scan_cases(directory)?;

    match format {
        OutputFormat::Text => print!("{}", WorklistReport::new(&cases, stage)),
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct CaseJson<'a> {
                path: &'a Path,
                complete: bool,
            }

            let rows: Vec<CaseJson> = cases
                .iter()
                .map(|case| CaseJson {
                    path: &case.path,
                    complete: case.is_complete(stage),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    if let Some(next) = worklist::next_pending(&cases, stage) {
        info!("Next case for {}: {}", stage, next.name());
    }
    Ok(())
}

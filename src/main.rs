//! Command line front end of the graph extraction.

mod cli;
mod config;

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use limic_core::{
    ExtractConfig, Extraction, RawTopology, extract_graph,
    loading::{FileBackend, SnapshotBackend, TopologySource, area_from_file_name},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ExtractArgs};
use config::FileConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            FileConfig::load(path)?.extraction
        }
        None => ExtractConfig::default(),
    };

    match &cli.command {
        Command::File {
            input,
            output,
            params,
        } => {
            check_output(input, output, params.force)?;
            params.apply(&mut config);
            let raw = FileBackend::new(input)
                .fetch("")
                .with_context(|| format!("Failed to load topology {}", input.display()))?;
            run(raw, &config, output, params)
        }
        Command::Cache {
            snapshot,
            output,
            area,
            params,
        } => {
            check_output(snapshot, output, params.force)?;
            params.apply(&mut config);
            let area = match area {
                Some(area) => area.clone(),
                None => area_from_file_name(snapshot).with_context(|| {
                    format!("Cannot infer the area from {}", snapshot.display())
                })?,
            };
            info!("Extracting area {area} from {}", snapshot.display());
            let raw = SnapshotBackend::open(snapshot)
                .and_then(|mut backend| backend.fetch(&area))
                .with_context(|| format!("Failed to load area {area}"))?;
            run(raw, &config, output, params)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Refuses to replace the input, or an existing output without `force`
fn check_output(input: &Path, output: &Path, force: bool) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }
    let output_path = fs::canonicalize(output)
        .with_context(|| format!("Failed to resolve {}", output.display()))?;
    if fs::canonicalize(input).is_ok_and(|input_path| input_path == output_path) {
        bail!(
            "Refusing to overwrite the input {} with the output",
            input.display()
        );
    }
    if !force {
        bail!(
            "Output {} exists, pass --force to overwrite it",
            output.display()
        );
    }
    Ok(())
}

fn run(
    raw: RawTopology,
    config: &ExtractConfig,
    output: &Path,
    params: &ExtractArgs,
) -> Result<()> {
    let Extraction { graph, report } = extract_graph(raw, config).context("Extraction failed")?;

    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    if output.extension().is_some_and(|ext| ext == "geojson") {
        writer.write_all(graph.to_geojson_string()?.as_bytes())?;
    } else {
        serde_json::to_writer(&mut writer, &graph)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} nodes and {} edges to {}",
        graph.nodes.len(),
        graph.edges.len(),
        output.display()
    );

    if let Some(path) = &params.report {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
    }
    if !report.warnings.is_empty() {
        info!("Extraction finished with {} warnings", report.warnings.len());
    }
    Ok(())
}

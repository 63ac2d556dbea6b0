//! provgraph CLI: assemble provenance graphs from file record dumps.
//!
//! Usage:
//!   provgraph assemble --files files.json --assembly GRCh38 [--annotation V24]
//!                      [--dataset dataset.json] [--related related.json]
//!                      [--selected NODE_ID] [--config path] [--pretty]
//!   provgraph filters --files files.json [--config path]

use clap::{Parser, Subcommand};
use provgraph::{
    collect_filter_options, fetch_related, graph_candidates, AssembleError, Assembler,
    AssemblerConfig, AssemblyFilter, CachedSource, Dataset, FileRecord, JsonFileSource, NodeId,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "provgraph",
    version,
    about = "Provenance graph assembler for dataset file records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the graph for one assembly/annotation and print it as JSON
    Assemble {
        /// JSON file with the dataset's file records (array or search result)
        #[arg(long)]
        files: PathBuf,
        /// JSON file describing the dataset (accession, contributing/related files)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// JSON file used to resolve the dataset's related files by id
        #[arg(long)]
        related: Option<PathBuf>,
        /// Assembly to graph
        #[arg(long)]
        assembly: String,
        /// Genome annotation to graph
        #[arg(long)]
        annotation: Option<String>,
        /// Node id to mark active
        #[arg(long)]
        selected: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List the assembly/annotation choices available in a record set
    Filters {
        /// JSON file with the dataset's file records
        #[arg(long)]
        files: PathBuf,
    },
}

/// What `assemble` prints
#[derive(Serialize)]
struct AssembleOutput<'a> {
    graph: &'a provgraph::Graph,
    graphed_files: Vec<&'a str>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("provgraph=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_dataset(path: Option<&Path>) -> Result<Dataset, String> {
    let Some(path) = path else {
        return Ok(Dataset::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| format!("invalid dataset '{}': {}", path.display(), e))
}

fn open_source(path: &Path) -> Result<JsonFileSource, String> {
    JsonFileSource::open(path).map_err(|e| format!("cannot load '{}': {}", path.display(), e))
}

async fn cmd_assemble(
    config: &AssemblerConfig,
    files: &Path,
    dataset: Option<&Path>,
    related: Option<&Path>,
    filter: AssemblyFilter,
    selected: Option<String>,
    pretty: bool,
) -> i32 {
    let (primary, dataset) = match (open_source(files), load_dataset(dataset)) {
        (Ok(primary), Ok(dataset)) => (primary, dataset),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut records: Vec<FileRecord> = primary.records().to_vec();
    if let Some(related) = related {
        let source = match open_source(related) {
            Ok(source) => CachedSource::new(source),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        let fetched = fetch_related(
            &source,
            &dataset.related_files,
            &records,
            config.fetch_chunk_size,
        )
        .await;
        records.extend(fetched);
    }

    let selected = selected.map(NodeId::from);
    let assembler = Assembler::with_config(config);
    let assembly = match assembler.assemble(
        &dataset,
        selected.as_ref(),
        graph_candidates(&records),
        &filter,
    ) {
        Ok(assembly) => assembly,
        Err(AssembleError::NoRelationships { filter, .. }) => {
            eprintln!("No graph for {}: choose another assembly or annotation", filter);
            return 2;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let output = AssembleOutput {
        graph: &assembly.graph,
        graphed_files: assembly.graphed_files.keys().copied().collect(),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_filters(config: &AssemblerConfig, files: &Path) -> i32 {
    let source = match open_source(files) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let options = collect_filter_options(source.records(), &config.assembly_priority);
    if options.is_empty() {
        println!("No assemblies found.");
        return 0;
    }

    println!("{:>3}  {:<16}  {:<12}  {:>5}", "#", "ASSEMBLY", "ANNOTATION", "FILES");
    println!("{}", "-".repeat(42));
    for (i, option) in options.iter().enumerate() {
        let matching = source.records().iter().filter(|f| option.matches(f)).count();
        println!(
            "{:>3}  {:<16}  {:<12}  {:>5}",
            i,
            option.assembly,
            option.annotation.as_deref().unwrap_or("-"),
            matching
        );
    }
    0
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match AssemblerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Assemble {
            files,
            dataset,
            related,
            assembly,
            annotation,
            selected,
            pretty,
        } => {
            let mut filter = AssemblyFilter::new(assembly);
            if let Some(annotation) = annotation {
                filter = filter.with_annotation(annotation);
            }
            cmd_assemble(
                &config,
                &files,
                dataset.as_deref(),
                related.as_deref(),
                filter,
                selected,
                pretty,
            )
            .await
        }
        Commands::Filters { files } => cmd_filters(&config, &files),
    };
    std::process::exit(code);
}

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use jingshi_extract::config::AtlasConfig;
use jingshi_extract::dynasty::{DynastyFilterExt, PERIOD_FIELD, filter_by_dynasty, normalize};
use jingshi_extract::error::{AtlasError, Result};
use jingshi_extract::gazetteer::Gazetteer;
use jingshi_extract::geo::{CapitalReference, enrich_products, enrich_transport};
use jingshi_extract::loader::{load_all, load_sources};
use jingshi_extract::sources::DataSource;
use jingshi_extract::types::{DynastyFilter, StructuredDataset};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jingshi_extract",
    about = "Beijing historical geography data extractor"
)]
struct Cli {
    /// Directory searched for the source JSON files [env: JINGSHI_DATA_DIR]
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Directory for generated files [env: JINGSHI_OUTPUT_DIR]
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load every dataset and write output/dataset.json
    Load,
    /// Geo-enrich products and transport → output/*-processed.json
    Preprocess,
    /// List the dynasties present in the data, "总" first
    Dynasties {
        /// Requested selection; falls back to 元 or "总" if absent from the data
        #[arg(long, default_value = "总")]
        select: String,
    },
    /// Look up the first known place name in a piece of text
    Locate {
        /// Text to scan, e.g. "蓟城至扬州商路"
        text: Vec<String>,
    },
    /// Fold a period label onto its canonical dynasty
    Normalize {
        /// Period label, e.g. "明万历年间"
        label: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AtlasConfig::from_env()?.with_overrides(cli.data_dir, cli.output_dir);

    // Built once, shared by reference with every pass.
    let gazetteer = Gazetteer::beijing();
    let capital = CapitalReference::from_gazetteer(&gazetteer, "京师", CapitalReference::BEIJING.aliases)
        .unwrap_or(CapitalReference::BEIJING);

    match cli.command {
        Some(Command::Load) | None => run_load(&config, &gazetteer, &capital).await,
        Some(Command::Preprocess) => run_preprocess(&config, &gazetteer, &capital).await,
        Some(Command::Dynasties { select }) => {
            run_dynasties(&config, &gazetteer, &capital, &select).await
        }
        Some(Command::Locate { text }) => {
            run_locate(&gazetteer, &text.join(" "));
            Ok(())
        }
        Some(Command::Normalize { label }) => {
            match normalize(&label) {
                Some(d) => println!("{d}"),
                None => println!("unknown"),
            }
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT FILE HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn write_json<T: serde::Serialize>(dir: &Path, name: &str, data: &T) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| AtlasError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(data).map_err(|e| AtlasError::Json {
        path: path.clone(),
        source: e,
    })?;
    std::fs::write(&path, &json).map_err(|e| AtlasError::Io {
        path: path.clone(),
        source: e,
    })?;
    info!(path = %path.display(), bytes = json.len(), "written");
    Ok(())
}

/// Full load; an orchestration failure degrades to an empty dataset.
async fn load_or_empty(
    config: &AtlasConfig,
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
) -> StructuredDataset {
    match load_all(config, gazetteer, capital).await {
        Ok(ds) => ds,
        Err(e) => {
            error!(error = %e, "data load failed; continuing with no data");
            StructuredDataset::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  COMMANDS
// ═══════════════════════════════════════════════════════════════════════

async fn run_load(
    config: &AtlasConfig,
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
) -> Result<()> {
    let dataset = load_or_empty(config, gazetteer, capital).await;

    for (key, records) in &dataset.raw {
        eprintln!("  {key}: {} records", records.len());
    }
    eprintln!(
        "  → {} population, {} admin, {} climate, {} vegetation, {} water dynasties",
        dataset.population.len(),
        dataset.admin_divisions.len(),
        dataset.climate.len(),
        dataset.vegetation.len(),
        dataset.water_events.len()
    );
    eprintln!(
        "  → {} located products, {} routes, {} impact events",
        dataset.products.len(),
        dataset.transport.len(),
        dataset.impact_events.len()
    );

    write_json(&config.output_dir, "dataset.json", &dataset)
}

async fn run_preprocess(
    config: &AtlasConfig,
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
) -> Result<()> {
    let raw = load_sources(config, &[DataSource::Products, DataSource::Transport]).await?;
    let none = Vec::new();

    let products_raw = raw.get(&DataSource::Products).unwrap_or(&none);
    let products = enrich_products(gazetteer, products_raw);
    info!(
        total = products_raw.len(),
        located = products.len(),
        "products located"
    );
    write_json(&config.output_dir, "15物产-processed.json", &products)?;

    let transport_raw = raw.get(&DataSource::Transport).unwrap_or(&none);
    let transport = enrich_transport(gazetteer, capital, transport_raw);
    info!(
        total = transport_raw.len(),
        located = transport.len(),
        "transport routes located"
    );
    write_json(&config.output_dir, "16交通-processed.json", &transport)
}

async fn run_dynasties(
    config: &AtlasConfig,
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
    select: &str,
) -> Result<()> {
    let dataset = load_or_empty(config, gazetteer, capital).await;
    for d in &dataset.dynasties {
        println!("{}", d.label());
    }

    let requested = DynastyFilter::from_label(select)
        .or_else(|| normalize(select).map(DynastyFilter::Only))
        .unwrap_or_default();
    let selected = requested.reconcile(&dataset.dynasties);
    let empty = Vec::new();
    let population = dataset.raw.get("population").unwrap_or(&empty);
    let in_view = filter_by_dynasty(population, PERIOD_FIELD, selected);
    eprintln!(
        "  selected {} ({} of {} population records)",
        selected.label(),
        in_view.len(),
        population.len()
    );
    Ok(())
}

fn run_locate(gazetteer: &Gazetteer, text: &str) {
    match gazetteer.find(text) {
        Some(entry) => println!("{}\t{:.2},{:.2}", entry.name, entry.lon, entry.lat),
        None => eprintln!("No known place name in: {text}"),
    }
}

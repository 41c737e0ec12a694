use anyhow::{anyhow, Context};
use ccda::config::{narrative_reference_url_from_env_value, unknown_section_policy_from_env_value};
use ccda::{convert_fhir_to_ccda, ConverterConfig};
use clap::{Parser, Subcommand};
use fhir::Bundle;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NARRATIVE_REFERENCE_URL_ENV: &str = "CCDA_NARRATIVE_REFERENCE_URL";
const UNKNOWN_SECTIONS_ENV: &str = "CCDA_UNKNOWN_SECTIONS";

#[derive(Parser)]
#[command(name = "ccda")]
#[command(about = "Convert FHIR document bundles to C-CDA entry trees")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags shared by every conversion command.
#[derive(clap::Args, Clone, Debug, Default)]
struct ConvertOptions {
    /// What to do with sections whose code has no template: reject or skip
    #[arg(long)]
    unknown_sections: Option<String>,
    /// Extension URL carrying the narrative reference
    #[arg(long)]
    narrative_reference_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one bundle and print the section tree
    Convert {
        /// Path to a .json, .yaml or .yml bundle
        bundle: PathBuf,
        /// Print compact JSON instead of pretty JSON
        #[arg(long)]
        compact: bool,
        #[command(flatten)]
        options: ConvertOptions,
    },
    /// Convert several bundles, one output file per bundle
    Batch {
        /// Paths to .json, .yaml or .yml bundles
        #[arg(required = true)]
        bundles: Vec<PathBuf>,
        /// Directory receiving <stem>.ccda.json files
        #[arg(long)]
        out_dir: PathBuf,
        #[command(flatten)]
        options: ConvertOptions,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("ccda=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert {
            bundle,
            compact,
            options,
        }) => {
            let config = resolve_config(&options)?;
            let output = convert_file(&bundle, &config, compact)?;
            println!("{output}");
        }
        Some(Commands::Batch {
            bundles,
            out_dir,
            options,
        }) => {
            let config = resolve_config(&options)?;
            run_batch(&bundles, &out_dir, &config)?;
        }
        None => {
            println!("Use 'ccda --help' for commands");
        }
    }

    Ok(())
}

/// Build the converter configuration from flags, falling back to the environment.
fn resolve_config(options: &ConvertOptions) -> anyhow::Result<ConverterConfig> {
    let unknown_sections = unknown_section_policy_from_env_value(
        options
            .unknown_sections
            .clone()
            .or_else(|| std::env::var(UNKNOWN_SECTIONS_ENV).ok()),
    )?;
    let narrative_reference_url = narrative_reference_url_from_env_value(
        options
            .narrative_reference_url
            .clone()
            .or_else(|| std::env::var(NARRATIVE_REFERENCE_URL_ENV).ok()),
    );

    Ok(ConverterConfig::new(narrative_reference_url, unknown_sections)?)
}

/// Read a bundle from disk, choosing the parser from the file extension.
fn load_bundle(path: &Path) -> anyhow::Result<Bundle> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let bundle = match extension.as_deref() {
        Some("json") => Bundle::from_json(&text),
        Some("yaml") | Some("yml") => Bundle::from_yaml(&text),
        _ => return Err(anyhow!("unsupported bundle format: {}", path.display())),
    };

    bundle.with_context(|| format!("failed to parse {}", path.display()))
}

/// Convert one bundle file and render the sections as JSON.
fn convert_file(path: &Path, config: &ConverterConfig, compact: bool) -> anyhow::Result<String> {
    let bundle = load_bundle(path)?;
    let sections = convert_fhir_to_ccda(&bundle, config.clone())
        .with_context(|| format!("failed to convert {}", path.display()))?;

    tracing::info!(
        bundle = %path.display(),
        sections = sections.len(),
        "converted bundle"
    );

    let output = if compact {
        serde_json::to_string(&sections)?
    } else {
        serde_json::to_string_pretty(&sections)?
    };
    Ok(output)
}

fn output_path(bundle: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let stem = bundle
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("cannot derive output name from {}", bundle.display()))?;
    Ok(out_dir.join(format!("{stem}.ccda.json")))
}

fn convert_to_file(bundle: &Path, out_dir: &Path, config: &ConverterConfig) -> anyhow::Result<PathBuf> {
    let output = convert_file(bundle, config, false)?;
    let target = output_path(bundle, out_dir)?;
    std::fs::write(&target, output)
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(target)
}

/// Number of worker threads for a batch of `bundles` inputs.
fn batch_workers(bundles: usize) -> usize {
    let available = std::thread::available_parallelism().map_or(1, |n| n.get());
    available.min(bundles).max(1)
}

/// Convert bundles on a bounded set of worker threads and report per-file failures.
fn run_batch(bundles: &[PathBuf], out_dir: &Path, config: &ConverterConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let workers = batch_workers(bundles.len());
    let chunk_size = bundles.len().div_ceil(workers).max(1);
    tracing::debug!(bundles = bundles.len(), workers, "starting batch conversion");

    let convert_chunk = |chunk: &[PathBuf]| -> Vec<anyhow::Result<PathBuf>> {
        chunk
            .iter()
            .map(|bundle| convert_to_file(bundle, out_dir, config))
            .collect()
    };

    let results: Vec<anyhow::Result<PathBuf>> = std::thread::scope(|scope| {
        let handles: Vec<_> = bundles
            .chunks(chunk_size)
            .map(|chunk| {
                let spawned = std::thread::Builder::new()
                    .name("ccda-batch".into())
                    .spawn_scoped(scope, move || convert_chunk(chunk));
                (chunk, spawned)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(chunk, spawned)| match spawned {
                Ok(handle) => handle.join().unwrap_or_else(|_| {
                    chunk
                        .iter()
                        .map(|_| Err(anyhow!("conversion thread panicked")))
                        .collect()
                }),
                Err(e) => {
                    tracing::warn!("failed to spawn batch worker, converting inline: {e}");
                    convert_chunk(chunk)
                }
            })
            .collect()
    });

    let mut failed = 0;
    for (bundle, result) in bundles.iter().zip(results) {
        match result {
            Ok(target) => println!("{} -> {}", bundle.display(), target.display()),
            Err(e) => {
                failed += 1;
                tracing::error!(bundle = %bundle.display(), "conversion failed: {e:#}");
                eprintln!("Error converting {}: {e:#}", bundle.display());
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{failed} of {} bundles failed", bundles.len()));
    }
    Ok(())
}

mod dates;
mod error;
mod harvest;
mod header;
mod names;
mod pipeline;
mod primary;
mod relations;
mod report;
mod scanner;
mod tags;
mod translit;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use error::ExtractError;
use pipeline::{RecordSet, RunContext};
use relations::RelationVocab;

const OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(
    name = "corpus_meta",
    about = "Premodern Arabic corpus metadata extractor"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run full corpus extraction → output/*.json
    Extract {
        /// Path to corpus root directory
        #[arg(default_value = ".")]
        corpus: PathBuf,

        /// Output directory for the JSON record files
        #[arg(long, default_value = OUTPUT_DIR)]
        out: PathBuf,

        /// Flat version-tags file (one `identifier<TAB>tag;tag` line each)
        #[arg(long)]
        tags: Option<PathBuf>,

        /// Tab-separated relation-type vocabulary
        #[arg(long)]
        relation_types: Option<PathBuf>,

        /// Reproduce the historical day-overflow clamp in date resolution
        #[arg(long)]
        legacy_day_clamp: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("corpus_meta=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Extract { corpus, out, tags, relation_types, legacy_day_clamp }) => {
            run_extract(&corpus, &out, tags.as_deref(), relation_types.as_deref(), legacy_day_clamp)
        }
        // Default: extract from current directory
        None => run_extract(Path::new("."), Path::new(OUTPUT_DIR), None, None, false),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT FILE HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn write_json<T: serde::Serialize>(out_dir: &Path, name: &str, data: &T) -> Result<(), ExtractError> {
    let path = out_dir.join(name);
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(&path, &json)
        .map_err(|source| ExtractError::Output { path: path.clone(), source })?;
    eprintln!("  {} ({} bytes)", path.display(), json.len());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  EXTRACT MODE: full corpus processing → output/*.json
// ═══════════════════════════════════════════════════════════════════════

fn run_extract(
    root: &Path,
    out_dir: &Path,
    tags_file: Option<&Path>,
    relation_types: Option<&Path>,
    legacy_day_clamp: bool,
) -> Result<(), ExtractError> {
    eprintln!("Scanning corpus at: {}", root.display());

    let mut ctx = RunContext::new();
    ctx.dates.legacy_day_clamp = legacy_day_clamp;
    if let Some(path) = tags_file {
        ctx.version_tags = tags::parse_tags_file(path)?;
        eprintln!("Loaded tag lists for {} versions", ctx.version_tags.len());
    }
    if let Some(path) = relation_types {
        ctx.vocab = RelationVocab::from_tsv_file(path)?;
        eprintln!("Loaded {} relation types", ctx.vocab.types.len());
    }

    let records = pipeline::run(root, &mut ctx)?;

    print_stats(&records, &ctx);

    // ── Write split JSON files ──────────────────────────────────────
    eprintln!("\n══════════════════════════════════════════");
    eprintln!("  WRITING OUTPUT FILES");
    eprintln!("══════════════════════════════════════════\n");

    std::fs::create_dir_all(out_dir)
        .map_err(|source| ExtractError::Output { path: out_dir.to_path_buf(), source })?;

    write_json(out_dir, "authors.json", &records.authors)?;
    write_json(out_dir, "name_elements.json", &records.name_elements)?;
    write_json(out_dir, "texts.json", &records.texts)?;
    write_json(out_dir, "versions.json", &records.versions)?;
    write_json(out_dir, "places.json", &records.places)?;
    write_json(out_dir, "relations.json", &records.relations)?;
    write_json(out_dir, "diagnostics.json", &ctx.diagnostics)?;

    eprintln!("\nDone.");
    Ok(())
}

fn print_stats(records: &RecordSet, ctx: &RunContext) {
    eprintln!("\n══════════════════════════════════════════");
    eprintln!("  CORPUS STATISTICS");
    eprintln!("══════════════════════════════════════════");

    eprintln!("\nRecords:");
    eprintln!("  Authors:   {}", records.authors.len());
    eprintln!("  Texts:     {}", records.texts.len());
    eprintln!("  Versions:  {}", records.versions.len());
    eprintln!("  Places:    {}", records.places.len());
    eprintln!("  Relations: {}", records.relations.len());

    let mut by_status = std::collections::BTreeMap::new();
    for v in &records.versions {
        *by_status.entry(format!("{:?}", v.annotation_status)).or_insert(0usize) += 1;
    }
    eprintln!("\nVersions by annotation status:");
    for (status, count) in &by_status {
        eprintln!("  {status}: {count}");
    }

    let primaries = records
        .versions
        .iter()
        .filter(|v| v.analysis_priority == corpus_types::AnalysisPriority::Primary)
        .count();
    eprintln!("  Primary: {primaries} of {}", records.versions.len());

    if !ctx.diagnostics.is_empty() {
        eprintln!("\n══════════════════════════════════════════");
        eprintln!("  WARNINGS ({} total)", ctx.diagnostics.len());
        eprintln!("══════════════════════════════════════════");
        for (kind, count) in ctx.diagnostics.summary() {
            eprintln!("  {kind}: {count}");
        }
        eprintln!();
        for w in ctx.diagnostics.warnings.iter().take(30) {
            eprintln!("  {w:?}");
        }
        if ctx.diagnostics.len() > 30 {
            eprintln!("  ... and {} more (see diagnostics.json)", ctx.diagnostics.len() - 30);
        }
    }
}

//! # CLI Module
//!
//! Command-line interface for verdict.
//!
//! ## Usage
//! ```bash
//! # Score two images
//! verdict compare a.png b.png
//!
//! # Machine-readable
//! verdict compare a.png b.png --output json
//!
//! # Find near-duplicates in a set of uploads
//! verdict dedupe uploads/*.jpg --min-similarity 0.9
//!
//! # Inspect or maintain the verdict cache
//! verdict cache stats
//! verdict cache invalidate suspicious.jpg
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use verdict_core::core::batch::ImageInput;
use verdict_core::core::cache::{CacheStats, ContentCache, ContentKey, SqliteStore};
use verdict_core::core::decoder::ImageSource;
use verdict_core::core::similarity::{SimilarityClass, SimilarityEngine, SimilarityResult};
use verdict_core::error::{Result, VerdictError};

/// Verdict - compare images and manage analysis verdicts
#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two images
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Find near-duplicate pairs among images
    Dedupe {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Minimum similarity for a pair to be reported (0-1)
        #[arg(short, long, default_value = "0.95")]
        min_similarity: f64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Inspect or maintain the verdict cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,

        /// Cache database path
        #[arg(long, global = true)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry counts and ages
    Stats,
    /// Remove expired entries
    Sweep,
    /// Remove every entry
    Clear,
    /// Forget the verdict for one file's content
    Invalidate { file: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            first,
            second,
            output,
        } => run_compare(&first, &second, output),
        Commands::Dedupe {
            files,
            min_similarity,
            output,
        } => run_dedupe(&files, min_similarity, output),
        Commands::Cache { action, db } => run_cache(action, db),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| VerdictError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn run_compare(first: &Path, second: &Path, output: OutputFormat) -> Result<()> {
    let a = read_file(first)?;
    let b = read_file(second)?;

    let result = SimilarityEngine::new().compare(&a, &b)?;

    match output {
        OutputFormat::Pretty => print_comparison(&Term::stdout(), first, second, &result),
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}

fn print_comparison(term: &Term, first: &Path, second: &Path, result: &SimilarityResult) {
    term.write_line(&format!(
        "{} {} {}",
        style(first.display()).bold(),
        style("vs").dim(),
        style(second.display()).bold()
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  Similarity:  {} ({})",
        style(format!("{:.1}%", result.similarity_percent())).cyan().bold(),
        styled_class(result.classification)
    ))
    .ok();
    term.write_line(&format!(
        "  Structural:  {:.3}",
        result.differences.structural
    ))
    .ok();
    term.write_line(&format!("  Color:       {:.3}", result.differences.color))
        .ok();
    term.write_line(&format!("  Texture:     {:.3}", result.differences.texture))
        .ok();
}

fn styled_class(class: SimilarityClass) -> String {
    match class {
        SimilarityClass::Identical => style(class).green().to_string(),
        SimilarityClass::Similar => style(class).cyan().to_string(),
        SimilarityClass::Different => style(class).yellow().to_string(),
        SimilarityClass::VeryDifferent => style(class).red().to_string(),
    }
}

fn run_dedupe(files: &[PathBuf], min_similarity: f64, output: OutputFormat) -> Result<()> {
    if !(0.0..=1.0).contains(&min_similarity) {
        return Err(VerdictError::Config(format!(
            "--min-similarity must be between 0 and 1, got {}",
            min_similarity
        )));
    }

    let progress = matches!(output, OutputFormat::Pretty).then(|| {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        pb.set_message("reading");
        pb
    });

    let mut contents = Vec::with_capacity(files.len());
    for path in files {
        contents.push(read_file(path)?);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress {
        pb.set_message("comparing");
        pb.enable_steady_tick(Duration::from_millis(100));
    }

    let sources: Vec<ImageSource<'_>> = contents.iter().map(ImageSource::from).collect();
    let pairs = SimilarityEngine::new().find_near_duplicates(&sources, min_similarity)?;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    match output {
        OutputFormat::Pretty => {
            let term = Term::stdout();
            if pairs.is_empty() {
                term.write_line(&format!(
                    "{} No pairs at or above {:.0}% similarity",
                    style("✓").green().bold(),
                    min_similarity * 100.0
                ))
                .ok();
            }
            for pair in &pairs {
                term.write_line(&format!(
                    "  {} {} {}  {} ({})",
                    files[pair.first].display(),
                    style("~").dim(),
                    files[pair.second].display(),
                    style(format!("{:.1}%", pair.result.similarity_percent())).cyan(),
                    styled_class(pair.result.classification)
                ))
                .ok();
            }
        }
        OutputFormat::Json => {
            let report: Vec<_> = pairs
                .iter()
                .map(|pair| {
                    serde_json::json!({
                        "first": files[pair.first],
                        "second": files[pair.second],
                        "similarity": pair.result.similarity,
                        "classification": pair.result.classification,
                    })
                })
                .collect();
            print_json(&report)?;
        }
    }

    Ok(())
}

fn default_db_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("verdict-core")
        .join("cache.db")
}

fn run_cache(action: CacheAction, db: Option<PathBuf>) -> Result<()> {
    let db_path = db.unwrap_or_else(default_db_path);
    let cache = ContentCache::new(Arc::new(SqliteStore::open(&db_path)?));
    let term = Term::stdout();

    match action {
        CacheAction::Stats => print_stats(&term, &db_path, &cache.stats()?),
        CacheAction::Sweep => {
            let removed = cache.sweep_expired()?;
            term.write_line(&format!("Removed {} expired entries", style(removed).cyan()))
                .ok();
        }
        CacheAction::Clear => {
            let removed = cache.clear()?;
            term.write_line(&format!("Removed {} entries", style(removed).cyan()))
                .ok();
        }
        CacheAction::Invalidate { file } => {
            let input = ImageInput::from_path(&file)?;
            let key = ContentKey::from_bytes(&input.bytes);
            cache.invalidate(&key)?;
            term.write_line(&format!(
                "Forgot verdict for {} ({})",
                style(file.display()).bold(),
                style(key).dim()
            ))
            .ok();
        }
    }

    Ok(())
}

fn print_stats(term: &Term, db_path: &Path, stats: &CacheStats) {
    term.write_line(&format!(
        "{} {}",
        style("Verdict cache").bold().cyan(),
        style(db_path.display()).dim()
    ))
    .ok();
    term.write_line(&format!("  {} entries", style(stats.total_entries).cyan()))
        .ok();
    term.write_line(&format!(
        "  {} total accesses",
        style(stats.total_access_count).cyan()
    ))
    .ok();
    if let (Some(oldest), Some(newest)) = (stats.oldest_entry, stats.newest_entry) {
        term.write_line(&format!(
            "  oldest {}, newest {}",
            oldest.format("%Y-%m-%d %H:%M"),
            newest.format("%Y-%m-%d %H:%M")
        ))
        .ok();
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| VerdictError::Config(format!("failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

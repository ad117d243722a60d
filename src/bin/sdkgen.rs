//! sdkgen CLI
//!
//! Generates SDK declarations, compares API versions and searches a spec.
//! Reads local files only.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sdk_codegen::codegen::{generate_methods, generate_models, GeneratorRegistry};
use sdk_codegen::config::{ExportFormat, FilterMode, SdkGenConfig};
use sdk_codegen::diff::{self, DiffRow};
use sdk_codegen::search::{criteria_from_names, search};
use sdk_codegen::{ApiModel, Method, SpecItem};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdkgen")]
#[command(about = "Generate SDK code from OpenAPI specifications")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render models or methods for one language
    Generate {
        /// Specification file (JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Language name or file extension
        #[arg(short, long)]
        language: String,

        /// Emit method signatures instead of models
        #[arg(long)]
        methods: bool,

        /// Leave out doc comments
        #[arg(long)]
        no_comments: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the methods of two specifications
    Diff {
        /// Left-hand specification
        #[arg(short, long)]
        left: PathBuf,

        /// Right-hand specification
        #[arg(short, long)]
        right: PathBuf,

        /// Export format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Include one-sided methods even when the config filters them
        #[arg(long)]
        all: bool,

        /// Keep only rows whose left-side status matches
        #[arg(long)]
        status: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search methods and types
    Search {
        /// Specification file (JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Regular expression, case insensitive
        pattern: String,

        /// Criteria to search (defaults to the configured ones)
        #[arg(long, value_delimiter = ',')]
        criteria: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write it to this file instead of printing it
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    #[value(alias = "markdown")]
    Md,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = SdkGenConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Generate {
            spec,
            language,
            methods,
            no_comments,
            output,
        } => {
            let api = load_model(&spec)?;
            let registry = GeneratorRegistry::from_config(&config);
            let Some(generator) = registry.find(&language) else {
                bail!(
                    "no enabled generator for '{}' (available: {})",
                    language,
                    registry.languages().join(", ")
                );
            };
            let file = if methods {
                generate_methods(generator, &api, !no_comments)?
            } else {
                generate_models(generator, &api, !no_comments)?
            };
            for skipped in &file.skipped {
                eprintln!("⚠️  skipped {}: {}", skipped.name, skipped.error);
            }
            info!(language = %file.language, declared = file.declared, "generated");
            write_output(output.as_deref(), &file.code)?;
        }

        Commands::Diff {
            left,
            right,
            format,
            all,
            status,
            output,
        } => {
            let lhs = load_model(&left)?;
            let rhs = load_model(&right)?;
            let status = status.or_else(|| config.diff.status.clone());
            let rows: Vec<DiffRow> = match (status.as_deref(), all, config.diff.filter) {
                (Some(status), _, _) => diff::compare_specs(&lhs, &rhs, diff::status_filter(status)),
                (None, true, _) | (None, false, FilterMode::All) => {
                    diff::compare_specs(&lhs, &rhs, diff::include_all)
                }
                (None, false, FilterMode::Diffs) => diff::compare_specs(&lhs, &rhs, diff::include_diffs),
            };
            let format = match format {
                Some(Format::Csv) => ExportFormat::Csv,
                Some(Format::Md) => ExportFormat::Markdown,
                None => config.diff.format,
            };
            let text = match format {
                ExportFormat::Csv => diff::to_csv(&rows)?,
                ExportFormat::Markdown => diff::to_markdown(&rows),
            };
            write_output(output.as_deref(), &text)?;
        }

        Commands::Search {
            spec,
            pattern,
            criteria,
            json,
        } => {
            let api = load_model(&spec)?;
            let names = if criteria.is_empty() {
                config.search.criteria.clone()
            } else {
                criteria
            };
            let criteria = criteria_from_names(&names);
            let result = search(&api, &pattern, &criteria);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_search(&api, &result);
            }
            if !result.ok {
                bail!("{}", result.message);
            }
        }

        Commands::Config { write } => match write {
            Some(path) => {
                config.save(&path)?;
                println!("✅ Wrote {}", path.display());
            }
            None => print!("{}", toml::to_string_pretty(&config)?),
        },
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<ApiModel> {
    let key = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let item = SpecItem::from_file(key, path).with_context(|| format!("reading {}", path.display()))?;
    let api = ApiModel::from_item(&item).with_context(|| format!("resolving {}", path.display()))?;
    for fix in api.fixes() {
        info!(fix = %fix, "upgrade");
    }
    Ok(api)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            println!("✅ Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn print_search(api: &ApiModel, result: &sdk_codegen::SearchResult) {
    println!("🔍 {}", result.message);
    for (tag, methods) in &result.tags {
        println!("\n{}", tag);
        for name in methods {
            let summary = api.method(name).map(|m: &Method| m.summary.as_str()).unwrap_or_default();
            println!("  {:<40} {}", name, summary);
        }
    }
    if !result.types.is_empty() {
        println!("\nTypes");
        for name in &result.types {
            println!("  {}", name);
        }
    }
    if !result.suggestions.is_empty() {
        println!("\nDid you mean: {}", result.suggestions.join(", "));
    }
}

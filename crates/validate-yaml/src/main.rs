//! validate-yaml - parse service descriptions and check them against a schema

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use shma_yaml::{ParseOptions, Value, parse_all_file, parse_file, parse_one_with};
use shma_yaml_validation::{Resolver, Validator, ValidatorOptions, check_schema, navigate};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "validate-yaml")]
#[command(version)]
#[command(about = "Parse service descriptions and validate them against a schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a schema, then validate documents against it
    Check {
        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Directory whose *.yml and *.yaml files are validated
        #[arg(short, long)]
        examples: Option<PathBuf>,

        /// Nesting limit for both document parsing and schema application
        #[arg(long)]
        max_depth: Option<usize>,

        /// Documents to validate
        files: Vec<PathBuf>,
    },

    /// Print a document as JSON
    Parse {
        /// Print every document in the file as a JSON array
        #[arg(long)]
        all: bool,

        /// Input file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "validate_yaml=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            schema,
            examples,
            max_depth,
            files,
        } => check(&schema, examples.as_deref(), &files, max_depth),
        Commands::Parse { all, file } => parse(&file, all),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the schema or any document is invalid.
fn check(
    schema_path: &Path,
    examples: Option<&Path>,
    files: &[PathBuf],
    max_depth: Option<usize>,
) -> Result<bool> {
    let mut parse_options = ParseOptions::default();
    let mut validator_options = ValidatorOptions::default();
    if let Some(depth) = max_depth {
        parse_options.max_depth = depth;
        validator_options.max_depth = depth;
    }

    let schema = read_document(schema_path, &parse_options)?;
    if let Err(err) = check_schema(&schema) {
        eprintln!("Schema validation failed: {}", err);
        return Ok(false);
    }
    println!("Schema validation succeeded.");

    let resolver = Resolver::new(schema_path, schema.clone());
    let validator = Validator::with_resolver(schema, resolver).with_options(validator_options);

    let mut targets = files.to_vec();
    if let Some(dir) = examples {
        targets.extend(example_files(dir)?);
    }
    info!(count = targets.len(), "validating documents");

    let mut failures = 0;
    for path in &targets {
        if let Err(err) = validate_file(&validator, path, &parse_options) {
            eprintln!("{}: {:#}", path.display(), err);
            failures += 1;
        }
    }

    if failures > 0 {
        return Ok(false);
    }
    if let Some(dir) = examples {
        println!("Validated examples in {}.", dir.display());
    }
    Ok(true)
}

fn read_document(path: &Path, options: &ParseOptions) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_one_with(&text, options).map_err(|err| err.in_file(path).into())
}

fn validate_file(validator: &Validator, path: &Path, options: &ParseOptions) -> Result<()> {
    let text = std::fs::read_to_string(path).context("failed to read file")?;
    let document = parse_one_with(&text, options)?;
    if let Err(err) = validator.validate(&document) {
        if let Some(node) = navigate(&err.instance_path, &document) {
            debug!(file = %path.display(), value = %node, "offending value");
        }
        return Err(err.into());
    }
    debug!(file = %path.display(), "document is valid");
    Ok(())
}

/// `*.yml` and `*.yaml` files directly inside `dir`, sorted by name.
fn example_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Examples directory not found: {}", dir.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let is_yaml = matches!(
            entry.path().extension().and_then(|ext| ext.to_str()),
            Some("yml" | "yaml")
        );
        if entry.file_type().is_file() && is_yaml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn parse(file: &Path, all: bool) -> Result<bool> {
    let output = if all {
        serde_json::to_string_pretty(&parse_all_file(file)?)?
    } else {
        serde_json::to_string_pretty(&parse_file(file)?)?
    };
    println!("{}", output);
    Ok(true)
}

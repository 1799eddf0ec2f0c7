//! Scaffold CLI.
//!
//! Reads `{name}_*.csv` table definitions and writes the canonical schema
//! document plus one descriptor per generated artifact.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use miette::Diagnostic;
use tracing::debug;

use scaffold_compiler::{
    EmitStatus, GenerationManifest, OverwritePolicy, Pipeline, PipelineConfig, ScaffoldError, SchemaDiff,
};

mod ui;

#[derive(Parser)]
#[command(name = "scaffold")]
#[command(about = "Schema scaffolding - tabular table definitions to CRUD artifact descriptors")]
#[command(version)]
struct Cli {
    /// Raise log output to debug (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the schema document and artifact descriptors for a table
    Generate {
        /// Table definition name (the input folder name)
        name: String,

        /// Treat the definition as a change to an existing table
        #[arg(long)]
        alter: bool,

        /// Print the manifest as JSON instead of a summary
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        settings: Settings,
    },

    /// Validate a table definition without writing anything
    Check {
        /// Table definition name (the input folder name)
        name: String,

        #[command(flatten)]
        settings: Settings,
    },

    /// Show changes against the stored schema document
    Diff {
        /// Table definition name (the input folder name)
        name: String,

        /// Treat the definition as a change to an existing table
        #[arg(long)]
        alter: bool,

        #[command(flatten)]
        settings: Settings,
    },
}

/// Overrides for `scaffold.json`.
#[derive(Args)]
struct Settings {
    /// Project root
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Configuration file (default: <project>/scaffold.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding one input folder per table
    #[arg(long)]
    input_root: Option<PathBuf>,

    /// Directory for schema documents
    #[arg(long)]
    schema_root: Option<PathBuf>,

    /// Directory for artifact descriptors
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// API version namespace (v1, v2, ...)
    #[arg(long)]
    api_version: Option<String>,

    /// Input format (csv, tsv)
    #[arg(short, long)]
    format: Option<String>,

    /// What to do with existing descriptors (overwrite, skip, fail)
    #[arg(long, value_parser = parse_overwrite)]
    overwrite: Option<OverwritePolicy>,

    /// Write only the schema document
    #[arg(long)]
    no_descriptors: bool,
}

impl Settings {
    fn resolve(self) -> Result<PipelineConfig, ScaffoldError> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = PipelineConfig::load(path)?;
                config.project_root = self.project.clone();
                config
            }
            None => PipelineConfig::discover(&self.project)?,
        };

        if let Some(root) = self.input_root {
            config.input_root = root;
        }
        if let Some(root) = self.schema_root {
            config.schema_root = root;
        }
        if let Some(root) = self.out {
            config.descriptor_root = root;
        }
        if let Some(version) = self.api_version {
            config.api_version = Some(version);
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(policy) = self.overwrite {
            config.overwrite = policy;
        }
        if self.no_descriptors {
            config.emit_descriptors = false;
        }

        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

fn parse_overwrite(value: &str) -> Result<OverwritePolicy, String> {
    OverwritePolicy::parse(value).ok_or_else(|| format!("expected overwrite, skip or fail, got '{}'", value))
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            name,
            alter,
            json,
            settings,
        } => {
            let pipeline = Pipeline::new(settings.resolve()?);
            let start = Instant::now();
            let manifest = pipeline.run(&name, alter)?;

            if json {
                let out = serde_json::to_string_pretty(&manifest).map_err(|e| ScaffoldError::SerializeFailed {
                    what: "manifest".to_string(),
                    message: e.to_string(),
                })?;
                println!("{}", out);
            } else {
                print_manifest(&manifest);
                println!();
                ui::timing("Generated", start.elapsed().as_millis());
            }
        }

        Commands::Check { name, settings } => {
            let pipeline = Pipeline::new(settings.resolve()?);
            let spinner = ui::spinner("Checking table definition...");

            match pipeline.check(&name) {
                Ok(document) => {
                    spinner.finish_and_clear();
                    ui::verdict(true);
                    println!();
                    println!(
                        "    {} columns {} {} indexes {} {} relations {} {} key",
                        document.columns.len(),
                        ui::symbols::DOT,
                        document.indexes.len(),
                        ui::symbols::DOT,
                        document.relations.len(),
                        ui::symbols::DOT,
                        if document.primary_key.is_composite() { "composite" } else { "surrogate" }
                    );
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    ui::verdict(false);
                    return Err(e.into());
                }
            }
        }

        Commands::Diff {
            name,
            alter,
            settings,
        } => {
            let pipeline = Pipeline::new(settings.resolve()?);
            match pipeline.diff(&name, alter)? {
                None => {
                    println!();
                    ui::info(&format!("No stored schema document for '{}'", name));
                    ui::muted("Run `scaffold generate` to create one");
                }
                Some(diff) if diff.is_empty() => {
                    ui::verdict(true);
                    println!();
                    println!("    No schema changes detected");
                }
                Some(diff) => print_diff(&diff),
            }
        }
    }

    Ok(())
}

fn print_manifest(manifest: &GenerationManifest) {
    ui::header(env!("CARGO_PKG_VERSION"));
    println!();

    let summary = [
        ("table", manifest.table.clone()),
        ("mode", manifest.mode.as_str().to_string()),
        ("version", manifest.version.clone().unwrap_or_else(|| "(default)".to_string())),
        ("schema", manifest.schema_path.display().to_string()),
    ];
    let lines: Vec<String> = summary
        .iter()
        .map(|(label, value)| format!("{}{}", ui::column(label, 9), value))
        .collect();
    ui::panel(&format!("{} {}", ui::symbols::DIAMOND, manifest.name), &lines);

    ui::section("Inputs");
    let inputs: Vec<(String, String)> = manifest
        .inputs
        .iter()
        .map(|input| (input.path.display().to_string(), input.label.clone()))
        .collect();
    ui::tree(&inputs);

    ui::section("Artifacts");
    let artifacts: Vec<(String, String)> = manifest
        .artifacts
        .iter()
        .map(|entry| {
            let status = match entry.status {
                Some(EmitStatus::Written) => "written",
                Some(EmitStatus::Skipped) => "skipped",
                None => "planned",
            };
            (
                ui::column(entry.kind.as_str(), 16),
                format!("{} {} {}", entry.identifier, ui::symbols::DOT, status),
            )
        })
        .collect();
    ui::tree(&artifacts);

    if !manifest.warnings.is_empty() {
        ui::section("Needs review");
        for warning in &manifest.warnings {
            let help = warning.help().map(|h| h.to_string());
            ui::warning(&warning.to_string(), help.as_deref());
        }
    }

    if let Some(diff) = &manifest.diff {
        if !diff.is_empty() {
            print_diff(diff);
        }
    }

    ui::section("Next steps");
    for step in &manifest.next_steps {
        ui::info(step);
    }
}

fn print_diff(diff: &SchemaDiff) {
    println!();
    let marker = if diff.is_breaking() { "BREAKING" } else { "OK" };
    let mut lines = vec![String::new()];
    lines.extend(diff.format_changes().lines().map(str::to_string));
    lines.push(String::new());
    ui::panel(&format!("{} Schema Changes [{}]", ui::symbols::TRIANGLE, marker), &lines);
}

//! mapforge CLI - schema-driven generation of models, DTOs and form rulesets
//!
//! `mapper` commands work on the schema document, `form` commands on the
//! forms document. Both can keep running and regenerate on every change.

use clap::{Args, Parser, Subcommand};
use mapforge::{
    ensure_forms_document_exists, ensure_schema_document_exists, DocumentKind,
    GenerationOptions, GenerationReport, MapforgeConfig, WatcherRegistry,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mapforge")]
#[command(version, about = "Generate models, DTOs and form validation rulesets from YAML schemas", long_about = None)]
struct Cli {
    /// Path to mapforge.yaml (defaults to ./mapforge.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate models and DTOs from the schema file
    Mapper {
        #[command(subcommand)]
        action: MapperAction,
    },

    /// Generate form validation rulesets from the form file
    Form {
        #[command(subcommand)]
        action: FormAction,
    },
}

#[derive(Subcommand)]
enum MapperAction {
    /// Initialize the schema.tw file
    Init(InitArgs),
    /// Generate models and DTOs from the schema file
    Generate(GenerateArgs),
}

#[derive(Subcommand)]
enum FormAction {
    /// Initialize the form.tw file
    Init(InitArgs),
    /// Generate validation rulesets from the form file
    Generate(FormGenerateArgs),
}

#[derive(Args)]
struct InitArgs {
    /// Path of the document; its directory becomes the mappers directory
    #[arg(short, long)]
    schema: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Run the formatter fix over the generated files
    #[arg(short, long)]
    fix: bool,

    /// Path to the document (default: <mappers_dir>/<file> from config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Comma-separated list of model names to generate
    #[arg(short, long, value_delimiter = ',')]
    models: Vec<String>,

    /// Keep running and regenerate on every change
    #[arg(short, long)]
    watch: bool,
}

#[derive(Args)]
struct FormGenerateArgs {
    #[command(flatten)]
    common: GenerateArgs,

    /// Import path of the i18n module used by generated rulesets
    #[arg(short, long = "i18n-path")]
    i18n_path: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = MapforgeConfig::discover(cli.config.as_deref())
        .map_err(|e| e.to_string())
        .and_then(|config| match cli.command {
            Commands::Mapper { action: MapperAction::Init(args) } => {
                init_document(&config, args, DocumentKind::Schema)
            }
            Commands::Mapper { action: MapperAction::Generate(args) } => {
                generate(config, args, DocumentKind::Schema)
            }
            Commands::Form { action: FormAction::Init(args) } => {
                init_document(&config, args, DocumentKind::Forms)
            }
            Commands::Form { action: FormAction::Generate(args) } => {
                let mut config = config;
                if let Some(i18n_path) = args.i18n_path {
                    config.i18n_import_path = i18n_path;
                }
                generate(config, args.common, DocumentKind::Forms)
            }
        });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Mappers directory and document path, honoring an explicit document path
fn resolve_paths(config: &MapforgeConfig, document: Option<PathBuf>, kind: DocumentKind) -> (PathBuf, PathBuf) {
    match document {
        Some(path) => {
            let mappers_dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (mappers_dir, path)
        }
        None => {
            let path = match kind {
                DocumentKind::Schema => config.schema_path(),
                DocumentKind::Forms => config.forms_path(),
            };
            (config.mappers_dir.clone(), path)
        }
    }
}

fn init_document(config: &MapforgeConfig, args: InitArgs, kind: DocumentKind) -> Result<(), String> {
    let (mappers_dir, _) = resolve_paths(config, args.schema, kind);

    tracing::info!("Initializing {} file...", kind);
    let path = match kind {
        DocumentKind::Schema => ensure_schema_document_exists(&mappers_dir),
        DocumentKind::Forms => ensure_forms_document_exists(&mappers_dir),
    }
    .map_err(|e| e.to_string())?;

    tracing::info!("{} file ready at {}", kind, path.display());
    Ok(())
}

fn generate(config: MapforgeConfig, args: GenerateArgs, kind: DocumentKind) -> Result<(), String> {
    let (mappers_dir, document) = resolve_paths(&config, args.schema, kind);
    let options = GenerationOptions {
        fix_formatting: args.fix || config.fix_formatting,
        model_names: if args.models.is_empty() { None } else { Some(args.models) },
    };
    let generator = config.generator();

    let report = match kind {
        DocumentKind::Schema => {
            tracing::info!("Generating models and DTOs...");
            generator.generate_entities_and_transfer_objects(&mappers_dir, &document, &options)
        }
        DocumentKind::Forms => {
            tracing::info!("Generating form rules...");
            generator.generate_validation_rulesets(&mappers_dir, &document, &options)
        }
    }
    .map_err(|e| e.to_string())?;

    summarize(&report)?;

    if args.watch || config.watch {
        watch_forever(&config, &mappers_dir, &document, kind, options)?;
    }

    Ok(())
}

fn summarize(report: &GenerationReport) -> Result<(), String> {
    tracing::info!(
        "Generation complete: {} written, {} unchanged, {} removed",
        report.written.len(),
        report.unchanged.len(),
        report.removed.len()
    );

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("{} artifact(s) failed to generate", report.failures.len()))
    }
}

fn watch_forever(
    config: &MapforgeConfig,
    mappers_dir: &Path,
    document: &Path,
    kind: DocumentKind,
    options: GenerationOptions,
) -> Result<(), String> {
    let mut registry = WatcherRegistry::new(config.generator()).with_debounce(config.debounce());
    match kind {
        DocumentKind::Schema => registry.watch_schema(mappers_dir, document, options, None),
        DocumentKind::Forms => registry.watch_forms(mappers_dir, document, options, None),
    };
    registry.start().map_err(|e| e.to_string())?;

    tracing::info!("Watching for changes...");
    loop {
        std::thread::park();
    }
}

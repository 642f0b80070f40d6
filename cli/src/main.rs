use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use oas_semantic_core::{
    calculate_semantic_score, lint_document, normalize_refs, validate_openapi_shape,
    HttpSparqlClient, LocalResolver,
};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "oas-semantic")]
#[command(about = "Score and normalize the JSON-LD semantic annotations of OpenAPI documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the semantic annotation quality of an OpenAPI document
    Score {
        /// Input OpenAPI document (JSON or YAML)
        input: PathBuf,

        /// SPARQL endpoint used to verify ontology URIs
        #[arg(short, long)]
        endpoint: String,

        /// Base URL recorded on inlined local refs
        #[arg(long, default_value = "")]
        origin: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Rewrite remote schema references into local content-hashed components
    Normalize {
        /// Input resolved OpenAPI document (JSON or YAML)
        input: PathBuf,

        /// Local origin; refs under it become bare JSON-Pointer $refs
        #[arg(long)]
        origin: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Report every property whose JSON-LD mapping cannot be resolved
    Lint {
        /// Input OpenAPI document (JSON or YAML)
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for the emitted document
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Score {
            input,
            endpoint,
            origin,
            output,
            format,
        } => {
            let doc = read_document(&input)?;
            validate_openapi_shape(&doc).with_context(|| {
                format!("{} is not a scoreable OpenAPI document", input.display())
            })?;

            let resolver = LocalResolver::new(origin);
            let sparql = HttpSparqlClient::new(endpoint);
            let outcome = calculate_semantic_score(&doc, &resolver, &sparql)
                .await
                .context("Scoring failed")?;

            eprintln!("Semantic score: {}", outcome.score);
            write_document(&outcome.document, output.as_deref(), format)?;
        }

        Commands::Normalize {
            input,
            origin,
            output,
            format,
        } => {
            let doc = read_document(&input)?;
            let normalized = normalize_refs(&doc, &origin).context("Normalization failed")?;
            write_document(&normalized, output.as_deref(), format)?;
        }

        Commands::Lint { input } => {
            let doc = read_document(&input)?;
            let errors = lint_document(&doc);
            for error in &errors {
                println!("{}: {}", error.path, error.message);
            }
            if !errors.is_empty() {
                bail!("{} semantic error(s) found", errors.len());
            }
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    // JSON is also valid YAML, but JSON parse errors are the clearer ones,
    // so try JSON first.
    match serde_json::from_str(&raw) {
        Ok(doc) => Ok(doc),
        Err(json_err) => serde_yaml::from_str(&raw).map_err(|yaml_err| {
            anyhow::anyhow!(
                "Failed to parse {} as JSON ({json_err}) or YAML ({yaml_err})",
                path.display()
            )
        }),
    }
}

fn write_document(
    doc: &serde_json::Value,
    path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(doc).context("Failed to serialize YAML")?,
        OutputFormat::Json => {
            let mut pretty =
                serde_json::to_string_pretty(doc).context("Failed to serialize JSON")?;
            pretty.push('\n');
            pretty
        }
    };

    match path {
        Some(p) => fs::write(p, rendered)
            .with_context(|| format!("Failed to create output file: {}", p.display())),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

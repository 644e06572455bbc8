use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use optschema_core::{Schema, SchemaConfig};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "optschema")]
#[command(about = "Parse argument vectors against declarative option schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse arguments (given after `--`) and print the result as JSON.
    Parse(ParseArgs),
    /// Print one documentation line per option.
    Docs(SchemaArgs),
    /// Print a machine-readable description of every option.
    Describe(SchemaArgs),
    /// Build the schema and report its size.
    Check(SchemaArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Schema file (YAML for .yml/.yaml, JSON otherwise).
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Arguments to parse.
    #[arg(last = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Docs(args) => run_docs(args),
        Command::Describe(args) => run_describe(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml" | "yaml")
    )
}

fn load_config(path: &Path) -> Result<SchemaConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {e}", path.display()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&text)
            .map_err(|e| format!("Failed to parse YAML schema '{}': {e}", path.display()))
    } else {
        serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse JSON schema '{}': {e}", path.display()))
    }
}

fn load_schema(args: &SchemaArgs) -> Result<Schema, String> {
    let config = load_config(&args.schema)?;
    debug!(path = %args.schema.display(), options = config.options.len(), "loaded schema file");
    config
        .into_schema()
        .map_err(|e| format!("Invalid schema '{}': {e}", args.schema.display()))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let schema = load_schema(&args.schema)?;
    let parsed = schema.parse_or_exit(&args.argv);
    print_json(&parsed)
}

fn run_docs(args: SchemaArgs) -> Result<(), String> {
    let schema = load_schema(&args)?;
    println!("{}", schema.docs());
    Ok(())
}

fn run_describe(args: SchemaArgs) -> Result<(), String> {
    let schema = load_schema(&args)?;
    print_json(&schema.describe())
}

fn run_check(args: SchemaArgs) -> Result<(), String> {
    let schema = load_schema(&args)?;
    println!(
        "Schema OK: {} option(s), {} switch(es).",
        schema.options().len(),
        schema.switch_count()
    );
    Ok(())
}

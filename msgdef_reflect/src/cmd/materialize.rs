/* Binary for materializing a JSON fixture against a message definition */

use anyhow::Context;
use clap::Parser as ClapParser;
use msgdef_gen::StructRegistry;
use msgdef_reflect::Materializer;
use msgdef_types::load_message_spec_file;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(ClapParser)]
#[command(name = "msgdef-materialize")]
#[command(about = "Materialize a JSON fixture as a typed message instance and print it as JSON")]
struct Args {
  /* Message definition (JSON schema document) */
  #[arg(short, long)]
  schema: PathBuf,

  /* Message version to materialize */
  #[arg(short = 'V', long)]
  version: i16,

  /* Fixture file to materialize */
  #[arg(short, long)]
  fixture: PathBuf,

  /* Pretty print JSON output */
  #[arg(short, long)]
  pretty: bool,

  /* Enable debug logging */
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let default_level = if args.verbose { "debug" } else { "warn" };
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .init();

  /* Load the message definition */
  let spec = load_message_spec_file(&args.schema)
    .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
  let registry = StructRegistry::for_message(&spec)?;

  /* Read the fixture */
  let text = std::fs::read_to_string(&args.fixture)
    .with_context(|| format!("failed to read fixture {}", args.fixture.display()))?;
  let fixture: serde_json::Value = serde_json::from_str(&text)
    .with_context(|| format!("fixture {} is not valid JSON", args.fixture.display()))?;

  /* Materialize */
  let materializer = Materializer::new(&spec, &registry, args.version)?;
  let instance = materializer
    .materialize_root(&fixture)
    .with_context(|| format!("failed to materialize {} at version {}", spec.name, args.version))?;
  info!("materialized {} with {} field(s)", instance.name, instance.fields.len());

  /* Serialize to JSON */
  let json = if args.pretty {
    serde_json::to_string_pretty(&instance)?
  } else {
    serde_json::to_string(&instance)?
  };
  println!("{}", json);

  Ok(())
}

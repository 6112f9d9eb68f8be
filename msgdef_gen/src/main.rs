use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "msgdef-gen")]
#[command(about = "Generate versioned message structs from JSON message definitions", long_about = None)]
struct Cli {
    /* Directory containing the JSON message definitions */
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    input_dir: PathBuf,

    /* Output directory for generated code */
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    output_dir: PathBuf,

    /* Enable verbose output */
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /* Skip the #[cfg(test)] module in generated files */
    #[arg(long = "no-test-scaffold")]
    no_test_scaffold: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    cmds::codegen::run(cli.input_dir, cli.output_dir, cli.verbose, !cli.no_test_scaffold)?;

    Ok(())
}

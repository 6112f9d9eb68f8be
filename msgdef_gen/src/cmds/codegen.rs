/* Codegen command - generate Rust modules from message definitions */

use anyhow::Context;
use msgdef_gen::output::{generate_all, GeneratorOptions};
use std::path::PathBuf;
use tracing::info;

/* Execute the codegen command */
pub fn run(input_dir: PathBuf, output_dir: PathBuf, verbose: bool, emit_test_scaffold: bool) -> anyhow::Result<()> {
  if verbose {
    info!("input directory: {}", input_dir.display());
    info!("output directory: {}", output_dir.display());
    info!("test scaffold: {}", if emit_test_scaffold { "on" } else { "off" });
  }

  if !input_dir.is_dir() {
    anyhow::bail!("input path {} is not a directory", input_dir.display());
  }

  let options = GeneratorOptions {
    output_dir,
    verbose,
    emit_test_scaffold,
  };
  let modules = generate_all(&input_dir, &options)
    .with_context(|| format!("code generation from {} failed", input_dir.display()))?;

  if verbose {
    for module in &modules {
      info!("  - {}", module);
    }
  }

  Ok(())
}

/* Output layout
 *
 * <output>/<message_module>/v{N}.rs for every valid version, a manifest per
 * message directory and one manifest at the root. Manifests are sorted, never
 * written in discovery order.
 */

use crate::codegen::rust::{RustBackend, RustBackendOptions};
use crate::codegen::{generate_unit, Backend};
use crate::registry::StructRegistry;
use crate::resolve::check_version;
use anyhow::{bail, Context};
use msgdef_types::{load_message_spec_file, MessageSpec};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct GeneratorOptions {
  pub output_dir: PathBuf,
  pub verbose: bool,
  pub emit_test_scaffold: bool,
}

impl Default for GeneratorOptions {
  fn default() -> Self {
    Self {
      output_dir: PathBuf::from("generated"),
      verbose: false,
      emit_test_scaffold: true,
    }
  }
}

impl GeneratorOptions {
  pub fn backend(&self) -> RustBackend {
    RustBackend::new(RustBackendOptions {
      emit_test_scaffold: self.emit_test_scaffold,
    })
  }
}

/* Sort key so v2 comes before v10 */
fn manifest_key(name: &str) -> (&str, Option<u64>, &str) {
  let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
  let number = name[prefix.len()..].parse().ok();
  (prefix, number, name)
}

/// Write the manifest for `dir` listing `modules`, sorted and deduplicated.
pub fn write_manifest(backend: &dyn Backend, dir: &Path, mut modules: Vec<String>) -> anyhow::Result<PathBuf> {
  modules.sort_by(|a, b| manifest_key(a).cmp(&manifest_key(b)));
  modules.dedup();
  let path = dir.join(backend.manifest_file_name());
  fs::write(&path, backend.emit_manifest(&modules))
    .with_context(|| format!("failed to write manifest {}", path.display()))?;
  debug!("wrote manifest {} ({} modules)", path.display(), modules.len());
  Ok(path)
}

/// Generate every version of one message under `output_dir` and return the
/// name of the directory it was written to.
pub fn generate_message(backend: &dyn Backend, spec: &MessageSpec, output_dir: &Path) -> anyhow::Result<String> {
  /* Fails before anything is written for open-ended messages */
  check_version(spec, spec.valid_versions.lowest())?;
  let registry = StructRegistry::for_message(spec)?;

  let module = spec.module_name();
  let dir = output_dir.join(&module);
  fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

  let mut versions = Vec::new();
  for version in spec.valid_versions.iter() {
    let text = generate_unit(backend, spec, &registry, version)
      .with_context(|| format!("failed to generate {} version {}", spec.name, version))?;
    let path = dir.join(backend.unit_file_name(version));
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("wrote {}", path.display());
    versions.push(format!("v{}", version));
  }
  write_manifest(backend, &dir, versions)?;
  Ok(module)
}

/// Schema documents in `input_dir`, sorted by path.
pub fn schema_files(input_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for entry in fs::read_dir(input_dir).with_context(|| format!("failed to read {}", input_dir.display()))? {
    let path = entry?.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

/// Generate code for every schema in `input_dir`. Returns the message
/// modules written, in root manifest order.
pub fn generate_all(input_dir: &Path, options: &GeneratorOptions) -> anyhow::Result<Vec<String>> {
  let backend = options.backend();
  fs::create_dir_all(&options.output_dir)
    .with_context(|| format!("failed to create {}", options.output_dir.display()))?;

  let files = schema_files(input_dir)?;
  info!("found {} schema file(s) in {}", files.len(), input_dir.display());

  let mut modules: BTreeMap<String, PathBuf> = BTreeMap::new();
  for file in files {
    let spec = load_message_spec_file(&file).with_context(|| format!("failed to load {}", file.display()))?;
    let module = generate_message(&backend, &spec, &options.output_dir)?;
    if options.verbose {
      info!("{} -> {}/ (versions {})", spec.name, module, spec.valid_versions);
    }
    if let Some(previous) = modules.insert(module.clone(), file.clone()) {
      bail!(
        "{} and {} both generate module '{}'",
        previous.display(),
        file.display(),
        module
      );
    }
  }

  let names: Vec<String> = modules.into_keys().collect();
  write_manifest(&backend, &options.output_dir, names.clone())?;
  info!("generated {} message module(s) into {}", names.len(), options.output_dir.display());
  Ok(names)
}

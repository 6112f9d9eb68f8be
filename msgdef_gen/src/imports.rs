/* Import aggregation for one emission unit
 *
 * Output depends only on the set of paths added: groups are keyed by module
 * path in a BTreeMap and symbols kept in a BTreeSet.
 */

use crate::errors::CodegenError;
use std::collections::{BTreeMap, BTreeSet};

const STD_ROOTS: &[&str] = &["std", "core", "alloc"];
const LOCAL_ROOTS: &[&str] = &["crate", "super", "self"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportBucket {
  Std,
  External,
  Local,
}

impl ImportBucket {
  pub fn classify(module: &str) -> ImportBucket {
    let root = module.split("::").next().unwrap_or(module);
    if STD_ROOTS.contains(&root) {
      ImportBucket::Std
    } else if LOCAL_ROOTS.contains(&root) {
      ImportBucket::Local
    } else {
      ImportBucket::External
    }
  }
}

#[derive(Debug, Default, Clone)]
pub struct ImportAggregator {
  groups: BTreeMap<String, BTreeSet<String>>,
}

impl ImportAggregator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a `module::path::Symbol` reference.
  pub fn add(&mut self, path: &str) -> Result<(), CodegenError> {
    let malformed = || CodegenError::MalformedImport {
      path: path.to_string(),
    };
    let (module, symbol) = path.trim().rsplit_once("::").ok_or_else(malformed)?;
    if module.is_empty() || symbol.is_empty() {
      return Err(malformed());
    }
    self
      .groups
      .entry(module.to_string())
      .or_default()
      .insert(symbol.to_string());
    Ok(())
  }

  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }

  /// Render `use` statements: std, then external crates, then crate-local
  /// paths, one blank line between non-empty buckets.
  pub fn generate(&self) -> String {
    let mut buckets: BTreeMap<ImportBucket, Vec<String>> = BTreeMap::new();
    for (module, symbols) in &self.groups {
      let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
      let statement = match symbols.as_slice() {
        [single] => format!("use {}::{};\n", module, single),
        _ => format!("use {}::{{{}}};\n", module, symbols.join(", ")),
      };
      buckets
        .entry(ImportBucket::classify(module))
        .or_default()
        .push(statement);
    }

    buckets
      .values()
      .map(|statements| statements.concat())
      .collect::<Vec<_>>()
      .join("\n")
  }
}

//! Store-listing JSON checks: syntax validation and duplicate package-name
//! detection between two listing files.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::util;

/// Report whether `path` holds well-formed JSON, printing the verdict.
pub fn validate_listing(path: &Path) -> bool {
  if !path.exists() {
    println!("Error: File {} does not exist", path.display());
    return false;
  }

  let raw = match std::fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(err) => {
      println!("❌ Error validating {}: {}", path.display(), err);
      return false;
    }
  };

  match serde_json::from_str::<serde_json::Value>(&raw) {
    Ok(_) => {
      println!("✅ JSON file {} is valid", path.display());
      true
    }
    Err(err) => {
      println!("❌ Invalid JSON in {}: {}", path.display(), err);
      false
    }
  }
}

/// Package names under `apps[].info.package_name`.
fn package_names(path: &Path) -> Result<BTreeSet<String>> {
  let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  let data: serde_json::Value =
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

  let Some(apps) = data.get("apps").and_then(|v| v.as_array()) else {
    bail!("{}: expected an \"apps\" array", path.display());
  };

  let mut names = BTreeSet::new();

  for app in apps {
    let Some(name) = app.pointer("/info/package_name").and_then(|v| v.as_str()) else {
      bail!("{}: app entry without info.package_name", path.display());
    };
    names.insert(name.to_string());
  }

  Ok(names)
}

/// Package names present in both listing files, sorted, with a printed report.
pub fn find_duplicates(first: &Path, second: &Path) -> Result<Vec<String>> {
  let names_first = package_names(first)?;
  let names_second = package_names(second)?;

  let duplicates: Vec<String> = names_first.intersection(&names_second).cloned().collect();

  if duplicates.is_empty() {
    println!(
      "✅ No duplicate package names found between {} and {}",
      first.display(),
      second.display()
    );
  } else {
    println!(
      "❌ Found {} duplicate package names between {} and {}:",
      duplicates.len(),
      first.display(),
      second.display()
    );
    for dup in &duplicates {
      println!("  - {}", dup);
    }
  }

  Ok(duplicates)
}

/// Duplicate check entry point: reports, and writes the duplicates file only
/// when something was found. Finding duplicates is not a failure.
pub fn run_duplicates(first: &Path, second: &Path, output: &Path) -> Result<()> {
  let duplicates = find_duplicates(first, second)?;

  if !duplicates.is_empty() {
    util::write_lines(output, &duplicates)?;
    println!("Duplicates saved to {}", output.display());
  }

  Ok(())
}

//! Compute and apply labels for a pull request from its title and changed
//! file paths, following the repository's label taxonomy.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::github::api::GithubApi;
use crate::model::LabelConfig;

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ApplyMode {
  /// Keep existing labels and add the computed ones
  Add,
  /// Replace all labels with the computed set
  Replace,
}

pub fn load_config(path: Option<&Path>) -> Result<LabelConfig> {
  let Some(path) = path else {
    return Ok(LabelConfig::default());
  };

  let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Labels whose path patterns match at least one changed file. An app:shared
/// hit expands to both concrete app labels.
fn labels_for_paths(config: &LabelConfig, changed_files: &[String]) -> BTreeSet<String> {
  let mut labels = BTreeSet::new();

  for (label, patterns) in &config.path_patterns {
    for file in changed_files {
      if patterns.iter().any(|p| file.starts_with(p.as_str())) {
        println!("👀 File '{}' matches pattern for label '{}'", file, label);
        labels.insert(label.clone());
        break;
      }
    }
  }

  if labels.remove("app:shared") {
    labels.insert("app:password-manager".to_string());
    labels.insert("app:authenticator".to_string());
  }

  if labels.is_empty() {
    println!("::warning::No matching file paths found, no labels applied.");
  }

  labels
}

/// Labels whose title patterns appear in the title as `pattern:` or
/// `pattern(`, matching the conventional commit shape case-insensitively.
fn labels_for_title(config: &LabelConfig, title: &str) -> BTreeSet<String> {
  let mut labels = BTreeSet::new();
  let title_lower = title.to_lowercase();

  for (label, patterns) in &config.title_patterns {
    for pattern in patterns {
      if title_lower.contains(&format!("{}:", pattern)) || title_lower.contains(&format!("{}(", pattern)) {
        println!("📝 Title matches pattern '{}' for label '{}'", pattern, label);
        labels.insert(label.clone());
        break;
      }
    }
  }

  if labels.is_empty() {
    println!("::warning::No matching title patterns found, no labels applied.");
  }

  labels
}

/// Union of path and title labels, with the catch-all added when no type
/// label made it in. Always non-empty, sorted.
pub fn compute_labels(config: &LabelConfig, title: &str, changed_files: &[String]) -> Vec<String> {
  let mut labels = labels_for_paths(config, changed_files);
  labels.extend(labels_for_title(config, title));

  if !labels.iter().any(|l| l.starts_with("t:")) {
    labels.insert(config.catch_all_label.clone());
  }

  labels.into_iter().collect()
}

pub fn run(api: &dyn GithubApi, pr_number: i64, config: &LabelConfig, mode: ApplyMode, dry_run: bool) -> Result<()> {
  println!("🔍 Checking PR #{}...", pr_number);

  let title = api.pr_title(pr_number)?;
  println!("📋 PR Title: {}\n", title);

  let changed_files = api.pr_changed_files(pr_number)?;
  println!("👀 Changed files:");
  for file in &changed_files {
    println!("{}", file);
  }
  println!();

  let labels = compute_labels(config, &title, &changed_files);
  println!("🏷️  Applying labels: {}", labels.join(", "));

  if dry_run {
    println!("Dry run - labels not applied.");
  } else {
    match mode {
      ApplyMode::Add => api.add_labels(pr_number, &labels)?,
      ApplyMode::Replace => api.replace_labels(pr_number, &labels)?,
    }
  }

  println!("✅ Done");

  Ok(())
}

// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON model (release metadata, PR views, GraphQL envelopes, label taxonomy) shared by the subcommands
// role: model/types
// outputs: Deserializable structs with field names matching gh CLI and GraphQL payloads
// invariants: gh JSON field shapes are matched exactly; built-in taxonomy mirrors the repository labels
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Release metadata returned by `gh release view --json name,body`.
#[derive(Debug, Deserialize, Clone)]
pub struct ReleaseInfo {
  pub name: String,
  #[serde(default)]
  pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct PrTitle {
  pub title: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LabelName {
  pub name: String,
}

/// Label list returned by `gh pr view --json labels`.
#[derive(Debug, Deserialize)]
pub struct PrLabels {
  #[serde(default)]
  pub labels: Vec<LabelName>,
}

/// Envelope for batched GraphQL pullRequest queries. Aliased PRs land under
/// `repository` keyed by alias; a null alias means that PR was not found.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
  pub data: Option<GraphQlData<T>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlData<T> {
  pub repository: Option<HashMap<String, Option<T>>>,
}

#[derive(Debug, Deserialize)]
pub struct Nodes<T> {
  #[serde(default)]
  pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct PrLabelsNode {
  pub labels: Option<Nodes<LabelName>>,
}

#[derive(Debug, Deserialize)]
pub struct ClosingIssuesNode {
  #[serde(rename = "closingIssuesReferences")]
  pub closing_issues_references: Option<Nodes<IssueRef>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssueRef {
  pub number: i64,
}

/// Labeling taxonomy: a catch-all label plus title and path pattern tables.
/// All three keys are required when loaded from a config file.
#[derive(Debug, Deserialize, Clone)]
pub struct LabelConfig {
  pub catch_all_label: String,
  pub title_patterns: BTreeMap<String, Vec<String>>,
  pub path_patterns: BTreeMap<String, Vec<String>>,
}

fn add(map: &mut BTreeMap<String, Vec<String>>, label: &str, patterns: &[&str]) {
  map.insert(label.to_string(), patterns.iter().map(|p| p.to_string()).collect());
}

impl Default for LabelConfig {
  fn default() -> Self {
    let mut title_patterns = BTreeMap::new();
    add(&mut title_patterns, "t:new-feature", &["feat", "feature"]);
    add(&mut title_patterns, "t:bug", &["fix", "bug", "bugfix"]);
    add(
      &mut title_patterns,
      "t:tech-debt",
      &["refactor", "chore", "cleanup", "revert", "debt", "test", "perf"],
    );
    add(&mut title_patterns, "t:docs", &["docs"]);
    add(&mut title_patterns, "t:ci", &["ci", "build", "chore(ci)"]);
    add(&mut title_patterns, "t:deps", &["deps"]);
    add(&mut title_patterns, "t:breaking-change", &["breaking", "breaking-change"]);
    add(&mut title_patterns, "t:misc", &["misc"]);

    let mut path_patterns = BTreeMap::new();
    add(
      &mut path_patterns,
      "app:shared",
      &[
        "annotation/",
        "core/",
        "data/",
        "network/",
        "ui/",
        "authenticatorbridge/",
        "gradle/",
      ],
    );
    add(&mut path_patterns, "app:password-manager", &["app/", "cxf/"]);
    add(&mut path_patterns, "app:authenticator", &["authenticator/"]);
    add(
      &mut path_patterns,
      "t:ci",
      &[".github/", "scripts/", "fastlane/", ".gradle/", ".claude/", "detekt-config.yml"],
    );
    add(&mut path_patterns, "t:docs", &["docs/"]);
    add(&mut path_patterns, "t:deps", &["gradle/"]);
    add(&mut path_patterns, "t:misc", &["keystore/"]);

    LabelConfig {
      catch_all_label: "t:misc".to_string(),
      title_patterns,
      path_patterns,
    }
  }
}

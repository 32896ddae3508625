// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: gh CLI seam for release, pull request, and issue operations used by the subcommands
// role: github/api
// inputs: Repo slugs, PR numbers and URLs; RELPILOT_TEST_* env fixtures in mock mode
// outputs: Typed release/PR data; batch label and linked-issue maps
// side_effects: Spawns `gh` subprocesses; mutations edit labels and post comments (or append to a call log in mock mode)
// invariants:
// - Batch fetch failures degrade to empty maps so callers can fall back per PR
// - Mock selection is driven only by RELPILOT_TEST_* variables
// - Mutations never reach GitHub while the mock is active
// errors: Single-PR fetches and mutations surface gh stderr; batch calls log and degrade
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::model::{ClosingIssuesNode, GraphQlResponse, PrLabels, PrLabelsNode, PrTitle, ReleaseInfo};
use crate::util::{run_gh, run_gh_stdin};

pub const LABELS_SELECTION: &str = "labels(first: 100) { nodes { name } }";
pub const CLOSING_ISSUES_SELECTION: &str = "closingIssuesReferences(first: 100) { nodes { number } }";

// --- Trait seam for the gh CLI ---
pub trait GithubApi {
  fn release_view(&self, repo: &str, tag: &str) -> Result<ReleaseInfo>;
  fn pr_labels(&self, pr_url: &str) -> Result<Vec<String>>;
  fn pr_labels_batched(&self, owner: &str, name: &str, numbers: &[String]) -> HashMap<String, Vec<String>>;
  fn closing_issues_batched(&self, owner: &str, name: &str, numbers: &[i64]) -> HashMap<i64, Vec<i64>>;
  fn pr_title(&self, number: i64) -> Result<String>;
  fn pr_changed_files(&self, number: i64) -> Result<Vec<String>>;
  fn add_labels(&self, number: i64, labels: &[String]) -> Result<()>;
  fn replace_labels(&self, number: i64, labels: &[String]) -> Result<()>;
  fn comment_issue(&self, repo: &str, issue_number: i64, body: &str) -> Result<()>;
}

/// Build one GraphQL query selecting `selection` for every PR number, each
/// under a `pr_<n>` alias so the response can be keyed back to its PR.
fn batched_pr_query<T: Display>(numbers: &[T], selection: &str) -> String {
  let fragments = numbers
    .iter()
    .map(|n| format!("pr_{}: pullRequest(number: {}) {{ {} }}", n, n, selection))
    .collect::<Vec<_>>()
    .join("\n");

  format!(
    "query ($owner: String!, $repo: String!) {{\n  repository(owner: $owner, name: $repo) {{\n{}\n  }}\n}}",
    fragments
  )
}

fn graphql(owner: &str, name: &str, query: &str) -> Result<String> {
  let owner_arg = format!("owner={}", owner);
  let repo_arg = format!("repo={}", name);
  let query_arg = format!("query={}", query);

  run_gh(&["api", "graphql", "-F", &owner_arg, "-F", &repo_arg, "-f", &query_arg])
}

/// Real implementation backed by the `gh` CLI.
struct GhCli;

impl GithubApi for GhCli {
  fn release_view(&self, repo: &str, tag: &str) -> Result<ReleaseInfo> {
    let out = run_gh(&["release", "view", tag, "--repo", repo, "--json", "name,body"])?;
    serde_json::from_str(&out).context("parsing release JSON")
  }

  fn pr_labels(&self, pr_url: &str) -> Result<Vec<String>> {
    let out = run_gh(&["pr", "view", pr_url, "--json", "labels"])?;
    let parsed: PrLabels = serde_json::from_str(&out).context("parsing PR labels JSON")?;

    Ok(parsed.labels.into_iter().map(|l| l.name).collect())
  }

  fn pr_labels_batched(&self, owner: &str, name: &str, numbers: &[String]) -> HashMap<String, Vec<String>> {
    if numbers.is_empty() {
      return HashMap::new();
    }

    let query = batched_pr_query(numbers, LABELS_SELECTION);
    let parsed: GraphQlResponse<PrLabelsNode> = match graphql(owner, name, &query)
      .and_then(|out| serde_json::from_str(&out).context("parsing batch labels JSON"))
    {
      Ok(parsed) => parsed,
      Err(err) => {
        eprintln!("Error batch-fetching PR labels: {:#}", err);
        return HashMap::new();
      }
    };
    let Some(repo) = parsed.data.and_then(|d| d.repository) else {
      return HashMap::new();
    };

    // Only PRs present in the response enter the cache; misses fall back to
    // an individual fetch at lookup time.
    let mut map = HashMap::new();

    for number in numbers {
      let alias = format!("pr_{}", number);

      if let Some(Some(node)) = repo.get(&alias) {
        let labels = node
          .labels
          .as_ref()
          .map(|n| n.nodes.iter().map(|l| l.name.clone()).collect())
          .unwrap_or_default();
        map.insert(number.clone(), labels);
      }
    }

    map
  }

  fn closing_issues_batched(&self, owner: &str, name: &str, numbers: &[i64]) -> HashMap<i64, Vec<i64>> {
    if numbers.is_empty() {
      return HashMap::new();
    }

    let query = batched_pr_query(numbers, CLOSING_ISSUES_SELECTION);
    let parsed: GraphQlResponse<ClosingIssuesNode> = match graphql(owner, name, &query)
      .and_then(|out| serde_json::from_str(&out).context("parsing linked issues JSON"))
    {
      Ok(parsed) => parsed,
      Err(err) => {
        eprintln!("Error batch-fetching linked issues: {:#}", err);
        return HashMap::new();
      }
    };
    let repo = parsed.data.and_then(|d| d.repository).unwrap_or_default();

    // Every requested PR gets an entry; missing aliases map to no issues.
    numbers
      .iter()
      .map(|number| {
        let alias = format!("pr_{}", number);
        let issues = match repo.get(&alias) {
          Some(Some(node)) => node
            .closing_issues_references
            .as_ref()
            .map(|n| n.nodes.iter().map(|i| i.number).collect())
            .unwrap_or_default(),
          _ => Vec::new(),
        };

        (*number, issues)
      })
      .collect()
  }

  fn pr_title(&self, number: i64) -> Result<String> {
    let number_arg = number.to_string();
    let out = run_gh(&["pr", "view", &number_arg, "--json", "title"])?;
    let parsed: PrTitle = serde_json::from_str(&out).context("parsing PR title JSON")?;

    Ok(parsed.title)
  }

  fn pr_changed_files(&self, number: i64) -> Result<Vec<String>> {
    let number_arg = number.to_string();
    let out = run_gh(&["pr", "diff", &number_arg, "--name-only"])?;

    Ok(out.lines().filter(|l| !l.is_empty()).map(|l| l.to_string()).collect())
  }

  fn add_labels(&self, number: i64, labels: &[String]) -> Result<()> {
    let number_arg = number.to_string();
    let joined = labels.join(",");
    run_gh(&["pr", "edit", &number_arg, "--add-label", &joined])?;

    Ok(())
  }

  fn replace_labels(&self, number: i64, labels: &[String]) -> Result<()> {
    // {owner}/{repo} are gh placeholders resolved against the current repo.
    let endpoint = format!("repos/{{owner}}/{{repo}}/issues/{}", number);
    let payload = serde_json::json!({ "labels": labels }).to_string();
    run_gh_stdin(&["api", &endpoint, "-X", "PATCH", "--silent", "--input", "-"], &payload)?;

    Ok(())
  }

  fn comment_issue(&self, repo: &str, issue_number: i64, body: &str) -> Result<()> {
    let number_arg = issue_number.to_string();
    run_gh(&["issue", "comment", &number_arg, "--body", body, "--repo", repo])?;

    Ok(())
  }
}

fn env_json<T: DeserializeOwned>(key: &str) -> Option<T> {
  let raw = std::env::var(key).ok()?;
  serde_json::from_str(&raw).ok()
}

fn log_call(line: &str) -> Result<()> {
  let Ok(path) = std::env::var("RELPILOT_TEST_CALL_LOG") else {
    return Ok(());
  };

  let mut file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("opening call log {}", path))?;
  writeln!(file, "{}", line).context("writing call log")?;

  Ok(())
}

/// Env-backed implementation for tests: reads come from RELPILOT_TEST_*
/// fixtures, mutations append to the call log instead of reaching GitHub.
struct GhEnvApi;

impl GithubApi for GhEnvApi {
  fn release_view(&self, _repo: &str, _tag: &str) -> Result<ReleaseInfo> {
    env_json("RELPILOT_TEST_RELEASE_JSON").context("RELPILOT_TEST_RELEASE_JSON not set or invalid")
  }

  fn pr_labels(&self, pr_url: &str) -> Result<Vec<String>> {
    let map: HashMap<String, Vec<String>> =
      env_json("RELPILOT_TEST_PR_LABELS_JSON").context("RELPILOT_TEST_PR_LABELS_JSON not set or invalid")?;

    Ok(map.get(pr_url).cloned().unwrap_or_default())
  }

  fn pr_labels_batched(&self, _owner: &str, _name: &str, numbers: &[String]) -> HashMap<String, Vec<String>> {
    let Some(map) = env_json::<HashMap<String, Vec<String>>>("RELPILOT_TEST_BATCH_LABELS_JSON") else {
      return HashMap::new();
    };

    numbers
      .iter()
      .filter_map(|n| map.get(n).map(|labels| (n.clone(), labels.clone())))
      .collect()
  }

  fn closing_issues_batched(&self, _owner: &str, _name: &str, numbers: &[i64]) -> HashMap<i64, Vec<i64>> {
    let map = env_json::<HashMap<String, Vec<i64>>>("RELPILOT_TEST_CLOSING_ISSUES_JSON").unwrap_or_default();

    numbers
      .iter()
      .map(|n| (*n, map.get(&n.to_string()).cloned().unwrap_or_default()))
      .collect()
  }

  fn pr_title(&self, _number: i64) -> Result<String> {
    std::env::var("RELPILOT_TEST_PR_TITLE").context("RELPILOT_TEST_PR_TITLE not set")
  }

  fn pr_changed_files(&self, _number: i64) -> Result<Vec<String>> {
    env_json("RELPILOT_TEST_PR_FILES_JSON").context("RELPILOT_TEST_PR_FILES_JSON not set or invalid")
  }

  fn add_labels(&self, number: i64, labels: &[String]) -> Result<()> {
    log_call(&format!("add-labels #{}: {}", number, labels.join(",")))
  }

  fn replace_labels(&self, number: i64, labels: &[String]) -> Result<()> {
    log_call(&format!("replace-labels #{}: {}", number, labels.join(",")))
  }

  fn comment_issue(&self, repo: &str, issue_number: i64, body: &str) -> Result<()> {
    log_call(&format!("comment {}#{}: {}", repo, issue_number, body.replace('\n', "\\n")))
  }
}

pub fn env_wants_mock() -> bool {
  std::env::vars().any(|(k, _)| k.starts_with("RELPILOT_TEST_"))
}

pub fn build_api() -> Box<dyn GithubApi> {
  if env_wants_mock() {
    Box::new(GhEnvApi)
  } else {
    Box::new(GhCli)
  }
}

/// Two-tier label lookup: a primed batch cache with per-PR fallback fetches.
pub struct LabelLookup<'a> {
  api: &'a dyn GithubApi,
  cache: HashMap<String, Vec<String>>,
}

impl<'a> LabelLookup<'a> {
  pub fn new(api: &'a dyn GithubApi) -> Self {
    Self { api, cache: HashMap::new() }
  }

  /// Batch-fetch labels for the given PR numbers into the cache.
  pub fn prime(&mut self, owner: &str, name: &str, numbers: &[String]) {
    self.cache = self.api.pr_labels_batched(owner, name, numbers);
  }

  /// Labels for one PR: cache hit, or an individual fetch on miss.
  pub fn labels_for(&mut self, number: &str, pr_url: &str) -> Result<Vec<String>> {
    if let Some(labels) = self.cache.get(number) {
      println!("Using cached labels for PR #{}", number);
      return Ok(labels.clone());
    }

    println!("PR #{} not in cache, fetching individually...", number);
    let labels = self.api.pr_labels(pr_url)?;
    self.cache.insert(number.to_string(), labels.clone());

    Ok(labels)
  }
}

// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Process a release-notes file into ticket, PR, processed-line, and debug artifacts
// role: notes/pipeline
// inputs: Notes file; optional app label and repo slug; PR labels via GithubApi in filtered mode
// outputs: NotesReport plus four artifact files written by run()
// side_effects: Reads the input file; writes artifacts; prints progress and per-line traces
// invariants:
// - Ticket and PR lists are deduplicated preserving first appearance
// - Filtered mode skips a line only on a label verdict; skipped lines contribute nothing
// - Every input line lands in the debug trace exactly once
// errors: IO failures abort the run; label lookups degrade to an empty set with a warning
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cleanup;
use crate::cli::NotesArgs;
use crate::extract;
use crate::github::api::{GithubApi, LabelLookup};
use crate::util;

/// Everything one processing pass produces.
#[derive(Debug, Default, PartialEq)]
pub struct NotesReport {
  pub tickets: Vec<String>,
  pub prs: Vec<String>,
  pub lines: Vec<String>,
  pub debug: Vec<String>,
}

/// A PR is skipped when it carries app labels and none of them is the
/// release's app label.
pub fn should_skip_pr(app_label: &str, labels: &[String]) -> bool {
  let app_labels: Vec<&String> = labels.iter().filter(|l| l.starts_with("app:")).collect();

  !app_labels.is_empty() && !app_labels.iter().any(|l| l.as_str() == app_label)
}

/// Plain mode: clean every non-empty line that is not a section heading.
fn process_plain(content: &str) -> NotesReport {
  let mut report = NotesReport::default();

  for raw in content.lines() {
    let line = raw.trim();
    let processable = !line.is_empty() && !line.ends_with(':');

    if processable {
      report.tickets.extend(extract::jira_tickets(line));
      report.prs.extend(extract::pr_numbers(line));
      report.lines.push(cleanup::clean_line(line));
      report.debug.push(format!("{} | labels: []", line));
    } else {
      report.lines.push(line.to_string());
      if line.is_empty() {
        report.debug.push(String::new());
      } else {
        report.debug.push(format!("{} | skipped - processing", line));
      }
    }
  }

  report
}

/// Filtered mode: only bullet lines are processed, and a line whose PR is
/// labeled for a different app is dropped entirely.
fn process_filtered(api: &dyn GithubApi, content: &str, app_label: &str, repo: Option<&str>) -> Result<NotesReport> {
  // Collect every PR URL up front so one batched query can prime the cache.
  let urls = extract::pr_urls(content);
  let numbers: Vec<String> =
    extract::dedup_preserve_order(urls.iter().filter_map(|u| extract::pr_number_from_url(u)).collect());

  let repo_parts = match repo {
    Some(slug) => {
      let Some((owner, name)) = slug.split_once('/') else {
        bail!("--repo must be owner/name, got: {}", slug);
      };
      Some((owner.to_string(), name.to_string()))
    }
    None => urls.first().and_then(|u| extract::repo_from_pr_url(u)),
  };

  let mut lookup = LabelLookup::new(api);

  if let Some((owner, name)) = &repo_parts {
    if !numbers.is_empty() {
      lookup.prime(owner, name, &numbers);
    }
  }

  let mut report = NotesReport::default();

  for raw in content.lines() {
    let line = raw.trim();

    if !line.starts_with("* ") {
      report.lines.push(line.to_string());
      if line.is_empty() {
        report.debug.push(String::new());
      } else {
        report.debug.push(format!("{} | skipped - processing", line));
      }
      continue;
    }

    let urls_in_line = extract::pr_urls(line);
    let mut labels: Vec<String> = Vec::new();
    let mut url_number: Option<String> = None;

    if let Some(url) = urls_in_line.first() {
      let number = extract::pr_number_from_url(url).unwrap_or_default();

      // One failed lookup degrades to an unlabeled PR and the pass continues;
      // unlabeled PRs are never skipped.
      labels = match lookup.labels_for(&number, url) {
        Ok(labels) => labels,
        Err(err) => {
          eprintln!("Error fetching labels for PR #{}: {:#}", number, err);
          Vec::new()
        }
      };

      if should_skip_pr(app_label, &labels) {
        report.debug.push(format!("{} | skipped - labels: {:?}", line, labels));
        continue;
      }
      url_number = Some(number);
    }

    if let Some(number) = url_number {
      report.prs.push(number);
    }
    report.tickets.extend(extract::jira_tickets(line));
    report.prs.extend(extract::pr_numbers(line));
    report.lines.push(cleanup::clean_line(line));
    report.debug.push(format!("{} | labels: {:?}", line, labels));
  }

  Ok(report)
}

pub fn process_file(api: &dyn GithubApi, path: &Path, app_label: Option<&str>, repo: Option<&str>) -> Result<NotesReport> {
  println!("Processing file: {}", path.display());
  let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

  let mut report = match app_label {
    Some(label) => process_filtered(api, &content, label, repo)?,
    None => process_plain(&content),
  };

  report.tickets = extract::dedup_preserve_order(report.tickets);
  report.prs = extract::dedup_preserve_order(report.prs);

  println!("Jira tickets: {}", report.tickets.join(","));
  println!("PR numbers: {}", report.prs.join(","));
  println!("Finished processing file: {}", path.display());

  Ok(report)
}

pub fn run(api: &dyn GithubApi, args: &NotesArgs) -> Result<()> {
  let report = process_file(api, &args.file, args.app_label.as_deref(), args.repo.as_deref())?;

  util::write_lines(&args.jira_filepath, &report.tickets)?;
  util::write_lines(&args.pr_filepath, &report.prs)?;
  util::write_lines(&args.processed_filepath, &report.lines)?;
  util::write_lines(&args.debug_filepath, &report.debug)?;

  Ok(())
}

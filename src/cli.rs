use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::jira;
use crate::labeler::ApplyMode;

#[derive(Parser, Debug)]
#[command(
  name = "release-pilot",
  version,
  about = "Release pipeline helpers: notes processing, PR labeling, listing checks",
  long_about = None
)]
pub struct Cli {
  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Process a release-notes file: extract tickets and PRs, clean lines, filter by app label
  Notes(NotesArgs),
  /// Comment on issues closed by a release's pull requests
  UpdateIssues(UpdateIssuesArgs),
  /// Compute and apply labels for a pull request from its title and changed files
  LabelPr(LabelPrArgs),
  /// Check that a store-listing JSON file parses
  ValidateListing(ValidateListingArgs),
  /// Report package names present in both store-listing files
  FindDuplicates(FindDuplicatesArgs),
  /// Fetch release notes from a Jira issue's rich-text field
  JiraNotes(JiraNotesArgs),
}

#[derive(Args, Debug)]
pub struct NotesArgs {
  /// Input file containing release notes
  #[arg(default_value = "release_notes.txt")]
  pub file: PathBuf,

  /// Keep only lines whose PR carries this app label (e.g. app:password-manager)
  #[arg(long)]
  pub app_label: Option<String>,

  /// Repository (owner/name) for the batched label lookup; derived from the
  /// first PR URL in the file when omitted
  #[arg(long)]
  pub repo: Option<String>,

  /// Output file for processed notes
  #[arg(long, default_value = "processed_notes.txt")]
  pub processed_filepath: PathBuf,

  /// Output file for Jira tickets
  #[arg(long, default_value = "jira_tickets.txt")]
  pub jira_filepath: PathBuf,

  /// Output file for PR numbers
  #[arg(long, default_value = "pr_numbers.txt")]
  pub pr_filepath: PathBuf,

  /// Output file for the per-line debug trace
  #[arg(long, default_value = "processed_notes_debug.txt")]
  pub debug_filepath: PathBuf,
}

#[derive(Args, Debug)]
pub struct UpdateIssuesArgs {
  /// Release URL (e.g. https://github.com/owner/repo/releases/tag/v1.0.0)
  pub release_url: String,

  /// Run without actually commenting issues
  #[arg(long)]
  pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct LabelPrArgs {
  /// Pull request number
  pub pr_number: i64,

  /// Label decision table (JSON); built-in defaults when omitted
  #[arg(long)]
  pub config: Option<PathBuf>,

  /// How computed labels are applied to the PR
  #[arg(long, value_enum, default_value_t = ApplyMode::Replace)]
  pub mode: ApplyMode,

  /// Print the decision without applying labels
  #[arg(long)]
  pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ValidateListingArgs {
  /// Store-listing JSON file to validate
  pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct FindDuplicatesArgs {
  /// First store-listing JSON file
  pub first: PathBuf,

  /// Second store-listing JSON file
  pub second: PathBuf,

  /// Where duplicate package names are written, one per line
  #[arg(default_value = "duplicates.txt")]
  pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct JiraNotesArgs {
  /// Jira issue id or key (e.g. PM-1234)
  pub issue: String,

  /// Jira account email for basic auth (falls back to JIRA_EMAIL)
  #[arg(long)]
  pub email: Option<String>,

  /// Jira API token for basic auth (falls back to JIRA_API_TOKEN)
  #[arg(long)]
  pub token: Option<String>,

  /// Jira instance base URL
  #[arg(long, default_value = "https://bitwarden.atlassian.net")]
  pub base_url: String,

  /// Custom field holding the release notes
  #[arg(long, default_value = jira::RELEASE_NOTES_FIELD)]
  pub field: String,
}

impl JiraNotesArgs {
  /// Resolve credentials from flags first, then the conventional env vars.
  pub fn credentials(&self) -> Result<(String, String)> {
    let Some(email) = self.email.clone().or_else(|| env_nonempty("JIRA_EMAIL")) else {
      bail!("missing Jira email: pass --email or set JIRA_EMAIL")
    };
    let Some(token) = self.token.clone().or_else(|| env_nonempty("JIRA_API_TOKEN")) else {
      bail!("missing Jira API token: pass --token or set JIRA_API_TOKEN")
    };

    Ok((email, token))
  }
}

fn env_nonempty(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

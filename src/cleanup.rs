//! Line cleanup for release notes: strips Jira ticket prefixes, conventional
//! commit prefixes, and backport markers, then normalizes whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_BRACKET_TICKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[A-Z]+-\d+\]").unwrap());
static RE_COLON_TICKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]+-\d+:\s").unwrap());
static RE_DASH_TICKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]+-\d+\s-\s").unwrap());

static RE_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
  [
    "🍒",
    "BACKPORT",
    r"\[deps\]:",
    r"feat(?:\([^)]*\))?:",
    r"bug(?:\([^)]*\))?:",
    r"ci(?:\([^)]*\))?:",
  ]
  .iter()
  .map(|p| Regex::new(p).unwrap())
  .collect()
});

static RE_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip ticket references and noise prefixes from a notes line, collapsing
/// any whitespace runs the removals leave behind. Prints a before/after trace
/// when the line actually changed.
pub fn clean_line(line: &str) -> String {
  let original = line.trim();

  let mut cleaned = RE_BRACKET_TICKET.replace_all(original, "").into_owned();
  cleaned = RE_COLON_TICKET.replace_all(&cleaned, "").into_owned();
  cleaned = RE_DASH_TICKET.replace_all(&cleaned, "").into_owned();
  for pattern in RE_NOISE.iter() {
    cleaned = pattern.replace_all(&cleaned, "").into_owned();
  }
  cleaned = RE_SPACE_RUN.replace_all(cleaned.trim(), " ").into_owned();

  if cleaned != original {
    println!("Processed: {} -> {}", original, cleaned);
  }
  cleaned
}

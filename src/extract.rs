//! Pattern extraction over release-notes text: Jira ticket keys, PR number
//! references, and GitHub pull request URLs.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static RE_JIRA_TICKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]+-\d+").unwrap());
static RE_PR_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\d+)").unwrap());
static RE_PR_URL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"https://github\.com/[\w-]+/[\w.-]+/pull/\d+").unwrap());
static RE_PR_URL_REPO: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"https://github\.com/([\w-]+)/([\w.-]+)/pull/\d+").unwrap());
static RE_PULL_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"/pull/(\d+)").unwrap());

/// All Jira ticket keys (`ABC-123`) in `text`, in order of appearance.
pub fn jira_tickets(text: &str) -> Vec<String> {
  RE_JIRA_TICKET.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// All `#1234`-style PR number references in `text`, digits only.
pub fn pr_numbers(text: &str) -> Vec<String> {
  RE_PR_NUMBER.captures_iter(text).map(|c| c[1].to_string()).collect()
}

/// All GitHub pull request URLs in `text`.
pub fn pr_urls(text: &str) -> Vec<String> {
  RE_PR_URL.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// The PR number at the end of a pull request URL, as a digit string.
pub fn pr_number_from_url(url: &str) -> Option<String> {
  RE_PULL_NUMBER.captures(url).map(|c| c[1].to_string())
}

/// The `(owner, name)` pair embedded in a pull request URL.
pub fn repo_from_pr_url(url: &str) -> Option<(String, String)> {
  RE_PR_URL_REPO
    .captures(url)
    .map(|c| (c[1].to_string(), c[2].to_string()))
}

/// All `/pull/<n>` numbers in `text` as integers, in order of appearance.
pub fn pull_numbers(text: &str) -> Vec<i64> {
  RE_PULL_NUMBER
    .captures_iter(text)
    .filter_map(|c| c[1].parse::<i64>().ok())
    .collect()
}

/// Drop repeated items, keeping the first occurrence of each.
pub fn dedup_preserve_order(items: Vec<String>) -> Vec<String> {
  let mut seen = HashSet::new();
  items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn finds_jira_tickets_in_order() {
    let cases: [(&str, &[&str]); 6] = [
      ("[ABC-123] Some text", &["ABC-123"]),
      ("DEF-456: Some text", &["DEF-456"]),
      ("GHI-789 - Some text", &["GHI-789"]),
      ("Multiple [ABC-123] and DEF-456: tickets", &["ABC-123", "DEF-456"]),
      ("No tickets here", &[]),
      ("Mixed formats ABC-123 [DEF-456] GHI-789:", &["ABC-123", "DEF-456", "GHI-789"]),
    ];
    for (input, expected) in cases {
      assert_eq!(jira_tickets(input), expected, "input: {input:?}");
    }
  }

  #[test]
  fn ignores_lowercase_ticket_like_text() {
    assert_eq!(jira_tickets("abc-123 is not a ticket"), Vec::<String>::new());
  }

  #[test]
  fn finds_hash_pr_numbers() {
    let cases: [(&str, &[&str]); 4] = [
      ("Feature 1 #123", &["123"]),
      ("PR #456 and #789", &["456", "789"]),
      ("Plain #5 follow-up", &["5"]),
      ("No PR numbers here", &[]),
    ];
    for (input, expected) in cases {
      assert_eq!(pr_numbers(input), expected, "input: {input:?}");
    }
  }

  #[test]
  fn finds_pr_urls() {
    let text = "see https://github.com/bitwarden/android/pull/120 and https://github.com/acme/repo.name/pull/7";
    assert_eq!(
      pr_urls(text),
      vec![
        "https://github.com/bitwarden/android/pull/120",
        "https://github.com/acme/repo.name/pull/7",
      ]
    );
    assert_eq!(pr_urls("* No PR URL here"), Vec::<String>::new());
  }

  #[test]
  fn extracts_number_from_pr_url() {
    assert_eq!(
      pr_number_from_url("https://github.com/bitwarden/android/pull/120"),
      Some("120".to_string())
    );
    assert_eq!(pr_number_from_url("https://github.com/bitwarden/android"), None);
  }

  #[test]
  fn extracts_repo_from_pr_url() {
    assert_eq!(
      repo_from_pr_url("https://github.com/bitwarden/android/pull/120"),
      Some(("bitwarden".to_string(), "android".to_string()))
    );
    assert_eq!(repo_from_pr_url("https://example.com/pull/1"), None);
  }

  #[test]
  fn pull_numbers_parses_all_occurrences() {
    let body = "* https://github.com/o/r/pull/11\n* https://github.com/o/r/pull/22 and /pull/11";
    assert_eq!(pull_numbers(body), vec![11, 22, 11]);
  }

  #[test]
  fn dedup_keeps_first_occurrence() {
    let items = vec!["b".to_string(), "a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(dedup_preserve_order(items), vec!["b", "a", "c"]);
  }

  proptest! {
    #[test]
    fn dedup_is_idempotent(items in proptest::collection::vec("[a-z]{1,3}", 0..20)) {
      let once = dedup_preserve_order(items);
      let twice = dedup_preserve_order(once.clone());
      prop_assert_eq!(once, twice);
    }
  }
}

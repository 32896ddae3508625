// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Cross-reference a release's PRs to their closing issues and comment each issue with the released PRs
// role: github/cross-reference
// inputs: Release URL; release body via GithubApi; batched closing-issue links
// outputs: Issue comments (or printed previews in dry-run mode)
// side_effects: Posts issue comments through GithubApi unless dry_run is set
// invariants:
// - PR numbers are deduplicated in order of first appearance before batching
// - Issues are visited in ascending number order; PR order inside a comment follows the notes
// - Issues with an empty comment are never posted to
// errors: URL parse and release fetch failures abort; batch link failures degrade to no links
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract;
use crate::github::api::GithubApi;

static RE_RELEASE_URL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"github\.com/([\w-]+)/([\w.-]+)/releases/tag/(.+)$").unwrap());

/// Owner, repo name, and tag parsed from a GitHub release URL.
#[derive(Debug, PartialEq, Eq)]
pub struct ReleaseRef {
  pub owner: String,
  pub name: String,
  pub tag: String,
}

impl ReleaseRef {
  pub fn repo(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }
}

pub fn parse_release_url(url: &str) -> Result<ReleaseRef> {
  let Some(caps) = RE_RELEASE_URL.captures(url) else {
    bail!("cannot parse release URL: {}", url);
  };

  Ok(ReleaseRef {
    owner: caps[1].to_string(),
    name: caps[2].to_string(),
    tag: caps[3].to_string(),
  })
}

/// Invert a PR -> issues map into issue -> PRs, ordered by issue number.
/// PR order inside each issue entry follows `numbers`.
pub fn map_issues_to_prs(numbers: &[i64], pr_issues: &HashMap<i64, Vec<i64>>) -> BTreeMap<i64, Vec<i64>> {
  let mut by_issue: BTreeMap<i64, Vec<i64>> = BTreeMap::new();

  for number in numbers {
    if let Some(issues) = pr_issues.get(number) {
      for issue in issues {
        by_issue.entry(*issue).or_default().push(*number);
      }
    }
  }

  by_issue
}

pub fn build_issue_comment(repo: &str, release_name: &str, release_link: &str, prs: &[i64]) -> String {
  if prs.is_empty() {
    return String::new();
  }

  let links = prs
    .iter()
    .map(|n| format!("* https://github.com/{}/pull/{}", repo, n))
    .collect::<Vec<_>>()
    .join("\n");

  format!(
    ":shipit: Pull Request(s) linked to this issue released in [{}]({}):\n\n{}",
    release_name, release_link, links
  )
}

pub fn run(api: &dyn GithubApi, release_url: &str, dry_run: bool) -> Result<()> {
  let release_ref = parse_release_url(release_url)?;
  let repo = release_ref.repo();
  println!("📋 Release URL: {}", release_url);

  let release = api.release_view(&repo, &release_ref.tag)?;
  println!("📋 Release Name: {}", release.name);

  let mut seen = HashSet::new();
  let numbers: Vec<i64> = extract::pull_numbers(&release.body)
    .into_iter()
    .filter(|n| seen.insert(*n))
    .collect();
  println!("📋 PR Numbers parsed from release notes: {:?}\n", numbers);

  let pr_issues = api.closing_issues_batched(&release_ref.owner, &release_ref.name, &numbers);
  let issue_prs = map_issues_to_prs(&numbers, &pr_issues);

  let prefix = if dry_run { "Dry run - " } else { "" };

  for (issue, prs) in &issue_prs {
    let comment = build_issue_comment(&repo, &release.name, release_url, prs);
    println!("{}Commenting on issue {}:\n{}\n", prefix, issue, comment);

    if !dry_run && !comment.is_empty() {
      api.comment_issue(&repo, *issue, &comment)?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::ReleaseInfo;
  use std::cell::RefCell;

  #[test]
  fn parses_release_url_parts() {
    let parsed = parse_release_url("https://github.com/bitwarden/android/releases/tag/v2025.1.0").unwrap();
    assert_eq!(parsed.owner, "bitwarden");
    assert_eq!(parsed.name, "android");
    assert_eq!(parsed.tag, "v2025.1.0");
    assert_eq!(parsed.repo(), "bitwarden/android");
  }

  #[test]
  fn rejects_non_release_urls() {
    let err = parse_release_url("https://github.com/bitwarden/android/pull/42").unwrap_err();
    assert!(err.to_string().contains("cannot parse release URL"));
  }

  #[test]
  fn comment_lists_released_prs() {
    let comment = build_issue_comment("o/r", "Big Release", "https://github.com/o/r/releases/tag/v1", &[11, 22]);
    assert_eq!(
      comment,
      ":shipit: Pull Request(s) linked to this issue released in [Big Release](https://github.com/o/r/releases/tag/v1):\n\n* https://github.com/o/r/pull/11\n* https://github.com/o/r/pull/22"
    );
  }

  #[test]
  fn comment_is_empty_without_prs() {
    assert_eq!(build_issue_comment("o/r", "Name", "link", &[]), "");
  }

  #[test]
  fn inversion_orders_issues_and_keeps_pr_order() {
    let mut pr_issues = HashMap::new();
    pr_issues.insert(22, vec![5]);
    pr_issues.insert(11, vec![5, 3]);

    let inverted = map_issues_to_prs(&[22, 11], &pr_issues);
    let issues: Vec<i64> = inverted.keys().copied().collect();
    assert_eq!(issues, vec![3, 5]);
    assert_eq!(inverted[&3], vec![11]);
    assert_eq!(inverted[&5], vec![22, 11]);
  }

  struct FakeApi {
    comments: RefCell<Vec<(i64, String)>>,
  }

  impl GithubApi for FakeApi {
    fn release_view(&self, _repo: &str, _tag: &str) -> Result<ReleaseInfo> {
      Ok(ReleaseInfo {
        name: "Test Release".to_string(),
        body: "* https://github.com/o/r/pull/11\n* https://github.com/o/r/pull/22\n* https://github.com/o/r/pull/11"
          .to_string(),
      })
    }
    fn pr_labels(&self, _pr_url: &str) -> Result<Vec<String>> {
      unimplemented!()
    }
    fn pr_labels_batched(
      &self,
      _owner: &str,
      _name: &str,
      _numbers: &[String],
    ) -> std::collections::HashMap<String, Vec<String>> {
      unimplemented!()
    }
    fn closing_issues_batched(&self, _owner: &str, _name: &str, numbers: &[i64]) -> HashMap<i64, Vec<i64>> {
      assert_eq!(numbers, &[11, 22]);
      let mut map = HashMap::new();
      map.insert(11, vec![101]);
      map.insert(22, Vec::new());
      map
    }
    fn pr_title(&self, _number: i64) -> Result<String> {
      unimplemented!()
    }
    fn pr_changed_files(&self, _number: i64) -> Result<Vec<String>> {
      unimplemented!()
    }
    fn add_labels(&self, _number: i64, _labels: &[String]) -> Result<()> {
      unimplemented!()
    }
    fn replace_labels(&self, _number: i64, _labels: &[String]) -> Result<()> {
      unimplemented!()
    }
    fn comment_issue(&self, _repo: &str, issue_number: i64, body: &str) -> Result<()> {
      self.comments.borrow_mut().push((issue_number, body.to_string()));
      Ok(())
    }
  }

  #[test]
  fn run_comments_each_linked_issue_once() {
    let api = FakeApi { comments: RefCell::new(Vec::new()) };
    run(&api, "https://github.com/o/r/releases/tag/v1", false).unwrap();

    let comments = api.comments.borrow();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].0, 101);
    assert!(comments[0].1.contains("* https://github.com/o/r/pull/11"));
    assert!(!comments[0].1.contains("pull/22"));
  }

  #[test]
  fn dry_run_posts_nothing() {
    let api = FakeApi { comments: RefCell::new(Vec::new()) };
    run(&api, "https://github.com/o/r/releases/tag/v1", true).unwrap();
    assert!(api.comments.borrow().is_empty());
  }
}

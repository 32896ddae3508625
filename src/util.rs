// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for gh subprocess invocation, artifact writing, and man page rendering
// role: utilities/helpers
// inputs: Argument lists for `gh`; line-oriented artifact content; clap CommandFactory
// outputs: Captured stdout from gh; artifact files on disk; man page text
// side_effects: run_gh/run_gh_stdin spawn subprocesses; write_lines writes files
// invariants:
// - run_gh surfaces non-zero exits as errors carrying stderr
// - write_lines joins items with newlines and never reorders them
// errors: subprocess and IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use clap::CommandFactory;

pub fn run_gh(args: &[&str]) -> Result<String> {
  let out = Command::new("gh")
    .args(args)
    .output()
    .with_context(|| format!("spawning gh {:?}", args))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("gh {:?} failed: {}", args, stderr)
  }
}

/// Like `run_gh`, but feeds `input` to the child's stdin (for `--input -` calls).
pub fn run_gh_stdin(args: &[&str], input: &str) -> Result<String> {
  let mut child = Command::new("gh")
    .args(args)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .with_context(|| format!("spawning gh {:?}", args))?;

  child
    .stdin
    .take()
    .context("opening gh stdin")?
    .write_all(input.as_bytes())
    .context("writing gh stdin")?;

  let out = child
    .wait_with_output()
    .with_context(|| format!("waiting for gh {:?}", args))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("gh {:?} failed: {}", args, stderr)
  }
}

/// Write items to `path`, one per line.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
  let joined = lines.iter().map(|l| l.as_ref()).collect::<Vec<_>>().join("\n");
  std::fs::write(path, joined).with_context(|| format!("writing {}", path.display()))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}

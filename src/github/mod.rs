// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for GitHub integrations (gh CLI calls, release-to-issue cross-referencing)
// role: github/namespace
// outputs: Public submodules implementing specific GitHub operations
// invariants: Each submodule isolates external integrations behind the GithubApi seam
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod linked_issues;

use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub fn bin() -> assert_cmd::Command {
  assert_cmd::Command::cargo_bin("release-pilot").unwrap()
}

#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
  let path = dir.join(name);
  std::fs::write(&path, content).unwrap();
  path
}

#[allow(dead_code)]
pub fn read(path: &Path) -> String {
  std::fs::read_to_string(path).unwrap()
}

/// A minimal store-listing document with the given package names.
#[allow(dead_code)]
pub fn listing_json(packages: &[&str]) -> String {
  let apps: Vec<serde_json::Value> = packages
    .iter()
    .map(|p| serde_json::json!({"info": {"package_name": p}}))
    .collect();

  serde_json::json!({ "apps": apps }).to_string()
}

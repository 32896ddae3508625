// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch a Jira issue over the v3 REST API and flatten its rich-text release-notes field to plain text
// role: jira/client
// inputs: Issue id, basic-auth credentials, base URL, custom field name
// outputs: Release notes text on stdout; troubleshooting diagnostics on stderr
// side_effects: One HTTP GET against the Jira instance
// invariants:
// - Parse fallbacks return empty notes instead of failing the run
// - Diagnostics list the customfield_* candidates whenever the configured field is unusable
// errors: Non-2xx responses abort with the status code and response body
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, bail};
use base64::{Engine, prelude::BASE64_STANDARD};

pub const RELEASE_NOTES_FIELD: &str = "customfield_10309";

const LOG_PREFIX: &str = "[jira-notes]";

pub struct JiraClient {
  base_url: String,
  auth: String,
}

impl JiraClient {
  pub fn new(base_url: &str, email: &str, token: &str) -> Self {
    let auth = BASE64_STANDARD.encode(format!("{}:{}", email, token));

    Self { base_url: base_url.trim_end_matches('/').to_string(), auth }
  }

  /// GET one issue from the v3 REST API as raw JSON.
  pub fn fetch_issue(&self, issue_id: &str) -> Result<serde_json::Value> {
    let url = format!("{}/rest/api/3/issue/{}", self.base_url, issue_id);
    let resp = ureq::get(&url)
      .set("Authorization", &format!("Basic {}", self.auth))
      .set("Content-Type", "application/json")
      .call();

    match resp {
      Ok(resp) => resp.into_json::<serde_json::Value>().context("decoding Jira response"),
      Err(ureq::Error::Status(code, resp)) => {
        let body = resp.into_string().unwrap_or_default();
        bail!("Error fetching Jira issue ({}). Status code: {}. Msg: {}", issue_id, code, body)
      }
      Err(err) => Err(err).with_context(|| format!("requesting {}", url)),
    }
  }
}

/// Flatten Jira rich-text document nodes to plain text. Lists join their
/// non-blank children with newlines; list items render as `* ` bullets.
pub fn extract_text(node: &serde_json::Value) -> String {
  if let Some(items) = node.as_array() {
    let texts: Vec<String> = items.iter().map(extract_text).collect();

    return texts.into_iter().filter(|t| !t.trim().is_empty()).collect::<Vec<_>>().join("\n");
  }

  match node.get("type").and_then(|v| v.as_str()) {
    Some("text") => node.get("text").and_then(|v| v.as_str()).unwrap_or("").to_string(),
    Some("paragraph") | Some("bulletList") => match node.get("content") {
      Some(content) => extract_text(content),
      None => String::new(),
    },
    Some("listItem") => {
      let item = match node.get("content") {
        Some(content) => extract_text(content),
        None => String::new(),
      };

      format!("* {}", item.trim())
    }
    _ => String::new(),
  }
}

fn log_customfields_with_content(fields: &serde_json::Map<String, serde_json::Value>) {
  eprintln!("{} Available customfield_* fields with 'content':", LOG_PREFIX);
  let mut found = false;

  for (key, value) in fields {
    if key.starts_with("customfield_") && value.get("content").is_some() {
      found = true;
      let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
      eprintln!("{}   {}: {}", LOG_PREFIX, key, pretty);
    }
  }

  if !found {
    eprintln!("{}   None found", LOG_PREFIX);
  }
}

/// Pull the release notes text out of an issue, or empty text with a stderr
/// diagnostic when the field is missing or unusable.
pub fn release_notes_from_issue(issue: &serde_json::Value, field_name: &str) -> String {
  let fields = match issue.get("fields").and_then(|v| v.as_object()).filter(|m| !m.is_empty()) {
    Some(fields) => fields,
    None => {
      eprintln!("{} 'fields' is empty or missing in response", LOG_PREFIX);
      return String::new();
    }
  };

  let field = match fields.get(field_name).filter(|v| !v.is_null()) {
    Some(field) => field,
    None => {
      eprintln!("{} Release notes field is empty or missing. Field name: {}", LOG_PREFIX, field_name);
      log_customfields_with_content(fields);
      return String::new();
    }
  };

  let content = match field.get("content") {
    Some(value) if value.as_array().is_some_and(|a| !a.is_empty()) => value,
    _ => {
      eprintln!(
        "{} Release notes field was found but 'content' is empty or missing in {}",
        LOG_PREFIX, field_name
      );
      log_customfields_with_content(fields);
      return String::new();
    }
  };

  extract_text(content)
}

pub fn run(issue_id: &str, email: &str, token: &str, base_url: &str, field: &str) -> Result<()> {
  let client = JiraClient::new(base_url, email, token);
  let issue = client.fetch_issue(issue_id)?;
  let notes = release_notes_from_issue(&issue, field);
  println!("{}", notes);

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::io::{Read, Write};

  #[test]
  fn extracts_paragraphs_and_bullets() {
    let doc = json!([
      {"type": "paragraph", "content": [{"type": "text", "text": "Intro line"}]},
      {"type": "bulletList", "content": [
        {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": " First fix "}]}]},
        {"type": "listItem", "content": [{"type": "text", "text": "Second fix"}]}
      ]}
    ]);
    assert_eq!(extract_text(&doc), "Intro line\n* First fix\n* Second fix");
  }

  #[test]
  fn unknown_nodes_contribute_nothing() {
    let doc = json!([
      {"type": "rule"},
      {"type": "text", "text": "kept"},
      {"type": "mediaGroup", "content": []}
    ]);
    assert_eq!(extract_text(&doc), "kept");
  }

  #[test]
  fn blank_texts_are_dropped_from_joins() {
    let doc = json!([
      {"type": "text", "text": "   "},
      {"type": "text", "text": "real"}
    ]);
    assert_eq!(extract_text(&doc), "real");
  }

  #[test]
  fn missing_pieces_yield_empty_notes() {
    assert_eq!(release_notes_from_issue(&json!({}), RELEASE_NOTES_FIELD), "");
    assert_eq!(release_notes_from_issue(&json!({"fields": {}}), RELEASE_NOTES_FIELD), "");

    let no_field = json!({"fields": {"summary": "x"}});
    assert_eq!(release_notes_from_issue(&no_field, RELEASE_NOTES_FIELD), "");

    let empty_content = json!({"fields": {"customfield_10309": {"type": "doc", "content": []}}});
    assert_eq!(release_notes_from_issue(&empty_content, RELEASE_NOTES_FIELD), "");
  }

  #[test]
  fn full_issue_parses_notes() {
    let issue = json!({"fields": {"customfield_10309": {"type": "doc", "content": [
      {"type": "paragraph", "content": [{"type": "text", "text": "Fixed a thing"}]}
    ]}}});
    assert_eq!(release_notes_from_issue(&issue, RELEASE_NOTES_FIELD), "Fixed a thing");
  }

  #[test]
  fn client_normalizes_base_url() {
    let client = JiraClient::new("https://example.atlassian.net/", "a@b.c", "t");
    assert_eq!(client.base_url, "https://example.atlassian.net");
  }

  fn serve_once(status_line: &str, body: &str) -> (std::net::SocketAddr, std::thread::JoinHandle<()>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
      "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
      status_line,
      body.len(),
      body
    );
    let handle = std::thread::spawn(move || {
      let (mut stream, _) = listener.accept().unwrap();
      let mut buf = [0u8; 4096];
      let _ = stream.read(&mut buf);
      stream.write_all(response.as_bytes()).unwrap();
    });

    (addr, handle)
  }

  #[test]
  fn fetch_issue_returns_parsed_json() {
    let (addr, handle) = serve_once("200 OK", r#"{"fields": {}}"#);
    let client = JiraClient::new(&format!("http://{}", addr), "me@example.com", "token");

    let issue = client.fetch_issue("PM-1").unwrap();
    assert!(issue.get("fields").is_some());
    handle.join().unwrap();
  }

  #[test]
  fn fetch_issue_surfaces_http_errors() {
    let (addr, handle) = serve_once("404 Not Found", r#"{"errorMessages": ["no issue"]}"#);
    let client = JiraClient::new(&format!("http://{}", addr), "me@example.com", "token");

    let err = client.fetch_issue("PM-404").unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("Status code: 404"));
    assert!(msg.contains("PM-404"));
    handle.join().unwrap();
  }
}

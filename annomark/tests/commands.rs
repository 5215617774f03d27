#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::fs;

use annomark::commands::{format_document, frontmatter, parse, write_in_place};
use annomark_config::Config;
use annomark_parser::{DocumentParser, SerializeOptions};
use tempfile::tempdir;

const PAGE: &str = "---\ntitle: Home\ntags:\n  - a\n  - b\ndraft: \
                    false\n---\n\n<!-- section:hero -->\n<!-- headline \
                    -->\n# Welcome\n";

#[test]
fn test_parse_single_file_prints_tree() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let path = temp_dir.path().join("home.md");
  fs::write(&path, PAGE).expect("Failed to write page in test");

  let output = parse(&DocumentParser::default(), &[path], None, false)
    .expect("Failed to parse in test");
  let json: serde_json::Value =
    serde_json::from_str(&output).expect("Output should be JSON");

  assert_eq!(json["frontmatter"]["title"], "Home");
  assert_eq!(json["sections"][0]["name"], "hero");
  assert_eq!(
    json["sections"][0]["fields"]["headline"]["type"],
    "heading"
  );
}

#[test]
fn test_parse_directory_keys_by_path() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  fs::write(temp_dir.path().join("a.md"), PAGE)
    .expect("Failed to write a.md in test");
  fs::write(temp_dir.path().join("b.md"), "Just text.\n")
    .expect("Failed to write b.md in test");

  let output = parse(
    &DocumentParser::default(),
    &[temp_dir.path().to_path_buf()],
    Some("hero"),
    true,
  )
  .expect("Failed to parse in test");
  let json: serde_json::Value =
    serde_json::from_str(&output).expect("Output should be JSON");
  let object = json.as_object().expect("Output should be an object");

  assert_eq!(object.len(), 2);
  let values: Vec<&serde_json::Value> = object.values().collect();
  assert_eq!(values[0]["name"], "hero");
  assert!(values[1].is_null());
}

#[test]
fn test_parse_missing_file_fails() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let missing = temp_dir.path().join("missing.md");

  let result = parse(&DocumentParser::default(), &[missing], None, false);
  let message = format!("{:?}", result.expect_err("Missing file should fail"));
  assert!(message.contains("missing.md"));
}

#[test]
fn test_parse_missing_section_fails_for_single_file() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let path = temp_dir.path().join("home.md");
  fs::write(&path, PAGE).expect("Failed to write page in test");

  let result =
    parse(&DocumentParser::default(), &[path], Some("footer"), false);
  assert!(result.is_err());
}

#[test]
fn test_frontmatter_command() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let path = temp_dir.path().join("home.md");
  fs::write(&path, PAGE).expect("Failed to write page in test");

  let output = frontmatter(&DocumentParser::default(), &path, false)
    .expect("Failed to read frontmatter in test");
  assert_eq!(output, r#"{"title":"Home","tags":["a","b"],"draft":false}"#);
}

#[test]
fn test_fmt_sorts_keys_and_writes_back() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let path = temp_dir.path().join("home.md");
  fs::write(&path, PAGE).expect("Failed to write page in test");

  let formatted = format_document(
    &DocumentParser::default(),
    &path,
    SerializeOptions { sort_keys: true },
  )
  .expect("Failed to format in test");
  assert!(formatted.starts_with("---\ndraft: false\ntags:\n"));
  assert!(formatted.ends_with("# Welcome\n"));

  write_in_place(&path, &formatted).expect("Failed to write in test");
  let again = format_document(
    &DocumentParser::default(),
    &path,
    SerializeOptions { sort_keys: true },
  )
  .expect("Failed to format in test");
  assert_eq!(again, formatted);
}

#[test]
fn test_config_file_drives_parser_options() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config_path = temp_dir.path().join("annomark.toml");
  fs::write(&config_path, "smart_punctuation = true\n")
    .expect("Failed to write config in test");
  let page = temp_dir.path().join("quote.md");
  fs::write(&page, "<!-- quote -->\n\"Hello\"\n")
    .expect("Failed to write page in test");

  let config = Config::load(&[config_path], &[]).expect("Config should load");
  let parser = DocumentParser::new(config.parser_options());
  let output =
    parse(&parser, &[page], None, false).expect("Failed to parse in test");

  assert!(output.contains('\u{201c}'));
}

//! Canonical rendering of frontmatter and body back to a document.
//!
//! Output parses back to the same map for every value the scalar grammar
//! can represent: strings that would read as another type are quoted and
//! floats always carry a decimal point or exponent.
use std::fmt::Write;

use super::{FrontmatterMap, FrontmatterValue, parse_scalar};
use crate::utils::trim_leading_blank_lines;

/// Options for [`serialize_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
  /// Emit keys in lexicographic order instead of insertion order.
  pub sort_keys: bool,
}

/// Serialize with default options.
#[must_use]
pub fn serialize(frontmatter: &FrontmatterMap, body: &str) -> String {
  serialize_with(frontmatter, body, SerializeOptions::default())
}

/// Render `frontmatter` between `---` fences, followed by `body`.
///
/// An empty map produces the body alone.
#[must_use]
pub fn serialize_with(
  frontmatter: &FrontmatterMap,
  body: &str,
  options: SerializeOptions,
) -> String {
  let body = trim_leading_blank_lines(body);
  let mut out = String::new();

  if !frontmatter.is_empty() {
    let mut entries: Vec<(&String, &FrontmatterValue)> =
      frontmatter.iter().collect();
    if options.sort_keys {
      entries.sort_by(|a, b| a.0.cmp(b.0));
    }

    out.push_str("---\n");
    for (key, value) in entries {
      write_entry(&mut out, key, value);
    }
    out.push_str("---\n");
    if !body.is_empty() {
      out.push('\n');
    }
  }

  out.push_str(body);
  if !body.is_empty() && !body.ends_with('\n') {
    out.push('\n');
  }
  out
}

fn write_entry(out: &mut String, key: &str, value: &FrontmatterValue) {
  match value {
    FrontmatterValue::List(items) if !items.is_empty() => {
      let _ = writeln!(out, "{key}:");
      for item in items {
        let _ = writeln!(out, "  - {}", format_scalar(item));
      }
    },
    FrontmatterValue::List(_) => {
      let _ = writeln!(out, "{key}:");
    },
    FrontmatterValue::String(text) if text.contains('\n') => {
      let _ = writeln!(out, "{key}: |");
      for line in text.lines() {
        if line.trim().is_empty() {
          out.push('\n');
        } else {
          let _ = writeln!(out, "  {line}");
        }
      }
    },
    _ => {
      let _ = writeln!(out, "{key}: {}", format_scalar(value));
    },
  }
}

/// Format a value for a single line.
#[must_use]
pub fn format_scalar(value: &FrontmatterValue) -> String {
  match value {
    FrontmatterValue::Null => "null".to_string(),
    FrontmatterValue::Bool(flag) => flag.to_string(),
    FrontmatterValue::Integer(number) => number.to_string(),
    FrontmatterValue::Float(number) => {
      if number.is_finite() {
        // Debug formatting keeps the `.0` that Display drops
        format!("{number:?}")
      } else {
        number.to_string()
      }
    },
    FrontmatterValue::String(text) => {
      if needs_quotes(text) {
        format!("\"{text}\"")
      } else {
        text.clone()
      }
    },
    FrontmatterValue::List(items) => {
      items.iter().map(format_scalar).collect::<Vec<_>>().join(", ")
    },
  }
}

fn needs_quotes(text: &str) -> bool {
  text.is_empty()
    || text.trim() != text
    || text.starts_with(['"', '\'', '-', '#', '|', '>'])
    || parse_scalar(text) != FrontmatterValue::String(text.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Renderer, frontmatter::parse_frontmatter_map};

  fn sample() -> FrontmatterMap {
    let mut map = FrontmatterMap::new();
    map.insert("title".into(), FrontmatterValue::String("Hello".into()));
    map.insert("count".into(), FrontmatterValue::Integer(3));
    map.insert("price".into(), FrontmatterValue::Float(3.0));
    map.insert("draft".into(), FrontmatterValue::Bool(false));
    map.insert("version".into(), FrontmatterValue::String("1.0".into()));
    map.insert(
      "tags".into(),
      FrontmatterValue::List(vec![
        FrontmatterValue::String("a".into()),
        FrontmatterValue::String("true".into()),
      ]),
    );
    map.insert("missing".into(), FrontmatterValue::Null);
    map
  }

  #[test]
  fn test_serialize_layout() {
    let out = serialize(&sample(), "\n# Body\n");
    assert_eq!(
      out,
      "---\ntitle: Hello\ncount: 3\nprice: 3.0\ndraft: false\nversion: \
       \"1.0\"\ntags:\n  - a\n  - \"true\"\nmissing: null\n---\n\n# Body\n"
    );
  }

  #[test]
  fn test_serialize_sorted() {
    let out =
      serialize_with(&sample(), "", SerializeOptions { sort_keys: true });
    let keys: Vec<&str> = out
      .lines()
      .filter(|line| !line.starts_with([' ', '-']))
      .filter_map(|line| line.split(':').next())
      .collect();
    assert_eq!(keys, vec![
      "count", "draft", "missing", "price", "tags", "title", "version"
    ]);
  }

  #[test]
  fn test_empty_map_is_body_only() {
    assert_eq!(serialize(&FrontmatterMap::new(), "text"), "text\n");
  }

  #[test]
  fn test_values_survive_reparse() {
    let out = serialize(&sample(), "");
    let raw = out.trim_start_matches("---\n").trim_end_matches("---\n");
    let reparsed = parse_frontmatter_map(raw, &Renderer::default());
    assert_eq!(reparsed, sample());
  }

  #[test]
  fn test_multiline_string_is_stable() {
    let mut map = FrontmatterMap::new();
    map.insert(
      "desc".into(),
      FrontmatterValue::String(
        "line one\n\nuse \\*stars\\* and *em*\n  - indented".into(),
      ),
    );

    let out = serialize(&map, "");
    assert_eq!(
      out,
      "---\ndesc: |\n  line one\n\n  use \\*stars\\* and *em*\n    - \
       indented\n---\n"
    );
    let raw = out.trim_start_matches("---\n").trim_end_matches("---\n");
    let reparsed = parse_frontmatter_map(raw, &Renderer::default());
    assert_eq!(reparsed, map);
    assert_eq!(serialize(&reparsed, ""), out);
  }
}

use std::{
  collections::hash_map::DefaultHasher,
  hash::{Hash, Hasher},
  sync::LazyLock,
};
pub mod codeblock;

use kuchikikiki::NodeRef;
use markup5ever::local_name;
use regex::Regex;
use tendril::TendrilSink;

/// Create a regex that never matches anything.
///
/// Used as the fallback when a static pattern fails to compile, so a broken
/// pattern degrades to "no match" instead of aborting a parse.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "Empty pattern is guaranteed to compile"
    )]
    Regex::new("").expect("empty regex should always compile")
  })
}

/// Compile a static pattern, logging and degrading on failure.
pub(crate) fn static_regex(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile {name} regex: {e}\n Falling back to never matching \
       regex."
    );
    never_matching_regex()
  })
}

/// Parse an HTML fragment into a DOM whose `<body>` holds the fragment.
///
/// The explicit `<html><body>` prefix keeps leading comments inside the body
/// instead of letting the tree builder hoist them to the document node.
#[must_use]
pub fn parse_fragment(html: &str) -> NodeRef {
  kuchikikiki::parse_html()
    .one(format!("<html><head></head><body>{html}</body></html>"))
}

/// Serialize the children of `<body>` back to an HTML string.
#[must_use]
pub fn serialize_body(document: &NodeRef) -> String {
  let Ok(body) = document.select_first("body") else {
    return String::new();
  };
  body.as_node().children().map(|child| child.to_string()).collect()
}

/// Plain text of an HTML fragment.
///
/// Runs of blank lines collapse to a single blank line and the result is
/// trimmed, so block boundaries stay visible without trailing noise.
#[must_use]
pub fn html_to_text(html: &str) -> String {
  if html.trim().is_empty() {
    return String::new();
  }
  let document = parse_fragment(html);
  let raw = document
    .select_first("body")
    .map(|body| body.as_node().text_contents())
    .unwrap_or_default();
  normalize_text(&raw)
}

/// Trim trailing whitespace per line and collapse runs of blank lines.
#[must_use]
pub fn normalize_text(text: &str) -> String {
  static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| static_regex("BLANK_RUN_RE", r"\n{3,}"));

  let trimmed_lines = text
    .lines()
    .map(str::trim_end)
    .collect::<Vec<_>>()
    .join("\n");
  BLANK_RUN_RE
    .replace_all(trimmed_lines.trim(), "\n\n")
    .into_owned()
}

/// Stable hash of rendered content, used to collapse identical elements.
#[must_use]
pub fn content_hash(content: &str) -> u64 {
  let mut hasher = DefaultHasher::new();
  content.hash(&mut hasher);
  hasher.finish()
}

/// Drop leading lines that are empty or whitespace only.
#[must_use]
pub fn trim_leading_blank_lines(text: &str) -> &str {
  let mut offset = 0;
  for line in text.split_inclusive('\n') {
    if !line.trim().is_empty() {
      break;
    }
    offset += line.len();
  }
  &text[offset..]
}

/// Text of an element excluding any nested list it contains.
#[must_use]
pub fn own_text_excluding_lists(node: &NodeRef) -> String {
  let mut text = String::new();
  for child in node.children() {
    let is_list = child
      .as_element()
      .is_some_and(|el| {
        el.name.local == local_name!("ul") || el.name.local == local_name!("ol")
      });
    if !is_list {
      text.push_str(&child.text_contents());
    }
  }
  normalize_text(&text)
}

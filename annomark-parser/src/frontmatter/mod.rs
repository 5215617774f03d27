//! Frontmatter splitting and parsing.
//!
//! The dialect is a deliberately small subset of YAML: `key: value` scalars,
//! `- item` lists under a bare key, and indented multi-line blocks. Blocks
//! that are not lists are rendered as inline Markdown and flattened to plain
//! text, so emphasis in a description degrades to its text. A block opened
//! with `|` is the exception and keeps its dedented text as written.
//!
//! Everything is fail-open: lines that do not fit the grammar are skipped
//! and an unclosed fence means the document has no frontmatter at all.
pub mod serialize;

use std::sync::LazyLock;

use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde::Serialize;

pub use self::serialize::{SerializeOptions, serialize, serialize_with};
use crate::{
  render::Renderer,
  utils::{static_regex, trim_leading_blank_lines},
};

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
  static_regex("KEY_RE", r"^([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*:(?:\s+(.*))?$")
});
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
  static_regex(
    "NUMBER_RE",
    r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$",
  )
});

/// Ordered `key -> value` map of parsed frontmatter.
pub type FrontmatterMap = IndexMap<String, FrontmatterValue>;

/// A scalar or list value from frontmatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
  Null,
  Bool(bool),
  Integer(i64),
  Float(f64),
  String(String),
  List(Vec<FrontmatterValue>),
}

impl FrontmatterValue {
  #[must_use]
  pub const fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }

  #[must_use]
  pub const fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(value) => Some(*value),
      _ => None,
    }
  }

  #[must_use]
  pub const fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(value) => Some(*value),
      _ => None,
    }
  }

  /// Numeric value; integers widen to `f64`.
  #[must_use]
  #[allow(
    clippy::cast_precision_loss,
    reason = "Frontmatter integers are small in practice"
  )]
  pub const fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Float(value) => Some(*value),
      Self::Integer(value) => Some(*value as f64),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(value) => Some(value.as_str()),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_list(&self) -> Option<&[Self]> {
    match self {
      Self::List(items) => Some(items.as_slice()),
      _ => None,
    }
  }
}

/// Frontmatter attached to a [`ContentTree`](crate::ContentTree).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Frontmatter {
  /// At least one `key: value` line was understood.
  Map(FrontmatterMap),
  /// The fenced block had content, but no line of it was a key.
  Raw(String),
}

impl Frontmatter {
  #[must_use]
  pub const fn as_map(&self) -> Option<&FrontmatterMap> {
    match self {
      Self::Map(map) => Some(map),
      Self::Raw(_) => None,
    }
  }

  #[must_use]
  pub fn as_raw(&self) -> Option<&str> {
    match self {
      Self::Raw(raw) => Some(raw.as_str()),
      Self::Map(_) => None,
    }
  }

  /// Value for `key`; always `None` for raw frontmatter.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
    self.as_map().and_then(|map| map.get(key))
  }
}

/// Split a document into its raw frontmatter block and its body.
///
/// A leading byte-order mark is dropped and leading blank lines of the body
/// are trimmed. Without a closed `---` fence the whole text is body.
#[must_use]
pub fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);

  let mut lines = text.split_inclusive('\n');
  let Some(first) = lines.next() else {
    return (None, text);
  };
  if first.trim_end() != "---" {
    return (None, trim_leading_blank_lines(text));
  }

  let block_start = first.len();
  let mut offset = block_start;
  for line in lines {
    if line.trim() == "---" {
      let raw = &text[block_start..offset];
      let body = &text[offset + line.len()..];
      return (Some(raw), trim_leading_blank_lines(body));
    }
    offset += line.len();
  }

  debug!("Frontmatter fence is never closed, treating document as body");
  (None, trim_leading_blank_lines(text))
}

/// Parse the content of a fenced frontmatter block.
#[must_use]
pub fn parse_frontmatter(raw: &str, renderer: &Renderer) -> Frontmatter {
  let map = parse_frontmatter_map(raw, renderer);
  if map.is_empty() && !raw.trim().is_empty() {
    debug!("Frontmatter has no key lines, keeping it raw");
    return Frontmatter::Raw(raw.to_string());
  }
  Frontmatter::Map(map)
}

/// Parse `key: value` lines into a map, skipping anything malformed.
#[must_use]
pub fn parse_frontmatter_map(raw: &str, renderer: &Renderer) -> FrontmatterMap {
  let lines: Vec<&str> = raw.lines().collect();
  let mut map = FrontmatterMap::new();
  let mut i = 0;

  while i < lines.len() {
    let line = lines[i];
    i += 1;

    if line.trim().is_empty() || line.starts_with('#') {
      continue;
    }
    if is_indented(line) {
      debug!("Skipping stray indented frontmatter line: {line:?}");
      continue;
    }
    let Some(caps) = KEY_RE.captures(line.trim_end()) else {
      debug!("Skipping malformed frontmatter line: {line:?}");
      continue;
    };

    let key = caps[1].to_string();
    let inline = caps.get(2).map_or("", |m| m.as_str().trim());
    if !inline.is_empty() && !is_block_indicator(inline) {
      map.insert(key, parse_scalar(inline));
      continue;
    }

    let block_start = i;
    while i < lines.len() && is_continuation(lines[i]) {
      i += 1;
    }
    let value = resolve_block(
      &lines[block_start..i],
      BlockStyle::from_indicator(inline),
      renderer,
    );
    map.insert(key, value);
  }

  map
}

/// Parse a single scalar token.
///
/// `true`/`false`/`null` are matched case-insensitively, numbers become
/// integers unless they carry a decimal point, and a token fully wrapped in
/// matching quotes is unwrapped. Anything else is the trimmed string.
#[must_use]
pub fn parse_scalar(token: &str) -> FrontmatterValue {
  let token = token.trim();

  if token.eq_ignore_ascii_case("true") {
    return FrontmatterValue::Bool(true);
  }
  if token.eq_ignore_ascii_case("false") {
    return FrontmatterValue::Bool(false);
  }
  if token.eq_ignore_ascii_case("null") {
    return FrontmatterValue::Null;
  }

  if NUMBER_RE.is_match(token) {
    if let Some(number) = parse_number(token) {
      return number;
    }
  }

  if let Some(inner) = unquote(token) {
    return FrontmatterValue::String(inner.to_string());
  }

  FrontmatterValue::String(token.to_string())
}

#[allow(
  clippy::cast_possible_truncation,
  reason = "Range is checked before casting"
)]
fn parse_number(token: &str) -> Option<FrontmatterValue> {
  if token.contains('.') {
    return token.parse::<f64>().ok().map(FrontmatterValue::Float);
  }
  if let Ok(value) = token.parse::<i64>() {
    return Some(FrontmatterValue::Integer(value));
  }

  // Exponent forms such as `1e3`
  let value = token.parse::<f64>().ok()?;
  if value.is_finite()
    && value.fract() == 0.0
    && value.abs() < 9_007_199_254_740_992.0
  {
    Some(FrontmatterValue::Integer(value as i64))
  } else {
    Some(FrontmatterValue::Float(value))
  }
}

fn unquote(token: &str) -> Option<&str> {
  ['"', '\'']
    .into_iter()
    .find_map(|quote| token.strip_prefix(quote)?.strip_suffix(quote))
}

fn is_indented(line: &str) -> bool {
  line.starts_with([' ', '\t'])
}

fn is_list_item(line: &str) -> bool {
  let trimmed = line.trim();
  trimmed == "-" || trimmed.starts_with("- ")
}

/// Lines belonging to the value of a bare key.
fn is_continuation(line: &str) -> bool {
  line.trim().is_empty() || is_indented(line) || is_list_item(line)
}

fn is_block_indicator(value: &str) -> bool {
  matches!(value, "|" | ">" | "|-" | ">-" | "|+" | ">+")
}

fn list_item_value(line: &str) -> FrontmatterValue {
  let item = line.trim().trim_start_matches('-');
  if item.trim().is_empty() {
    FrontmatterValue::Null
  } else {
    parse_scalar(item)
  }
}

/// How a block value under a bare key is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockStyle {
  /// No indicator: a list when every line is an item, otherwise Markdown.
  Plain,
  /// `|`: the dedented text is kept as written.
  Literal,
  /// `>`: rendered as Markdown and flattened, never a list.
  Folded,
}

impl BlockStyle {
  fn from_indicator(indicator: &str) -> Self {
    if indicator.starts_with('|') {
      Self::Literal
    } else if indicator.starts_with('>') {
      Self::Folded
    } else {
      Self::Plain
    }
  }
}

/// Width of the leading ASCII indentation of a line, in bytes.
fn indent_width(line: &str) -> usize {
  line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Resolve the lines collected under a bare key.
fn resolve_block(
  lines: &[&str],
  mut style: BlockStyle,
  renderer: &Renderer,
) -> FrontmatterValue {
  // Blank lines before the next key belong to neither value
  let end = lines
    .iter()
    .rposition(|line| !line.trim().is_empty())
    .map_or(0, |last| last + 1);
  let lines = &lines[..end];
  if lines.is_empty() {
    return FrontmatterValue::Null;
  }

  // Only ASCII indentation is stripped, so the cut is a char boundary
  let indent = lines
    .iter()
    .filter(|line| !line.trim().is_empty())
    .map(|line| indent_width(line))
    .min()
    .unwrap_or(0);
  let mut dedented: Vec<&str> = lines
    .iter()
    .map(|line| {
      if line.trim().is_empty() {
        ""
      } else {
        line.get(indent..).unwrap_or_else(|| line.trim_start())
      }
    })
    .collect();

  if style == BlockStyle::Plain
    && let Some(first) = dedented.first()
    && matches!(first.trim(), "|" | ">")
  {
    style = BlockStyle::from_indicator(first.trim());
    dedented.remove(0);
  }

  if style == BlockStyle::Literal {
    let text = dedented.join("\n");
    return if text.trim().is_empty() {
      FrontmatterValue::Null
    } else {
      FrontmatterValue::String(text)
    };
  }

  let items: Vec<&str> = dedented
    .iter()
    .copied()
    .filter(|line| !line.trim().is_empty())
    .collect();
  if style == BlockStyle::Plain
    && !items.is_empty()
    && items.iter().all(|line| is_list_item(line))
  {
    return FrontmatterValue::List(
      items.into_iter().map(list_item_value).collect(),
    );
  }

  let text = renderer.render_text(&dedented.join("\n"));
  if text.is_empty() {
    FrontmatterValue::Null
  } else {
    FrontmatterValue::String(text)
  }
}

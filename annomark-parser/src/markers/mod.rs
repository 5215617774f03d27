//! Annotation marker scanning and classification.
//!
//! Markers are HTML comments whose trimmed content follows a small grammar:
//!
//! | Comment                  | Marker                         |
//! |--------------------------|--------------------------------|
//! | `<!-- NAME -->`          | field opener                   |
//! | `<!-- NAME... -->`       | container field opener         |
//! | `<!-- /NAME -->`         | named field closer             |
//! | `<!-- / -->`             | closes the innermost open field|
//! | `<!-- sub:NAME -->`      | subsection opener              |
//! | `<!-- /sub -->`          | subsection closer              |
//! | `<!-- /sub:NAME -->`     | named subsection closer        |
//! | `<!-- section -->`       | unnamed section                |
//! | `<!-- section:NAME -->`  | named section                  |
//!
//! `NAME` is `[A-Za-z0-9_-]+`. Any other comment is ordinary content.
pub mod ranges;

use std::{ops::Range, sync::LazyLock};

use log::trace;
use regex::Regex;

pub use self::ranges::{MarkerRange, RangeEvent, resolve_ranges};
use crate::utils::{codeblock::fenced_code_ranges, static_regex};

static COMMENT_RE: LazyLock<Regex> =
  LazyLock::new(|| static_regex("COMMENT_RE", r"(?s)<!--(.*?)-->"));
static FIELD_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
  static_regex("FIELD_OPEN_RE", r"^([A-Za-z0-9_-]+)(\.\.\.)?$")
});
static FIELD_CLOSE_RE: LazyLock<Regex> =
  LazyLock::new(|| static_regex("FIELD_CLOSE_RE", r"^/([A-Za-z0-9_-]+)$"));
static SUB_OPEN_RE: LazyLock<Regex> =
  LazyLock::new(|| static_regex("SUB_OPEN_RE", r"^sub:([A-Za-z0-9_-]+)$"));
static SUB_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
  static_regex("SUB_CLOSE_RE", r"^/sub(?::([A-Za-z0-9_-]+))?$")
});
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
  static_regex("SECTION_RE", r"^section(?::([A-Za-z0-9_-]+))?$")
});

/// What a marker comment asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
  FieldOpen { name: String, container: bool },
  FieldClose { name: String },
  UniversalClose,
  SubsectionOpen { name: String },
  SubsectionClose { name: Option<String> },
  Section { name: Option<String> },
}

/// A classified marker and the byte span of its whole comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
  pub kind: MarkerKind,
  pub span: Range<usize>,
}

impl Marker {
  #[must_use]
  pub const fn start(&self) -> usize {
    self.span.start
  }

  #[must_use]
  pub const fn end(&self) -> usize {
    self.span.end
  }

  /// Translate this marker into an event for the field range resolver.
  #[must_use]
  pub fn field_event(&self) -> Option<RangeEvent> {
    match &self.kind {
      MarkerKind::FieldOpen { name, container } => {
        Some(RangeEvent::Open {
          name:      name.clone(),
          container: *container,
          span:      self.span.clone(),
        })
      },
      MarkerKind::FieldClose { name } => {
        Some(RangeEvent::Close {
          name: Some(name.clone()),
          span: self.span.clone(),
        })
      },
      MarkerKind::UniversalClose => {
        Some(RangeEvent::Close {
          name: None,
          span: self.span.clone(),
        })
      },
      _ => None,
    }
  }

  /// Translate this marker into an event for the subsection range resolver.
  #[must_use]
  pub fn subsection_event(&self) -> Option<RangeEvent> {
    match &self.kind {
      MarkerKind::SubsectionOpen { name } => {
        Some(RangeEvent::Open {
          name:      name.clone(),
          container: true,
          span:      self.span.clone(),
        })
      },
      MarkerKind::SubsectionClose { name } => {
        Some(RangeEvent::Close {
          name: name.clone(),
          span: self.span.clone(),
        })
      },
      _ => None,
    }
  }
}

/// Classify the inner content of a comment.
///
/// Returns `None` for comments that are not markers.
#[must_use]
pub fn classify(inner: &str) -> Option<MarkerKind> {
  let inner = inner.trim();

  // A bare `section` would otherwise read as a field called "section"
  if inner == "section" {
    return Some(MarkerKind::Section { name: None });
  }

  if let Some(caps) = FIELD_OPEN_RE.captures(inner) {
    return Some(MarkerKind::FieldOpen {
      name:      caps[1].to_string(),
      container: caps.get(2).is_some(),
    });
  }

  // `/sub` has the shape of a field closer, so it is checked first
  if let Some(caps) = SUB_CLOSE_RE.captures(inner) {
    return Some(MarkerKind::SubsectionClose {
      name: caps.get(1).map(|m| m.as_str().to_string()),
    });
  }

  if let Some(caps) = FIELD_CLOSE_RE.captures(inner) {
    return Some(MarkerKind::FieldClose {
      name: caps[1].to_string(),
    });
  }

  if inner == "/" {
    return Some(MarkerKind::UniversalClose);
  }

  if let Some(caps) = SUB_OPEN_RE.captures(inner) {
    return Some(MarkerKind::SubsectionOpen {
      name: caps[1].to_string(),
    });
  }

  SECTION_RE.captures(inner).map(|caps| {
    MarkerKind::Section {
      name: caps.get(1).map(|m| m.as_str().to_string()),
    }
  })
}

/// Scan `text` for markers, in document order.
///
/// With `skip_code` set, comments inside fenced code blocks are left alone.
#[must_use]
pub fn scan(text: &str, skip_code: bool) -> Vec<Marker> {
  let code_ranges = if skip_code {
    fenced_code_ranges(text)
  } else {
    Vec::new()
  };

  let mut markers = Vec::new();
  for caps in COMMENT_RE.captures_iter(text) {
    let Some(whole) = caps.get(0) else {
      continue;
    };
    if code_ranges.iter().any(|range| range.contains(&whole.start())) {
      trace!("Skipping comment in code block at byte {}", whole.start());
      continue;
    }
    if let Some(kind) = classify(&caps[1]) {
      markers.push(Marker {
        kind,
        span: whole.range(),
      });
    }
  }
  markers
}

/// Replace each marker in Markdown with the line breaks it spanned.
///
/// Line numbers are preserved, so positions reported by the renderer still
/// map onto the original text, and text that shared a line with a marker
/// renders as an ordinary paragraph instead of a raw HTML block.
#[must_use]
pub fn blank_markers(markdown: &str, skip_code: bool) -> String {
  let mut out = String::with_capacity(markdown.len());
  let mut last = 0;
  for marker in scan(markdown, skip_code) {
    out.push_str(&markdown[last..marker.start()]);
    let spanned = &markdown[marker.span.clone()];
    out.extend(spanned.chars().filter(|&c| c == '\n'));
    last = marker.end();
  }
  out.push_str(&markdown[last..]);
  out
}

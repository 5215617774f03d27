//! Stack matching of opener and closer markers into content ranges.
//!
//! The same resolver pairs field markers inside a scope and subsection
//! markers inside a section; each call runs with its own stack.
use std::ops::Range;

use log::{debug, trace};

/// Input to [`resolve_ranges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeEvent {
  Open {
    name:      String,
    container: bool,
    span:      Range<usize>,
  },
  /// `name: None` closes whatever is on top of the stack.
  Close {
    name: Option<String>,
    span: Range<usize>,
  },
}

/// A resolved opener/closer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRange {
  pub name:      String,
  pub container: bool,
  /// Byte span of the opening comment.
  pub opener:    Range<usize>,
  /// Bytes between the opener and its closer (or implied end).
  pub content:   Range<usize>,
  /// Whether an explicit closer ended the range.
  pub closed:    bool,
}

#[derive(Debug)]
struct OpenEntry {
  name:      String,
  container: bool,
  opener:    Range<usize>,
}

impl OpenEntry {
  fn close_at(self, end: usize, closed: bool) -> MarkerRange {
    MarkerRange {
      content: self.opener.end..end.max(self.opener.end),
      name: self.name,
      container: self.container,
      opener: self.opener,
      closed,
    }
  }
}

/// Pair openers with closers.
///
/// - A named closer closes the nearest open entry with that name; entries
///   above it stay open.
/// - A universal closer closes the top of the stack.
/// - Closers with nothing to close are dropped.
/// - Entries still open at the end run up to the next opener that starts
///   after them, or to `content_len`.
///
/// Ranges are returned in opener order.
#[must_use]
pub fn resolve_ranges<I>(events: I, content_len: usize) -> Vec<MarkerRange>
where
  I: IntoIterator<Item = RangeEvent>,
{
  let mut stack: Vec<OpenEntry> = Vec::new();
  let mut opener_starts = Vec::new();
  let mut ranges = Vec::new();

  for event in events {
    match event {
      RangeEvent::Open {
        name,
        container,
        span,
      } => {
        opener_starts.push(span.start);
        stack.push(OpenEntry {
          name,
          container,
          opener: span,
        });
      },
      RangeEvent::Close {
        name: Some(name),
        span,
      } => {
        match stack.iter().rposition(|entry| entry.name == name) {
          Some(index) => {
            let entry = stack.remove(index);
            ranges.push(entry.close_at(span.start, true));
          },
          None => debug!("Ignoring closer for '{name}' with no open marker"),
        }
      },
      RangeEvent::Close { name: None, span } => {
        match stack.pop() {
          Some(entry) => ranges.push(entry.close_at(span.start, true)),
          None => debug!("Ignoring universal closer with no open marker"),
        }
      },
    }
  }

  for entry in stack {
    let end = opener_starts
      .iter()
      .copied()
      .find(|&start| start > entry.opener.start)
      .unwrap_or(content_len);
    trace!("Closing '{}' implicitly at byte {end}", entry.name);
    ranges.push(entry.close_at(end, false));
  }

  ranges.sort_by_key(|range| range.opener.start);
  ranges
}

#[cfg(test)]
mod tests {
  use super::*;

  fn open(name: &str, span: Range<usize>) -> RangeEvent {
    RangeEvent::Open {
      name: name.to_string(),
      container: false,
      span,
    }
  }

  fn close(name: Option<&str>, span: Range<usize>) -> RangeEvent {
    RangeEvent::Close {
      name: name.map(str::to_string),
      span,
    }
  }

  #[test]
  fn test_named_closer_skips_inner_entries() {
    // <a> <b> </a> ... end
    let ranges = resolve_ranges(
      vec![open("a", 0..5), open("b", 10..15), close(Some("a"), 20..25)],
      40,
    );
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0].name, "a");
    assert_eq!(ranges[0].content, 5..20);
    assert!(ranges[0].closed);
    assert_eq!(ranges[1].name, "b");
    assert_eq!(ranges[1].content, 15..40);
    assert!(!ranges[1].closed);
  }

  #[test]
  fn test_universal_closer_pops_top() {
    let ranges = resolve_ranges(
      vec![open("a", 0..5), open("b", 10..15), close(None, 20..25)],
      30,
    );
    assert_eq!(ranges[1].name, "b");
    assert_eq!(ranges[1].content, 15..20);
    assert_eq!(ranges[0].content, 5..10, "a runs to the next opener");
  }

  #[test]
  fn test_unclosed_runs_to_next_opener() {
    let ranges = resolve_ranges(vec![open("a", 0..5), open("b", 9..14)], 20);
    assert_eq!(ranges[0].content, 5..9);
    assert_eq!(ranges[1].content, 14..20);
  }

  #[test]
  fn test_stray_closers_are_ignored() {
    let ranges = resolve_ranges(
      vec![close(Some("x"), 0..5), close(None, 5..10), open("a", 10..15)],
      20,
    );
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].content, 15..20);
  }

  #[test]
  fn test_interleaved_names_resolve_independently() {
    // <a> <b> </a> </b>
    let ranges = resolve_ranges(
      vec![
        open("a", 0..5),
        open("b", 6..11),
        close(Some("a"), 12..17),
        close(Some("b"), 18..23),
      ],
      23,
    );
    assert_eq!(ranges[0].content, 5..12);
    assert_eq!(ranges[1].content, 11..18);
    assert!(ranges.iter().all(|r| r.closed));
  }
}

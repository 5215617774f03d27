use std::ops::Range;

/// State tracking for code fence detection in markdown.
///
/// Tracks whether we're currently inside a fenced code block and the fence
/// character and length that will close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  in_code_block:    bool,
  code_fence_char:  Option<char>,
  code_fence_count: usize,
}

impl FenceTracker {
  #[must_use]
  pub const fn new() -> Self {
    Self {
      in_code_block:    false,
      code_fence_char:  None,
      code_fence_count: 0,
    }
  }

  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.in_code_block
  }

  /// Process a line and return the state after it.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let trimmed = line.trim_start();
    // Four or more spaces of indentation is an indented code line, not a fence
    if line.len() - trimmed.len() > 3 {
      return *self;
    }

    let Some(fence_char) = trimmed.chars().next() else {
      return *self;
    };
    if fence_char != '`' && fence_char != '~' {
      return *self;
    }

    let fence_count = trimmed.chars().take_while(|&c| c == fence_char).count();
    if fence_count < 3 {
      return *self;
    }

    if !self.in_code_block {
      return Self {
        in_code_block:    true,
        code_fence_char:  Some(fence_char),
        code_fence_count: fence_count,
      };
    }

    // Closing fences carry no info string
    let rest = &trimmed[fence_count * fence_char.len_utf8()..];
    if self.code_fence_char == Some(fence_char)
      && fence_count >= self.code_fence_count
      && rest.trim().is_empty()
    {
      return Self::new();
    }

    *self
  }
}

/// Byte ranges of `text` covered by fenced code blocks, fences included.
///
/// An unterminated fence runs to the end of the text, as it does in
/// `CommonMark`.
#[must_use]
pub fn fenced_code_ranges(text: &str) -> Vec<Range<usize>> {
  let mut ranges = Vec::new();
  let mut tracker = FenceTracker::new();
  let mut open_at = None;
  let mut offset = 0;

  for line in text.split_inclusive('\n') {
    let next = tracker.process_line(line.trim_end_matches(['\n', '\r']));
    match (tracker.in_code_block(), next.in_code_block()) {
      (false, true) => open_at = Some(offset),
      (true, false) => {
        if let Some(start) = open_at.take() {
          ranges.push(start..offset + line.len());
        }
      },
      _ => {},
    }
    tracker = next;
    offset += line.len();
  }

  if let Some(start) = open_at {
    ranges.push(start..text.len());
  }

  ranges
}

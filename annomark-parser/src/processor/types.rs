//! Type definitions for the document parser.
//!
//! # Examples
//!
//! ```
//! use annomark_parser::{DocumentParser, ParserOptionsBuilder};
//!
//! let options = ParserOptionsBuilder::new()
//!   .gfm(true)
//!   .ignore_markers_in_code(true)
//!   .build();
//!
//! let parser = DocumentParser::new(options);
//! let tree = parser.parse_string("<!-- title -->\n# Hello\n");
//! assert_eq!(tree.sections().len(), 1);
//! ```

use crate::render::{RenderOptions, Renderer};

/// Options for configuring the document parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
  /// Options forwarded to the Markdown renderer.
  pub render: RenderOptions,

  /// Leave comments inside fenced code blocks alone instead of reading them
  /// as markers.
  pub ignore_markers_in_code: bool,
}

impl Default for ParserOptions {
  fn default() -> Self {
    Self {
      render:                 RenderOptions::default(),
      ignore_markers_in_code: true,
    }
  }
}

/// Document parser.
///
/// Holds no per-document state; one parser can be shared across threads and
/// used for any number of documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser {
  pub(crate) options:  ParserOptions,
  pub(crate) renderer: Renderer,
}

/// Builder for constructing `ParserOptions` with method chaining.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptionsBuilder {
  options: ParserOptions,
}

impl ParserOptionsBuilder {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.render.gfm = enabled;
    self
  }

  /// Enable or disable typographic quotes and dashes.
  #[must_use]
  pub const fn smart_punctuation(mut self, enabled: bool) -> Self {
    self.options.render.smart_punctuation = enabled;
    self
  }

  /// Render soft line breaks as `<br>`.
  #[must_use]
  pub const fn hard_breaks(mut self, enabled: bool) -> Self {
    self.options.render.hard_breaks = enabled;
    self
  }

  /// Whether comments inside fenced code blocks are ignored as markers.
  #[must_use]
  pub const fn ignore_markers_in_code(mut self, enabled: bool) -> Self {
    self.options.ignore_markers_in_code = enabled;
    self
  }

  #[must_use]
  pub const fn build(self) -> ParserOptions {
    self.options
  }
}

//! Markdown to HTML rendering through comrak.
//!
//! Rendering is a pure function of `(markdown, RenderOptions)`. Raw HTML is
//! always passed through, since annotation markers are HTML comments and
//! must survive into the rendered output to be located and stripped later.
use comrak::{
  Arena,
  format_html,
  nodes::{AstNode, NodeHeading, NodeValue},
  options::Options,
  parse_document,
};
use log::debug;

use crate::utils;

/// Options for the Markdown renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
  /// Enable GitHub Flavored Markdown (tables, strikethrough, autolinks,
  /// task lists, footnotes).
  pub gfm: bool,

  /// Convert straight quotes and dashes to their typographic forms.
  pub smart_punctuation: bool,

  /// Render soft line breaks as `<br>`.
  pub hard_breaks: bool,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      gfm:               true,
      smart_punctuation: false,
      hard_breaks:       false,
    }
  }
}

/// A heading found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
  /// Heading level (1-6).
  pub level: u8,
  /// Inline text, markup removed.
  pub text:  String,
}

/// One top-level node of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
  /// Set when the node is a heading.
  pub heading:    Option<Heading>,
  /// 1-based line of the source the node starts on.
  pub start_line: usize,
  /// 1-based line of the source the node ends on.
  pub end_line:   usize,
  /// HTML of this node alone.
  pub html:       String,
}

/// Comrak-backed Markdown renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
  options: RenderOptions,
}

impl Renderer {
  #[must_use]
  pub const fn new(options: RenderOptions) -> Self {
    Self { options }
  }

  #[must_use]
  pub const fn options(&self) -> &RenderOptions {
    &self.options
  }

  /// Render a whole Markdown document to HTML.
  #[must_use]
  pub fn render_html(&self, markdown: &str) -> String {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let mut html = String::new();
    if let Err(e) = format_html(root, &options, &mut html) {
      debug!("Failed to format markdown as HTML: {e}");
    }
    html
  }

  /// Render Markdown and flatten the result to plain text.
  #[must_use]
  pub fn render_text(&self, markdown: &str) -> String {
    utils::html_to_text(&self.render_html(markdown))
  }

  /// Render every top-level node of a document separately.
  ///
  /// Nodes come back in document order, each tagged with the source line it
  /// starts on so callers can map them back onto the Markdown.
  #[must_use]
  pub fn render_nodes(&self, markdown: &str) -> Vec<RenderedNode> {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let mut nodes = Vec::new();
    for node in root.children() {
      let (level, start_line, end_line) = {
        let data = node.data.borrow();
        let level = match &data.value {
          NodeValue::Heading(NodeHeading { level, .. }) => Some(*level),
          _ => None,
        };
        (level, data.sourcepos.start.line, data.sourcepos.end.line)
      };

      let heading = level.map(|level| {
        Heading {
          level,
          text: extract_inline_text(node).trim().to_string(),
        }
      });

      let mut html = String::new();
      if let Err(e) = format_html(node, &options, &mut html) {
        debug!("Failed to format node at line {start_line}: {e}");
      }

      nodes.push(RenderedNode {
        heading,
        start_line,
        end_line: end_line.max(start_line),
        html,
      });
    }
    nodes
  }

  /// Build comrak options from `RenderOptions`.
  fn comrak_options(&self) -> Options<'static> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    options.parse.smart = self.options.smart_punctuation;
    options.render.hardbreaks = self.options.hard_breaks;
    options.render.r#unsafe = true;
    options
  }
}

/// Extract all inline text from a heading node.
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      NodeValue::Link(..)
      | NodeValue::Emph
      | NodeValue::Strong
      | NodeValue::Strikethrough
      | NodeValue::Superscript
      | NodeValue::Subscript => text.push_str(&extract_inline_text(child)),
      _ => {},
    }
  }
  text
}

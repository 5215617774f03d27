//! Core implementation of the document parser.
//!
//! This module holds the parse pipeline of [`DocumentParser`]: frontmatter,
//! section splitting and subsection resolution. Block trees and fields are
//! built in their own modules.
use std::{fs, path::Path};

use indexmap::IndexMap;
use log::{debug, trace};

use super::{
  extract::extract_content,
  types::{DocumentParser, ParserOptions},
};
use crate::{
  error::{ParseError, ParseResult},
  frontmatter::{parse_frontmatter, split_frontmatter},
  markers::{Marker, MarkerKind, blank_markers, resolve_ranges, scan},
  render::Renderer,
  types::{ContentTree, Section},
  utils::{html_to_text, trim_leading_blank_lines},
};

impl DocumentParser {
  /// Create a new parser with the given options.
  #[must_use]
  pub const fn new(options: ParserOptions) -> Self {
    Self {
      options,
      renderer: Renderer::new(options.render),
    }
  }

  /// Access parser options.
  #[must_use]
  pub const fn options(&self) -> &ParserOptions {
    &self.options
  }

  /// The renderer used for every Markdown to HTML step.
  #[must_use]
  pub const fn renderer(&self) -> &Renderer {
    &self.renderer
  }

  /// Parse an in-memory document.
  ///
  /// Parsing never fails: malformed markers and frontmatter are normalized
  /// into a best-effort tree.
  #[must_use]
  pub fn parse_string(&self, text: &str) -> ContentTree {
    let (raw_frontmatter, body) = split_frontmatter(text);
    let frontmatter =
      raw_frontmatter.map(|raw| parse_frontmatter(raw, &self.renderer));

    ContentTree {
      frontmatter,
      body: body.to_string(),
      sections: self.build_sections(body),
    }
  }

  /// Read a document from disk and parse it.
  ///
  /// # Errors
  ///
  /// Returns [`ParseError::SourceUnavailable`] if the file cannot be read.
  pub fn parse_file(&self, path: &Path) -> ParseResult<ContentTree> {
    let text = fs::read_to_string(path).map_err(|source| {
      ParseError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
      }
    })?;
    trace!("Parsing {}", path.display());
    Ok(self.parse_string(&text))
  }

  /// Split a body into sections at `section` markers.
  ///
  /// Content before the first marker becomes an unnamed section when it is
  /// not blank. A document without section markers is a single unnamed
  /// section.
  fn build_sections(&self, body: &str) -> Vec<Section> {
    let markers: Vec<Marker> =
      scan(body, self.options.ignore_markers_in_code)
        .into_iter()
        .filter(|marker| matches!(marker.kind, MarkerKind::Section { .. }))
        .collect();

    let Some(first) = markers.first() else {
      return vec![self.build_section(None, body, true)];
    };

    let mut sections = Vec::with_capacity(markers.len() + 1);
    let orphan = &body[..first.start()];
    if !orphan.trim().is_empty() {
      sections.push(self.build_section(None, orphan, true));
    }

    for (i, marker) in markers.iter().enumerate() {
      let MarkerKind::Section { name } = &marker.kind else {
        continue;
      };
      let end = markers.get(i + 1).map_or(body.len(), Marker::start);

      if let Some(name) = name {
        if sections.iter().any(|s| s.name.as_deref() == Some(name.as_str())) {
          debug!(
            "Section '{name}' appears more than once; name lookup returns \
             the first"
          );
        }
      }
      sections.push(self.build_section(
        name.clone(),
        &body[marker.end()..end],
        true,
      ));
    }

    sections
  }

  /// Build one section. Subsections are only resolved when `nested` is set,
  /// so they never carry subsections of their own.
  fn build_section(
    &self,
    name: Option<String>,
    raw: &str,
    nested: bool,
  ) -> Section {
    let markdown = trim_leading_blank_lines(raw).trim_end().to_string();
    let skip_code = self.options.ignore_markers_in_code;

    let subsections = if nested {
      self.build_subsections(&markdown)
    } else {
      IndexMap::new()
    };

    let html = self.renderer.render_html(&blank_markers(&markdown, skip_code));
    let text = html_to_text(&html);
    let content = extract_content(&html);
    let fields = self.extract_fields(&markdown);
    let blocks = self.build_blocks(&markdown);

    Section {
      name,
      markdown,
      html,
      text,
      fields,
      subsections,
      blocks,
      content,
    }
  }

  fn build_subsections(&self, markdown: &str) -> IndexMap<String, Section> {
    let markers = scan(markdown, self.options.ignore_markers_in_code);
    let ranges = resolve_ranges(
      markers.iter().filter_map(Marker::subsection_event),
      markdown.len(),
    );

    let mut subsections = IndexMap::new();
    for range in ranges {
      if subsections.contains_key(&range.name) {
        debug!("Ignoring repeated subsection '{}'", range.name);
        continue;
      }
      let section = self.build_section(
        Some(range.name.clone()),
        &markdown[range.content],
        false,
      );
      subsections.insert(range.name, section);
    }
    subsections
  }
}

//! Field capture and type inference.
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::{debug, trace};
use regex::Regex;

use super::{extract::extract_content, types::DocumentParser};
use crate::{
  elements::{
    ContentElement,
    ExtractedContent,
    FieldData,
    FieldValue,
    ListData,
  },
  markers::{Marker, blank_markers, resolve_ranges, scan},
  utils::{html_to_text, static_regex, trim_leading_blank_lines},
};

static BLANK_LINE_RE: LazyLock<Regex> =
  LazyLock::new(|| static_regex("BLANK_LINE_RE", r"\n[ \t]*\r?\n"));
static HEADING_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
  static_regex("HEADING_LINE_RE", r"^ {0,3}(#{1,6})(?:[ \t]+.*)?$")
});

impl DocumentParser {
  /// Capture the fields of one scope.
  ///
  /// Section and subsection markers in `markdown` are ignored. When two
  /// openers share a name, the earlier one wins and the later capture is
  /// dropped. Captures that are blank once markers are removed do not claim
  /// their name.
  pub(crate) fn extract_fields(
    &self,
    markdown: &str,
  ) -> IndexMap<String, FieldData> {
    let skip_code = self.options.ignore_markers_in_code;
    let markers = scan(markdown, skip_code);
    let ranges = resolve_ranges(
      markers.iter().filter_map(Marker::field_event),
      markdown.len(),
    );

    let mut fields = IndexMap::new();
    for range in ranges {
      if fields.contains_key(&range.name) {
        debug!("Ignoring repeated field '{}' in the same scope", range.name);
        continue;
      }

      let captured = &markdown[range.content];
      let captured = if range.container {
        captured
      } else {
        first_unit(captured)
      };
      let captured = captured.trim();

      let Some(field) = self.build_field(&range.name, captured) else {
        trace!("Discarding empty capture for field '{}'", range.name);
        continue;
      };
      fields.insert(range.name, field);
    }
    fields
  }

  fn build_field(&self, name: &str, markdown: &str) -> Option<FieldData> {
    let clean = blank_markers(markdown, self.options.ignore_markers_in_code);
    if clean.trim().is_empty() {
      return None;
    }

    let html = self.renderer.render_html(&clean);
    let text = html_to_text(&html);
    let content = extract_content(&html);
    let data = self.infer_value(&clean, &content, &text);

    Some(FieldData {
      name: name.to_string(),
      field_type: data.field_type(),
      markdown: markdown.to_string(),
      html,
      text,
      data,
      content,
    })
  }

  /// Infer the typed value of a capture from what it contains.
  ///
  /// A leading Markdown heading wins, then lists, images and links in that
  /// order; anything else is text.
  fn infer_value(
    &self,
    markdown: &str,
    content: &ExtractedContent,
    text: &str,
  ) -> FieldValue {
    let first_line = markdown.lines().find(|line| !line.trim().is_empty());
    if let Some(line) = first_line {
      if let Some(caps) = HEADING_LINE_RE.captures(line) {
        #[allow(
          clippy::cast_possible_truncation,
          reason = "The pattern allows at most six hashes"
        )]
        let level = caps[1].len() as u8;
        return FieldValue::Heading {
          level,
          text: self.renderer.render_text(line.trim()),
        };
      }
    }

    if let Some(first) = content.lists.first().and_then(ContentElement::as_list)
    {
      let items = content
        .lists
        .iter()
        .filter_map(ContentElement::as_list)
        .flat_map(|list| list.items.iter().cloned())
        .collect();
      return FieldValue::List(ListData {
        ordered: first.ordered,
        items,
      });
    }

    let mut images: Vec<_> = content
      .images
      .iter()
      .filter_map(ContentElement::as_image)
      .cloned()
      .collect();
    if images.len() > 1 {
      return FieldValue::Images(images);
    }
    if let Some(image) = images.pop() {
      return FieldValue::Image(image);
    }

    let mut links: Vec<_> = content
      .links
      .iter()
      .filter_map(ContentElement::as_link)
      .cloned()
      .collect();
    if links.len() > 1 {
      return FieldValue::Links(links);
    }
    if let Some(link) = links.pop() {
      return FieldValue::Link(link);
    }

    FieldValue::Text(text.to_string())
  }
}

/// Content of a regular field: everything up to the first blank line.
fn first_unit(captured: &str) -> &str {
  let captured = trim_leading_blank_lines(captured);
  BLANK_LINE_RE
    .find(captured)
    .map_or(captured, |boundary| &captured[..boundary.start()])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::elements::{FieldType, ImageData};

  fn fields(markdown: &str) -> IndexMap<String, FieldData> {
    DocumentParser::default().extract_fields(markdown)
  }

  #[test]
  fn test_first_field_wins() {
    let fields = fields("<!-- x -->A<!-- x -->B");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("x").map(FieldData::markdown), Some("A"));
  }

  #[test]
  fn test_regular_field_stops_at_blank_line() {
    let fields = fields("<!-- note -->First para\n\nSecond para");
    assert_eq!(fields.get("note").map(FieldData::text), Some("First para"));
  }

  #[test]
  fn test_container_field_keeps_everything() {
    let fields = fields("<!-- note... -->First para\n\nSecond para<!-- / -->");
    let note = fields.get("note");
    assert_eq!(
      note.map(FieldData::markdown),
      Some("First para\n\nSecond para")
    );
    assert_eq!(note.map(|f| f.paragraphs().len()), Some(2));
  }

  #[test]
  fn test_unclosed_field_stops_at_next_opener() {
    let fields = fields("<!-- a -->content with no closer<!-- b -->next");
    assert_eq!(
      fields.get("a").map(FieldData::markdown),
      Some("content with no closer")
    );
    assert_eq!(fields.get("b").map(FieldData::markdown), Some("next"));
  }

  #[test]
  fn test_empty_capture_does_not_claim_name() {
    let fields = fields("<!-- x --><!-- / -->\n\n<!-- x -->Later<!-- / -->");
    assert_eq!(fields.get("x").map(FieldData::markdown), Some("Later"));
  }

  #[test]
  fn test_section_markers_are_not_fields() {
    let fields = fields("<!-- sub:intro -->Hi<!-- /sub -->");
    assert!(fields.is_empty());
  }

  #[test]
  fn test_type_inference() {
    let fields = fields(
      "<!-- title -->\n## Hello *there*\n<!-- / -->\n<!-- tags -->\n- a\n- \
       b\n<!-- / -->\n<!-- logo -->![Logo](logo.png)<!-- / -->\n<!-- pics \
       -->![A](a.png) ![B](b.png)<!-- / -->\n<!-- home -->[Home](/)<!-- / \
       -->\n<!-- nav -->[A](/a) [B](/b)<!-- / -->\n<!-- plain -->Just \
       text<!-- / -->",
    );

    let types: Vec<(&str, FieldType)> = fields
      .values()
      .map(|field| (field.name(), field.field_type()))
      .collect();
    assert_eq!(types, vec![
      ("title", FieldType::Heading),
      ("tags", FieldType::List),
      ("logo", FieldType::Image),
      ("pics", FieldType::Images),
      ("home", FieldType::Link),
      ("nav", FieldType::Links),
      ("plain", FieldType::Text),
    ]);

    assert_eq!(
      fields.get("title").map(FieldData::data),
      Some(&FieldValue::Heading {
        level: 2,
        text:  "Hello there".to_string(),
      })
    );
    assert_eq!(
      fields.get("logo").map(FieldData::data),
      Some(&FieldValue::Image(ImageData {
        src:   "logo.png".to_string(),
        alt:   "Logo".to_string(),
        title: None,
        href:  None,
      }))
    );
  }

  #[test]
  fn test_markers_in_code_are_ignored() {
    let fields = fields("```\n<!-- x -->inside\n```\n\n<!-- y -->outside");
    assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["y"]);
  }
}

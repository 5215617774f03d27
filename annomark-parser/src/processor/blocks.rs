//! Heading block tree construction.
//!
//! A section body is rendered once, node by node. Every top-level heading
//! starts a block that owns the nodes up to the next heading of any level;
//! blocks are then nested by relative heading depth.
use indexmap::IndexMap;
use log::trace;

use super::{extract::extract_content, types::DocumentParser};
use crate::{
  markers::blank_markers,
  render::{Heading, RenderedNode},
  types::Block,
  utils::{html_to_text, trim_leading_blank_lines},
};

/// Consecutive top-level nodes that belong to one block.
#[derive(Debug, Default)]
struct Segment {
  heading:  Option<Heading>,
  end_line: usize,
  html:     String,
}

impl Segment {
  fn push(&mut self, node: RenderedNode) {
    self.end_line = node.end_line;
    self.html.push_str(&node.html);
  }
}

/// A block before aggregation, addressed by its index in the arena.
#[derive(Debug)]
struct PendingBlock {
  heading:   String,
  level:     u8,
  synthetic: bool,
  markdown:  String,
  html:      String,
  children:  Vec<usize>,
}

/// Byte offset of the start of each line.
struct LineIndex {
  starts: Vec<usize>,
  len:    usize,
}

impl LineIndex {
  fn new(text: &str) -> Self {
    let starts = std::iter::once(0)
      .chain(text.match_indices('\n').map(|(i, _)| i + 1))
      .collect();
    Self {
      starts,
      len: text.len(),
    }
  }

  /// Offset of 1-based `line`, clamped to the end of the text.
  fn offset(&self, line: usize) -> usize {
    line
      .checked_sub(1)
      .and_then(|index| self.starts.get(index))
      .copied()
      .unwrap_or(self.len)
  }
}

impl DocumentParser {
  /// Build the block tree of one section body.
  ///
  /// Returns the top-level blocks in document order. An empty body yields no
  /// blocks and a body without headings yields a single level-0 block.
  pub(crate) fn build_blocks(&self, markdown: &str) -> Vec<Block> {
    let clean = blank_markers(markdown, self.options.ignore_markers_in_code);
    let nodes = self.renderer.render_nodes(&clean);
    if nodes.is_empty() {
      return Vec::new();
    }

    let (preamble, segments) = split_segments(nodes);
    let lines = LineIndex::new(markdown);

    // Lines between two segments (blank or marker-only) open the next one
    let mut bounds = Vec::with_capacity(segments.len() + 1);
    bounds.push(0);
    let mut previous_end = preamble.as_ref().map(|p| p.end_line);
    for segment in &segments {
      bounds.push(previous_end.map_or(0, |end| lines.offset(end + 1)));
      previous_end = Some(segment.end_line);
    }
    bounds.push(markdown.len());
    let slice = |index: usize| -> String {
      let start = bounds[index].min(markdown.len());
      let end = bounds[index + 1].clamp(start, markdown.len());
      trim_leading_blank_lines(&markdown[start..end])
        .trim_end()
        .to_string()
    };

    let mut arena: Vec<PendingBlock> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    let first_level = segments
      .first()
      .and_then(|segment| segment.heading.as_ref())
      .map_or(1, |heading| heading.level);
    let preamble_markdown = slice(0);
    let preamble_html = preamble.map(|p| p.html).unwrap_or_default();

    if segments.is_empty() {
      trace!("Section has no headings, building a single block");
      arena.push(PendingBlock {
        heading:   String::new(),
        level:     0,
        synthetic: false,
        markdown:  preamble_markdown,
        html:      preamble_html,
        children:  Vec::new(),
      });
      roots.push(0);
    } else if first_level > 1 {
      trace!("First heading is h{first_level}, wrapping in a synthetic root");
      arena.push(PendingBlock {
        heading:   String::new(),
        level:     1,
        synthetic: true,
        markdown:  preamble_markdown,
        html:      preamble_html,
        children:  Vec::new(),
      });
      roots.push(0);
      stack.push(0);
    } else if !preamble_html.trim().is_empty() {
      arena.push(PendingBlock {
        heading:   String::new(),
        level:     0,
        synthetic: false,
        markdown:  preamble_markdown,
        html:      preamble_html,
        children:  Vec::new(),
      });
      roots.push(0);
    }

    for (position, segment) in segments.into_iter().enumerate() {
      let heading = segment.heading.unwrap_or(Heading {
        level: 1,
        text:  String::new(),
      });
      let index = arena.len();
      arena.push(PendingBlock {
        heading:   heading.text,
        level:     heading.level,
        synthetic: false,
        markdown:  slice(position + 1),
        html:      segment.html,
        children:  Vec::new(),
      });

      while stack
        .last()
        .is_some_and(|&top| arena[top].level >= heading.level)
      {
        stack.pop();
      }
      match stack.last() {
        Some(&parent) => arena[parent].children.push(index),
        None => roots.push(index),
      }
      stack.push(index);
    }

    let mut slots: Vec<Option<PendingBlock>> =
      arena.into_iter().map(Some).collect();
    roots
      .into_iter()
      .filter_map(|index| self.finish_block(&mut slots, index))
      .collect()
  }

  /// Turn a pending block into a [`Block`], folding its children in.
  fn finish_block(
    &self,
    slots: &mut [Option<PendingBlock>],
    index: usize,
  ) -> Option<Block> {
    let pending = slots.get_mut(index)?.take()?;
    let children: Vec<Block> = pending
      .children
      .iter()
      .filter_map(|&child| self.finish_block(slots, child))
      .collect();

    let own_text = html_to_text(&pending.html);
    let fields = if pending.markdown.is_empty() {
      IndexMap::new()
    } else {
      self.extract_fields(&pending.markdown)
    };
    let content = extract_content(&pending.html);

    let (markdown, html, text) = if pending.synthetic {
      (
        pending.markdown.clone(),
        pending.html.clone(),
        own_text.clone(),
      )
    } else {
      let mut html = pending.html.clone();
      for child in &children {
        html.push_str(&child.html);
      }
      (
        join_non_empty(
          std::iter::once(pending.markdown.as_str())
            .chain(children.iter().map(|c| c.markdown.as_str())),
        ),
        html,
        join_non_empty(
          std::iter::once(own_text.as_str())
            .chain(children.iter().map(|c| c.text.as_str())),
        ),
      )
    };

    Some(Block {
      heading: pending.heading,
      level: pending.level,
      synthetic: pending.synthetic,
      own_markdown: pending.markdown,
      own_html: pending.html,
      own_text,
      markdown,
      html,
      text,
      fields,
      content,
      children,
    })
  }
}

/// Split rendered nodes into the content before the first heading and one
/// segment per heading.
fn split_segments(nodes: Vec<RenderedNode>) -> (Option<Segment>, Vec<Segment>) {
  let mut preamble: Option<Segment> = None;
  let mut segments: Vec<Segment> = Vec::new();

  for node in nodes {
    if let Some(heading) = node.heading.clone() {
      let mut segment = Segment {
        heading: Some(heading),
        ..Segment::default()
      };
      segment.push(node);
      segments.push(segment);
    } else if let Some(segment) = segments.last_mut() {
      segment.push(node);
    } else {
      preamble.get_or_insert_with(Segment::default).push(node);
    }
  }

  (preamble, segments)
}

fn join_non_empty<'a>(parts: impl Iterator<Item = &'a str>) -> String {
  parts
    .filter(|part| !part.trim().is_empty())
    .collect::<Vec<_>>()
    .join("\n\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn blocks(markdown: &str) -> Vec<Block> {
    DocumentParser::default().build_blocks(markdown)
  }

  #[test]
  fn test_no_headings_single_block() {
    let blocks = blocks("Just text.\n\nMore text.\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].level(), 0);
    assert_eq!(blocks[0].heading(), "");
    assert_eq!(blocks[0].markdown(), "Just text.\n\nMore text.");
    assert_eq!(blocks[0].paragraphs().len(), 2);
  }

  #[test]
  fn test_empty_body_has_no_blocks() {
    assert!(blocks("").is_empty());
    assert!(blocks("<!-- x -->\n").is_empty());
  }

  #[test]
  fn test_heading_hierarchy() {
    let blocks = blocks(
      "# One\n\nintro\n\n## Two\n\ntwo body\n\n### Three\n\ndeep\n\n## \
       Four\n\n# Five\n",
    );
    assert_eq!(blocks.len(), 2);

    let one = &blocks[0];
    assert_eq!(one.heading(), "One");
    assert_eq!(one.children().len(), 2);
    assert_eq!(one.children()[0].heading(), "Two");
    assert_eq!(one.children()[0].children()[0].heading(), "Three");
    assert_eq!(one.children()[1].heading(), "Four");
    assert_eq!(blocks[1].heading(), "Five");
  }

  #[test]
  fn test_synthetic_root() {
    let blocks = blocks("## Second-level heading\n\nbody\n");
    assert_eq!(blocks.len(), 1);

    let root = &blocks[0];
    assert!(root.is_synthetic());
    assert_eq!(root.heading(), "");
    assert_eq!(root.level(), 1);
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].level(), 2);
    assert_eq!(root.children()[0].heading(), "Second-level heading");
    assert_eq!(root.html(), "");
  }

  #[test]
  fn test_synthetic_root_keeps_preamble_only() {
    let blocks = blocks("lead\n\n### Deep\n\nbody\n\n# Top\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].text(), "lead");
    assert_eq!(blocks[0].children()[0].heading(), "Deep");
    assert_eq!(blocks[1].heading(), "Top");
    assert_eq!(blocks[1].level(), 1);
  }

  #[test]
  fn test_preamble_before_h1() {
    let blocks = blocks("lead\n\n# Title\n\nbody\n");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].level(), 0);
    assert_eq!(blocks[0].markdown(), "lead");
    assert_eq!(blocks[1].heading(), "Title");
  }

  #[test]
  fn test_bottom_up_aggregation() {
    let blocks = blocks("# A\n\na\n\n## B\n\nb\n\n### C\n\nc\n");
    let a = &blocks[0];
    assert_eq!(a.own_text(), "A\na");
    assert_eq!(a.text(), "A\na\n\nB\nb\n\nC\nc");
    assert_eq!(a.own_markdown(), "# A\n\na");
    assert_eq!(a.markdown(), "# A\n\na\n\n## B\n\nb\n\n### C\n\nc");
    assert!(a.html().contains("<h3>C</h3>"));
    assert_eq!(a.html().matches("<p>c</p>").count(), 1);
    assert_eq!(a.descendants().len(), 3);
  }

  #[test]
  fn test_block_fields_and_leading_markers() {
    let blocks = blocks("<!-- title -->\n# Hello\n\n<!-- lead -->Body\n");
    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!(block.heading(), "Hello");
    assert_eq!(block.field("title").map(|f| f.text()), Some("Hello"));
    assert_eq!(block.field("lead").map(|f| f.text()), Some("Body"));
    assert!(!block.html().contains("<!--"));
  }
}

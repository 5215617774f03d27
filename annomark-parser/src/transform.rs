//! Transformation passes over finished content trees.
//!
//! A transformer takes ownership of a tree and returns a new one, so the
//! parser's output is never patched behind a caller's back. Traversal is
//! explicit: sections, subsections, blocks and fields are walked through
//! their own children.
use log::trace;

use crate::{
  elements::{ElementData, ExtractedContent, FieldData, FieldValue, ImageData},
  types::{Block, ContentTree, Section},
  utils::{parse_fragment, serialize_body},
};

/// A pass that rebuilds a [`ContentTree`].
pub trait TreeTransformer {
  fn transform(&self, tree: ContentTree) -> ContentTree;
}

/// Rewrites the `src` of every image in a tree.
///
/// Covers image element data, typed field values and the stored HTML of
/// sections, subsections, blocks and fields. Markdown is source text and is
/// left as written.
///
/// # Examples
///
/// ```
/// use annomark_parser::{ImageSourceRewriter, TreeTransformer, parse_string};
///
/// let tree = parse_string("![Logo](logo.png)\n");
/// let rewriter = ImageSourceRewriter::new(|src: &str| {
///   format!("https://cdn.example/{src}")
/// });
/// let tree = rewriter.transform(tree);
///
/// assert!(tree.sections()[0].html().contains("https://cdn.example/logo.png"));
/// ```
pub struct ImageSourceRewriter<F> {
  rewrite: F,
}

impl<F> ImageSourceRewriter<F>
where
  F: Fn(&str) -> String,
{
  #[must_use]
  pub const fn new(rewrite: F) -> Self {
    Self { rewrite }
  }

  fn section(&self, mut section: Section) -> Section {
    section.html = self.html(&section.html);
    self.content(&mut section.content);
    section.fields = section
      .fields
      .into_iter()
      .map(|(name, field)| (name, self.field(field)))
      .collect();
    section.subsections = section
      .subsections
      .into_iter()
      .map(|(name, sub)| (name, self.section(sub)))
      .collect();
    section.blocks =
      section.blocks.into_iter().map(|block| self.block(block)).collect();
    section
  }

  fn block(&self, mut block: Block) -> Block {
    block.own_html = self.html(&block.own_html);
    block.html = self.html(&block.html);
    self.content(&mut block.content);
    block.fields = block
      .fields
      .into_iter()
      .map(|(name, field)| (name, self.field(field)))
      .collect();
    block.children =
      block.children.into_iter().map(|child| self.block(child)).collect();
    block
  }

  fn field(&self, mut field: FieldData) -> FieldData {
    field.html = self.html(&field.html);
    self.content(&mut field.content);
    match &mut field.data {
      FieldValue::Image(image) => self.image(image),
      FieldValue::Images(images) => {
        for image in images {
          self.image(image);
        }
      },
      _ => {},
    }
    field
  }

  fn content(&self, content: &mut ExtractedContent) {
    for element in &mut content.images.0 {
      element.html = self.html(&element.html);
      if let ElementData::Image(image) = &mut element.data {
        self.image(image);
      }
    }
    for element in &mut content.links.0 {
      element.html = self.html(&element.html);
    }
  }

  fn image(&self, image: &mut ImageData) {
    image.src = (self.rewrite)(&image.src);
  }

  fn html(&self, html: &str) -> String {
    if !html.contains("<img") {
      return html.to_string();
    }

    let document = parse_fragment(html);
    let Ok(images) = document.select("img") else {
      return html.to_string();
    };
    for img in images {
      let mut attributes = img.attributes.borrow_mut();
      if let Some(src) = attributes.get("src").map(str::to_string) {
        let rewritten = (self.rewrite)(&src);
        trace!("Rewriting image source {src} -> {rewritten}");
        attributes.insert("src", rewritten);
      }
    }
    serialize_body(&document)
  }
}

impl<F> TreeTransformer for ImageSourceRewriter<F>
where
  F: Fn(&str) -> String,
{
  fn transform(&self, tree: ContentTree) -> ContentTree {
    let (frontmatter, body, sections) = tree.into_parts();
    ContentTree {
      frontmatter,
      body,
      sections: sections
        .into_iter()
        .map(|section| self.section(section))
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ContentElement, parse_string};

  fn prefixed(src: &str) -> String {
    format!("/assets/{src}")
  }

  #[test]
  #[allow(clippy::panic)]
  fn test_rewrites_every_copy() {
    let tree = parse_string(
      "<!-- section:gallery -->\n<!-- hero -->![Hero](hero.png)\n\n# \
       Title\n\n[![Badge](badge.svg)](https://ci.example)\n",
    );
    let tree = ImageSourceRewriter::new(prefixed).transform(tree);
    let Some(section) = tree.section("gallery") else {
      panic!("missing section");
    };

    assert!(section.html().contains("src=\"/assets/hero.png\""));
    assert!(!section.html().contains("src=\"hero.png\""));

    let sources: Vec<&str> = section
      .images()
      .iter()
      .filter_map(ContentElement::as_image)
      .map(|image| image.src.as_str())
      .collect();
    assert_eq!(sources, vec!["/assets/hero.png", "/assets/badge.svg"]);

    match section.field("hero").map(FieldData::data) {
      Some(FieldValue::Image(image)) => {
        assert_eq!(image.src, "/assets/hero.png");
      },
      other => panic!("unexpected field value: {other:?}"),
    }

    let block = section.block("Title");
    assert!(
      block.is_some_and(|block| block.html().contains("/assets/badge.svg"))
    );
  }

  #[test]
  fn test_leaves_markdown_and_other_html() {
    let tree = parse_string("Text with [a link](page.md).\n");
    let before = tree.clone();
    let after = ImageSourceRewriter::new(prefixed).transform(tree);
    assert_eq!(before, after);
  }
}

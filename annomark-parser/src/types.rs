//! Content tree types for the annomark-parser public API.
//!
//! A parse produces one [`ContentTree`]. The tree owns every node below it;
//! nothing holds a back-reference to its parent and nothing is shared, so a
//! finished tree can be moved across threads or handed to a
//! [`TreeTransformer`](crate::TreeTransformer) that rebuilds it.
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
  elements::{ContentElement, ElementList, ExtractedContent, FieldData},
  frontmatter::Frontmatter,
};

/// Root of a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTree {
  pub(crate) frontmatter: Option<Frontmatter>,
  pub(crate) body:        String,
  pub(crate) sections:    Vec<Section>,
}

/// Lookup key for [`ContentTree::section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKey<'a> {
  /// First section carrying this name.
  Name(&'a str),
  /// Position in document order, orphan section included.
  Index(usize),
}

impl<'a> From<&'a str> for SectionKey<'a> {
  fn from(name: &'a str) -> Self {
    Self::Name(name)
  }
}

impl<'a> From<&'a String> for SectionKey<'a> {
  fn from(name: &'a String) -> Self {
    Self::Name(name.as_str())
  }
}

impl From<usize> for SectionKey<'_> {
  fn from(index: usize) -> Self {
    Self::Index(index)
  }
}

impl ContentTree {
  /// Parsed frontmatter, if the document had a closed `---` fence.
  #[must_use]
  pub const fn frontmatter(&self) -> Option<&Frontmatter> {
    self.frontmatter.as_ref()
  }

  /// The document body with frontmatter removed.
  #[must_use]
  pub fn body(&self) -> &str {
    &self.body
  }

  /// Look a section up by name or by index.
  ///
  /// Name lookup returns the first section with that name. Sections that
  /// share a name with an earlier one are still reachable by index or
  /// through [`ContentTree::sections`].
  #[must_use]
  pub fn section<'k>(
    &self,
    key: impl Into<SectionKey<'k>>,
  ) -> Option<&Section> {
    match key.into() {
      SectionKey::Name(name) => {
        self
          .sections
          .iter()
          .find(|section| section.name.as_deref() == Some(name))
      },
      SectionKey::Index(index) => self.sections.get(index),
    }
  }

  /// All sections in document order.
  #[must_use]
  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  /// Names of named sections, first occurrence only, in document order.
  #[must_use]
  pub fn section_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for name in self.sections.iter().filter_map(Section::name) {
      if !names.contains(&name) {
        names.push(name);
      }
    }
    names
  }

  /// Consume the tree, yielding its parts.
  #[must_use]
  pub fn into_parts(self) -> (Option<Frontmatter>, String, Vec<Section>) {
    (self.frontmatter, self.body, self.sections)
  }
}

/// A section or subsection of the document.
///
/// Subsections have the same shape, but never carry subsections of their
/// own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
  pub(crate) name:        Option<String>,
  pub(crate) markdown:    String,
  pub(crate) html:        String,
  pub(crate) text:        String,
  pub(crate) fields:      IndexMap<String, FieldData>,
  pub(crate) subsections: IndexMap<String, Section>,
  pub(crate) blocks:      Vec<Block>,
  #[serde(flatten)]
  pub(crate) content:     ExtractedContent,
}

impl Section {
  /// Section name; `None` for the orphan section and for `<!-- section -->`.
  #[must_use]
  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  #[must_use]
  pub fn markdown(&self) -> &str {
    &self.markdown
  }

  /// Rendered HTML with annotation markers removed.
  #[must_use]
  pub fn html(&self) -> &str {
    &self.html
  }

  #[must_use]
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Field captured anywhere in this section.
  #[must_use]
  pub fn field(&self, name: &str) -> Option<&FieldData> {
    self.fields.get(name)
  }

  #[must_use]
  pub const fn fields(&self) -> &IndexMap<String, FieldData> {
    &self.fields
  }

  #[must_use]
  pub fn subsection(&self, name: &str) -> Option<&Self> {
    self.subsections.get(name)
  }

  #[must_use]
  pub const fn subsections(&self) -> &IndexMap<String, Self> {
    &self.subsections
  }

  /// Top-level blocks of this section.
  #[must_use]
  pub fn blocks(&self) -> &[Block] {
    &self.blocks
  }

  /// Alias of [`Section::blocks`], used when walking the tree generically.
  #[must_use]
  pub fn children(&self) -> &[Block] {
    &self.blocks
  }

  /// First block, at any depth, whose heading text equals `heading`.
  #[must_use]
  pub fn block(&self, heading: &str) -> Option<&Block> {
    self
      .blocks
      .iter()
      .flat_map(Block::descendants)
      .find(|block| block.heading == heading)
  }

  #[must_use]
  pub const fn images(&self) -> &ElementList {
    &self.content.images
  }

  #[must_use]
  pub const fn links(&self) -> &ElementList {
    &self.content.links
  }

  #[must_use]
  pub const fn lists(&self) -> &ElementList {
    &self.content.lists
  }

  #[must_use]
  pub const fn paragraphs(&self) -> &ElementList {
    &self.content.paragraphs
  }
}

/// Content rooted at one heading, or a synthetic wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
  pub(crate) heading:      String,
  pub(crate) level:        u8,
  pub(crate) synthetic:    bool,
  pub(crate) own_markdown: String,
  pub(crate) own_html:     String,
  pub(crate) own_text:     String,
  pub(crate) markdown:     String,
  pub(crate) html:         String,
  pub(crate) text:         String,
  pub(crate) fields:       IndexMap<String, FieldData>,
  #[serde(flatten)]
  pub(crate) content:      ExtractedContent,
  pub(crate) children:     Vec<Block>,
}

impl Block {
  /// Heading text; empty for synthetic and heading-less blocks.
  #[must_use]
  pub fn heading(&self) -> &str {
    &self.heading
  }

  /// Heading depth, `0` when the block has no heading.
  #[must_use]
  pub const fn level(&self) -> u8 {
    self.level
  }

  /// Whether this block wraps content that precedes a first heading deeper
  /// than H1.
  #[must_use]
  pub const fn is_synthetic(&self) -> bool {
    self.synthetic
  }

  /// Markdown including every descendant block.
  #[must_use]
  pub fn markdown(&self) -> &str {
    &self.markdown
  }

  /// HTML including every descendant block.
  #[must_use]
  pub fn html(&self) -> &str {
    &self.html
  }

  /// Text including every descendant block.
  #[must_use]
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Markdown of this block alone, from its heading to the next heading.
  #[must_use]
  pub fn own_markdown(&self) -> &str {
    &self.own_markdown
  }

  #[must_use]
  pub fn own_html(&self) -> &str {
    &self.own_html
  }

  #[must_use]
  pub fn own_text(&self) -> &str {
    &self.own_text
  }

  /// Field captured in this block's own Markdown.
  ///
  /// The scope stops at the first child heading, so a container field that
  /// is opened here and closed inside a child block is cut at that heading.
  /// Use [`Section::field`] for fields that span headings.
  #[must_use]
  pub fn field(&self, name: &str) -> Option<&FieldData> {
    self.fields.get(name)
  }

  #[must_use]
  pub const fn fields(&self) -> &IndexMap<String, FieldData> {
    &self.fields
  }

  #[must_use]
  pub fn children(&self) -> &[Self] {
    &self.children
  }

  #[must_use]
  pub fn child(&self, index: usize) -> Option<&Self> {
    self.children.get(index)
  }

  /// This block followed by all of its descendants, pre-order.
  #[must_use]
  pub fn descendants(&self) -> Vec<&Self> {
    let mut out = vec![self];
    for child in &self.children {
      out.extend(child.descendants());
    }
    out
  }

  #[must_use]
  pub const fn images(&self) -> &ElementList {
    &self.content.images
  }

  #[must_use]
  pub const fn links(&self) -> &ElementList {
    &self.content.links
  }

  #[must_use]
  pub const fn lists(&self) -> &ElementList {
    &self.content.lists
  }

  #[must_use]
  pub const fn paragraphs(&self) -> &ElementList {
    &self.content.paragraphs
  }

  /// Every extracted element of this block, in collection order.
  pub fn elements(&self) -> impl Iterator<Item = &ContentElement> {
    self.content.iter()
  }
}

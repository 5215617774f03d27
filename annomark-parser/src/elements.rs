//! Extracted content elements and tagged fields.
use std::fmt;

use serde::Serialize;

/// Source, alt text and surrounding link of an `<img>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageData {
  pub src:   String,
  pub alt:   String,
  pub title: Option<String>,
  /// Destination of the link wrapping the image, if any.
  pub href:  Option<String>,
}

/// Destination and visible text of an `<a href>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkData {
  pub href:  String,
  pub text:  String,
  pub title: Option<String>,
}

/// A `<ul>`/`<ol>` and the text of its direct items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListData {
  pub ordered: bool,
  pub items:   Vec<String>,
}

/// Typed payload of a [`ContentElement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementData {
  Image(ImageData),
  Link(LinkData),
  List(ListData),
  Paragraph,
}

/// A single image, link, list or paragraph found in rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentElement {
  pub(crate) html: String,
  pub(crate) text: String,
  pub(crate) data: ElementData,
}

impl ContentElement {
  #[must_use]
  pub fn html(&self) -> &str {
    &self.html
  }

  #[must_use]
  pub fn text(&self) -> &str {
    &self.text
  }

  #[must_use]
  pub const fn data(&self) -> &ElementData {
    &self.data
  }

  #[must_use]
  pub const fn as_image(&self) -> Option<&ImageData> {
    match &self.data {
      ElementData::Image(image) => Some(image),
      _ => None,
    }
  }

  #[must_use]
  pub const fn as_link(&self) -> Option<&LinkData> {
    match &self.data {
      ElementData::Link(link) => Some(link),
      _ => None,
    }
  }

  #[must_use]
  pub const fn as_list(&self) -> Option<&ListData> {
    match &self.data {
      ElementData::List(list) => Some(list),
      _ => None,
    }
  }
}

/// Ordered collection of elements of one kind.
///
/// `html()` and `text()` render the whole collection in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ElementList(pub(crate) Vec<ContentElement>);

impl ElementList {
  #[must_use]
  pub const fn len(&self) -> usize {
    self.0.len()
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  #[must_use]
  pub fn get(&self, index: usize) -> Option<&ContentElement> {
    self.0.get(index)
  }

  #[must_use]
  pub fn first(&self) -> Option<&ContentElement> {
    self.0.first()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ContentElement> {
    self.0.iter()
  }

  /// Concatenated HTML of every element.
  #[must_use]
  pub fn html(&self) -> String {
    self.0.iter().map(|el| el.html.as_str()).collect()
  }

  /// Text of every non-empty element, one per line.
  #[must_use]
  pub fn text(&self) -> String {
    self
      .0
      .iter()
      .map(|el| el.text.as_str())
      .filter(|text| !text.is_empty())
      .collect::<Vec<_>>()
      .join("\n")
  }
}

impl<'a> IntoIterator for &'a ElementList {
  type IntoIter = std::slice::Iter<'a, ContentElement>;
  type Item = &'a ContentElement;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

/// Element collections shared by sections, blocks and fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedContent {
  pub(crate) images:     ElementList,
  pub(crate) links:      ElementList,
  pub(crate) lists:      ElementList,
  pub(crate) paragraphs: ElementList,
}

impl ExtractedContent {
  pub(crate) fn iter(&self) -> impl Iterator<Item = &ContentElement> {
    self
      .images
      .iter()
      .chain(self.links.iter())
      .chain(self.lists.iter())
      .chain(self.paragraphs.iter())
  }
}

/// Kind of a captured field, inferred from what it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  Heading,
  List,
  Image,
  Images,
  Link,
  Links,
  Text,
}

impl FieldType {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Heading => "heading",
      Self::List => "list",
      Self::Image => "image",
      Self::Images => "images",
      Self::Link => "link",
      Self::Links => "links",
      Self::Text => "text",
    }
  }
}

impl fmt::Display for FieldType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Structured value of a field; the variant always matches its
/// [`FieldType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
  Heading { level: u8, text: String },
  List(ListData),
  Image(ImageData),
  Images(Vec<ImageData>),
  Link(LinkData),
  Links(Vec<LinkData>),
  Text(String),
}

impl FieldValue {
  #[must_use]
  pub const fn field_type(&self) -> FieldType {
    match self {
      Self::Heading { .. } => FieldType::Heading,
      Self::List(_) => FieldType::List,
      Self::Image(_) => FieldType::Image,
      Self::Images(_) => FieldType::Images,
      Self::Link(_) => FieldType::Link,
      Self::Links(_) => FieldType::Links,
      Self::Text(_) => FieldType::Text,
    }
  }
}

/// A named capture from a `<!-- name -->` or `<!-- name... -->` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldData {
  pub(crate) name:       String,
  #[serde(rename = "type")]
  pub(crate) field_type: FieldType,
  pub(crate) markdown:   String,
  pub(crate) html:       String,
  pub(crate) text:       String,
  pub(crate) data:       FieldValue,
  #[serde(skip)]
  pub(crate) content:    ExtractedContent,
}

impl FieldData {
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  #[must_use]
  pub const fn field_type(&self) -> FieldType {
    self.field_type
  }

  #[must_use]
  pub fn markdown(&self) -> &str {
    &self.markdown
  }

  #[must_use]
  pub fn html(&self) -> &str {
    &self.html
  }

  #[must_use]
  pub fn text(&self) -> &str {
    &self.text
  }

  #[must_use]
  pub const fn data(&self) -> &FieldValue {
    &self.data
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

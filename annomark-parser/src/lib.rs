//! # annomark-parser
//!
//! Parses annotated Markdown into a structured, queryable content tree.
//! Documents are plain Markdown plus a handful of HTML comment markers that
//! tag sections, subsections and named fields without leaving Markdown.
//!
//! ## Quick Start
//!
//! ```rust
//! use annomark_parser::{FieldType, parse_string};
//!
//! let tree = parse_string(
//!   "---\ntitle: Home\n---\n<!-- section:hero -->\n<!-- headline -->\n# \
//!    Welcome\n\nSome intro text.\n",
//! );
//!
//! let hero = tree.section("hero").expect("hero section");
//! let headline = hero.field("headline").expect("headline field");
//! assert_eq!(headline.field_type(), FieldType::Heading);
//! assert_eq!(headline.text(), "Welcome");
//! assert_eq!(hero.blocks()[0].heading(), "Welcome");
//! ```
//!
//! ## Annotation grammar
//!
//! | Marker                   | Meaning                                   |
//! |--------------------------|-------------------------------------------|
//! | `<!-- section:NAME -->`  | starts a named section                    |
//! | `<!-- section -->`       | starts an unnamed section                 |
//! | `<!-- sub:NAME -->`      | opens a subsection                        |
//! | `<!-- /sub -->`          | closes the innermost subsection           |
//! | `<!-- NAME -->`          | captures the next paragraph as a field    |
//! | `<!-- NAME... -->`       | captures everything up to its closer      |
//! | `<!-- /NAME -->`         | closes the named field                    |
//! | `<!-- / -->`             | closes the innermost open field           |
//!
//! ## Configuration
//!
//! ```rust
//! use annomark_parser::{DocumentParser, ParserOptionsBuilder};
//!
//! let options = ParserOptionsBuilder::new()
//!   .gfm(true)
//!   .smart_punctuation(true)
//!   .build();
//!
//! let parser = DocumentParser::new(options);
//! let tree = parser.parse_string("Plain \"quoted\" text");
//! assert_eq!(tree.sections().len(), 1);
//! ```

pub mod elements;
pub mod error;
pub mod frontmatter;
pub mod markers;
pub mod processor;
pub mod render;
pub mod transform;
pub mod types;
pub mod utils;

pub use crate::{
  elements::{
    ContentElement,
    ElementData,
    ElementList,
    FieldData,
    FieldType,
    FieldValue,
    ImageData,
    LinkData,
    ListData,
  },
  error::{ParseError, ParseResult},
  frontmatter::{
    Frontmatter,
    FrontmatterMap,
    FrontmatterValue,
    SerializeOptions,
    serialize,
    serialize_with,
  },
  processor::{
    DocumentParser,
    ParserOptions,
    ParserOptionsBuilder,
    collect_markdown_files,
    parse_batch,
    parse_file,
    parse_string,
  },
  render::{RenderOptions, Renderer},
  transform::{ImageSourceRewriter, TreeTransformer},
  types::{Block, ContentTree, Section, SectionKey},
};

//! Document parsing pipeline.
//!
//! - [`types`]: parser options and the [`DocumentParser`] handle
//! - [`core`]: frontmatter, sections and subsections
//! - `blocks`: heading block trees
//! - `fields`: field capture and type inference
//! - [`extract`]: content element extraction
//! - [`process`]: convenience entry points and batch parsing
mod blocks;
pub mod core;
pub mod extract;
mod fields;
pub mod process;
pub mod types;

pub use extract::extract_content;
pub use process::{
  collect_markdown_files,
  parse_batch,
  parse_file,
  parse_string,
};
pub use types::{DocumentParser, ParserOptions, ParserOptionsBuilder};

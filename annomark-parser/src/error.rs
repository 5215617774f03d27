use std::path::PathBuf;

use thiserror::Error;

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors surfaced by the parser.
///
/// Malformed markers, frontmatter and captures are normalized away rather
/// than reported, so the only failure is a document that cannot be read.
#[derive(Debug, Error)]
pub enum ParseError {
  /// The source document is missing or unreadable.
  #[error("failed to read source document `{path}`: {source}")]
  SourceUnavailable {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

//! High-level parsing functions.
use std::path::{Path, PathBuf};

use log::trace;
use rayon::prelude::*;
use walkdir::WalkDir;

use super::types::DocumentParser;
use crate::{error::ParseResult, types::ContentTree};

/// Parse an in-memory document with default options.
#[must_use]
pub fn parse_string(text: &str) -> ContentTree {
  DocumentParser::default().parse_string(text)
}

/// Read and parse a document with default options.
///
/// # Errors
///
/// Returns [`ParseError::SourceUnavailable`](crate::ParseError) if the file
/// cannot be read.
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<ContentTree> {
  DocumentParser::default().parse_file(path.as_ref())
}

/// Parse many files in parallel.
///
/// Each file is an independent parse on the rayon pool. Results are
/// returned in the order of `paths`; a file that cannot be read yields an
/// error for that entry only.
pub fn parse_batch<P>(
  parser: &DocumentParser,
  paths: &[P],
) -> Vec<(PathBuf, ParseResult<ContentTree>)>
where
  P: AsRef<Path> + Sync,
{
  paths
    .par_iter()
    .map(|path| {
      let path = path.as_ref();
      (path.to_path_buf(), parser.parse_file(path))
    })
    .collect()
}

/// Collect all Markdown files below `input_dir`, sorted by path.
#[must_use]
pub fn collect_markdown_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(Result::ok)
    .map(walkdir::DirEntry::into_path)
    .filter(|path| {
      path.is_file()
        && path
          .extension()
          .is_some_and(|ext| ext == "md" || ext == "markdown")
    })
    .collect();
  files.sort();

  trace!("Found {} markdown files to parse", files.len());
  files
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;
  use crate::error::ParseError;

  #[test]
  fn test_parse_string_defaults() {
    let tree = parse_string("# Test Header\n\nSome content.");
    assert_eq!(tree.sections().len(), 1);
    assert_eq!(tree.sections()[0].blocks()[0].heading(), "Test Header");
  }

  #[test]
  fn test_parse_batch_keeps_order() -> Result<(), std::io::Error> {
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("one.md");
    let missing = dir.path().join("missing.md");
    let second = dir.path().join("two.md");
    fs::write(&first, "# One\n")?;
    fs::write(&second, "# Two\n")?;

    let paths = vec![first.clone(), missing.clone(), second.clone()];
    let results = parse_batch(&DocumentParser::default(), &paths);

    let order: Vec<&PathBuf> = results.iter().map(|(path, _)| path).collect();
    assert_eq!(order, vec![&first, &missing, &second]);
    assert!(matches!(
      results[1].1,
      Err(ParseError::SourceUnavailable { .. })
    ));
    let headings: Vec<String> = results
      .iter()
      .filter_map(|(_, result)| result.as_ref().ok())
      .map(|tree| tree.sections()[0].blocks()[0].heading().to_string())
      .collect();
    assert_eq!(headings, vec!["One", "Two"]);
    Ok(())
  }

  #[test]
  fn test_collect_markdown_files() -> Result<(), std::io::Error> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("nested"))?;
    fs::write(dir.path().join("b.md"), "b")?;
    fs::write(dir.path().join("nested/a.markdown"), "a")?;
    fs::write(dir.path().join("notes.txt"), "skip")?;

    let files = collect_markdown_files(dir.path());
    assert_eq!(files, vec![
      dir.path().join("b.md"),
      dir.path().join("nested/a.markdown"),
    ]);
    Ok(())
  }
}

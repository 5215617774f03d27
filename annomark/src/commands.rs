//! Implementations of the annomark subcommands.
//!
//! Each command returns the text it would print so it can be exercised
//! without a terminal; `main` decides where the output goes.
use std::{
  fmt::Write as _,
  fs,
  path::{Path, PathBuf},
};

use annomark_parser::{
  Block,
  ContentTree,
  DocumentParser,
  FieldData,
  Frontmatter,
  FrontmatterMap,
  Section,
  SerializeOptions,
  collect_markdown_files,
  parse_batch,
  serialize_with,
};
use color_eyre::eyre::{Context, Result, bail, eyre};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
  let json = if pretty {
    serde_json::to_string_pretty(value)
  } else {
    serde_json::to_string(value)
  };
  json.wrap_err("Failed to serialize output as JSON")
}

/// Expand directories into the Markdown files below them.
#[must_use]
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
  let mut files = Vec::new();
  for input in inputs {
    if input.is_dir() {
      let found = collect_markdown_files(input);
      debug!("Found {} markdown files in {}", found.len(), input.display());
      files.extend(found);
    } else {
      files.push(input.clone());
    }
  }
  files
}

/// Parse every input and render the resulting trees as JSON.
///
/// A single input prints its tree directly; several inputs print an object
/// keyed by path. With `section`, only that section of each tree is printed
/// (`null` where a document has no such section).
///
/// # Errors
///
/// Returns an error if no Markdown files were found, if any document could
/// not be read, or if a single document lacks the requested section.
pub fn parse(
  parser: &DocumentParser,
  inputs: &[PathBuf],
  section: Option<&str>,
  pretty: bool,
) -> Result<String> {
  let files = expand_inputs(inputs);
  if files.is_empty() {
    bail!("No markdown files found in the given inputs");
  }
  info!("Parsing {} document(s)", files.len());

  let mut trees = Vec::with_capacity(files.len());
  let mut failures = Vec::new();
  for (path, result) in parse_batch(parser, &files) {
    match result {
      Ok(tree) => trees.push((path, tree)),
      Err(e) => {
        warn!("{e}");
        failures.push(path.display().to_string());
      },
    }
  }
  if !failures.is_empty() {
    bail!(
      "Failed to read {} document(s): {}",
      failures.len(),
      failures.join(", ")
    );
  }

  let select = |tree: &ContentTree| -> Result<Value> {
    let value = match section {
      Some(name) => serde_json::to_value(tree.section(name)),
      None => serde_json::to_value(tree),
    };
    value.wrap_err("Failed to convert content tree to JSON")
  };

  if let [(path, tree)] = trees.as_slice() {
    if let Some(name) = section {
      if tree.section(name).is_none() {
        bail!("No section named '{name}' in {}", path.display());
      }
    }
    return to_json(&select(tree)?, pretty);
  }

  // Keys stay in input order; serde_json is built with `preserve_order`.
  let mut output = Map::new();
  for (path, tree) in &trees {
    output.insert(path.display().to_string(), select(tree)?);
  }
  to_json(&output, pretty)
}

/// Render the frontmatter of a document as JSON.
///
/// A document without frontmatter prints `null`; raw frontmatter prints as a
/// JSON string.
///
/// # Errors
///
/// Returns an error if the document cannot be read.
pub fn frontmatter(
  parser: &DocumentParser,
  input: &Path,
  pretty: bool,
) -> Result<String> {
  let tree = parser.parse_file(input)?;
  to_json(&tree.frontmatter(), pretty)
}

/// Re-serialize a document with its frontmatter in canonical form.
///
/// Raw frontmatter cannot be re-emitted as a map, so such documents are
/// returned as they were read.
///
/// # Errors
///
/// Returns an error if the document cannot be read.
pub fn format_document(
  parser: &DocumentParser,
  input: &Path,
  options: SerializeOptions,
) -> Result<String> {
  let source = fs::read_to_string(input)
    .wrap_err_with(|| format!("Failed to read {}", input.display()))?;
  let tree = parser.parse_string(&source);

  let empty = FrontmatterMap::new();
  let map = match tree.frontmatter() {
    Some(Frontmatter::Map(map)) => map,
    Some(Frontmatter::Raw(_)) => {
      warn!(
        "{} has frontmatter without any keys; leaving it unchanged",
        input.display()
      );
      return Ok(source);
    },
    None => &empty,
  };

  Ok(serialize_with(map, tree.body(), options))
}

/// Write formatted output back to `input`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_in_place(input: &Path, formatted: &str) -> Result<()> {
  fs::write(input, formatted)
    .wrap_err_with(|| format!("Failed to write {}", input.display()))?;
  info!("Formatted {}", input.display());
  Ok(())
}

/// List the fields of every section, subsection and block as an indented
/// outline.
///
/// # Errors
///
/// Returns an error if the document cannot be read.
pub fn fields(parser: &DocumentParser, input: &Path) -> Result<String> {
  let tree = parser.parse_file(input)?;
  let mut out = String::new();
  for (index, section) in tree.sections().iter().enumerate() {
    let label = section
      .name()
      .map_or_else(|| format!("#{index}"), str::to_string);
    write_section(&mut out, &label, section, 0)?;
  }
  Ok(out)
}

fn write_section(
  out: &mut String,
  label: &str,
  section: &Section,
  depth: usize,
) -> Result<()> {
  let indent = "  ".repeat(depth);
  writeln!(out, "{indent}section {label}")?;
  write_fields(out, section.fields().values(), depth + 1)?;
  for (name, subsection) in section.subsections() {
    write_section(out, name, subsection, depth + 1)?;
  }
  for block in section.blocks() {
    write_block(out, block, depth + 1)?;
  }
  Ok(())
}

fn write_block(out: &mut String, block: &Block, depth: usize) -> Result<()> {
  let indent = "  ".repeat(depth);
  let synthetic = if block.is_synthetic() { " synthetic" } else { "" };
  writeln!(
    out,
    "{indent}block h{} \"{}\"{synthetic}",
    block.level(),
    block.heading()
  )?;
  write_fields(out, block.fields().values(), depth + 1)?;
  for child in block.children() {
    write_block(out, child, depth + 1)?;
  }
  Ok(())
}

fn write_fields<'a>(
  out: &mut String,
  fields: impl Iterator<Item = &'a FieldData>,
  depth: usize,
) -> Result<()> {
  let indent = "  ".repeat(depth);
  for field in fields {
    writeln!(out, "{indent}{:<24} {}", field.name(), field.field_type())?;
  }
  Ok(())
}

/// Reject option combinations clap cannot express.
///
/// # Errors
///
/// Returns an error when `--in-place` is used on something other than a
/// regular file.
pub fn check_in_place_target(input: &Path) -> Result<()> {
  if input.is_file() {
    Ok(())
  } else {
    Err(eyre!(
      "--in-place needs a regular file, got {}",
      input.display()
    ))
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_expand_inputs_walks_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("b.md"), "b").unwrap();
    fs::write(dir.path().join("nested/a.markdown"), "a").unwrap();
    fs::write(dir.path().join("notes.txt"), "skip").unwrap();
    let single = dir.path().join("single.md");

    let files = expand_inputs(&[dir.path().to_path_buf(), single.clone()]);
    assert_eq!(files.len(), 3);
    assert_eq!(files.last(), Some(&single));
  }

  #[test]
  fn test_fields_outline() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.md");
    fs::write(
      &path,
      "<!-- section:hero -->\n<!-- headline -->\n# Welcome\n\n<!-- cta \
       -->\n[Start](/start)\n",
    )
    .unwrap();

    let out = fields(&DocumentParser::default(), &path).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "section hero");
    assert!(lines[1].starts_with("  headline"));
    assert!(lines[1].ends_with("heading"));
    assert!(lines.iter().any(|line| line.trim() == "block h1 \"Welcome\""));
  }

  #[test]
  fn test_check_in_place_target() {
    let dir = tempdir().unwrap();
    assert!(check_in_place_target(dir.path()).is_err());
  }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for annomark
#[derive(Parser, Debug)]
#[command(author, version, about = "annomark: annotated Markdown parser")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the annomark CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Parse documents and print their content trees as JSON.
  Parse {
    /// Markdown files or directories to parse. Directories are searched
    /// recursively for `.md` and `.markdown` files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Only print the section with this name.
    #[arg(short, long)]
    section: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pretty: bool,

    /// Number of threads to use for parallel parsing.
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,
  },

  /// Print the frontmatter of a document as JSON.
  Frontmatter {
    /// Markdown file to read.
    input: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pretty: bool,
  },

  /// Re-serialize a document's frontmatter in canonical form.
  Fmt {
    /// Markdown file to format.
    input: PathBuf,

    /// Emit frontmatter keys in lexicographic order.
    #[arg(long = "sort-keys", action = clap::ArgAction::SetTrue)]
    sort_keys: bool,

    /// Write the result back to the file instead of standard output.
    #[arg(short, long = "in-place", action = clap::ArgAction::SetTrue)]
    in_place: bool,
  },

  /// List the fields captured in each section and block of a document.
  Fields {
    /// Markdown file to inspect.
    input: PathBuf,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_parse_subcommand_collects_inputs() {
    let cli = Cli::try_parse_from([
      "annomark",
      "-v",
      "--config",
      "gfm=false",
      "parse",
      "a.md",
      "docs",
      "--pretty",
      "-j",
      "2",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.config_overrides, vec!["gfm=false".to_string()]);
    let Commands::Parse {
      inputs,
      pretty,
      jobs,
      section,
    } = cli.command
    else {
      panic!("expected parse command");
    };
    assert_eq!(inputs, vec![PathBuf::from("a.md"), PathBuf::from("docs")]);
    assert!(pretty);
    assert_eq!(jobs, Some(2));
    assert_eq!(section, None);
  }

  #[test]
  fn test_parse_requires_input() {
    assert!(Cli::try_parse_from(["annomark", "parse"]).is_err());
  }

  #[test]
  fn test_global_config_files_after_subcommand() {
    let cli = Cli::try_parse_from([
      "annomark",
      "fmt",
      "doc.md",
      "-c",
      "one.toml",
      "-c",
      "two.json",
    ])
    .unwrap();

    assert_eq!(cli.config_files, vec![
      PathBuf::from("one.toml"),
      PathBuf::from("two.json")
    ]);
  }
}

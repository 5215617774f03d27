use std::{
  fs,
  path::{Path, PathBuf},
};

use annomark_parser::{
  ParserOptions,
  ParserOptionsBuilder,
  SerializeOptions,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the annomark command line tool.
///
/// Values are resolved in layers: built-in defaults, then each config file in
/// the order given, then `--config KEY=VALUE` overrides. Command line flags
/// are applied on top by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Enable GitHub Flavored Markdown extensions when rendering.
  pub gfm: bool,

  /// Convert straight quotes and dashes to typographic forms.
  pub smart_punctuation: bool,

  /// Render soft line breaks as `<br>`.
  pub hard_breaks: bool,

  /// Leave comments inside fenced code blocks alone.
  pub ignore_markers_in_code: bool,

  /// Sort frontmatter keys when re-serializing documents.
  pub sort_keys: bool,

  /// Pretty-print JSON output.
  pub pretty: bool,

  /// Number of worker threads. Defaults to the number of CPUs.
  pub jobs: Option<usize>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      gfm:                    true,
      smart_punctuation:      false,
      hard_breaks:            false,
      ignore_markers_in_code: true,
      sort_keys:              false,
      pretty:                 false,
      jobs:                   None,
    }
  }
}

/// One layer of configuration as read from a file.
///
/// Every key is optional; keys a file does not mention leave the value from
/// earlier layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
  pub gfm:                    Option<bool>,
  pub smart_punctuation:      Option<bool>,
  pub hard_breaks:            Option<bool>,
  pub ignore_markers_in_code: Option<bool>,
  pub sort_keys:              Option<bool>,
  pub pretty:                 Option<bool>,
  pub jobs:                   Option<usize>,
}

impl PartialConfig {
  /// Load one layer from a file (TOML or JSON, chosen by extension).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format
  /// is unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);
    match extension.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            ConfigError::from(e)
          ))
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            ConfigError::from(e)
          ))
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Merge a later layer into this one; keys set in `other` win.
  pub fn merge(&mut self, other: Self) {
    macro_rules! take {
      ($($field:ident),* $(,)?) => {
        $(
          if other.$field.is_some() {
            self.$field = other.$field;
          }
        )*
      };
    }
    take!(
      gfm,
      smart_punctuation,
      hard_breaks,
      ignore_markers_in_code,
      sort_keys,
      pretty,
      jobs,
    );
  }
}

impl Config {
  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Files are merged in order, later files overriding earlier ones. When no
  /// file is given, a config file in the working directory is picked up if
  /// one exists.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let discovered;
    let files = if config_files.is_empty() {
      discovered = Self::find_config_file();
      if let Some(path) = &discovered {
        log::info!("Using discovered config file: {}", path.display());
      }
      discovered.as_slice()
    } else {
      config_files
    };

    let mut layer = PartialConfig::default();
    for path in files {
      let next = PartialConfig::from_file(path).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          path.display(),
          e
        ))
      })?;
      layer.merge(next);
    }
    if files.len() > 1 {
      log::info!("Loaded and merged {} config files", files.len());
    }

    let mut config = Self::default();
    config.apply_layer(layer);
    config.apply_overrides(config_overrides)?;
    Ok(config)
  }

  /// Apply every key a layer sets.
  pub fn apply_layer(&mut self, layer: PartialConfig) {
    let PartialConfig {
      gfm,
      smart_punctuation,
      hard_breaks,
      ignore_markers_in_code,
      sort_keys,
      pretty,
      jobs,
    } = layer;

    self.gfm = gfm.unwrap_or(self.gfm);
    self.smart_punctuation =
      smart_punctuation.unwrap_or(self.smart_punctuation);
    self.hard_breaks = hard_breaks.unwrap_or(self.hard_breaks);
    self.ignore_markers_in_code =
      ignore_markers_in_code.unwrap_or(self.ignore_markers_in_code);
    self.sort_keys = sort_keys.unwrap_or(self.sort_keys);
    self.pretty = pretty.unwrap_or(self.pretty);
    if jobs.is_some() {
      self.jobs = jobs;
    }
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in `KEY=VALUE` format, names an
  /// unknown key, or carries a value of the wrong type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single configuration override by key.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys and unparseable values.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let flag = match key {
      "gfm" => &mut self.gfm,
      "smart_punctuation" => &mut self.smart_punctuation,
      "hard_breaks" => &mut self.hard_breaks,
      "ignore_markers_in_code" => &mut self.ignore_markers_in_code,
      "sort_keys" => &mut self.sort_keys,
      "pretty" => &mut self.pretty,
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(value.parse().map_err(|_| {
            ConfigError::Config(format!(
              "Invalid value for 'jobs': '{value}'. Expected a positive \
               integer"
            ))
          })?)
        };
        return Ok(());
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    };

    *flag = parse_bool(key, value)?;
    Ok(())
  }

  /// Search the working directory for a config file.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    Self::find_config_file_in(&current_dir)
  }

  /// Search `dir` for a config file.
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    const CONFIG_FILENAMES: [&str; 6] = [
      "annomark.toml",
      "annomark.json",
      ".annomark.toml",
      ".annomark.json",
      ".config/annomark.toml",
      ".config/annomark.json",
    ];

    CONFIG_FILENAMES
      .iter()
      .map(|filename| dir.join(filename))
      .find(|path| path.is_file())
  }

  /// Parser options described by this configuration.
  #[must_use]
  pub fn parser_options(&self) -> ParserOptions {
    ParserOptionsBuilder::new()
      .gfm(self.gfm)
      .smart_punctuation(self.smart_punctuation)
      .hard_breaks(self.hard_breaks)
      .ignore_markers_in_code(self.ignore_markers_in_code)
      .build()
  }

  /// Serializer options described by this configuration.
  #[must_use]
  pub const fn serialize_options(&self) -> SerializeOptions {
    SerializeOptions {
      sort_keys: self.sort_keys,
    }
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}

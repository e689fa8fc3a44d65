//! Shared configuration loader for the blockmark toolchain.
//!
//! `defaults/blockmark.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`BlockmarkConfig`].

use blockmark_babel::formats::json::JsonOptions;
use blockmark_babel::formats::markdown::parser::ImportOptions;
use blockmark_babel::formats::markdown::parsers::ParserChoice;
use blockmark_babel::formats::markdown::serializer::ExportOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/blockmark.default.toml");

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "blockmark.toml";

/// Top-level configuration consumed by blockmark applications.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockmarkConfig {
    pub markdown: MarkdownConfig,
    pub serialize: SerializeConfig,
    pub json: JsonConfig,
}

/// Markdown import knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub parser: ParserChoice,
    pub max_nesting_depth: usize,
}

impl From<&MarkdownConfig> for ImportOptions {
    fn from(config: &MarkdownConfig) -> Self {
        ImportOptions {
            parser: config.parser,
            max_nesting_depth: config.max_nesting_depth,
        }
    }
}

impl From<MarkdownConfig> for ImportOptions {
    fn from(config: MarkdownConfig) -> Self {
        ImportOptions::from(&config)
    }
}

/// Markdown export knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SerializeConfig {
    pub escape_text: bool,
}

impl From<&SerializeConfig> for ExportOptions {
    fn from(config: &SerializeConfig) -> Self {
        ExportOptions {
            escape_text: config.escape_text,
        }
    }
}

impl From<SerializeConfig> for ExportOptions {
    fn from(config: SerializeConfig) -> Self {
        ExportOptions::from(&config)
    }
}

/// JSON output knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonConfig {
    pub pretty: bool,
    /// Save-format version stamped on documents that come from markdown.
    pub version: String,
    pub stamp_time: bool,
}

impl From<&JsonConfig> for JsonOptions {
    fn from(config: &JsonConfig) -> Self {
        JsonOptions {
            pretty: config.pretty,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<BlockmarkConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<BlockmarkConfig, ConfigError> {
    Loader::new().build()
}

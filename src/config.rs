//! Configuration handling for the unpacker.

use crate::types::{BundleFormat, ModuleId};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Default name of the webpack 4 chunk-loader global.
pub const DEFAULT_CHUNK_GLOBAL: &str = "webpackJsonp";

/// Locate the module table and entry point of webpack bundles.
#[derive(Parser, Debug, Clone)]
#[command(name = "debundle")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Bundle file(s) to inspect
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Bootstrap format of the inputs
    #[arg(long, value_enum, default_value = "auto")]
    pub format: FormatArg,

    /// Entry module id, skips entry-point recovery
    #[arg(short, long)]
    pub entry: Option<ModuleId>,

    /// Name of the chunk-loader global used by jsonp bundles
    #[arg(long, env = "DEBUNDLE_CHUNK_GLOBAL", default_value = DEFAULT_CHUNK_GLOBAL)]
    pub chunk_global: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: only show inputs that failed
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Format selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Infer the format from each input
    Auto,
    Webpack,
    WebpackJsonp,
}

impl FormatArg {
    pub fn format(self) -> Option<BundleFormat> {
        match self {
            Self::Auto => None,
            Self::Webpack => Some(BundleFormat::Webpack),
            Self::WebpackJsonp => Some(BundleFormat::WebpackJsonp),
        }
    }
}

/// Caller-owned detection options.
///
/// `entry_point` is both an override (when set before detection) and the
/// cache that [`crate::bundle::detect_bundle`] fills after a successful
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Bootstrap format, or `None` to infer it from the call shape.
    pub format: Option<BundleFormat>,
    pub entry_point: Option<ModuleId>,
    /// Chunk-loader global checked by the jsonp detector.
    pub chunk_global: String,
}

impl Options {
    pub fn with_format(mut self, format: BundleFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_entry_point(mut self, entry_point: ModuleId) -> Self {
        self.entry_point = Some(entry_point);
        self
    }

    pub fn with_chunk_global(mut self, name: impl Into<String>) -> Self {
        self.chunk_global = name.into();
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: None,
            entry_point: None,
            chunk_global: DEFAULT_CHUNK_GLOBAL.to_string(),
        }
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Self {
            format: config.format.format(),
            entry_point: config.entry.clone(),
            chunk_global: config.chunk_global.clone(),
        }
    }
}

//! Core types and errors for bundle detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while detecting or unpacking a bundle.
#[derive(Error, Debug)]
pub enum DebundleError {
    /// The call matches the other supported bootstrap shape.
    #[error("This bundle looks like a {expected} bundle. Set the format to '{expected}' and try again.")]
    FormatMismatch { expected: BundleFormat },

    #[error("The AST is not a recognized webpack bootstrap call")]
    NotABootstrap,

    #[error("No entry point was given and the entry id could not be recovered from the bootstrap")]
    EntryPointNotFound,

    #[error("Malformed module table: {0}")]
    MalformedModuleTable(String),

    #[error("No bootstrap call found at the top level of {0}")]
    NoBootstrapCall(String),

    #[error("AST parse error: {0}")]
    AstParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DebundleError>;

/// Identifies a module within one bundle.
///
/// Classic bundles index an array table (`Number`), keyed tables may use
/// either numbers or hashed names like `"EwB5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleId {
    Number(u64),
    Name(String),
}

impl ModuleId {
    /// Convert a JS numeric literal value. Only finite non-negative integers are ids.
    pub fn from_number(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Some(Self::Number(value as u64))
        } else {
            None
        }
    }

    /// Interpret an object-table key. Canonical numeric keys (`"12"`) become numbers.
    pub fn from_key(key: &str) -> Self {
        match key.parse::<u64>() {
            Ok(n) if n.to_string() == key => Self::Number(n),
            _ => Self::Name(key.to_string()),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(name) => write!(f, "{:?}", name),
        }
    }
}

impl FromStr for ModuleId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_key(s.trim()))
    }
}

/// The bootstrap shapes this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleFormat {
    /// `(function(modules) { ... })([...])`
    Webpack,
    /// `(window.webpackJsonp = window.webpackJsonp || []).push([[ids], modules, [[entry]]])`
    WebpackJsonp,
}

impl BundleFormat {
    /// The format a caller should retry with after a mismatch.
    pub fn other(self) -> Self {
        match self {
            Self::Webpack => Self::WebpackJsonp,
            Self::WebpackJsonp => Self::Webpack,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webpack => "webpack",
            Self::WebpackJsonp => "webpack-jsonp",
        }
    }
}

impl fmt::Display for BundleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the entry id of a detection result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Supplied by the caller through `Options::entry_point`.
    Override,
    /// Recovered from the bootstrap by structural heuristics.
    Resolved,
    /// Heuristics failed and the format tolerates a missing entry (jsonp only).
    Unresolved,
}

/// Summary of one extracted module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub is_entry: bool,
    /// Byte offsets of the module factory in the source.
    pub start: u32,
    pub end: u32,
}

/// Result of unpacking one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnpackReport {
    /// File path or name of the input.
    pub source: String,
    pub format: Option<BundleFormat>,
    pub entry_id: Option<ModuleId>,
    pub entry_source: Option<EntrySource>,
    pub module_count: usize,
    pub modules: Vec<ModuleSummary>,
    /// Errors encountered for this input.
    pub errors: Vec<String>,
}

impl UnpackReport {
    /// An empty report for an input that failed before detection finished.
    pub fn failed(source: &str, error: &DebundleError) -> Self {
        Self {
            source: source.to_string(),
            format: None,
            entry_id: None,
            entry_source: None,
            module_count: 0,
            modules: Vec::new(),
            errors: vec![error.to_string()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

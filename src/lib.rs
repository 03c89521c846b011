//! debundle - Webpack bootstrap detection and entry-point recovery.
//!
//! This library inspects the AST of a webpack bundle and:
//! - Classifies the top-level bootstrap call (classic IIFE or jsonp chunk)
//! - Locates the module table node without copying it
//! - Recovers the entry module id from the bootstrap
//! - Walks the table into individual module records
//!
//! # Example
//!
//! ```no_run
//! use debundle::{Options, Unpacker};
//!
//! let unpacker = Unpacker::new(Options::default());
//! let report = unpacker.unpack_file("dist/main.js".as_ref()).unwrap();
//! println!("{} modules, entry {:?}", report.module_count, report.entry_id);
//! ```

pub mod bundle;
pub mod config;
pub mod modules;
pub mod output;
pub mod parser;
pub mod types;
pub mod unpacker;

pub use bundle::{
    detect_bundle, BundleDetector, BundleInfo, ModulesAst, WebpackDetector, WebpackJsonpDetector,
};
pub use config::{Config, Options};
pub use modules::{extract_modules, Module};
pub use unpacker::Unpacker;
pub use types::{
    BundleFormat, DebundleError, EntrySource, ModuleId, ModuleSummary, Result, UnpackReport,
};

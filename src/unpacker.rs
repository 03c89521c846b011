//! Unpacker orchestrating parsing, detection and module extraction.

use crate::bundle::{detect_bundle, infer_format, BundleInfo};
use crate::config::Options;
use crate::modules::extract_modules;
use crate::parser::{find_bootstrap_call, parse_program, WebpackSniffer};
use crate::types::{BundleFormat, DebundleError, Result, UnpackReport};
use oxc_allocator::Allocator;
use oxc_ast::ast::CallExpression;
use std::path::Path;
use tracing::{debug, info};

/// Runs the whole pipeline over bundle sources.
pub struct Unpacker {
    options: Options,
    sniffer: WebpackSniffer,
}

impl Unpacker {
    /// Create a new unpacker with the given options.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            sniffer: WebpackSniffer::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Read and unpack a bundle file.
    pub fn unpack_file(&self, path: &Path) -> Result<UnpackReport> {
        let source = std::fs::read_to_string(path)?;
        self.unpack_source(&path.display().to_string(), &source)
    }

    /// Unpack many files, one report each. Failures are recorded in the report.
    pub fn unpack_files<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<UnpackReport> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let name = path.display().to_string();
                self.unpack_file(path).unwrap_or_else(|e| {
                    debug!("Failed to unpack {}: {}", name, e);
                    UnpackReport::failed(&name, &e)
                })
            })
            .collect()
    }

    /// Unpack a bundle held in memory.
    pub fn unpack_source(&self, name: &str, source: &str) -> Result<UnpackReport> {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, source, name)?;
        let call = find_bootstrap_call(&program)
            .ok_or_else(|| DebundleError::NoBootstrapCall(name.to_string()))?;

        // Each input starts from the configured options, never from another input's entry
        let mut options = self.options.clone();
        let info = self.detect(call, source, &mut options)?;
        let modules = extract_modules(&info)?;

        info!(
            "{}: {} bundle, {} modules, entry {}",
            name,
            info.format,
            modules.len(),
            info.entry_id
                .as_ref()
                .map_or_else(|| "unknown".to_string(), |id| id.to_string())
        );

        Ok(UnpackReport {
            source: name.to_string(),
            format: Some(info.format),
            entry_id: info.entry_id.clone(),
            entry_source: Some(info.entry_source),
            module_count: modules.len(),
            modules: modules.iter().map(|m| m.summary()).collect(),
            errors: Vec::new(),
        })
    }

    /// Detect with the configured format, or in auto mode with the format the
    /// callee shape implies.
    ///
    /// The text sniff is only compared against that choice; the callee shape
    /// decides.
    fn detect<'b, 'a>(
        &self,
        call: &'b CallExpression<'a>,
        source: &str,
        options: &mut Options,
    ) -> Result<BundleInfo<'b, 'a>> {
        if options.format.is_none() {
            let format = infer_format(call);
            match self.sniffer.sniff_format(source) {
                Some(hint) if hint != format => {
                    debug!("Text markers suggest {}, detecting as {}", hint, format)
                }
                _ => debug!("Detecting as {}", format),
            }
            options.format = Some(format);
        }

        detect_bundle(call, options)
    }

    /// Detect the bundle format of a source without walking the module table.
    pub fn detect_format(&self, source: &str) -> Result<BundleFormat> {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, source, "<input>")?;
        let call = find_bootstrap_call(&program)
            .ok_or_else(|| DebundleError::NoBootstrapCall("<input>".to_string()))?;

        let mut options = self.options.clone();
        let info = self.detect(call, source, &mut options)?;
        Ok(info.format)
    }
}

impl Default for Unpacker {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

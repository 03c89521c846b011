//! Text-level pre-screening of webpack bundles.

use crate::types::BundleFormat;
use regex::Regex;
use tracing::trace;

/// Cheap regex checks run before the source is parsed.
#[derive(Clone)]
pub struct WebpackSniffer {
    /// Markers of the classic runtime's final `require(require.s = id)`.
    classic_patterns: Vec<Regex>,
    /// Markers of a chunk registered through the jsonp loader.
    jsonp_patterns: Vec<Regex>,
}

impl WebpackSniffer {
    /// Create a new sniffer.
    pub fn new() -> Self {
        let classic_patterns = vec![
            // return __webpack_require__(__webpack_require__.s = 8);
            Regex::new(r"__webpack_require__\(\s*__webpack_require__\.s\s*=").unwrap(),
            // minified: n(n.s=8)
            Regex::new(r"[\w$]+\([\w$]+\.s\s*=\s*\d+\)").unwrap(),
        ];

        let jsonp_patterns = vec![
            // window.webpackJsonp, window["webpackJsonp"], webpackJsonp([...])
            Regex::new(r#"webpackJsonp"#).unwrap(),
            // webpack 5 style loader globals
            Regex::new(r#"webpackChunk[\w$]*"#).unwrap(),
        ];

        Self {
            classic_patterns,
            jsonp_patterns,
        }
    }

    /// Check if JS content mentions any webpack bootstrap marker.
    pub fn is_webpack_bundle(&self, content: &str) -> bool {
        self.sniff_format(content).is_some() || content.contains("__webpack_require__")
    }

    /// Guess the bootstrap format from the raw text.
    ///
    /// A classic runtime may itself reference the jsonp global, so the
    /// classic markers win when both match.
    pub fn sniff_format(&self, content: &str) -> Option<BundleFormat> {
        if self.classic_patterns.iter().any(|p| p.is_match(content)) {
            trace!("Sniffed classic webpack runtime");
            return Some(BundleFormat::Webpack);
        }
        if self.jsonp_patterns.iter().any(|p| p.is_match(content)) {
            trace!("Sniffed webpack jsonp chunk");
            return Some(BundleFormat::WebpackJsonp);
        }
        None
    }
}

impl Default for WebpackSniffer {
    fn default() -> Self {
        Self::new()
    }
}

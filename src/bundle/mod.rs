//! Webpack bootstrap detection.
//!
//! This module classifies a top-level bootstrap call as one of two webpack
//! shapes and locates:
//! - The AST node holding the module table
//! - The id of the entry module
//!
//! Both shapes implement [`BundleDetector`]. The detectors never modify the
//! AST and never write to [`Options`]; [`detect_bundle`] is the one place
//! that caches a resolved entry id back into the caller's options.

pub mod jsonp;
pub mod webpack;

pub use jsonp::WebpackJsonpDetector;
pub use webpack::WebpackDetector;

use crate::config::Options;
use crate::types::{BundleFormat, EntrySource, ModuleId, Result};
use oxc_ast::ast::*;
use oxc_span::Span;
use tracing::debug;

/// The located module table, borrowed from the caller's AST.
#[derive(Debug, Clone, Copy)]
pub enum ModulesAst<'b, 'a> {
    /// Positions imply ids `0..n`.
    Array(&'b ArrayExpression<'a>),
    /// Keys are the ids.
    Object(&'b ObjectExpression<'a>),
}

impl<'b, 'a> ModulesAst<'b, 'a> {
    /// Narrow an expression to a module table, if it has the right shape.
    pub fn from_expression(expr: &'b Expression<'a>) -> Option<Self> {
        match skip_parens(expr) {
            Expression::ArrayExpression(array) => Some(Self::Array(array)),
            Expression::ObjectExpression(object) => Some(Self::Object(object)),
            _ => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Array(array) => array.span,
            Self::Object(object) => object.span,
        }
    }

    /// Number of entries in the table, holes included.
    pub fn len(&self) -> usize {
        match self {
            Self::Array(array) => array.elements.len(),
            Self::Object(object) => object.properties.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a successful detection.
#[derive(Debug, Clone)]
pub struct BundleInfo<'b, 'a> {
    pub format: BundleFormat,
    /// Always present for [`BundleFormat::Webpack`].
    pub entry_id: Option<ModuleId>,
    pub entry_source: EntrySource,
    pub modules_ast: ModulesAst<'b, 'a>,
}

/// A detector for one bootstrap shape.
pub trait BundleDetector {
    fn format(&self) -> BundleFormat;

    /// Validate `call`, locate its module table and, unless
    /// `options.entry_point` is set, recover the entry id.
    fn detect<'b, 'a>(
        &self,
        call: &'b CallExpression<'a>,
        options: &Options,
    ) -> Result<BundleInfo<'b, 'a>>;
}

/// Guess the format from the callee shape alone.
pub fn infer_format(call: &CallExpression<'_>) -> BundleFormat {
    match skip_parens(&call.callee) {
        Expression::FunctionExpression(_) => BundleFormat::Webpack,
        _ => BundleFormat::WebpackJsonp,
    }
}

/// Get the detector for a format.
pub fn detector_for(format: BundleFormat, options: &Options) -> Box<dyn BundleDetector> {
    match format {
        BundleFormat::Webpack => Box::new(WebpackDetector::new()),
        BundleFormat::WebpackJsonp => Box::new(WebpackJsonpDetector::new(&options.chunk_global)),
    }
}

/// Detect the bundle using the format in `options` (inferred when unset).
///
/// A freshly resolved entry id is written back to `options.entry_point`, so a
/// later call with the same options reuses it instead of re-resolving.
pub fn detect_bundle<'b, 'a>(
    call: &'b CallExpression<'a>,
    options: &mut Options,
) -> Result<BundleInfo<'b, 'a>> {
    let format = options.format.unwrap_or_else(|| infer_format(call));
    let info = detector_for(format, options).detect(call, options)?;

    if info.entry_source == EntrySource::Resolved {
        debug!("Caching resolved entry id {:?}", info.entry_id);
        options.entry_point.clone_from(&info.entry_id);
    }

    Ok(info)
}

/// Build the result for an already-validated call.
///
/// `resolve` runs only when the caller supplied no entry point.
pub(crate) fn bundle_info<'b, 'a>(
    format: BundleFormat,
    modules_ast: ModulesAst<'b, 'a>,
    options: &Options,
    resolve: impl FnOnce() -> Option<ModuleId>,
) -> BundleInfo<'b, 'a> {
    let (entry_id, entry_source) = match &options.entry_point {
        Some(id) => (Some(id.clone()), EntrySource::Override),
        None => match resolve() {
            Some(id) => (Some(id), EntrySource::Resolved),
            None => (None, EntrySource::Unresolved),
        },
    };

    BundleInfo {
        format,
        entry_id,
        entry_source,
        modules_ast,
    }
}

/// Strip any number of wrapping parentheses.
pub fn skip_parens<'b, 'a>(mut expr: &'b Expression<'a>) -> &'b Expression<'a> {
    while let Expression::ParenthesizedExpression(paren) = expr {
        expr = &paren.expression;
    }
    expr
}

/// Unwrap the call in an expression statement like `!function(){}(...)` or `(a.push)(...)`.
pub fn as_bootstrap_call<'b, 'a>(expr: &'b Expression<'a>) -> Option<&'b CallExpression<'a>> {
    match skip_parens(expr) {
        Expression::CallExpression(call) => Some(&**call),
        Expression::UnaryExpression(unary)
            if matches!(unary.operator, UnaryOperator::LogicalNot | UnaryOperator::Void) =>
        {
            as_bootstrap_call(&unary.argument)
        }
        _ => None,
    }
}

//! Classic webpack bootstrap: an IIFE that receives the module table.
//!
//! ```js
//! (function(modules) {
//!     // ...runtime...
//!     return __webpack_require__(__webpack_require__.s = 8);
//! })([ /* modules */ ]);
//! ```

use crate::bundle::{bundle_info, skip_parens, BundleDetector, BundleInfo, ModulesAst};
use crate::config::Options;
use crate::types::{BundleFormat, DebundleError, EntrySource, ModuleId, Result};
use oxc_ast::ast::*;
use tracing::{debug, trace};

/// Detector for the classic (non-chunked) webpack bootstrap.
#[derive(Debug, Clone, Default)]
pub struct WebpackDetector;

impl WebpackDetector {
    pub fn new() -> Self {
        Self
    }

    /// Check the callee is the bootstrap function.
    fn validate<'b, 'a>(&self, call: &'b CallExpression<'a>) -> Result<&'b Function<'a>> {
        match skip_parens(&call.callee) {
            Expression::FunctionExpression(function) => Ok(&**function),
            // `webpackJsonp([...])`
            Expression::Identifier(_) => Err(DebundleError::FormatMismatch {
                expected: BundleFormat::WebpackJsonp,
            }),
            _ => Err(DebundleError::NotABootstrap),
        }
    }

    /// The module table is the first argument.
    fn locate_modules<'b, 'a>(&self, call: &'b CallExpression<'a>) -> Result<ModulesAst<'b, 'a>> {
        call.arguments
            .first()
            .and_then(Argument::as_expression)
            .and_then(ModulesAst::from_expression)
            .ok_or(DebundleError::NotABootstrap)
    }
}

impl BundleDetector for WebpackDetector {
    fn format(&self) -> BundleFormat {
        BundleFormat::Webpack
    }

    fn detect<'b, 'a>(
        &self,
        call: &'b CallExpression<'a>,
        options: &Options,
    ) -> Result<BundleInfo<'b, 'a>> {
        let bootstrap = self.validate(call)?;
        let modules_ast = self.locate_modules(call)?;
        trace!("Classic webpack table with {} entries", modules_ast.len());

        let info = bundle_info(self.format(), modules_ast, options, || {
            resolve_entry_id(bootstrap)
        });

        // The entry id is structurally required for this format
        if info.entry_source == EntrySource::Unresolved {
            return Err(DebundleError::EntryPointNotFound);
        }

        debug!("Classic webpack entry id: {:?}", info.entry_id);
        Ok(info)
    }
}

/// Recover the entry id from the last statement of the bootstrap function.
///
/// Unminified:
/// `return __webpack_require__(__webpack_require__.s = 8);`
///
/// Minified, with runtime setup chained by the comma operator:
/// `return n.m=e,n.c=t,n.p="",n(n.s=8)`
fn resolve_entry_id(bootstrap: &Function<'_>) -> Option<ModuleId> {
    let body = bootstrap.body.as_ref()?;

    let Statement::ReturnStatement(ret) = body.statements.last()? else {
        return None;
    };

    let require_call = match skip_parens(ret.argument.as_ref()?) {
        Expression::CallExpression(call) => call,
        Expression::SequenceExpression(seq) => match seq.expressions.last().map(skip_parens) {
            Some(Expression::CallExpression(call)) => call,
            _ => return None,
        },
        _ => return None,
    };

    match require_call.arguments.first()? {
        Argument::NumericLiteral(lit) => ModuleId::from_number(lit.value),
        // `n.s = 8`: the id is the assigned value, not the target
        Argument::AssignmentExpression(assign) => match skip_parens(&assign.right) {
            Expression::NumericLiteral(lit) => ModuleId::from_number(lit.value),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::test_support::{first_call, parse};
    use oxc_allocator::Allocator;

    fn detect_source(source: &str, options: &Options) -> Result<(Option<ModuleId>, usize)> {
        let allocator = Allocator::default();
        let program = parse(&allocator, source);
        let info = WebpackDetector::new().detect(first_call(&program), options)?;
        Ok((info.entry_id, info.modules_ast.len()))
    }

    #[test]
    fn test_unminified_entry() {
        let source = r#"
            (function(modules) {
                var installedModules = {};
                function __webpack_require__(moduleId) {
                    var module = installedModules[moduleId] = { i: moduleId, l: false, exports: {} };
                    modules[moduleId].call(module.exports, module, module.exports, __webpack_require__);
                    return module.exports;
                }
                __webpack_require__.m = modules;
                __webpack_require__.p = "";
                return __webpack_require__(__webpack_require__.s = 8);
            })([function(module, exports) {}, function(module, exports) {}]);
        "#;

        let allocator = Allocator::default();
        let program = parse(&allocator, source);
        let call = first_call(&program);
        let info = WebpackDetector::new().detect(call, &Options::default()).unwrap();

        assert_eq!(info.entry_id, Some(ModuleId::Number(8)));
        assert_eq!(info.entry_source, EntrySource::Resolved);
        assert!(matches!(info.modules_ast, ModulesAst::Array(_)));
        // The table is a reference into the original AST
        let Some(Argument::ArrayExpression(array)) = call.arguments.first() else {
            panic!("first argument is not an array");
        };
        assert_eq!(info.modules_ast.span(), array.span);
    }

    #[test]
    fn test_minified_sequence_entry() {
        let source = r#"!function(e){var t={};function n(r){return e[r].call()}
            return n.m=e,n.c=t,n.d=function(e,t,r){},n.o=function(e,t){return Object.prototype.hasOwnProperty.call(e,t)},n.p="",n(n.s=3)
        }([function(e,t){},function(e,t){},function(e,t){},function(e,t){}]);"#;

        let (entry, len) = detect_source(source, &Options::default()).unwrap();
        assert_eq!(entry, Some(ModuleId::Number(3)));
        assert_eq!(len, 4);
    }

    #[test]
    fn test_plain_numeric_require() {
        let source = "(function(m){ return r(0); })({0: function(){}, 1: function(){}});";

        let (entry, len) = detect_source(source, &Options::default()).unwrap();
        assert_eq!(entry, Some(ModuleId::Number(0)));
        assert_eq!(len, 2);
    }

    #[test]
    fn test_override_skips_resolution() {
        // The bootstrap has no usable return, but the caller knows the entry.
        let source = "(function(m){ run(); })([function(){}]);";
        let options = Options::default().with_entry_point(ModuleId::Number(0));

        let (entry, _) = detect_source(source, &options).unwrap();
        assert_eq!(entry, Some(ModuleId::Number(0)));
    }

    #[test]
    fn test_entry_not_found() {
        let cases = [
            // last statement is not a return
            "(function(m){ return r(1); run(); })([]);",
            // return of a non-call
            "(function(m){ return m; })([]);",
            // sequence ending in a non-call
            "(function(m){ return r(1), m; })([]);",
            // non-literal require argument
            "(function(m){ return r(m.entry); })([]);",
            // assignment of a non-literal
            "(function(m){ return r(r.s = id); })([]);",
            // fractional id
            "(function(m){ return r(1.5); })([]);",
            // empty body
            "(function(m){})([]);",
        ];

        for source in cases {
            let err = detect_source(source, &Options::default()).unwrap_err();
            assert!(
                matches!(err, DebundleError::EntryPointNotFound),
                "{source}: {err:?}"
            );
        }
    }

    #[test]
    fn test_identifier_callee_is_jsonp() {
        for source in ["webpackJsonp([[0], {}, [[0]]]);", "anything(1, 2, 3);"] {
            let err = detect_source(source, &Options::default()).unwrap_err();
            assert!(matches!(
                err,
                DebundleError::FormatMismatch {
                    expected: BundleFormat::WebpackJsonp
                }
            ));
        }
    }

    #[test]
    fn test_not_a_bootstrap() {
        let cases = [
            // member callee
            "(window.webpackJsonp = window.webpackJsonp || []).push([[0], {}, [[0]]]);",
            // arrow callee
            "((m) => m)([]);",
            // missing table
            "(function(){ return r(r.s = 0); })();",
            // table is not a literal
            "(function(m){ return r(r.s = 0); })(modules);",
        ];

        for source in cases {
            let err = detect_source(source, &Options::default()).unwrap_err();
            assert!(matches!(err, DebundleError::NotABootstrap), "{source}: {err:?}");
        }
    }

    #[test]
    fn test_ast_is_not_modified() {
        let source = "(function(m){ init(); return r(r.s = 2); })([1, 2, 3]);";
        let allocator = Allocator::default();
        let program = parse(&allocator, source);
        let call = first_call(&program);

        WebpackDetector::new().detect(call, &Options::default()).unwrap();

        let Expression::FunctionExpression(function) = skip_parens(&call.callee) else {
            panic!("callee is not a function");
        };
        assert_eq!(function.body.as_ref().unwrap().statements.len(), 2);
    }
}

//! Chunk-loader ("jsonp") webpack bootstrap.
//!
//! ```js
//! (window.webpackJsonp = window.webpackJsonp || []).push([
//!     [0],            // own chunk ids
//!     { /* ... */ },  // module table
//!     [[5]]           // entry chunk: [[entryModuleId, ...dependsOn]]
//! ]);
//! ```
//!
//! The entry id is best-effort here: a chunk that does not name an entry is
//! still a valid bundle, and the result carries [`EntrySource::Unresolved`].

use crate::bundle::{bundle_info, skip_parens, BundleDetector, BundleInfo, ModulesAst};
use crate::config::Options;
use crate::types::{BundleFormat, DebundleError, EntrySource, ModuleId, Result};
use oxc_ast::ast::*;
use tracing::{debug, trace};

/// Identifiers that name the global object in browser bundles.
const GLOBAL_OBJECTS: &[&str] = &["window", "self", "global", "globalThis"];

/// Method the loader array is registered through.
const REGISTER_METHOD: &str = "push";

/// Detector for chunks registered through the webpack jsonp loader.
#[derive(Debug, Clone)]
pub struct WebpackJsonpDetector {
    /// Name of the loader global, e.g. `webpackJsonp`.
    chunk_global: String,
}

impl WebpackJsonpDetector {
    pub fn new(chunk_global: &str) -> Self {
        Self {
            chunk_global: chunk_global.to_string(),
        }
    }

    /// Check the callee and return the three chunk slots.
    fn validate<'b, 'a>(
        &self,
        call: &'b CallExpression<'a>,
    ) -> Result<&'b [ArrayExpressionElement<'a>]> {
        let callee = skip_parens(&call.callee);
        if matches!(callee, Expression::FunctionExpression(_)) {
            return Err(DebundleError::FormatMismatch {
                expected: BundleFormat::Webpack,
            });
        }
        if !self.is_loader_callee(callee) {
            return Err(DebundleError::NotABootstrap);
        }

        let [argument] = call.arguments.as_slice() else {
            return Err(DebundleError::NotABootstrap);
        };
        match argument.as_expression().map(skip_parens) {
            Some(Expression::ArrayExpression(chunk)) if chunk.elements.len() == 3 => {
                Ok(chunk.elements.as_slice())
            }
            _ => Err(DebundleError::NotABootstrap),
        }
    }

    /// `webpackJsonp` or `(window.webpackJsonp = window.webpackJsonp || []).push`
    fn is_loader_callee(&self, callee: &Expression<'_>) -> bool {
        match callee {
            Expression::Identifier(id) => id.name == self.chunk_global.as_str(),
            Expression::StaticMemberExpression(member) => {
                member.property.name == REGISTER_METHOD && self.is_loader_init(&member.object)
            }
            Expression::ComputedMemberExpression(member) => {
                is_string(&member.expression, REGISTER_METHOD) && self.is_loader_init(&member.object)
            }
            _ => false,
        }
    }

    /// `global.<loader> = global.<loader> || <fallback>`
    fn is_loader_init(&self, object: &Expression<'_>) -> bool {
        let Expression::AssignmentExpression(assign) = skip_parens(object) else {
            return false;
        };
        if assign.operator != AssignmentOperator::Assign {
            return false;
        }
        let Expression::LogicalExpression(fallback) = skip_parens(&assign.right) else {
            return false;
        };

        let target_is_slot = match &assign.left {
            AssignmentTarget::StaticMemberExpression(member) => self.is_static_slot(member),
            AssignmentTarget::ComputedMemberExpression(member) => self.is_computed_slot(member),
            _ => false,
        };

        target_is_slot
            && fallback.operator == LogicalOperator::Or
            && self.is_slot(&fallback.left)
    }

    fn is_slot(&self, expr: &Expression<'_>) -> bool {
        match skip_parens(expr) {
            Expression::StaticMemberExpression(member) => self.is_static_slot(member),
            Expression::ComputedMemberExpression(member) => self.is_computed_slot(member),
            _ => false,
        }
    }

    fn is_static_slot(&self, member: &StaticMemberExpression<'_>) -> bool {
        member.property.name == self.chunk_global.as_str() && is_global_object(&member.object)
    }

    fn is_computed_slot(&self, member: &ComputedMemberExpression<'_>) -> bool {
        is_string(&member.expression, &self.chunk_global) && is_global_object(&member.object)
    }
}

impl BundleDetector for WebpackJsonpDetector {
    fn format(&self) -> BundleFormat {
        BundleFormat::WebpackJsonp
    }

    fn detect<'b, 'a>(
        &self,
        call: &'b CallExpression<'a>,
        options: &Options,
    ) -> Result<BundleInfo<'b, 'a>> {
        let slots = self.validate(call)?;

        let modules_ast = slots[1]
            .as_expression()
            .and_then(ModulesAst::from_expression)
            .ok_or(DebundleError::NotABootstrap)?;
        trace!("Jsonp chunk table with {} entries", modules_ast.len());

        let info = bundle_info(self.format(), modules_ast, options, || {
            resolve_entry_id(&slots[2])
        });

        if info.entry_source == EntrySource::Unresolved {
            debug!(
                "No entry id in jsonp chunk at {}..{}, continuing without one",
                call.span.start, call.span.end
            );
        }

        Ok(info)
    }
}

/// Read `[[id]]` from the entry-chunk slot.
fn resolve_entry_id(entry_slot: &ArrayExpressionElement<'_>) -> Option<ModuleId> {
    let ArrayExpressionElement::ArrayExpression(outer) = entry_slot else {
        return None;
    };
    let [ArrayExpressionElement::ArrayExpression(inner)] = outer.elements.as_slice() else {
        return None;
    };
    let [element] = inner.elements.as_slice() else {
        return None;
    };

    match element {
        ArrayExpressionElement::NumericLiteral(lit) => ModuleId::from_number(lit.value),
        ArrayExpressionElement::StringLiteral(lit) => Some(ModuleId::Name(lit.value.to_string())),
        ArrayExpressionElement::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
            .quasis
            .first()
            .and_then(|quasi| quasi.value.cooked.as_ref())
            .map(|cooked| ModuleId::Name(cooked.to_string())),
        _ => None,
    }
}

fn is_global_object(expr: &Expression<'_>) -> bool {
    match skip_parens(expr) {
        Expression::Identifier(id) => GLOBAL_OBJECTS.contains(&id.name.as_str()),
        Expression::ThisExpression(_) => true,
        _ => false,
    }
}

fn is_string(expr: &Expression<'_>, value: &str) -> bool {
    matches!(skip_parens(expr), Expression::StringLiteral(lit) if lit.value == value)
}

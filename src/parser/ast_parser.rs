//! AST production and bootstrap location using oxc_parser.

use crate::bundle::{as_bootstrap_call, skip_parens};
use crate::types::{DebundleError, Result};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::Parser;
use oxc_span::SourceType;
use tracing::{debug, trace};

/// Parse a bundle as a classic script.
///
/// Recoverable syntax errors are tolerated (common in minified code); only a
/// parser panic, which leaves no usable program, is an error.
pub fn parse_program<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    source_name: &str,
) -> Result<Program<'a>> {
    let source_type = SourceType::default().with_module(false);
    let ret = Parser::new(allocator, source, source_type).parse();

    if ret.panicked {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser gave up".to_string());
        return Err(DebundleError::AstParseError(format!("{}: {}", source_name, message)));
    }

    if !ret.errors.is_empty() {
        trace!(
            "Parse had {} errors for {}, continuing...",
            ret.errors.len(),
            source_name
        );
    }

    Ok(ret.program)
}

/// Find the top-level bootstrap call of a bundle.
///
/// Statements are scanned in order. A call that looks like either bootstrap
/// (an IIFE over a table literal, or a loader call with one array argument)
/// is preferred; otherwise the first top-level call is returned so the
/// detectors can report why it is not a bootstrap.
pub fn find_bootstrap_call<'b, 'a>(program: &'b Program<'a>) -> Option<&'b CallExpression<'a>> {
    let mut calls = program.body.iter().filter_map(|stmt| match stmt {
        Statement::ExpressionStatement(expr) => as_bootstrap_call(&expr.expression),
        _ => None,
    });

    let first = calls.next()?;
    if looks_like_bootstrap(first) {
        return Some(first);
    }

    match calls.find(|call| looks_like_bootstrap(call)) {
        Some(call) => {
            debug!("Bootstrap call found at offset {}", call.span.start);
            Some(call)
        }
        None => Some(first),
    }
}

fn looks_like_bootstrap(call: &CallExpression<'_>) -> bool {
    let table = call.arguments.first().and_then(Argument::as_expression).map(skip_parens);
    match skip_parens(&call.callee) {
        Expression::FunctionExpression(_) => matches!(
            table,
            Some(Expression::ArrayExpression(_) | Expression::ObjectExpression(_))
        ),
        _ => call.arguments.len() == 1 && matches!(table, Some(Expression::ArrayExpression(_))),
    }
}

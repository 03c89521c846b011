//! Module extraction from a located module table.

use crate::bundle::{BundleInfo, ModulesAst};
use crate::types::{DebundleError, ModuleId, ModuleSummary, Result};
use oxc_ast::ast::*;
use oxc_span::{GetSpan, Span};

/// One module of a bundle.
#[derive(Debug, Clone)]
pub struct Module<'b, 'a> {
    pub id: ModuleId,
    /// The module factory, usually `function(module, exports, require) {...}`.
    pub factory: &'b Expression<'a>,
    pub is_entry: bool,
}

impl Module<'_, '_> {
    pub fn span(&self) -> Span {
        self.factory.span()
    }

    pub fn summary(&self) -> ModuleSummary {
        let span = self.span();
        ModuleSummary {
            id: self.id.clone(),
            is_entry: self.is_entry,
            start: span.start,
            end: span.end,
        }
    }
}

/// Walk the module table of a detected bundle.
///
/// Array tables assign ids by position and skip holes; object tables use
/// their keys. The module whose id equals the entry id is flagged.
pub fn extract_modules<'b, 'a>(info: &BundleInfo<'b, 'a>) -> Result<Vec<Module<'b, 'a>>> {
    let mut modules = match info.modules_ast {
        ModulesAst::Array(array) => from_array(array)?,
        ModulesAst::Object(object) => from_object(object)?,
    };

    if let Some(entry_id) = &info.entry_id {
        for module in modules.iter_mut() {
            module.is_entry = &module.id == entry_id;
        }
    }

    Ok(modules)
}

fn from_array<'b, 'a>(array: &'b ArrayExpression<'a>) -> Result<Vec<Module<'b, 'a>>> {
    let mut modules = Vec::with_capacity(array.elements.len());

    for (index, element) in array.elements.iter().enumerate() {
        let factory = match element {
            ArrayExpressionElement::Elision(_) => continue,
            ArrayExpressionElement::SpreadElement(spread) => {
                return Err(DebundleError::MalformedModuleTable(format!(
                    "spread element at offset {}",
                    spread.span.start
                )));
            }
            other => other.as_expression().ok_or_else(|| {
                DebundleError::MalformedModuleTable(format!("unexpected element at index {}", index))
            })?,
        };

        modules.push(Module {
            id: ModuleId::Number(index as u64),
            factory,
            is_entry: false,
        });
    }

    Ok(modules)
}

fn from_object<'b, 'a>(object: &'b ObjectExpression<'a>) -> Result<Vec<Module<'b, 'a>>> {
    let mut modules = Vec::with_capacity(object.properties.len());

    for property in object.properties.iter() {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            return Err(DebundleError::MalformedModuleTable(
                "spread property in module table".to_string(),
            ));
        };

        let id = property_key_id(&property.key).ok_or_else(|| {
            DebundleError::MalformedModuleTable(format!(
                "unsupported key at offset {}",
                property.span.start
            ))
        })?;

        modules.push(Module {
            id,
            factory: &property.value,
            is_entry: false,
        });
    }

    Ok(modules)
}

fn property_key_id(key: &PropertyKey<'_>) -> Option<ModuleId> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ModuleId::from_key(ident.name.as_str())),
        PropertyKey::StringLiteral(lit) => Some(ModuleId::from_key(lit.value.as_str())),
        PropertyKey::NumericLiteral(lit) => {
            ModuleId::from_number(lit.value).or_else(|| Some(ModuleId::Name(lit.value.to_string())))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::test_support::{first_call, parse};
    use crate::bundle::detect_bundle;
    use crate::config::Options;
    use oxc_allocator::Allocator;

    #[test]
    fn test_array_table_with_holes() {
        let allocator = Allocator::default();
        let source = "(function(m){ return r(r.s = 2); })([function(){}, , function(){}]);";
        let program = parse(&allocator, source);
        let info = detect_bundle(first_call(&program), &mut Options::default()).unwrap();

        let modules = extract_modules(&info).unwrap();
        let ids: Vec<_> = modules.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, vec![ModuleId::Number(0), ModuleId::Number(2)]);
        assert!(!modules[0].is_entry);
        assert!(modules[1].is_entry);
    }

    #[test]
    fn test_object_table_keys() {
        let allocator = Allocator::default();
        let source = r#"
            (window.webpackJsonp = window.webpackJsonp || []).push([[0], {
                "EwB5": function(e, t, n) {},
                17: function(e, t, n) {},
                abc: function(e, t, n) {}
            }, [["EwB5"]]]);
        "#;
        let program = parse(&allocator, source);
        let info = detect_bundle(first_call(&program), &mut Options::default()).unwrap();

        let modules = extract_modules(&info).unwrap();
        let ids: Vec<_> = modules.iter().map(|m| m.id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                ModuleId::Name("EwB5".to_string()),
                ModuleId::Number(17),
                ModuleId::Name("abc".to_string()),
            ]
        );
        let entries: Vec<_> = modules.iter().filter(|m| m.is_entry).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, ModuleId::Name("EwB5".to_string()));
    }

    #[test]
    fn test_summary_spans_point_at_factory() {
        let allocator = Allocator::default();
        let source = "webpackJsonp([[], {1: function(){}}, [[1]]]);";
        let program = parse(&allocator, source);
        let info = detect_bundle(first_call(&program), &mut Options::default()).unwrap();

        let modules = extract_modules(&info).unwrap();
        let summary = modules[0].summary();
        assert_eq!(&source[summary.start as usize..summary.end as usize], "function(){}");
        assert!(summary.is_entry);
    }

    #[test]
    fn test_unresolved_entry_flags_nothing() {
        let allocator = Allocator::default();
        let source = "webpackJsonp([[], {1: function(){}}, [[1, 2]]]);";
        let program = parse(&allocator, source);
        let info = detect_bundle(first_call(&program), &mut Options::default()).unwrap();

        let modules = extract_modules(&info).unwrap();
        assert_eq!(modules.len(), 1);
        assert!(modules.iter().all(|m| !m.is_entry));
    }

    #[test]
    fn test_malformed_tables() {
        let cases = [
            "(function(m){ return r(0); })([...others]);",
            "(function(m){ return r(0); })({...others});",
            "(function(m){ return r(0); })({[key]: function(){}});",
        ];

        for source in cases {
            let allocator = Allocator::default();
            let program = parse(&allocator, source);
            let info = detect_bundle(first_call(&program), &mut Options::default()).unwrap();

            let err = extract_modules(&info).unwrap_err();
            assert!(matches!(err, DebundleError::MalformedModuleTable(_)), "{source}");
        }
    }
}

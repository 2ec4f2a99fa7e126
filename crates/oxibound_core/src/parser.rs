use anyhow::{Result, anyhow};
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::path::Path;

use crate::types::{ModuleSummary, SpecKind, Specifier};

/// Parse one file's text and extract its import specifiers and
/// directive-prologue flag. Performs no file I/O and no caching;
/// callers own both.
pub fn parse_source(file: &Path, source: &str) -> Result<ModuleSummary> {
    trace!("Parsing source of {}", file.display());

    let st = source_type_for(file);
    let allocator = Allocator::default();
    let ParserReturn { program, panicked, .. } = OxcParser::new(&allocator, source, st).parse();

    if panicked {
        return Err(anyhow!("parser could not recover while parsing {}", file.display()));
    }

    // A file is a client module when the directive prologue opens with
    // the "use client" literal. Later directives don't count.
    let has_client_directive =
        program.directives.first().is_some_and(|d| d.directive.as_str() == "use client");

    let mut specs: Vec<Specifier> = Vec::new();

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                // Skip type-only imports (import type { Foo } from 'bar')
                if decl.import_kind.is_type() {
                    trace!("Skipping type-only import declaration in {}", file.display());
                    continue;
                }

                // Check if all specifiers are type-only (import { type Foo } from 'bar')
                // If there's at least one non-type import, we should include it
                let has_runtime_import = if let Some(specifiers) = &decl.specifiers {
                    specifiers.iter().any(|spec| match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => !s.import_kind.is_type(),
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => true,
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => true,
                    })
                } else {
                    // No specifiers means something like: import 'side-effect'
                    true
                };

                if has_runtime_import {
                    let req = decl.source.value.to_string();
                    trace!("Found static import: '{}' in {}", req, file.display());
                    specs.push(Specifier { request: req, kind: SpecKind::Static });
                }
            }
            Statement::ExportNamedDeclaration(decl) => {
                // Re-exports pull the source module in at runtime:
                // export { x } from './mod'
                if let Some(src) = &decl.source
                    && !decl.export_kind.is_type()
                {
                    trace!("Found re-export: '{}' in {}", src.value, file.display());
                    specs.push(Specifier { request: src.value.to_string(), kind: SpecKind::Static });
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                // export * from './mod'
                if !decl.export_kind.is_type() {
                    trace!("Found star re-export: '{}' in {}", decl.source.value, file.display());
                    specs.push(Specifier {
                        request: decl.source.value.to_string(),
                        kind: SpecKind::Static,
                    });
                }
            }
            Statement::ExpressionStatement(es) => {
                // Recursively extract all require() and import() calls
                extract_require_from_expression(&es.expression, &mut specs);
            }
            Statement::VariableDeclaration(vd) => {
                // Handle const x = require('...') or const x = someFunc(require('...'))
                for decl in &vd.declarations {
                    if let Some(init) = &decl.init {
                        extract_require_from_expression(init, &mut specs);
                    }
                }
            }
            _ => {}
        }
    }

    debug!("Found {} import specifiers in {}", specs.len(), file.display());
    Ok(ModuleSummary { specifiers: specs, has_client_directive })
}

fn extract_require_from_expression(expr: &Expression, specs: &mut Vec<Specifier>) {
    match expr {
        Expression::CallExpression(ce) => {
            if let Expression::Identifier(callee_ident) = &ce.callee
                && callee_ident.name.as_str() == "require"
                && !ce.arguments.is_empty()
                && let Some(Expression::StringLiteral(sl)) = ce.arguments[0].as_expression()
            {
                trace!("Found require() call: '{}'", sl.value);
                specs.push(Specifier { request: sl.value.to_string(), kind: SpecKind::Static });
            }
            // Recursively check arguments for nested require() calls
            for arg in &ce.arguments {
                if let Some(arg_expr) = arg.as_expression() {
                    extract_require_from_expression(arg_expr, specs);
                }
            }
            // Also check the callee in case it's a complex expression
            extract_require_from_expression(&ce.callee, specs);
        }
        Expression::ImportExpression(ie) => {
            if let Expression::StringLiteral(sl) = &ie.source {
                trace!("Found dynamic import(): '{}'", sl.value);
                specs.push(Specifier { request: sl.value.to_string(), kind: SpecKind::Dynamic });
            }
        }
        Expression::ArrayExpression(ae) => {
            for elem in &ae.elements {
                if let Some(expr) = elem.as_expression() {
                    extract_require_from_expression(expr, specs);
                }
            }
        }
        Expression::ObjectExpression(oe) => {
            for prop in &oe.properties {
                if let Some(expr) = prop.as_property() {
                    extract_require_from_expression(&expr.value, specs);
                }
            }
        }
        Expression::ConditionalExpression(ce) => {
            extract_require_from_expression(&ce.test, specs);
            extract_require_from_expression(&ce.consequent, specs);
            extract_require_from_expression(&ce.alternate, specs);
        }
        Expression::AssignmentExpression(ae) => {
            extract_require_from_expression(&ae.right, specs);
        }
        Expression::ParenthesizedExpression(pe) => {
            extract_require_from_expression(&pe.expression, specs);
        }
        _ => {
            // For other expression types, we don't recurse further
        }
    }
}

fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    let mut st = SourceType::default()
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")));

    // ESM heuristic - .mjs, .mts are ES modules
    if matches!(ext, Some("mjs") | Some("mts")) {
        st = st.with_module(true);
    }

    st
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_static_import_default() {
        let summary = parse_source(Path::new("test.js"), "import foo from './foo';").unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "./foo");
        assert!(matches!(summary.specifiers[0].kind, SpecKind::Static));
    }

    #[test]
    fn test_side_effect_import() {
        let summary = parse_source(Path::new("test.js"), "import './polyfills';").unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "./polyfills");
    }

    #[test]
    fn test_dynamic_import() {
        let summary = parse_source(Path::new("test.js"), "import('./lazy');").unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "./lazy");
        assert!(matches!(summary.specifiers[0].kind, SpecKind::Dynamic));
    }

    #[test]
    fn test_require_call() {
        let summary = parse_source(Path::new("test.js"), "const fs = require('fs');").unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "fs");
    }

    #[test]
    fn test_require_in_expression() {
        let summary = parse_source(
            Path::new("test.js"),
            "const config = loadConfig(require('./config'));",
        )
        .unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "./config");
    }

    #[test]
    fn test_type_only_import_skipped() {
        let summary =
            parse_source(Path::new("test.ts"), "import type { Foo } from './types';").unwrap();
        assert_eq!(summary.specifiers.len(), 0);
    }

    #[test]
    fn test_mixed_type_and_runtime_import() {
        let summary =
            parse_source(Path::new("test.ts"), "import { type Foo, bar } from './utils';")
                .unwrap();
        // Should include because there's at least one runtime import (bar)
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "./utils");
    }

    #[test]
    fn test_reexport_included() {
        let summary =
            parse_source(Path::new("test.ts"), "export { Button } from './button';").unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "./button");
    }

    #[test]
    fn test_star_reexport_included() {
        let summary = parse_source(Path::new("test.ts"), "export * from './components';").unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "./components");
    }

    #[test]
    fn test_type_only_reexport_skipped() {
        let summary =
            parse_source(Path::new("test.ts"), "export type { Props } from './props';").unwrap();
        assert_eq!(summary.specifiers.len(), 0);
    }

    #[test]
    fn test_local_export_has_no_specifier() {
        let summary =
            parse_source(Path::new("test.ts"), "export const x = 1;\nexport function f() {}")
                .unwrap();
        assert_eq!(summary.specifiers.len(), 0);
    }

    #[test]
    fn test_multiple_imports_keep_order() {
        let summary = parse_source(
            Path::new("test.js"),
            "import foo from './foo';\nimport { bar } from './bar';\nimport './side-effect';",
        )
        .unwrap();
        let requests: Vec<&str> = summary.specifiers.iter().map(|s| s.request.as_str()).collect();
        assert_eq!(requests, vec!["./foo", "./bar", "./side-effect"]);
    }

    #[test]
    fn test_use_client_directive_detected() {
        let summary = parse_source(
            Path::new("test.tsx"),
            "\"use client\";\nimport { useState } from 'react';",
        )
        .unwrap();
        assert!(summary.has_client_directive);
        assert_eq!(summary.specifiers.len(), 1);
    }

    #[test]
    fn test_use_client_single_quotes() {
        let summary = parse_source(Path::new("test.tsx"), "'use client';\nexport const x = 1;")
            .unwrap();
        assert!(summary.has_client_directive);
    }

    #[test]
    fn test_no_directive() {
        let summary =
            parse_source(Path::new("test.tsx"), "import { db } from './db';").unwrap();
        assert!(!summary.has_client_directive);
    }

    #[test]
    fn test_use_client_not_first_directive() {
        let summary = parse_source(
            Path::new("test.js"),
            "\"use strict\";\n\"use client\";\nmodule.exports = {};",
        )
        .unwrap();
        assert!(!summary.has_client_directive);
    }

    #[test]
    fn test_use_client_in_string_not_directive() {
        let summary =
            parse_source(Path::new("test.js"), "const s = \"use client\";").unwrap();
        assert!(!summary.has_client_directive);
    }

    #[test]
    fn test_require_in_conditional() {
        let summary = parse_source(
            Path::new("test.js"),
            "const mod = condition ? require('./a') : require('./b');",
        )
        .unwrap();
        let requests: Vec<&str> = summary.specifiers.iter().map(|s| s.request.as_str()).collect();
        assert!(requests.contains(&"./a"));
        assert!(requests.contains(&"./b"));
    }

    #[test]
    fn test_no_imports() {
        let summary = parse_source(Path::new("test.js"), "const x = 42;").unwrap();
        assert_eq!(summary.specifiers.len(), 0);
    }

    #[test]
    fn test_tsx_file_parses() {
        let summary = parse_source(
            Path::new("page.tsx"),
            "import React from 'react';\nexport default function Page() { return <div />; }",
        )
        .unwrap();
        assert_eq!(summary.specifiers.len(), 1);
        assert_eq!(summary.specifiers[0].request, "react");
    }
}

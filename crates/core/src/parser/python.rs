//! Python language adapter.
//!
//! Builds on the existing `parser/python.rs`, which already drives
//! tree-sitter-python over a whole file and extracts `function_definition`
//! nodes by walking `child_by_field_name`. Generalized from "top-level
//! functions and classes only, calls resolved within one file" to full
//! recursive extraction of functions (nested ones included, so enclosing-
//! function lookups for calls work at any depth), decorators, `async def`,
//! and import statements — resolution across files moves to the
//! `GraphBuilder`, so this adapter only emits syntactic
//! records.

use super::{ExtractionResult, LanguageAdapter};
use crate::model::{CallSite, ExportStmt, FileDescriptor, FunctionDef, ImportStmt, Language};
use tree_sitter::{Node, Tree};

pub struct PythonAdapter;

impl LanguageAdapter for PythonAdapter {
    fn ts_language(&self, _lang: Language) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn extract(&self, tree: &Tree, source: &[u8], desc: &FileDescriptor) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        let mut enclosing_stack: Vec<String> = Vec::new();
        walk(
            tree.root_node(),
            source,
            desc,
            &mut enclosing_stack,
            &mut result,
        );
        // Python has no export syntax; `is_exported` on FunctionDef already
        // captures "defined at module scope".
        result
    }
}

fn walk(
    node: Node,
    source: &[u8],
    desc: &FileDescriptor,
    enclosing_stack: &mut Vec<String>,
    result: &mut ExtractionResult,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_definition" => {
                handle_function_definition(child, None, source, desc, enclosing_stack, result);
            }
            "decorated_definition" => {
                if let Some(def) = child.child_by_field_name("definition") {
                    if def.kind() == "function_definition" {
                        let decorators = extract_decorators(child, source);
                        handle_function_definition(
                            def,
                            Some(decorators),
                            source,
                            desc,
                            enclosing_stack,
                            result,
                        );
                    } else {
                        walk(child, source, desc, enclosing_stack, result);
                    }
                }
            }
            "call" => {
                if let Some(callee_name) = extract_call_name(child, source) {
                    result.calls.push(CallSite {
                        callee_name,
                        file_path: desc.absolute_path.clone(),
                        line: child.start_position().row + 1,
                        enclosing_function_name: enclosing_stack.last().cloned(),
                    });
                }
                walk(child, source, desc, enclosing_stack, result);
            }
            "import_statement" => {
                extract_import_statement(child, source, desc, result);
            }
            "import_from_statement" => {
                extract_import_from_statement(child, source, desc, result);
            }
            _ => {
                walk(child, source, desc, enclosing_stack, result);
            }
        }
    }
}

fn handle_function_definition(
    def: Node,
    decorators: Option<Vec<String>>,
    source: &[u8],
    desc: &FileDescriptor,
    enclosing_stack: &mut Vec<String>,
    result: &mut ExtractionResult,
) {
    let name = match extract_identifier_field(def, "name", source) {
        Some(n) => n,
        None => return,
    };

    // Spec §4.2: exported iff the parent syntax node is the module root —
    // the parent of either the bare function_definition or, if decorated,
    // of the wrapping decorated_definition.
    let effective_node = if decorators.is_some() {
        def.parent().unwrap_or(def)
    } else {
        def
    };
    let is_exported = effective_node
        .parent()
        .map(|p| p.kind() == "module")
        .unwrap_or(false);

    let is_async = def.child(0).map(|c| c.kind() == "async").unwrap_or(false);

    result.functions.push(FunctionDef {
        name: name.clone(),
        file_path: desc.absolute_path.clone(),
        start_line: def.start_position().row + 1,
        end_line: def.end_position().row + 1,
        parameters: def
            .child_by_field_name("parameters")
            .map(|p| extract_parameter_names(p, source))
            .unwrap_or_default(),
        is_exported,
        is_async,
        decorators: decorators.unwrap_or_default(),
    });

    enclosing_stack.push(name);
    if let Some(body) = def.child_by_field_name("body") {
        walk(body, source, desc, enclosing_stack, result);
    }
    enclosing_stack.pop();
}

fn extract_decorators(decorated: Node, source: &[u8]) -> Vec<String> {
    let mut cursor = decorated.walk();
    decorated
        .children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .filter_map(|d| {
            let text = d.utf8_text(source).ok()?;
            Some(text.trim_start_matches('@').trim().to_string())
        })
        .collect()
}

fn extract_identifier_field(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source).ok())
        .map(|s| s.to_string())
}

fn extract_parameter_names(params: Node, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        let name = match child.kind() {
            "identifier" => child.utf8_text(source).ok().map(|s| s.to_string()),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => child
                .child_by_field_name("name")
                .or_else(|| first_identifier(child))
                .and_then(|n| n.utf8_text(source).ok())
                .map(|s| s.to_string()),
            "list_splat_pattern" | "dictionary_splat_pattern" => first_identifier(child)
                .and_then(|n| n.utf8_text(source).ok())
                .map(|s| s.to_string()),
            _ => None,
        };
        if let Some(name) = name {
            names.push(name);
        }
    }
    names
}

fn first_identifier(node: Node) -> Option<Node> {
    if node.kind() == "identifier" {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_identifier(child) {
            return Some(found);
        }
    }
    None
}

/// Extract the syntactic callee text of a `call` node. Dotted/attribute
/// calls (`obj.method()`) are returned as their full dotted text; the
/// builder's resolution policy will fail to resolve these against a bare
/// function name and drop them, which is the intended behavior for
/// method calls.
fn extract_call_name(call: Node, source: &[u8]) -> Option<String> {
    let func = call.child_by_field_name("function")?;
    extract_dotted_text(func, source)
}

fn extract_dotted_text(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" => node.utf8_text(source).ok().map(|s| s.to_string()),
        "attribute" => {
            let object = node.child_by_field_name("object")?;
            let attribute = node.child_by_field_name("attribute")?;
            let obj_text = extract_dotted_text(object, source)?;
            let attr_text = attribute.utf8_text(source).ok()?;
            Some(format!("{}.{}", obj_text, attr_text))
        }
        "call" => extract_call_name(node, source),
        _ => None,
    }
}

fn extract_import_statement(
    stmt: Node,
    source: &[u8],
    desc: &FileDescriptor,
    result: &mut ExtractionResult,
) {
    let line = stmt.start_position().row + 1;
    let mut cursor = stmt.walk();
    for child in stmt.children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                if let Ok(text) = child.utf8_text(source) {
                    result.imports.push(ImportStmt {
                        imported_names: vec![text.to_string()],
                        source_module_string: text.to_string(),
                        file_path: desc.absolute_path.clone(),
                        line,
                        is_default_import: false,
                    });
                }
            }
            "aliased_import" => {
                let module = child
                    .child_by_field_name("name")
                    .and_then(|n| n.utf8_text(source).ok());
                let alias = child
                    .child_by_field_name("alias")
                    .and_then(|n| n.utf8_text(source).ok());
                if let Some(module) = module {
                    let bound_name = alias.unwrap_or(module).to_string();
                    result.imports.push(ImportStmt {
                        imported_names: vec![bound_name],
                        source_module_string: module.to_string(),
                        file_path: desc.absolute_path.clone(),
                        line,
                        is_default_import: false,
                    });
                }
            }
            _ => {}
        }
    }
}

fn extract_import_from_statement(
    stmt: Node,
    source: &[u8],
    desc: &FileDescriptor,
    result: &mut ExtractionResult,
) {
    let line = stmt.start_position().row + 1;
    let module_name_node = stmt.child_by_field_name("module_name");

    let (module, level) = match module_name_node {
        Some(n) if n.kind() == "relative_import" => {
            let dots = n
                .children(&mut n.walk())
                .filter(|c| c.kind() == "import_prefix")
                .count()
                .max(1);
            let dotted = n
                .children(&mut n.walk())
                .find(|c| c.kind() == "dotted_name")
                .and_then(|d| d.utf8_text(source).ok())
                .map(|s| s.to_string());
            (dotted, dots)
        }
        Some(n) => (n.utf8_text(source).ok().map(|s| s.to_string()), 0),
        None => (None, 0),
    };

    let source_module_string =
        format!("{}{}", ".".repeat(level), module.clone().unwrap_or_default());

    let mut imported_names = Vec::new();
    let mut cursor = stmt.walk();
    for child in stmt.children(&mut cursor) {
        let is_module_node = module_name_node.map(|m| m.id() == child.id()).unwrap_or(false);
        match child.kind() {
            "dotted_name" if !is_module_node => {
                if let Ok(text) = child.utf8_text(source) {
                    imported_names.push(text.to_string());
                }
            }
            "aliased_import" => {
                let name = child
                    .child_by_field_name("name")
                    .and_then(|n| n.utf8_text(source).ok());
                let alias = child
                    .child_by_field_name("alias")
                    .and_then(|n| n.utf8_text(source).ok());
                if let Some(name) = name {
                    imported_names.push(alias.unwrap_or(name).to_string());
                }
            }
            "wildcard_import" => {
                imported_names.push("*".to_string());
            }
            _ => {}
        }
    }

    if !imported_names.is_empty() {
        result.imports.push(ImportStmt {
            imported_names,
            source_module_string,
            file_path: desc.absolute_path.clone(),
            line,
            is_default_import: false,
        });
    }
}

/// Python has no export syntax, so no adapter ever pushes an `ExportStmt`.
/// Kept as an explicit no-op so the shape matches
/// `javascript::extract_exports` and is easy to find.
#[allow(dead_code)]
fn extract_exports_noop() -> Vec<ExportStmt> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileDescriptor;
    use std::path::PathBuf;
    use tree_sitter::Parser as TsParser;

    fn parse(source: &str) -> (Tree, FileDescriptor) {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        let desc = FileDescriptor {
            absolute_path: PathBuf::from("calc.py"),
            path_relative_to_root: PathBuf::from("calc.py"),
            language: Language::Python,
            size_bytes: source.len() as u64,
            line_count: source.matches('\n').count(),
        };
        (tree, desc)
    }

    #[test]
    fn test_simple_self_call() {
        let source = "def a(): pass\ndef b(): a()\n";
        let (tree, desc) = parse(source);
        let result = PythonAdapter.extract(&tree, source.as_bytes(), &desc);
        assert_eq!(result.functions.len(), 2);
        assert_eq!(result.calls.len(), 1);
        assert_eq!(result.calls[0].callee_name, "a");
        assert_eq!(result.calls[0].enclosing_function_name.as_deref(), Some("b"));
    }

    #[test]
    fn test_nested_function_not_top_level_exported() {
        let source = "def outer():\n    def inner():\n        pass\n    return inner\n";
        let (tree, desc) = parse(source);
        let result = PythonAdapter.extract(&tree, source.as_bytes(), &desc);
        let outer = result.functions.iter().find(|f| f.name == "outer").unwrap();
        let inner = result.functions.iter().find(|f| f.name == "inner").unwrap();
        assert!(outer.is_exported);
        assert!(!inner.is_exported);
    }

    #[test]
    fn test_decorators_and_async() {
        let source = "@staticmethod\nasync def handler():\n    pass\n";
        let (tree, desc) = parse(source);
        let result = PythonAdapter.extract(&tree, source.as_bytes(), &desc);
        assert_eq!(result.functions.len(), 1);
        let f = &result.functions[0];
        assert!(f.is_async);
        assert_eq!(f.decorators, vec!["staticmethod".to_string()]);
        assert!(f.is_exported);
    }

    #[test]
    fn test_import_from_statement() {
        let source = "from os import path as p, sep\n";
        let (tree, desc) = parse(source);
        let result = PythonAdapter.extract(&tree, source.as_bytes(), &desc);
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].source_module_string, "os");
        assert_eq!(result.imports[0].imported_names, vec!["p", "sep"]);
    }

    #[test]
    fn test_dotted_call_unresolved() {
        let source = "import os\ndef f():\n    os.path.exists('x')\n";
        let (tree, desc) = parse(source);
        let result = PythonAdapter.extract(&tree, source.as_bytes(), &desc);
        assert_eq!(result.calls.len(), 1);
        assert_eq!(result.calls[0].callee_name, "os.path.exists");
    }
}

//! JavaScript/JSX/TypeScript/TSX language adapter.
//!
//! Kept in the same manual cursor-traversal idiom as `python.rs` rather
//! than tree-sitter `Query` strings, so both adapters read the same way.

use super::{ExtractionResult, LanguageAdapter};
use crate::model::{CallSite, ExportStmt, FileDescriptor, FunctionDef, ImportStmt, Language};
use std::collections::HashSet;
use tree_sitter::{Node, Tree};

pub struct JsFamilyAdapter;

impl LanguageAdapter for JsFamilyAdapter {
    fn ts_language(&self, lang: Language) -> tree_sitter::Language {
        match lang {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            // JSX is parsed by the plain JavaScript grammar; it already
            // accepts JSX syntax.
            _ => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    fn extract(&self, tree: &Tree, source: &[u8], desc: &FileDescriptor) -> ExtractionResult {
        let root = tree.root_node();
        let exported_names = collect_exported_names(root, source);

        let mut result = ExtractionResult::default();
        let mut enclosing_stack: Vec<String> = Vec::new();
        let mut ctx = WalkCtx {
            source,
            desc,
            exported_names: &exported_names,
        };
        walk(root, &mut ctx, &mut enclosing_stack, &mut result, true);
        extract_exports(root, source, desc, &mut result.exports);
        result
    }
}

struct WalkCtx<'a> {
    source: &'a [u8],
    desc: &'a FileDescriptor,
    exported_names: &'a HashSet<String>,
}

fn walk(
    node: Node,
    ctx: &mut WalkCtx,
    enclosing_stack: &mut Vec<String>,
    result: &mut ExtractionResult,
    at_module_scope: bool,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_declaration" | "generator_function_declaration" | "method_definition" => {
                handle_function(child, ctx, enclosing_stack, result, at_module_scope);
            }
            "variable_declarator" => {
                if let Some(value) = child.child_by_field_name("value") {
                    if matches!(value.kind(), "arrow_function" | "function_expression") {
                        handle_named_function_value(child, value, ctx, enclosing_stack, result, at_module_scope);
                        continue;
                    }
                }
                walk(child, ctx, enclosing_stack, result, false);
            }
            "call_expression" => {
                if let Some(callee) = child.child_by_field_name("function") {
                    if let Some(callee_name) = extract_callee_text(callee, ctx.source) {
                        result.calls.push(CallSite {
                            callee_name,
                            file_path: ctx.desc.absolute_path.clone(),
                            line: child.start_position().row + 1,
                            enclosing_function_name: enclosing_stack.last().cloned(),
                        });
                    }
                }
                walk(child, ctx, enclosing_stack, result, false);
            }
            "import_statement" => {
                extract_import(child, ctx.source, ctx.desc, &mut result.imports);
            }
            "export_statement" => {
                // Named/default exports are harvested in `extract_exports`;
                // still recurse so a wrapped `export function foo() {}`
                // declaration is picked up.
                walk(child, ctx, enclosing_stack, result, at_module_scope);
            }
            "statement_block" | "class_body" | "program" | "lexical_declaration" | "variable_declaration" => {
                walk(child, ctx, enclosing_stack, result, at_module_scope);
            }
            _ => {
                walk(child, ctx, enclosing_stack, result, false);
            }
        }
    }
}

fn handle_function(
    def: Node,
    ctx: &mut WalkCtx,
    enclosing_stack: &mut Vec<String>,
    result: &mut ExtractionResult,
    at_module_scope: bool,
) {
    let name = extract_identifier_field(def, "name", ctx.source)
        .unwrap_or_else(|| "<anonymous>".to_string());

    let is_exported = at_module_scope
        && (is_inside_export_statement(def) || ctx.exported_names.contains(&name));

    let is_async = def.child(0).map(|c| c.kind() == "async").unwrap_or(false);

    result.functions.push(FunctionDef {
        name: name.clone(),
        file_path: ctx.desc.absolute_path.clone(),
        start_line: def.start_position().row + 1,
        end_line: def.end_position().row + 1,
        parameters: def
            .child_by_field_name("parameters")
            .map(|p| extract_parameter_names(p, ctx.source))
            .unwrap_or_default(),
        is_exported,
        is_async,
        decorators: Vec::new(),
    });

    enclosing_stack.push(name);
    if let Some(body) = def.child_by_field_name("body") {
        walk(body, ctx, enclosing_stack, result, false);
    }
    enclosing_stack.pop();
}

fn handle_named_function_value(
    declarator: Node,
    value: Node,
    ctx: &mut WalkCtx,
    enclosing_stack: &mut Vec<String>,
    result: &mut ExtractionResult,
    at_module_scope: bool,
) {
    let name = extract_identifier_field(declarator, "name", ctx.source)
        .unwrap_or_else(|| "<anonymous>".to_string());

    let is_exported = at_module_scope
        && (is_inside_export_statement(declarator) || ctx.exported_names.contains(&name));

    let is_async = value.child(0).map(|c| c.kind() == "async").unwrap_or(false);

    result.functions.push(FunctionDef {
        name: name.clone(),
        file_path: ctx.desc.absolute_path.clone(),
        start_line: value.start_position().row + 1,
        end_line: value.end_position().row + 1,
        parameters: value
            .child_by_field_name("parameters")
            .map(|p| extract_parameter_names(p, ctx.source))
            .unwrap_or_default(),
        is_exported,
        is_async,
        decorators: Vec::new(),
    });

    enclosing_stack.push(name);
    if let Some(body) = value.child_by_field_name("body") {
        walk(body, ctx, enclosing_stack, result, false);
    }
    enclosing_stack.pop();
}

fn is_inside_export_statement(node: Node) -> bool {
    node.parent()
        .map(|p| p.kind() == "export_statement")
        .unwrap_or(false)
}

fn extract_identifier_field(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source).ok())
        .map(|s| s.to_string())
}

fn extract_parameter_names(params: Node, source: &[u8]) -> Vec<String> {
    // Bare single-identifier arrow parameters (`x => x + 1`) aren't wrapped
    // in formal_parameters.
    if params.kind() == "identifier" {
        return params
            .utf8_text(source)
            .ok()
            .map(|s| vec![s.to_string()])
            .unwrap_or_default();
    }

    let mut names = Vec::new();
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        let name = match child.kind() {
            "identifier" => child.utf8_text(source).ok().map(|s| s.to_string()),
            "required_parameter" | "optional_parameter" | "assignment_pattern" => child
                .child_by_field_name("pattern")
                .or_else(|| child.child_by_field_name("left"))
                .or_else(|| first_identifier(child))
                .and_then(|n| n.utf8_text(source).ok())
                .map(|s| s.to_string()),
            "rest_pattern" => first_identifier(child)
                .and_then(|n| n.utf8_text(source).ok())
                .map(|s| s.to_string()),
            "object_pattern" | "array_pattern" => first_identifier(child)
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

fn extract_callee_text(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" => node.utf8_text(source).ok().map(|s| s.to_string()),
        "member_expression" => {
            let object = node.child_by_field_name("object")?;
            let property = node.child_by_field_name("property")?;
            let obj_text = extract_callee_text(object, source)?;
            let prop_text = property.utf8_text(source).ok()?;
            Some(format!("{}.{}", obj_text, prop_text))
        }
        "call_expression" => {
            let func = node.child_by_field_name("function")?;
            extract_callee_text(func, source)
        }
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let result = node
                .children(&mut cursor)
                .find_map(|c| extract_callee_text(c, source));
            result
        }
        _ => None,
    }
}

fn extract_import(stmt: Node, source: &[u8], desc: &FileDescriptor, imports: &mut Vec<ImportStmt>) {
    let line = stmt.start_position().row + 1;
    let source_module_string = stmt
        .child_by_field_name("source")
        .or_else(|| {
            let mut cursor = stmt.walk();
            let result = stmt.children(&mut cursor).find(|c| c.kind() == "string");
            result
        })
        .and_then(|n| n.utf8_text(source).ok())
        .map(|s| s.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string())
        .unwrap_or_default();

    let mut imported_names = Vec::new();
    let mut is_default_import = false;

    if let Some(clause) = stmt.child_by_field_name("import_clause").or_else(|| {
        let mut cursor = stmt.walk();
        let result = stmt
            .children(&mut cursor)
            .find(|c| c.kind() == "import_clause");
        result
    }) {
        collect_import_clause(clause, source, &mut imported_names, &mut is_default_import);
    }

    if !imported_names.is_empty() || !source_module_string.is_empty() {
        imports.push(ImportStmt {
            imported_names,
            source_module_string,
            file_path: desc.absolute_path.clone(),
            line,
            is_default_import,
        });
    }
}

fn collect_import_clause(
    clause: Node,
    source: &[u8],
    imported_names: &mut Vec<String>,
    is_default_import: &mut bool,
) {
    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                if let Ok(text) = child.utf8_text(source) {
                    imported_names.push(text.to_string());
                    *is_default_import = true;
                }
            }
            "namespace_import" => {
                if let Ok(text) = child.utf8_text(source) {
                    imported_names.push(text.to_string());
                }
            }
            "named_imports" => {
                let mut inner_cursor = child.walk();
                for spec in child.children(&mut inner_cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let alias = spec
                        .child_by_field_name("alias")
                        .and_then(|n| n.utf8_text(source).ok());
                    let name = spec
                        .child_by_field_name("name")
                        .and_then(|n| n.utf8_text(source).ok());
                    if let Some(name) = name {
                        imported_names.push(alias.unwrap_or(name).to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

/// First pass over the whole tree, collecting every name mentioned by an
/// `export_statement` — named re-exports of bindings declared elsewhere in
/// the file, plus a plain `export default someIdentifier`. Used to mark
/// top-level functions/consts as `is_exported` even when the export and the
/// declaration are textually separate.
fn collect_exported_names(root: Node, source: &[u8]) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut cursor = root.walk();
    collect_exported_names_rec(root, &mut cursor, source, &mut names);
    names
}

fn collect_exported_names_rec(
    node: Node,
    _cursor: &mut tree_sitter::TreeCursor,
    source: &[u8],
    names: &mut HashSet<String>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "export_statement" {
            let mut inner = child.walk();
            for grandchild in child.children(&mut inner) {
                match grandchild.kind() {
                    "export_clause" => {
                        let mut spec_cursor = grandchild.walk();
                        for spec in grandchild.children(&mut spec_cursor) {
                            if spec.kind() != "export_specifier" {
                                continue;
                            }
                            if let Some(name) = spec
                                .child_by_field_name("name")
                                .and_then(|n| n.utf8_text(source).ok())
                            {
                                names.insert(name.to_string());
                            }
                        }
                    }
                    "identifier" => {
                        // `export default foo;`
                        if let Ok(text) = grandchild.utf8_text(source) {
                            names.insert(text.to_string());
                        }
                    }
                    "lexical_declaration" | "variable_declaration" => {
                        // `export const foo = () => {};`
                        let mut decl_cursor = grandchild.walk();
                        for declarator in grandchild.children(&mut decl_cursor) {
                            if declarator.kind() != "variable_declarator" {
                                continue;
                            }
                            if let Some(name) = declarator
                                .child_by_field_name("name")
                                .and_then(|n| n.utf8_text(source).ok())
                            {
                                names.insert(name.to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        collect_exported_names_rec(child, &mut child.walk(), source, names);
    }
}

/// Second pass producing `ExportStmt` records forthe export model.
fn extract_exports(root: Node, source: &[u8], desc: &FileDescriptor, exports: &mut Vec<ExportStmt>) {
    let mut cursor = root.walk();
    extract_exports_rec(root, &mut cursor, source, desc, exports);
}

fn extract_exports_rec(
    node: Node,
    _cursor: &mut tree_sitter::TreeCursor,
    source: &[u8],
    desc: &FileDescriptor,
    exports: &mut Vec<ExportStmt>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "export_statement" {
            let line = child.start_position().row + 1;
            let mut names = Vec::new();
            let mut is_default = false;

            let mut inner = child.walk();
            for grandchild in child.children(&mut inner) {
                match grandchild.kind() {
                    "default" => is_default = true,
                    "export_clause" => {
                        let mut spec_cursor = grandchild.walk();
                        for spec in grandchild.children(&mut spec_cursor) {
                            if spec.kind() != "export_specifier" {
                                continue;
                            }
                            if let Some(name) = spec
                                .child_by_field_name("name")
                                .and_then(|n| n.utf8_text(source).ok())
                            {
                                names.push(name.to_string());
                            }
                        }
                    }
                    "identifier" => {
                        if let Ok(text) = grandchild.utf8_text(source) {
                            names.push(text.to_string());
                        }
                    }
                    "function_declaration" | "class_declaration" | "generator_function_declaration" => {
                        if let Some(name) = grandchild
                            .child_by_field_name("name")
                            .and_then(|n| n.utf8_text(source).ok())
                        {
                            names.push(name.to_string());
                        }
                    }
                    "lexical_declaration" | "variable_declaration" => {
                        let mut decl_cursor = grandchild.walk();
                        for declarator in grandchild.children(&mut decl_cursor) {
                            if declarator.kind() != "variable_declarator" {
                                continue;
                            }
                            if let Some(name) = declarator
                                .child_by_field_name("name")
                                .and_then(|n| n.utf8_text(source).ok())
                            {
                                names.push(name.to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }

            if !names.is_empty() {
                exports.push(ExportStmt {
                    exported_names: names,
                    file_path: desc.absolute_path.clone(),
                    line,
                    is_default_export: is_default,
                });
            }
        }
        extract_exports_rec(child, &mut child.walk(), source, desc, exports);
    }
}

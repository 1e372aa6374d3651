//! Parser module for extracting language-neutral records from source files.
//!
//! `LanguageAdapter` is a capability with `extract_functions`/
//! `extract_calls`/`extract_imports`/`extract_exports` on a parsed syntax
//! tree, dispatched per file by language tag.

pub mod javascript;
pub mod python;

use crate::model::{CallSite, ExportStmt, FileDescriptor, FunctionDef, ImportStmt, Language, ParsedFile};
use tree_sitter::{Parser as TsParser, Tree};

/// Everything one file's adapter run produces, before it's folded into a
/// `ParsedFile`.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub functions: Vec<FunctionDef>,
    pub calls: Vec<CallSite>,
    pub imports: Vec<ImportStmt>,
    pub exports: Vec<ExportStmt>,
}

/// A language-specific capability over a parsed tree-sitter tree.
pub trait LanguageAdapter {
    fn ts_language(&self, lang: Language) -> tree_sitter::Language;
    fn extract(&self, tree: &Tree, source: &[u8], desc: &FileDescriptor) -> ExtractionResult;
}

fn adapter_for(lang: Language) -> &'static dyn LanguageAdapter {
    match lang {
        Language::Python => &python::PythonAdapter,
        Language::JavaScript | Language::Jsx | Language::TypeScript | Language::Tsx => {
            &javascript::JsFamilyAdapter
        }
    }
}

/// Parse one file into a `ParsedFile`. Never fails: file-read errors and
/// tree-sitter setup/parse failures are recorded into `ParsedFile::errors`
/// and an otherwise-empty record stream is returned.
pub fn parse_file(desc: &FileDescriptor) -> ParsedFile {
    let mut parsed = ParsedFile::new(desc.absolute_path.clone(), desc.language);

    let source = match std::fs::read_to_string(&desc.absolute_path) {
        Ok(s) => s,
        Err(err) => {
            parsed
                .errors
                .push(format!("failed to read file: {}", err));
            return parsed;
        }
    };

    let adapter = adapter_for(desc.language);
    let mut ts_parser = TsParser::new();
    if let Err(err) = ts_parser.set_language(&adapter.ts_language(desc.language)) {
        parsed
            .errors
            .push(format!("failed to load grammar: {}", err));
        return parsed;
    }

    let tree = match ts_parser.parse(&source, None) {
        Some(tree) => tree,
        None => {
            parsed.errors.push("tree-sitter failed to parse file".to_string());
            return parsed;
        }
    };

    if tree.root_node().has_error() {
        parsed
            .errors
            .push("syntax errors encountered; partial extraction only".to_string());
    }

    let result = adapter.extract(&tree, source.as_bytes(), desc);
    parsed.functions = result.functions;
    parsed.calls = result.calls;
    parsed.imports = result.imports;
    parsed.exports = result.exports;
    parsed
}

//! Language-neutral record types produced by discovery and parsing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recognized source languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl Language {
    /// Map a file extension (without the leading dot) to its language tag.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Language::Python),
            "js" => Some(Language::JavaScript),
            "jsx" => Some(Language::Jsx),
            "ts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Jsx => "jsx",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
        }
    }

    /// Whether this language is parsed by the JS-family adapter.
    pub fn is_js_family(&self) -> bool {
        !matches!(self, Language::Python)
    }
}

/// A discovered source file. Immutable after discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub absolute_path: PathBuf,
    pub path_relative_to_root: PathBuf,
    pub language: Language,
    pub size_bytes: u64,
    pub line_count: usize,
}

/// A function or method definition extracted by a language adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub file_path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub parameters: Vec<String>,
    pub is_exported: bool,
    pub is_async: bool,
    pub decorators: Vec<String>,
}

/// A syntactic call site. `callee_name` is whatever
/// text the grammar yields for the callee expression — no semantic
/// resolution happens at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSite {
    pub callee_name: String,
    pub file_path: PathBuf,
    pub line: usize,
    pub enclosing_function_name: Option<String>,
}

/// An import statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStmt {
    pub imported_names: Vec<String>,
    pub source_module_string: String,
    pub file_path: PathBuf,
    pub line: usize,
    pub is_default_import: bool,
}

/// An export statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStmt {
    pub exported_names: Vec<String>,
    pub file_path: PathBuf,
    pub line: usize,
    pub is_default_export: bool,
}

/// Output of parsing one file. Never represents a fatal
/// failure — `errors` accumulates parse problems but the record streams
/// are always present, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParsedFile {
    pub file_path: PathBuf,
    pub language: Option<Language>,
    pub functions: Vec<FunctionDef>,
    pub calls: Vec<CallSite>,
    pub imports: Vec<ImportStmt>,
    pub exports: Vec<ExportStmt>,
    pub errors: Vec<String>,
}

impl ParsedFile {
    pub fn new(file_path: PathBuf, language: Language) -> Self {
        Self {
            file_path,
            language: Some(language),
            ..Default::default()
        }
    }
}

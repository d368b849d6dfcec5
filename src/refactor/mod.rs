//! Refactor generator: rewrite a build-format fragment declaration into
//! explicit constructor code.
//!
//! Best-effort and explicitly experimental: the generator asks the
//! resolved export itself for equivalent code, so complex compositions
//! are expected to fail gracefully (a descriptive error, document left
//! without the splice) rather than guarantee a correct rewrite.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::base::DocumentStore;
use crate::base::text_utils::identifiers;
use crate::engine::ScriptError;
use crate::resolve::{ExportStatus, ModuleCache, ensure_exported};

/// The fragment composition library build-format scripts import from.
pub const FRAGMENT_LIBRARY: &str = "fraglib";

/// Constructor vocabulary of the fragment library; generated code is
/// scanned for these to compute missing imports.
pub const KNOWN_CONSTRUCTORS: &[&str] = &["Fragment", "Ring", "Chain", "Branch", "bondTo"];

#[derive(Debug, Error)]
pub enum RefactorError {
    #[error("document is not open")]
    DocumentNotOpen,

    #[error("no declaration on the selected line")]
    NoDeclaration,

    #[error("failed to load module: {0}")]
    Load(#[from] ScriptError),

    #[error("'{0}' was not exported by the module")]
    MissingExport(String),

    #[error("'{0}' does not support code generation")]
    NoCodegen(String),

    #[error("code generation failed: {0}")]
    Generation(String),

    #[error("failed to persist document: {0}")]
    Persist(#[from] std::io::Error),
}

/// What a successful refactor changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefactorOutcome {
    /// Constructors newly imported; empty when everything was already
    /// in scope.
    pub added_imports: Vec<String>,
    /// 0-indexed line where the provenance comment was inserted.
    pub inserted_at: u32,
}

/// Rewrite the declaration on `line` into explicit constructor code,
/// spliced below the declaration together with any missing imports.
pub fn refactor_to_code(
    store: &mut DocumentStore,
    modules: &mut ModuleCache,
    path: &Path,
    line: u32,
) -> Result<RefactorOutcome, RefactorError> {
    let doc = store.get_mut(path).ok_or(RefactorError::DocumentNotOpen)?;
    let (decl, status) = ensure_exported(doc, line).ok_or(RefactorError::NoDeclaration)?;
    if status == ExportStatus::Inserted {
        store.save(path)?;
    }

    let exports = modules.load(path)?;
    let value = exports
        .get(decl.name.as_str())
        .ok_or_else(|| RefactorError::MissingExport(decl.name.to_string()))?;
    let codegen = value
        .codegen
        .clone()
        .ok_or_else(|| RefactorError::NoCodegen(decl.name.to_string()))?;

    let generated = codegen.generate(&decl.name).map_err(|e| {
        warn!(name = %decl.name, error = %e, "code generation failed");
        RefactorError::Generation(e.to_string())
    })?;

    let used = identifiers(&generated);
    let needed: Vec<&str> = KNOWN_CONSTRUCTORS
        .iter()
        .copied()
        .filter(|c| used.iter().any(|ident| ident == c))
        .collect();

    let doc = store.get_mut(path).ok_or(RefactorError::DocumentNotOpen)?;
    let (imported, last_import_line) = scan_imports(doc.text());
    let missing: Vec<String> = needed
        .iter()
        .filter(|c| !imported.iter().any(|i| i == *c))
        .map(|c| c.to_string())
        .collect();

    let mut decl_line = line;
    if !missing.is_empty() {
        let import = format!(
            "import {{ {} }} from \"{FRAGMENT_LIBRARY}\";",
            missing.join(", ")
        );
        let at = last_import_line.map(|l| l + 1).unwrap_or(0);
        doc.insert_line(at, &import);
        if at <= decl_line {
            decl_line += 1;
        }
    }

    let block = format!("// generated from '{}' composition\n{generated}", decl.name);
    doc.insert_line(decl_line + 1, &block);
    store.save(path)?;

    debug!(name = %decl.name, added = missing.len(), "refactor splice applied");
    Ok(RefactorOutcome {
        added_imports: missing,
        inserted_at: decl_line + 1,
    })
}

/// Scan existing import statements: names already imported from the
/// fragment library, and the 0-indexed line of the last import of any
/// kind.
fn scan_imports(text: &str) -> (Vec<String>, Option<u32>) {
    let mut imported = Vec::new();
    let mut last_import_line = None;
    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with("import ") && !trimmed.starts_with("import{") {
            continue;
        }
        last_import_line = Some(line_no as u32);
        let from_library = trimmed.contains(&format!("'{FRAGMENT_LIBRARY}'"))
            || trimmed.contains(&format!("\"{FRAGMENT_LIBRARY}\""));
        if !from_library {
            continue;
        }
        if let Some(open) = trimmed.find('{') {
            if let Some(close) = trimmed[open..].find('}') {
                for name in trimmed[open + 1..open + close].split(',') {
                    let name = name.trim();
                    if !name.is_empty() {
                        imported.push(name.to_string());
                    }
                }
            }
        }
    }
    (imported, last_import_line)
}

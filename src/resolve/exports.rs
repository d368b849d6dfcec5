//! Declaration scanning and the export-marker mutation step.
//!
//! Build-format modules only expose what they export, but users write
//! bare declarations while composing. Resolution therefore inserts the
//! missing `export` marker itself. The mutation is an explicit step with
//! its own contract: the caller must persist the document before any
//! subsequent read of the file from disk.

use smol_str::SmolStr;

use crate::base::Document;
use crate::base::text_utils::{scan_word_at, skip_spaces};

const DECLARATION_KEYWORDS: &[&str] = &["const", "let", "var"];

/// A declaration found on a build-format line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: SmolStr,
    /// Whether the line already carries the `export` marker.
    pub exported: bool,
    /// Character column of the first keyword; a missing `export` marker
    /// is inserted here.
    pub column: u32,
}

/// Outcome of [`ensure_exported`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportStatus {
    AlreadyExported,
    Inserted,
}

/// Scan one line for a declaration pattern: optional `export`, a
/// declaration keyword, an identifier, then `=`.
pub fn find_declaration(line: &str) -> Option<Declaration> {
    let chars: Vec<char> = line.chars().collect();
    let start = skip_spaces(&chars, 0);
    let (first, after_first) = scan_word_at(&chars, start)?;

    let (exported, keyword, after_keyword) = if first == "export" {
        let at = skip_spaces(&chars, after_first);
        let (keyword, end) = scan_word_at(&chars, at)?;
        (true, keyword, end)
    } else {
        (false, first, after_first)
    };

    if !DECLARATION_KEYWORDS.contains(&keyword.as_str()) {
        return None;
    }

    let at = skip_spaces(&chars, after_keyword);
    let (name, after_name) = scan_word_at(&chars, at)?;
    let at = skip_spaces(&chars, after_name);
    if chars.get(at) != Some(&'=') {
        return None;
    }

    Some(Declaration {
        name: SmolStr::new(name),
        exported,
        column: start as u32,
    })
}

/// Make sure the declaration on `line` carries an `export` marker,
/// inserting one into the document when missing.
///
/// Returns `None` when the line holds no declaration. The insertion bumps
/// the document revision; the no-op path does not.
pub fn ensure_exported(doc: &mut Document, line: u32) -> Option<(Declaration, ExportStatus)> {
    let decl = find_declaration(doc.line(line)?)?;
    if decl.exported {
        return Some((decl, ExportStatus::AlreadyExported));
    }
    doc.insert(line, decl.column, "export ");
    Some((decl, ExportStatus::Inserted))
}

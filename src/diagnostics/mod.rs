//! Diagnostics — conversion, construction, and publication.
//!
//! Every diagnostic-producing path in the crate funnels through the types
//! here: engine notes are converted from 1-indexed coordinates and the
//! engine's category taxonomy, static lints and round-trip findings are
//! built directly. The [`DiagnosticStore`] holds one fully-replaced set
//! per document for the UI layer to read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::Span;

mod lints;
mod sync;

pub use lints::lint_build_document;
pub use sync::DiagnosticsSynchronizer;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }

    /// Map an engine category string to a severity.
    ///
    /// Unmatched categories are errors: an unknown failure mode must not
    /// be rendered away as a hint.
    pub fn from_category(category: &str) -> Self {
        match category {
            "error" | "syntax" | "undefined" | "circular" | "redefinition" => Severity::Error,
            "warning" | "chemistry" => Severity::Warning,
            "info" => Severity::Info,
            "hint" => Severity::Hint,
            _ => Severity::Error,
        }
    }
}

/// Source tags identifying the pass that produced a diagnostic.
pub mod sources {
    /// Structured errors/warnings from the DSL engine's parse.
    pub const DSL: &str = "fragment-dsl";
    /// Static deprecated-API lints on build-format documents.
    pub const DEPRECATED_API: &str = "deprecated-api";
    /// Round-trip stability findings.
    pub const ROUND_TRIP: &str = "round-trip";
}

/// A diagnostic message in editor coordinates.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub span: Span,
    pub severity: Severity,
    /// Which pass produced this (see [`sources`]).
    pub source: &'static str,
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Suggested replacement or normalized value, when one exists.
    pub fix: Option<Arc<str>>,
}

impl Diagnostic {
    pub fn new(
        span: Span,
        severity: Severity,
        source: &'static str,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            span,
            severity,
            source,
            code: None,
            message: message.into(),
            fix: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(span: Span, source: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self::new(span, Severity::Error, source, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(span: Span, source: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self::new(span, Severity::Warning, source, message)
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a suggested replacement.
    pub fn with_fix(mut self, fix: impl Into<Arc<str>>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

// ============================================================================
// DIAGNOSTIC STORE
// ============================================================================

/// Per-document diagnostic sets, shared with the UI layer.
///
/// The synchronizer is the only writer. Publishing replaces a document's
/// whole set, so a stale diagnostic never survives a recompute; closing a
/// document removes its set entirely.
#[derive(Debug, Default)]
pub struct DiagnosticStore {
    sets: RwLock<FxHashMap<PathBuf, Vec<Diagnostic>>>,
}

impl DiagnosticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set for a document.
    pub fn publish(&self, path: &Path, set: Vec<Diagnostic>) {
        self.sets.write().insert(path.to_path_buf(), set);
    }

    /// Remove the set for a document.
    pub fn clear(&self, path: &Path) {
        self.sets.write().remove(path);
    }

    /// Snapshot of a document's current set (empty when none).
    pub fn get(&self, path: &Path) -> Vec<Diagnostic> {
        self.sets.read().get(path).cloned().unwrap_or_default()
    }

    pub fn has(&self, path: &Path) -> bool {
        self.sets.read().contains_key(path)
    }
}

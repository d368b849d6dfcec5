//! Full-set diagnostic recompute per document lifecycle event.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::base::{Document, FileKind, Span};
use crate::engine::DslEngine;
use crate::roundtrip;

use super::{Diagnostic, DiagnosticStore, Severity, lint_build_document, sources};

/// Recomputes and republishes a document's diagnostics on every open and
/// change, and clears them on close.
///
/// Owns its own parse of the document: the cursor tracker's cache is not
/// consulted, so a slow or stale resolve can never hold diagnostics back.
pub struct DiagnosticsSynchronizer {
    engine: Arc<dyn DslEngine>,
    store: Arc<DiagnosticStore>,
}

impl DiagnosticsSynchronizer {
    pub fn new(engine: Arc<dyn DslEngine>, store: Arc<DiagnosticStore>) -> Self {
        Self { engine, store }
    }

    pub fn store(&self) -> &Arc<DiagnosticStore> {
        &self.store
    }

    /// Recompute the full set for a document and publish it, replacing
    /// whatever was there before.
    pub fn recompute(&self, doc: &Document) {
        let set = self.compute(doc);
        debug!(path = %doc.path().display(), count = set.len(), "publishing diagnostics");
        self.store.publish(doc.path(), set);
    }

    /// Drop the set for a closed document.
    pub fn document_closed(&self, path: &Path) {
        self.store.clear(path);
    }

    fn compute(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut set = match doc.kind() {
            FileKind::Dsl => self.dsl_diagnostics(doc.text()),
            FileKind::BuildFormat => lint_build_document(doc.text()),
            FileKind::Unsupported => return Vec::new(),
        };
        set.extend(roundtrip::check_document(self.engine.as_ref(), doc.text()));
        set
    }

    fn dsl_diagnostics(&self, text: &str) -> Vec<Diagnostic> {
        let outcome = match self.engine.parse(text) {
            Ok(outcome) => outcome,
            // Total parse failure: one diagnostic at the document start.
            Err(e) => {
                return vec![Diagnostic::error(
                    Span::from_coords(0, 0, 0, 1),
                    sources::DSL,
                    e.to_string(),
                )];
            }
        };

        outcome
            .errors
            .iter()
            .chain(outcome.warnings.iter())
            .map(|note| {
                let span = Span::from_engine(note.line, note.column, note.end_column);
                let severity = Severity::from_category(&note.category);
                Diagnostic::new(span, severity, sources::DSL, note.message.as_str())
                    .with_code(note.category.as_str())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Position;
    use crate::engine::fixtures::StubEngine;

    fn synchronizer(engine: StubEngine) -> DiagnosticsSynchronizer {
        DiagnosticsSynchronizer::new(Arc::new(engine), Arc::new(DiagnosticStore::new()))
    }

    #[test]
    fn test_duplicate_definition_position_conversion() {
        let sync = synchronizer(StubEngine::new());
        let doc = Document::new("lib.frag", "[a] = [C]\n[b] = [a][a]\n[a] = [N]");
        sync.recompute(&doc);

        let set = sync.store().get(doc.path());
        assert_eq!(set.len(), 1);
        // Engine reports 1-based (3, 1); editor position is (2, 0).
        assert_eq!(set[0].span.start, Position::new(2, 0));
        assert_eq!(set[0].severity, Severity::Error);
        assert_eq!(set[0].code.as_deref(), Some("redefinition"));
    }

    #[test]
    fn test_recompute_replaces_not_accumulates() {
        let sync = synchronizer(StubEngine::new());
        let doc = Document::new("lib.frag", "[a] = [C]\n[a] = [N]");

        sync.recompute(&doc);
        sync.recompute(&doc);

        assert_eq!(sync.store().get(doc.path()).len(), 1);
    }

    #[test]
    fn test_total_parse_failure_anchors_at_origin() {
        let sync = synchronizer(StubEngine::new().with_parse_failure("engine exploded"));
        let doc = Document::new("lib.frag", "[a] = [C]");
        sync.recompute(&doc);

        let set = sync.store().get(doc.path());
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].span, Span::from_coords(0, 0, 0, 1));
        assert!(set[0].message.contains("engine exploded"));
    }

    #[test]
    fn test_build_document_gets_static_lints() {
        let sync = synchronizer(StubEngine::new());
        let doc = Document::new(
            "build.fragjs",
            "import { Fragment } from 'fraglib/compat'\nconst w = new Fragment('O')\n",
        );
        sync.recompute(&doc);

        let set = sync.store().get(doc.path());
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|d| d.source == sources::DEPRECATED_API));
    }

    #[test]
    fn test_roundtrip_findings_join_the_set() {
        let engine = StubEngine::new().with_reencode("C1=CC=CC=C1", "c1ccccc1");
        let sync = synchronizer(engine);
        let doc = Document::new(
            "build.fragjs",
            "export const benzene = Fragment('C1=CC=CC=C1').smiles()",
        );
        sync.recompute(&doc);

        let set = sync.store().get(doc.path());
        let sources_found: Vec<_> = set.iter().map(|d| d.source).collect();
        assert!(sources_found.contains(&sources::DEPRECATED_API));
        assert!(sources_found.contains(&sources::ROUND_TRIP));
    }

    #[test]
    fn test_close_clears_set() {
        let sync = synchronizer(StubEngine::new());
        let doc = Document::new("lib.frag", "[a] = [C]\n[a] = [N]");
        sync.recompute(&doc);
        assert!(sync.store().has(doc.path()));

        sync.document_closed(doc.path());
        assert!(!sync.store().has(doc.path()));
    }

    #[test]
    fn test_unsupported_document_publishes_empty_set() {
        let sync = synchronizer(StubEngine::new());
        let doc = Document::new("notes.txt", "[a] = [C]\n[a] = [N]");
        sync.recompute(&doc);
        assert!(sync.store().get(doc.path()).is_empty());
    }
}

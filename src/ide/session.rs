//! The session: owns all mutable state, consumes the event channel.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::base::DocumentStore;
use crate::diagnostics::{DiagnosticStore, DiagnosticsSynchronizer};
use crate::engine::{DslEngine, RenderOptions, ScriptHost, StructureRenderer};
use crate::refactor::{self, RefactorError, RefactorOutcome};
use crate::resolve::{ModuleCache, ResolutionPipeline, ResolvedLine};
use crate::tracker::{CursorTracker, EditorEvent};

/// Failures of the user-invocable actions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no fragment is resolved at the cursor")]
    NothingResolved,

    #[error("no cursor position is being tracked")]
    NoCursor,

    #[error(transparent)]
    Refactor(#[from] RefactorError),

    #[error("rendering failed: {0}")]
    Render(String),
}

/// Owns the document mirror, cursor tracker, and diagnostics
/// synchronizer, and routes every editor event through them in one place.
pub struct Session {
    store: DocumentStore,
    tracker: CursorTracker,
    diagnostics: DiagnosticsSynchronizer,
    renderer: Arc<dyn StructureRenderer>,
    panel_visible: bool,
}

impl Session {
    pub fn new(
        engine: Arc<dyn DslEngine>,
        host: Arc<dyn ScriptHost>,
        renderer: Arc<dyn StructureRenderer>,
    ) -> Self {
        let pipeline = ResolutionPipeline::new(engine.clone(), ModuleCache::new(host));
        Self {
            store: DocumentStore::new(),
            tracker: CursorTracker::new(pipeline),
            diagnostics: DiagnosticsSynchronizer::new(engine, Arc::new(DiagnosticStore::new())),
            renderer,
            panel_visible: false,
        }
    }

    /// Feed one editor event through the session.
    ///
    /// The mirror mutates first, then diagnostics recompute, then the
    /// tracker resolves; document text mutation always precedes any read
    /// of that text within the same dispatch.
    pub fn dispatch(&mut self, event: EditorEvent) {
        match &event {
            EditorEvent::DocumentOpened { path, text } => {
                self.store.open(path.clone(), text.clone());
                if let Some(doc) = self.store.get(path) {
                    self.diagnostics.recompute(doc);
                }
            }
            EditorEvent::DocumentChanged { path, text } => {
                self.store.update(path, text.clone());
                if let Some(doc) = self.store.get(path) {
                    self.diagnostics.recompute(doc);
                }
            }
            EditorEvent::DocumentClosed { path } => {
                self.diagnostics.document_closed(path);
            }
            EditorEvent::EditorSwitched { .. } | EditorEvent::SelectionChanged { .. } => {}
        }

        self.tracker.handle_event(&event, &mut self.store);

        // The mirror entry goes last so the tracker can still settle to
        // `None` while the document is on its way out.
        if let EditorEvent::DocumentClosed { path } = &event {
            self.store.close(path);
        }
    }

    /// Register for settled resolved-line values.
    pub fn subscribe(&mut self, subscriber: impl FnMut(Option<&ResolvedLine>) + 'static) {
        self.tracker.subscribe(subscriber);
    }

    /// The live resolved line, if any.
    pub fn current(&self) -> Option<&ResolvedLine> {
        self.tracker.current()
    }

    /// The shared per-document diagnostic sets.
    pub fn diagnostic_store(&self) -> &Arc<DiagnosticStore> {
        self.diagnostics.store()
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.store
    }

    // ==================== User actions ====================

    /// Render the structure of the fragment at the cursor.
    pub fn show_structure(&self, options: &RenderOptions) -> Result<String, SessionError> {
        let resolved = self.tracker.current().ok_or(SessionError::NothingResolved)?;
        let notation = resolved
            .notation
            .as_deref()
            .ok_or(SessionError::NothingResolved)?;
        if !self.renderer.is_valid(notation) {
            return Err(SessionError::Render(format!(
                "structurally invalid notation: {notation}"
            )));
        }
        self.renderer
            .render(notation, options)
            .map_err(|e| SessionError::Render(e.to_string()))
    }

    /// Toggle the feedback panel; returns the new visibility.
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_visible = !self.panel_visible;
        debug!(visible = self.panel_visible, "panel toggled");
        self.panel_visible
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// Rewrite the declaration at the cursor into explicit constructor
    /// code. Best-effort: fails with a descriptive error and leaves the
    /// document without the splice otherwise.
    pub fn refactor_to_code(&mut self) -> Result<RefactorOutcome, SessionError> {
        let cursor = self.tracker.cursor().cloned().ok_or(SessionError::NoCursor)?;
        let modules = self.tracker.pipeline_mut().modules_mut();
        let outcome =
            refactor::refactor_to_code(&mut self.store, modules, &cursor.path, cursor.line)?;
        Ok(outcome)
    }
}

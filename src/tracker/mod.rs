//! Cursor tracking and the [`ResolvedLine`] change stream.
//!
//! The tracker owns the "current document + current line" state machine:
//! `Idle` (no supported document) → `Attached`, and per cursor movement a
//! resolve that settles to `Some(ResolvedLine)` or `None`. Subscribers
//! receive every settled value.
//!
//! The DSL [`ParseCache`] lives here rather than in the pipeline because
//! only the tracker knows when the active document changes.

mod events;


pub use events::EditorEvent;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::base::DocumentStore;
use crate::resolve::{ParseCache, ResolutionPipeline, ResolvedLine};

/// The tracked cursor: active document and 0-indexed line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorState {
    pub path: PathBuf,
    pub line: u32,
}

type Subscriber = Box<dyn FnMut(Option<&ResolvedLine>)>;

pub struct CursorTracker {
    pipeline: ResolutionPipeline,
    cursor: Option<CursorState>,
    parse_cache: ParseCache,
    current: Option<ResolvedLine>,
    subscribers: Vec<Subscriber>,
}

impl CursorTracker {
    pub fn new(pipeline: ResolutionPipeline) -> Self {
        Self {
            pipeline,
            cursor: None,
            parse_cache: ParseCache::new(),
            current: None,
            subscribers: Vec::new(),
        }
    }

    /// Register for settled values. The subscriber fires on every settle,
    /// including settles to `None`.
    pub fn subscribe(&mut self, subscriber: impl FnMut(Option<&ResolvedLine>) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// The live resolved line, if any.
    pub fn current(&self) -> Option<&ResolvedLine> {
        self.current.as_ref()
    }

    pub fn cursor(&self) -> Option<&CursorState> {
        self.cursor.as_ref()
    }

    pub fn pipeline_mut(&mut self) -> &mut ResolutionPipeline {
        &mut self.pipeline
    }

    /// Feed one editor event through the tracker.
    pub fn handle_event(&mut self, event: &EditorEvent, store: &mut DocumentStore) {
        match event {
            EditorEvent::EditorSwitched { path, line } => {
                self.on_editor_switched(path, *line, store);
            }
            EditorEvent::SelectionChanged { path, line } => {
                self.on_selection_changed(path, *line, store);
            }
            EditorEvent::DocumentChanged { path, .. } => {
                self.on_document_changed(path, store);
            }
            EditorEvent::DocumentClosed { path } => {
                self.on_document_closed(path);
            }
            EditorEvent::DocumentOpened { .. } => {}
        }
    }

    fn on_editor_switched(&mut self, path: &Path, line: u32, store: &mut DocumentStore) {
        let supported = store
            .get(path)
            .is_some_and(|doc| doc.kind().is_supported());
        if !supported {
            // Stay attached to the last supported document.
            return;
        }
        debug!(path = %path.display(), line, "attached to document");
        self.parse_cache.clear();
        self.cursor = Some(CursorState {
            path: path.to_path_buf(),
            line,
        });
        // Even an unchanged line index must resolve: the document changed.
        self.resolve_current(store);
    }

    fn on_selection_changed(&mut self, path: &Path, line: u32, store: &mut DocumentStore) {
        let moved = self
            .cursor
            .as_ref()
            .is_some_and(|c| c.path == path && c.line != line);
        if !moved {
            return;
        }
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.line = line;
        }
        self.resolve_current(store);
    }

    fn on_document_changed(&mut self, path: &Path, store: &mut DocumentStore) {
        let attached = self.cursor.as_ref().is_some_and(|c| c.path == path);
        if !attached {
            return;
        }
        // Conservative: any edit invalidates the parse wholesale.
        self.parse_cache.clear();
        self.resolve_current(store);
    }

    fn on_document_closed(&mut self, path: &Path) {
        let attached = self.cursor.as_ref().is_some_and(|c| c.path == path);
        if !attached {
            return;
        }
        self.cursor = None;
        self.parse_cache.clear();
        self.settle(None);
    }

    fn resolve_current(&mut self, store: &mut DocumentStore) {
        let Some(cursor) = self.cursor.clone() else {
            return;
        };
        let resolved =
            self.pipeline
                .resolve_line(store, &cursor.path, cursor.line, &mut self.parse_cache);
        self.settle(resolved);
    }

    fn settle(&mut self, resolved: Option<ResolvedLine>) {
        self.current = resolved;
        let current = self.current.as_ref();
        for subscriber in &mut self.subscribers {
            subscriber(current);
        }
    }
}

//! Typed editor event channel.

use std::path::PathBuf;

/// Events from the editor, one variant per source.
///
/// All events funnel through a single dispatcher
/// ([`crate::ide::Session::dispatch`]) instead of per-source listeners,
/// so every state change happens in one place and in one order.
#[derive(Clone, Debug)]
pub enum EditorEvent {
    /// The active editor switched to the document at `path`.
    EditorSwitched { path: PathBuf, line: u32 },
    /// The cursor moved within the active document.
    SelectionChanged { path: PathBuf, line: u32 },
    DocumentOpened { path: PathBuf, text: String },
    DocumentChanged { path: PathBuf, text: String },
    DocumentClosed { path: PathBuf },
}

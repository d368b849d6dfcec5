//! Editor document mirror.
//!
//! The editor owns its documents; the core observes them through this
//! mirror. [`DocumentStore`] holds one [`Document`] per open file, updated
//! from editor events, and is the single authority the core reads text
//! from and writes text back to (auto-export insertion, refactor splice).

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Classification of an open file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Textual fragment-definition DSL (`.frag`).
    Dsl,
    /// Programmatic build-format script (`.fragjs`).
    BuildFormat,
    /// Anything else; the core ignores these.
    Unsupported,
}

impl FileKind {
    /// Classify a file by its extension.
    pub fn classify(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("frag") => FileKind::Dsl,
            Some("fragjs") => FileKind::BuildFormat,
            _ => FileKind::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileKind::Unsupported)
    }
}

/// Opaque marker that changes on every edit.
///
/// Two revisions compare equal only if no edit happened between them;
/// nothing else about the value is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Revision(Uuid);

impl Revision {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A mirrored editor document.
#[derive(Clone, Debug)]
pub struct Document {
    path: PathBuf,
    text: String,
    kind: FileKind,
    revision: Revision,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let kind = FileKind::classify(&path);
        Self {
            path,
            text: text.into(),
            kind,
            revision: Revision::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Get the line at a 0-indexed line number, without its terminator.
    pub fn line(&self, index: u32) -> Option<&str> {
        self.text.lines().nth(index as usize)
    }

    pub fn line_count(&self) -> u32 {
        self.text.lines().count() as u32
    }

    /// Replace the full text, bumping the revision.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision = Revision::new();
    }

    /// Insert `insertion` at a 0-indexed line/character column, bumping the
    /// revision. Returns false when the position does not exist.
    pub fn insert(&mut self, line: u32, column: u32, insertion: &str) -> bool {
        let Some(line_start) = self.line_start_offset(line) else {
            return false;
        };
        let line_text = &self.text[line_start..];
        let line_end = line_text.find('\n').unwrap_or(line_text.len());
        let Some(column_offset) = char_to_byte(&line_text[..line_end], column) else {
            return false;
        };
        self.text.insert_str(line_start + column_offset, insertion);
        self.revision = Revision::new();
        true
    }

    /// Insert `content` (one or more lines, no trailing newline) so that
    /// its first line becomes line `at`. An index past the end appends.
    pub fn insert_line(&mut self, at: u32, content: &str) {
        match self.line_start_offset(at) {
            Some(offset) => {
                self.text.insert(offset, '\n');
                self.text.insert_str(offset, content);
            }
            None => {
                if !self.text.is_empty() && !self.text.ends_with('\n') {
                    self.text.push('\n');
                }
                self.text.push_str(content);
                self.text.push('\n');
            }
        }
        self.revision = Revision::new();
    }

    /// Byte offset of the start of a 0-indexed line.
    fn line_start_offset(&self, line: u32) -> Option<usize> {
        if line == 0 {
            return Some(0);
        }
        let mut remaining = line;
        for (offset, byte) in self.text.bytes().enumerate() {
            if byte == b'\n' {
                remaining -= 1;
                if remaining == 0 {
                    return Some(offset + 1);
                }
            }
        }
        None
    }
}

/// Byte offset of a 0-indexed character column within a line.
fn char_to_byte(line: &str, column: u32) -> Option<usize> {
    if column == 0 {
        return Some(0);
    }
    let mut count = 0u32;
    for (offset, _) in line.char_indices() {
        if count == column {
            return Some(offset);
        }
        count += 1;
    }
    (column <= count).then_some(line.len())
}

/// The set of open documents, keyed by path.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: FxHashMap<PathBuf, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror a newly opened document, replacing any prior entry.
    pub fn open(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let doc = Document::new(path, text);
        self.documents.insert(doc.path.clone(), doc);
    }

    /// Apply an editor-side text change. Unknown paths are opened; the
    /// editor is the source of truth either way.
    pub fn update(&mut self, path: &Path, text: impl Into<String>) {
        match self.documents.get_mut(path) {
            Some(doc) => doc.set_text(text),
            None => self.open(path.to_path_buf(), text),
        }
    }

    pub fn close(&mut self, path: &Path) -> bool {
        self.documents.remove(path).is_some()
    }

    pub fn get(&self, path: &Path) -> Option<&Document> {
        self.documents.get(path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Document> {
        self.documents.get_mut(path)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Persist a document's mirrored text to disk.
    ///
    /// Build-format resolution executes the file from disk, so any text
    /// mutation must be persisted before the module load that follows it.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let doc = self
            .documents
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "document not open"))?;
        std::fs::write(&doc.path, &doc.text)
    }
}

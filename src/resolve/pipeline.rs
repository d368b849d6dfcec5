//! The resolution pipeline: document + target line → [`ResolvedLine`].

use std::path::Path;
use std::sync::Arc;

use tracing::{trace, warn};

use crate::base::{Document, DocumentStore, FileKind, Revision};
use crate::engine::{DslEngine, ParseOutcome, ResolveOptions};

use super::ResolvedLine;
use super::exports::{ExportStatus, ensure_exported};
use super::module_cache::ModuleCache;

/// Cached DSL parse for the active document.
///
/// Holds at most one parse, tagged with the revision it was computed
/// from; a lookup under any other revision is a miss. Cleared outright on
/// document switch and document change.
#[derive(Default)]
pub struct ParseCache {
    slot: Option<(Revision, Arc<ParseOutcome>)>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    fn get(&self, revision: Revision) -> Option<Arc<ParseOutcome>> {
        self.slot
            .as_ref()
            .filter(|(tag, _)| *tag == revision)
            .map(|(_, parse)| parse.clone())
    }

    fn insert(&mut self, revision: Revision, parse: Arc<ParseOutcome>) {
        self.slot = Some((revision, parse));
    }
}

/// Resolves one line of one document, branching on file kind.
///
/// Owns the build-format [`ModuleCache`]; the DSL [`ParseCache`] is owned
/// by the cursor tracker, which knows when the active document changes.
pub struct ResolutionPipeline {
    engine: Arc<dyn DslEngine>,
    modules: ModuleCache,
}

impl ResolutionPipeline {
    pub fn new(engine: Arc<dyn DslEngine>, modules: ModuleCache) -> Self {
        Self { engine, modules }
    }

    pub fn engine(&self) -> &Arc<dyn DslEngine> {
        &self.engine
    }

    pub fn modules_mut(&mut self) -> &mut ModuleCache {
        &mut self.modules
    }

    /// Resolve the fragment on `line` of the document at `path`.
    ///
    /// `None` means the line holds no fragment (blank line, non-fragment
    /// export, unsupported file). Build-format resolution may mutate and
    /// persist the document (export-marker insertion) before the module
    /// load reads the file from disk.
    pub fn resolve_line(
        &mut self,
        store: &mut DocumentStore,
        path: &Path,
        line: u32,
        cache: &mut ParseCache,
    ) -> Option<ResolvedLine> {
        let kind = store.get(path)?.kind();
        trace!(path = %path.display(), line, ?kind, "resolving line");
        match kind {
            FileKind::Dsl => {
                let doc = store.get(path)?;
                self.resolve_dsl_line(doc, line, cache)
            }
            FileKind::BuildFormat => self.resolve_build_line(store, path, line),
            FileKind::Unsupported => None,
        }
    }

    fn resolve_dsl_line(
        &self,
        doc: &Document,
        line: u32,
        cache: &mut ParseCache,
    ) -> Option<ResolvedLine> {
        let parse = match cache.get(doc.revision()) {
            Some(parse) => parse,
            None => match self.engine.parse(doc.text()) {
                Ok(outcome) => {
                    let parse = Arc::new(outcome);
                    cache.insert(doc.revision(), parse.clone());
                    parse
                }
                Err(e) => {
                    warn!(path = %doc.path().display(), error = %e, "parse failed");
                    return Some(ResolvedLine::failed(line, e.to_string()));
                }
            },
        };

        // Engine lines are 1-indexed.
        let def = parse.definition_at_line(line + 1)?;
        let mut resolved = ResolvedLine::new(line, def.name.clone(), def.expression());

        let options = ResolveOptions {
            validate_valence: false,
        };
        let notation = match self.engine.resolve(&parse, &def.name, options) {
            Ok(notation) => notation,
            Err(e) => {
                resolved.record_error(e.to_string());
                return Some(resolved);
            }
        };
        resolved.notation = Some(notation.clone());
        self.fill_properties(&mut resolved, &notation);
        Some(resolved)
    }

    fn resolve_build_line(
        &mut self,
        store: &mut DocumentStore,
        path: &Path,
        line: u32,
    ) -> Option<ResolvedLine> {
        let doc = store.get_mut(path)?;
        let expression = declaration_expression(doc.line(line)?);
        let (decl, status) = ensure_exported(doc, line)?;
        if status == ExportStatus::Inserted {
            // The module executes from disk; the inserted marker must be
            // there before the load.
            if let Err(e) = store.save(path) {
                warn!(path = %path.display(), error = %e, "persisting export marker failed");
                let mut resolved = ResolvedLine::new(line, decl.name, expression);
                resolved.record_error(format!("failed to persist export marker: {e}"));
                return Some(resolved);
            }
        }

        let exports = match self.modules.load(path) {
            Ok(exports) => exports,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "module load failed");
                let mut resolved = ResolvedLine::new(line, decl.name, expression);
                resolved.record_error(e.annotated_message());
                return Some(resolved);
            }
        };

        // Not every export is a fragment; values without the fragment
        // shape settle to nothing rather than an error.
        let value = exports.get(decl.name.as_str())?;
        let notation = value.notation.clone()?;

        let mut resolved = ResolvedLine::new(line, decl.name, expression);
        resolved.notation = Some(notation.to_string());
        self.fill_properties(&mut resolved, &notation);
        Some(resolved)
    }

    /// Fill derived notation, weight, and formula. Each lookup depends
    /// only on the notation, so one failure does not stop the others; the
    /// first error is kept.
    fn fill_properties(&self, resolved: &mut ResolvedLine, notation: &str) {
        match self.engine.decode(notation) {
            Ok(derived) => resolved.derived_notation = Some(derived),
            Err(e) => resolved.record_error(e.to_string()),
        }
        match self.engine.molecular_weight(notation) {
            Ok(weight) => resolved.molecular_weight = Some(weight),
            Err(e) => resolved.record_error(e.to_string()),
        }
        match self.engine.formula(notation) {
            Ok(formula) => resolved.formula = Some(formula),
            Err(e) => resolved.record_error(e.to_string()),
        }
    }
}

/// The declaration expression as written: everything after the `=`.
fn declaration_expression(line: &str) -> String {
    match line.split_once('=') {
        Some((_, rhs)) => rhs.trim().to_string(),
        None => line.trim().to_string(),
    }
}

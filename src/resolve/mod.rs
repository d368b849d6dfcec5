//! Resolution: document + target line → [`ResolvedLine`].
//!
//! The pipeline branches on file kind: DSL documents go through the
//! external engine (parse, resolve, encode, property lookup); build-format
//! documents are executed as modules through the single-slot
//! [`ModuleCache`], after making sure the declaration under the cursor is
//! exported.

mod exports;
mod module_cache;
mod pipeline;
mod resolved_line;

pub use exports::{Declaration, ExportStatus, ensure_exported, find_declaration};
pub use module_cache::ModuleCache;
pub use pipeline::{ParseCache, ResolutionPipeline};
pub use resolved_line::ResolvedLine;

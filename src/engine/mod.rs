//! External collaborator contracts.
//!
//! The chemistry itself is out of scope for this crate: parsing, resolving,
//! encoding, property lookup, and rendering are performed by external
//! engines behind the traits in this module. The crate only orchestrates
//! them. All positions reported by the engine are 1-indexed; conversion to
//! editor coordinates happens in [`crate::base::position`].

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

mod script;

#[cfg(test)]
pub(crate) mod fixtures;

pub use script::{
    ExportValue, FragmentCodegen, LoadToken, ModuleExports, ScriptError, ScriptHost,
};

// ============================================================================
// ERRORS
// ============================================================================

/// Errors surfaced by the chemistry engine collaborators.
#[derive(Clone, Debug, Error)]
pub enum EngineError {
    /// The document could not be parsed at all (distinct from the
    /// structured errors carried inside a [`ParseOutcome`]).
    #[error("parse error: {0}")]
    Parse(String),

    /// Resolution failed (undefined reference, circular reference,
    /// chemistry validation).
    #[error("{0}")]
    Resolve(String),

    /// Encoding or decoding a notation failed.
    #[error("{0}")]
    Encode(String),

    /// A property lookup (weight, formula) failed.
    #[error("{0}")]
    Property(String),

    /// The renderer rejected a structurally invalid notation.
    #[error("invalid notation: {0}")]
    Render(String),
}

// ============================================================================
// PARSE MODEL
// ============================================================================

/// A single error or warning reported by the DSL engine.
///
/// Coordinates are 1-indexed as reported; `end_column` may be absent for
/// point diagnostics.
#[derive(Clone, Debug)]
pub struct EngineNote {
    pub line: u32,
    pub column: u32,
    pub end_column: Option<u32>,
    /// Category string from the engine's taxonomy ("syntax", "undefined",
    /// "circular", "redefinition", "chemistry", ...).
    pub category: SmolStr,
    pub message: String,
}

/// A named fragment definition. Immutable once parsed; a reparse replaces
/// the whole definition set.
#[derive(Clone, Debug)]
pub struct Definition {
    pub name: SmolStr,
    /// 1-indexed source line of the definition.
    pub source_line: u32,
    /// The definition body as the engine tokenized it.
    pub tokens: Vec<SmolStr>,
}

impl Definition {
    /// The definition body as written, token sequence re-joined.
    pub fn expression(&self) -> String {
        self.tokens.iter().map(SmolStr::as_str).collect()
    }
}

/// Everything the DSL engine reports for one parse of a document.
#[derive(Clone, Debug, Default)]
pub struct ParseOutcome {
    pub definitions: FxHashMap<SmolStr, Definition>,
    pub errors: Vec<EngineNote>,
    pub warnings: Vec<EngineNote>,
}

impl ParseOutcome {
    /// Find the definition declared on a 1-indexed source line.
    pub fn definition_at_line(&self, source_line: u32) -> Option<&Definition> {
        self.definitions
            .values()
            .find(|d| d.source_line == source_line)
    }
}

/// Options for [`DslEngine::resolve`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolveOptions {
    /// Run full valence validation. Live cursor feedback resolves with
    /// this off so that chemically sloppy intermediate states still show
    /// a structure.
    pub validate_valence: bool,
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// The DSL engine: parse, resolve, encode/decode, property lookup.
pub trait DslEngine {
    /// Parse a full document. `Err` means total parse failure; structured
    /// errors and warnings come back inside the outcome.
    fn parse(&self, text: &str) -> Result<ParseOutcome, EngineError>;

    /// Resolve a named definition to its notation string. Fails with a
    /// descriptive message when the name is undefined or circular.
    fn resolve(
        &self,
        parse: &ParseOutcome,
        name: &str,
        options: ResolveOptions,
    ) -> Result<String, EngineError>;

    /// Convert a notation to its derived interchange form.
    fn decode(&self, notation: &str) -> Result<String, EngineError>;

    /// One parse→encode round-trip pass over a notation string.
    fn reencode(&self, notation: &str) -> Result<String, EngineError>;

    fn molecular_weight(&self, notation: &str) -> Result<f64, EngineError>;

    fn formula(&self, notation: &str) -> Result<String, EngineError>;
}

/// Options for [`StructureRenderer::render`].
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
        }
    }
}

/// The molecular rendering engine.
pub trait StructureRenderer {
    /// Render a notation to an image description. Fails when the notation
    /// is structurally invalid.
    fn render(&self, notation: &str, options: &RenderOptions) -> Result<String, EngineError>;

    fn is_valid(&self, notation: &str) -> bool;
}

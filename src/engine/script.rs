//! Capability-scoped script execution for build-format files.
//!
//! Build-format documents are executable scripts; how they are executed
//! (a scripting runtime, an embedded interpreter) is an implementation
//! detail behind [`ScriptHost`]. The contract is only: given a path and a
//! fresh [`LoadToken`], produce the module's named exports. The token makes
//! every load distinct so that no lower-level memoization in the host can
//! serve stale code after an edit.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;
use uuid::Uuid;

/// Cache-busting token minted once per fresh load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadToken(Uuid);

impl LoadToken {
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Errors from executing a build-format module.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The script failed to execute (syntax error, missing dependency,
    /// runtime throw). `trace` carries the host's diagnostic trace when
    /// one exists.
    #[error("{message}")]
    Execution {
        message: String,
        trace: Option<String>,
    },
}

impl ScriptError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            trace: None,
        }
    }

    pub fn execution_with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            trace: Some(trace.into()),
        }
    }

    /// The failure message, annotated with a line number when the
    /// diagnostic trace exposes a `line:column` pattern.
    pub fn annotated_message(&self) -> String {
        match self {
            ScriptError::Io(e) => e.to_string(),
            ScriptError::Execution { message, trace } => match trace
                .as_deref()
                .and_then(find_line_column)
            {
                Some((line, _)) => format!("{message} (at line {line})"),
                None => message.clone(),
            },
        }
    }
}

/// Find the first `digits:digits` pattern in a diagnostic trace.
fn find_line_column(trace: &str) -> Option<(u32, u32)> {
    let bytes = trace.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let line_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b':' {
                let col_start = i + 1;
                let mut j = col_start;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j > col_start {
                    let line = trace[line_start..i].parse().ok()?;
                    let column = trace[col_start..j].parse().ok()?;
                    return Some((line, column));
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Code-generation capability exposed by a fragment export.
pub trait FragmentCodegen: Send + Sync {
    /// Generate explicit constructor code equivalent to the named
    /// declaration's composition.
    fn generate(&self, name: &str) -> Result<String, ScriptError>;
}

/// A single named value exported by an executed module.
///
/// Not every export is a fragment: a script may export helpers or
/// constants. Only values carrying a notation have the fragment shape the
/// resolution pipeline cares about.
#[derive(Clone, Default)]
pub struct ExportValue {
    pub notation: Option<SmolStr>,
    pub codegen: Option<Arc<dyn FragmentCodegen>>,
}

impl ExportValue {
    /// An export without the fragment shape.
    pub fn opaque() -> Self {
        Self::default()
    }

    pub fn fragment(notation: impl Into<SmolStr>) -> Self {
        Self {
            notation: Some(notation.into()),
            codegen: None,
        }
    }

    pub fn with_codegen(mut self, codegen: Arc<dyn FragmentCodegen>) -> Self {
        self.codegen = Some(codegen);
        self
    }

    pub fn is_fragment(&self) -> bool {
        self.notation.is_some()
    }
}

impl fmt::Debug for ExportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportValue")
            .field("notation", &self.notation)
            .field("codegen", &self.codegen.is_some())
            .finish()
    }
}

/// The named exports of an executed module, in declaration order.
pub type ModuleExports = IndexMap<SmolStr, ExportValue>;

/// The module-execution host.
pub trait ScriptHost {
    /// Execute the build-format file at `path` and return its exports.
    /// The token is minted fresh for each load; hosts must not serve a
    /// result memoized under a different token.
    fn execute(&self, path: &Path, token: LoadToken) -> Result<ModuleExports, ScriptError>;
}

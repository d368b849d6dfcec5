//! Single-slot cache of executed build-format modules.
//!
//! The key is path + modification time, so the cache never serves exports
//! for a file state older than what is on disk. At most one module is
//! resident at any time: a miss evicts the whole slot before the fresh
//! load runs, and a failed load leaves it empty so the next attempt is a
//! clean retry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::engine::{LoadToken, ModuleExports, ScriptError, ScriptHost};

#[derive(Clone, Debug, PartialEq, Eq)]
struct ModuleKey {
    path: PathBuf,
    modified: SystemTime,
}

struct CacheEntry {
    key: ModuleKey,
    exports: Arc<ModuleExports>,
}

pub struct ModuleCache {
    host: Arc<dyn ScriptHost>,
    entry: Option<CacheEntry>,
}

impl ModuleCache {
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self { host, entry: None }
    }

    /// Load the module at `path`, serving cached exports when both the
    /// path and the file's current modification time match the resident
    /// entry.
    pub fn load(&mut self, path: &Path) -> Result<Arc<ModuleExports>, ScriptError> {
        let modified = std::fs::metadata(path)?.modified()?;
        let key = ModuleKey {
            path: path.to_path_buf(),
            modified,
        };

        if let Some(entry) = &self.entry {
            if entry.key == key {
                trace!(path = %path.display(), "module cache hit");
                return Ok(entry.exports.clone());
            }
        }

        // Evict before loading so the slot is empty even if the load fails.
        self.entry = None;

        debug!(path = %path.display(), "executing build-format module");
        let exports = Arc::new(self.host.execute(path, LoadToken::mint())?);
        self.entry = Some(CacheEntry {
            key,
            exports: exports.clone(),
        });
        Ok(exports)
    }

    /// Whether a module is currently resident.
    pub fn resident(&self) -> bool {
        self.entry.is_some()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

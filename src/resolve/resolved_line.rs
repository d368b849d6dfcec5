//! The unit pushed to downstream consumers.

use smol_str::SmolStr;

/// Everything known about the fragment on one editor line.
///
/// Exactly one is live at a time per cursor tracker. Fields are filled
/// stage by stage; a stage failure lands in `error` without discarding
/// what earlier stages already computed.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLine {
    /// 0-indexed editor line.
    pub line: u32,
    pub name: SmolStr,
    /// The definition body or declaration expression as written.
    pub expression: String,
    pub notation: Option<String>,
    pub derived_notation: Option<String>,
    pub molecular_weight: Option<f64>,
    pub formula: Option<String>,
    pub error: Option<String>,
}

impl ResolvedLine {
    pub fn new(line: u32, name: impl Into<SmolStr>, expression: impl Into<String>) -> Self {
        Self {
            line,
            name: name.into(),
            expression: expression.into(),
            notation: None,
            derived_notation: None,
            molecular_weight: None,
            formula: None,
            error: None,
        }
    }

    /// A line that failed before anything was known about it.
    pub fn failed(line: u32, error: impl Into<String>) -> Self {
        let mut resolved = Self::new(line, "", "");
        resolved.error = Some(error.into());
        resolved
    }

    /// Record a stage failure. The first error wins; later stages may
    /// still fill fields they can compute independently.
    pub fn record_error(&mut self, error: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }
}

//! Static lint pass for build-format documents.
//!
//! Deterministic per-line pattern checks for deprecated fraglib API
//! usage. Runs on text alone, independent of module execution, so a
//! script that fails to load still gets its lints.

use crate::base::Span;

use super::{Diagnostic, sources};

/// Lint codes for deprecated build-format API usage.
pub mod codes {
    /// Import from the retired compatibility shim path.
    pub const DEPRECATED_IMPORT_PATH: &str = "L0001";
    /// `.smiles()` was renamed to `.notation()`.
    pub const RENAMED_METHOD: &str = "L0002";
    /// `new Fragment(…)` is now the factory form `Fragment(…)`.
    pub const OLD_CONSTRUCTOR_FORM: &str = "L0003";
}

struct Detector {
    needle: &'static str,
    replacement: &'static str,
    code: &'static str,
    message: &'static str,
}

const DETECTORS: &[Detector] = &[
    Detector {
        needle: "fraglib/compat",
        replacement: "fraglib",
        code: codes::DEPRECATED_IMPORT_PATH,
        message: "the 'fraglib/compat' shim is deprecated; import from 'fraglib'",
    },
    Detector {
        needle: ".smiles(",
        replacement: ".notation(",
        code: codes::RENAMED_METHOD,
        message: ".smiles() was renamed; use .notation()",
    },
    Detector {
        needle: "new Fragment(",
        replacement: "Fragment(",
        code: codes::OLD_CONSTRUCTOR_FORM,
        message: "constructing with 'new' is deprecated; call Fragment(…) directly",
    },
];

/// Scan a build-format document, one diagnostic per pattern match.
pub fn lint_build_document(text: &str) -> Vec<Diagnostic> {
    let mut findings = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        for detector in DETECTORS {
            for (byte_idx, _) in line.match_indices(detector.needle) {
                let column = line[..byte_idx].chars().count() as u32;
                let width = detector.needle.chars().count() as u32;
                let span =
                    Span::from_coords(line_no as u32, column, line_no as u32, column + width);
                findings.push(
                    Diagnostic::error(span, sources::DEPRECATED_API, detector.message)
                        .with_code(detector.code)
                        .with_fix(detector.replacement),
                );
            }
        }
    }
    findings
}

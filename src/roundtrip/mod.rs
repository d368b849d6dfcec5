//! Round-trip stability checking of embedded notation literals.
//!
//! Scans raw document text for string literals and `notation`-labeled
//! values that look like chemical notation, and checks whether each one
//! survives a parse→encode round trip unchanged. This is a best-effort
//! text heuristic, not a parser: it can miss true positives and flag
//! non-notation strings. Acceptable, because findings are non-blocking
//! diagnostics and a parse failure on a literal silently excludes it
//! (actual syntax errors are the diagnostics synchronizer's concern).

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::base::Span;
use crate::diagnostics::{Diagnostic, sources};
use crate::engine::{DslEngine, EngineError};

/// Classification of one literal under re-encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stability {
    /// Survives the round trip unchanged.
    Perfect,
    /// Changes once; the changed form is stable.
    Stabilizes { normalized: String },
    /// Still changing after the extra pass.
    Unstable,
}

/// Classify a single notation string with at most two re-encoding passes.
pub fn classify(engine: &dyn DslEngine, notation: &str) -> Result<Stability, EngineError> {
    let once = engine.reencode(notation)?;
    if once == notation {
        return Ok(Stability::Perfect);
    }
    let twice = engine.reencode(&once)?;
    if twice == once {
        Ok(Stability::Stabilizes { normalized: once })
    } else {
        Ok(Stability::Unstable)
    }
}

/// Check every notation-looking literal in a document.
pub fn check_document(engine: &dyn DslEngine, text: &str) -> Vec<Diagnostic> {
    let mut findings = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let mut candidates = Vec::new();
        collect_quoted(line, &mut candidates);
        collect_notation_labeled(line, &mut candidates);

        // The same literal can be reached through both patterns; report
        // it once.
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        for candidate in candidates {
            if !seen.insert(candidate.column) || !looks_like_notation(&candidate.text) {
                continue;
            }
            let span = Span::from_coords(
                line_no as u32,
                candidate.column,
                line_no as u32,
                candidate.column + candidate.text.chars().count() as u32,
            );
            match classify(engine, &candidate.text) {
                Err(e) => {
                    trace!(literal = %candidate.text, error = %e, "literal excluded");
                }
                Ok(Stability::Perfect) => {}
                Ok(Stability::Stabilizes { normalized }) => {
                    let delta = normalized.chars().count() as i64
                        - candidate.text.chars().count() as i64;
                    let message = format!(
                        "Notation changes when re-encoded. Stabilizes to \"{normalized}\" \
                         (length delta {delta:+})."
                    );
                    findings.push(
                        Diagnostic::warning(span, sources::ROUND_TRIP, message)
                            .with_fix(normalized),
                    );
                }
                Ok(Stability::Unstable) => {
                    findings.push(Diagnostic::error(
                        span,
                        sources::ROUND_TRIP,
                        "Notation does not stabilize under re-encoding; \
                         please file a bug against the encoder.",
                    ));
                }
            }
        }
    }
    findings
}

/// Recover the normalized payload embedded in a stabilizing diagnostic's
/// message.
pub fn extract_stabilized(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("Stabilizes to \"")?;
    rest.split_once('"').map(|(payload, _)| payload)
}

struct Candidate {
    /// Character column of the literal's content.
    column: u32,
    text: String,
}

/// Collect single- and double-quoted literals on one line.
fn collect_quoted(line: &str, out: &mut Vec<Candidate>) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let quote = chars[i];
        if quote == '\'' || quote == '"' {
            if let Some(close) = chars[i + 1..].iter().position(|&c| c == quote) {
                out.push(Candidate {
                    column: (i + 1) as u32,
                    text: chars[i + 1..i + 1 + close].iter().collect(),
                });
                i += close + 2;
                continue;
            }
        }
        i += 1;
    }
}

/// Collect values labeled `notation: …` or `notation = …` on one line.
/// Quoted values surface at the same column as the quoted scan and get
/// deduplicated there; bare values run to the next delimiter.
fn collect_notation_labeled(line: &str, out: &mut Vec<Candidate>) {
    let chars: Vec<char> = line.chars().collect();
    for (idx, _) in line.match_indices("notation") {
        let start = line[..idx].chars().count();
        // Must be a standalone word.
        if start > 0 && crate::base::text_utils::is_word_character(chars[start - 1]) {
            continue;
        }
        let mut i = start + "notation".chars().count();
        if i < chars.len() && crate::base::text_utils::is_word_character(chars[i]) {
            continue;
        }
        i = crate::base::text_utils::skip_spaces(&chars, i);
        if chars.get(i) != Some(&':') && chars.get(i) != Some(&'=') {
            continue;
        }
        i = crate::base::text_utils::skip_spaces(&chars, i + 1);
        match chars.get(i) {
            Some(&quote) if quote == '\'' || quote == '"' => {
                if let Some(close) = chars[i + 1..].iter().position(|&c| c == quote) {
                    out.push(Candidate {
                        column: (i + 1) as u32,
                        text: chars[i + 1..i + 1 + close].iter().collect(),
                    });
                }
            }
            Some(_) => {
                let mut end = i;
                while end < chars.len()
                    && !chars[end].is_whitespace()
                    && !matches!(chars[end], ',' | ';' | ')' | '}')
                {
                    end += 1;
                }
                if end > i {
                    out.push(Candidate {
                        column: i as u32,
                        text: chars[i..end].iter().collect(),
                    });
                }
            }
            None => {}
        }
    }
}

/// Whether a string plausibly is a chemical notation: every character
/// from the notation alphabet, at least one structural character, and at
/// least one ring digit or bond symbol.
fn looks_like_notation(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(is_notation_char)
        && s.chars()
            .any(|c| matches!(c, '(' | ')' | '[' | ']') || c.is_ascii_uppercase())
        && s.chars()
            .any(|c| c.is_ascii_digit() || matches!(c, '=' | '#' | '/' | '\\'))
}

fn is_notation_char(c: char) -> bool {
    matches!(c,
        'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' | 'H'
        | 'b' | 'c' | 'n' | 'o' | 'p' | 's' | 'l' | 'r'
        | '0'..='9'
        | '(' | ')' | '[' | ']'
        | '=' | '#' | '-' | '+' | '/' | '\\' | '@' | '%')
}

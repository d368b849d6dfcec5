//! Shared test stubs for the collaborator traits.
//!
//! The stub DSL engine speaks a bracket dialect: `[name] = [C][O]` defines
//! `name` as the concatenation of the referenced tokens, where a token is
//! either an element symbol or another definition. Just enough behavior to
//! exercise the resolution, diagnostics, and round-trip paths.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::{
    Definition, DslEngine, EngineError, EngineNote, ExportValue, FragmentCodegen, LoadToken,
    ModuleExports, ParseOutcome, RenderOptions, ResolveOptions, ScriptError, ScriptHost,
    StructureRenderer,
};

const ELEMENTS: &[(&str, f64)] = &[
    ("Cl", 35.45),
    ("Br", 79.904),
    ("C", 12.011),
    ("N", 14.007),
    ("O", 15.999),
    ("H", 1.008),
    ("S", 32.06),
    ("P", 30.974),
    ("F", 18.998),
];

#[derive(Default)]
pub(crate) struct StubEngine {
    reencode_map: FxHashMap<String, String>,
    reencode_errors: FxHashSet<String>,
    strict_rejects: FxHashSet<SmolStr>,
    parse_failure: Option<String>,
}

impl StubEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every parse fail outright (total failure, not structured
    /// errors).
    pub(crate) fn with_parse_failure(mut self, message: &str) -> Self {
        self.parse_failure = Some(message.to_string());
        self
    }

    /// Make `from` re-encode to `to` instead of itself.
    pub(crate) fn with_reencode(mut self, from: &str, to: &str) -> Self {
        self.reencode_map.insert(from.to_string(), to.to_string());
        self
    }

    /// Make re-encoding `notation` fail.
    pub(crate) fn with_reencode_error(mut self, notation: &str) -> Self {
        self.reencode_errors.insert(notation.to_string());
        self
    }

    /// Make `name` fail resolution only under strict valence validation.
    pub(crate) fn with_strict_reject(mut self, name: &str) -> Self {
        self.strict_rejects.insert(SmolStr::new(name));
        self
    }

    fn expand(
        &self,
        parse: &ParseOutcome,
        name: &str,
        visiting: &mut FxHashSet<SmolStr>,
    ) -> Result<String, EngineError> {
        if !visiting.insert(SmolStr::new(name)) {
            return Err(EngineError::Resolve(format!("circular reference: [{name}]")));
        }
        let def = parse
            .definitions
            .get(name)
            .ok_or_else(|| EngineError::Resolve(format!("undefined reference: [{name}]")))?;
        let mut out = String::new();
        for token in &def.tokens {
            let inner = token.trim_start_matches('[').trim_end_matches(']');
            if parse.definitions.contains_key(inner) {
                out.push_str(&self.expand(parse, inner, visiting)?);
            } else if ELEMENTS.iter().any(|(sym, _)| *sym == inner) {
                out.push_str(inner);
            } else {
                return Err(EngineError::Resolve(format!(
                    "undefined reference: [{inner}]"
                )));
            }
        }
        visiting.remove(name);
        Ok(out)
    }
}

fn parse_definition_line(line: &str) -> Option<(SmolStr, Vec<SmolStr>)> {
    let rest = line.strip_prefix('[')?;
    let (name, rest) = rest.split_once(']')?;
    let rest = rest.trim_start().strip_prefix('=')?;
    let mut tokens = Vec::new();
    let mut rest = rest.trim();
    while !rest.is_empty() {
        let body = rest.strip_prefix('[')?;
        let (token, tail) = body.split_once(']')?;
        tokens.push(SmolStr::new(format!("[{token}]")));
        rest = tail.trim_start();
    }
    (!tokens.is_empty()).then(|| (SmolStr::new(name), tokens))
}

impl DslEngine for StubEngine {
    fn parse(&self, text: &str) -> Result<ParseOutcome, EngineError> {
        if let Some(message) = &self.parse_failure {
            return Err(EngineError::Parse(message.clone()));
        }
        let mut outcome = ParseOutcome::default();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx as u32 + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_definition_line(line) {
                Some((name, tokens)) => {
                    if outcome.definitions.contains_key(&name) {
                        outcome.errors.push(EngineNote {
                            line: line_no,
                            column: 1,
                            end_column: None,
                            category: SmolStr::new("redefinition"),
                            message: format!("duplicate definition of [{name}]"),
                        });
                    } else {
                        outcome.definitions.insert(
                            name.clone(),
                            Definition {
                                name,
                                source_line: line_no,
                                tokens,
                            },
                        );
                    }
                }
                None => outcome.errors.push(EngineNote {
                    line: line_no,
                    column: 1,
                    end_column: None,
                    category: SmolStr::new("syntax"),
                    message: format!("malformed definition: {line}"),
                }),
            }
        }
        Ok(outcome)
    }

    fn resolve(
        &self,
        parse: &ParseOutcome,
        name: &str,
        options: ResolveOptions,
    ) -> Result<String, EngineError> {
        if options.validate_valence && self.strict_rejects.contains(name) {
            return Err(EngineError::Resolve(format!(
                "valence check failed for [{name}]"
            )));
        }
        let mut visiting = FxHashSet::default();
        self.expand(parse, name, &mut visiting)
    }

    fn decode(&self, notation: &str) -> Result<String, EngineError> {
        if notation.contains('!') {
            return Err(EngineError::Encode(format!("cannot decode '{notation}'")));
        }
        Ok(format!("mol/{notation}"))
    }

    fn reencode(&self, notation: &str) -> Result<String, EngineError> {
        if self.reencode_errors.contains(notation) {
            return Err(EngineError::Encode(format!("unparsable '{notation}'")));
        }
        Ok(self
            .reencode_map
            .get(notation)
            .cloned()
            .unwrap_or_else(|| notation.to_string()))
    }

    fn molecular_weight(&self, notation: &str) -> Result<f64, EngineError> {
        let mut total = 0.0;
        let mut rest = notation;
        'outer: while let Some(c) = rest.chars().next() {
            for (sym, weight) in ELEMENTS {
                if rest.starts_with(sym)
                    || rest.starts_with(sym.to_ascii_lowercase().as_str())
                {
                    total += weight;
                    rest = &rest[sym.len()..];
                    continue 'outer;
                }
            }
            if c.is_ascii_digit() || matches!(c, '=' | '#' | '-' | '(' | ')') {
                rest = &rest[c.len_utf8()..];
                continue;
            }
            return Err(EngineError::Property(format!("unknown atom '{c}'")));
        }
        Ok(total)
    }

    fn formula(&self, notation: &str) -> Result<String, EngineError> {
        let mut counts: FxHashMap<&str, u32> = FxHashMap::default();
        let mut rest = notation;
        'outer: while let Some(c) = rest.chars().next() {
            for (sym, _) in ELEMENTS {
                if rest.starts_with(sym)
                    || rest.starts_with(sym.to_ascii_lowercase().as_str())
                {
                    *counts.entry(sym).or_default() += 1;
                    rest = &rest[sym.len()..];
                    continue 'outer;
                }
            }
            if c.is_ascii_digit() || matches!(c, '=' | '#' | '-' | '(' | ')') {
                rest = &rest[c.len_utf8()..];
                continue;
            }
            return Err(EngineError::Property(format!("unknown atom '{c}'")));
        }
        // Hill order: C, H, then alphabetical
        let mut symbols: Vec<&str> = counts.keys().copied().collect();
        symbols.sort_by_key(|s| match *s {
            "C" => (0, ""),
            "H" => (1, ""),
            other => (2, other),
        });
        let mut out = String::new();
        for sym in symbols {
            out.push_str(sym);
            let n = counts[sym];
            if n > 1 {
                out.push_str(&n.to_string());
            }
        }
        Ok(out)
    }
}

/// Executes build-format files by scanning for `export const NAME = …`
/// lines: `Fragment('X')` exports a fragment with codegen, `RawFragment('X')`
/// a fragment without codegen, anything else an opaque value. A line
/// containing `%%syntax-error%%` fails the whole load with a traced error.
#[derive(Default)]
pub(crate) struct StubHost {
    executions: Mutex<Vec<LoadToken>>,
}

impl StubHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn execution_count(&self) -> usize {
        self.executions.lock().len()
    }
}

impl ScriptHost for StubHost {
    fn execute(&self, path: &Path, token: LoadToken) -> Result<ModuleExports, ScriptError> {
        self.executions.lock().push(token);
        let text = std::fs::read_to_string(path)?;
        if text.contains("%%syntax-error%%") {
            return Err(ScriptError::execution_with_trace(
                "unexpected token '%'",
                format!("SyntaxError\n    at {}:2:5", path.display()),
            ));
        }
        let mut exports = ModuleExports::new();
        for line in text.lines() {
            let Some(rest) = line.trim().strip_prefix("export const ") else {
                continue;
            };
            let Some((name, rhs)) = rest.split_once('=') else {
                continue;
            };
            let (name, rhs) = (name.trim(), rhs.trim());
            let value = if let Some(notation) = unwrap_call(rhs, "Fragment") {
                ExportValue::fragment(notation.clone()).with_codegen(Arc::new(StubCodegen {
                    notation,
                }))
            } else if let Some(notation) = unwrap_call(rhs, "RawFragment") {
                ExportValue::fragment(notation)
            } else {
                ExportValue::opaque()
            };
            exports.insert(SmolStr::new(name), value);
        }
        Ok(exports)
    }
}

fn unwrap_call(rhs: &str, callee: &str) -> Option<String> {
    rhs.strip_prefix(callee)?
        .strip_prefix("('")?
        .split_once("')")
        .map(|(notation, _)| notation.to_string())
}

struct StubCodegen {
    notation: String,
}

impl FragmentCodegen for StubCodegen {
    fn generate(&self, name: &str) -> Result<String, ScriptError> {
        if self.notation.contains('!') {
            return Err(ScriptError::execution("structure too complex"));
        }
        Ok(format!(
            "const {name}Explicit = Fragment('{}')",
            self.notation
        ))
    }
}

pub(crate) struct StubRenderer;

impl StructureRenderer for StubRenderer {
    fn render(&self, notation: &str, options: &RenderOptions) -> Result<String, EngineError> {
        if !self.is_valid(notation) {
            return Err(EngineError::Render(notation.to_string()));
        }
        Ok(format!(
            "structure[{}x{}] {notation}",
            options.width, options.height
        ))
    }

    fn is_valid(&self, notation: &str) -> bool {
        !notation.is_empty() && !notation.contains('!')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_parse_and_resolve() {
        let engine = StubEngine::new();
        let parse = engine.parse("[a] = [C]\n[b] = [a][a]").unwrap();
        assert_eq!(parse.definitions.len(), 2);
        let notation = engine
            .resolve(&parse, "b", ResolveOptions::default())
            .unwrap();
        assert_eq!(notation, "CC");
    }

    #[test]
    fn test_stub_duplicate_definition_note() {
        let engine = StubEngine::new();
        let parse = engine.parse("[a] = [C]\n[b] = [a][a]\n[a] = [N]").unwrap();
        assert_eq!(parse.errors.len(), 1);
        assert_eq!(parse.errors[0].line, 3);
        assert_eq!(parse.errors[0].column, 1);
        assert_eq!(parse.errors[0].category, "redefinition");
    }

    #[test]
    fn test_stub_circular_resolution() {
        let engine = StubEngine::new();
        let parse = engine.parse("[a] = [b]\n[b] = [a]").unwrap();
        let err = engine
            .resolve(&parse, "a", ResolveOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    #[test]
    fn test_stub_weight_and_formula() {
        let engine = StubEngine::new();
        let weight = engine.molecular_weight("CCO").unwrap();
        assert!((weight - 40.021).abs() < 1e-9);
        assert_eq!(engine.formula("CCO").unwrap(), "C2O");
        assert_eq!(engine.formula("c1ccccc1").unwrap(), "C6");
    }
}

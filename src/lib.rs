//! # fraglive-base
//!
//! Core library for live molecular fragment resolution, diagnostics
//! conversion, and editor synchronization.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide         → Session facade: event dispatch, user actions
//!   ↓
//! tracker     → Cursor state machine, ResolvedLine stream
//! diagnostics → Full-set recompute, severity mapping, static lints
//! roundtrip   → Notation round-trip stability checks
//! refactor    → Fragment-to-constructor-code rewriting
//!   ↓
//! resolve     → Resolution pipeline, single-slot module cache
//!   ↓
//! engine      → External collaborator contracts (DSL engine, renderer,
//!               script host)
//!   ↓
//! base        → Primitives (Document, FileKind, Position/Span, text utils)
//! ```

// ============================================================================
// MODULES (dependency order: base → engine → resolve → features → ide)
// ============================================================================

/// Foundation types: Document, DocumentStore, FileKind, Position, Span
pub mod base;

/// External collaborator contracts: DSL engine, renderer, script host
pub mod engine;

/// Resolution pipeline and build-format module cache
pub mod resolve;

/// Cursor tracking and the ResolvedLine change stream
pub mod tracker;

/// Diagnostic types, severity mapping, synchronizer, static lints
pub mod diagnostics;

/// Round-trip stability checking of embedded notation literals
pub mod roundtrip;

/// Refactor generator: fragment exports to explicit constructor code
pub mod refactor;

/// Session facade: event dispatch and user-invocable actions
pub mod ide;

// Re-export foundation types
pub use base::{Document, DocumentStore, FileKind, Position, Revision, Span};
pub use resolve::ResolvedLine;

//! Foundation types for the fraglive core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Document`], [`DocumentStore`] - Editor document mirror
//! - [`FileKind`] - Supported file classifications
//! - [`Revision`] - Opaque per-edit document marker
//! - [`Position`], [`Span`] - 0-based editor positions, with conversion
//!   from the 1-based coordinates reported by the chemistry engine
//! - Text scanning helpers for declaration and import patterns
//!
//! This module has NO dependencies on other fraglive modules.

mod document;
mod position;
pub mod text_utils;

pub use document::{Document, DocumentStore, FileKind, Revision};
pub use position::{Position, Span};

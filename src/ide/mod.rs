//! Session facade — High-level API for editor integration.
//!
//! This module provides the interface between the core components and the
//! editor extension host. All editor events funnel through
//! [`Session::dispatch`]; the three user actions (show structure, toggle
//! panel, refactor-to-code) are methods on the session.
//!
//! ## Design Principles
//!
//! 1. **Single dispatcher**: one entry point per event, no scattered
//!    listeners
//! 2. **No editor types**: the editor adapter converts at its boundary
//! 3. **Everything observable**: the resolved-line stream and the
//!    diagnostic store are the only outputs
//!
//! ## Usage
//!
//! ```ignore
//! use fraglive::ide::Session;
//!
//! let mut session = Session::new(engine, host, renderer);
//! session.subscribe(|resolved| ui.show(resolved));
//! session.dispatch(EditorEvent::DocumentOpened { path, text });
//! ```

mod session;

pub use session::{Session, SessionError};

//! Bookshelf application library.
//!
//! Wires the books module, the SQLite store, and the Classify client into an
//! HTTP router.

pub mod app;
pub mod modules;

pub use app::{build_app, build_registry, migrate, serve};

//! Core traits, settings, and module registry for Bookshelf.

pub mod module;
pub mod probe;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use probe::HealthProbe;
pub use registry::ModuleRegistry;

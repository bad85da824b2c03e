//! SQLite-backed book store.

pub mod error;
pub mod models;
pub mod store;

pub use error::StoreError;
pub use models::{Book, NewBook};
pub use store::{BookStore, SqliteBookStore};

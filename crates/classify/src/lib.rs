//! Thin client for the OCLC Classify API.
//!
//! [`ClassifyClient`] builds query URLs and performs a single GET per call;
//! the [`decode`] module turns the XML payload into typed records.

pub mod client;
pub mod decode;
pub mod error;
pub mod models;

pub use client::ClassifyClient;
pub use error::ClassifyError;
pub use models::{ClassificationLookup, SearchResult};

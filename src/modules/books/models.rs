use bookshelf_classify::ClassificationLookup;
use bookshelf_db::{Book, NewBook};
use serde::Deserialize;

/// Greeting used when `/` is requested without a `name`.
pub const DEFAULT_NAME: &str = "Gopher";

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddBookParams {
    /// Work identifier (owi) to look up and store
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteBookParams {
    pub pk: Option<String>,
}

/// View model for the index page, built fresh per request.
#[derive(Debug, Clone)]
pub struct IndexPage {
    pub name: String,
    pub db_status: bool,
    pub books: Vec<Book>,
}

/// Row values for a looked-up work.
pub fn new_book(lookup: ClassificationLookup) -> NewBook {
    NewBook {
        title: lookup.title,
        author: lookup.author,
        id: lookup.id,
        classification: lookup.classification,
    }
}

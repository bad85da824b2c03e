use serde::{Deserialize, Serialize};

/// A persisted book row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned primary key
    #[serde(rename = "PK")]
    pub pk: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: String,
    /// Work identifier (owi) in the external catalog
    #[serde(rename = "ID")]
    pub id: String,
    /// Dewey classification code
    #[serde(rename = "Classification")]
    pub classification: String,
}

/// Values for a row that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub id: String,
    pub classification: String,
}

impl NewBook {
    pub(crate) fn into_book(self, pk: i64) -> Book {
        Book {
            pk,
            title: self.title,
            author: self.author,
            id: self.id,
            classification: self.classification,
        }
    }
}

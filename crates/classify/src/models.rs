use serde::{Deserialize, Serialize};

/// One work matched by a title search.
///
/// Deserialized from the attributes of a `works>work` element and serialized
/// with the field names the front end expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename(serialize = "Title", deserialize = "@title"), default)]
    pub title: String,
    #[serde(rename(serialize = "Author", deserialize = "@author"), default)]
    pub author: String,
    #[serde(rename(serialize = "Year", deserialize = "@hyr"), default)]
    pub year: String,
    #[serde(rename(serialize = "ID", deserialize = "@owi"), default)]
    pub id: String,
}

/// A single work together with its most popular Dewey classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationLookup {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Classification")]
    pub classification: String,
}

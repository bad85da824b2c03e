//! XML payload decoding. Pure functions, no I/O.

use serde::Deserialize;

use crate::error::ClassifyError;
use crate::models::{ClassificationLookup, SearchResult};

/// No input was supplied.
pub const CODE_NO_INPUT: u16 = 100;
/// The input could not be interpreted.
pub const CODE_INVALID_INPUT: u16 = 101;
/// The query matched nothing.
pub const CODE_NOT_FOUND: u16 = 102;
/// Server side failure at OCLC.
pub const CODE_UNEXPECTED_ERROR: u16 = 200;

#[derive(Debug, Default, Deserialize)]
struct ClassifyDocument {
    #[serde(default)]
    response: Option<ResponseStatus>,
    #[serde(default)]
    works: Option<WorkList>,
    #[serde(default)]
    work: Option<SearchResult>,
    #[serde(default)]
    recommendations: Option<Recommendations>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseStatus {
    #[serde(rename = "@code", default)]
    code: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkList {
    #[serde(default)]
    work: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct Recommendations {
    #[serde(default)]
    ddc: Option<Ddc>,
}

#[derive(Debug, Default, Deserialize)]
struct Ddc {
    #[serde(rename = "mostPopular", default)]
    most_popular: Vec<MostPopular>,
}

#[derive(Debug, Default, Deserialize)]
struct MostPopular {
    #[serde(rename = "@sfa", default)]
    sfa: String,
}

impl ClassifyDocument {
    fn parse(body: &[u8]) -> Result<Self, ClassifyError> {
        let document: ClassifyDocument = quick_xml::de::from_reader(body)?;
        Ok(document)
    }

    fn code(&self) -> Option<u16> {
        self.response.as_ref().and_then(|response| response.code)
    }

    fn reject_failures(&self) -> Result<(), ClassifyError> {
        match self.code() {
            Some(code @ (CODE_NO_INPUT | CODE_INVALID_INPUT | CODE_UNEXPECTED_ERROR)) => {
                Err(ClassifyError::Rejected { code })
            }
            _ => Ok(()),
        }
    }
}

/// Decode a title search response into its `works>work` entries.
///
/// A response without a `works` element (including "no results", code 102)
/// yields an empty list.
pub fn decode_search(body: &[u8]) -> Result<Vec<SearchResult>, ClassifyError> {
    let document = ClassifyDocument::parse(body)?;
    document.reject_failures()?;

    Ok(document.works.map(|works| works.work).unwrap_or_default())
}

/// Decode a single-work lookup response.
///
/// `owi` is the identifier that was asked for; it is reported back in
/// [`ClassifyError::NotFound`] when the response carries no work.
pub fn decode_lookup(owi: &str, body: &[u8]) -> Result<ClassificationLookup, ClassifyError> {
    let document = ClassifyDocument::parse(body)?;
    document.reject_failures()?;

    let not_found = || ClassifyError::NotFound {
        owi: owi.to_string(),
    };

    if document.code() == Some(CODE_NOT_FOUND) {
        return Err(not_found());
    }

    let work = document
        .work
        .filter(|work| !work.id.is_empty())
        .ok_or_else(not_found)?;

    let classification = document
        .recommendations
        .and_then(|recommendations| recommendations.ddc)
        .and_then(|ddc| ddc.most_popular.into_iter().next())
        .map(|most_popular| most_popular.sfa)
        .unwrap_or_default();

    Ok(ClassificationLookup {
        id: work.id,
        title: work.title,
        author: work.author,
        classification,
    })
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("invalid classify base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("classify request failed")]
    Transport(#[from] reqwest::Error),

    #[error("malformed classify response")]
    Decode(#[from] quick_xml::de::DeError),

    #[error("no work found for owi '{owi}'")]
    NotFound { owi: String },

    #[error("classify service rejected the request with response code {code}")]
    Rejected { code: u16 },
}

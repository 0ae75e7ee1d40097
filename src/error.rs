use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Refusing to touch {}, it is not readable: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No client found for: '{key}'")]
    NotFound { key: String },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invoice needs a title")]
    MissingTitle,

    #[error("Invoice needs a client name")]
    MissingRecipient,

    #[error("Quantity must be positive for: '{description}'")]
    Quantity { description: String },

    #[error("Rate must not be negative for: '{description}'")]
    Rate { description: String },

    #[error("Not a valid date: '{raw}', expected YYYY-MM-DD")]
    Date { raw: String },

    #[error("Too many fields in item: '{raw}'")]
    ItemFields { raw: String },

    #[error("Not a number in item: '{raw}'")]
    ItemNumber { raw: String },

    #[error("Invoice data is not valid: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Could not produce the document: {source}")]
    Pdf {
        #[from]
        source: printpdf::Error,
    },
}

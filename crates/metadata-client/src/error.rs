use thiserror::Error;

/// Errors that can occur when talking to the metadata service
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request for {resource} failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Metadata service returned status {status} for {resource}")]
    UnexpectedStatus { resource: String, status: u16 },

    #[error("Invalid response for {resource}: {reason}")]
    InvalidResponse { resource: String, reason: String },

    /// A discover filter named a language missing from the language table
    #[error("Language '{0}' not found")]
    UnknownLanguage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;

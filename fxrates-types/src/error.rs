//! Error types for each stage of the rate pipeline.

/// Request construction errors.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Fetch-stage errors (network faults).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream returned status {code}")]
    UpstreamStatus { code: u16 },

    #[error("Failed to read response body: {0}")]
    Read(String),
}

/// Decode-stage errors (format faults).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed SDMX document: {0}")]
    MalformedDocument(String),

    #[error("Malformed observation {raw:?}: {reason}")]
    MalformedObservation { raw: String, reason: String },
}

/// Store-stage errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Query error: {0}")]
    Query(String),
}

/// Errors raised by a [`RateSource`](crate::ports::RateSource) while producing observations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors surfaced by a full ingest or query run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RequestError> for IngestError {
    fn from(err: RequestError) -> Self {
        IngestError::Source(SourceError::Request(err))
    }
}

impl From<FetchError> for IngestError {
    fn from(err: FetchError) -> Self {
        IngestError::Source(SourceError::Fetch(err))
    }
}

impl From<DecodeError> for IngestError {
    fn from(err: DecodeError) -> Self {
        IngestError::Source(SourceError::Decode(err))
    }
}

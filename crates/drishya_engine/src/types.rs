use drishya_core::{ConnectionState, CrudRequest, RecordQuery, RecordSet, StatusUpdateEvent};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("not signed in or session expired")]
    Unauthorized,
    #[error("http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("could not open live connection: {0}")]
    Connect(String),
    #[error("live connection failed: {0}")]
    Receive(String),
}

/// Reports sent from the engine thread to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RecordsLoaded {
        query: RecordQuery,
        records: RecordSet,
    },
    RecordsFailed {
        query: RecordQuery,
        error: ApiError,
    },
    CrudFinished {
        request: CrudRequest,
        result: Result<(), ApiError>,
    },
    StatusUpdate(StatusUpdateEvent),
    ConnectionChanged(ConnectionState),
}

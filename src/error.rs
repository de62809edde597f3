use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("invalid gene symbol: {0:?}")]
    #[diagnostic(help("expected a letter followed by 1-15 letters or digits, e.g. EGFR or HER2"))]
    InvalidGeneSymbol(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid disease identifier: {0:?}")]
    #[diagnostic(help("expected an ontology id such as EFO_0000311 or MONDO:0004992"))]
    InvalidDiseaseId(String),

    #[error("gene {0} could not be resolved to an Ensembl gene identifier")]
    GeneNotFound(String),

    #[error("{provider} request failed: {message}")]
    UpstreamHttp {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned status {status}: {message}")]
    UpstreamStatus {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned an unexpected payload: {message}")]
    UpstreamPayload {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} needs the {id_kind} which could not be resolved")]
    MissingCrossReference {
        provider: &'static str,
        id_kind: &'static str,
    },

    #[error("{provider} timed out after {timeout_ms} ms")]
    SourceTimeout {
        provider: &'static str,
        timeout_ms: u64,
    },

    #[error("analysis failed: {0}")]
    AggregateFailure(String),

    #[error("failed to start async runtime: {0}")]
    Runtime(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}

/// Caller-facing classification, mirrors the 4xx/5xx split of an HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    UpstreamFailure,
    Internal,
}

impl KiraError {
    pub fn class(&self) -> ErrorClass {
        match self {
            KiraError::InvalidGeneSymbol(_)
            | KiraError::InvalidInput(_)
            | KiraError::InvalidDiseaseId(_)
            | KiraError::ConfigRead(_)
            | KiraError::ConfigParse(_) => ErrorClass::BadRequest,
            KiraError::GeneNotFound(_) => ErrorClass::NotFound,
            KiraError::UpstreamHttp { .. }
            | KiraError::UpstreamStatus { .. }
            | KiraError::UpstreamPayload { .. }
            | KiraError::MissingCrossReference { .. }
            | KiraError::SourceTimeout { .. } => ErrorClass::UpstreamFailure,
            KiraError::AggregateFailure(_) | KiraError::Runtime(_) => ErrorClass::Internal,
        }
    }
}

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::domain::{GeneSymbol, SourceKind};
use crate::error::KiraError;

/// What one adapter is asked for. `genomics_id` is the resolved Ensembl gene
/// id, absent when the lookup did not settle on one.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    pub gene: GeneSymbol,
    pub genomics_id: Option<String>,
}

impl SourceRequest {
    pub fn new(gene: GeneSymbol) -> Self {
        Self {
            gene,
            genomics_id: None,
        }
    }

    pub fn with_genomics_id(mut self, id: Option<String>) -> Self {
        self.genomics_id = id;
        self
    }

    pub fn require_genomics_id(&self, provider: &'static str) -> Result<&str, KiraError> {
        self.genomics_id
            .as_deref()
            .ok_or(KiraError::MissingCrossReference {
                provider,
                id_kind: "Ensembl gene id",
            })
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

/// Uniform adapter contract. Implementations block; the orchestrator owns
/// scheduling and timeouts.
pub trait SourceClient<T>: Send + Sync {
    fn fetch(&self, request: &SourceRequest) -> Result<T, KiraError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Success(T),
    Failure(String),
}

/// Envelope produced once per fetch attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResult<T> {
    kind: SourceKind,
    timestamp: DateTime<Utc>,
    cached: bool,
    response_time_ms: u64,
    outcome: SourceOutcome<T>,
}

impl<T> SourceResult<T> {
    pub fn success(kind: SourceKind, data: T, elapsed: Duration) -> Self {
        Self::new(kind, SourceOutcome::Success(data), elapsed)
    }

    pub fn failure(kind: SourceKind, error: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(kind, SourceOutcome::Failure(error.into()), elapsed)
    }

    pub fn from_result(kind: SourceKind, result: Result<T, KiraError>, elapsed: Duration) -> Self {
        match result {
            Ok(data) => Self::success(kind, data, elapsed),
            Err(err) => Self::failure(kind, err.to_string(), elapsed),
        }
    }

    fn new(kind: SourceKind, outcome: SourceOutcome<T>, elapsed: Duration) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            cached: false,
            response_time_ms: duration_ms(elapsed),
            outcome,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn source(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn cached(&self) -> bool {
        self.cached
    }

    pub fn response_time_ms(&self) -> u64 {
        self.response_time_ms
    }

    pub fn outcome(&self) -> &SourceOutcome<T> {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            SourceOutcome::Success(data) => Some(data),
            SourceOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            SourceOutcome::Success(_) => None,
            SourceOutcome::Failure(message) => Some(message),
        }
    }
}

#[derive(Serialize)]
struct SourceResultWire<'a, T> {
    success: bool,
    data: Option<&'a T>,
    error: Option<&'a str>,
    source: &'static str,
    timestamp: &'a DateTime<Utc>,
    cached: bool,
    response_time_ms: u64,
}

impl<T: Serialize> Serialize for SourceResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SourceResultWire {
            success: self.is_success(),
            data: self.data(),
            error: self.error(),
            source: self.source(),
            timestamp: &self.timestamp,
            cached: self.cached,
            response_time_ms: self.response_time_ms,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_has_data_and_no_error() {
        let result = SourceResult::success(SourceKind::Pubmed, 42u64, Duration::from_millis(12));
        assert!(result.is_success());
        assert_eq!(result.data(), Some(&42));
        assert_eq!(result.error(), None);
        assert_eq!(result.source(), "PubMed");
        assert_eq!(result.response_time_ms(), 12);
    }

    #[test]
    fn failure_envelope_serializes_null_data() {
        let result: SourceResult<u64> = SourceResult::from_result(
            SourceKind::Chembl,
            Err(KiraError::SourceTimeout {
                provider: "ChEMBL",
                timeout_ms: 50,
            }),
            Duration::from_millis(50),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert_eq!(json["error"], "ChEMBL timed out after 50 ms");
        assert_eq!(json["source"], "ChEMBL");
        assert_eq!(json["cached"], false);
    }

    #[test]
    fn duration_ms_saturates() {
        assert_eq!(duration_ms(Duration::from_millis(1_250)), 1_250);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn genomics_id_requirement() {
        let gene = "EGFR".parse().unwrap();
        let request = SourceRequest::new(gene);
        assert!(request.require_genomics_id("Open Targets").is_err());
        let request = request.with_genomics_id(Some("ENSG00000146648".to_string()));
        assert_eq!(
            request.require_genomics_id("Open Targets").unwrap(),
            "ENSG00000146648"
        );
    }
}

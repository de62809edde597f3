use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::KiraError;
use crate::source::{SourceClient, SourceRequest};
use crate::sources::http::{HttpSource, count_field};

const STUDIES_URL: &str = "https://clinicaltrials.gov/api/v2/studies";
const PAGE_SIZE: &str = "200";

const ACTIVE_STATUSES: &[&str] = &[
    "RECRUITING",
    "ACTIVE_NOT_RECRUITING",
    "ENROLLING_BY_INVITATION",
    "NOT_YET_RECRUITING",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrialsSummary {
    pub total_trials: u64,
    pub active_trials: u64,
    pub max_phase: u8,
    /// Studies inspected for status and phase; may be fewer than the total.
    pub sampled: u64,
}

#[derive(Clone)]
pub struct ClinicalTrialsHttpClient {
    http: HttpSource,
}

impl ClinicalTrialsHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        Ok(Self {
            http: HttpSource::new("ClinicalTrials.gov", timeout)?,
        })
    }
}

impl SourceClient<TrialsSummary> for ClinicalTrialsHttpClient {
    fn fetch(&self, request: &SourceRequest) -> Result<TrialsSummary, KiraError> {
        let raw = self.http.get_json(|| {
            self.http.client().get(STUDIES_URL).query(&[
                ("query.intr", request.gene.as_str()),
                ("countTotal", "true"),
                ("pageSize", PAGE_SIZE),
                ("fields", "NCTId,OverallStatus,Phase"),
            ])
        })?;
        Ok(summarize_studies(&raw))
    }
}

pub fn summarize_studies(raw: &Value) -> TrialsSummary {
    let studies = raw
        .get("studies")
        .and_then(|value| value.as_array())
        .cloned()
        .unwrap_or_default();
    let mut active_trials = 0;
    let mut max_phase = 0;
    for study in &studies {
        let protocol = study.get("protocolSection");
        let status = protocol
            .and_then(|p| p.get("statusModule"))
            .and_then(|m| m.get("overallStatus"))
            .and_then(|s| s.as_str())
            .unwrap_or_default();
        if ACTIVE_STATUSES.contains(&status) {
            active_trials += 1;
        }
        let phases = protocol
            .and_then(|p| p.get("designModule"))
            .and_then(|m| m.get("phases"))
            .and_then(|p| p.as_array());
        for phase in phases.into_iter().flatten() {
            if let Some(level) = phase.as_str().and_then(phase_level) {
                max_phase = max_phase.max(level);
            }
        }
    }
    let sampled = studies.len() as u64;
    TrialsSummary {
        total_trials: count_field(raw.get("totalCount")).unwrap_or(sampled),
        active_trials,
        max_phase,
        sampled,
    }
}

fn phase_level(phase: &str) -> Option<u8> {
    match phase {
        "EARLY_PHASE1" | "PHASE1" => Some(1),
        "PHASE2" => Some(2),
        "PHASE3" => Some(3),
        "PHASE4" => Some(4),
        _ => None,
    }
}

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::KiraError;
use crate::source::{SourceClient, SourceRequest};
use crate::sources::http::{HttpSource, count_field};

const ENCODE_SEARCH_URL: &str = "https://www.encodeproject.org/search/";
const ENSEMBL_OVERLAP_URL: &str = "https://rest.ensembl.org/overlap/id";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegulatorySummary {
    /// Released ENCODE functional-genomics experiments targeting the gene product.
    pub experiment_count: u64,
    /// Ensembl Regulatory Build features overlapping the gene locus.
    pub regulatory_feature_count: u64,
}

#[derive(Clone)]
pub struct EncodeHttpClient {
    http: HttpSource,
}

impl EncodeHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        Ok(Self {
            http: HttpSource::new("ENCODE", timeout)?,
        })
    }
}

impl SourceClient<RegulatorySummary> for EncodeHttpClient {
    fn fetch(&self, request: &SourceRequest) -> Result<RegulatorySummary, KiraError> {
        let ensembl_id = request.require_genomics_id(self.http.provider())?;

        let experiments = self.http.get_json(|| {
            self.http.client().get(ENCODE_SEARCH_URL).query(&[
                ("type", "Experiment"),
                ("target.label", request.gene.as_str()),
                ("status", "released"),
                ("format", "json"),
                ("limit", "0"),
            ])
        });
        // ENCODE answers a search with no hits as 404 with a JSON body.
        let experiment_count = match experiments {
            Ok(raw) => extract_experiment_count(&raw),
            Err(KiraError::UpstreamStatus { status: 404, .. }) => 0,
            Err(err) => return Err(err),
        };

        let overlap_url = format!("{ENSEMBL_OVERLAP_URL}/{ensembl_id}");
        let features = self.http.get_json(|| {
            self.http
                .client()
                .get(&overlap_url)
                .query(&[("feature", "regulatory"), ("content-type", "application/json")])
        })?;
        let regulatory_feature_count = extract_feature_count(&features)
            .ok_or_else(|| self.http.payload_error("expected a feature array"))?;

        Ok(RegulatorySummary {
            experiment_count,
            regulatory_feature_count,
        })
    }
}

pub fn extract_experiment_count(raw: &Value) -> u64 {
    count_field(raw.get("total")).unwrap_or(0)
}

pub fn extract_feature_count(raw: &Value) -> Option<u64> {
    raw.as_array().map(|features| features.len() as u64)
}

use std::time::Duration;

use chrono::{Months, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::KiraError;
use crate::source::{SourceClient, SourceRequest};
use crate::sources::http::{HttpSource, count_field};

const SEARCH_URL: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest/search";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreprintSummary {
    pub total_preprints: u64,
    pub recent_preprints: u64,
}

/// bioRxiv/medRxiv coverage through the Europe PMC preprint index (`SRC:PPR`).
#[derive(Clone)]
pub struct PreprintsHttpClient {
    http: HttpSource,
}

impl PreprintsHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        Ok(Self {
            http: HttpSource::new("Europe PMC Preprints", timeout)?,
        })
    }

    fn hit_count(&self, query: &str) -> Result<u64, KiraError> {
        let raw = self.http.get_json(|| {
            self.http.client().get(SEARCH_URL).query(&[
                ("query", query),
                ("format", "json"),
                ("pageSize", "1"),
                ("resultType", "idlist"),
            ])
        })?;
        extract_hit_count(&raw).ok_or_else(|| self.http.payload_error("missing hitCount"))
    }
}

impl SourceClient<PreprintSummary> for PreprintsHttpClient {
    fn fetch(&self, request: &SourceRequest) -> Result<PreprintSummary, KiraError> {
        let today = Utc::now().date_naive();
        let total_preprints = self.hit_count(&preprint_query(request.gene.as_str(), None))?;
        let recent_preprints =
            self.hit_count(&preprint_query(request.gene.as_str(), Some(today)))?;
        Ok(PreprintSummary {
            total_preprints,
            recent_preprints,
        })
    }
}

/// With `recent_as_of`, restricts to the twelve months before that date.
pub fn preprint_query(gene: &str, recent_as_of: Option<NaiveDate>) -> String {
    let base = format!("\"{gene}\" AND SRC:PPR");
    match recent_as_of.and_then(|date| date.checked_sub_months(Months::new(12))) {
        Some(since) => format!(
            "{base} AND FIRST_PDATE:[{} TO {}]",
            since.format("%Y-%m-%d"),
            recent_as_of.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        ),
        None => base,
    }
}

pub fn extract_hit_count(raw: &Value) -> Option<u64> {
    count_field(raw.get("hitCount"))
}

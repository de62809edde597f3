use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::KiraError;
use crate::source::{SourceClient, SourceRequest};
use crate::sources::http::{HttpSource, count_field};

const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const RECENT_WINDOW_DAYS: &str = "1825";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LiteratureSummary {
    pub total_publications: u64,
    pub recent_publications: u64,
}

#[derive(Clone)]
pub struct PubmedHttpClient {
    http: HttpSource,
    api_key: Option<String>,
}

impl PubmedHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        let api_key = std::env::var("NCBI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Ok(Self {
            http: HttpSource::new("PubMed", timeout)?,
            api_key,
        })
    }

    fn count(&self, term: &str, reldate: Option<&str>) -> Result<u64, KiraError> {
        let raw = self.http.get_json(|| {
            let mut req = self.http.client().get(ESEARCH_URL).query(&[
                ("db", "pubmed"),
                ("term", term),
                ("retmode", "json"),
                ("retmax", "0"),
            ]);
            if let Some(days) = reldate {
                req = req.query(&[("datetype", "pdat"), ("reldate", days)]);
            }
            if let Some(key) = &self.api_key {
                req = req.query(&[("api_key", key.as_str())]);
            }
            req
        })?;
        extract_count(&raw).ok_or_else(|| self.http.payload_error("missing esearchresult.count"))
    }
}

impl SourceClient<LiteratureSummary> for PubmedHttpClient {
    fn fetch(&self, request: &SourceRequest) -> Result<LiteratureSummary, KiraError> {
        let term = search_term(request.gene.as_str());
        let total_publications = self.count(&term, None)?;
        let recent_publications = self.count(&term, Some(RECENT_WINDOW_DAYS))?;
        Ok(LiteratureSummary {
            total_publications,
            recent_publications,
        })
    }
}

pub fn search_term(gene: &str) -> String {
    format!("{gene}[tiab] AND humans[mh]")
}

pub fn extract_count(raw: &Value) -> Option<u64> {
    if raw
        .get("esearchresult")
        .and_then(|result| result.get("ERROR"))
        .is_some()
    {
        return None;
    }
    count_field(raw.get("esearchresult").and_then(|result| result.get("count")))
}

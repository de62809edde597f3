use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::KiraError;
use crate::source::{SourceClient, SourceRequest};
use crate::sources::http::{HttpSource, count_field};

const SEARCH_URL: &str = "https://search.rcsb.org/rcsbsearch/v2/query";
const SAMPLED_ENTRIES: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureSummary {
    pub structure_count: u64,
    pub best_resolution: Option<f64>,
    /// Among sampled entries, those carrying at least one non-polymer entity.
    pub ligand_bound_count: u64,
    pub sampled_entries: Vec<EntrySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub pdb_id: String,
    pub title: Option<String>,
    pub experimental_method: Option<String>,
    pub resolution: Option<f64>,
    pub ligand_bound: bool,
}

#[derive(Clone)]
pub struct RcsbHttpClient {
    http: HttpSource,
}

impl RcsbHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        Ok(Self {
            http: HttpSource::new("RCSB PDB", timeout)?,
        })
    }

    fn metadata_url(pdb_id: &str) -> String {
        format!("https://data.rcsb.org/rest/v1/core/entry/{pdb_id}")
    }

    fn search(&self, gene: &str) -> Result<(u64, Vec<String>), KiraError> {
        let body = search_body(gene, SAMPLED_ENTRIES);
        let response = self
            .http
            .send_with_retries(|| self.http.client().post(SEARCH_URL).json(&body))?;
        // The search service answers an empty hit list with 204 and no body.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok((0, Vec::new()));
        }
        let raw: Value = self
            .http
            .handle_status(response)?
            .json()
            .map_err(|err| self.http.payload_error(err.to_string()))?;
        Ok(extract_search_hits(&raw))
    }

    fn fetch_entry(&self, pdb_id: &str) -> Result<EntrySummary, KiraError> {
        let url = Self::metadata_url(pdb_id);
        let raw = self.http.get_json(|| self.http.client().get(&url))?;
        Ok(extract_entry(pdb_id, &raw))
    }
}

impl SourceClient<StructureSummary> for RcsbHttpClient {
    fn fetch(&self, request: &SourceRequest) -> Result<StructureSummary, KiraError> {
        let (structure_count, ids) = self.search(request.gene.as_str())?;
        let mut sampled_entries = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.fetch_entry(id) {
                Ok(entry) => sampled_entries.push(entry),
                Err(err) => {
                    tracing::debug!(pdb_id = %id, error = %err, "skipping entry metadata");
                }
            }
        }
        Ok(summarize_entries(structure_count, sampled_entries))
    }
}

pub fn search_body(gene: &str, rows: usize) -> Value {
    json!({
        "query": {
            "type": "group",
            "logical_operator": "and",
            "nodes": [
                {
                    "type": "terminal",
                    "service": "text",
                    "parameters": {
                        "attribute": "rcsb_entity_source_organism.rcsb_gene_name.value",
                        "operator": "exact_match",
                        "value": gene
                    }
                },
                {
                    "type": "terminal",
                    "service": "text",
                    "parameters": {
                        "attribute": "rcsb_entity_source_organism.ncbi_scientific_name",
                        "operator": "exact_match",
                        "value": "Homo sapiens"
                    }
                }
            ]
        },
        "return_type": "entry",
        "request_options": {
            "paginate": { "start": 0, "rows": rows },
            "sort": [{ "sort_by": "rcsb_entry_info.resolution_combined", "direction": "asc" }]
        }
    })
}

pub fn extract_search_hits(raw: &Value) -> (u64, Vec<String>) {
    let ids = raw
        .get("result_set")
        .and_then(|value| value.as_array())
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.get("identifier").and_then(|v| v.as_str()))
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let total = count_field(raw.get("total_count")).unwrap_or(ids.len() as u64);
    (total, ids)
}

pub fn extract_entry(pdb_id: &str, raw: &Value) -> EntrySummary {
    let title = raw
        .get("struct")
        .and_then(|value| value.get("title"))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string());
    let experimental_method = raw
        .get("exptl")
        .and_then(|value| value.as_array())
        .and_then(|array| array.first())
        .and_then(|value| value.get("method"))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string());
    let entry_info = raw.get("rcsb_entry_info");
    let resolution = entry_info
        .and_then(|value| value.get("resolution_combined"))
        .and_then(|value| value.as_array())
        .and_then(|array| array.first())
        .and_then(|value| value.as_f64());
    let ligand_bound = entry_info
        .and_then(|value| value.get("nonpolymer_entity_count"))
        .and_then(|value| value.as_u64())
        .is_some_and(|count| count > 0);

    EntrySummary {
        pdb_id: pdb_id.to_string(),
        title,
        experimental_method,
        resolution,
        ligand_bound,
    }
}

pub fn summarize_entries(structure_count: u64, sampled_entries: Vec<EntrySummary>) -> StructureSummary {
    let best_resolution = sampled_entries
        .iter()
        .filter_map(|entry| entry.resolution)
        .fold(None, |best: Option<f64>, value| {
            Some(best.map_or(value, |current| current.min(value)))
        });
    let ligand_bound_count = sampled_entries
        .iter()
        .filter(|entry| entry.ligand_bound)
        .count() as u64;
    StructureSummary {
        structure_count,
        best_resolution,
        ligand_bound_count,
        sampled_entries,
    }
}

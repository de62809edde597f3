use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::KiraError;
use crate::source::{SourceClient, SourceRequest};
use crate::sources::http::{HttpSource, count_field};

const BASE_URL: &str = "https://www.ebi.ac.uk/chembl/api/data";
const ACTIVITY_PAGE: &str = "1000";
const POTENT_PCHEMBL: f64 = 6.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BioactivitySummary {
    pub target_chembl_id: Option<String>,
    pub compound_count: u64,
    pub potent_compound_count: u64,
    pub activity_count: u64,
    pub max_phase: u8,
}

#[derive(Clone)]
pub struct ChemblHttpClient {
    http: HttpSource,
}

impl ChemblHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        Ok(Self {
            http: HttpSource::new("ChEMBL", timeout)?,
        })
    }

    fn find_target(&self, gene: &str) -> Result<Option<String>, KiraError> {
        let url = format!("{BASE_URL}/target/search.json");
        let raw = self.http.get_json(|| {
            self.http
                .client()
                .get(&url)
                .query(&[("q", gene), ("limit", "20")])
        })?;
        Ok(extract_target_id(&raw))
    }
}

impl SourceClient<BioactivitySummary> for ChemblHttpClient {
    fn fetch(&self, request: &SourceRequest) -> Result<BioactivitySummary, KiraError> {
        let Some(target_id) = self.find_target(request.gene.as_str())? else {
            return Ok(BioactivitySummary::default());
        };

        let activity_url = format!("{BASE_URL}/activity.json");
        let activities = self.http.get_json(|| {
            self.http.client().get(&activity_url).query(&[
                ("target_chembl_id", target_id.as_str()),
                ("only", "molecule_chembl_id,pchembl_value"),
                ("limit", ACTIVITY_PAGE),
            ])
        })?;

        let mechanism_url = format!("{BASE_URL}/mechanism.json");
        let mechanisms = self.http.get_json(|| {
            self.http.client().get(&mechanism_url).query(&[
                ("target_chembl_id", target_id.as_str()),
                ("only", "molecule_chembl_id,max_phase"),
                ("limit", ACTIVITY_PAGE),
            ])
        })?;

        let mut summary = summarize_activities(&activities);
        summary.target_chembl_id = Some(target_id);
        summary.max_phase = max_mechanism_phase(&mechanisms);
        Ok(summary)
    }
}

/// First human single-protein hit; search results arrive ordered by relevance.
pub fn extract_target_id(raw: &Value) -> Option<String> {
    raw.get("targets")
        .and_then(|value| value.as_array())?
        .iter()
        .find(|target| {
            target.get("organism").and_then(|v| v.as_str()) == Some("Homo sapiens")
                && target.get("target_type").and_then(|v| v.as_str()) == Some("SINGLE PROTEIN")
        })
        .and_then(|target| target.get("target_chembl_id"))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

/// Distinct molecules from the sampled activity page; the activity total comes
/// from page metadata so it is not capped by the page size.
pub fn summarize_activities(raw: &Value) -> BioactivitySummary {
    let rows = raw
        .get("activities")
        .and_then(|value| value.as_array())
        .cloned()
        .unwrap_or_default();
    let mut molecules = HashSet::new();
    let mut potent = HashSet::new();
    for row in &rows {
        let Some(molecule) = row.get("molecule_chembl_id").and_then(|v| v.as_str()) else {
            continue;
        };
        molecules.insert(molecule.to_string());
        let pchembl = row.get("pchembl_value").and_then(|value| match value {
            Value::String(text) => text.parse::<f64>().ok(),
            other => other.as_f64(),
        });
        if pchembl.is_some_and(|value| value >= POTENT_PCHEMBL) {
            potent.insert(molecule.to_string());
        }
    }
    let activity_count = count_field(
        raw.get("page_meta")
            .and_then(|meta| meta.get("total_count")),
    )
    .unwrap_or(rows.len() as u64);

    BioactivitySummary {
        target_chembl_id: None,
        compound_count: molecules.len() as u64,
        potent_compound_count: potent.len() as u64,
        activity_count,
        max_phase: 0,
    }
}

pub fn max_mechanism_phase(raw: &Value) -> u8 {
    raw.get("mechanisms")
        .and_then(|value| value.as_array())
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let phase = row.get("max_phase")?;
                    match phase {
                        Value::String(text) => text.parse::<f64>().ok(),
                        other => other.as_f64(),
                    }
                })
                .fold(0.0_f64, f64::max)
        })
        .map(|phase| phase.clamp(0.0, 4.0) as u8)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn counts_distinct_and_potent_molecules() {
        let raw = json!({
            "activities": [
                { "molecule_chembl_id": "CHEMBL939", "pchembl_value": "8.10" },
                { "molecule_chembl_id": "CHEMBL939", "pchembl_value": "7.40" },
                { "molecule_chembl_id": "CHEMBL553", "pchembl_value": "5.20" },
                { "molecule_chembl_id": "CHEMBL1173655", "pchembl_value": null }
            ],
            "page_meta": { "total_count": 15234 }
        });
        let summary = summarize_activities(&raw);
        assert_eq!(summary.compound_count, 3);
        assert_eq!(summary.potent_compound_count, 1);
        assert_eq!(summary.activity_count, 15234);
    }

    #[test]
    fn mechanism_phase_takes_maximum() {
        let raw = json!({
            "mechanisms": [
                { "molecule_chembl_id": "CHEMBL939", "max_phase": "4.0" },
                { "molecule_chembl_id": "CHEMBL553", "max_phase": 2 }
            ]
        });
        assert_eq!(max_mechanism_phase(&raw), 4);
        assert_eq!(max_mechanism_phase(&json!({ "mechanisms": [] })), 0);
    }

    #[test]
    fn missing_target_yields_none() {
        assert_eq!(extract_target_id(&json!({ "targets": [] })), None);
        let raw = json!({ "targets": [
            { "target_chembl_id": "CHEMBL2111431", "organism": "Homo sapiens", "target_type": "PROTEIN FAMILY" },
            { "target_chembl_id": "CHEMBL3608", "organism": "Mus musculus", "target_type": "SINGLE PROTEIN" },
            { "target_chembl_id": "CHEMBL203", "organism": "Homo sapiens", "target_type": "SINGLE PROTEIN" }
        ] });
        assert_eq!(extract_target_id(&raw), Some("CHEMBL203".to_string()));
    }
}

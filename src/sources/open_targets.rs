use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::KiraError;
use crate::source::{SourceClient, SourceRequest};
use crate::sources::http::{HttpSource, count_field};

const GRAPHQL_URL: &str = "https://api.platform.opentargets.org/api/v4/graphql";
const TOP_ASSOCIATIONS: usize = 25;

const ASSOCIATIONS_QUERY: &str = r#"
query targetAssociations($ensemblId: String!, $size: Int!) {
  target(ensemblId: $ensemblId) {
    id
    approvedSymbol
    associatedDiseases(page: { index: 0, size: $size }) {
      count
      rows {
        score
        disease { id name }
      }
    }
  }
}
"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneticsEvidence {
    pub association_count: u64,
    pub max_association_score: f64,
    pub top_associations: Vec<DiseaseAssociation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseAssociation {
    pub disease_id: String,
    pub disease_name: String,
    pub score: f64,
}

#[derive(Clone)]
pub struct OpenTargetsHttpClient {
    http: HttpSource,
}

impl OpenTargetsHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        Ok(Self {
            http: HttpSource::new("Open Targets", timeout)?,
        })
    }
}

impl SourceClient<GeneticsEvidence> for OpenTargetsHttpClient {
    fn fetch(&self, request: &SourceRequest) -> Result<GeneticsEvidence, KiraError> {
        let ensembl_id = request.require_genomics_id(self.http.provider())?;
        let body = json!({
            "query": ASSOCIATIONS_QUERY,
            "variables": { "ensemblId": ensembl_id, "size": TOP_ASSOCIATIONS },
        });
        let raw = self
            .http
            .get_json(|| self.http.client().post(GRAPHQL_URL).json(&body))?;
        extract_genetics(&raw).map_err(|message| self.http.payload_error(message))
    }
}

pub fn extract_genetics(raw: &Value) -> Result<GeneticsEvidence, String> {
    if let Some(errors) = raw.get("errors").and_then(|value| value.as_array()) {
        let message = errors
            .iter()
            .filter_map(|err| err.get("message").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(format!("graphql error: {message}"));
    }
    let target = raw
        .get("data")
        .and_then(|data| data.get("target"))
        .ok_or_else(|| "missing data.target".to_string())?;
    if target.is_null() {
        return Err("target not present in Open Targets".to_string());
    }
    let associations = target.get("associatedDiseases");
    let association_count = count_field(associations.and_then(|value| value.get("count")))
        .unwrap_or(0);
    let top_associations = associations
        .and_then(|value| value.get("rows"))
        .and_then(|value| value.as_array())
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let disease = row.get("disease")?;
                    Some(DiseaseAssociation {
                        disease_id: disease.get("id")?.as_str()?.to_string(),
                        disease_name: disease
                            .get("name")
                            .and_then(|value| value.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        score: row.get("score")?.as_f64()?.clamp(0.0, 1.0),
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let max_association_score = top_associations
        .iter()
        .map(|association| association.score)
        .fold(0.0, f64::max);

    Ok(GeneticsEvidence {
        association_count,
        max_association_score,
        top_associations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_association_summary() {
        let raw = json!({
            "data": { "target": {
                "id": "ENSG00000146648",
                "approvedSymbol": "EGFR",
                "associatedDiseases": {
                    "count": 1873,
                    "rows": [
                        { "score": 0.82, "disease": { "id": "EFO_0003060", "name": "non-small cell lung carcinoma" } },
                        { "score": 0.61, "disease": { "id": "MONDO_0008903", "name": "lung cancer" } }
                    ]
                }
            } }
        });
        let evidence = extract_genetics(&raw).unwrap();
        assert_eq!(evidence.association_count, 1873);
        assert_eq!(evidence.max_association_score, 0.82);
        assert_eq!(evidence.top_associations.len(), 2);
        assert_eq!(evidence.top_associations[1].disease_id, "MONDO_0008903");
    }

    #[test]
    fn null_target_is_a_payload_error() {
        let raw = json!({ "data": { "target": null } });
        assert!(extract_genetics(&raw).is_err());
    }

    #[test]
    fn graphql_errors_surface() {
        let raw = json!({ "errors": [{ "message": "bad id" }], "data": null });
        assert_eq!(extract_genetics(&raw).unwrap_err(), "graphql error: bad id");
    }
}

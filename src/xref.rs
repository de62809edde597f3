use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::domain::GeneSymbol;
use crate::error::KiraError;
use crate::sources::http::HttpSource;

const ENSEMBL_LOOKUP_URL: &str = "https://rest.ensembl.org/lookup/symbol/homo_sapiens";
const UNIPROT_SEARCH_URL: &str = "https://rest.uniprot.org/uniprotkb/search";

/// Outcome of mapping a symbol into a secondary namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    Found(String),
    /// The namespace answered and has no such gene.
    NotFound,
    /// The lookup itself failed; nothing is known about the gene.
    Unavailable(String),
}

impl Resolution {
    pub fn id(&self) -> Option<&str> {
        match self {
            Resolution::Found(id) => Some(id),
            _ => None,
        }
    }

    pub fn from_lookup(result: Result<Option<String>, KiraError>) -> Self {
        match result {
            Ok(Some(id)) => Resolution::Found(id),
            Ok(None) => Resolution::NotFound,
            Err(err) => Resolution::Unavailable(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossRefs {
    pub ensembl_gene_id: Resolution,
    pub uniprot_accession: Resolution,
}

pub trait CrossRefResolver: Send + Sync {
    /// Ensembl gene id, the genomics-graph identifier. `Ok(None)` means the
    /// symbol is unknown to Ensembl.
    fn genomics_id(&self, gene: &GeneSymbol) -> Result<Option<String>, KiraError>;
    /// Reviewed human UniProtKB accession.
    fn protein_accession(&self, gene: &GeneSymbol) -> Result<Option<String>, KiraError>;
}

#[derive(Clone)]
pub struct HttpCrossRefResolver {
    ensembl: HttpSource,
    uniprot: HttpSource,
}

impl HttpCrossRefResolver {
    pub fn new(timeout: Duration) -> Result<Self, KiraError> {
        Ok(Self {
            ensembl: HttpSource::new("Ensembl", timeout)?,
            uniprot: HttpSource::new("UniProt", timeout)?,
        })
    }
}

impl CrossRefResolver for HttpCrossRefResolver {
    fn genomics_id(&self, gene: &GeneSymbol) -> Result<Option<String>, KiraError> {
        let url = format!("{ENSEMBL_LOOKUP_URL}/{}", gene.as_str());
        let result = self.ensembl.get_json(|| {
            self.ensembl
                .client()
                .get(&url)
                .query(&[("content-type", "application/json")])
        });
        match result {
            Ok(raw) => Ok(extract_ensembl_id(&raw)),
            // Ensembl reports an unknown symbol as 400 "No valid lookup found".
            Err(KiraError::UpstreamStatus {
                status: 400 | 404, ..
            }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn protein_accession(&self, gene: &GeneSymbol) -> Result<Option<String>, KiraError> {
        let query = format!(
            "gene_exact:{} AND organism_id:9606 AND reviewed:true",
            gene.as_str()
        );
        let raw = self.uniprot.get_json(|| {
            self.uniprot.client().get(UNIPROT_SEARCH_URL).query(&[
                ("query", query.as_str()),
                ("fields", "accession,gene_primary"),
                ("format", "json"),
                ("size", "1"),
            ])
        })?;
        Ok(extract_uniprot_accession(&raw))
    }
}

pub fn extract_ensembl_id(raw: &Value) -> Option<String> {
    raw.get("id")
        .and_then(|value| value.as_str())
        .filter(|id| id.starts_with("ENSG"))
        .map(|id| id.to_string())
}

pub fn extract_uniprot_accession(raw: &Value) -> Option<String> {
    raw.get("results")
        .and_then(|value| value.as_array())
        .and_then(|results| results.first())
        .and_then(|entry| entry.get("primaryAccession"))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::KiraError;

/// Historical and colloquial target names mapped to the current HGNC symbol.
/// Keys are already trimmed and uppercased.
const GENE_ALIASES: &[(&str, &str)] = &[
    ("HER1", "EGFR"),
    ("ERBB1", "EGFR"),
    ("HER2", "ERBB2"),
    ("NEU", "ERBB2"),
    ("HER3", "ERBB3"),
    ("HER4", "ERBB4"),
    ("P53", "TP53"),
    ("C-MYC", "MYC"),
    ("CMYC", "MYC"),
    ("C-KIT", "KIT"),
    ("C-MET", "MET"),
    ("HGFR", "MET"),
    ("PD-L1", "CD274"),
    ("PDL1", "CD274"),
    ("PD-1", "PDCD1"),
    ("PD1", "PDCD1"),
    ("VEGF", "VEGFA"),
    ("TRKA", "NTRK1"),
    ("COX-2", "PTGS2"),
    ("COX2", "PTGS2"),
    ("P16", "CDKN2A"),
    ("TNF-ALPHA", "TNF"),
    ("TNFA", "TNF"),
    ("IL-6", "IL6"),
    ("BCL-2", "BCL2"),
];

const MAX_SYMBOL_LEN: usize = 16;

/// Normalized, validated HGNC-style gene symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneSymbol(String);

impl GeneSymbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GeneSymbol {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        normalize(value)
    }
}

impl TryFrom<String> for GeneSymbol {
    type Error = KiraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize(&value)
    }
}

impl From<GeneSymbol> for String {
    fn from(value: GeneSymbol) -> Self {
        value.0
    }
}

/// Canonicalizes free-form input: trim, uppercase, alias lookup, grammar check.
pub fn normalize(input: &str) -> Result<GeneSymbol, KiraError> {
    let upper = input.trim().to_uppercase();
    let canonical = resolve_alias(&upper).unwrap_or(upper.as_str());
    if !is_valid_symbol(canonical) {
        return Err(KiraError::InvalidGeneSymbol(input.to_string()));
    }
    Ok(GeneSymbol(canonical.to_string()))
}

pub fn resolve_alias(upper: &str) -> Option<&'static str> {
    GENE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, symbol)| *symbol)
}

fn is_valid_symbol(value: &str) -> bool {
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|ch| ch.is_ascii_uppercase());
    starts_with_letter
        && (2..=MAX_SYMBOL_LEN).contains(&value.len())
        && chars.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
}

static DISEASE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(EFO|MONDO|ORPHANET|HP|DOID)[_:](\d{1,10})$")
        .unwrap_or_else(|err| panic!("disease id pattern is invalid: {err}"))
});

/// Ontology disease identifier in the underscore form used by Open Targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiseaseId(String);

impl DiseaseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DiseaseId {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let captures = DISEASE_ID_RE
            .captures(trimmed)
            .ok_or_else(|| KiraError::InvalidDiseaseId(value.to_string()))?;
        let prefix = match captures[1].to_uppercase().as_str() {
            "ORPHANET" => "Orphanet".to_string(),
            other => other.to_string(),
        };
        Ok(Self(format!("{prefix}_{}", &captures[2])))
    }
}

/// The seven upstream sources, in the fixed slot order used everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    OpenTargets,
    Chembl,
    Pubmed,
    ClinicalTrials,
    Preprints,
    Rcsb,
    Encode,
}

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::OpenTargets,
        SourceKind::Chembl,
        SourceKind::Pubmed,
        SourceKind::ClinicalTrials,
        SourceKind::Preprints,
        SourceKind::Rcsb,
        SourceKind::Encode,
    ];

    /// Human-readable source name carried in every result envelope.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::OpenTargets => "Open Targets",
            SourceKind::Chembl => "ChEMBL",
            SourceKind::Pubmed => "PubMed",
            SourceKind::ClinicalTrials => "ClinicalTrials.gov",
            SourceKind::Preprints => "Europe PMC Preprints",
            SourceKind::Rcsb => "RCSB PDB",
            SourceKind::Encode => "ENCODE",
        }
    }

    pub fn config_key(&self) -> &'static str {
        match self {
            SourceKind::OpenTargets => "open_targets",
            SourceKind::Chembl => "chembl",
            SourceKind::Pubmed => "pubmed",
            SourceKind::ClinicalTrials => "clinical_trials",
            SourceKind::Preprints => "preprints",
            SourceKind::Rcsb => "rcsb",
            SourceKind::Encode => "encode",
        }
    }

    pub fn needs_genomics_id(&self) -> bool {
        matches!(self, SourceKind::OpenTargets | SourceKind::Encode)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

//! Deterministic evidence scoring.
//!
//! Each dimension reads exactly one source payload. A missing payload scores
//! the dimension's floor, so the function is total: every input combination,
//! including all seven payloads absent, yields seven dimensions and an overall
//! score in [0, 100].
//!
//! Contract v1, with `ls(v, c) = min(1, ln(1+v) / ln(1+c))`:
//!
//! | dimension             | floor | present-data formula                                      | weight |
//! |-----------------------|-------|-----------------------------------------------------------|--------|
//! | genetic evidence      | 5     | 5 + 50 ls(associations, 200) + 45 max_score               | 0.25   |
//! | chemical tractability | 5     | 5 + 60 ls(compounds, 1000) + 35 ls(potent, 100)           | 0.15   |
//! | structural readiness  | 5     | 5 + 50 ls(structures, 100) + 25 resq + 20 ls(ligands, 20) | 0.12   |
//! | clinical history      | 0     | 40 phase/4 + 40 ls(trials, 100) + 20 ls(active, 20)       | 0.15   |
//! | regulatory genomics   | 5     | 5 + 55 ls(experiments, 200) + 40 ls(features, 500)        | 0.08   |
//! | literature depth      | 5     | 5 + 70 ls(publications, 20000) + 25 ls(recent, 5000)      | 0.15   |
//! | innovation signal     | 5     | 5 + 55 ls(preprints, 500) + 40 ls(recent, 50)             | 0.10   |
//!
//! `resq` is 1 at or below 1.5 Å, 0 at or above 4.0 Å (or unknown), linear in
//! between. Dimension scores are rounded to one decimal; the overall score is
//! the weighted sum of the rounded dimensions, rounded to an integer.

use serde::Serialize;

use crate::sources::{
    BioactivitySummary, GeneticsEvidence, LiteratureSummary, PreprintSummary, RegulatorySummary,
    StructureSummary, TrialsSummary,
};

pub const SCORING_VERSION: &str = "1";

/// The seven payloads, each absent when its source failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringInputs<'a> {
    pub genetics: Option<&'a GeneticsEvidence>,
    pub bioactivity: Option<&'a BioactivitySummary>,
    pub literature: Option<&'a LiteratureSummary>,
    pub trials: Option<&'a TrialsSummary>,
    pub preprints: Option<&'a PreprintSummary>,
    pub structures: Option<&'a StructureSummary>,
    pub regulatory: Option<&'a RegulatorySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    GeneticEvidence,
    ChemicalTractability,
    StructuralReadiness,
    ClinicalHistory,
    RegulatoryGenomics,
    LiteratureDepth,
    InnovationSignal,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::GeneticEvidence,
        Dimension::ChemicalTractability,
        Dimension::StructuralReadiness,
        Dimension::ClinicalHistory,
        Dimension::RegulatoryGenomics,
        Dimension::LiteratureDepth,
        Dimension::InnovationSignal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::GeneticEvidence => "Genetic Evidence",
            Dimension::ChemicalTractability => "Chemical Tractability",
            Dimension::StructuralReadiness => "Structural Readiness",
            Dimension::ClinicalHistory => "Clinical History",
            Dimension::RegulatoryGenomics => "Regulatory Genomics",
            Dimension::LiteratureDepth => "Literature Depth",
            Dimension::InnovationSignal => "Innovation Signal",
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Dimension::GeneticEvidence => 0.25,
            Dimension::ChemicalTractability => 0.15,
            Dimension::StructuralReadiness => 0.12,
            Dimension::ClinicalHistory => 0.15,
            Dimension::RegulatoryGenomics => 0.08,
            Dimension::LiteratureDepth => 0.15,
            Dimension::InnovationSignal => 0.10,
        }
    }

    pub fn floor(&self) -> f64 {
        match self {
            Dimension::ClinicalHistory => 0.0,
            _ => 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub score: f64,
    pub label: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimensions {
    pub genetic_evidence: DimensionScore,
    pub chemical_tractability: DimensionScore,
    pub structural_readiness: DimensionScore,
    pub clinical_history: DimensionScore,
    pub regulatory_genomics: DimensionScore,
    pub literature_depth: DimensionScore,
    pub innovation_signal: DimensionScore,
}

impl Dimensions {
    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::GeneticEvidence => &self.genetic_evidence,
            Dimension::ChemicalTractability => &self.chemical_tractability,
            Dimension::StructuralReadiness => &self.structural_readiness,
            Dimension::ClinicalHistory => &self.clinical_history,
            Dimension::RegulatoryGenomics => &self.regulatory_genomics,
            Dimension::LiteratureDepth => &self.literature_depth,
            Dimension::InnovationSignal => &self.innovation_signal,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &DimensionScore)> {
        Dimension::ALL
            .into_iter()
            .map(move |dimension| (dimension, self.get(dimension)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scores {
    pub overall: u8,
    pub dimensions: Dimensions,
}

pub fn score(inputs: &ScoringInputs<'_>) -> Scores {
    let dimensions = Dimensions {
        genetic_evidence: genetic_evidence(inputs.genetics),
        chemical_tractability: chemical_tractability(inputs.bioactivity),
        structural_readiness: structural_readiness(inputs.structures),
        clinical_history: clinical_history(inputs.trials),
        regulatory_genomics: regulatory_genomics(inputs.regulatory),
        literature_depth: literature_depth(inputs.literature),
        innovation_signal: innovation_signal(inputs.preprints),
    };
    let overall = overall_score(&dimensions);
    Scores {
        overall,
        dimensions,
    }
}

pub fn overall_score(dimensions: &Dimensions) -> u8 {
    let weighted: f64 = dimensions
        .iter()
        .map(|(dimension, score)| dimension.weight() * score.score)
        .sum();
    weighted.clamp(0.0, 100.0).round() as u8
}

/// `ln(1+v) / ln(1+ceiling)`, saturating at 1.
pub fn log_saturate(value: u64, ceiling: u64) -> f64 {
    if value == 0 || ceiling == 0 {
        return 0.0;
    }
    ((value as f64).ln_1p() / (ceiling as f64).ln_1p()).min(1.0)
}

pub fn resolution_quality(resolution: Option<f64>) -> f64 {
    const BEST: f64 = 1.5;
    const WORST: f64 = 4.0;
    match resolution {
        Some(r) if r.is_finite() && r > 0.0 => ((WORST - r) / (WORST - BEST)).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn finish(dimension: Dimension, raw: f64, rationale: String) -> DimensionScore {
    let clamped = if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        dimension.floor()
    };
    DimensionScore {
        score: (clamped * 10.0).round() / 10.0,
        label: dimension.label().to_string(),
        rationale,
    }
}

fn floor_score(dimension: Dimension, source: &str) -> DimensionScore {
    finish(
        dimension,
        dimension.floor(),
        format!("No data from {source}; floor score applied"),
    )
}

fn genetic_evidence(data: Option<&GeneticsEvidence>) -> DimensionScore {
    let dimension = Dimension::GeneticEvidence;
    let Some(data) = data else {
        return floor_score(dimension, "Open Targets");
    };
    let strength = if data.max_association_score.is_finite() {
        data.max_association_score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let raw = dimension.floor() + 50.0 * log_saturate(data.association_count, 200) + 45.0 * strength;
    finish(
        dimension,
        raw,
        format!(
            "{} disease associations; strongest association score {:.2}",
            data.association_count, strength
        ),
    )
}

fn chemical_tractability(data: Option<&BioactivitySummary>) -> DimensionScore {
    let dimension = Dimension::ChemicalTractability;
    let Some(data) = data else {
        return floor_score(dimension, "ChEMBL");
    };
    let raw = dimension.floor()
        + 60.0 * log_saturate(data.compound_count, 1000)
        + 35.0 * log_saturate(data.potent_compound_count, 100);
    let rationale = match &data.target_chembl_id {
        Some(id) => format!(
            "{} compounds tested against {id}; {} with pChEMBL >= 6",
            data.compound_count, data.potent_compound_count
        ),
        None => "No ChEMBL single-protein target found".to_string(),
    };
    finish(dimension, raw, rationale)
}

fn structural_readiness(data: Option<&StructureSummary>) -> DimensionScore {
    let dimension = Dimension::StructuralReadiness;
    let Some(data) = data else {
        return floor_score(dimension, "RCSB PDB");
    };
    let raw = dimension.floor()
        + 50.0 * log_saturate(data.structure_count, 100)
        + 25.0 * resolution_quality(data.best_resolution)
        + 20.0 * log_saturate(data.ligand_bound_count, 20);
    let resolution = data
        .best_resolution
        .map(|r| format!("best resolution {r:.2} Å"))
        .unwrap_or_else(|| "no resolution reported".to_string());
    finish(
        dimension,
        raw,
        format!(
            "{} PDB entries; {resolution}; {} ligand-bound among sampled",
            data.structure_count, data.ligand_bound_count
        ),
    )
}

fn clinical_history(data: Option<&TrialsSummary>) -> DimensionScore {
    let dimension = Dimension::ClinicalHistory;
    let Some(data) = data else {
        return floor_score(dimension, "ClinicalTrials.gov");
    };
    let phase = f64::from(data.max_phase.min(4)) / 4.0;
    let raw = dimension.floor()
        + 40.0 * phase
        + 40.0 * log_saturate(data.total_trials, 100)
        + 20.0 * log_saturate(data.active_trials, 20);
    finish(
        dimension,
        raw,
        format!(
            "{} trials ({} active); highest phase {}",
            data.total_trials, data.active_trials, data.max_phase
        ),
    )
}

fn regulatory_genomics(data: Option<&RegulatorySummary>) -> DimensionScore {
    let dimension = Dimension::RegulatoryGenomics;
    let Some(data) = data else {
        return floor_score(dimension, "ENCODE");
    };
    let raw = dimension.floor()
        + 55.0 * log_saturate(data.experiment_count, 200)
        + 40.0 * log_saturate(data.regulatory_feature_count, 500);
    finish(
        dimension,
        raw,
        format!(
            "{} ENCODE experiments; {} regulatory features at the locus",
            data.experiment_count, data.regulatory_feature_count
        ),
    )
}

fn literature_depth(data: Option<&LiteratureSummary>) -> DimensionScore {
    let dimension = Dimension::LiteratureDepth;
    let Some(data) = data else {
        return floor_score(dimension, "PubMed");
    };
    let raw = dimension.floor()
        + 70.0 * log_saturate(data.total_publications, 20_000)
        + 25.0 * log_saturate(data.recent_publications, 5_000);
    finish(
        dimension,
        raw,
        format!(
            "{} publications; {} in the last five years",
            data.total_publications, data.recent_publications
        ),
    )
}

fn innovation_signal(data: Option<&PreprintSummary>) -> DimensionScore {
    let dimension = Dimension::InnovationSignal;
    let Some(data) = data else {
        return floor_score(dimension, "Europe PMC Preprints");
    };
    let raw = dimension.floor()
        + 55.0 * log_saturate(data.total_preprints, 500)
        + 40.0 * log_saturate(data.recent_preprints, 50);
    finish(
        dimension,
        raw,
        format!(
            "{} preprints; {} in the last twelve months",
            data.total_preprints, data.recent_preprints
        ),
    )
}

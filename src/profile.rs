use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{GeneSymbol, SourceKind};
use crate::scoring::{self, SCORING_VERSION, Scores, ScoringInputs};
use crate::source::{SourceResult, duration_ms};
use crate::sources::{
    BioactivitySummary, GeneticsEvidence, LiteratureSummary, PreprintSummary, RegulatorySummary,
    StructureSummary, TrialsSummary,
};
use crate::xref::CrossRefs;

/// The seven source envelopes in fixed, named slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawData {
    pub open_targets: SourceResult<GeneticsEvidence>,
    pub chembl: SourceResult<BioactivitySummary>,
    pub pubmed: SourceResult<LiteratureSummary>,
    pub clinical_trials: SourceResult<TrialsSummary>,
    pub preprints: SourceResult<PreprintSummary>,
    pub rcsb: SourceResult<StructureSummary>,
    pub encode: SourceResult<RegulatorySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub kind: SourceKind,
    pub success: bool,
    pub error: Option<String>,
    pub response_time_ms: u64,
}

impl RawData {
    pub fn inputs(&self) -> ScoringInputs<'_> {
        ScoringInputs {
            genetics: self.open_targets.data(),
            bioactivity: self.chembl.data(),
            literature: self.pubmed.data(),
            trials: self.clinical_trials.data(),
            preprints: self.preprints.data(),
            structures: self.rcsb.data(),
            regulatory: self.encode.data(),
        }
    }

    /// One status per slot, always seven, in `SourceKind::ALL` order.
    pub fn statuses(&self) -> [SourceStatus; 7] {
        fn status<T>(result: &SourceResult<T>) -> SourceStatus {
            SourceStatus {
                kind: result.kind(),
                success: result.is_success(),
                error: result.error().map(|message| message.to_string()),
                response_time_ms: result.response_time_ms(),
            }
        }
        [
            status(&self.open_targets),
            status(&self.chembl),
            status(&self.pubmed),
            status(&self.clinical_trials),
            status(&self.preprints),
            status(&self.rcsb),
            status(&self.encode),
        ]
    }

    pub fn succeeded(&self) -> usize {
        self.statuses().iter().filter(|status| status.success).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneIdentity {
    pub symbol: GeneSymbol,
    pub cross_refs: CrossRefs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMetadata {
    pub analysis_timestamp: DateTime<Utc>,
    pub total_latency_ms: u64,
    pub services_completed: usize,
    pub services_failed: usize,
    pub scoring_version: &'static str,
}

/// Target development level, for badges. Derived from a profile, never fed
/// back into the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DevelopmentLevel {
    Tclin,
    Tchem,
    Tbio,
    Tdark,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetProfile {
    pub gene: GeneIdentity,
    pub scores: Scores,
    pub development_level: DevelopmentLevel,
    pub raw_data: RawData,
    pub metadata: ProfileMetadata,
}

impl TargetProfile {
    /// Recomputes scores from the retained envelopes.
    pub fn rescore(&self) -> Scores {
        scoring::score(&self.raw_data.inputs())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

pub fn assemble(
    symbol: GeneSymbol,
    cross_refs: CrossRefs,
    raw_data: RawData,
    scores: Scores,
    timing: Timing,
) -> TargetProfile {
    let services_completed = raw_data.succeeded();
    let development_level = development_level(&raw_data.inputs());
    TargetProfile {
        gene: GeneIdentity { symbol, cross_refs },
        scores,
        development_level,
        raw_data,
        metadata: ProfileMetadata {
            analysis_timestamp: timing.started_at,
            total_latency_ms: duration_ms(timing.elapsed),
            services_completed,
            services_failed: SourceKind::ALL.len() - services_completed,
            scoring_version: SCORING_VERSION,
        },
    }
}

pub fn development_level(inputs: &ScoringInputs<'_>) -> DevelopmentLevel {
    let approved_drug = inputs.bioactivity.is_some_and(|b| b.max_phase >= 4)
        || inputs.trials.is_some_and(|t| t.max_phase >= 4);
    if approved_drug {
        return DevelopmentLevel::Tclin;
    }
    if inputs
        .bioactivity
        .is_some_and(|b| b.potent_compound_count >= 1)
    {
        return DevelopmentLevel::Tchem;
    }
    let studied = inputs.genetics.is_some_and(|g| g.association_count > 0)
        || inputs.literature.is_some_and(|l| l.total_publications >= 5)
        || inputs.structures.is_some_and(|s| s.structure_count > 0);
    if studied {
        DevelopmentLevel::Tbio
    } else {
        DevelopmentLevel::Tdark
    }
}

use kira_target_profiler::scoring::{Dimension, ScoringInputs, score};
use kira_target_profiler::sources::{
    BioactivitySummary, GeneticsEvidence, LiteratureSummary, PreprintSummary, RegulatorySummary,
    StructureSummary, TrialsSummary,
};

fn genetics(association_count: u64, max_association_score: f64) -> GeneticsEvidence {
    GeneticsEvidence {
        association_count,
        max_association_score,
        top_associations: Vec::new(),
    }
}

#[test]
fn all_sources_missing_scores_the_dark_floor() {
    let scores = score(&ScoringInputs::default());
    assert_eq!(scores.overall, 4);
    assert!(scores.overall <= 15);
    assert_eq!(scores.dimensions.iter().count(), 7);
    assert_eq!(
        scores.dimensions.get(Dimension::ClinicalHistory).score,
        0.0
    );
}

#[test]
fn saturated_genetics_alone_scores_28() {
    let evidence = genetics(200, 1.0);
    let scores = score(&ScoringInputs {
        genetics: Some(&evidence),
        ..Default::default()
    });
    assert_eq!(scores.dimensions.genetic_evidence.score, 100.0);
    assert_eq!(scores.overall, 28);
}

#[test]
fn genetics_midpoint_is_exact() {
    let evidence = genetics(200, 0.5);
    let scores = score(&ScoringInputs {
        genetics: Some(&evidence),
        ..Default::default()
    });
    assert_eq!(scores.dimensions.genetic_evidence.score, 77.5);
    // 0.25 * 77.5 + 3.0 from the other floors
    assert_eq!(scores.overall, 22);
}

#[test]
fn saturated_everything_scores_100() {
    let genetics = genetics(500, 1.0);
    let bioactivity = BioactivitySummary {
        target_chembl_id: Some("CHEMBL203".to_string()),
        compound_count: 5_000,
        potent_compound_count: 400,
        activity_count: 20_000,
        max_phase: 4,
    };
    let literature = LiteratureSummary {
        total_publications: 40_000,
        recent_publications: 9_000,
    };
    let trials = TrialsSummary {
        total_trials: 300,
        active_trials: 40,
        max_phase: 4,
        sampled: 300,
    };
    let preprints = PreprintSummary {
        total_preprints: 800,
        recent_preprints: 90,
    };
    let structures = StructureSummary {
        structure_count: 250,
        best_resolution: Some(1.1),
        ligand_bound_count: 60,
        sampled_entries: Vec::new(),
    };
    let regulatory = RegulatorySummary {
        experiment_count: 400,
        regulatory_feature_count: 900,
    };
    let scores = score(&ScoringInputs {
        genetics: Some(&genetics),
        bioactivity: Some(&bioactivity),
        literature: Some(&literature),
        trials: Some(&trials),
        preprints: Some(&preprints),
        structures: Some(&structures),
        regulatory: Some(&regulatory),
    });
    for (_, dimension) in scores.dimensions.iter() {
        assert_eq!(dimension.score, 100.0);
    }
    assert_eq!(scores.overall, 100);
}

#[test]
fn empty_trial_history_scores_zero_not_floor_rationale() {
    let trials = TrialsSummary::default();
    let scores = score(&ScoringInputs {
        trials: Some(&trials),
        ..Default::default()
    });
    let clinical = scores.dimensions.get(Dimension::ClinicalHistory);
    assert_eq!(clinical.score, 0.0);
    assert!(clinical.rationale.starts_with("0 trials"));
}

#[test]
fn scoring_is_deterministic() {
    let evidence = genetics(37, 0.61);
    let inputs = ScoringInputs {
        genetics: Some(&evidence),
        ..Default::default()
    };
    assert_eq!(score(&inputs), score(&inputs));
    let overall = score(&inputs).overall;
    assert!(overall <= 100);
}

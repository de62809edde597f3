mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use common::{Harness, MockSource, bioactivity};
use kira_target_profiler::config::DiscoverySettings;
use kira_target_profiler::discovery::Discovery;
use kira_target_profiler::domain::DiseaseId;
use kira_target_profiler::error::KiraError;

fn lung_cancer() -> DiseaseId {
    "EFO_0001071".parse().unwrap()
}

fn candidates(inputs: &[&str]) -> Vec<String> {
    inputs.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn ranks_valid_candidates_and_reports_invalid_ones() {
    let harness = Harness::healthy();
    let discovery = Discovery::new(Arc::new(harness.app()), DiscoverySettings::default());

    let ranking = discovery
        .rank(&lung_cancer(), &candidates(&["EGFR", "her1", "KRAS", "not a gene"]))
        .await
        .unwrap();

    let ranked = ranking
        .ranked
        .iter()
        .map(|target| target.gene.as_str())
        .collect::<Vec<_>>();
    // Identical mock evidence ties on score and falls back to symbol order.
    assert_eq!(ranked, ["EGFR", "KRAS"]);
    assert_eq!(ranking.failures.len(), 1);
    assert_eq!(ranking.failures[0].input, "not a gene");
    assert!(ranking.ranked.iter().all(|t| t.services_completed == 7));
}

#[tokio::test]
async fn repeated_ranking_uses_disease_cache() {
    let harness = Harness::healthy();
    let discovery = Discovery::new(Arc::new(harness.app()), DiscoverySettings::default());
    let genes = candidates(&["BRAF", "MAP2K1"]);

    let first = discovery.rank(&lung_cancer(), &genes).await.unwrap();
    let calls = harness.source_calls();
    let second = discovery.rank(&lung_cancer(), &genes).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(harness.source_calls(), calls);
}

#[tokio::test]
async fn cached_ranking_still_reports_this_calls_invalid_inputs() {
    let harness = Harness::healthy();
    let discovery = Discovery::new(Arc::new(harness.app()), DiscoverySettings::default());

    let first = discovery
        .rank(&lung_cancer(), &candidates(&["EGFR"]))
        .await
        .unwrap();
    let calls = harness.source_calls();
    let second = discovery
        .rank(&lung_cancer(), &candidates(&["EGFR", "123!"]))
        .await
        .unwrap();
    let third = discovery
        .rank(&lung_cancer(), &candidates(&["egfr"]))
        .await
        .unwrap();

    assert!(first.failures.is_empty());
    assert_eq!(harness.source_calls(), calls);
    assert_eq!(second.ranked, first.ranked);
    assert_eq!(second.failures.len(), 1);
    assert_eq!(second.failures[0].input, "123!");
    assert!(third.failures.is_empty());
    assert!(Arc::ptr_eq(&first, &third));
}

#[tokio::test]
async fn slow_target_is_cut_off_without_stalling_the_batch() {
    let mut harness = Harness::healthy();
    harness.chembl = Arc::new(MockSource::ok(bioactivity()).with_delay(Duration::from_millis(600)));
    let settings = DiscoverySettings {
        batch_size: 2,
        target_timeout: Duration::from_millis(100),
    };
    let discovery = Discovery::new(Arc::new(harness.app()), settings);

    let ranking = discovery
        .rank(&lung_cancer(), &candidates(&["EGFR", "ALK", "ROS1"]))
        .await
        .unwrap();

    assert!(ranking.ranked.is_empty());
    assert_eq!(ranking.failures.len(), 3);
    assert!(
        ranking
            .failures
            .iter()
            .all(|failure| failure.error.contains("timed out"))
    );
}

#[tokio::test]
async fn empty_candidate_list_is_rejected() {
    let harness = Harness::healthy();
    let discovery = Discovery::new(Arc::new(harness.app()), DiscoverySettings::default());
    assert_matches!(
        discovery.rank(&lung_cancer(), &[]).await,
        Err(KiraError::InvalidInput(_))
    );
}

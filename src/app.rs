use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::cache::{CacheKey, ResponseCache};
use crate::config::ResolvedConfig;
use crate::domain::{self, GeneSymbol};
use crate::error::KiraError;
use crate::orchestrator::{FetchOrchestrator, Sources};
use crate::profile::{self, TargetProfile, Timing};
use crate::scoring;
use crate::xref::{CrossRefResolver, Resolution};

/// Single-target analysis: normalize, consult the cache, fan out, score and
/// assemble. Cheap to share behind an `Arc` across concurrent requests.
pub struct App {
    orchestrator: FetchOrchestrator,
    cache: ResponseCache<TargetProfile>,
}

impl App {
    pub fn new(
        config: &ResolvedConfig,
        sources: Sources,
        resolver: Arc<dyn CrossRefResolver>,
    ) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(
                sources,
                resolver,
                config.source_timeouts,
                config.resolver_timeout,
            ),
            cache: ResponseCache::new(config.cache_ttl),
        }
    }

    pub fn cache(&self) -> &ResponseCache<TargetProfile> {
        &self.cache
    }

    pub async fn analyze(&self, input: &str) -> Result<Arc<TargetProfile>, KiraError> {
        if input.trim().is_empty() {
            return Err(KiraError::InvalidInput(
                "gene symbol must not be empty".to_string(),
            ));
        }
        let gene = domain::normalize(input)?;
        self.analyze_symbol(&gene).await
    }

    pub async fn analyze_symbol(&self, gene: &GeneSymbol) -> Result<Arc<TargetProfile>, KiraError> {
        let key = CacheKey::Target(gene.clone());
        if let Some(hit) = self.cache.get(&key) {
            debug!(gene = %gene, "profile served from cache");
            return Ok(hit);
        }

        let started_at = Utc::now();
        let clock = Instant::now();
        let aggregation = self.orchestrator.aggregate(gene).await;
        if aggregation.cross_refs.ensembl_gene_id == Resolution::NotFound {
            return Err(KiraError::GeneNotFound(gene.to_string()));
        }

        let symbol = gene.clone();
        let profile = tokio::task::spawn_blocking(move || {
            let scores = scoring::score(&aggregation.raw.inputs());
            profile::assemble(
                symbol,
                aggregation.cross_refs,
                aggregation.raw,
                scores,
                Timing {
                    started_at,
                    elapsed: clock.elapsed(),
                },
            )
        })
        .await
        .map(Arc::new)
        .map_err(|err| scoring_aborted(gene, &err))?;

        info!(
            gene = %gene,
            overall = profile.scores.overall,
            completed = profile.metadata.services_completed,
            failed = profile.metadata.services_failed,
            latency_ms = profile.metadata.total_latency_ms,
            "target analyzed"
        );
        self.cache.set(&key, Arc::clone(&profile));
        Ok(profile)
    }
}

/// A panic while scoring surfaces as an aggregate failure for that gene.
fn scoring_aborted(gene: &GeneSymbol, err: &JoinError) -> KiraError {
    KiraError::AggregateFailure(format!("scoring {gene}: {err}"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::ErrorClass;

    #[tokio::test]
    async fn scoring_panic_maps_to_internal_aggregate_failure() {
        let join_err = tokio::task::spawn_blocking(|| -> u32 { panic!("weights out of range") })
            .await
            .unwrap_err();
        let gene = "EGFR".parse::<GeneSymbol>().unwrap();

        let err = scoring_aborted(&gene, &join_err);

        assert_matches!(&err, KiraError::AggregateFailure(message) if message.starts_with("scoring EGFR:"));
        assert_eq!(err.class(), ErrorClass::Internal);
    }
}

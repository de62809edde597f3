//! Ranks candidate targets for a disease by running the analysis entrypoint
//! over them in bounded batches.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::cache::{CacheKey, ResponseCache};
use crate::config::DiscoverySettings;
use crate::domain::{self, DiseaseId, GeneSymbol};
use crate::error::KiraError;
use crate::profile::{DevelopmentLevel, TargetProfile};
use crate::source::duration_ms;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTarget {
    pub gene: GeneSymbol,
    pub overall: u8,
    pub development_level: DevelopmentLevel,
    pub services_completed: usize,
}

impl RankedTarget {
    fn from_profile(profile: &TargetProfile) -> Self {
        Self {
            gene: profile.gene.symbol.clone(),
            overall: profile.scores.overall,
            development_level: profile.development_level,
            services_completed: profile.metadata.services_completed,
        }
    }
}

/// A candidate that produced no profile: bad symbol, unknown gene or a
/// per-target timeout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetFailure {
    pub input: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryRanking {
    pub disease: DiseaseId,
    pub candidates: Vec<GeneSymbol>,
    pub ranked: Vec<RankedTarget>,
    pub failures: Vec<TargetFailure>,
    pub generated_at: DateTime<Utc>,
}

pub struct Discovery {
    app: Arc<App>,
    settings: DiscoverySettings,
    cache: ResponseCache<DiscoveryRanking>,
}

impl Discovery {
    /// Rankings share the app's TTL.
    pub fn new(app: Arc<App>, settings: DiscoverySettings) -> Self {
        let ttl = app.cache().ttl();
        Self {
            app,
            settings,
            cache: ResponseCache::new(ttl),
        }
    }

    pub async fn rank(
        &self,
        disease: &DiseaseId,
        candidates: &[String],
    ) -> Result<Arc<DiscoveryRanking>, KiraError> {
        if candidates.is_empty() {
            return Err(KiraError::InvalidInput(
                "at least one candidate gene is required".to_string(),
            ));
        }

        // Rejected inputs belong to this call only; the cached ranking keeps
        // analysis failures alone.
        let (symbols, rejected) = normalize_candidates(candidates);
        let key = CacheKey::Disease(disease.clone());
        let ranking = match self.cache.get(&key) {
            Some(hit) if hit.candidates == symbols => {
                debug!(disease = %disease, "ranking served from cache");
                hit
            }
            _ => {
                let ranking = Arc::new(self.compute(disease, symbols).await);
                self.cache.set(&key, Arc::clone(&ranking));
                ranking
            }
        };
        Ok(with_rejected(ranking, rejected))
    }

    async fn compute(&self, disease: &DiseaseId, symbols: Vec<GeneSymbol>) -> DiscoveryRanking {
        let mut ranked = Vec::with_capacity(symbols.len());
        let mut failures = Vec::new();
        let batch_size = self.settings.batch_size.max(1);
        for (index, batch) in symbols.chunks(batch_size).enumerate() {
            debug!(disease = %disease, batch = index, size = batch.len(), "analyzing batch");
            let outcomes = join_all(batch.iter().map(|gene| self.analyze_one(gene))).await;
            for (gene, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(profile) => ranked.push(RankedTarget::from_profile(&profile)),
                    Err(error) => failures.push(TargetFailure {
                        input: gene.to_string(),
                        error,
                    }),
                }
            }
        }
        ranked.sort_by(compare_ranked);

        info!(
            disease = %disease,
            ranked = ranked.len(),
            failed = failures.len(),
            "discovery ranking complete"
        );
        DiscoveryRanking {
            disease: disease.clone(),
            candidates: symbols,
            ranked,
            failures,
            generated_at: Utc::now(),
        }
    }

    async fn analyze_one(&self, gene: &GeneSymbol) -> Result<Arc<TargetProfile>, String> {
        let timeout = self.settings.target_timeout;
        match tokio::time::timeout(timeout, self.app.analyze_symbol(gene)).await {
            Ok(Ok(profile)) => Ok(profile),
            Ok(Err(err)) => {
                warn!(gene = %gene, error = %err, "candidate analysis failed");
                Err(err.to_string())
            }
            Err(_) => {
                warn!(gene = %gene, timeout_ms = duration_ms(timeout), "candidate analysis timed out");
                Err(format!("analysis timed out after {} ms", duration_ms(timeout)))
            }
        }
    }
}

/// Normalizes and de-duplicates, keeping first-seen order. Invalid inputs are
/// reported as failures.
pub fn normalize_candidates(candidates: &[String]) -> (Vec<GeneSymbol>, Vec<TargetFailure>) {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    let mut failures = Vec::new();
    for input in candidates {
        match domain::normalize(input) {
            Ok(symbol) => {
                if seen.insert(symbol.clone()) {
                    symbols.push(symbol);
                }
            }
            Err(err) => failures.push(TargetFailure {
                input: input.clone(),
                error: err.to_string(),
            }),
        }
    }
    (symbols, failures)
}

/// Input rejections come first, then analysis failures.
fn with_rejected(
    ranking: Arc<DiscoveryRanking>,
    rejected: Vec<TargetFailure>,
) -> Arc<DiscoveryRanking> {
    if rejected.is_empty() {
        return ranking;
    }
    let mut merged = DiscoveryRanking::clone(&ranking);
    merged.failures.splice(0..0, rejected);
    Arc::new(merged)
}

fn compare_ranked(a: &RankedTarget, b: &RankedTarget) -> Ordering {
    b.overall
        .cmp(&a.overall)
        .then_with(|| a.gene.as_str().cmp(b.gene.as_str()))
}

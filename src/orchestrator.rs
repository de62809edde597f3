//! Fan-out/fan-in over the seven sources.
//!
//! Every fetch runs on the blocking pool under its own deadline. A failed,
//! panicked or timed-out fetch becomes a failure envelope in its slot and never
//! disturbs the others. `aggregate` returns only once all seven slots and both
//! cross-reference lookups have settled. A timed-out call is left running and
//! its late result is dropped with the detached task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::SourceTimeouts;
use crate::domain::{GeneSymbol, SourceKind};
use crate::error::KiraError;
use crate::profile::RawData;
use crate::source::{SourceClient, SourceRequest, SourceResult, duration_ms};
use crate::sources::{
    BioactivitySummary, ChemblHttpClient, ClinicalTrialsHttpClient, EncodeHttpClient,
    GeneticsEvidence, LiteratureSummary, OpenTargetsHttpClient, PreprintSummary,
    PreprintsHttpClient, PubmedHttpClient, RcsbHttpClient, RegulatorySummary, StructureSummary,
    TrialsSummary,
};
use crate::xref::{CrossRefResolver, CrossRefs, Resolution};

/// One adapter per slot.
#[derive(Clone)]
pub struct Sources {
    pub open_targets: Arc<dyn SourceClient<GeneticsEvidence>>,
    pub chembl: Arc<dyn SourceClient<BioactivitySummary>>,
    pub pubmed: Arc<dyn SourceClient<LiteratureSummary>>,
    pub clinical_trials: Arc<dyn SourceClient<TrialsSummary>>,
    pub preprints: Arc<dyn SourceClient<PreprintSummary>>,
    pub rcsb: Arc<dyn SourceClient<StructureSummary>>,
    pub encode: Arc<dyn SourceClient<RegulatorySummary>>,
}

impl Sources {
    /// Live HTTP adapters. Must be called outside an async context because the
    /// blocking clients own their own runtime.
    pub fn http(timeouts: &SourceTimeouts) -> Result<Self, KiraError> {
        Ok(Self {
            open_targets: Arc::new(OpenTargetsHttpClient::new(
                timeouts.get(SourceKind::OpenTargets),
            )?),
            chembl: Arc::new(ChemblHttpClient::new(timeouts.get(SourceKind::Chembl))?),
            pubmed: Arc::new(PubmedHttpClient::new(timeouts.get(SourceKind::Pubmed))?),
            clinical_trials: Arc::new(ClinicalTrialsHttpClient::new(
                timeouts.get(SourceKind::ClinicalTrials),
            )?),
            preprints: Arc::new(PreprintsHttpClient::new(
                timeouts.get(SourceKind::Preprints),
            )?),
            rcsb: Arc::new(RcsbHttpClient::new(timeouts.get(SourceKind::Rcsb))?),
            encode: Arc::new(EncodeHttpClient::new(timeouts.get(SourceKind::Encode))?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub raw: RawData,
    pub cross_refs: CrossRefs,
}

#[derive(Debug, Clone, Copy)]
enum Lookup {
    Genomics,
    Protein,
}

impl Lookup {
    fn name(&self) -> &'static str {
        match self {
            Lookup::Genomics => "Ensembl gene id",
            Lookup::Protein => "UniProt accession",
        }
    }
}

pub struct FetchOrchestrator {
    sources: Sources,
    resolver: Arc<dyn CrossRefResolver>,
    timeouts: SourceTimeouts,
    resolver_timeout: Duration,
}

impl FetchOrchestrator {
    pub fn new(
        sources: Sources,
        resolver: Arc<dyn CrossRefResolver>,
        timeouts: SourceTimeouts,
        resolver_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            resolver,
            timeouts,
            resolver_timeout,
        }
    }

    pub async fn aggregate(&self, gene: &GeneSymbol) -> Aggregation {
        let request = Arc::new(SourceRequest::new(gene.clone()));

        // The two Ensembl-keyed sources wait on the lookup; the other five and
        // the UniProt lookup start immediately.
        let genomics_branch = async {
            let ensembl = self.resolve(gene, Lookup::Genomics).await;
            let keyed = Arc::new(
                SourceRequest::new(gene.clone())
                    .with_genomics_id(ensembl.id().map(|id| id.to_string())),
            );
            let (open_targets, encode) = tokio::join!(
                self.fetch(SourceKind::OpenTargets, &self.sources.open_targets, &keyed),
                self.fetch(SourceKind::Encode, &self.sources.encode, &keyed),
            );
            (ensembl, open_targets, encode)
        };

        let ((ensembl, open_targets, encode), uniprot, chembl, pubmed, clinical_trials, preprints, rcsb) = tokio::join!(
            genomics_branch,
            self.resolve(gene, Lookup::Protein),
            self.fetch(SourceKind::Chembl, &self.sources.chembl, &request),
            self.fetch(SourceKind::Pubmed, &self.sources.pubmed, &request),
            self.fetch(SourceKind::ClinicalTrials, &self.sources.clinical_trials, &request),
            self.fetch(SourceKind::Preprints, &self.sources.preprints, &request),
            self.fetch(SourceKind::Rcsb, &self.sources.rcsb, &request),
        );

        Aggregation {
            raw: RawData {
                open_targets,
                chembl,
                pubmed,
                clinical_trials,
                preprints,
                rcsb,
                encode,
            },
            cross_refs: CrossRefs {
                ensembl_gene_id: ensembl,
                uniprot_accession: uniprot,
            },
        }
    }

    async fn fetch<T: Send + 'static>(
        &self,
        kind: SourceKind,
        client: &Arc<dyn SourceClient<T>>,
        request: &Arc<SourceRequest>,
    ) -> SourceResult<T> {
        let started = Instant::now();
        let provider = kind.display_name();

        let result = if kind.needs_genomics_id() && request.genomics_id.is_none() {
            Err(KiraError::MissingCrossReference {
                provider,
                id_kind: Lookup::Genomics.name(),
            })
        } else {
            let timeout = self.timeouts.get(kind);
            let client = Arc::clone(client);
            let task_request = Arc::clone(request);
            let handle = tokio::task::spawn_blocking(move || client.fetch(&task_request));
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_err)) => Err(KiraError::UpstreamHttp {
                    provider,
                    message: format!("adapter task aborted: {join_err}"),
                }),
                Err(_) => Err(KiraError::SourceTimeout {
                    provider,
                    timeout_ms: duration_ms(timeout),
                }),
            }
        };

        let elapsed = started.elapsed();
        let elapsed_ms = duration_ms(elapsed);
        match &result {
            Ok(_) => debug!(source = provider, gene = %request.gene, elapsed_ms, "source fetch succeeded"),
            Err(err) => warn!(
                source = provider,
                gene = %request.gene,
                elapsed_ms,
                error = %err,
                "source fetch failed; slot degraded"
            ),
        }
        SourceResult::from_result(kind, result, elapsed)
    }

    async fn resolve(&self, gene: &GeneSymbol, lookup: Lookup) -> Resolution {
        let resolver = Arc::clone(&self.resolver);
        let task_gene = gene.clone();
        let handle = tokio::task::spawn_blocking(move || match lookup {
            Lookup::Genomics => resolver.genomics_id(&task_gene),
            Lookup::Protein => resolver.protein_accession(&task_gene),
        });
        let resolution = match tokio::time::timeout(self.resolver_timeout, handle).await {
            Ok(Ok(result)) => Resolution::from_lookup(result),
            Ok(Err(join_err)) => Resolution::Unavailable(format!("lookup task aborted: {join_err}")),
            Err(_) => Resolution::Unavailable(format!(
                "{} lookup timed out after {} ms",
                lookup.name(),
                duration_ms(self.resolver_timeout)
            )),
        };
        if let Resolution::Unavailable(reason) = &resolution {
            warn!(gene = %gene, id_kind = lookup.name(), reason = %reason, "cross-reference unavailable");
        }
        resolution
    }
}

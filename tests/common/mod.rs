#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use kira_target_profiler::app::App;
use kira_target_profiler::config::{ResolvedConfig, SourceTimeouts};
use kira_target_profiler::domain::GeneSymbol;
use kira_target_profiler::error::KiraError;
use kira_target_profiler::orchestrator::Sources;
use kira_target_profiler::source::{SourceClient, SourceRequest};
use kira_target_profiler::sources::{
    BioactivitySummary, DiseaseAssociation, GeneticsEvidence, LiteratureSummary, PreprintSummary,
    RegulatorySummary, StructureSummary, TrialsSummary,
};
use kira_target_profiler::xref::CrossRefResolver;

pub struct MockSource<T> {
    response: Result<T, String>,
    delay: Duration,
    panics: bool,
    calls: AtomicUsize,
}

impl<T> MockSource<T> {
    pub fn ok(value: T) -> Self {
        Self {
            response: Ok(value),
            delay: Duration::ZERO,
            panics: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            delay: Duration::ZERO,
            panics: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// An adapter with a bug: every fetch panics.
    pub fn panicking(message: &str) -> Self {
        Self {
            panics: true,
            ..Self::failing(message)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + Sync> SourceClient<T> for MockSource<T> {
    fn fetch(&self, _request: &SourceRequest) -> Result<T, KiraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if self.panics {
            let message = self.response.as_ref().err().cloned().unwrap_or_default();
            panic!("{message}");
        }
        self.response.clone().map_err(|message| KiraError::UpstreamHttp {
            provider: "mock",
            message,
        })
    }
}

pub struct MockResolver {
    pub genomics: Result<Option<String>, String>,
    pub protein: Result<Option<String>, String>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn found() -> Self {
        Self {
            genomics: Ok(Some("ENSG00000146648".to_string())),
            protein: Ok(Some("P00533".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_genomics(mut self, genomics: Result<Option<String>, String>) -> Self {
        self.genomics = genomics;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, result: &Result<Option<String>, String>) -> Result<Option<String>, KiraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        result.clone().map_err(|message| KiraError::UpstreamHttp {
            provider: "Ensembl",
            message,
        })
    }
}

impl CrossRefResolver for MockResolver {
    fn genomics_id(&self, _gene: &GeneSymbol) -> Result<Option<String>, KiraError> {
        self.answer(&self.genomics)
    }

    fn protein_accession(&self, _gene: &GeneSymbol) -> Result<Option<String>, KiraError> {
        self.answer(&self.protein)
    }
}

pub fn genetics() -> GeneticsEvidence {
    GeneticsEvidence {
        association_count: 120,
        max_association_score: 0.82,
        top_associations: vec![DiseaseAssociation {
            disease_id: "EFO_0003060".to_string(),
            disease_name: "non-small cell lung carcinoma".to_string(),
            score: 0.82,
        }],
    }
}

pub fn bioactivity() -> BioactivitySummary {
    BioactivitySummary {
        target_chembl_id: Some("CHEMBL203".to_string()),
        compound_count: 900,
        potent_compound_count: 80,
        activity_count: 2_400,
        max_phase: 4,
    }
}

pub fn literature() -> LiteratureSummary {
    LiteratureSummary {
        total_publications: 15_000,
        recent_publications: 4_200,
    }
}

pub fn trials() -> TrialsSummary {
    TrialsSummary {
        total_trials: 80,
        active_trials: 12,
        max_phase: 4,
        sampled: 80,
    }
}

pub fn preprints() -> PreprintSummary {
    PreprintSummary {
        total_preprints: 300,
        recent_preprints: 40,
    }
}

pub fn structures() -> StructureSummary {
    StructureSummary {
        structure_count: 90,
        best_resolution: Some(1.8),
        ligand_bound_count: 15,
        sampled_entries: Vec::new(),
    }
}

pub fn regulatory() -> RegulatorySummary {
    RegulatorySummary {
        experiment_count: 150,
        regulatory_feature_count: 320,
    }
}

pub struct Harness {
    pub open_targets: Arc<MockSource<GeneticsEvidence>>,
    pub chembl: Arc<MockSource<BioactivitySummary>>,
    pub pubmed: Arc<MockSource<LiteratureSummary>>,
    pub clinical_trials: Arc<MockSource<TrialsSummary>>,
    pub preprints: Arc<MockSource<PreprintSummary>>,
    pub rcsb: Arc<MockSource<StructureSummary>>,
    pub encode: Arc<MockSource<RegulatorySummary>>,
    pub resolver: Arc<MockResolver>,
}

impl Harness {
    pub fn healthy() -> Self {
        Self {
            open_targets: Arc::new(MockSource::ok(genetics())),
            chembl: Arc::new(MockSource::ok(bioactivity())),
            pubmed: Arc::new(MockSource::ok(literature())),
            clinical_trials: Arc::new(MockSource::ok(trials())),
            preprints: Arc::new(MockSource::ok(preprints())),
            rcsb: Arc::new(MockSource::ok(structures())),
            encode: Arc::new(MockSource::ok(regulatory())),
            resolver: Arc::new(MockResolver::found()),
        }
    }

    pub fn all_failing() -> Self {
        Self {
            open_targets: Arc::new(MockSource::failing("graphql gateway down")),
            chembl: Arc::new(MockSource::failing("connection reset")),
            pubmed: Arc::new(MockSource::failing("rate limited")),
            clinical_trials: Arc::new(MockSource::failing("status 503")),
            preprints: Arc::new(MockSource::failing("malformed json")),
            rcsb: Arc::new(MockSource::failing("dns failure")),
            encode: Arc::new(MockSource::failing("tls handshake")),
            resolver: Arc::new(MockResolver::found()),
        }
    }

    pub fn sources(&self) -> Sources {
        Sources {
            open_targets: self.open_targets.clone(),
            chembl: self.chembl.clone(),
            pubmed: self.pubmed.clone(),
            clinical_trials: self.clinical_trials.clone(),
            preprints: self.preprints.clone(),
            rcsb: self.rcsb.clone(),
            encode: self.encode.clone(),
        }
    }

    pub fn app(&self) -> App {
        self.app_with_timeouts(SourceTimeouts::uniform(Duration::from_secs(5)))
    }

    pub fn app_with_timeouts(&self, timeouts: SourceTimeouts) -> App {
        let config = ResolvedConfig {
            source_timeouts: timeouts,
            resolver_timeout: Duration::from_secs(2),
            ..ResolvedConfig::default()
        };
        App::new(&config, self.sources(), self.resolver.clone())
    }

    pub fn source_calls(&self) -> usize {
        self.open_targets.calls()
            + self.chembl.calls()
            + self.pubmed.calls()
            + self.clinical_trials.calls()
            + self.preprints.calls()
            + self.rcsb.calls()
            + self.encode.calls()
    }
}

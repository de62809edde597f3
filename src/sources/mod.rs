//! Blocking adapters for the seven upstream evidence sources.

pub mod chembl;
pub mod clinical_trials;
pub mod encode;
pub mod http;
pub mod open_targets;
pub mod preprints;
pub mod pubmed;
pub mod rcsb;

pub use chembl::{BioactivitySummary, ChemblHttpClient};
pub use clinical_trials::{ClinicalTrialsHttpClient, TrialsSummary};
pub use encode::{EncodeHttpClient, RegulatorySummary};
pub use open_targets::{DiseaseAssociation, GeneticsEvidence, OpenTargetsHttpClient};
pub use preprints::{PreprintSummary, PreprintsHttpClient};
pub use pubmed::{LiteratureSummary, PubmedHttpClient};
pub use rcsb::{EntrySummary, RcsbHttpClient, StructureSummary};

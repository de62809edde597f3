use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::SourceKind;
use crate::error::KiraError;

pub const CONFIG_FILE_NAME: &str = "kira-tp.json";

const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_RESOLVER_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_BATCH_SIZE: usize = 8;
const DEFAULT_TARGET_TIMEOUT_MS: u64 = 60_000;
const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 120_000;
const MAX_BATCH_SIZE: usize = 32;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default)]
    pub resolver_timeout_ms: Option<u64>,
    #[serde(default)]
    pub timeouts_ms: SourceTimeoutsConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SourceTimeoutsConfig {
    #[serde(default)]
    pub open_targets: Option<u64>,
    #[serde(default)]
    pub chembl: Option<u64>,
    #[serde(default)]
    pub pubmed: Option<u64>,
    #[serde(default)]
    pub clinical_trials: Option<u64>,
    #[serde(default)]
    pub preprints: Option<u64>,
    #[serde(default)]
    pub rcsb: Option<u64>,
    #[serde(default)]
    pub encode: Option<u64>,
}

impl SourceTimeoutsConfig {
    fn get(&self, kind: SourceKind) -> Option<u64> {
        match kind {
            SourceKind::OpenTargets => self.open_targets,
            SourceKind::Chembl => self.chembl,
            SourceKind::Pubmed => self.pubmed,
            SourceKind::ClinicalTrials => self.clinical_trials,
            SourceKind::Preprints => self.preprints,
            SourceKind::Rcsb => self.rcsb,
            SourceKind::Encode => self.encode,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub target_timeout_ms: Option<u64>,
}

/// Per-source fetch deadlines, indexed by the fixed source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTimeouts([Duration; 7]);

impl SourceTimeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self([timeout; 7])
    }

    pub fn get(&self, kind: SourceKind) -> Duration {
        self.0[kind as usize]
    }

    pub fn with(mut self, kind: SourceKind, timeout: Duration) -> Self {
        self.0[kind as usize] = timeout;
        self
    }
}

impl Default for SourceTimeouts {
    fn default() -> Self {
        Self(SourceKind::ALL.map(|kind| Duration::from_millis(default_source_timeout_ms(kind))))
    }
}

pub fn default_source_timeout_ms(kind: SourceKind) -> u64 {
    match kind {
        SourceKind::OpenTargets => 15_000,
        SourceKind::Chembl => 20_000,
        SourceKind::Pubmed => 10_000,
        SourceKind::ClinicalTrials => 12_000,
        SourceKind::Preprints => 10_000,
        SourceKind::Rcsb => 12_000,
        SourceKind::Encode => 15_000,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub batch_size: usize,
    pub target_timeout: Duration,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            target_timeout: Duration::from_millis(DEFAULT_TARGET_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub cache_ttl: Duration,
    pub resolver_timeout: Duration,
    pub source_timeouts: SourceTimeouts,
    pub discovery: DiscoverySettings,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            resolver_timeout: Duration::from_millis(DEFAULT_RESOLVER_TIMEOUT_MS),
            source_timeouts: SourceTimeouts::default(),
            discovery: DiscoverySettings::default(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist. Without one, `./kira-tp.json` and then the
    /// user config directory are tried, falling back to defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KiraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => match Self::discover() {
                Some(found) => found,
                None => return Ok(ResolvedConfig::default()),
            },
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| KiraError::ConfigParse(err.to_string()))?;
        tracing::debug!(path = %config_path.display(), "loaded config");

        Self::resolve_config(config)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        ProjectDirs::from("", "", "kira-target-profiler")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KiraError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(KiraError::ConfigParse(format!(
                "unsupported schema_version {schema_version}"
            )));
        }

        let cache_ttl = Duration::from_secs(config.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS));
        let resolver_timeout = checked_timeout(
            "resolver_timeout_ms",
            config
                .resolver_timeout_ms
                .unwrap_or(DEFAULT_RESOLVER_TIMEOUT_MS),
        )?;

        let mut source_timeouts = SourceTimeouts::default();
        for kind in SourceKind::ALL {
            if let Some(ms) = config.timeouts_ms.get(kind) {
                let name = format!("timeouts_ms.{}", kind.config_key());
                source_timeouts = source_timeouts.with(kind, checked_timeout(&name, ms)?);
            }
        }

        let batch_size = config.discovery.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if !(1..=MAX_BATCH_SIZE).contains(&batch_size) {
            return Err(KiraError::ConfigParse(format!(
                "discovery.batch_size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
            )));
        }
        let target_timeout = checked_timeout(
            "discovery.target_timeout_ms",
            config
                .discovery
                .target_timeout_ms
                .unwrap_or(DEFAULT_TARGET_TIMEOUT_MS),
        )?;

        Ok(ResolvedConfig {
            schema_version,
            cache_ttl,
            resolver_timeout,
            source_timeouts,
            discovery: DiscoverySettings {
                batch_size,
                target_timeout,
            },
        })
    }
}

fn checked_timeout(name: &str, ms: u64) -> Result<Duration, KiraError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&ms) {
        return Err(KiraError::ConfigParse(format!(
            "{name} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms, got {ms}"
        )));
    }
    Ok(Duration::from_millis(ms))
}

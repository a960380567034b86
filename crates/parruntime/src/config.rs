use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Upper bound on worker threads; 0 means one per logical CPU.
    pub max_workers: usize,
    pub channel_buffer_multiplier: usize,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_workers: 0,
            channel_buffer_multiplier: 2,
            event_buffer_size: 1000,
        }
    }
}

impl RuntimeConfig {
    /// Layer defaults, an optional TOML or JSON file, then `GRAPHPAR_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(RuntimeConfig::default()));

        if let Some(path) = path {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        figment.merge(Env::prefixed("GRAPHPAR_")).extract()
    }

    /// Worker count for a run: the CPU count, capped by `max_workers`.
    pub fn worker_count(&self) -> usize {
        let cpus = num_cpus::get();
        let workers = if self.max_workers == 0 {
            cpus
        } else {
            cpus.min(self.max_workers)
        };
        workers.max(1)
    }
}

//! Stats settings

use crate::{ConfigError, SinkFactories};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_core::stats::{CountingEngine, StatEventQueue, Statistics};
use tally_core::Tick;
use tracing::info;

/// Output and scheduling settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    /// Sink URLs, one sink per entry.
    pub outputs: Vec<String>,
    /// Dump the whole tree every this many ticks.
    pub dump_period: Option<Tick>,
    /// Reset all stats after each periodic dump.
    pub reset_on_dump: bool,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            outputs: vec!["stats.txt".to_string()],
            dump_period: None,
            reset_on_dump: false,
        }
    }
}

impl StatsSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build every configured sink and hand it to the registry.
    ///
    /// Nothing is registered if any URL fails to build.
    pub fn apply<E: CountingEngine>(
        &self,
        factories: &SinkFactories,
        stats: &mut Statistics<E>,
    ) -> Result<(), ConfigError> {
        let sinks = self
            .outputs
            .iter()
            .map(|url| factories.build(url))
            .collect::<Result<Vec<_>, _>>()?;
        for (url, sink) in self.outputs.iter().zip(sinks) {
            info!(url = %url, "stats output configured");
            stats.configure(sink);
        }
        Ok(())
    }

    /// Queue the periodic dump, if one is configured.
    pub fn schedule(&self, queue: &mut StatEventQueue, now: Tick) {
        if let Some(period) = self.dump_period.filter(|period| *period > 0) {
            queue.schedule(true, self.reset_on_dump, now + period, Some(period));
        }
    }
}

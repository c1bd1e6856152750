//! Per-cohort online state registry.
//!
//! Owned by a [`super::ScoringEngine`]; there is no process-global state.
//! States are created lazily on first access. With a capacity configured,
//! the least recently used cohort is evicted when a new one would exceed
//! it. Recency is a logical tick, not a clock, so eviction order is
//! reproducible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use wx_common::{schema, CohortKey, SCHEMA_VERSION};
use wx_config::RegistryConfig;

use crate::decision::OnlineState;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot schema {found} is incompatible with {expected}")]
    IncompatibleSchema { found: String, expected: String },

    #[error("cohort {key}: dimension {actual} does not match registry dimension {expected}")]
    DimensionMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },
}

impl From<RegistryError> for wx_common::Error {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Io(e) => wx_common::Error::Io(e),
            RegistryError::Json(e) => wx_common::Error::Json(e),
            other => wx_common::Error::SnapshotIncompatible(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    state: OnlineState,
    last_used: u64,
}

/// Serialized registry contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub schema_version: String,
    pub dim: usize,
    pub lambda: f64,
    pub saved_at: DateTime<Utc>,
    pub cohorts: BTreeMap<CohortKey, OnlineState>,
}

#[derive(Debug, Clone)]
pub struct CohortRegistry {
    dim: usize,
    lambda: f64,
    max_cohorts: Option<usize>,
    entries: BTreeMap<CohortKey, Entry>,
    tick: u64,
}

impl CohortRegistry {
    pub fn new(dim: usize, lambda: f64, config: &RegistryConfig) -> Self {
        Self {
            dim,
            lambda,
            max_cohorts: config.max_cohorts.map(|n| n.max(1)),
            entries: BTreeMap::new(),
            tick: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CohortKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CohortKey> {
        self.entries.keys()
    }

    /// Look up without touching recency.
    pub fn peek(&self, key: &CohortKey) -> Option<&OnlineState> {
        self.entries.get(key).map(|e| &e.state)
    }

    /// Look up or lazily create the state for `key`.
    pub fn get_or_create(&mut self, key: &CohortKey) -> &mut OnlineState {
        self.tick += 1;
        let tick = self.tick;
        let (dim, lambda) = (self.dim, self.lambda);
        if !self.entries.contains_key(key) {
            self.make_room();
            info!(cohort = %key, dim, lambda, "cohort created");
        }
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry {
                state: OnlineState::new(dim, lambda),
                last_used: tick,
            });
        entry.last_used = tick;
        &mut entry.state
    }

    pub fn evict(&mut self, key: &CohortKey) -> Option<OnlineState> {
        let removed = self.entries.remove(key).map(|e| e.state);
        if removed.is_some() {
            info!(cohort = %key, "cohort evicted");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn make_room(&mut self) {
        let Some(cap) = self.max_cohorts else {
            return;
        };
        while self.entries.len() >= cap {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                    info!(cohort = %key, capacity = cap, "least recently used cohort evicted");
                }
                None => break,
            }
        }
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            schema_version: SCHEMA_VERSION.to_string(),
            dim: self.dim,
            lambda: self.lambda,
            saved_at: Utc::now(),
            cohorts: self
                .entries
                .iter()
                .map(|(k, e)| (k.clone(), e.state.clone()))
                .collect(),
        }
    }

    /// Rebuild from a snapshot. Recency restarts in key order.
    pub fn restore(
        snapshot: RegistrySnapshot,
        config: &RegistryConfig,
    ) -> Result<Self, RegistryError> {
        if !schema::is_compatible(&snapshot.schema_version) {
            return Err(RegistryError::IncompatibleSchema {
                found: snapshot.schema_version,
                expected: SCHEMA_VERSION.to_string(),
            });
        }
        let mut registry = Self::new(snapshot.dim, snapshot.lambda, config);
        for (key, state) in snapshot.cohorts {
            if state.dim() != snapshot.dim {
                return Err(RegistryError::DimensionMismatch {
                    key: key.to_string(),
                    expected: snapshot.dim,
                    actual: state.dim(),
                });
            }
            registry.tick += 1;
            registry.make_room();
            registry.entries.insert(
                key,
                Entry {
                    state,
                    last_used: registry.tick,
                },
            );
        }
        debug!(cohorts = registry.len(), "registry restored");
        Ok(registry)
    }

    /// Write a JSON snapshot atomically.
    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(&self.snapshot())?;
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&json)?;
            file.flush()?;
        }
        fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), cohorts = self.len(), "registry saved");
        Ok(())
    }

    pub fn load(path: &Path, config: &RegistryConfig) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path)?;
        let snapshot: RegistrySnapshot = serde_json::from_str(&contents)?;
        Self::restore(snapshot, config)
    }
}

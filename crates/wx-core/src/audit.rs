//! Bounded, newest-first log of applied budget changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub category: String,
    pub action: String,
    pub multiplier: f64,
    #[serde(default)]
    pub staged: Vec<f64>,
    pub confidence: f64,
}

impl AuditEntry {
    pub fn new(
        category: impl Into<String>,
        action: impl Into<String>,
        multiplier: f64,
        staged: Vec<f64>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: Utc::now(),
            category: category.into(),
            action: action.into(),
            multiplier,
            staged,
            confidence,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    capacity: usize,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an entry, dropping the oldest beyond capacity.
    pub fn record(&mut self, entry: AuditEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(100)
    }
}

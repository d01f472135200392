//! Append-only audit trail of generation attempts.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::TaskKind;

/// Result of one provider attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptOutcome {
    Success,
    QuotaExceeded,
    TransientError,
    /// Also used for the local fallback, with `fallback` set.
    InvalidResponse,
}

/// One generation attempt. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementAttempt {
    /// Product the attempt was for.
    pub identifier: String,
    /// Field (or research step) being generated.
    pub target: TaskKind,
    pub provider_id: String,
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether the value came from the local fallback generator.
    #[serde(default)]
    pub fallback: bool,
    pub timestamp: DateTime<Utc>,
}

impl EnhancementAttempt {
    pub fn new(
        identifier: impl Into<String>,
        target: TaskKind,
        provider_id: impl Into<String>,
        outcome: AttemptOutcome,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            target,
            provider_id: provider_id.into(),
            outcome,
            value: None,
            fallback: false,
            timestamp: Utc::now(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

/// Thread-safe, append-only list of attempts shared by a batch run.
///
/// Clones share the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Arc<Mutex<Vec<EnhancementAttempt>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attempt.
    pub fn record(&self, attempt: EnhancementAttempt) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(attempt);
    }

    /// Copy of every attempt recorded so far, in append order.
    pub fn snapshot(&self) -> Vec<EnhancementAttempt> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Attempts recorded for one product.
    pub fn for_record(&self, identifier: &str) -> Vec<EnhancementAttempt> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|a| a.identifier == identifier)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

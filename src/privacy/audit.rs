//! Violation audit trail
//!
//! The validator hands one [`AuditRecord`] per violation to an
//! [`AuditSink`] when `log_violations` is enabled. Sinks are best-effort:
//! a failing sink is logged and never changes a validation result.

use crate::error::{Error, Result};
use crate::privacy::types::{Severity, Violation, ViolationField, ViolationKind};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// One audited violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub field: ViolationField,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(violation: &Violation, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: violation.kind,
            field: violation.field,
            severity: violation.severity,
            timestamp,
        }
    }
}

/// Destination for audit records. Must tolerate concurrent appends.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<()>;
}

/// Writes audit records as structured `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        tracing::warn!(
            target: "privacy_guard::audit",
            id = %record.id,
            kind = %record.kind,
            field = %record.field,
            severity = %record.severity,
            timestamp = %record.timestamp.to_rfc3339(),
            "Privacy violation detected"
        );
        Ok(())
    }
}

/// Snapshot of the audit log counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total_recorded: u64,
    pub buffered: usize,
    pub by_severity: SeverityCounts,
}

/// Buffered records per severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Capacity-limited in-memory audit log; the oldest records are dropped
/// once the log is full.
pub struct AuditLog {
    records: Mutex<VecDeque<AuditRecord>>,
    capacity: usize,
    total: AtomicU64,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            total: AtomicU64::new(0),
        }
    }

    /// Most recent records, newest first
    pub fn recent(&self, limit: usize) -> Vec<AuditRecord> {
        self.records.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Records for one severity, newest first
    pub fn by_severity(&self, severity: Severity, limit: usize) -> Vec<AuditRecord> {
        self.records
            .lock()
            .iter()
            .rev()
            .filter(|r| r.severity == severity)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Counts taken under a single lock, so they always agree
    pub fn stats(&self) -> AuditStats {
        let records = self.records.lock();
        let mut by_severity = SeverityCounts::default();
        for record in records.iter() {
            match record.severity {
                Severity::Low => by_severity.low += 1,
                Severity::Medium => by_severity.medium += 1,
                Severity::High => by_severity.high += 1,
            }
        }
        AuditStats {
            total_recorded: self.total.load(Ordering::Relaxed),
            buffered: records.len(),
            by_severity,
        }
    }

    /// Number of buffered records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Records ever appended, including evicted ones
    pub fn total_recorded(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl AuditSink for AuditLog {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::Audit("audit log has zero capacity".to_string()));
        }
        let mut records = self.records.lock();
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        self.total.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Forwards every record to several sinks.
///
/// Every sink is tried; the first failure is reported.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl AuditSink for FanoutSink {
    fn record(&self, record: &AuditRecord) -> Result<()> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record(record) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

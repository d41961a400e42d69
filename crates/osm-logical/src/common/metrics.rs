//! # Emitter metrics
//!
//! Lock-free counters for every outcome the translator and framer can
//! reach. Each increment is mirrored to the `metrics` crate facade, so a
//! Prometheus (or any other) exporter installed by the host picks them up
//! without further wiring.
//!
//! ```ignore
//! use osm_logical::common::TranslatorMetrics;
//!
//! let metrics = TranslatorMetrics::new();
//! metrics.record_new(EntityKind::Node);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.new_events, 1);
//! ```

use crate::common::{ChangeAction, EntityKind};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for translation and framing outcomes.
#[derive(Debug, Default)]
pub struct TranslatorMetrics {
    /// Change events handed to the translator
    changes_seen: AtomicU64,
    /// NEW lines produced
    new_events: AtomicU64,
    /// REDACT lines produced
    redact_events: AtomicU64,
    /// Changes on tables that are not nodes/ways/relations
    untracked_skipped: AtomicU64,
    /// Changes on tracked tables without a usable id or version
    missing_fields: AtomicU64,
    /// Deletes and updates without a redaction id
    unhandled_skipped: AtomicU64,
    /// BEGIN lines written
    transactions_begun: AtomicU64,
    /// COMMIT lines written
    transactions_committed: AtomicU64,
}

impl TranslatorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_change(&self) {
        self.changes_seen.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("osm_logical_changes_total").increment(1);
    }

    #[inline]
    pub fn record_new(&self, kind: EntityKind) {
        self.new_events.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(
            "osm_logical_events_total",
            "event" => "new",
            "table" => kind.table_name()
        )
        .increment(1);
    }

    #[inline]
    pub fn record_redact(&self, kind: EntityKind) {
        self.redact_events.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(
            "osm_logical_events_total",
            "event" => "redact",
            "table" => kind.table_name()
        )
        .increment(1);
    }

    #[inline]
    pub fn record_untracked(&self) {
        self.untracked_skipped.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("osm_logical_skipped_total", "reason" => "untracked_table").increment(1);
    }

    /// Record a tracked row whose id or version could not be resolved.
    pub fn record_missing_field(&self, kind: EntityKind) {
        self.missing_fields.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(
            "osm_logical_missing_fields_total",
            "table" => kind.table_name()
        )
        .increment(1);
    }

    #[inline]
    pub fn record_unhandled(&self, action: ChangeAction) {
        self.unhandled_skipped.fetch_add(1, Ordering::Relaxed);
        let action = match action {
            ChangeAction::Insert => "insert",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
        };
        metrics::counter!(
            "osm_logical_skipped_total",
            "reason" => "unhandled_action",
            "action" => action
        )
        .increment(1);
    }

    pub fn record_begin(&self) {
        self.transactions_begun.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("osm_logical_transactions_total", "phase" => "begin").increment(1);
    }

    pub fn record_commit(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("osm_logical_transactions_total", "phase" => "commit").increment(1);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            changes_seen: self.changes_seen.load(Ordering::Relaxed),
            new_events: self.new_events.load(Ordering::Relaxed),
            redact_events: self.redact_events.load(Ordering::Relaxed),
            untracked_skipped: self.untracked_skipped.load(Ordering::Relaxed),
            missing_fields: self.missing_fields.load(Ordering::Relaxed),
            unhandled_skipped: self.unhandled_skipped.load(Ordering::Relaxed),
            transactions_begun: self.transactions_begun.load(Ordering::Relaxed),
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`TranslatorMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub changes_seen: u64,
    pub new_events: u64,
    pub redact_events: u64,
    pub untracked_skipped: u64,
    pub missing_fields: u64,
    pub unhandled_skipped: u64,
    pub transactions_begun: u64,
    pub transactions_committed: u64,
}

impl MetricsSnapshot {
    /// Total protocol lines describing row changes.
    pub fn emitted(&self) -> u64 {
        self.new_events + self.redact_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = TranslatorMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_outcomes() {
        let metrics = TranslatorMetrics::new();
        metrics.record_change();
        metrics.record_change();
        metrics.record_change();
        metrics.record_new(EntityKind::Node);
        metrics.record_redact(EntityKind::Way);
        metrics.record_missing_field(EntityKind::Relation);
        metrics.record_untracked();
        metrics.record_unhandled(ChangeAction::Delete);
        metrics.record_begin();
        metrics.record_commit();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.changes_seen, 3);
        assert_eq!(snapshot.new_events, 1);
        assert_eq!(snapshot.redact_events, 1);
        assert_eq!(snapshot.emitted(), 2);
        assert_eq!(snapshot.missing_fields, 1);
        assert_eq!(snapshot.untracked_skipped, 1);
        assert_eq!(snapshot.unhandled_skipped, 1);
        assert_eq!(snapshot.transactions_begun, 1);
        assert_eq!(snapshot.transactions_committed, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = TranslatorMetrics::new();
        metrics.record_new(EntityKind::Node);
        let json = serde_json::to_string(&metrics.snapshot()).unwrap();
        assert!(json.contains("\"new_events\":1"));
    }
}

//! # Change translation
//!
//! Decides which row changes become protocol lines.
//!
//! | table                 | action | id & version | redaction_id | output   |
//! |-----------------------|--------|--------------|--------------|----------|
//! | not nodes/ways/relations | any | -            | -            | none     |
//! | tracked               | any    | missing/null | -            | none (warned) |
//! | tracked               | INSERT | present      | -            | `NEW`    |
//! | tracked               | UPDATE | present      | present      | `REDACT` |
//! | tracked               | UPDATE | present      | not a u64    | none (warned) |
//! | tracked               | UPDATE | present      | missing/null | none     |
//! | tracked               | DELETE | -            | -            | none     |
//!
//! The protocol only records the creation of an entity version and its later
//! redaction; other updates and deletes have no line of their own.

use crate::common::{
    lookup, ChangeAction, ChangeEvent, EntityKind, ProtocolEvent, Row, RowSchema,
    TranslatorMetrics,
};
use std::sync::Arc;
use tracing::{debug, trace, warn};

const VERSION_COLUMN: &str = "version";
const REDACTION_COLUMN: &str = "redaction_id";

/// Translates row changes into protocol events.
///
/// Holds no per-table or per-transaction state; every call stands alone.
#[derive(Debug, Clone)]
pub struct ChangeTranslator {
    metrics: Arc<TranslatorMetrics>,
    warn_on_missing_fields: bool,
}

impl Default for ChangeTranslator {
    fn default() -> Self {
        Self::new(Arc::new(TranslatorMetrics::new()))
    }
}

impl ChangeTranslator {
    pub fn new(metrics: Arc<TranslatorMetrics>) -> Self {
        Self {
            metrics,
            warn_on_missing_fields: true,
        }
    }

    /// Log dropped rows at `debug` instead of `warn` when disabled.
    pub fn with_missing_field_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_missing_fields = enabled;
        self
    }

    pub fn metrics(&self) -> &Arc<TranslatorMetrics> {
        &self.metrics
    }

    /// Translate one change event.
    pub fn translate(&self, event: &ChangeEvent<'_>) -> Option<ProtocolEvent> {
        self.metrics.record_change();

        let Some(kind) = EntityKind::classify(event.table) else {
            trace!(table = event.table, "Ignoring change on untracked table");
            self.metrics.record_untracked();
            return None;
        };

        // Deletes never produce output, whether or not the host shipped a row.
        if event.action == ChangeAction::Delete {
            self.metrics.record_unhandled(event.action);
            return None;
        }

        let Some(row) = event.new_row else {
            self.report_missing(kind, event.action, "no new row image");
            return None;
        };

        let Some(id) = resolve_u64(row, event.schema, kind.id_column()) else {
            self.report_missing(kind, event.action, kind.id_column());
            return None;
        };
        let Some(version) = resolve_u64(row, event.schema, VERSION_COLUMN) else {
            self.report_missing(kind, event.action, VERSION_COLUMN);
            return None;
        };

        match event.action {
            ChangeAction::Insert => {
                self.metrics.record_new(kind);
                Some(ProtocolEvent::New {
                    table: kind,
                    id,
                    version,
                })
            }
            ChangeAction::Update => match lookup(row, event.schema, REDACTION_COLUMN) {
                Some(value) if !value.is_null() => {
                    let Some(redaction_id) = value.as_u64() else {
                        self.report_missing(kind, event.action, REDACTION_COLUMN);
                        return None;
                    };
                    self.metrics.record_redact(kind);
                    Some(ProtocolEvent::Redact {
                        table: kind,
                        id,
                        version,
                        redaction_id,
                    })
                }
                _ => {
                    self.metrics.record_unhandled(event.action);
                    None
                }
            },
            ChangeAction::Delete => None,
        }
    }

    fn report_missing(&self, kind: EntityKind, action: ChangeAction, column: &str) {
        self.metrics.record_missing_field(kind);
        if self.warn_on_missing_fields {
            warn!(
                table = kind.table_name(),
                %action,
                column,
                "Dropping change: required column missing, null or not a u64"
            );
        } else {
            debug!(
                table = kind.table_name(),
                %action,
                column,
                "Dropping change: required column missing, null or not a u64"
            );
        }
    }
}

/// Resolve a column as u64; absent, NULL and unusable values are all `None`.
fn resolve_u64(row: &Row, schema: &RowSchema, name: &str) -> Option<u64> {
    lookup(row, schema, name).and_then(|v| v.as_u64())
}

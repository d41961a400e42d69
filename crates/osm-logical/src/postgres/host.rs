//! pgoutput replay host
//!
//! Drives an [`OutputPlugin`] from decoded pgoutput messages, playing the
//! part the PostgreSQL walsender plays for an in-server output plugin:
//!
//! ```text
//! Relation ──▶ relation map (host state)
//! Begin    ──▶ plugin.begin
//! Insert   ──▶ plugin.change(INSERT, new tuple)
//! Update   ──▶ plugin.change(UPDATE, new tuple)
//! Delete   ──▶ plugin.change(DELETE)
//! Commit   ──▶ plugin.commit
//! ```
//!
//! Truncate, Origin and Type messages have no counterpart in the plugin
//! callbacks and are skipped. Delete is forwarded without a row image.

use super::protocol::{PgOutputDecoder, RelationBody, ReplicationMessage, Tuple, TupleData};
use crate::common::{
    ChangeAction, ChangeEvent, OutputPlugin, Result, Row, RowSchema, TransactionContext, Value,
};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

// pg_type OIDs of the integer types decoded from binary tuples
const INT8_OID: u32 = 20;
const INT2_OID: u32 = 21;
const INT4_OID: u32 = 23;

/// A table as announced by a Relation message.
#[derive(Debug, Clone)]
struct RelationEntry {
    namespace: String,
    name: String,
    schema: RowSchema,
    type_ids: Vec<u32>,
}

impl From<RelationBody> for RelationEntry {
    fn from(rel: RelationBody) -> Self {
        let schema = RowSchema::from_names(rel.columns.iter().map(|c| c.name.clone()));
        let type_ids = rel.columns.iter().map(|c| c.type_id).collect();
        Self {
            namespace: rel.namespace,
            name: rel.name,
            schema,
            type_ids,
        }
    }
}

impl RelationEntry {
    fn row(&self, tuple: &Tuple) -> Row {
        tuple
            .0
            .iter()
            .enumerate()
            .map(|(i, data)| tuple_value(data, self.type_ids.get(i).copied()))
            .collect()
    }
}

fn tuple_value(data: &TupleData, type_id: Option<u32>) -> Value {
    match data {
        // Unchanged TOAST values are never integers; treat them as absent.
        TupleData::Null | TupleData::Toast => Value::Null,
        TupleData::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        TupleData::Binary(bytes) => match (type_id, bytes.len()) {
            (Some(INT8_OID), 8) => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Value::Int(i64::from_be_bytes(raw))
            }
            (Some(INT4_OID), 4) => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                Value::Int(i32::from_be_bytes(raw).into())
            }
            (Some(INT2_OID), 2) => {
                let mut raw = [0u8; 2];
                raw.copy_from_slice(bytes);
                Value::Int(i16::from_be_bytes(raw).into())
            }
            _ => Value::Null,
        },
    }
}

/// Feeds pgoutput messages to an output plugin.
pub struct PgOutputHost<P: OutputPlugin> {
    plugin: P,
    relations: HashMap<u32, RelationEntry>,
    current: Option<TransactionContext>,
    messages: u64,
}

impl<P: OutputPlugin> PgOutputHost<P> {
    pub fn new(plugin: P) -> Self {
        Self {
            plugin,
            relations: HashMap::new(),
            current: None,
            messages: 0,
        }
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn into_plugin(self) -> P {
        self.plugin
    }

    /// Number of messages handled so far.
    pub fn messages(&self) -> u64 {
        self.messages
    }

    /// Name of a known relation, as `namespace.name`.
    pub fn relation_name(&self, relation_id: u32) -> Option<String> {
        self.relations
            .get(&relation_id)
            .map(|r| format!("{}.{}", r.namespace, r.name))
    }

    /// Decode one raw pgoutput message and handle it.
    pub fn handle_bytes(&mut self, mut data: Bytes) -> Result<()> {
        let msg = PgOutputDecoder::decode(&mut data)?;
        self.handle(msg)
    }

    /// Handle one decoded message.
    pub fn handle(&mut self, msg: ReplicationMessage) -> Result<()> {
        self.messages += 1;
        match msg {
            ReplicationMessage::Relation(rel) => {
                debug!(
                    relation_id = rel.id,
                    table = %rel.name,
                    columns = rel.columns.len(),
                    "Registered relation"
                );
                self.relations.insert(rel.id, RelationEntry::from(rel));
                Ok(())
            }
            ReplicationMessage::Begin { xid, final_lsn } => {
                let txn = TransactionContext::new(xid, final_lsn);
                self.current = Some(txn);
                self.plugin.begin(&txn)
            }
            ReplicationMessage::Commit { commit_lsn } => {
                let txn = self.current.take().unwrap_or_default();
                self.plugin.commit(&txn, commit_lsn)
            }
            ReplicationMessage::Insert {
                relation_id,
                new_tuple,
            } => self.change(relation_id, ChangeAction::Insert, Some(&new_tuple)),
            ReplicationMessage::Update {
                relation_id,
                new_tuple,
            } => self.change(relation_id, ChangeAction::Update, Some(&new_tuple)),
            ReplicationMessage::Delete { relation_id } => {
                self.change(relation_id, ChangeAction::Delete, None)
            }
            ReplicationMessage::Truncate { relation_ids } => {
                debug!(relations = ?relation_ids, "Skipping TRUNCATE");
                Ok(())
            }
            ReplicationMessage::Skipped(tag) => {
                trace!(tag = %(tag as char), "Skipping message");
                Ok(())
            }
        }
    }

    fn change(
        &mut self,
        relation_id: u32,
        action: ChangeAction,
        tuple: Option<&Tuple>,
    ) -> Result<()> {
        let Some(rel) = self.relations.get(&relation_id) else {
            warn!(relation_id, %action, "Change for unknown relation, skipping");
            return Ok(());
        };

        let row = tuple.map(|t| rel.row(t));
        let event = ChangeEvent {
            table: &rel.name,
            schema: &rel.schema,
            new_row: row.as_ref(),
            action,
        };
        let txn = self.current.unwrap_or_default();
        self.plugin.change(&txn, &event)
    }
}

//! pgoutput logical replication messages
//!
//! Only the parts of each message the replay host acts on are kept; the
//! decoder still consumes every field so the stream stays aligned.

use bytes::Bytes;

/// A decoded pgoutput message.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationMessage {
    Begin { xid: u32, final_lsn: u64 },
    Commit { commit_lsn: u64 },
    Relation(RelationBody),
    Insert { relation_id: u32, new_tuple: Tuple },
    /// The old key or old row image, if shipped, is skipped.
    Update { relation_id: u32, new_tuple: Tuple },
    Delete { relation_id: u32 },
    Truncate { relation_ids: Vec<u32> },
    /// Origin (`O`) and Type (`Y`) messages, identified by their tag.
    Skipped(u8),
}

/// Table definition sent before the first change on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationBody {
    pub id: u32,
    pub namespace: String,
    pub name: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// pg_type OID
    pub type_id: u32,
}

/// Row image, one entry per column in relation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple(pub Vec<TupleData>);

#[derive(Debug, Clone, PartialEq)]
pub enum TupleData {
    Null,
    /// Unchanged TOAST value, not shipped
    Toast,
    Text(Bytes),
    /// Sent when the subscription asks for `binary`
    Binary(Bytes),
}

//! Change and protocol events
//!
//! A [`ChangeEvent`] is what the host delivers for one row mutation; it
//! borrows the host's table name, schema and row and lives only for the
//! duration of one translation call.
//!
//! A [`ProtocolEvent`] is what goes out on the wire. Each one renders as a
//! single line:
//!
//! ```text
//! BEGIN
//! NEW <table> <id> <version>
//! REDACT <table> <id> <version> <redaction_id>
//! COMMIT
//! ```
//!
//! `Display` produces the line without its terminating newline and
//! `FromStr` is the matching consumer-side tokenizer.

use crate::common::{EmitError, EntityKind, Row, RowSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row-level operation reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeAction {
    /// Row inserted
    Insert,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Insert => write!(f, "INSERT"),
            ChangeAction::Update => write!(f, "UPDATE"),
            ChangeAction::Delete => write!(f, "DELETE"),
        }
    }
}

/// One row mutation, borrowed from the host.
#[derive(Debug, Clone, Copy)]
pub struct ChangeEvent<'a> {
    /// Name of the table the row belongs to
    pub table: &'a str,
    /// Shape of `new_row`
    pub schema: &'a RowSchema,
    /// Row image after the change (absent for most deletes)
    pub new_row: Option<&'a Row>,
    /// Operation type
    pub action: ChangeAction,
}

impl<'a> ChangeEvent<'a> {
    /// Create a new INSERT event
    pub fn insert(table: &'a str, schema: &'a RowSchema, row: &'a Row) -> Self {
        Self {
            table,
            schema,
            new_row: Some(row),
            action: ChangeAction::Insert,
        }
    }

    /// Create a new UPDATE event
    pub fn update(table: &'a str, schema: &'a RowSchema, row: &'a Row) -> Self {
        Self {
            table,
            schema,
            new_row: Some(row),
            action: ChangeAction::Update,
        }
    }

    /// Create a new DELETE event
    pub fn delete(table: &'a str, schema: &'a RowSchema) -> Self {
        Self {
            table,
            schema,
            new_row: None,
            action: ChangeAction::Delete,
        }
    }
}

/// A line of the outbound protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    /// Transaction start
    Begin,
    /// A new entity version was inserted
    New {
        table: EntityKind,
        id: u64,
        version: u64,
    },
    /// An existing entity version was redacted
    Redact {
        table: EntityKind,
        id: u64,
        version: u64,
        redaction_id: u64,
    },
    /// Transaction end
    Commit,
}

impl ProtocolEvent {
    /// Leading token of the line.
    pub fn keyword(&self) -> &'static str {
        match self {
            ProtocolEvent::Begin => "BEGIN",
            ProtocolEvent::New { .. } => "NEW",
            ProtocolEvent::Redact { .. } => "REDACT",
            ProtocolEvent::Commit => "COMMIT",
        }
    }

    /// Entity kind carried by NEW and REDACT.
    pub fn table(&self) -> Option<EntityKind> {
        match self {
            ProtocolEvent::New { table, .. } | ProtocolEvent::Redact { table, .. } => Some(*table),
            ProtocolEvent::Begin | ProtocolEvent::Commit => None,
        }
    }

    /// Check if this is a BEGIN or COMMIT line
    pub fn is_boundary(&self) -> bool {
        matches!(self, ProtocolEvent::Begin | ProtocolEvent::Commit)
    }
}

impl fmt::Display for ProtocolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolEvent::Begin | ProtocolEvent::Commit => f.write_str(self.keyword()),
            ProtocolEvent::New { table, id, version } => {
                write!(f, "NEW {} {} {}", table, id, version)
            }
            ProtocolEvent::Redact {
                table,
                id,
                version,
                redaction_id,
            } => write!(f, "REDACT {} {} {} {}", table, id, version, redaction_id),
        }
    }
}

impl FromStr for ProtocolEvent {
    type Err = EmitError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let tokens: Vec<&str> = line.split(' ').collect();

        match tokens.as_slice() {
            ["BEGIN"] => Ok(ProtocolEvent::Begin),
            ["COMMIT"] => Ok(ProtocolEvent::Commit),
            ["NEW", table, id, version] => Ok(ProtocolEvent::New {
                table: parse_table(table)?,
                id: parse_u64(id)?,
                version: parse_u64(version)?,
            }),
            ["REDACT", table, id, version, redaction_id] => Ok(ProtocolEvent::Redact {
                table: parse_table(table)?,
                id: parse_u64(id)?,
                version: parse_u64(version)?,
                redaction_id: parse_u64(redaction_id)?,
            }),
            _ => Err(EmitError::parse(format!("unrecognised line: {:?}", line))),
        }
    }
}

fn parse_table(token: &str) -> Result<EntityKind, EmitError> {
    EntityKind::classify(token)
        .ok_or_else(|| EmitError::parse(format!("unknown table: {:?}", token)))
}

// Only canonical renderings are accepted: no sign, no leading zeros.
fn parse_u64(token: &str) -> Result<u64, EmitError> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if !canonical {
        return Err(EmitError::parse(format!("invalid integer: {:?}", token)));
    }
    token
        .parse()
        .map_err(|e| EmitError::parse(format!("invalid integer {:?}: {}", token, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lines() {
        assert_eq!(ProtocolEvent::Begin.to_string(), "BEGIN");
        assert_eq!(ProtocolEvent::Commit.to_string(), "COMMIT");
        assert_eq!(
            ProtocolEvent::New {
                table: EntityKind::Node,
                id: 5,
                version: 1
            }
            .to_string(),
            "NEW nodes 5 1"
        );
        assert_eq!(
            ProtocolEvent::Redact {
                table: EntityKind::Way,
                id: 7,
                version: 2,
                redaction_id: 9
            }
            .to_string(),
            "REDACT ways 7 2 9"
        );
    }

    #[test]
    fn test_display_max_values() {
        let event = ProtocolEvent::Redact {
            table: EntityKind::Relation,
            id: u64::MAX,
            version: u64::MAX,
            redaction_id: 0,
        };
        assert_eq!(
            event.to_string(),
            "REDACT relations 18446744073709551615 18446744073709551615 0"
        );
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!("BEGIN".parse::<ProtocolEvent>().unwrap(), ProtocolEvent::Begin);
        assert_eq!(
            "COMMIT\n".parse::<ProtocolEvent>().unwrap(),
            ProtocolEvent::Commit
        );
        assert_eq!(
            "NEW relations 3 4".parse::<ProtocolEvent>().unwrap(),
            ProtocolEvent::New {
                table: EntityKind::Relation,
                id: 3,
                version: 4
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for line in [
            "",
            "BEGIN ",
            "begin",
            "NEW nodes 1",
            "NEW nodes_archive 1 2",
            "NEW nodes -1 2",
            "NEW nodes 01 2",
            "NEW nodes +1 2",
            "NEW  nodes 1 2",
            "REDACT ways 1 2",
            "REDACT ways 1 2 3 4",
            "DELETE nodes 1 2",
            "NEW nodes 18446744073709551616 1",
        ] {
            assert!(line.parse::<ProtocolEvent>().is_err(), "accepted {:?}", line);
        }
    }

    #[test]
    fn test_keyword_and_table() {
        let new = ProtocolEvent::New {
            table: EntityKind::Way,
            id: 1,
            version: 1,
        };
        assert_eq!(new.keyword(), "NEW");
        assert_eq!(new.table(), Some(EntityKind::Way));
        assert!(!new.is_boundary());
        assert!(ProtocolEvent::Begin.is_boundary());
        assert_eq!(ProtocolEvent::Commit.table(), None);
    }

    #[test]
    fn test_change_event_constructors() {
        let schema = RowSchema::from_names(["node_id", "version"]);
        let row = Row::default();
        assert_eq!(
            ChangeEvent::insert("nodes", &schema, &row).action,
            ChangeAction::Insert
        );
        assert_eq!(
            ChangeEvent::update("nodes", &schema, &row).action,
            ChangeAction::Update
        );
        let delete = ChangeEvent::delete("nodes", &schema);
        assert_eq!(delete.action, ChangeAction::Delete);
        assert!(delete.new_row.is_none());
    }
}

//! Entity classification
//!
//! Maps the name of the table a row change belongs to onto one of the
//! three versioned OpenStreetMap entity kinds. Anything else is untracked.
//!
//! Matching is exact: `nodes_archive` or `way` are not `nodes`/`ways`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// OpenStreetMap entity kind tracked for change capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Row of the `nodes` table
    Node,
    /// Row of the `ways` table
    Way,
    /// Row of the `relations` table
    Relation,
}

impl EntityKind {
    /// All tracked kinds, in classification order.
    pub const ALL: [EntityKind; 3] = [EntityKind::Node, EntityKind::Way, EntityKind::Relation];

    /// Classify a table name.
    ///
    /// Returns `None` for any table that is not exactly one of
    /// `nodes`, `ways` or `relations`.
    pub fn classify(table: &str) -> Option<Self> {
        match table {
            "nodes" => Some(Self::Node),
            "ways" => Some(Self::Way),
            "relations" => Some(Self::Relation),
            _ => None,
        }
    }

    /// Table holding this kind's versions.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Node => "nodes",
            Self::Way => "ways",
            Self::Relation => "relations",
        }
    }

    /// Column carrying the entity identifier.
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::Node => "node_id",
            Self::Way => "way_id",
            Self::Relation => "relation_id",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tracked_tables() {
        assert_eq!(EntityKind::classify("nodes"), Some(EntityKind::Node));
        assert_eq!(EntityKind::classify("ways"), Some(EntityKind::Way));
        assert_eq!(
            EntityKind::classify("relations"),
            Some(EntityKind::Relation)
        );
    }

    #[test]
    fn test_classify_rejects_shared_prefix() {
        assert_eq!(EntityKind::classify("nodes_archive"), None);
        assert_eq!(EntityKind::classify("ways2"), None);
        assert_eq!(EntityKind::classify("relations_members"), None);
        assert_eq!(EntityKind::classify("node"), None);
        assert_eq!(EntityKind::classify("way"), None);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(EntityKind::classify("Nodes"), None);
        assert_eq!(EntityKind::classify("WAYS"), None);
        assert_eq!(EntityKind::classify(""), None);
    }

    #[test]
    fn test_id_columns() {
        assert_eq!(EntityKind::Node.id_column(), "node_id");
        assert_eq!(EntityKind::Way.id_column(), "way_id");
        assert_eq!(EntityKind::Relation.id_column(), "relation_id");
    }

    #[test]
    fn test_table_name_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::classify(kind.table_name()), Some(kind));
            assert_eq!(kind.to_string(), kind.table_name());
        }
    }
}

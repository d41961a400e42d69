//! # osm-logical - OpenStreetMap change capture
//!
//! Turns row changes on the OpenStreetMap `nodes`, `ways` and `relations`
//! tables, as seen through PostgreSQL logical decoding, into a small line
//! protocol that downstream consumers (replication diff generators, tile
//! expiry, redaction propagation) can follow with a plain tokenizer.
//!
//! ## Features
//!
//! - `postgres` (default) - pgoutput decoder and a replay host that drives
//!   the plugin from a captured replication stream
//!
//! ## Protocol
//!
//! ```text
//! BEGIN
//! NEW <table> <id> <version>
//! REDACT <table> <id> <version> <redaction_id>
//! COMMIT
//! ```
//!
//! `<table>` is one of `nodes`, `ways`, `relations`; the numbers are
//! unsigned 64-bit decimals. An INSERT of an entity version produces `NEW`;
//! an UPDATE that sets `redaction_id` produces `REDACT`. Nothing else does.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────────┐   ┌─────────┐
//! │ WAL/pgoutput│──▶│ PgOutputHost │──▶│ OsmLogicalPlugin│──▶│ io::Write│
//! └─────────────┘   └──────────────┘   └─────────────────┘   └─────────┘
//!                         host              OutputPlugin
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use osm_logical::{ChangeEvent, OsmLogicalPlugin, OutputPlugin, Row, RowSchema, Value};
//! use osm_logical::common::TransactionContext;
//!
//! let mut plugin = OsmLogicalPlugin::new(std::io::stdout());
//! plugin.startup(&[])?;
//!
//! let txn = TransactionContext::new(7, 0);
//! let schema = RowSchema::from_names(["way_id", "version", "redaction_id"]);
//! let row = Row::new(vec![Value::Int(7), Value::Int(2), Value::Int(9)]);
//!
//! plugin.begin(&txn)?;
//! plugin.change(&txn, &ChangeEvent::update("ways", &schema, &row))?; // REDACT ways 7 2 9
//! plugin.commit(&txn, 0)?;
//! # Ok::<(), osm_logical::EmitError>(())
//! ```

pub mod common;

// =============================================================================
// Core types
// =============================================================================

pub use common::{
    // Error handling
    EmitError,
    ErrorCategory,
    Result,
    // Data model
    ChangeAction,
    ChangeEvent,
    EntityKind,
    ProtocolEvent,
    Row,
    RowSchema,
    Value,
    // Plugin surface
    EmitterConfig,
    FlushMode,
    OsmLogicalPlugin,
    OutputPlugin,
};

// PostgreSQL pgoutput host - feature-gated
#[cfg(feature = "postgres")]
pub mod postgres;

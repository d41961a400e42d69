//! # Translation core
//!
//! Source-agnostic pieces of the emitter:
//!
//! - [`EntityKind`] - Table name to tracked entity kind
//! - [`RowSchema`], [`Row`], [`lookup`] - Name-based column resolution
//! - [`ChangeTranslator`] - Row change to protocol event decision
//! - [`ProtocolWriter`] - Line serialization
//! - [`TransactionFramer`] - BEGIN/COMMIT sequencing
//! - [`OutputPlugin`], [`OsmLogicalPlugin`] - Host callback surface
//! - [`TranslatorMetrics`] - Outcome counters
//! - [`EmitterConfig`] - Flush policy and logging options
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ host: startup → begin → change* → commit                     │
//! └───────┬───────────────────┬─────────────────────┬────────────┘
//!         ▼                   ▼                     ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ OsmLogicalPlugin                                             │
//! │   ChangeTranslator ── EntityKind::classify, lookup           │
//! │   TransactionFramer ── ProtocolWriter ── io::Write           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod entity;
mod error;
mod event;
mod metrics;
mod plugin;
mod row;
mod traits;
mod transaction;
mod translator;
mod writer;

pub use config::*;
pub use entity::*;
pub use error::*;
pub use event::*;
pub use self::metrics::*;
pub use plugin::*;
pub use row::*;
pub use traits::*;
pub use transaction::*;
pub use translator::*;
pub use writer::*;

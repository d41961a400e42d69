//! PostgreSQL logical replication support
//!
//! Supports:
//! - pgoutput protocol decoding (text and binary tuples)
//! - Replaying captured pgoutput streams through an [`OutputPlugin`]
//!
//! # Architecture
//!
//! ```text
//! capture → FrameReader → PgOutputDecoder → PgOutputHost → OutputPlugin
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use osm_logical::postgres::{FrameReader, PgOutputHost};
//! use osm_logical::OsmLogicalPlugin;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let capture = std::fs::File::open("capture.bin")?;
//! let mut host = PgOutputHost::new(OsmLogicalPlugin::new(std::io::stdout()));
//! for frame in FrameReader::new(capture) {
//!     host.handle_bytes(frame?)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`OutputPlugin`]: crate::OutputPlugin

mod host;
pub mod protocol;

pub use host::*;
pub use protocol::*;

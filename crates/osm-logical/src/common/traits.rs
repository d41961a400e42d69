//! Traits for output plugins
//!
//! The callback surface a logical decoding host drives. The host calls
//! `startup` once, then for each committed source transaction `begin`,
//! zero or more `change`, and `commit`, strictly in commit order.

use crate::common::{ChangeEvent, Result, TransactionContext};

/// Whether the plugin produces text or binary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    Textual,
    Binary,
}

/// What the plugin tells the host at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub output_type: OutputType,
}

/// Callbacks implemented by an output plugin.
pub trait OutputPlugin {
    /// Configure the plugin from host options (key/value pairs).
    fn startup(&mut self, options: &[(String, String)]) -> Result<OutputOptions>;

    /// A transaction's change stream starts.
    fn begin(&mut self, txn: &TransactionContext) -> Result<()>;

    /// One row mutation inside the open transaction.
    fn change(&mut self, txn: &TransactionContext, event: &ChangeEvent<'_>) -> Result<()>;

    /// The transaction is complete and durable at `commit_lsn`.
    fn commit(&mut self, txn: &TransactionContext, commit_lsn: u64) -> Result<()>;
}

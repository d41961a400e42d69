//! # Transaction framing
//!
//! Wraps the change lines of one source transaction in `BEGIN` / `COMMIT`.
//!
//! ```text
//!        begin()                 commit()
//!  Idle ─────────▶ InTransaction ─────────▶ Idle
//!                   │      ▲
//!                   └──────┘ emit()
//! ```
//!
//! The host drives the state machine. A `begin` while a transaction is open,
//! a `commit` while idle, or an `emit` outside a transaction is a breach of
//! the host contract: it is reported as [`EmitError::InvalidState`] and
//! nothing is written.

use crate::common::{
    EmitError, FlushMode, ProtocolEvent, ProtocolWriter, Result, TranslatorMetrics,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error};

/// Host-side identity of the transaction being decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionContext {
    /// Transaction id
    pub xid: u32,
    /// LSN of the transaction's commit record
    pub final_lsn: u64,
}

impl TransactionContext {
    pub fn new(xid: u32, final_lsn: u64) -> Self {
        Self { xid, final_lsn }
    }
}

/// Framer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    Idle,
    InTransaction(TransactionContext),
}

/// Sequences BEGIN, change lines and COMMIT onto a [`ProtocolWriter`].
pub struct TransactionFramer<W: Write> {
    writer: ProtocolWriter<W>,
    state: FramerState,
    metrics: Arc<TranslatorMetrics>,
    /// Change lines written in the open transaction
    events_in_txn: u64,
}

impl<W: Write> TransactionFramer<W> {
    pub fn new(writer: ProtocolWriter<W>, metrics: Arc<TranslatorMetrics>) -> Self {
        Self {
            writer,
            state: FramerState::Idle,
            metrics,
            events_in_txn: 0,
        }
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    pub fn in_transaction(&self) -> bool {
        matches!(self.state, FramerState::InTransaction(_))
    }

    /// Open a transaction and write `BEGIN`.
    pub fn begin(&mut self, txn: TransactionContext) -> Result<()> {
        if let FramerState::InTransaction(open) = self.state {
            error!(open_xid = open.xid, xid = txn.xid, "BEGIN while a transaction is open");
            return Err(EmitError::invalid_state(format!(
                "begin of xid {} while xid {} is still open",
                txn.xid, open.xid
            )));
        }

        self.writer.write(&ProtocolEvent::Begin)?;
        self.state = FramerState::InTransaction(txn);
        self.events_in_txn = 0;
        self.metrics.record_begin();
        debug!(xid = txn.xid, final_lsn = txn.final_lsn, "Transaction begin");
        Ok(())
    }

    /// Write a NEW or REDACT line inside the open transaction.
    pub fn emit(&mut self, event: &ProtocolEvent) -> Result<()> {
        if event.is_boundary() {
            return Err(EmitError::invalid_state(format!(
                "{} must go through begin/commit",
                event.keyword()
            )));
        }
        if !self.in_transaction() {
            error!(%event, "Change emitted outside a transaction");
            return Err(EmitError::invalid_state(
                "change emitted outside a transaction",
            ));
        }

        self.writer.write(event)?;
        self.events_in_txn += 1;
        Ok(())
    }

    /// Write `COMMIT` and return to idle.
    pub fn commit(&mut self, commit_lsn: u64) -> Result<()> {
        let FramerState::InTransaction(txn) = self.state else {
            error!(commit_lsn, "COMMIT without an open transaction");
            return Err(EmitError::invalid_state(format!(
                "commit at lsn {} without an open transaction",
                commit_lsn
            )));
        };

        self.writer.write(&ProtocolEvent::Commit)?;
        self.state = FramerState::Idle;
        self.metrics.record_commit();
        debug!(
            xid = txn.xid,
            commit_lsn,
            events = self.events_in_txn,
            "Transaction commit"
        );
        Ok(())
    }

    pub fn writer(&self) -> &ProtocolWriter<W> {
        &self.writer
    }

    /// Change the writer's flush policy between transactions.
    pub fn set_flush_mode(&mut self, mode: FlushMode) -> Result<()> {
        if self.in_transaction() {
            return Err(EmitError::invalid_state(
                "flush mode changed inside a transaction",
            ));
        }
        self.writer.set_flush_mode(mode)
    }

    /// Consume the framer, returning its writer.
    pub fn into_writer(self) -> ProtocolWriter<W> {
        self.writer
    }
}

//! The osm-logical output plugin
//!
//! Glues the [`ChangeTranslator`] to a [`TransactionFramer`] behind the
//! [`OutputPlugin`] callbacks.
//!
//! ```rust
//! use osm_logical::{ChangeEvent, OsmLogicalPlugin, OutputPlugin, Row, RowSchema, Value};
//! use osm_logical::common::TransactionContext;
//!
//! let mut plugin = OsmLogicalPlugin::new(Vec::new());
//! let txn = TransactionContext::new(1, 0x16B3748);
//! let schema = RowSchema::from_names(["node_id", "version"]);
//! let row = Row::new(vec![Value::Int(5), Value::Int(1)]);
//!
//! plugin.begin(&txn)?;
//! plugin.change(&txn, &ChangeEvent::insert("nodes", &schema, &row))?;
//! plugin.commit(&txn, 0x16B3748)?;
//!
//! let out = plugin.into_inner()?;
//! assert_eq!(out, b"BEGIN\nNEW nodes 5 1\nCOMMIT\n");
//! # Ok::<(), osm_logical::EmitError>(())
//! ```

use crate::common::{
    ChangeEvent, ChangeTranslator, EmitError, EmitterConfig, OutputOptions, OutputPlugin,
    OutputType, ProtocolWriter, Result, TransactionContext, TransactionFramer, TranslatorMetrics,
};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Output plugin emitting the osm-logical line protocol to `W`.
pub struct OsmLogicalPlugin<W: Write> {
    config: EmitterConfig,
    translator: ChangeTranslator,
    framer: TransactionFramer<W>,
    metrics: Arc<TranslatorMetrics>,
}

impl<W: Write> OsmLogicalPlugin<W> {
    /// Plugin with the default configuration.
    pub fn new(out: W) -> Self {
        Self::with_config(out, EmitterConfig::default())
    }

    pub fn with_config(out: W, config: EmitterConfig) -> Self {
        let metrics = Arc::new(TranslatorMetrics::new());
        let translator = ChangeTranslator::new(Arc::clone(&metrics))
            .with_missing_field_warnings(config.warn_on_missing_fields);
        let framer = TransactionFramer::new(
            ProtocolWriter::new(out, config.flush_mode),
            Arc::clone(&metrics),
        );
        Self {
            config,
            translator,
            framer,
            metrics,
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<TranslatorMetrics> {
        &self.metrics
    }

    pub fn in_transaction(&self) -> bool {
        self.framer.in_transaction()
    }

    /// Flush buffered output and return the sink.
    pub fn into_inner(self) -> Result<W> {
        self.framer.into_writer().into_inner()
    }
}

impl<W: Write> OutputPlugin for OsmLogicalPlugin<W> {
    fn startup(&mut self, options: &[(String, String)]) -> Result<OutputOptions> {
        if self.framer.in_transaction() {
            return Err(EmitError::invalid_state(
                "startup while a transaction is open",
            ));
        }

        let config = EmitterConfig::from_options(options)?;
        self.framer.set_flush_mode(config.flush_mode)?;
        self.translator = ChangeTranslator::new(Arc::clone(&self.metrics))
            .with_missing_field_warnings(config.warn_on_missing_fields);
        info!(
            flush_mode = %config.flush_mode,
            warn_on_missing_fields = config.warn_on_missing_fields,
            "osm-logical output plugin started"
        );
        self.config = config;

        Ok(OutputOptions {
            output_type: OutputType::Textual,
        })
    }

    fn begin(&mut self, txn: &TransactionContext) -> Result<()> {
        self.framer.begin(*txn)
    }

    fn change(&mut self, _txn: &TransactionContext, event: &ChangeEvent<'_>) -> Result<()> {
        if !self.framer.in_transaction() {
            return Err(EmitError::invalid_state(
                "change delivered outside a transaction",
            ));
        }
        match self.translator.translate(event) {
            Some(line) => self.framer.emit(&line),
            None => Ok(()),
        }
    }

    fn commit(&mut self, _txn: &TransactionContext, commit_lsn: u64) -> Result<()> {
        self.framer.commit(commit_lsn)
    }
}

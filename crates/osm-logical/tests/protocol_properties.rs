//! Property tests for translation and framing

mod support;

use osm_logical::common::{
    ChangeTranslator, ProtocolWriter, TransactionContext, TransactionFramer, TranslatorMetrics,
};
use osm_logical::{ChangeEvent, EntityKind, FlushMode, ProtocolEvent, Row, RowSchema, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn entity_kind() -> impl Strategy<Value = EntityKind> {
    prop_oneof![
        Just(EntityKind::Node),
        Just(EntityKind::Way),
        Just(EntityKind::Relation),
    ]
}

fn schema_for(kind: EntityKind) -> RowSchema {
    RowSchema::from_names([kind.id_column(), "changeset_id", "version", "redaction_id"])
}

fn row(id: u64, version: Option<u64>, redaction: Option<u64>) -> Row {
    let text = |v: u64| Value::Text(v.to_string());
    Row::new(vec![
        text(id),
        Value::Int(1),
        version.map(text).unwrap_or(Value::Null),
        redaction.map(text).unwrap_or(Value::Null),
    ])
}

proptest! {
    #[test]
    fn untracked_tables_never_emit(
        table in "[a-z_]{1,16}",
        id in any::<u64>(),
        version in any::<u64>(),
    ) {
        prop_assume!(EntityKind::classify(&table).is_none());
        let translator = ChangeTranslator::default();
        let schema = RowSchema::from_names(["id", "version", "redaction_id"]);
        let row = Row::new(vec![
            Value::Text(id.to_string()),
            Value::Text(version.to_string()),
            Value::Text("1".into()),
        ]);
        let insert = ChangeEvent::insert(&table, &schema, &row);
        let update = ChangeEvent::update(&table, &schema, &row);
        prop_assert_eq!(translator.translate(&insert), None);
        prop_assert_eq!(translator.translate(&update), None);
    }

    #[test]
    fn insert_emits_new_with_row_values(
        kind in entity_kind(),
        id in any::<u64>(),
        version in any::<u64>(),
    ) {
        let translator = ChangeTranslator::default();
        let schema = schema_for(kind);
        let row = row(id, Some(version), None);
        let event = translator.translate(&ChangeEvent::insert(kind.table_name(), &schema, &row));
        prop_assert_eq!(event, Some(ProtocolEvent::New { table: kind, id, version }));
    }

    #[test]
    fn null_version_never_emits(
        kind in entity_kind(),
        id in any::<u64>(),
        redaction in proptest::option::of(any::<u64>()),
    ) {
        let translator = ChangeTranslator::default();
        let schema = schema_for(kind);
        let row = row(id, None, redaction);
        let insert = ChangeEvent::insert(kind.table_name(), &schema, &row);
        let update = ChangeEvent::update(kind.table_name(), &schema, &row);
        prop_assert_eq!(translator.translate(&insert), None);
        prop_assert_eq!(translator.translate(&update), None);
        prop_assert_eq!(translator.metrics().snapshot().missing_fields, 2);
    }

    #[test]
    fn update_emits_redact_only_with_redaction(
        kind in entity_kind(),
        id in any::<u64>(),
        version in any::<u64>(),
        redaction in proptest::option::of(any::<u64>()),
    ) {
        let translator = ChangeTranslator::default();
        let schema = schema_for(kind);
        let row = row(id, Some(version), redaction);
        let event = translator.translate(&ChangeEvent::update(kind.table_name(), &schema, &row));
        let expected = redaction.map(|redaction_id| ProtocolEvent::Redact {
            table: kind,
            id,
            version,
            redaction_id,
        });
        prop_assert_eq!(event, expected);
    }

    #[test]
    fn protocol_lines_parse_back(
        kind in entity_kind(),
        id in any::<u64>(),
        version in any::<u64>(),
        redaction_id in any::<u64>(),
    ) {
        for event in [
            ProtocolEvent::New { table: kind, id, version },
            ProtocolEvent::Redact { table: kind, id, version, redaction_id },
        ] {
            let line = event.to_string();
            prop_assert!(!line.contains('\n'));
            prop_assert_eq!(line.parse::<ProtocolEvent>().unwrap(), event);
        }
    }

    #[test]
    fn every_transaction_is_framed(
        txns in proptest::collection::vec(
            proptest::collection::vec((entity_kind(), any::<u64>(), 1u64..1000), 0..8),
            1..6,
        ),
        transaction_flush in any::<bool>(),
    ) {
        let mode = if transaction_flush { FlushMode::Transaction } else { FlushMode::Line };
        let metrics = Arc::new(TranslatorMetrics::new());
        let writer = ProtocolWriter::new(Vec::new(), mode);
        let mut framer = TransactionFramer::new(writer, metrics.clone());

        let mut expected = String::new();
        for (xid, txn) in txns.iter().enumerate() {
            framer.begin(TransactionContext::new(xid as u32, 0)).unwrap();
            expected.push_str("BEGIN\n");
            for &(table, id, version) in txn {
                let event = ProtocolEvent::New { table, id, version };
                framer.emit(&event).unwrap();
                expected.push_str(&format!("{}\n", event));
            }
            framer.commit(0).unwrap();
            expected.push_str("COMMIT\n");
        }

        let snapshot = metrics.snapshot();
        prop_assert_eq!(snapshot.transactions_begun, txns.len() as u64);
        prop_assert_eq!(snapshot.transactions_committed, txns.len() as u64);

        let out = framer.into_writer().into_inner().unwrap();
        prop_assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}

#[test]
fn test_non_canonical_numbers_are_rejected() {
    support::init_test_logging();

    for line in ["NEW nodes 01 1", "NEW nodes +1 1", "NEW nodes 1 -1", "REDACT ways 1 1"] {
        assert!(line.parse::<ProtocolEvent>().is_err(), "{line}");
    }
    assert_eq!(
        "REDACT relations 18446744073709551615 1 2".parse::<ProtocolEvent>().unwrap(),
        ProtocolEvent::Redact {
            table: EntityKind::Relation,
            id: u64::MAX,
            version: 1,
            redaction_id: 2,
        }
    );
}

//! pgoutput decoder
//!
//! Decodes binary pgoutput messages from PostgreSQL logical replication.
//! Every read is length-checked: truncated input yields
//! [`DecodeError::NotEnoughData`] rather than a panic.

use super::message::*;
use bytes::{Buf, Bytes};
use thiserror::Error;

/// Decoder errors
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Not enough data")]
    NotEnoughData,
    #[error("Invalid message type: {0:#04x}")]
    InvalidType(u8),
    #[error("UTF8 Error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// pgoutput decoder
pub struct PgOutputDecoder;

impl PgOutputDecoder {
    /// Decode one pgoutput message, consuming it from `data`.
    pub fn decode(data: &mut Bytes) -> DecodeResult<ReplicationMessage> {
        match read_u8(data)? {
            b'B' => {
                // final LSN, commit timestamp, xid
                need(data, 20)?;
                let final_lsn = data.get_u64();
                data.advance(8);
                Ok(ReplicationMessage::Begin {
                    xid: data.get_u32(),
                    final_lsn,
                })
            }
            b'C' => {
                // flags, commit LSN, end LSN, commit timestamp
                need(data, 25)?;
                data.advance(1);
                let commit_lsn = data.get_u64();
                data.advance(16);
                Ok(ReplicationMessage::Commit { commit_lsn })
            }
            b'R' => decode_relation(data).map(ReplicationMessage::Relation),
            b'I' => {
                let relation_id = read_u32(data)?;
                expect_tag(data, b'N')?;
                Ok(ReplicationMessage::Insert {
                    relation_id,
                    new_tuple: decode_tuple(data)?,
                })
            }
            b'U' => {
                let relation_id = read_u32(data)?;
                let mut tag = read_u8(data)?;
                if tag == b'K' || tag == b'O' {
                    decode_tuple(data)?;
                    tag = read_u8(data)?;
                }
                if tag != b'N' {
                    return Err(DecodeError::Protocol(format!(
                        "Expected N in UPDATE, got {:?}",
                        tag as char
                    )));
                }
                Ok(ReplicationMessage::Update {
                    relation_id,
                    new_tuple: decode_tuple(data)?,
                })
            }
            b'D' => {
                let relation_id = read_u32(data)?;
                match read_u8(data)? {
                    b'K' | b'O' => decode_tuple(data)?,
                    t => return Err(DecodeError::InvalidType(t)),
                };
                Ok(ReplicationMessage::Delete { relation_id })
            }
            b'T' => {
                let count = read_u32(data)? as usize;
                read_u8(data)?; // options
                need(data, count.saturating_mul(4))?;
                Ok(ReplicationMessage::Truncate {
                    relation_ids: (0..count).map(|_| data.get_u32()).collect(),
                })
            }
            tag @ b'O' => {
                // commit LSN, origin name
                need(data, 8)?;
                data.advance(8);
                read_string(data)?;
                Ok(ReplicationMessage::Skipped(tag))
            }
            tag @ b'Y' => {
                // type OID, namespace, type name
                read_u32(data)?;
                read_string(data)?;
                read_string(data)?;
                Ok(ReplicationMessage::Skipped(tag))
            }
            t => Err(DecodeError::InvalidType(t)),
        }
    }
}

fn decode_relation(buf: &mut Bytes) -> DecodeResult<RelationBody> {
    let id = read_u32(buf)?;
    let namespace = read_string(buf)?;
    let name = read_string(buf)?;
    // replica identity setting, column count
    need(buf, 3)?;
    buf.advance(1);
    let num_columns = buf.get_u16();

    let mut columns = Vec::with_capacity(num_columns as usize);
    for _ in 0..num_columns {
        read_u8(buf)?; // key flag
        let name = read_string(buf)?;
        let type_id = read_u32(buf)?;
        need(buf, 4)?;
        buf.advance(4); // type modifier
        columns.push(Column { name, type_id });
    }

    Ok(RelationBody {
        id,
        namespace,
        name,
        columns,
    })
}

fn expect_tag(buf: &mut Bytes, tag: u8) -> DecodeResult<()> {
    match read_u8(buf)? {
        t if t == tag => Ok(()),
        t => Err(DecodeError::Protocol(format!(
            "Expected {:?}, got {:?}",
            tag as char, t as char
        ))),
    }
}

fn need(buf: &Bytes, n: usize) -> DecodeResult<()> {
    if buf.remaining() < n {
        Err(DecodeError::NotEnoughData)
    } else {
        Ok(())
    }
}

fn read_u8(buf: &mut Bytes) -> DecodeResult<u8> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

fn read_u32(buf: &mut Bytes) -> DecodeResult<u32> {
    need(buf, 4)?;
    Ok(buf.get_u32())
}

fn read_string(buf: &mut Bytes) -> DecodeResult<String> {
    let n = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::NotEnoughData)?;
    let s_bytes = buf.copy_to_bytes(n);
    buf.advance(1); // skip null
    Ok(std::str::from_utf8(&s_bytes)?.to_string())
}

fn decode_tuple(buf: &mut Bytes) -> DecodeResult<Tuple> {
    need(buf, 2)?;
    let num_cols = buf.get_u16();
    let mut columns = Vec::with_capacity(num_cols as usize);

    for _ in 0..num_cols {
        let data = match read_u8(buf)? {
            b'n' => TupleData::Null,
            b'u' => TupleData::Toast,
            kind @ (b't' | b'b') => {
                need(buf, 4)?;
                let len = buf.get_u32() as usize;
                need(buf, len)?;
                let data = buf.copy_to_bytes(len);
                if kind == b't' {
                    TupleData::Text(data)
                } else {
                    TupleData::Binary(data)
                }
            }
            t => return Err(DecodeError::InvalidType(t)),
        };
        columns.push(data);
    }

    Ok(Tuple(columns))
}

//! pgoutput capture construction

use bytes::{BufMut, BytesMut};
use osm_logical::postgres::write_frame;

/// Builds a length-prefixed pgoutput capture message by message.
#[derive(Default)]
pub struct CaptureBuilder {
    out: Vec<u8>,
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, msg: BytesMut) -> Self {
        write_frame(&mut self.out, &msg).unwrap();
        self
    }

    pub fn relation(self, id: u32, name: &str, columns: &[&str]) -> Self {
        let mut msg = BytesMut::new();
        msg.put_u8(b'R');
        msg.put_u32(id);
        put_cstr(&mut msg, "public");
        put_cstr(&mut msg, name);
        msg.put_u8(b'd');
        msg.put_u16(columns.len() as u16);
        for column in columns {
            msg.put_u8(0);
            put_cstr(&mut msg, column);
            msg.put_u32(20); // int8
            msg.put_i32(-1);
        }
        self.push(msg)
    }

    pub fn begin(self, xid: u32, final_lsn: u64) -> Self {
        let mut msg = BytesMut::new();
        msg.put_u8(b'B');
        msg.put_u64(final_lsn);
        msg.put_i64(0);
        msg.put_u32(xid);
        self.push(msg)
    }

    pub fn commit(self, commit_lsn: u64) -> Self {
        let mut msg = BytesMut::new();
        msg.put_u8(b'C');
        msg.put_u8(0);
        msg.put_u64(commit_lsn);
        msg.put_u64(commit_lsn + 8);
        msg.put_i64(0);
        self.push(msg)
    }

    pub fn insert(self, relation_id: u32, values: &[Option<&str>]) -> Self {
        let mut msg = BytesMut::new();
        msg.put_u8(b'I');
        msg.put_u32(relation_id);
        msg.put_u8(b'N');
        put_tuple(&mut msg, values);
        self.push(msg)
    }

    pub fn update(self, relation_id: u32, values: &[Option<&str>]) -> Self {
        let mut msg = BytesMut::new();
        msg.put_u8(b'U');
        msg.put_u32(relation_id);
        msg.put_u8(b'N');
        put_tuple(&mut msg, values);
        self.push(msg)
    }

    pub fn delete(self, relation_id: u32, key: &[Option<&str>]) -> Self {
        let mut msg = BytesMut::new();
        msg.put_u8(b'D');
        msg.put_u32(relation_id);
        msg.put_u8(b'K');
        put_tuple(&mut msg, key);
        self.push(msg)
    }

    pub fn truncate(self, relation_ids: &[u32]) -> Self {
        let mut msg = BytesMut::new();
        msg.put_u8(b'T');
        msg.put_u32(relation_ids.len() as u32);
        msg.put_u8(0);
        for id in relation_ids {
            msg.put_u32(*id);
        }
        self.push(msg)
    }

    pub fn raw(self, bytes: &[u8]) -> Self {
        self.push(BytesMut::from(bytes))
    }

    pub fn build(self) -> Vec<u8> {
        self.out
    }
}

fn put_cstr(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
}

fn put_tuple(buf: &mut BytesMut, values: &[Option<&str>]) {
    buf.put_u16(values.len() as u16);
    for value in values {
        match value {
            Some(s) => {
                buf.put_u8(b't');
                buf.put_u32(s.len() as u32);
                buf.put_slice(s.as_bytes());
            }
            None => buf.put_u8(b'n'),
        }
    }
}

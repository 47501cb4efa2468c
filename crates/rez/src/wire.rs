//! Value documents for the C ABI.
//!
//! All integers are little-endian.
//!
//! ```text
//! doc   := "RZV1" count:u32 value*count
//! value := 0x00                                  nil
//!        | 0x01 | 0x02                           false | true
//!        | 0x03 i64                              integer
//!        | 0x04 f64                              float
//!        | 0x05 len:u32 bytes                    string
//!        | 0x06 len:u32 type_name handle:u64 flags:u8
//!               [value]                          if flags & RENDER
//!               [count:u32 value*count]          if flags & SEQUENCE
//! ```
//!
//! Opaque objects keep the host's handle as their identity. A render hook crosses the
//! boundary as the value it produced at encode time. A sequence's count is its reported
//! length on both sides; holes inside it travel as nil.

use rez_contracts::REZ_WIRE_MAGIC;
use thiserror::Error;

use crate::number::Number;
use crate::sequence::Table;
use crate::value::{Handle, Object, Opaque, Value};

const TAG_NIL: u8 = 0x00;
const TAG_FALSE: u8 = 0x01;
const TAG_TRUE: u8 = 0x02;
const TAG_INTEGER: u8 = 0x03;
const TAG_FLOAT: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_OPAQUE: u8 = 0x06;

const FLAG_RENDER: u8 = 0x01;
const FLAG_SEQUENCE: u8 = 0x02;

pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("bad document magic")]
    BadMagic,
    #[error("document truncated at offset {0}")]
    Truncated(usize),
    #[error("unknown value tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },
    #[error("unknown opaque flags 0x{flags:02x} at offset {offset}")]
    UnknownFlags { flags: u8, offset: usize },
    #[error("type name at offset {0} is not UTF-8")]
    BadTypeName(usize),
    #[error("values nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
    #[error("{0} trailing bytes after the last value")]
    TrailingBytes(usize),
    #[error("{0} does not fit in a u32 length field")]
    TooLarge(usize),
}

/// Decodes a complete document. Trailing bytes are an error.
pub fn decode_doc(bytes: &[u8]) -> Result<Vec<Value>, WireError> {
    let mut r = Reader { buf: bytes, off: 0 };
    if r.take(4)? != REZ_WIRE_MAGIC {
        return Err(WireError::BadMagic);
    }
    let count = r.count()?;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(r.value(0)?);
    }
    match bytes.len() - r.off {
        0 => Ok(out),
        n => Err(WireError::TrailingBytes(n)),
    }
}

pub fn encode_doc(values: &[Value]) -> Result<Vec<u8>, WireError> {
    let mut out = REZ_WIRE_MAGIC.to_vec();
    put_len(&mut out, values.len())?;
    for v in values {
        encode_value(v, 0, &mut out)?;
    }
    Ok(out)
}

fn put_len(out: &mut Vec<u8>, n: usize) -> Result<(), WireError> {
    let n = u32::try_from(n).map_err(|_| WireError::TooLarge(n))?;
    out.extend_from_slice(&n.to_le_bytes());
    Ok(())
}

fn encode_value(v: &Value, depth: usize, out: &mut Vec<u8>) -> Result<(), WireError> {
    if depth > MAX_DEPTH {
        return Err(WireError::TooDeep);
    }
    match v {
        Value::Nil => out.push(TAG_NIL),
        Value::Boolean(false) => out.push(TAG_FALSE),
        Value::Boolean(true) => out.push(TAG_TRUE),
        Value::Number(Number::Integer(n)) => {
            out.push(TAG_INTEGER);
            out.extend_from_slice(&n.to_le_bytes());
        }
        Value::Number(Number::Float(x)) => {
            out.push(TAG_FLOAT);
            out.extend_from_slice(&x.to_bits().to_le_bytes());
        }
        Value::String(s) => {
            out.push(TAG_STRING);
            put_len(out, s.len())?;
            out.extend_from_slice(s);
        }
        Value::Other(o) => encode_opaque(o, depth, out)?,
    }
    Ok(())
}

fn encode_opaque(o: &Opaque, depth: usize, out: &mut Vec<u8>) -> Result<(), WireError> {
    let name = o.type_name().as_bytes();
    out.push(TAG_OPAQUE);
    put_len(out, name.len())?;
    out.extend_from_slice(name);
    out.extend_from_slice(&o.handle().get().to_le_bytes());

    let hook = o.renderable();
    let seq = o.sequence();
    let mut flags = 0;
    if hook.is_some() {
        flags |= FLAG_RENDER;
    }
    if seq.is_some() {
        flags |= FLAG_SEQUENCE;
    }
    out.push(flags);

    if let Some(hook) = hook {
        encode_value(&hook.render(), depth + 1, out)?;
    }
    if let Some(seq) = seq {
        let len = seq.reported_len();
        put_len(out, len)?;
        for position in 1..=len {
            match seq.element(position) {
                Some(item) => encode_value(item, depth + 1, out)?,
                None => out.push(TAG_NIL),
            }
        }
    }
    Ok(())
}

struct Reader<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self.off.checked_add(n).ok_or(WireError::Truncated(self.off))?;
        let s = self.buf.get(self.off..end).ok_or(WireError::Truncated(self.off))?;
        self.off = end;
        Ok(s)
    }

    fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        let s = self.take(4)?;
        Ok(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
    }

    fn u64(&mut self) -> Result<u64, WireError> {
        let s = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(s);
        Ok(u64::from_le_bytes(arr))
    }

    // Every value takes at least one byte, so a count larger than what is left can
    // only be a truncated document.
    fn count(&mut self) -> Result<usize, WireError> {
        let at = self.off;
        let n = self.u32()? as usize;
        if n > self.buf.len() - self.off {
            return Err(WireError::Truncated(at));
        }
        Ok(n)
    }

    fn value(&mut self, depth: usize) -> Result<Value, WireError> {
        if depth > MAX_DEPTH {
            return Err(WireError::TooDeep);
        }
        let at = self.off;
        let v = match self.u8()? {
            TAG_NIL => Value::Nil,
            TAG_FALSE => Value::Boolean(false),
            TAG_TRUE => Value::Boolean(true),
            TAG_INTEGER => Value::Number(Number::Integer(self.u64()? as i64)),
            TAG_FLOAT => Value::Number(Number::Float(f64::from_bits(self.u64()?))),
            TAG_STRING => {
                let len = self.u32()? as usize;
                Value::String(self.take(len)?.to_vec())
            }
            TAG_OPAQUE => self.opaque(depth)?,
            tag => return Err(WireError::UnknownTag { tag, offset: at }),
        };
        Ok(v)
    }

    fn opaque(&mut self, depth: usize) -> Result<Value, WireError> {
        let name_len = self.u32()? as usize;
        let name_at = self.off;
        let name = std::str::from_utf8(self.take(name_len)?)
            .map_err(|_| WireError::BadTypeName(name_at))?
            .to_string();
        let handle = Handle::from_raw(self.u64()?);

        let flags_at = self.off;
        let flags = self.u8()?;
        if flags & !(FLAG_RENDER | FLAG_SEQUENCE) != 0 {
            return Err(WireError::UnknownFlags {
                flags,
                offset: flags_at,
            });
        }

        let rendered = if flags & FLAG_RENDER != 0 {
            Some(self.value(depth + 1)?)
        } else {
            None
        };

        let opaque = if flags & FLAG_SEQUENCE != 0 {
            let count = self.count()?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(self.value(depth + 1)?);
            }
            let mut table = Table::from_values(items)
                .with_type_name(name)
                .with_reported_len(count);
            if let Some(r) = rendered {
                table = table.with_render(r);
            }
            Opaque::with_handle(handle, table)
        } else {
            let object = match rendered {
                Some(r) => Object::with_render(name, r),
                None => Object::new(name),
            };
            Opaque::with_handle(handle, object)
        };
        Ok(Value::Other(opaque))
    }
}

//! ## TCPFormat codec (§4.2)
//!
//! Compact delta wire format used on channel 3: a flat run of
//! `tag:u8 id:u32 payload(tag)` records, concatenated until the containing
//! buffer is exhausted. Decode yields a flat ordered `[(Id, Value)]`; it
//! does not construct hierarchy — that's the `Model`'s job.

use crate::error::{Error, Result};
use crate::value::{Id, Record, Value};
use crate::wire::{read_new_vec, CStr, ReadBytes, ReadFromBytes, WriteBytes, LE};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor};

const TAG_BOOL: u8 = 0;
const TAG_I8: u8 = 1;
const TAG_U8: u8 = 2;
const TAG_I32: u8 = 3;
const TAG_U32: u8 = 4;
const TAG_F32: u8 = 5;
const TAG_STR: u8 = 6;
const TAG_LIST: u8 = 7;
const TAG_DICT: u8 = 8;

/// Decode a batch of records from a TCPFormat buffer.
///
/// Per §7, an unknown tag truncates the batch at the offending record;
/// records already decoded in this call are returned rather than discarded,
/// and the caller is expected to log the returned error.
pub fn decode(bytes: &[u8]) -> (Vec<Record>, Option<Error>) {
    let mut cursor = Cursor::new(bytes);
    let mut records = Vec::new();

    loop {
        let tag = match cursor.read_u8() {
            Ok(tag) => tag,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return (records, Some(e.into())),
        };

        let id = match cursor.read_u32::<LE>() {
            Ok(id) => Id(id),
            Err(e) => return (records, Some(e.into())),
        };

        let value = match read_payload(&mut cursor, tag) {
            Ok(Some(value)) => value,
            Ok(None) => return (records, Some(Error::UnknownTag(tag))),
            Err(e) => return (records, Some(e)),
        };

        records.push((id, value));
    }

    (records, None)
}

/// One TAG_DICT slot on the wire: a child id followed by its attribute name.
/// Exists only so `wire::read_new_vec` can read a run of them directly.
struct DictEntry {
    child: Id,
    name: String,
}

impl ReadFromBytes for DictEntry {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let child = Id(reader.read_u32::<LE>()?);
        let name = reader.read_bytes::<CStr>()?.0;
        Ok(DictEntry { child, name })
    }
}

fn read_payload<R: ReadBytesExt>(mut reader: R, tag: u8) -> Result<Option<Value>> {
    let value = match tag {
        TAG_BOOL => Value::Bool(reader.read_u8()? != 0),
        TAG_I8 => Value::I8(reader.read_i8()?),
        TAG_U8 => Value::U8(reader.read_u8()?),
        TAG_I32 => Value::I32(reader.read_i32::<LE>()?),
        TAG_U32 => Value::U32(reader.read_u32::<LE>()?),
        TAG_F32 => Value::F32(reader.read_f32::<LE>()?),
        TAG_STR => Value::Str(reader.read_bytes::<CStr>()?.0),
        TAG_LIST => {
            let count = reader.read_u16::<LE>()?;
            let ids: Vec<Id> = read_new_vec(&mut reader, count as usize)?;
            Value::List(ids)
        }
        TAG_DICT => {
            let count = reader.read_u16::<LE>()?;
            let entries: Vec<DictEntry> = read_new_vec(&mut reader, count as usize)?;
            let _reserved = reader.read_u16::<LE>()?;
            Value::Dict(entries.into_iter().map(|e| (e.name, e.child)).collect())
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Encode a batch of records to TCPFormat bytes.
///
/// Integers re-derive their tag from the range rule in §4.2 rather than
/// from the `Value` variant that produced them, which is the documented,
/// intentional promotion behavior (P1/P2): an `I8(5)` round-trips to a
/// `U8` on the wire because `5` is in range `0..=127`.
pub fn encode(records: &[Record]) -> Vec<u8> {
    let mut out = Vec::new();
    for (id, value) in records {
        encode_one(&mut out, *id, value).expect("writing to a Vec<u8> never fails");
    }
    out
}

fn encode_one<W: WriteBytesExt>(mut writer: W, id: Id, value: &Value) -> io::Result<()> {
    match value {
        Value::Bool(b) => {
            writer.write_u8(TAG_BOOL)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_u8(if *b { 1 } else { 0 })?;
        }
        Value::I8(n) => write_int(writer, id, *n as i64)?,
        Value::U8(n) => write_int(writer, id, *n as i64)?,
        Value::I32(n) => write_int(writer, id, *n as i64)?,
        Value::U32(n) => write_int(writer, id, *n as i64)?,
        Value::F32(f) => {
            writer.write_u8(TAG_F32)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_f32::<LE>(*f)?;
        }
        Value::F64(f) => {
            // TCPFormat has no f64 tag; narrow to f32 as the wire format demands.
            writer.write_u8(TAG_F32)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_f32::<LE>(*f as f32)?;
        }
        Value::Str(s) => {
            writer.write_u8(TAG_STR)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_bytes(crate::wire::CStr::from(s.as_str()))?;
        }
        Value::List(ids) => {
            writer.write_u8(TAG_LIST)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_u16::<LE>(ids.len() as u16)?;
            for child in ids {
                writer.write_u32::<LE>(child.0)?;
            }
        }
        Value::Dict(entries) => {
            writer.write_u8(TAG_DICT)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_u16::<LE>(entries.len() as u16)?;
            for (name, child) in entries {
                writer.write_u32::<LE>(child.0)?;
                writer.write_bytes(crate::wire::CStr::from(name.as_str()))?;
            }
            // Trailing reserved field (P3): always zero on write, ignored on read.
            writer.write_u16::<LE>(0)?;
        }
    }
    Ok(())
}

/// Chooses the integer tag per §4.2's range rule and writes the payload.
fn write_int<W: WriteBytesExt>(mut writer: W, id: Id, n: i64) -> io::Result<()> {
    if n < 0 {
        if n < -128 {
            writer.write_u8(TAG_I32)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_i32::<LE>(n as i32)
        } else {
            writer.write_u8(TAG_I8)?;
            writer.write_u32::<LE>(id.0)?;
            writer.write_i8(n as i8)
        }
    } else if n > 127 {
        writer.write_u8(TAG_U32)?;
        writer.write_u32::<LE>(id.0)?;
        writer.write_u32::<LE>(n as u32)
    } else {
        writer.write_u8(TAG_U8)?;
        writer.write_u32::<LE>(id.0)?;
        writer.write_u8(n as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_ok(bytes: &[u8]) -> Vec<Record> {
        let (records, err) = decode(bytes);
        assert!(err.is_none(), "unexpected decode error: {:?}", err);
        records
    }

    #[test]
    fn integer_tag_selection() {
        // P2: n in {-130, -128, -1, 0, 127, 128, 300} -> tags {3, 1, 1, 2, 2, 4, 4}
        let cases: &[(i64, u8)] = &[
            (-130, TAG_I32),
            (-128, TAG_I8),
            (-1, TAG_I8),
            (0, TAG_U8),
            (127, TAG_U8),
            (128, TAG_U32),
            (300, TAG_U32),
        ];
        for &(n, expected_tag) in cases {
            let mut buf = Vec::new();
            write_int(&mut buf, Id(0), n).unwrap();
            assert_eq!(buf[0], expected_tag, "n={n}");
        }
    }

    #[test]
    fn scenario_integer_promotion() {
        // encode [(5, I8(5))] -> 02 05 00 00 00 05 (tag=U8)
        let bytes = encode(&[(Id(5), Value::I8(5))]);
        assert_eq!(bytes, vec![0x02, 0x05, 0x00, 0x00, 0x00, 0x05]);

        // encode [(5, I32(-200))] -> 03 05 00 00 00 38 FF FF FF
        let bytes = encode(&[(Id(5), Value::I32(-200))]);
        assert_eq!(
            bytes,
            vec![0x03, 0x05, 0x00, 0x00, 0x00, 0x38, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn scenario_dict_encoding() {
        // encode [(0, Dict({"A": 1}))] -> tag 8, id 0, count 1, child-id 1, "A\0", trailer 00 00
        let bytes = encode(&[(Id(0), Value::Dict(vec![("A".to_owned(), Id(1))]))]);
        assert_eq!(
            bytes,
            vec![0x08, 0, 0, 0, 0, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, b'A', 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn dict_trailer_is_always_zero() {
        // P3: the last two bytes of any encoded Dict are 0x00 0x00.
        let bytes = encode(&[(
            Id(0),
            Value::Dict(vec![("X".to_owned(), Id(9)), ("Y".to_owned(), Id(10))]),
        )]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0x00, 0x00]);
    }

    #[test]
    fn round_trip_preserves_witnessed_tag() {
        // P1: a batch whose integers already carry the tag the range rule would
        // choose round-trips byte-identically on the second encode.
        let batch = vec![
            (Id(1), Value::Bool(true)),
            (Id(2), Value::U8(5)),
            (Id(3), Value::I32(-200)),
            (Id(4), Value::U32(40_000)),
            (Id(5), Value::F32(1.5)),
            (Id(6), Value::Str("hello".to_owned())),
            (Id(7), Value::List(vec![Id(1), Id(2)])),
            (Id(8), Value::Dict(vec![("A".to_owned(), Id(1))])),
        ];
        let encoded = encode(&batch);
        let (decoded, err) = decode(&encoded);
        assert!(err.is_none());
        assert_eq!(decoded, batch);
        assert_eq!(encode(&decoded), encoded);
    }

    #[test]
    fn unknown_tag_truncates_batch_but_keeps_prior_records() {
        let mut bytes = encode(&[(Id(1), Value::U8(1))]);
        bytes.push(0xFF); // unknown tag
        bytes.extend_from_slice(&[0, 0, 0, 0]); // id
        let (records, err) = decode(&bytes);
        assert_eq!(records, vec![(Id(1), Value::U8(1))]);
        assert!(matches!(err, Some(Error::UnknownTag(0xFF))));
    }

    #[test]
    fn cstr_carries_arbitrary_utf8() {
        let batch = vec![(Id(0), Value::Str("caf\u{e9}".to_owned()))];
        let encoded = encode(&batch);
        let decoded = decode_ok(&encoded);
        assert_eq!(decoded, batch);
    }
}

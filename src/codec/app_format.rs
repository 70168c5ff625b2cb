//! ## AppFormat codec (§4.3), decode-only.
//!
//! Parses a self-describing, recursive nested snapshot into the same flat
//! `[(Id, Value)]` sequence TCPFormat produces. Children are parsed before
//! their parent record is appended, so a parent's record always appears
//! after all of its descendants' records (P5) — the root record is last.

use crate::codec::spelling;
use crate::error::{Error, Result};
use crate::value::{Id, Record, Value};
use crate::wire::{ReadBytes, LengthPrefixedStr, LE};
use byteorder::ReadBytesExt;
use std::io::Cursor;

const KIND_NATIVE: u8 = 0;
const KIND_LIST: u8 = 1;
const KIND_DICT: u8 = 2;

const NATIVE_I64: u8 = 2;
const NATIVE_F64: u8 = 4;
const NATIVE_BOOL: u8 = 5;
const NATIVE_STR: u8 = 6;

/// Decode an AppFormat buffer into a flat batch of records, root last.
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>> {
    let mut cursor = Cursor::new(bytes);
    let (_root_id, records) = decode_type(&mut cursor)?;
    Ok(records)
}

fn decode_type<R: ReadBytesExt>(mut reader: R) -> Result<(Id, Vec<Record>)> {
    let kind = reader.read_u8()?;
    let id = Id(reader.read_u32::<LE>()?);

    let (value, mut children) = match kind {
        KIND_NATIVE => (decode_native(&mut reader)?, Vec::new()),
        KIND_LIST => decode_list(&mut reader)?,
        KIND_DICT => decode_dict(&mut reader)?,
        other => return Err(Error::UnknownNativeType(other)),
    };

    children.push((id, value));
    Ok((id, children))
}

fn decode_native<R: ReadBytesExt>(mut reader: R) -> Result<Value> {
    let native_type = reader.read_u8()?;
    let value = match native_type {
        NATIVE_I64 => {
            // TCPFormat/Model integers are 32-bit; narrow the wire's i64 to
            // the smallest signed/unsigned variant the value actually fits,
            // matching the same promotion intent as §4.2's range rule.
            let n = reader.read_i64::<LE>()?;
            narrow_i64(n)
        }
        NATIVE_F64 => Value::F64(reader.read_f64::<LE>()?),
        NATIVE_BOOL => Value::Bool(reader.read_u8()? != 0),
        NATIVE_STR => Value::Str(reader.read_bytes::<LengthPrefixedStr>()?.0),
        other => return Err(Error::UnknownNativeType(other)),
    };
    Ok(value)
}

fn narrow_i64(n: i64) -> Value {
    if n >= i32::MIN as i64 && n <= i32::MAX as i64 {
        Value::I32(n as i32)
    } else {
        Value::U32(n as u32)
    }
}

fn decode_list<R: ReadBytesExt>(mut reader: R) -> Result<(Value, Vec<Record>)> {
    let count = reader.read_u32::<LE>()?;
    let mut slots: Vec<Option<Id>> = vec![None; count as usize];
    let mut children = Vec::new();

    for _ in 0..count {
        let index = reader.read_u32::<LE>()?;
        let (child_id, child_records) = decode_type(&mut reader)?;
        if index as usize >= slots.len() {
            return Err(Error::MalformedList { index, count });
        }
        slots[index as usize] = Some(child_id);
        children.extend(child_records);
    }

    let mut ids = Vec::with_capacity(slots.len());
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(id) => ids.push(id),
            None => {
                return Err(Error::MalformedList {
                    index: index as u32,
                    count,
                })
            }
        }
    }

    Ok((Value::List(ids), children))
}

fn decode_dict<R: ReadBytesExt>(mut reader: R) -> Result<(Value, Vec<Record>)> {
    let count = reader.read_u32::<LE>()?;
    let mut entries = Vec::with_capacity(count as usize);
    let mut children = Vec::new();

    for _ in 0..count {
        let raw_name = reader.read_bytes::<LengthPrefixedStr>()?.0;
        let name = spelling::normalize(&raw_name);
        let (child_id, child_records) = decode_type(&mut reader)?;
        entries.push((name, child_id));
        children.extend(child_records);
    }

    Ok((Value::Dict(entries), children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WriteBytes;
    use byteorder::WriteBytesExt;
    use std::io::Write;

    fn write_native_bool(out: &mut Vec<u8>, id: u32, value: bool) {
        out.write_u8(KIND_NATIVE).unwrap();
        out.write_u32::<LE>(id).unwrap();
        out.write_u8(NATIVE_BOOL).unwrap();
        out.write_u8(if value { 1 } else { 0 }).unwrap();
    }

    #[test]
    fn scenario_list_indices_out_of_wire_order() {
        // A list body count=2 followed by (index=1, false) then (index=0, true)
        // yields a List whose Id[0] references the `true` child and Id[1]
        // references the `false` child.
        let mut body = Vec::new();
        body.write_u32::<LE>(2).unwrap(); // count

        body.write_u32::<LE>(1).unwrap(); // index=1
        write_native_bool(&mut body, 10, false);

        body.write_u32::<LE>(0).unwrap(); // index=0
        write_native_bool(&mut body, 11, true);

        let mut wire = Vec::new();
        wire.write_u8(KIND_LIST).unwrap();
        wire.write_u32::<LE>(0).unwrap(); // parent id
        wire.write_all(&body).unwrap();

        let records = decode(&wire).unwrap();
        // root (parent) record is last (P5).
        let (root_id, root_value) = records.last().unwrap();
        assert_eq!(*root_id, Id(0));
        match root_value {
            Value::List(ids) => {
                assert_eq!(ids[0], Id(11));
                assert_eq!(ids[1], Id(10));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn parent_record_appears_after_descendants() {
        // dict { "A": true } at id 0, child id 1.
        let mut dict_body = Vec::new();
        dict_body.write_u32::<LE>(1).unwrap(); // count
        dict_body.write_bytes(LengthPrefixedStr("A".to_owned())).unwrap();
        write_native_bool(&mut dict_body, 1, true);

        let mut wire = Vec::new();
        wire.write_u8(KIND_DICT).unwrap();
        wire.write_u32::<LE>(0).unwrap();
        wire.write_all(&dict_body).unwrap();

        let records = decode(&wire).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, Id(1));
        assert_eq!(records[1].0, Id(0));
    }

    #[test]
    fn dict_keys_are_case_normalized_against_canonical_table() {
        let mut dict_body = Vec::new();
        dict_body.write_u32::<LE>(1).unwrap();
        dict_body.write_bytes(LengthPrefixedStr("isplayerdead".to_owned())).unwrap();
        write_native_bool(&mut dict_body, 1, true);

        let mut wire = Vec::new();
        wire.write_u8(KIND_DICT).unwrap();
        wire.write_u32::<LE>(0).unwrap();
        wire.write_all(&dict_body).unwrap();

        let records = decode(&wire).unwrap();
        match &records.last().unwrap().1 {
            Value::Dict(entries) => assert_eq!(entries[0].0, "IsPlayerDead"),
            other => panic!("expected dict, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_names_pass_through() {
        let mut dict_body = Vec::new();
        dict_body.write_u32::<LE>(1).unwrap();
        dict_body.write_bytes(LengthPrefixedStr("TotallyNewField".to_owned())).unwrap();
        write_native_bool(&mut dict_body, 1, true);

        let mut wire = Vec::new();
        wire.write_u8(KIND_DICT).unwrap();
        wire.write_u32::<LE>(0).unwrap();
        wire.write_all(&dict_body).unwrap();

        let records = decode(&wire).unwrap();
        match &records.last().unwrap().1 {
            Value::Dict(entries) => assert_eq!(entries[0].0, "TotallyNewField"),
            other => panic!("expected dict, got {other:?}"),
        }
    }

    #[test]
    fn gap_in_list_indices_is_malformed() {
        // count=2 but both entries claim index 0, leaving index 1 unpopulated.
        let mut body = Vec::new();
        body.write_u32::<LE>(2).unwrap(); // count

        body.write_u32::<LE>(0).unwrap();
        write_native_bool(&mut body, 1, true);

        body.write_u32::<LE>(0).unwrap();
        write_native_bool(&mut body, 2, false);

        let mut wire = Vec::new();
        wire.write_u8(KIND_LIST).unwrap();
        wire.write_u32::<LE>(0).unwrap();
        wire.write_all(&body).unwrap();

        assert!(matches!(decode(&wire), Err(Error::MalformedList { .. })));
    }
}

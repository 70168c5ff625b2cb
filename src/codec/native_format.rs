//! ## NativeFormat codec (§4.4)
//!
//! Bridges an externally supplied nested value (from JSON, e.g. the startup
//! template in §6.4) into the flat `Model` representation, and back.
//!
//! `flatten` reproduces `pipboy.py`'s `BuiltinFormat.__load`: a depth-first
//! counter is threaded through the recursion so id allocation order is
//! deterministic and matches the reference (ids are assigned to a list's or
//! dict's children *before* the parent's own record is appended).

use crate::error::Result;
use crate::model::Model;
use crate::value::{Id, Record, Value};
use serde_json::Value as Json;

/// Flatten a nested JSON value into a flat batch of records, root (id 0)
/// last, ready to hand to `Model::load`.
pub fn flatten(root: &Json) -> Vec<Record> {
    let mut next_id = 0u32;
    let mut records = Vec::new();
    flatten_one(root, &mut next_id, &mut records);
    records
}

fn flatten_one(item: &Json, next_id: &mut u32, records: &mut Vec<Record>) -> Id {
    let id = Id(*next_id);
    *next_id += 1;

    let value = match item {
        Json::Null => Value::Bool(false),
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                narrow_integer(i)
            } else {
                Value::F64(n.as_f64().unwrap_or(0.0))
            }
        }
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => {
            let ids = items
                .iter()
                .map(|child| flatten_one(child, next_id, records))
                .collect();
            Value::List(ids)
        }
        Json::Object(map) => {
            let entries = map
                .iter()
                .map(|(key, child)| (key.clone(), flatten_one(child, next_id, records)))
                .collect();
            Value::Dict(entries)
        }
    };

    records.push((id, value));
    id
}

fn narrow_integer(n: i64) -> Value {
    // Mirrors tcp_format::write_int's own branch order (§4.2's range rule):
    // the sign is decided first, then -128/127 bounds within each sign.
    if n < 0 {
        if n < -128 {
            Value::I32(n as i32)
        } else {
            Value::I8(n as i8)
        }
    } else if n > 127 {
        Value::U32(n as u32)
    } else {
        Value::U8(n as u8)
    }
}

/// Inflate a `Model` back into a nested JSON value, starting from `id`
/// (§4.4's `dump_model`, generalized to start from any node rather than
/// always the root).
pub fn inflate(model: &Model, id: Id) -> Result<Json> {
    let value = model.get_item(id)?;
    let json = match value {
        Value::Bool(b) => Json::Bool(b),
        Value::I8(n) => Json::from(n),
        Value::U8(n) => Json::from(n),
        Value::I32(n) => Json::from(n),
        Value::U32(n) => Json::from(n),
        Value::F32(f) => serde_json::Number::from_f64(f as f64)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::F64(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Str(s) => Json::String(s),
        Value::List(ids) => {
            let mut items = Vec::with_capacity(ids.len());
            for child in ids {
                items.push(inflate(model, child)?);
            }
            Json::Array(items)
        }
        Value::Dict(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (name, child) in entries {
                map.insert(name, inflate(model, child)?);
            }
            Json::Object(map)
        }
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_then_inflate_round_trips() {
        // P4: inflate(flatten(V)) == V up to dict-iteration order.
        let original = json!({
            "Status": {
                "IsPlayerDead": false,
                "EffectColor": [0.08, 1.0, 0.09],
            },
            "Log": [],
            "Name": "Vault Dweller",
        });

        let records = flatten(&original);
        let model = Model::new();
        model.load(records);
        let roundtripped = inflate(&model, Id::ROOT).unwrap();

        assert_eq!(roundtripped, original);
    }

    #[test]
    fn parent_records_follow_children_depth_first() {
        let original = json!({"A": {"B": 1}});
        let records = flatten(&original);
        // root dict is id 0, "A" dict is some id > its own child "B" (id 1),
        // and root (id 0) is last overall.
        assert_eq!(records.last().unwrap().0, Id(0));
        let b_pos = records.iter().position(|(id, _)| *id == Id(1)).unwrap();
        let a_pos = records
            .iter()
            .position(|(_, v)| matches!(v, Value::Dict(entries) if entries.iter().any(|(k, v)| k == "B" && *v == Id(1))))
            .unwrap();
        assert!(b_pos < a_pos);
    }

    #[test]
    fn integers_are_narrowed_like_tcp_format_would_choose() {
        let records = flatten(&json!([5, -5, -200, 99999]));
        let Value::List(ids) = &records.last().unwrap().1 else {
            panic!("expected list")
        };
        let by_id = |id: Id| records.iter().find(|(i, _)| *i == id).unwrap().1.clone();
        assert_eq!(by_id(ids[0]), Value::U8(5));
        assert_eq!(by_id(ids[1]), Value::I8(-5));
        assert_eq!(by_id(ids[2]), Value::I32(-200));
        assert_eq!(by_id(ids[3]), Value::U32(99999));
    }
}

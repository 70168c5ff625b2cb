//! ## Model (§4.5)
//!
//! The identifier-keyed object graph both transport roles mirror. `items`
//! holds the flat value for every known id; `path` records, for every
//! non-root id, the edge label and parent it was last reached through — so
//! that a `List`/`Dict` container seen in one batch retroactively assigns
//! its children's paths. A single lock serializes `update`/`load`/`dump`
//! (I1: all three observe and leave the model in a consistent state, never
//! a partially-applied batch); listeners fire, in registration order (P7),
//! only after that lock is released, so a listener that itself calls back
//! into `get_item`/`dump` (as the server's forwarding listener does) never
//! deadlocks against the update that triggered it.

use crate::error::{Error, Result};
use crate::value::{Id, Record, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type UpdateListener = Box<dyn Fn(&[Id]) + Send>;
type CommandListener = Box<dyn Fn(&serde_json::Value) + Send>;

struct Data {
    items: HashMap<Id, Value>,
    path: HashMap<Id, (String, Id)>,
}

#[derive(Default)]
struct Listeners {
    update: Vec<UpdateListener>,
    command: Vec<CommandListener>,
}

/// Cheaply cloneable handle to the shared object graph; clones share the
/// same underlying state and listeners.
#[derive(Clone)]
pub struct Model {
    data: Arc<Mutex<Data>>,
    listeners: Arc<Mutex<Listeners>>,
}

impl Model {
    pub fn new() -> Self {
        Model {
            data: Arc::new(Mutex::new(Data {
                items: HashMap::new(),
                path: HashMap::new(),
            })),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Register a callback invoked with the changed `Id`s of every batch
    /// applied by `update` or `load`, in the order listeners were
    /// registered (P7). The callback calls back into `get_item`/`dump` for
    /// whichever ids it cares about, matching the original's `func(changed)`.
    pub fn on_update<F>(&self, listener: F)
    where
        F: Fn(&[Id]) + Send + 'static,
    {
        self.listeners.lock().update.push(Box::new(listener));
    }

    /// Register a callback invoked for every JSON command the transport
    /// layer hands to `dispatch_command`.
    pub fn on_command<F>(&self, listener: F)
    where
        F: Fn(&serde_json::Value) + Send + 'static,
    {
        self.listeners.lock().command.push(Box::new(listener));
    }

    pub fn dispatch_command(&self, command: &serde_json::Value) {
        // Cloning the registered listeners out from under the lock (rather
        // than holding it while running arbitrary callback code) keeps this
        // safe to call from inside another listener.
        let listeners = self.listeners.lock();
        for listener in &listeners.command {
            listener(command);
        }
    }

    pub fn get_item(&self, id: Id) -> Result<Value> {
        self.data
            .lock()
            .items
            .get(&id)
            .cloned()
            .ok_or(Error::UnknownId(id))
    }

    /// The edge label (e.g. `".Status"` or `"[3]"`) and parent `id` was last
    /// reached through. `ROOT` has no path and always errors (I2: the root
    /// is never anyone's child).
    pub fn get_path(&self, id: Id) -> Result<(String, Id)> {
        self.data.lock().path.get(&id).cloned().ok_or(Error::NoPath(id))
    }

    /// `get_path` rendered as the `"$"`-rooted dotted/bracketed string P6
    /// describes, e.g. the chain `Status`, `IsPlayerDead` renders as
    /// `"$.Status.IsPlayerDead"`.
    pub fn path_string(&self, id: Id) -> Result<String> {
        if id == Id::ROOT {
            return Ok("$".to_owned());
        }
        let data = self.data.lock();
        let mut segments = Vec::new();
        let mut current = id;
        while current != Id::ROOT {
            let (label, parent) = data.path.get(&current).ok_or(Error::NoPath(current))?;
            segments.push(label.clone());
            current = *parent;
        }
        segments.reverse();
        Ok(format!("${}", segments.concat()))
    }

    /// Apply a batch atomically: store every item, rewrite the path of any
    /// child referenced by a container in the batch, then notify update
    /// listeners with the batch exactly as received (P6, P7, scenario 2).
    pub fn update(&self, records: Vec<Record>) {
        {
            let mut data = self.data.lock();
            for (id, value) in &records {
                if let Value::List(ids) = value {
                    for (index, child) in ids.iter().enumerate() {
                        data.path.insert(*child, (format!("[{index}]"), *id));
                    }
                } else if let Value::Dict(entries) = value {
                    for (name, child) in entries {
                        data.path.insert(*child, (format!(".{name}"), *id));
                    }
                }
            }
            for (id, value) in &records {
                data.items.insert(*id, value.clone());
            }
        }
        let changed: Vec<Id> = records.iter().map(|(id, _)| *id).collect();
        let listeners = self.listeners.lock();
        for listener in &listeners.update {
            listener(&changed);
        }
    }

    /// Discard everything and apply `records` as the initial snapshot.
    pub fn load(&self, records: Vec<Record>) {
        {
            let mut data = self.data.lock();
            data.items.clear();
            data.path.clear();
        }
        self.update(records);
    }

    /// Dump the subtree rooted at `id`. Non-recursive returns just `id`'s
    /// own record; recursive returns every descendant post-order with `id`
    /// last, mirroring AppFormat's own ordering (§4.3, §4.5).
    pub fn dump(&self, id: Id, recursive: bool) -> Result<Vec<Record>> {
        let data = self.data.lock();
        if !recursive {
            let value = data.items.get(&id).cloned().ok_or(Error::UnknownId(id))?;
            return Ok(vec![(id, value)]);
        }
        let mut out = Vec::new();
        dump_recursive(&data, id, &mut out)?;
        Ok(out)
    }

    /// Reconstruct the subtree rooted at `id` as a nested JSON value, the
    /// inverse of `NativeFormat::flatten` (§4.4's `dump_model`).
    pub fn inflate(&self, id: Id) -> Result<serde_json::Value> {
        crate::codec::native_format::inflate(self, id)
    }
}

fn dump_recursive(data: &Data, id: Id, out: &mut Vec<Record>) -> Result<()> {
    let value = data.items.get(&id).cloned().ok_or(Error::UnknownId(id))?;
    for child in value.children() {
        dump_recursive(data, child, out)?;
    }
    out.push((id, value));
    Ok(())
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

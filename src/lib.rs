//! Mirrors a running game's live state tree to a LAN companion client: three
//! wire codecs, an identifier-keyed object model, and a channel-multiplexed
//! framed TCP transport with client and server roles driving snapshot +
//! delta replication over it.

pub mod client;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod model;
pub mod server;
pub mod startup;
pub mod transport;
pub mod value;
pub mod wire;

pub use error::{Error, Result};
pub use model::Model;
pub use value::{Id, Record, Value};

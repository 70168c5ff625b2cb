//! Unified error type for the codecs, model, and transport (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// TCPFormat read an unrecognized record tag. Per §7 the batch is
    /// truncated at the offending record; this is surfaced so the caller
    /// can log it, not treated as fatal to the connection.
    #[error("unknown TCPFormat tag {0}")]
    UnknownTag(u8),

    /// AppFormat read an unrecognized native type. Per §9's resolved open
    /// question this is a hard parse error rather than the Python
    /// reference's silent undefined behavior.
    #[error("unknown AppFormat native type {0}")]
    UnknownNativeType(u8),

    /// AppFormat list body skipped an index, leaving a gap.
    #[error("malformed AppFormat list: index {index} out of {count} not populated")]
    MalformedList { index: u32, count: u32 },

    /// A frame's channel byte did not match any channel this role understands.
    #[error("unknown channel {0}")]
    UnknownChannel(u8),

    /// The `Model` was asked for an id it has no item for.
    #[error("unknown id {0:?}")]
    UnknownId(crate::value::Id),

    /// The `Model` was asked for the path of an id unreachable from root.
    #[error("id {0:?} has no path from root")]
    NoPath(crate::value::Id),
}

pub type Result<T> = std::result::Result<T, Error>;

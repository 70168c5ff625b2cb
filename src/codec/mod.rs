//! The three wire codecs (§4.2–§4.4), each producing or consuming the same
//! flat `[(Id, Value)]` record sequence the `Model` operates on.

pub mod app_format;
pub mod native_format;
pub mod spelling;
pub mod tcp_format;

//! Common re-exports

pub use crate::{
    provider::*,
    rpc::{common::*, http::HttpTransport, rpc_types::*, PlatformRpc},
};

//! Common re-exports

pub use camino_core::prelude::*;

pub use crate::{
    builder::*,
    chain::ChainContext,
    enc::*,
    errors::*,
    nets::*,
    select::*,
    types::*,
};

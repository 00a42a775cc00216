//! callweave
//!
//! Post-build instrumentation weaver: rewrites call sites in compiled units
//! so network activity goes through capture wrappers.

pub mod ir;
pub mod pipeline;
pub mod utils;
pub mod weaver;

pub use utils::{Error, Result};

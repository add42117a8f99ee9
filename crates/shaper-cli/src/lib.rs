//! Shared pieces of the `shaper` and `shaper-pkg` binaries.

pub mod env;
pub mod logging;

//! Individual steps of the install process.
//!
//! Each step is implemented as a separate module with functions that
//! are called by the orchestrator in [`crate::installer`].

pub mod download;
pub mod install;
pub mod verify;

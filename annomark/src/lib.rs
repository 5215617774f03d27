//! Expose the annomark command implementations for integration tests. The
//! binary is the supported interface; this API may change between releases.
pub mod cli;
pub mod commands;

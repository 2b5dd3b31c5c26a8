//! CLI command implementations for stamp.

pub mod keys;
pub mod token;

//! Subcommand implementations, one per mode.

pub mod convert;
pub mod list;
pub mod validate;

//! Shared helpers: external commands, source selectors, MIME types.

pub mod exec;
pub mod fs;
pub mod glob;
pub mod mime;
pub mod plural;

//! Command modules - one file per binary

pub mod manifest;
pub mod query;
pub mod watch;

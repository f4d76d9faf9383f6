//! CLI subcommand implementations.

pub mod attendance;
pub mod leave;
pub mod record;
pub mod schedule;
pub mod summary;

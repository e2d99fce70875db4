//! CLI command implementations.

pub mod check_id;
pub mod hash;
pub mod serve;

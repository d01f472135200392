//! CLI command implementations.

pub mod enhance;
pub mod map;
pub mod marketplaces;

//! Application services and collaborator contracts.

pub mod detail_cache;
pub mod error;
pub mod freshness;
pub mod repos;
pub mod search_cache;
pub mod upstream;

//! Larder, a pantry-driven recipe discovery backend.
//!
//! The interesting part of this crate is the durable cache sitting in front
//! of a rate-limited, metered recipe API. Two cache shapes share a freshness
//! policy but are populated differently:
//!
//! - the **search cache** keys one row per normalized ingredient combination
//!   and holds the upstream search-result page for that combination;
//! - the **detail cache** keys one row per recipe id and is filled in bulk,
//!   one batched upstream call per gap.
//!
//! Both round-trip to Postgres on every lookup; there is no in-memory layer.
//! See `application::search_cache` and `application::detail_cache` for the
//! serving logic and `infra` for the Postgres, HTTP, and Spoonacular
//! adapters.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

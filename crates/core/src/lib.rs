//! Domain types and pure logic for the Sources resource.
//!
//! Nothing in this crate touches the database or the network. The
//! persistence layer (`sources-db`) and the HTTP layer (`sources-api`) call
//! into these helpers so the rules live in one place:
//!
//! - [`permissions`] -- permission inheritance from the upstream dataset.
//! - [`extra_json`] -- the open-ended `extra_json` metadata bag.
//! - [`form_data`] -- tolerant parsing of the stored `params` blob.
//! - [`explore`] -- deterministic explore URL construction.
//! - [`digest`] -- content digest used as the thumbnail cache key.
//! - [`authz`] -- explicit authorization context and ownership checks.

pub mod audit;
pub mod authz;
pub mod datasource;
pub mod digest;
pub mod error;
pub mod explore;
pub mod export;
pub mod extra_json;
pub mod form_data;
pub mod markdown;
pub mod pagination;
pub mod permissions;
pub mod roles;
pub mod thumbnail;
pub mod time;
pub mod types;

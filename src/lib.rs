//! prefstore: a small self-hosted preference service.
//!
//! Sites register defaults for typed preference keys; users accumulate
//! per-user overrides; the read path serves the cached merge of the two.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

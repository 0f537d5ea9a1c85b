//! Application services: cached stores and the preference resolver.

pub mod defaults;
pub mod error;
pub mod identity;
pub mod overrides;
pub mod preferences;
pub mod repos;
pub mod sites;

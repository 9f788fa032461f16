//! Cache API-backed cache storage adapters.

pub mod cache_api;

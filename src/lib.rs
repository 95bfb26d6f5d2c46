//! Resilient TMDB catalog client with a freshness-ranked trailer feed.
//!
//! Discovery lists are fetched concurrently, merged without duplicates and
//! ranked by the publish time of each title's best promotional video.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

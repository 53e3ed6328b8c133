//! brusio: a small self-hosted blogging network.
//!
//! Authors write posts, file them into groups, comment, and follow each
//! other. The interesting machinery is the feed pipeline: listing views,
//! page-number pagination, and a short-TTL cache in front of the global feed.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

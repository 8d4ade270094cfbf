//! # fetchini-remote
//!
//! GitHub contents-API implementation of [`fetchini_core::RemoteSource`].

pub mod github;

pub use github::{GithubClient, MAX_CONTENT_BYTES};

//! API client library for the TVRage XML feeds.
//!
//! Maps each feed endpoint's XML response into a typed, read-only object
//! graph.

/// TVRage feed API client.
pub mod tvrage;

//! CORS-permissive HTTP relay for HLS streams.
//!
//! Fetches a remote resource with spoofed browser headers, re-emits it with
//! open CORS headers and rewrites HLS playlists so every segment and nested
//! playlist is requested through the relay as well.

pub mod config;
pub mod content;
pub mod error;
pub mod hls;
pub mod metrics;
pub mod relay;
pub mod server;
pub mod upstream;

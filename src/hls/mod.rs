//! HLS playlist handling.

pub mod rewrite;

pub use rewrite::rewrite_playlist;

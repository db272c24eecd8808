//! Sample block sources
//!
//! Frame-aligned block framing for streaming analysis.

pub mod block_stream;

//! Spectral feature modules
//!
//! - Magnitude STFT (frame-aligned, no centering)
//! - Streaming PCEN
//! - Reductions over normalized blocks

pub mod pcen;
pub mod reduce;
pub mod stft;

//! # pcen-stream
//!
//! Block-wise streaming Per-Channel Energy Normalization (PCEN) for magnitude
//! spectrograms.
//!
//! PCEN normalizes each frequency channel by a recursively smoothed energy
//! reference and compresses the result. The smoother is the only state, and
//! it is carried explicitly between blocks, so a signal normalized block by
//! block matches the same signal normalized in one call.
//!
//! ## Quick Start
//!
//! ```
//! use pcen_stream::{PcenConfig, Spectrogram, StreamingPcen};
//!
//! let pcen = StreamingPcen::new(PcenConfig::default())?;
//! let block = Spectrogram::zeros(1025, 32); // bins x frames
//!
//! let (normalized, state) = pcen.process(&block, None)?;
//! let (next, state) = pcen.process(&block, state.as_ref())?;
//! # let _ = (normalized, next, state);
//! # Ok::<(), pcen_stream::PcenError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Signal → BlockStream → StftProcessor → StreamingPcen (+ state) → consumer
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod spectrogram;

// Re-export main types
pub use config::{PcenConfig, PoleDerivation};
pub use error::PcenError;
pub use features::pcen::{PcenState, StreamingPcen};
pub use io::block_stream::{BlockStream, StreamConfig};
pub use spectrogram::Spectrogram;

use features::stft::StftProcessor;

/// Normalize a whole spectrogram in one call
///
/// Equivalent to a single [`StreamingPcen::process`] call with no prior state.
///
/// # Arguments
///
/// * `spectrogram` - Magnitude spectrogram (n_bins × n_frames), non-negative
/// * `config` - PCEN configuration
///
/// # Errors
///
/// Returns `PcenError` if the configuration is invalid or any magnitude is
/// negative or non-finite.
///
/// # Example
///
/// ```
/// use pcen_stream::{pcen, PcenConfig, Spectrogram};
///
/// let spec = Spectrogram::zeros(257, 100);
/// let normalized = pcen(&spec, PcenConfig::default())?;
/// assert_eq!(normalized.n_frames(), 100);
/// # Ok::<(), pcen_stream::PcenError>(())
/// ```
pub fn pcen(spectrogram: &Spectrogram, config: PcenConfig) -> Result<Spectrogram, PcenError> {
    let filter = StreamingPcen::new(config)?;
    let (normalized, _) = filter.process(spectrogram, None)?;
    Ok(normalized)
}

/// Run the full streaming chain over a signal
///
/// Frames `signal` into blocks, takes the magnitude STFT of each block with
/// `stream.frame_length` as FFT size, and normalizes the blocks in order with
/// state carried between them. The PCEN hop length should match
/// `stream.hop_length` for the time constant to be meaningful.
///
/// # Returns
///
/// Normalized blocks in stream order
///
/// # Errors
///
/// Returns `PcenError` if the stream or PCEN configuration is invalid.
pub fn stream_pcen(
    signal: &[f32],
    stream: &StreamConfig,
    config: PcenConfig,
) -> Result<Vec<Spectrogram>, PcenError> {
    if config.hop_length != stream.hop_length {
        log::warn!(
            "PCEN hop length {} differs from stream hop length {}",
            config.hop_length,
            stream.hop_length
        );
    }

    let filter = StreamingPcen::new(config)?;
    let stft = StftProcessor::new(stream.frame_length, stream.hop_length)?;
    let blocks = BlockStream::new(signal, stream.clone())?;

    let mut state = None;
    let mut outputs = Vec::new();
    for samples in blocks {
        let magnitude = stft.magnitude(&samples);
        let (normalized, next) = filter.process(&magnitude, state.as_ref())?;
        outputs.push(normalized);
        state = next;
    }

    log::debug!(
        "Streamed {} samples into {} PCEN blocks",
        signal.len(),
        outputs.len()
    );

    Ok(outputs)
}

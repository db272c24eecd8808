//! Frame-aligned sample blocks for streaming analysis
//!
//! Each block holds `block_length` frames of `frame_length` samples at
//! `hop_length` spacing, i.e. `frame_length + (block_length - 1) * hop_length`
//! samples. Block `i` starts at sample `i * block_length * hop_length`, so
//! the frames of consecutive blocks form one contiguous frame sequence.
//!
//! # Example
//!
//! ```
//! use pcen_stream::io::block_stream::{BlockStream, StreamConfig};
//!
//! let signal = vec![0.0f32; 10_000];
//! let config = StreamConfig {
//!     block_length: 4,
//!     frame_length: 1024,
//!     hop_length: 256,
//!     fill_value: None,
//! };
//!
//! for block in BlockStream::new(&signal, config)? {
//!     assert!(block.len() >= 1024);
//! }
//! # Ok::<(), pcen_stream::PcenError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PcenError;

/// Block framing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Frames per block (default: 16)
    pub block_length: usize,

    /// Samples per frame, normally the FFT size (default: 2048)
    pub frame_length: usize,

    /// Samples between frame starts (default: 512)
    pub hop_length: usize,

    /// Pad the final short block to full length with this value (default: None)
    /// Without it the final block ends at its last complete frame
    pub fill_value: Option<f32>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            block_length: 16,
            frame_length: 2048,
            hop_length: 512,
            fill_value: None,
        }
    }
}

impl StreamConfig {
    /// Samples spanned by one full block
    pub fn block_samples(&self) -> usize {
        self.frame_length + (self.block_length - 1) * self.hop_length
    }

    /// Samples between block starts
    pub fn block_advance(&self) -> usize {
        self.block_length * self.hop_length
    }

    fn validate(&self) -> Result<(), PcenError> {
        if self.block_length == 0 {
            return Err(PcenError::InvalidInput(
                "Block length must be > 0".to_string(),
            ));
        }
        if self.frame_length == 0 {
            return Err(PcenError::InvalidInput(
                "Frame length must be > 0".to_string(),
            ));
        }
        if self.hop_length == 0 {
            return Err(PcenError::InvalidInput(
                "Hop length must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Iterator over frame-aligned sample blocks of a borrowed signal
#[derive(Debug)]
pub struct BlockStream<'a> {
    signal: &'a [f32],
    config: StreamConfig,
    position: usize,
}

impl<'a> BlockStream<'a> {
    /// Create a block stream over `signal`
    ///
    /// # Errors
    ///
    /// Returns `PcenError::InvalidInput` if any length parameter is zero.
    pub fn new(signal: &'a [f32], config: StreamConfig) -> Result<Self, PcenError> {
        config.validate()?;
        log::debug!(
            "Block stream: {} samples, block={} frames, frame={}, hop={}, fill={:?}",
            signal.len(),
            config.block_length,
            config.frame_length,
            config.hop_length,
            config.fill_value
        );
        Ok(Self {
            signal,
            config,
            position: 0,
        })
    }

    /// Framing parameters
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl Iterator for BlockStream<'_> {
    type Item = Vec<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        let remaining = self.signal.len().saturating_sub(start);
        let full = self.config.block_samples();

        let block = if remaining >= full {
            self.signal[start..start + full].to_vec()
        } else {
            match self.config.fill_value {
                Some(fill) => {
                    if remaining == 0 {
                        return None;
                    }
                    let mut block = self.signal[start..].to_vec();
                    block.resize(full, fill);
                    block
                }
                None => {
                    if remaining < self.config.frame_length {
                        return None;
                    }
                    let (frame, hop) = (self.config.frame_length, self.config.hop_length);
                    let frames = (remaining - frame) / hop + 1;
                    let len = frame + (frames - 1) * hop;
                    self.signal[start..start + len].to_vec()
                }
            }
        };

        self.position += self.config.block_advance();
        Some(block)
    }
}

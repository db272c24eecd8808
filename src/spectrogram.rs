//! Magnitude spectrogram storage
//!
//! A [`Spectrogram`] is a bins × frames matrix stored bin-major: each frequency
//! bin owns one contiguous row of `n_frames` values. PCEN runs along rows, so
//! this layout keeps the recursive smoother on sequential memory.

use serde::{Deserialize, Serialize};

use crate::error::PcenError;

/// Real-valued frequency × time matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrogram {
    n_bins: usize,
    n_frames: usize,
    data: Vec<f32>,
}

impl Spectrogram {
    /// Build a spectrogram from bin-major data
    ///
    /// # Errors
    ///
    /// Returns `PcenError::Shape` if `data.len() != n_bins * n_frames`.
    pub fn new(n_bins: usize, n_frames: usize, data: Vec<f32>) -> Result<Self, PcenError> {
        if data.len() != n_bins * n_frames {
            return Err(PcenError::Shape(format!(
                "Expected {} values for {} bins x {} frames, got {}",
                n_bins * n_frames,
                n_bins,
                n_frames,
                data.len()
            )));
        }
        Ok(Self {
            n_bins,
            n_frames,
            data,
        })
    }

    /// All-zero spectrogram
    pub fn zeros(n_bins: usize, n_frames: usize) -> Self {
        Self {
            n_bins,
            n_frames,
            data: vec![0.0; n_bins * n_frames],
        }
    }

    /// Build from one row per frequency bin
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, PcenError> {
        let n_frames = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_frames) {
            return Err(PcenError::Shape(format!(
                "Row {} has {} frames, expected {}",
                bad,
                rows[bad].len(),
                n_frames
            )));
        }
        Ok(Self {
            n_bins: rows.len(),
            n_frames,
            data: rows.concat(),
        })
    }

    /// Build from one spectrum per time frame (n_frames × n_bins)
    pub fn from_frames(frames: &[Vec<f32>]) -> Result<Self, PcenError> {
        let n_bins = frames.first().map_or(0, Vec::len);
        let n_frames = frames.len();
        let mut data = vec![0.0; n_bins * n_frames];
        for (t, frame) in frames.iter().enumerate() {
            if frame.len() != n_bins {
                return Err(PcenError::Shape(format!(
                    "Frame {} has {} bins, expected {}",
                    t,
                    frame.len(),
                    n_bins
                )));
            }
            for (f, &v) in frame.iter().enumerate() {
                data[f * n_frames + t] = v;
            }
        }
        Ok(Self {
            n_bins,
            n_frames,
            data,
        })
    }

    /// Number of frequency bins
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Number of time frames
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Value at (`bin`, `frame`)
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, bin: usize, frame: usize) -> f32 {
        assert!(bin < self.n_bins && frame < self.n_frames);
        self.data[bin * self.n_frames + frame]
    }

    /// Time series of one frequency bin
    pub fn row(&self, bin: usize) -> &[f32] {
        &self.data[bin * self.n_frames..(bin + 1) * self.n_frames]
    }

    /// Mutable time series of one frequency bin
    pub fn row_mut(&mut self, bin: usize) -> &mut [f32] {
        let n = self.n_frames;
        &mut self.data[bin * n..(bin + 1) * n]
    }

    /// Iterate over bin rows
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.n_bins).map(move |f| self.row(f))
    }

    /// Raw bin-major data
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Spectrum of one time frame
    pub fn frame(&self, frame: usize) -> Vec<f32> {
        (0..self.n_bins)
            .map(|f| self.data[f * self.n_frames + frame])
            .collect()
    }

    /// Copy of frames `start..end`
    pub fn slice_frames(&self, start: usize, end: usize) -> Result<Self, PcenError> {
        if start > end || end > self.n_frames {
            return Err(PcenError::Shape(format!(
                "Frame range {}..{} out of bounds for {} frames",
                start, end, self.n_frames
            )));
        }
        let width = end - start;
        let mut data = Vec::with_capacity(self.n_bins * width);
        for f in 0..self.n_bins {
            data.extend_from_slice(&self.row(f)[start..end]);
        }
        Ok(Self {
            n_bins: self.n_bins,
            n_frames: width,
            data,
        })
    }

    /// Split into consecutive blocks of `block_frames` frames (last block may be shorter)
    pub fn split_frames(&self, block_frames: usize) -> Result<Vec<Self>, PcenError> {
        if block_frames == 0 {
            return Err(PcenError::InvalidInput(
                "Block length must be > 0".to_string(),
            ));
        }
        (0..self.n_frames)
            .step_by(block_frames)
            .map(|start| self.slice_frames(start, (start + block_frames).min(self.n_frames)))
            .collect()
    }

    /// Join blocks along the time axis
    ///
    /// # Errors
    ///
    /// Returns `PcenError::Shape` if blocks disagree on bin count.
    pub fn concat_frames(blocks: &[Self]) -> Result<Self, PcenError> {
        let n_bins = blocks.first().map_or(0, |b| b.n_bins);
        if let Some(bad) = blocks.iter().position(|b| b.n_bins != n_bins) {
            return Err(PcenError::Shape(format!(
                "Block {} has {} bins, expected {}",
                bad, blocks[bad].n_bins, n_bins
            )));
        }
        let n_frames: usize = blocks.iter().map(|b| b.n_frames).sum();
        let mut data = Vec::with_capacity(n_bins * n_frames);
        for f in 0..n_bins {
            for block in blocks {
                data.extend_from_slice(block.row(f));
            }
        }
        Ok(Self {
            n_bins,
            n_frames,
            data,
        })
    }
}

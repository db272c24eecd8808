//! Streaming Per-Channel Energy Normalization
//!
//! PCEN normalizes each frequency channel by a smoothed, time-varying energy
//! reference and then compresses the result:
//!
//! ```text
//! M[t] = (1 - b) * M[t-1] + b * E[t]
//! G[t] = (eps + M[t])^(-alpha)
//! out[t] = (E[t] * G[t] + delta)^r - delta^r
//! ```
//!
//! The smoother `M` is the only state. [`StreamingPcen::process`] takes the
//! state left by the previous block and returns the state after the current
//! one, so a signal processed block by block matches the signal processed in
//! a single call.
//!
//! # Reference
//!
//! Wang, Y., Getreuer, P., Hughes, T., Lyon, R. F., & Saurous, R. A. (2017).
//! Trainable Frontend for Robust and Far-Field Keyword Spotting. *ICASSP 2017*.
//!
//! Lostanlen, V., Salamon, J., Cartwright, M., McFee, B., Farnsworth, A., Kelling, S.,
//! & Bello, J. P. (2019). Per-Channel Energy Normalization: Why and How.
//! *IEEE Signal Processing Letters*, 26(1), 39-43.
//!
//! # Example
//!
//! ```
//! use pcen_stream::{PcenConfig, Spectrogram, StreamingPcen};
//!
//! let pcen = StreamingPcen::new(PcenConfig::default())?;
//! let blocks = vec![Spectrogram::zeros(513, 16); 4];
//!
//! let mut state = None;
//! for block in &blocks {
//!     let (normalized, next) = pcen.process(block, state.as_ref())?;
//!     assert_eq!(normalized.n_frames(), 16);
//!     state = next;
//! }
//! # Ok::<(), pcen_stream::PcenError>(())
//! ```

mod compression;
mod smoothing;

use serde::{Deserialize, Serialize};

use crate::config::PcenConfig;
use crate::error::PcenError;
use crate::spectrogram::Spectrogram;

use compression::Compressor;

/// Smoother memory carried between blocks, one value per frequency bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcenState {
    smoothed: Vec<f32>,
}

impl PcenState {
    /// State from explicit per-bin smoother values
    ///
    /// Values are not checked here; [`StreamingPcen::process`] rejects negative
    /// or non-finite entries.
    pub fn new(smoothed: Vec<f32>) -> Self {
        Self { smoothed }
    }

    /// Steady state for a frame of constant per-bin energy
    ///
    /// A constant input is a fixed point of the smoother, so the steady state is
    /// the energy itself.
    pub fn steady_state(energy: &[f32]) -> Self {
        Self {
            smoothed: energy.to_vec(),
        }
    }

    /// Number of frequency bins
    pub fn n_bins(&self) -> usize {
        self.smoothed.len()
    }

    /// Per-bin smoother values
    pub fn as_slice(&self) -> &[f32] {
        &self.smoothed
    }
}

/// PCEN filter with validated, immutable coefficients
///
/// Holds no per-stream data; one instance can serve any number of streams,
/// including concurrently from several threads.
#[derive(Debug, Clone)]
pub struct StreamingPcen {
    config: PcenConfig,
    b: f32,
    ln_eps: f32,
    compressor: Compressor,
}

impl StreamingPcen {
    /// Validate `config` and derive the filter coefficients
    ///
    /// # Errors
    ///
    /// Returns `PcenError::Configuration` if any parameter is invalid or the
    /// smoothing coefficient `b` falls outside (0, 1].
    pub fn new(config: PcenConfig) -> Result<Self, PcenError> {
        let b = config.validate()?;

        log::debug!(
            "PCEN filter: b={:.6} (t={:.2} frames), gain={}, bias={}, power={}, eps={:e}, \
             max_size={}",
            b,
            config.time_constant_frames(),
            config.gain,
            config.bias,
            config.power,
            config.eps,
            config.max_size
        );

        Ok(Self {
            ln_eps: config.eps.ln(),
            compressor: Compressor::new(config.power, config.bias),
            config,
            b,
        })
    }

    /// Filter configuration
    pub fn config(&self) -> &PcenConfig {
        &self.config
    }

    /// Derived smoothing coefficient `b`
    pub fn smoothing_coefficient(&self) -> f32 {
        self.b
    }

    /// Normalize one spectrogram block
    ///
    /// # Arguments
    ///
    /// * `block` - Magnitude spectrogram block (n_bins × n_frames), non-negative
    /// * `state` - State returned by the previous call of this stream, or `None`
    ///   for the first block
    ///
    /// # Returns
    ///
    /// The normalized block (same shape as `block`) and the state to pass to the
    /// next call. With `state = None` the smoother starts at the steady state of
    /// the first frame. A block with no frames returns `state` unchanged.
    ///
    /// # Errors
    ///
    /// - `PcenError::Shape` if `state` has a different bin count than `block`
    /// - `PcenError::NumericalDomain` if any magnitude or state value is negative
    ///   or non-finite
    ///
    /// On error no state is returned; the caller's state is untouched.
    pub fn process(
        &self,
        block: &Spectrogram,
        state: Option<&PcenState>,
    ) -> Result<(Spectrogram, Option<PcenState>), PcenError> {
        let n_bins = block.n_bins();
        let n_frames = block.n_frames();

        if let Some(state) = state {
            if state.n_bins() != n_bins {
                return Err(PcenError::Shape(format!(
                    "State has {} bins but block has {}",
                    state.n_bins(),
                    n_bins
                )));
            }
            if let Some(f) = state
                .smoothed
                .iter()
                .position(|&m| !(m >= 0.0 && m.is_finite()))
            {
                return Err(PcenError::NumericalDomain(format!(
                    "State at bin {} is {}; expected finite and >= 0",
                    f, state.smoothed[f]
                )));
            }
        }

        if let Some(pos) = block
            .as_slice()
            .iter()
            .position(|&x| !(x >= 0.0 && x.is_finite()))
        {
            return Err(PcenError::NumericalDomain(format!(
                "Magnitude at bin {}, frame {} is {}; expected finite and >= 0",
                pos / n_frames,
                pos % n_frames,
                block.as_slice()[pos]
            )));
        }

        if n_frames == 0 {
            log::debug!("Empty PCEN block ({} bins), state unchanged", n_bins);
            return Ok((Spectrogram::zeros(n_bins, 0), state.cloned()));
        }

        log::trace!(
            "PCEN block: {} bins x {} frames, carried state: {}",
            n_bins,
            n_frames,
            state.is_some()
        );

        let reference = smoothing::max_filter_frequency(block, self.config.max_size);
        let mut output = Spectrogram::zeros(n_bins, n_frames);
        let mut smoothed = Vec::with_capacity(n_bins);

        for f in 0..n_bins {
            let reference_row = reference.row(f);
            let initial = match state {
                Some(state) => state.smoothed[f],
                None => reference_row[0],
            };

            let out = output.row_mut(f);
            smoothed.push(smoothing::smooth_row(reference_row, self.b, initial, out));

            // `out` now holds the smoother trajectory
            for (y, &magnitude) in out.iter_mut().zip(block.row(f)) {
                *y = self.compressor.compress(self.normalize(magnitude, *y));
            }
        }

        Ok((output, Some(PcenState { smoothed })))
    }

    /// Process consecutive blocks of one stream, threading state between them
    ///
    /// Returns the normalized blocks and the final state.
    pub fn process_sequence<'a, I>(
        &self,
        blocks: I,
        state: Option<PcenState>,
    ) -> Result<(Vec<Spectrogram>, Option<PcenState>), PcenError>
    where
        I: IntoIterator<Item = &'a Spectrogram>,
    {
        let mut state = state;
        let mut outputs = Vec::new();
        for block in blocks {
            let (normalized, next) = self.process(block, state.as_ref())?;
            outputs.push(normalized);
            state = next;
        }
        Ok((outputs, state))
    }

    /// Log of the adaptive gain, `-alpha * ln(eps + m)`
    fn log_gain(&self, smoothed: f32) -> f32 {
        -self.config.gain * (self.ln_eps + (smoothed / self.config.eps).ln_1p())
    }

    /// Gain-normalized magnitude `E * (eps + m)^(-alpha)`
    ///
    /// The product is formed in the log domain: for large `alpha` the gain
    /// alone overflows `f32` while the product stays finite.
    fn normalize(&self, magnitude: f32, smoothed: f32) -> f32 {
        if magnitude == 0.0 {
            return 0.0;
        }
        (magnitude.ln() + self.log_gain(smoothed)).exp()
    }
}

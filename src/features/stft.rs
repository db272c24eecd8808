//! Magnitude STFT for spectrogram blocks
//!
//! Frames are taken without centering or padding: frame `j` starts at sample
//! `j * hop_length`. This keeps block boundaries frame-aligned, so the STFT of
//! consecutive sample blocks from [`BlockStream`](crate::io::block_stream::BlockStream)
//! tiles the STFT of the whole signal.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::PcenError;
use crate::spectrogram::Spectrogram;

/// Planned forward FFT plus analysis window, reusable across blocks
pub struct StftProcessor {
    n_fft: usize,
    hop_length: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for StftProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StftProcessor")
            .field("n_fft", &self.n_fft)
            .field("hop_length", &self.hop_length)
            .finish()
    }
}

impl StftProcessor {
    /// Create a processor with a periodic Hann window of `n_fft` samples
    ///
    /// # Errors
    ///
    /// Returns `PcenError::InvalidInput` if `n_fft` or `hop_length` is zero.
    pub fn new(n_fft: usize, hop_length: usize) -> Result<Self, PcenError> {
        if n_fft == 0 {
            return Err(PcenError::InvalidInput("FFT size must be > 0".to_string()));
        }
        if hop_length == 0 {
            return Err(PcenError::InvalidInput("Hop length must be > 0".to_string()));
        }

        let window = (0..n_fft)
            .map(|i| {
                let t = 2.0 * std::f32::consts::PI * i as f32 / n_fft as f32;
                0.5 * (1.0 - t.cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);

        Ok(Self {
            n_fft,
            hop_length,
            window,
            fft,
        })
    }

    /// Number of frequency bins (`n_fft / 2 + 1`)
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Number of complete frames in `n_samples` samples
    pub fn n_frames(&self, n_samples: usize) -> usize {
        if n_samples < self.n_fft {
            0
        } else {
            (n_samples - self.n_fft) / self.hop_length + 1
        }
    }

    /// Magnitude spectrogram of `samples` (n_bins × n_frames)
    pub fn magnitude(&self, samples: &[f32]) -> Spectrogram {
        let n_frames = self.n_frames(samples.len());
        let n_bins = self.n_bins();

        if n_frames == 0 {
            log::debug!(
                "{} samples shorter than FFT size {}, no frames",
                samples.len(),
                self.n_fft
            );
        }

        let mut spec = Spectrogram::zeros(n_bins, n_frames);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut frame_mags = vec![0.0f32; n_bins];

        for t in 0..n_frames {
            let start = t * self.hop_length;
            let frame = &samples[start..start + self.n_fft];
            for ((c, &x), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
                *c = Complex::new(x * w, 0.0);
            }

            self.fft.process(&mut buffer);

            for (m, c) in frame_mags.iter_mut().zip(&buffer) {
                *m = c.norm();
            }
            for (f, &m) in frame_mags.iter().enumerate() {
                spec.row_mut(f)[t] = m;
            }
        }

        spec
    }
}

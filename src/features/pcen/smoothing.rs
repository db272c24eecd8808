//! First-order recursive smoother and frequency max-filter
//!
//! The smoother is a one-pole low-pass along time:
//!
//! ```text
//! smooth[t] = (1 - b) * smooth[t-1] + b * x[t]
//! ```
//!
//! A constant input `m` is a fixed point (`smooth = m`), which makes `m` the
//! steady-state initializer for the first block of a stream.

use std::borrow::Cow;

use crate::spectrogram::Spectrogram;

/// Run the smoother over `input`, writing the trajectory into `out`
///
/// Returns the smoother value after the last sample (or `initial` if `input` is empty).
pub(crate) fn smooth_row(input: &[f32], b: f32, initial: f32, out: &mut [f32]) -> f32 {
    debug_assert_eq!(input.len(), out.len());
    let decay = 1.0 - b;
    let mut state = initial;
    for (y, &x) in out.iter_mut().zip(input) {
        state = decay * state + b * x;
        *y = state;
    }
    state
}

/// Max over a `size`-wide neighbourhood of bins, per frame
///
/// Windows are centred (`size / 2` bins below) and clipped at the edges.
pub(crate) fn max_filter_frequency(spec: &Spectrogram, size: usize) -> Cow<'_, Spectrogram> {
    if size <= 1 || spec.n_bins() == 0 {
        return Cow::Borrowed(spec);
    }

    let n_bins = spec.n_bins();
    let below = size / 2;
    let above = size - 1 - below;
    let mut filtered = Spectrogram::zeros(n_bins, spec.n_frames());

    for f in 0..n_bins {
        let lo = f.saturating_sub(below);
        let hi = (f + above).min(n_bins - 1);
        let out = filtered.row_mut(f);
        out.copy_from_slice(spec.row(lo));
        for g in (lo + 1)..=hi {
            for (y, &x) in out.iter_mut().zip(spec.row(g)) {
                *y = y.max(x);
            }
        }
    }

    Cow::Owned(filtered)
}

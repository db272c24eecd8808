//! Reductions over normalized spectrogram blocks

use crate::spectrogram::Spectrogram;

/// Maximum over frequency bins for each frame
///
/// Returns one value per frame; empty if the spectrogram has no bins.
pub fn max_over_frequency(spec: &Spectrogram) -> Vec<f32> {
    if spec.n_bins() == 0 {
        return Vec::new();
    }
    let mut peaks = spec.row(0).to_vec();
    for row in spec.rows().skip(1) {
        for (p, &x) in peaks.iter_mut().zip(row) {
            *p = p.max(x);
        }
    }
    peaks
}

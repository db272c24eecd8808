//! Parallel processing of independent streams
//!
//! Each stream threads its own [`PcenState`](crate::PcenState) through its
//! blocks in order; different streams share nothing but the immutable filter,
//! so they run on the rayon thread pool without synchronization.

use rayon::prelude::*;

use crate::error::PcenError;
use crate::features::pcen::StreamingPcen;
use crate::spectrogram::Spectrogram;

/// Normalize several block streams in parallel
///
/// # Arguments
///
/// * `pcen` - Shared filter
/// * `streams` - One sequence of consecutive blocks per stream
///
/// # Returns
///
/// One spectrogram per stream: its normalized blocks joined along time,
/// in input order.
///
/// # Errors
///
/// Returns the first error encountered by any stream.
pub fn process_streams(
    pcen: &StreamingPcen,
    streams: &[Vec<Spectrogram>],
) -> Result<Vec<Spectrogram>, PcenError> {
    log::debug!("Processing {} PCEN streams in parallel", streams.len());

    streams
        .par_iter()
        .enumerate()
        .map(|(i, blocks)| {
            let (outputs, _) = pcen.process_sequence(blocks, None).map_err(|e| {
                log::warn!("Stream {} failed: {}", i, e);
                e
            })?;
            Spectrogram::concat_frames(&outputs)
        })
        .collect()
}

/// Same as [`process_streams`] on a dedicated pool with `num_threads` workers
pub fn process_streams_with_threads(
    pcen: &StreamingPcen,
    streams: &[Vec<Spectrogram>],
    num_threads: usize,
) -> Result<Vec<Spectrogram>, PcenError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| PcenError::InvalidInput(format!("Failed to build thread pool: {}", e)))?;
    pool.install(|| process_streams(pcen, streams))
}

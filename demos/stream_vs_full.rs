//! Example: stream PCEN block by block and compare against one whole-signal call
//!
//! Run with `RUST_LOG=debug` to see the filter coefficients and block counts.

use pcen_stream::features::reduce::max_over_frequency;
use pcen_stream::features::stft::StftProcessor;
use pcen_stream::{pcen, stream_pcen, PcenConfig, Spectrogram, StreamConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // Rising tone in 250 ms bursts, 5 seconds at 22.05 kHz
    let sample_rate = 22050;
    let samples: Vec<f32> = (0..sample_rate * 5)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let gate = if (t * 4.0) as usize % 2 == 0 { 1.0 } else { 0.1 };
            let freq = 220.0 + 400.0 * t;
            gate * 0.5 * (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect();

    let stream = StreamConfig {
        block_length: 16,
        frame_length: 2048,
        hop_length: 512,
        fill_value: None,
    };
    let config = PcenConfig {
        sample_rate: sample_rate as u32,
        hop_length: stream.hop_length,
        ..Default::default()
    };

    let blocks = stream_pcen(&samples, &stream, config.clone())?;
    let streamed = Spectrogram::concat_frames(&blocks)?;

    let stft = StftProcessor::new(stream.frame_length, stream.hop_length)?;
    let whole = pcen(&stft.magnitude(&samples), config)?;

    let max_diff = streamed
        .as_slice()
        .iter()
        .zip(whole.as_slice())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max);

    let peaks = max_over_frequency(&streamed);
    let loudest = peaks.iter().copied().fold(0.0f32, f32::max);

    println!("Streaming PCEN:");
    println!("  Blocks: {}", blocks.len());
    println!("  Frames: {} (whole signal: {})", streamed.n_frames(), whole.n_frames());
    println!("  Max |streamed - whole|: {:e}", max_diff);
    println!("  Peak PCEN value: {:.4}", loudest);

    Ok(())
}

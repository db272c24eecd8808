//! Integration tests for streaming PCEN

use pcen_stream::features::reduce::max_over_frequency;
use pcen_stream::features::stft::StftProcessor;
use pcen_stream::{
    pcen, stream_pcen, PcenConfig, PcenError, PcenState, PoleDerivation, Spectrogram,
    StreamConfig, StreamingPcen,
};

/// Linear chirp with a gated amplitude envelope, silent lead-in included
fn generate_gated_chirp(duration_seconds: f32, sample_rate: f32) -> Vec<f32> {
    let n = (duration_seconds * sample_rate) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate;
            if t < 0.25 {
                return 0.0;
            }
            let freq = 200.0 + 1500.0 * t;
            let gate = if (t * 4.0) as usize % 2 == 0 { 1.0 } else { 0.05 };
            gate * 0.5 * (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

fn assert_close(a: &Spectrogram, b: &Spectrogram, rel: f32) {
    assert_eq!(a.n_bins(), b.n_bins());
    assert_eq!(a.n_frames(), b.n_frames());
    for (i, (&x, &y)) in a.as_slice().iter().zip(b.as_slice()).enumerate() {
        let scale = x.abs().max(y.abs()).max(1e-12);
        assert!(
            (x - y).abs() <= rel * scale,
            "value {} differs: {} vs {}",
            i,
            x,
            y
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 22050;
    const N_FFT: usize = 1024;
    const HOP: usize = 256;

    fn pcen_config() -> PcenConfig {
        PcenConfig {
            sample_rate: SAMPLE_RATE,
            hop_length: HOP,
            time_constant: 0.06,
            ..Default::default()
        }
    }

    #[test]
    fn test_streamed_signal_matches_whole_signal() {
        let signal = generate_gated_chirp(2.0, SAMPLE_RATE as f32);
        let stft = StftProcessor::new(N_FFT, HOP).unwrap();
        let whole = pcen(&stft.magnitude(&signal), pcen_config()).unwrap();

        for block_length in [1, 4, 13, 64] {
            let stream = StreamConfig {
                block_length,
                frame_length: N_FFT,
                hop_length: HOP,
                fill_value: None,
            };
            let blocks = stream_pcen(&signal, &stream, pcen_config()).unwrap();
            assert!(blocks.iter().all(|b| b.n_frames() <= block_length));

            let streamed = Spectrogram::concat_frames(&blocks).unwrap();
            assert_close(&streamed, &whole, 1e-5);
        }
    }

    #[test]
    fn test_streamed_peaks_match_whole_signal_peaks() {
        let signal = generate_gated_chirp(1.5, SAMPLE_RATE as f32);
        let stft = StftProcessor::new(N_FFT, HOP).unwrap();
        let whole = pcen(&stft.magnitude(&signal), pcen_config()).unwrap();

        let stream = StreamConfig {
            block_length: 8,
            frame_length: N_FFT,
            hop_length: HOP,
            fill_value: None,
        };
        let streamed_peaks: Vec<f32> = stream_pcen(&signal, &stream, pcen_config())
            .unwrap()
            .iter()
            .flat_map(max_over_frequency)
            .collect();
        let whole_peaks = max_over_frequency(&whole);

        assert_eq!(streamed_peaks.len(), whole_peaks.len());
        for (s, w) in streamed_peaks.iter().zip(&whole_peaks) {
            assert!((s - w).abs() <= 1e-5 * w.abs().max(1e-12));
        }
        // Gated bursts should stand out from the silent lead-in
        let silent = whole_peaks[0];
        let loudest = whole_peaks.iter().copied().fold(0.0f32, f32::max);
        assert!(loudest > silent, "peaks should rise above the lead-in");
    }

    #[test]
    fn test_quadratic_pole_streams_consistently() {
        let config = PcenConfig {
            pole_derivation: PoleDerivation::Quadratic,
            max_size: 3,
            ..pcen_config()
        };
        let signal = generate_gated_chirp(1.0, SAMPLE_RATE as f32);
        let stft = StftProcessor::new(N_FFT, HOP).unwrap();
        let whole = pcen(&stft.magnitude(&signal), config.clone()).unwrap();

        let stream = StreamConfig {
            block_length: 5,
            frame_length: N_FFT,
            hop_length: HOP,
            fill_value: None,
        };
        let streamed =
            Spectrogram::concat_frames(&stream_pcen(&signal, &stream, config).unwrap()).unwrap();
        assert_close(&streamed, &whole, 1e-5);
    }

    #[test]
    fn test_padded_final_block_keeps_leading_frames() {
        let signal = generate_gated_chirp(1.0, SAMPLE_RATE as f32);
        let stream = StreamConfig {
            block_length: 16,
            frame_length: N_FFT,
            hop_length: HOP,
            fill_value: Some(0.0),
        };
        let padded = stream_pcen(&signal, &stream, pcen_config()).unwrap();
        assert!(padded.iter().all(|b| b.n_frames() == 16));

        let unpadded = stream_pcen(
            &signal,
            &StreamConfig {
                fill_value: None,
                ..stream
            },
            pcen_config(),
        )
        .unwrap();
        let unpadded = Spectrogram::concat_frames(&unpadded).unwrap();
        let padded = Spectrogram::concat_frames(&padded).unwrap();

        // Padding only appends frames; everything before it is unchanged
        assert!(padded.n_frames() >= unpadded.n_frames());
        let head = padded.slice_frames(0, unpadded.n_frames()).unwrap();
        assert_close(&head, &unpadded, 1e-6);
    }

    #[test]
    fn test_single_bin_scenario() {
        let pcen = StreamingPcen::new(PcenConfig {
            gain: 0.98,
            bias: 2.0,
            power: 0.5,
            eps: 1e-6,
            b: Some(0.5),
            ..Default::default()
        })
        .unwrap();

        let whole = Spectrogram::new(1, 6, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let (expected, _) = pcen.process(&whole, None).unwrap();

        let blocks = [
            Spectrogram::new(1, 3, vec![0.0; 3]).unwrap(),
            Spectrogram::new(1, 3, vec![1.0; 3]).unwrap(),
        ];
        let (outputs, _) = pcen.process_sequence(&blocks, None).unwrap();
        assert_close(&Spectrogram::concat_frames(&outputs).unwrap(), &expected, 1e-5);

        // Rising edge after silence: huge gain, so the first loud frame is the largest
        let row = expected.row(0);
        assert!(row[3] > row[4] && row[4] > row[5]);
    }

    #[test]
    fn test_shape_mismatch_returns_no_state() {
        let pcen = StreamingPcen::new(PcenConfig::default()).unwrap();
        let state = PcenState::new(vec![0.5; 10]);
        let block = Spectrogram::zeros(8, 3);
        match pcen.process(&block, Some(&state)) {
            Err(PcenError::Shape(_)) => {}
            other => panic!("expected Shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_configurations() {
        let signal = vec![0.0f32; 4096];
        let stream = StreamConfig::default();
        let bad = PcenConfig {
            gain: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            stream_pcen(&signal, &stream, bad),
            Err(PcenError::Configuration(_))
        ));

        let bad_stream = StreamConfig {
            hop_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            stream_pcen(&signal, &bad_stream, PcenConfig::default()),
            Err(PcenError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_state_serializes_between_sessions() {
        let pcen = StreamingPcen::new(pcen_config()).unwrap();
        let signal = generate_gated_chirp(0.5, SAMPLE_RATE as f32);
        let spec = StftProcessor::new(N_FFT, HOP).unwrap().magnitude(&signal);
        let half = spec.n_frames() / 2;

        let (_, state) = pcen
            .process(&spec.slice_frames(0, half).unwrap(), None)
            .unwrap();
        let saved = serde_json::to_string(&state).unwrap();
        let restored: Option<PcenState> = serde_json::from_str(&saved).unwrap();

        let tail = spec.slice_frames(half, spec.n_frames()).unwrap();
        let (resumed, _) = pcen.process(&tail, restored.as_ref()).unwrap();
        let (direct, _) = pcen.process(&tail, state.as_ref()).unwrap();
        assert_close(&resumed, &direct, 1e-6);
    }
}

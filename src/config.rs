//! Configuration parameters for PCEN

use serde::{Deserialize, Serialize};

use crate::error::PcenError;

/// Rule used to turn the smoothing time constant into the filter pole `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoleDerivation {
    /// `b = 1 - exp(-1 / t_frames)`: exact exponential decay per frame
    Exponential,
    /// `b = (sqrt(1 + 4 t²) - 1) / (2 t²)`: closed form used by common audio toolkits
    Quadratic,
}

/// PCEN configuration parameters
///
/// All fields are fixed for the lifetime of a [`StreamingPcen`](crate::StreamingPcen).
/// Partial serialized documents fill missing fields from [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcenConfig {
    /// Audio sample rate in Hz (default: 22050)
    pub sample_rate: u32,

    /// Hop length between STFT frames in samples (default: 512)
    pub hop_length: usize,

    /// Smoothing time constant in seconds (default: 0.400)
    pub time_constant: f32,

    /// Gain exponent `alpha` (default: 0.98)
    /// Values near 1.0 normalize local energy almost completely
    pub gain: f32,

    /// Bias `delta` added before compression (default: 2.0)
    pub bias: f32,

    /// Compression exponent `r` (default: 0.5)
    /// 0.0 selects logarithmic compression
    pub power: f32,

    /// Numerical floor `eps` for the gain denominator (default: 1e-6)
    pub eps: f32,

    /// Explicit smoothing coefficient, overriding the time constant (default: None)
    pub b: Option<f32>,

    /// How `b` is derived when not given explicitly (default: Exponential)
    pub pole_derivation: PoleDerivation,

    /// Width of the max-filter over frequency applied to the smoother input (default: 1 = off)
    pub max_size: usize,
}

impl Default for PcenConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            hop_length: 512,
            time_constant: 0.400,
            gain: 0.98,
            bias: 2.0,
            power: 0.5,
            eps: 1e-6,
            b: None,
            pole_derivation: PoleDerivation::Exponential,
            max_size: 1,
        }
    }
}

impl PcenConfig {
    /// Time constant expressed in frames
    pub fn time_constant_frames(&self) -> f32 {
        self.time_constant * self.sample_rate as f32 / self.hop_length as f32
    }

    /// Derive the smoothing coefficient `b`
    ///
    /// # Errors
    ///
    /// Returns `PcenError::Configuration` if the rate parameters are invalid or
    /// the resulting coefficient is non-finite or outside (0, 1].
    pub fn smoothing_coefficient(&self) -> Result<f32, PcenError> {
        let b = match self.b {
            Some(b) => b,
            None => {
                if self.sample_rate == 0 {
                    return Err(PcenError::Configuration(
                        "Sample rate must be > 0".to_string(),
                    ));
                }
                if self.hop_length == 0 {
                    return Err(PcenError::Configuration(
                        "Hop length must be > 0".to_string(),
                    ));
                }
                if !(self.time_constant.is_finite() && self.time_constant > 0.0) {
                    return Err(PcenError::Configuration(format!(
                        "Time constant must be finite and > 0, got {}",
                        self.time_constant
                    )));
                }

                let t_frames = self.time_constant_frames() as f64;
                let b = match self.pole_derivation {
                    PoleDerivation::Exponential => -(-1.0 / t_frames).exp_m1(),
                    PoleDerivation::Quadratic => {
                        ((1.0 + 4.0 * t_frames * t_frames).sqrt() - 1.0)
                            / (2.0 * t_frames * t_frames)
                    }
                };
                b as f32
            }
        };

        if !b.is_finite() || b <= 0.0 || b > 1.0 {
            return Err(PcenError::Configuration(format!(
                "Smoothing coefficient b must lie in (0, 1], got {}",
                b
            )));
        }

        Ok(b)
    }

    /// Check every parameter, returning the derived smoothing coefficient
    pub fn validate(&self) -> Result<f32, PcenError> {
        if !(self.gain.is_finite() && self.gain >= 0.0) {
            return Err(PcenError::Configuration(format!(
                "Gain must be finite and >= 0, got {}",
                self.gain
            )));
        }
        if !(self.power.is_finite() && self.power >= 0.0) {
            return Err(PcenError::Configuration(format!(
                "Power must be finite and >= 0, got {}",
                self.power
            )));
        }
        if !(self.bias.is_finite() && self.bias >= 0.0) {
            return Err(PcenError::Configuration(format!(
                "Bias must be finite and >= 0, got {}",
                self.bias
            )));
        }
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(PcenError::Configuration(format!(
                "Eps must be finite and > 0, got {}",
                self.eps
            )));
        }
        if self.max_size == 0 {
            return Err(PcenError::Configuration(
                "Max filter size must be >= 1".to_string(),
            ));
        }

        self.smoothing_coefficient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let b = PcenConfig::default().validate().unwrap();
        assert!(b > 0.0 && b < 0.1, "Default b should be small, got {}", b);
    }

    #[test]
    fn test_exponential_pole() {
        let config = PcenConfig {
            sample_rate: 1000,
            hop_length: 10,
            time_constant: 1.0, // 100 frames
            ..Default::default()
        };
        let b = config.smoothing_coefficient().unwrap();
        let expected = 1.0 - (-0.01f64).exp();
        assert!((b as f64 - expected).abs() < 1e-7);
    }

    #[test]
    fn test_quadratic_pole() {
        let config = PcenConfig {
            sample_rate: 1000,
            hop_length: 10,
            time_constant: 1.0,
            pole_derivation: PoleDerivation::Quadratic,
            ..Default::default()
        };
        let b = config.smoothing_coefficient().unwrap();
        let t = 100.0f64;
        let expected = ((1.0 + 4.0 * t * t).sqrt() - 1.0) / (2.0 * t * t);
        assert!((b as f64 - expected).abs() < 1e-7);
    }

    #[test]
    fn test_explicit_b_overrides_time_constant() {
        let config = PcenConfig {
            b: Some(0.5),
            time_constant: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap(), 0.5);
    }

    #[test]
    fn test_invalid_b() {
        for b in [0.0, -0.1, 1.5, f32::NAN, f32::INFINITY] {
            let config = PcenConfig {
                b: Some(b),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(PcenError::Configuration(_))),
                "b={} should be rejected",
                b
            );
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let mutations: [fn(&mut PcenConfig); 9] = [
            |c| c.gain = -0.5,
            |c| c.power = f32::NAN,
            |c| c.power = -1.0,
            |c| c.bias = -2.0,
            |c| c.eps = 0.0,
            |c| c.time_constant = 0.0,
            |c| c.hop_length = 0,
            |c| c.sample_rate = 0,
            |c| c.max_size = 0,
        ];
        for mutate in mutations {
            let mut config = PcenConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(PcenError::Configuration(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PcenConfig =
            serde_json::from_str(r#"{"gain": 0.8, "pole_derivation": "Quadratic"}"#).unwrap();
        assert_eq!(config.gain, 0.8);
        assert_eq!(config.pole_derivation, PoleDerivation::Quadratic);
        assert_eq!(config.hop_length, 512);
        assert_eq!(config.b, None);
    }
}

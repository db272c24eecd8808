//! Dynamic-range compression stage of PCEN
//!
//! Computes `(x + delta)^r - delta^r` for a gain-normalized magnitude `x`.
//!
//! The direct form subtracts two nearly equal numbers when `x` is small
//! relative to `delta`, so two formulations are used:
//!
//! - log-domain: `exp(r * ln(x + delta)) - delta^r`
//! - near-floor: `delta^r * expm1(r * ln_1p(x / delta))`
//!
//! The log-domain form is used once `(1 + x/delta)^r > 2`, i.e. once
//! `x / delta > 2^(1/r) - 1`. Past that point the result is at least `delta^r`
//! and the subtraction costs at most one bit of precision. Below it the
//! `expm1`/`ln_1p` form stays accurate down to `x = 0`.

/// Compression coefficients derived once per filter
#[derive(Debug, Clone)]
pub(crate) struct Compressor {
    power: f32,
    bias: f32,
    bias_pow: f32,
    log_domain_ratio: f32,
}

impl Compressor {
    pub(crate) fn new(power: f32, bias: f32) -> Self {
        let log_domain_ratio = if power > 0.0 {
            // Overflows to infinity for tiny powers; the near-floor form then always applies
            2.0f32.powf(1.0 / power) - 1.0
        } else {
            f32::INFINITY
        };
        Self {
            power,
            bias,
            bias_pow: bias.powf(power),
            log_domain_ratio,
        }
    }

    /// Compress one gain-normalized magnitude (`x >= 0`)
    pub(crate) fn compress(&self, x: f32) -> f32 {
        if self.power == 0.0 {
            return x.ln_1p();
        }
        if self.bias == 0.0 {
            return if x > 0.0 {
                (self.power * x.ln()).exp()
            } else {
                0.0
            };
        }

        let ratio = x / self.bias;
        if ratio > self.log_domain_ratio {
            self.log_domain(x)
        } else {
            self.near_floor(ratio)
        }
    }

    fn log_domain(&self, x: f32) -> f32 {
        (self.power * (x + self.bias).ln()).exp() - self.bias_pow
    }

    fn near_floor(&self, ratio: f32) -> f32 {
        self.bias_pow * (self.power * ratio.ln_1p()).exp_m1()
    }
}

//! Exponential smoothing for per-frame control signals
//!
//! Each signal keeps its own smoother so they can be reset independently
//! when tracking is lost.

/// Exponential moving average that starts empty
#[derive(Debug, Clone)]
pub struct ExponentialSmoother {
    alpha: f64,
    value: Option<f64>,
}

impl ExponentialSmoother {
    /// `alpha` is the weight of the newest sample, in (0, 1]
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    /// Blend `raw` into the average and return the new value.
    ///
    /// The first sample after construction or `reset` is taken as-is:
    /// smoothed = smoothed * (1 - alpha) + raw * alpha
    pub fn step(&mut self, raw: f64) -> f64 {
        let next = match self.value {
            Some(prev) => prev * (1.0 - self.alpha) + raw * self.alpha,
            None => raw,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Forget history; the next sample starts fresh
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

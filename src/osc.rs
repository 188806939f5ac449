//! Magic-circle sine/cosine oscillator

use crate::error::CvError;

/// Frequency a freshly created context starts at, in Hz.
pub const DEFAULT_FREQUENCY: f32 = 440.0;

/// A second-order recursive oscillator producing a coupled sine/cosine pair.
///
/// See Smith & Cook, "The Second-Order Digital Waveguide Oscillator" (1992),
/// <https://ccrma.stanford.edu/~jos/wgo/wgo.pdf>, p. 2. Each step rotates the
/// state pair by a fixed angle using two multiply-adds, so a whole buffer of
/// samples costs no more than additions and multiplications plus the
/// coefficient evaluation.
///
/// Amplitude is nominally conserved for frequencies well below Nyquist. As
/// the frequency approaches `sample_rate / 2` the stability margin shrinks
/// and the pair drifts off the unit circle; that drift is a property of the
/// algorithm and is left uncorrected.
pub struct MagicCircle {
    x: [f32; 2],
    y: [f32; 2],
    /// Selects which slot is current; flipped every step.
    index: bool,
    frequency: f32,
    sample_rate: f32,
}

impl MagicCircle {
    /// Create an oscillator seeded at peak cosine / zero sine.
    ///
    /// Fails only if `sample_rate` is not a positive finite number.
    pub fn new(sample_rate: f32, frequency: f32) -> Result<Self, CvError> {
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(CvError::InvalidConfiguration(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }

        Ok(Self {
            x: [0.0, 0.0],
            y: [0.0, 1.0],
            index: false,
            frequency,
            sample_rate,
        })
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Change the oscillator frequency.
    ///
    /// Takes effect on the very next [`step`](Self::step) - the rotation
    /// coefficient is recomputed per sample, so modulation is phase-continuous.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Advance one sample, returning `(sine, cosine)`.
    ///
    /// The rotation coefficient `e = 2 sin(pi f / r)` is recomputed on every
    /// call rather than cached per buffer. That costs one `sin` per sample
    /// and buys glitch-free per-sample frequency modulation.
    #[inline]
    pub fn step(&mut self) -> (f32, f32) {
        let (i, j) = if self.index { (1, 0) } else { (0, 1) };

        let e = 2.0 * (core::f32::consts::PI / self.sample_rate * self.frequency).sin();
        self.x[i] = self.x[j] + e * self.y[j];
        self.y[i] = -e * self.x[i] + self.y[j];

        // Flip slots every sample
        self.index = !self.index;

        (self.x[i], self.y[i])
    }

    /// Fill `out` with one sine sample per slot, in temporal order.
    ///
    /// The cosine channel is computed alongside but not written anywhere;
    /// it is a free byproduct of the recursion.
    pub fn fill(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            let (sine, _cosine) = self.step();
            *slot = sine;
        }
    }
}

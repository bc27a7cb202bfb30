//! ADSR envelope parameters and derived stage reporting.
//!
//! Unlike a sample-rate envelope generator, the engine expresses envelopes
//! as scheduled automation on a gain lane; this module only carries the
//! parameter record and the time constants the schedule is computed from.

/// Shortest permitted envelope segment, in seconds.
///
/// Zero-valued attack/decay/release are clamped here rather than rejected:
/// a zero segment is a legitimate "instant" request, and the epsilon keeps
/// the exponential time constants away from division by zero.
pub const MIN_SEGMENT_SECONDS: f64 = 1e-3;

/// Attack–decay–sustain–release parameters.
///
/// Times are seconds; `sustain` is a 0–1 level.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdsrValues {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level, 0.0 to 1.0.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f64,
}

impl Default for AdsrValues {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.2,
            sustain: 0.6,
            release: 0.5,
        }
    }
}

impl AdsrValues {
    /// Attack duration with the zero-length clamp applied.
    pub fn attack_seconds(&self) -> f64 {
        self.attack.max(MIN_SEGMENT_SECONDS)
    }

    /// Exponential time constant for the decay approach toward sustain.
    ///
    /// τ = decay / 3 reaches ≈95% of the way to sustain within one decay
    /// interval.
    pub fn decay_time_constant(&self) -> f64 {
        (self.decay / 3.0).max(MIN_SEGMENT_SECONDS)
    }

    /// Exponential time constant for the release approach toward silence.
    pub fn release_time_constant(&self) -> f64 {
        (self.release / 3.0).max(MIN_SEGMENT_SECONDS)
    }

    /// Absolute offset after release start at which gain is snapped to
    /// exactly zero: 1.67 × release ≈ 5 time constants ≈ 99.8% converged.
    pub fn release_silence_offset(&self) -> f64 {
        (self.release * 1.67).max(MIN_SEGMENT_SECONDS)
    }

    /// Clamp sustain into 0–1 and times to non-negative.
    pub fn clamped(self) -> Self {
        Self {
            attack: self.attack.max(0.0),
            decay: self.decay.max(0.0),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: self.release.max(0.0),
        }
    }
}

/// Envelope stage as reported to the display layer.
///
/// Stages are derived from elapsed time since trigger, not stored flags,
/// except during release where the stage is pinned until the hard-zero
/// deadline passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Not sounding.
    #[default]
    Idle,
    /// Ramping toward peak gain.
    Attack,
    /// Approaching the sustain level.
    Decay,
    /// Holding at the sustain level.
    Sustain,
    /// Approaching silence after release.
    Release,
}

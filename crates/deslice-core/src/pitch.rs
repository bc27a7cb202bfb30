//! Pitch math in log-frequency space.
//!
//! All distances and interpolations the engine performs on pitch happen in
//! log2-frequency space, where equal intervals are equal musical distances.
//! Inputs are clamped to ≥ 1 Hz before any ratio or logarithm — the engine
//! treats sub-audible frequencies as a configuration error to degrade
//! gracefully from, never a reason to produce a NaN.

use libm::{fabs, log2, pow};

/// Lowest frequency the engine will compute with, in Hz.
pub const MIN_FREQ_HZ: f32 = 1.0;

/// Clamp a frequency to the audible computation floor.
#[inline]
pub fn clamp_freq(hz: f32) -> f32 {
    hz.max(MIN_FREQ_HZ)
}

/// Absolute distance between two frequencies in semitones.
#[inline]
pub fn semitone_distance(f1: f32, f2: f32) -> f32 {
    let ratio = f64::from(clamp_freq(f1)) / f64::from(clamp_freq(f2));
    fabs(log2(ratio) * 12.0) as f32
}

/// Absolute distance between two frequencies in octaves.
#[inline]
pub fn octave_distance(f1: f32, f2: f32) -> f32 {
    semitone_distance(f1, f2) / 12.0
}

/// Shift a frequency by a signed number of semitones.
#[inline]
pub fn shift_semitones(hz: f32, semitones: f32) -> f32 {
    (f64::from(clamp_freq(hz)) * pow(2.0, f64::from(semitones) / 12.0)) as f32
}

/// Shift a frequency by a signed number of cents (100 cents = 1 semitone).
#[inline]
pub fn shift_cents(hz: f32, cents: f32) -> f32 {
    shift_semitones(hz, cents / 100.0)
}

/// A frequency's position in log2 space.
#[inline]
pub fn to_log2(hz: f32) -> f64 {
    log2(f64::from(clamp_freq(hz)))
}

/// Back from log2 space to Hz.
#[inline]
pub fn from_log2(log_hz: f64) -> f32 {
    pow(2.0, log_hz) as f32
}

/// Linear interpolation between two frequencies in plain frequency space.
///
/// Convergence proximity math deliberately interpolates linearly in Hz (not
/// log space) to match the logical-frequency model the scheduler reports.
#[inline]
pub fn lerp_freq(start: f32, target: f32, progress: f32) -> f32 {
    start + (target - start) * progress.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octave_is_twelve_semitones() {
        assert!((semitone_distance(220.0, 440.0) - 12.0).abs() < 1e-4);
        assert!((octave_distance(220.0, 440.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn distance_is_symmetric() {
        let d1 = semitone_distance(261.63, 392.0);
        let d2 = semitone_distance(392.0, 261.63);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn sub_audible_inputs_are_clamped_not_nan() {
        let d = semitone_distance(0.0, 440.0);
        assert!(d.is_finite());
        assert_eq!(d, semitone_distance(1.0, 440.0));
    }

    #[test]
    fn shift_round_trips() {
        let up = shift_semitones(440.0, 7.0);
        let back = shift_semitones(up, -7.0);
        assert!((back - 440.0).abs() < 1e-3);
    }

    #[test]
    fn cents_are_hundredths_of_semitones() {
        let a = shift_cents(440.0, 100.0);
        let b = shift_semitones(440.0, 1.0);
        assert!((a - b).abs() < 1e-3);
    }

    #[test]
    fn log2_round_trips() {
        let hz = 261.63_f32;
        assert!((from_log2(to_log2(hz)) - hz).abs() < 1e-3);
    }

    #[test]
    fn lerp_clamps_progress() {
        assert_eq!(lerp_freq(100.0, 200.0, -1.0), 100.0);
        assert_eq!(lerp_freq(100.0, 200.0, 0.5), 150.0);
        assert_eq!(lerp_freq(100.0, 200.0, 2.0), 200.0);
    }
}

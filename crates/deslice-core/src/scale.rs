//! Scale-degree frequency tables for quantization and staircase convergence.
//!
//! The engine consumes a precomputed, sorted list of scale-degree
//! frequencies (the music-theory layer that derives it is outside the
//! engine boundary). A [`ScaleTable`] supports nearest-degree lookup,
//! magnetic-snap quantization — a gravitational pull toward degrees rather
//! than a hard snap — and stepped value curves that walk through the
//! in-range degrees between two pitches.

use alloc::vec::Vec;
use libm::{fabs, log2, pow};

use crate::pitch;

/// A sorted ascending table of scale-degree frequencies in Hz.
#[derive(Clone, Debug, Default)]
pub struct ScaleTable {
    freqs: Vec<f32>,
}

impl ScaleTable {
    /// Build a table from frequencies, sorting and dropping non-positive or
    /// non-finite entries.
    pub fn new(mut freqs: Vec<f32>) -> Self {
        freqs.retain(|f| f.is_finite() && *f > 0.0);
        freqs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
        Self { freqs }
    }

    /// An empty table; lookups pass frequencies through unchanged.
    pub fn empty() -> Self {
        Self { freqs: Vec::new() }
    }

    /// True when the table holds no degrees.
    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    /// Number of degrees in the table.
    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    /// The raw sorted frequencies.
    pub fn freqs(&self) -> &[f32] {
        &self.freqs
    }

    /// Nearest scale degree to `hz`, compared in log-frequency space.
    ///
    /// Returns `hz` unchanged when the table is empty.
    pub fn nearest(&self, hz: f32) -> f32 {
        match self.freqs.len() {
            0 => hz,
            1 => self.freqs[0],
            _ => {
                // Binary search for the bracketing pair, then compare
                // log-space distances.
                let mut lo = 0;
                let mut hi = self.freqs.len() - 1;
                while lo < hi - 1 {
                    let mid = (lo + hi) / 2;
                    if self.freqs[mid] <= hz {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                let d_lo = fabs(log2(f64::from(pitch::clamp_freq(hz)) / f64::from(self.freqs[lo])));
                let d_hi = fabs(log2(f64::from(pitch::clamp_freq(hz)) / f64::from(self.freqs[hi])));
                if d_lo <= d_hi {
                    self.freqs[lo]
                } else {
                    self.freqs[hi]
                }
            }
        }
    }

    /// Magnetic-snap quantization: pull `hz` toward its nearest degree.
    ///
    /// The pull follows an inverse-square-like curve in semitone distance —
    /// `1 / (1 + d²)` — scaled by `strength` (0 = identity, 1 = full pull),
    /// interpolated in log-frequency space. Continuous glides therefore
    /// dwell near in-scale pitches without discrete jumps.
    pub fn magnetic_snap(&self, hz: f32, strength: f32) -> f32 {
        if self.freqs.is_empty() || hz <= 0.0 {
            return hz;
        }
        let nearest = self.nearest(hz);
        let dist = pitch::semitone_distance(hz, nearest);
        let pull = 1.0 / (1.0 + dist * dist);
        let effective = f64::from(pull * strength.clamp(0.0, 1.0));

        let log_free = log2(f64::from(pitch::clamp_freq(hz)));
        let log_nearest = log2(f64::from(nearest));
        pow(2.0, log_free + (log_nearest - log_free) * effective) as f32
    }

    /// Build a stepped convergence curve from `start` to `target` walking
    /// through the in-range scale degrees, `len` samples long.
    ///
    /// Each step (including the endpoints) gets an equal dwell, producing a
    /// cascading, harp-like approach when fed to a value-curve event.
    pub fn staircase_curve(&self, start: f32, target: f32, len: usize) -> Vec<f32> {
        let mut curve = Vec::with_capacity(len);
        if len == 0 {
            return curve;
        }

        let lo = start.min(target);
        let hi = start.max(target);
        let ascending = target > start;

        let mut steps: Vec<f32> = Vec::new();
        let mut between: Vec<f32> = self
            .freqs
            .iter()
            .copied()
            .filter(|f| *f >= lo && *f <= hi)
            .collect();
        if !ascending {
            between.reverse();
        }
        if between.first() != Some(&start) {
            steps.push(start);
        }
        steps.extend(between);
        if steps.last() != Some(&target) {
            steps.push(target);
        }

        if len == 1 {
            curve.push(target);
            return curve;
        }
        // Spread indices so the first sample is the start and the last
        // is the target even when `len` is shorter than the walk.
        for i in 0..len {
            let idx = i * (steps.len() - 1) / (len - 1);
            curve.push(steps[idx]);
        }
        curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn c_major_octave() -> ScaleTable {
        ScaleTable::new(vec![
            261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88, 523.25,
        ])
    }

    #[test]
    fn nearest_on_empty_table_is_identity() {
        assert_eq!(ScaleTable::empty().nearest(317.0), 317.0);
    }

    #[test]
    fn nearest_picks_log_space_neighbor() {
        let table = c_major_octave();
        assert_eq!(table.nearest(300.0), 293.66);
        assert_eq!(table.nearest(440.0), 440.0);
        // Below the table clamps to the first degree.
        assert_eq!(table.nearest(100.0), 261.63);
        // Above clamps to the last.
        assert_eq!(table.nearest(2000.0), 523.25);
    }

    #[test]
    fn snap_with_zero_strength_is_identity() {
        let table = c_major_octave();
        assert_eq!(table.magnetic_snap(317.0, 0.0), 317.0);
    }

    #[test]
    fn snap_with_full_strength_converges_at_vanishing_distance() {
        let table = c_major_octave();
        // A hair off a degree: pull is ~1, so the output lands on it.
        let snapped = table.magnetic_snap(440.01, 1.0);
        assert!(pitch::semitone_distance(snapped, 440.0) < 1e-3);
    }

    #[test]
    fn snap_moves_toward_but_not_onto_distant_degrees() {
        let table = c_major_octave();
        let free = 310.0;
        let snapped = table.magnetic_snap(free, 0.8);
        let nearest = table.nearest(free);
        assert!(pitch::semitone_distance(snapped, nearest) < pitch::semitone_distance(free, nearest));
        assert!(snapped != nearest);
    }

    #[test]
    fn staircase_passes_through_degrees_in_order() {
        let table = c_major_octave();
        let curve = table.staircase_curve(261.63, 392.0, 64);
        assert_eq!(curve.len(), 64);
        assert_eq!(curve[0], 261.63);
        assert_eq!(*curve.last().unwrap(), 392.0);
        // Monotone non-decreasing on an ascending walk.
        for pair in curve.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn staircase_descends_when_target_is_below() {
        let table = c_major_octave();
        let curve = table.staircase_curve(523.25, 261.63, 32);
        assert_eq!(curve[0], 523.25);
        assert_eq!(*curve.last().unwrap(), 261.63);
        for pair in curve.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn staircase_shorter_than_the_walk_still_ends_on_target() {
        let table = c_major_octave();
        // Seven degrees lie in this span but the curve has only 4 samples.
        let curve = table.staircase_curve(261.63, 523.25, 4);
        assert_eq!(curve.len(), 4);
        assert_eq!(curve[0], 261.63);
        assert_eq!(*curve.last().unwrap(), 523.25);
        let single = table.staircase_curve(261.63, 523.25, 1);
        assert_eq!(single, vec![523.25]);
    }

    #[test]
    fn staircase_with_no_degrees_is_two_steps() {
        let table = ScaleTable::empty();
        let curve = table.staircase_curve(100.0, 200.0, 8);
        assert_eq!(curve[0], 100.0);
        assert_eq!(*curve.last().unwrap(), 200.0);
    }
}

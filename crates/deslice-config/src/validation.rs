//! Configuration clamping.
//!
//! Out-of-range configuration values are clamped into their working
//! ranges rather than rejected: the config is mutated live from
//! interactive controls, and a hard error mid-performance helps nobody.
//! Clamping is idempotent.

use deslice_core::pitch::MIN_FREQ_HZ;

use crate::config::SlideConfig;

/// Hard cap on persistent tracks.
pub const MAX_TRACK_COUNT: usize = 16;

/// Hard cap on spawned overflow tracks.
pub const MAX_SPAWNED_TRACKS: usize = 64;

/// Shortest usable tick period, in seconds.
const MIN_TICK_INTERVAL: f64 = 0.005;

/// Clamp every field of `config` into its working range, in place.
pub fn clamp(config: &mut SlideConfig) {
    config.track_count = config.track_count.clamp(1, MAX_TRACK_COUNT);
    config.tick_interval = config.tick_interval.max(MIN_TICK_INTERVAL);

    config.convergence_duration = config.convergence_duration.max(0.01);
    config.min_duration = config.min_duration.max(0.01);
    config.duration_per_octave = config.duration_per_octave.max(0.01);

    config.floor_volume = config.floor_volume.clamp(0.0, 1.0);
    config.held_volume = config.held_volume.clamp(0.0, 1.0);
    config.idle_volume = config.idle_volume.clamp(0.0, 1.0);
    if config.floor_volume > config.held_volume {
        config.floor_volume = config.held_volume;
    }
    config.anticipatory_swell = config.anticipatory_swell.clamp(0.0, 1.0);

    config.max_spawned_tracks = config.max_spawned_tracks.min(MAX_SPAWNED_TRACKS);
    config.hold_duration = config.hold_duration.map(|d| d.max(0.0));
    config.cycle_hold_duration = config.cycle_hold_duration.max(0.0);
    config.bounce_depth_cents = config.bounce_depth_cents.clamp(0.0, 100.0);
    config.bounce_decay_time = config.bounce_decay_time.max(0.01);
    config.micro_motion_depth = config.micro_motion_depth.clamp(0.0, 100.0);
    config.micro_motion_rate = config.micro_motion_rate.clamp(0.0, 20.0);
    config.departure_fade_time = config.departure_fade_time.max(0.01);

    config.correlation_factor = config.correlation_factor.clamp(0.0, 1.0);
    config.magnet_strength = config.magnet_strength.clamp(0.0, 1.0);
    config.movement_speed = config.movement_speed.clamp(0.01, 100.0);
    config.variation = config.variation.clamp(0.0, 0.99);

    config.min_freq = config.min_freq.max(MIN_FREQ_HZ);
    config.max_freq = config.max_freq.max(MIN_FREQ_HZ);
    if config.min_freq > config.max_freq {
        core::mem::swap(&mut config.min_freq, &mut config.max_freq);
    }
    config.root_freq = config.root_freq.clamp(config.min_freq, config.max_freq);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_clamping_unchanged() {
        let mut config = SlideConfig::default();
        let original = config.clone();
        clamp(&mut config);
        assert_eq!(config, original);
    }

    #[test]
    fn clamping_is_idempotent() {
        let mut config = SlideConfig::default();
        config.track_count = 99;
        config.variation = 7.0;
        clamp(&mut config);
        let once = config.clone();
        clamp(&mut config);
        assert_eq!(config, once);
    }

    #[test]
    fn zero_track_count_becomes_one() {
        let mut config = SlideConfig::default();
        config.track_count = 0;
        clamp(&mut config);
        assert_eq!(config.track_count, 1);
    }

    #[test]
    fn inverted_boundaries_are_swapped() {
        let mut config = SlideConfig::default();
        config.min_freq = 1000.0;
        config.max_freq = 100.0;
        clamp(&mut config);
        assert_eq!(config.min_freq, 100.0);
        assert_eq!(config.max_freq, 1000.0);
        // Root is pulled inside the corrected range.
        assert!(config.root_freq >= config.min_freq && config.root_freq <= config.max_freq);
    }

    #[test]
    fn floor_volume_never_exceeds_held_volume() {
        let mut config = SlideConfig::default();
        config.floor_volume = 0.9;
        config.held_volume = 0.4;
        clamp(&mut config);
        assert!(config.floor_volume <= config.held_volume);
    }

    #[test]
    fn negative_hold_duration_becomes_zero() {
        let mut config = SlideConfig::default();
        config.hold_duration = Some(-5.0);
        clamp(&mut config);
        assert_eq!(config.hold_duration, Some(0.0));
    }
}

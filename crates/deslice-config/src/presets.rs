//! Mood presets: named, intensity-scaled configuration patches.

use deslice_core::automation::Easing;

use crate::config::{
    CorrelationMode, DepartureDirection, DurationMode, MidConvergencePolicy, SwellCurve,
    WanderMode,
};
use crate::error::ConfigError;
use crate::patch::SlideConfigPatch;

/// The valid mood names, in display order.
pub const MOOD_NAMES: [&str; 4] = ["eerie", "bloom", "swarm", "custom"];

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp64(a: f64, b: f64, t: f32) -> f64 {
    a + (b - a) * f64::from(t)
}

/// Build the patch for a named mood at the given intensity (0–1,
/// clamped). Intensity 0 is the mood at its most restrained; 1 is the
/// mood fully leaned into.
///
/// Unknown names are a loud [`ConfigError::UnknownMood`].
pub fn mood_patch(name: &str, intensity: f32) -> Result<SlideConfigPatch, ConfigError> {
    let t = intensity.clamp(0.0, 1.0);
    match name.to_ascii_lowercase().as_str() {
        // Slow, hollow glides that creep onto their targets and drift
        // away from where they came.
        "eerie" => Ok(SlideConfigPatch {
            duration_mode: Some(DurationMode::PerOctave),
            duration_per_octave: Some(lerp64(1.5, 3.0, t)),
            easing: Some(Easing::EaseIn),
            swell_curve: Some(SwellCurve::Squared),
            floor_volume: Some(0.05),
            held_volume: Some(lerp(0.5, 0.8, t)),
            micro_motion: Some(true),
            micro_motion_depth: Some(lerp(8.0, 25.0, t)),
            micro_motion_rate: Some(lerp(3.0, 6.0, t)),
            departure_direction: Some(DepartureDirection::Inverse),
            departure_fade_time: Some(lerp64(1.5, 3.0, t)),
            movement_speed: Some(lerp(0.5, 1.5, t)),
            variation: Some(0.5),
            ..SlideConfigPatch::default()
        }),
        // Fast, eager swells that land together and open up.
        "bloom" => Ok(SlideConfigPatch {
            duration_mode: Some(DurationMode::Fixed),
            convergence_duration: Some(lerp64(1.2, 0.5, t)),
            easing: Some(Easing::EaseOut),
            swell_curve: Some(SwellCurve::Linear),
            anticipatory_swell: Some(lerp(0.3, 0.6, t)),
            held_volume: Some(lerp(0.7, 0.9, t)),
            bounce_depth_cents: Some(lerp(20.0, 50.0, t)),
            mid_convergence_policy: Some(MidConvergencePolicy::Interrupt),
            wander_mode: Some(WanderMode::OrbitHome),
            ..SlideConfigPatch::default()
        }),
        // Many loosely-coupled tracks jostling around the targets.
        "swarm" => Ok(SlideConfigPatch {
            track_count: Some(4 + (t * 4.0) as usize),
            mid_convergence_policy: Some(MidConvergencePolicy::SpawnOverflow),
            max_spawned_tracks: Some(8 + (t * 24.0) as usize),
            correlation_mode: Some(CorrelationMode::Loose),
            correlation_factor: Some(lerp(0.3, 0.7, t)),
            track_interaction: Some(true),
            partition_tracks: Some(true),
            movement_speed: Some(lerp(2.0, 6.0, t)),
            variation: Some(lerp(0.3, 0.8, t)),
            idle_volume: Some(lerp(0.08, 0.15, t)),
            ..SlideConfigPatch::default()
        }),
        // Blank slate: leaves the current configuration untouched so a
        // host can layer its own patch on top.
        "custom" => Ok(SlideConfigPatch::default()),
        _ => Err(ConfigError::UnknownMood(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlideConfig;
    use crate::validation;

    #[test]
    fn all_named_moods_resolve() {
        for name in MOOD_NAMES {
            assert!(mood_patch(name, 0.5).is_ok(), "{name} should resolve");
        }
    }

    #[test]
    fn unknown_mood_is_an_error() {
        assert!(matches!(
            mood_patch("gloomy", 0.5),
            Err(ConfigError::UnknownMood(_))
        ));
    }

    #[test]
    fn intensity_is_clamped() {
        let low = mood_patch("eerie", -5.0).unwrap();
        let zero = mood_patch("eerie", 0.0).unwrap();
        assert_eq!(low, zero);
    }

    #[test]
    fn mood_patches_survive_clamping() {
        for name in MOOD_NAMES {
            for &t in &[0.0, 0.5, 1.0] {
                let mut config = SlideConfig::default();
                mood_patch(name, t).unwrap().apply(&mut config);
                let applied = config.clone();
                validation::clamp(&mut config);
                assert_eq!(config, applied, "{name}@{t} should be in range already");
            }
        }
    }

    #[test]
    fn swarm_scales_track_counts_with_intensity() {
        let quiet = mood_patch("swarm", 0.0).unwrap();
        let full = mood_patch("swarm", 1.0).unwrap();
        assert!(full.track_count.unwrap() > quiet.track_count.unwrap());
        assert!(full.max_spawned_tracks.unwrap() > quiet.max_spawned_tracks.unwrap());
    }
}

//! Typed partial configuration updates.
//!
//! Live reconfiguration goes through [`SlideConfigPatch`]: a mirror of
//! [`SlideConfig`] with every field optional. Unknown field names are a
//! deserialization error, so a typo in a patch fails loudly instead of
//! silently patching nothing.

use deslice_core::automation::Easing;
use serde::{Deserialize, Serialize};

use crate::config::{
    BoundaryBehavior, CorrelationMode, DepartureDirection, DurationMode, IdleMode, IdleMovement,
    MidConvergencePolicy, ModeToggleBehavior, PitchBoundary, PitchMovement, PostArrivalMode,
    SlideConfig, StartPosition, SwellCurve, WanderMode,
};
use crate::error::ConfigError;

/// A partial [`SlideConfig`]: only the present fields are applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideConfigPatch {
    /// See [`SlideConfig::track_count`].
    pub track_count: Option<usize>,
    /// See [`SlideConfig::tick_interval`].
    pub tick_interval: Option<f64>,
    /// See [`SlideConfig::duration_mode`].
    pub duration_mode: Option<DurationMode>,
    /// See [`SlideConfig::convergence_duration`].
    pub convergence_duration: Option<f64>,
    /// See [`SlideConfig::min_duration`].
    pub min_duration: Option<f64>,
    /// See [`SlideConfig::duration_per_octave`].
    pub duration_per_octave: Option<f64>,
    /// See [`SlideConfig::easing`].
    pub easing: Option<Easing>,
    /// See [`SlideConfig::floor_volume`].
    pub floor_volume: Option<f32>,
    /// See [`SlideConfig::held_volume`].
    pub held_volume: Option<f32>,
    /// See [`SlideConfig::idle_volume`].
    pub idle_volume: Option<f32>,
    /// See [`SlideConfig::swell_curve`].
    pub swell_curve: Option<SwellCurve>,
    /// See [`SlideConfig::anticipatory_swell`].
    pub anticipatory_swell: Option<f32>,
    /// See [`SlideConfig::mid_convergence_policy`].
    pub mid_convergence_policy: Option<MidConvergencePolicy>,
    /// See [`SlideConfig::max_spawned_tracks`].
    pub max_spawned_tracks: Option<usize>,
    /// See [`SlideConfig::spawn_start_position`].
    pub spawn_start_position: Option<StartPosition>,
    /// Set a finite hold time. See [`SlideConfig::hold_duration`].
    pub hold_duration: Option<f64>,
    /// Hold until released, clearing any finite hold time.
    pub hold_forever: Option<bool>,
    /// See [`SlideConfig::post_arrival`].
    pub post_arrival: Option<PostArrivalMode>,
    /// See [`SlideConfig::cycle_hold_duration`].
    pub cycle_hold_duration: Option<f64>,
    /// See [`SlideConfig::bounce_depth_cents`].
    pub bounce_depth_cents: Option<f32>,
    /// See [`SlideConfig::bounce_decay_time`].
    pub bounce_decay_time: Option<f64>,
    /// See [`SlideConfig::micro_motion`].
    pub micro_motion: Option<bool>,
    /// See [`SlideConfig::micro_motion_depth`].
    pub micro_motion_depth: Option<f32>,
    /// See [`SlideConfig::micro_motion_rate`].
    pub micro_motion_rate: Option<f32>,
    /// See [`SlideConfig::anchor_enabled`].
    pub anchor_enabled: Option<bool>,
    /// See [`SlideConfig::anchor_on_press`].
    pub anchor_on_press: Option<bool>,
    /// See [`SlideConfig::departure_direction`].
    pub departure_direction: Option<DepartureDirection>,
    /// See [`SlideConfig::departure_fade_time`].
    pub departure_fade_time: Option<f64>,
    /// See [`SlideConfig::idle_mode`].
    pub idle_mode: Option<IdleMode>,
    /// See [`SlideConfig::idle_movement`].
    pub idle_movement: Option<IdleMovement>,
    /// See [`SlideConfig::wander_mode`].
    pub wander_mode: Option<WanderMode>,
    /// See [`SlideConfig::pitch_boundary`].
    pub pitch_boundary: Option<PitchBoundary>,
    /// See [`SlideConfig::boundary_behavior`].
    pub boundary_behavior: Option<BoundaryBehavior>,
    /// See [`SlideConfig::pitch_movement`].
    pub pitch_movement: Option<PitchMovement>,
    /// See [`SlideConfig::starting_position`].
    pub starting_position: Option<StartPosition>,
    /// See [`SlideConfig::mode_toggle_behavior`].
    pub mode_toggle_behavior: Option<ModeToggleBehavior>,
    /// See [`SlideConfig::correlation_mode`].
    pub correlation_mode: Option<CorrelationMode>,
    /// See [`SlideConfig::correlation_factor`].
    pub correlation_factor: Option<f32>,
    /// See [`SlideConfig::partition_tracks`].
    pub partition_tracks: Option<bool>,
    /// See [`SlideConfig::track_interaction`].
    pub track_interaction: Option<bool>,
    /// See [`SlideConfig::magnet_strength`].
    pub magnet_strength: Option<f32>,
    /// See [`SlideConfig::movement_speed`].
    pub movement_speed: Option<f32>,
    /// See [`SlideConfig::variation`].
    pub variation: Option<f32>,
    /// See [`SlideConfig::min_freq`].
    pub min_freq: Option<f32>,
    /// See [`SlideConfig::max_freq`].
    pub max_freq: Option<f32>,
    /// See [`SlideConfig::root_freq`].
    pub root_freq: Option<f32>,
}

macro_rules! apply_fields {
    ($patch:expr, $config:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $config.$field = value;
            }
        )+
    };
}

impl SlideConfigPatch {
    /// Parse a patch from TOML. Unknown keys are an error.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply every present field onto `config`.
    ///
    /// `hold_forever = true` wins over a `hold_duration` in the same
    /// patch. The result is not clamped; run
    /// [`validation::clamp`](crate::validation::clamp) afterwards.
    pub fn apply(&self, config: &mut SlideConfig) {
        apply_fields!(
            self, config,
            track_count, tick_interval, duration_mode, convergence_duration,
            min_duration, duration_per_octave, easing,
            floor_volume, held_volume, idle_volume, swell_curve, anticipatory_swell,
            mid_convergence_policy, max_spawned_tracks, spawn_start_position,
            post_arrival, cycle_hold_duration,
            bounce_depth_cents, bounce_decay_time,
            micro_motion, micro_motion_depth, micro_motion_rate,
            anchor_enabled, anchor_on_press,
            departure_direction, departure_fade_time,
            idle_mode, idle_movement, wander_mode,
            pitch_boundary, boundary_behavior, pitch_movement,
            starting_position, mode_toggle_behavior,
            correlation_mode, correlation_factor,
            partition_tracks, track_interaction, magnet_strength,
            movement_speed, variation,
            min_freq, max_freq, root_freq,
        );
        if let Some(d) = self.hold_duration {
            config.hold_duration = Some(d);
        }
        if self.hold_forever == Some(true) {
            config.hold_duration = None;
        }
    }
}

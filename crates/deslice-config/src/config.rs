//! The glide engine's configuration record and its policy enums.

use std::path::Path;

use deslice_core::automation::Easing;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the shared convergence duration is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationMode {
    /// Every convergence takes `convergence_duration` seconds.
    #[default]
    Fixed,
    /// Duration scales with the farthest track's distance:
    /// `max(min_duration, octaves × duration_per_octave)`.
    PerOctave,
}

/// Shape of the proximity-driven volume swell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwellCurve {
    /// Volume rises linearly with proximity.
    #[default]
    Linear,
    /// Volume rises with proximity squared, holding back until tracks
    /// are nearly converged.
    Squared,
}

/// What happens when new targets arrive while tracks are still converging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MidConvergencePolicy {
    /// Abandon the current target and retarget immediately.
    #[default]
    Interrupt,
    /// Finish the current convergence, then go to the queued target.
    FinishThenRetarget,
    /// Keep converging and spawn extra tracks for the new targets.
    SpawnOverflow,
}

/// Which way a departing track wanders off after its hold ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepartureDirection {
    /// Coin flip up or down.
    #[default]
    Random,
    /// Away from the direction it arrived from.
    Inverse,
    /// Through the target, continuing its arrival direction.
    Continue,
}

/// Whether idle tracks move at all between convergences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdleMovement {
    /// Idle tracks sit where they are; no wander targets are issued.
    Stationary,
    /// Continuous unhurried wandering.
    #[default]
    SlowDrift,
    /// Continuous wandering; pacing comes from `movement_speed`.
    AlwaysMoving,
}

/// Which pitch window constrains wandering and departures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PitchBoundary {
    /// The configured `min_freq`–`max_freq` window.
    #[default]
    MusicalWindow,
    /// A window derived from the current key and octave; the host sets
    /// the boundaries, the engine treats them the same as a window.
    KeyOctave,
    /// No window at all: edge handling is bypassed entirely.
    Unconstrained,
}

/// Whether pitch glides move continuously or walk the scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PitchMovement {
    /// Smooth glides through every intermediate pitch.
    #[default]
    Continuous,
    /// Wander targets snap toward scale degrees and convergences step
    /// through the in-range degrees as a staircase.
    ScaleSnapped,
}

/// Where a track begins its life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartPosition {
    /// At the root frequency.
    #[default]
    RootNote,
    /// Log-uniform anywhere inside the pitch boundaries.
    Random,
    /// Where the existing tracks are (their average); falls back to the
    /// root when there is no history yet.
    LastKnown,
}

/// What idle tracks do when engine-level modes are switched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeToggleBehavior {
    /// Idle tracks carry on from wherever they were.
    #[default]
    Resume,
    /// Idle tracks glide home to the root on a root change.
    ResetHome,
}

/// Where idle tracks are allowed to wander.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WanderMode {
    /// Log-uniform anywhere inside the pitch boundaries.
    #[default]
    FreeRoam,
    /// Within an octave of the root frequency.
    OrbitHome,
    /// Free roam; the magnetic snap stage supplies the scale affinity.
    StayInScale,
}

/// What happens when a wander target lands outside the pitch boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryBehavior {
    /// Mirror the overshoot back inside.
    #[default]
    Reflect,
    /// Wrap around to the opposite boundary.
    Wrap,
    /// Jump to the middle of the pitch window.
    Recenter,
}

/// How strongly idle tracks move together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrelationMode {
    /// Each track wanders on its own.
    #[default]
    Independent,
    /// Every track takes the first track's wander target.
    Unison,
    /// Targets are blended toward the group average by
    /// `correlation_factor`.
    Loose,
}

/// What idle tracks sound like between convergences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdleMode {
    /// Idle tracks wander audibly at the idle volume.
    #[default]
    QuietSliding,
    /// Idle tracks are muted; only convergences are heard.
    Silent,
}

/// What a track does after it arrives on target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostArrivalMode {
    /// Hold the target until released (or for `hold_duration`).
    #[default]
    Hold,
    /// Hold briefly, depart, and converge again on the next tick.
    Cycle,
}

/// Full configuration of the glide engine.
///
/// Every field has a musical default; deserialization fills missing
/// fields from [`Default`], so a TOML file only needs the fields it
/// changes. Values are not validated on construction — run
/// [`validation::clamp`](crate::validation::clamp) before handing a
/// config to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Number of persistent glide tracks.
    pub track_count: usize,
    /// Scheduler tick period in seconds.
    pub tick_interval: f64,

    /// How convergence durations are computed.
    pub duration_mode: DurationMode,
    /// Fixed convergence duration in seconds.
    pub convergence_duration: f64,
    /// Shortest distance-based convergence, in seconds.
    pub min_duration: f64,
    /// Seconds of convergence per octave of distance.
    pub duration_per_octave: f64,
    /// Frequency ramp shape during convergence.
    pub easing: Easing,

    /// Track volume at maximum distance from target.
    pub floor_volume: f32,
    /// Track volume when fully converged.
    pub held_volume: f32,
    /// Idle wander volume.
    pub idle_volume: f32,
    /// Proximity-to-volume mapping shape.
    pub swell_curve: SwellCurve,
    /// Fraction of the swell granted up front when a convergence starts.
    pub anticipatory_swell: f32,

    /// Policy for targets arriving mid-convergence.
    pub mid_convergence_policy: MidConvergencePolicy,
    /// Cap on extra tracks spawned by the overflow policy.
    pub max_spawned_tracks: usize,
    /// Starting pitch for spawned overflow tracks.
    pub spawn_start_position: StartPosition,

    /// Hold time after arrival, in seconds. `None` holds until released.
    pub hold_duration: Option<f64>,
    /// Post-arrival behavior.
    pub post_arrival: PostArrivalMode,
    /// Hold time between cycle departures, in seconds.
    pub cycle_hold_duration: f64,
    /// Landing bounce depth in cents.
    pub bounce_depth_cents: f32,
    /// Landing bounce recovery time in seconds.
    pub bounce_decay_time: f64,
    /// Enable held-state vibrato.
    pub micro_motion: bool,
    /// Held-state vibrato depth in cents.
    pub micro_motion_depth: f32,
    /// Held-state vibrato rate in Hz.
    pub micro_motion_rate: f32,
    /// Sound a solid chord alongside the converging tracks.
    pub anchor_enabled: bool,
    /// Fire the anchor chord immediately on the convergence request.
    pub anchor_on_press: bool,

    /// Direction policy for departures.
    pub departure_direction: DepartureDirection,
    /// Fade-to-floor time when departing, in seconds.
    pub departure_fade_time: f64,

    /// Idle audibility.
    pub idle_mode: IdleMode,
    /// Whether idle tracks move at all.
    pub idle_movement: IdleMovement,
    /// Idle wander range policy.
    pub wander_mode: WanderMode,
    /// Which pitch window applies.
    pub pitch_boundary: PitchBoundary,
    /// Out-of-bounds handling for wander targets.
    pub boundary_behavior: BoundaryBehavior,
    /// Continuous glides or scale-snapped staircases.
    pub pitch_movement: PitchMovement,
    /// Starting pitch for persistent tracks.
    pub starting_position: StartPosition,
    /// Idle-track handling across mode switches.
    pub mode_toggle_behavior: ModeToggleBehavior,
    /// Inter-track correlation policy while idle.
    pub correlation_mode: CorrelationMode,
    /// Blend factor for [`CorrelationMode::Loose`], 0–1.
    pub correlation_factor: f32,
    /// Divide the pitch range into per-track slices while idle.
    pub partition_tracks: bool,
    /// Push idle tracks apart when they drift within two semitones.
    pub track_interaction: bool,
    /// Pull of the scale's degrees on wander targets, 0–1.
    pub magnet_strength: f32,

    /// Idle movement speed in semitones per second.
    pub movement_speed: f32,
    /// Random speed variation, 0–1.
    pub variation: f32,

    /// Lower pitch boundary in Hz.
    pub min_freq: f32,
    /// Upper pitch boundary in Hz.
    pub max_freq: f32,
    /// Home frequency for orbiting and recentering.
    pub root_freq: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            track_count: 2,
            tick_interval: 0.05,

            duration_mode: DurationMode::Fixed,
            convergence_duration: 1.5,
            min_duration: 0.2,
            duration_per_octave: 1.0,
            easing: Easing::Linear,

            floor_volume: 0.1,
            held_volume: 0.8,
            idle_volume: 0.1,
            swell_curve: SwellCurve::Linear,
            anticipatory_swell: 0.3,

            mid_convergence_policy: MidConvergencePolicy::Interrupt,
            max_spawned_tracks: 16,
            spawn_start_position: StartPosition::Random,

            hold_duration: None,
            post_arrival: PostArrivalMode::Hold,
            cycle_hold_duration: 0.5,
            bounce_depth_cents: 30.0,
            bounce_decay_time: 0.3,
            micro_motion: false,
            micro_motion_depth: 10.0,
            micro_motion_rate: 5.0,
            anchor_enabled: true,
            anchor_on_press: true,

            departure_direction: DepartureDirection::Random,
            departure_fade_time: 1.0,

            idle_mode: IdleMode::QuietSliding,
            idle_movement: IdleMovement::SlowDrift,
            wander_mode: WanderMode::FreeRoam,
            pitch_boundary: PitchBoundary::MusicalWindow,
            boundary_behavior: BoundaryBehavior::Reflect,
            pitch_movement: PitchMovement::Continuous,
            starting_position: StartPosition::RootNote,
            mode_toggle_behavior: ModeToggleBehavior::Resume,
            correlation_mode: CorrelationMode::Independent,
            correlation_factor: 0.5,
            partition_tracks: false,
            track_interaction: false,
            magnet_strength: 0.0,

            movement_speed: 2.0,
            variation: 0.3,

            // C2 to C6, rooted at middle C.
            min_freq: 65.41,
            max_freq: 1046.5,
            root_freq: 261.63,
        }
    }
}

impl SlideConfig {
    /// Load a configuration from a TOML file. Missing fields fall back
    /// to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(toml::from_str(&text)?)
    }

    /// Save the configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| ConfigError::write_file(path, e))
    }
}

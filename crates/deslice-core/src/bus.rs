//! Master output bus model and the backend diagnostics boundary.
//!
//! The bus is the single summing point every voice and glide track feeds.
//! It owns a master gain lane and the limiter settings handed to the
//! downstream renderer; the renderer itself sits behind the [`AudioBackend`]
//! trait and is opaque to the engine.

use crate::automation::AutomationLane;

/// Ramp length for master volume changes, in seconds.
///
/// Long enough to avoid a click, short enough to feel immediate.
const VOLUME_RAMP_SECONDS: f64 = 0.02;

/// Default master gain. Headroom for eight sustained voices plus glide
/// tracks without pushing the limiter into constant reduction.
pub const DEFAULT_MASTER_GAIN: f32 = 0.15;

/// Safety-limiter parameters forwarded to the backend's dynamics stage.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimiterSettings {
    /// Level above which reduction begins, in dB.
    pub threshold_db: f32,
    /// Width of the soft-knee transition, in dB.
    pub knee_db: f32,
    /// Compression ratio above the knee.
    pub ratio: f32,
    /// Attack time in seconds.
    pub attack: f64,
    /// Release time in seconds.
    pub release: f64,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 12.0,
            ratio: 4.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

/// Lifecycle state of the downstream audio subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BusState {
    /// Rendering and advancing its clock.
    #[default]
    Running,
    /// Clock paused; scheduled automation holds until resume.
    Suspended,
    /// Torn down; the bus must not schedule further automation.
    Closed,
}

/// Snapshot of backend health for display layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BusDiagnostics {
    /// Backend sample rate in Hz.
    pub sample_rate: f64,
    /// Output latency estimate in seconds.
    pub latency_seconds: f64,
    /// Backend lifecycle state.
    pub state: BusState,
    /// Current limiter gain reduction in dB (0 when idle).
    pub gain_reduction_db: f32,
}

/// The rendering subsystem the engine schedules against.
///
/// Implementations wrap a real-time audio stack; [`NullBackend`] stands in
/// for tests and headless runs.
pub trait AudioBackend {
    /// Resume the backend clock after suspension.
    fn resume(&mut self);
    /// Suspend the backend clock; automation already scheduled is retained.
    fn suspend(&mut self);
    /// Current backend health snapshot.
    fn diagnostics(&self) -> BusDiagnostics;
}

/// A backend that renders nothing and reports nominal diagnostics.
#[derive(Debug, Default)]
pub struct NullBackend {
    suspended: bool,
}

impl AudioBackend for NullBackend {
    fn resume(&mut self) {
        self.suspended = false;
    }

    fn suspend(&mut self) {
        self.suspended = true;
    }

    fn diagnostics(&self) -> BusDiagnostics {
        BusDiagnostics {
            sample_rate: 48_000.0,
            latency_seconds: 0.0,
            state: if self.suspended {
                BusState::Suspended
            } else {
                BusState::Running
            },
            gain_reduction_db: 0.0,
        }
    }
}

/// Master summing bus: gain lane plus limiter settings.
#[derive(Debug)]
pub struct MasterBus {
    gain: AutomationLane,
    limiter: LimiterSettings,
}

impl Default for MasterBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterBus {
    /// Bus at the default master gain with default limiter settings.
    pub fn new() -> Self {
        Self {
            gain: AutomationLane::new(DEFAULT_MASTER_GAIN),
            limiter: LimiterSettings::default(),
        }
    }

    /// Ramp the master volume to `target` over a short anti-click window.
    ///
    /// Negative targets clamp to zero; there is no upper clamp, headroom
    /// management is the limiter's job.
    pub fn set_volume(&mut self, target: f32, now: f64) {
        self.gain.anchor(now);
        self.gain.linear_ramp_to(target.max(0.0), now + VOLUME_RAMP_SECONDS);
    }

    /// Master gain at time `now`.
    pub fn volume_at(&self, now: f64) -> f32 {
        self.gain.value_at(now)
    }

    /// The limiter parameters the backend should apply.
    pub fn limiter(&self) -> LimiterSettings {
        self.limiter
    }

    /// Replace the limiter parameters.
    pub fn set_limiter(&mut self, limiter: LimiterSettings) {
        self.limiter = limiter;
    }
}

//! A single glide track: a continuously sliding pitch with a
//! proximity-driven volume swell.

use deslice_core::automation::{AutomationLane, Easing};
use deslice_core::{TimerHandle, pitch};
use libm::sin;

/// Samples used to realize a quadratic easing as a value curve.
const EASING_CURVE_POINTS: usize = 256;

/// Samples per vibrato window.
const VIBRATO_CURVE_POINTS: usize = 128;

/// Anti-click ramp for swell and volume changes, in seconds.
const GAIN_RAMP_SECONDS: f64 = 0.02;

/// Lifecycle phase of a glide track.
///
/// The legal transitions are idle → converging → held → departing →
/// idle. A held track may go straight back to converging when targets
/// cycle; every other shortcut goes through departing or idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackPhase {
    /// Wandering (or muted) with no target.
    #[default]
    Idle,
    /// Sliding toward an assigned target.
    Converging,
    /// Sitting on its target.
    Held,
    /// Sliding away from a finished target.
    Departing,
}

/// A glide ramp's logical model: linear interpolation between two
/// pitches over a known interval, independent of the audio easing.
#[derive(Clone, Copy, Debug)]
struct LogicalRamp {
    start_freq: f32,
    end_freq: f32,
    start_time: f64,
    end_time: f64,
}

impl LogicalRamp {
    fn freq_at(&self, now: f64) -> f32 {
        let span = self.end_time - self.start_time;
        if span <= 0.0 {
            return self.end_freq;
        }
        let progress = ((now - self.start_time) / span) as f32;
        pitch::lerp_freq(self.start_freq, self.end_freq, progress)
    }

    fn done_at(&self, now: f64) -> bool {
        now >= self.end_time
    }
}

/// Point-in-time view of a track for display layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackState {
    /// The track's stable id.
    pub id: u64,
    /// Lifecycle phase.
    pub phase: TrackPhase,
    /// Logical frequency in Hz.
    pub frequency: f32,
    /// Convergence target, when one is assigned.
    pub target: Option<f32>,
    /// Convergence proximity, 0–1 (1.0 while held).
    pub proximity: f32,
    /// True for overflow tracks spawned mid-convergence.
    pub spawned: bool,
    /// True when the idle layer is muted (silent idle mode).
    pub silent: bool,
}

/// One sliding voice of the glide engine.
///
/// The track carries three automation lanes: oscillator frequency, the
/// proximity swell gain, and a user volume trim. The swell is the
/// expressive one; trim is a plain mixer fader.
///
/// Frequency has two simultaneous models. The audio lane follows the
/// configured easing (quadratic shapes are realized as sampled curves,
/// since the downstream renderer only ramps linearly). The logical
/// model is always plain linear interpolation over the ramp interval,
/// and it is what proximity, arrival detection, and display read. The
/// two agree at the endpoints and may disagree in between.
#[derive(Clone, Debug)]
pub struct GlideTrack {
    id: u64,
    frequency: AutomationLane,
    swell: AutomationLane,
    trim: AutomationLane,
    phase: TrackPhase,
    spawned: bool,
    ramp: Option<LogicalRamp>,
    target: Option<f32>,
    /// Semitone distance when the current convergence began.
    initial_distance: f32,
    /// Where the track was before it started converging.
    pre_convergence_freq: f32,
    /// Target queued by the finish-then-retarget policy.
    queued_target: Option<f32>,
    /// End of the vibrato window scheduled so far.
    vibrato_until: f64,
    /// The pending hold-elapsed timer, owned so a retarget can cancel it.
    hold_timer: Option<TimerHandle>,
    /// Fading out ahead of removal; excluded from assignment and wander.
    retiring: bool,
}

impl GlideTrack {
    /// An idle track at `freq` Hz with unity trim and zero swell.
    pub fn new(id: u64, freq: f32, spawned: bool) -> Self {
        let freq = pitch::clamp_freq(freq);
        Self {
            id,
            frequency: AutomationLane::new(freq),
            swell: AutomationLane::new(0.0),
            trim: AutomationLane::new(1.0),
            phase: TrackPhase::Idle,
            spawned,
            ramp: None,
            target: None,
            initial_distance: 0.0,
            pre_convergence_freq: freq,
            queued_target: None,
            vibrato_until: 0.0,
            hold_timer: None,
            retiring: false,
        }
    }

    /// The track's stable id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    /// True for overflow tracks.
    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    /// True once the track is fading out ahead of removal.
    pub fn is_retiring(&self) -> bool {
        self.retiring
    }

    /// Mark the track as fading out ahead of removal.
    pub fn retire(&mut self) {
        self.retiring = true;
    }

    /// Hand the track its pending hold timer, returning any previous one
    /// so the caller can cancel it.
    pub fn set_hold_timer(&mut self, handle: TimerHandle) -> Option<TimerHandle> {
        self.hold_timer.replace(handle)
    }

    /// Take the pending hold timer, leaving none.
    pub fn take_hold_timer(&mut self) -> Option<TimerHandle> {
        self.hold_timer.take()
    }

    /// The assigned convergence target, if any.
    pub fn target(&self) -> Option<f32> {
        self.target
    }

    /// The queued target from the finish-then-retarget policy, if any.
    pub fn queued_target(&self) -> Option<f32> {
        self.queued_target
    }

    /// Queue a target to converge to once the current ramp finishes.
    pub fn queue_target(&mut self, target: f32) {
        self.queued_target = Some(pitch::clamp_freq(target));
    }

    /// Take the queued target, leaving none.
    pub fn take_queued_target(&mut self) -> Option<f32> {
        self.queued_target.take()
    }

    /// Where the track was when its current convergence began.
    pub fn pre_convergence_freq(&self) -> f32 {
        self.pre_convergence_freq
    }

    /// Logical frequency at `now`: linear interpolation over the active
    /// ramp, or the resting pitch when no ramp is active.
    pub fn logical_freq(&self, now: f64) -> f32 {
        match self.ramp {
            Some(ramp) => ramp.freq_at(now),
            None => self.frequency.value_at(now),
        }
    }

    /// Audio-lane frequency at `now` (follows the easing).
    pub fn audio_freq(&self, now: f64) -> f32 {
        self.frequency.value_at(now)
    }

    /// Swell gain at `now`.
    pub fn swell_at(&self, now: f64) -> f32 {
        self.swell.value_at(now)
    }

    /// Volume trim at `now`.
    pub fn trim_at(&self, now: f64) -> f32 {
        self.trim.value_at(now)
    }

    /// True when the active ramp (if any) has run its course.
    pub fn ramp_done(&self, now: f64) -> bool {
        self.ramp.is_none_or(|r| r.done_at(now))
    }

    /// Convergence proximity at `now`: 0 at the starting distance, 1 on
    /// target. Held tracks are exactly 1; tracks without a target are 0.
    pub fn proximity(&self, now: f64) -> f32 {
        if self.phase == TrackPhase::Held {
            return 1.0;
        }
        let Some(target) = self.target else {
            return 0.0;
        };
        if self.initial_distance <= 0.0 {
            return 1.0;
        }
        let dist = pitch::semitone_distance(self.logical_freq(now), target);
        (1.0 - dist / self.initial_distance).clamp(0.0, 1.0)
    }

    /// Begin converging toward `target` over `duration` seconds.
    ///
    /// Records the starting point and distance for proximity math, then
    /// schedules the audio ramp with the requested easing.
    pub fn begin_convergence(&mut self, target: f32, duration: f64, easing: Easing, now: f64) {
        let target = pitch::clamp_freq(target);
        let from = self.logical_freq(now);
        self.pre_convergence_freq = from;
        self.initial_distance = pitch::semitone_distance(from, target);
        self.target = Some(target);
        self.phase = TrackPhase::Converging;
        self.schedule_frequency_ramp(target, duration, easing, now);
    }

    /// Begin converging along a precomputed frequency curve (the
    /// scale-snapped staircase). Proximity and arrival still read the
    /// linear logical model; only the audio lane steps.
    pub fn begin_convergence_curve(
        &mut self,
        target: f32,
        duration: f64,
        curve: Vec<f32>,
        now: f64,
    ) {
        let target = pitch::clamp_freq(target);
        let from = self.logical_freq(now);
        self.pre_convergence_freq = from;
        self.initial_distance = pitch::semitone_distance(from, target);
        self.target = Some(target);
        self.phase = TrackPhase::Converging;

        let duration = duration.max(1e-3);
        self.frequency.anchor(now);
        self.frequency.set_value_curve(curve, now, duration);
        self.ramp = Some(LogicalRamp {
            start_freq: from,
            end_freq: target,
            start_time: now,
            end_time: now + duration,
        });
    }

    /// Slide to `target` over `duration` seconds without convergence
    /// bookkeeping (idle wandering, departures).
    pub fn glide_to(&mut self, target: f32, duration: f64, easing: Easing, now: f64) {
        self.schedule_frequency_ramp(target, duration, easing, now);
    }

    /// Settle exactly on `target` (arrival snap). Clears the ramp; the
    /// track now rests at the target pitch.
    pub fn settle_on(&mut self, target: f32, now: f64) {
        let target = pitch::clamp_freq(target);
        self.frequency.anchor(now);
        self.frequency.set_value_at(target, now);
        self.ramp = None;
        self.target = Some(target);
        self.phase = TrackPhase::Held;
    }

    /// Play a landing bounce: an instant overshoot of `depth_cents`
    /// above the held pitch, settling back to the exact pitch over
    /// `decay_seconds`.
    pub fn play_bounce(&mut self, depth_cents: f32, decay_seconds: f64, now: f64) {
        if depth_cents <= 0.0 {
            return;
        }
        let center = self.frequency.value_at(now);
        let points = 16;
        let curve: Vec<f32> = (0..points)
            .map(|i| {
                let t = i as f32 / (points - 1) as f32;
                pitch::shift_cents(center, depth_cents * (1.0 - t))
            })
            .collect();
        self.frequency.anchor(now);
        self.frequency.set_value_curve(curve, now, decay_seconds);
    }

    /// Schedule one window of sinusoidal vibrato around the held pitch.
    ///
    /// Returns the window's end time; the scheduler re-arms the next
    /// window when its tick passes that point.
    pub fn schedule_vibrato(
        &mut self,
        depth_cents: f32,
        rate_hz: f32,
        window_seconds: f64,
        now: f64,
    ) -> f64 {
        let Some(center) = self.target else {
            return now;
        };
        if depth_cents <= 0.0 || rate_hz <= 0.0 {
            return now;
        }
        let curve: Vec<f32> = (0..VIBRATO_CURVE_POINTS)
            .map(|i| {
                let t = i as f64 / (VIBRATO_CURVE_POINTS - 1) as f64 * window_seconds;
                let offset = f64::from(depth_cents) * sin(core::f64::consts::TAU * f64::from(rate_hz) * t);
                pitch::shift_cents(center, offset as f32)
            })
            .collect();
        self.frequency.anchor(now);
        self.frequency.set_value_curve(curve, now, window_seconds);
        self.vibrato_until = now + window_seconds;
        self.vibrato_until
    }

    /// End of the vibrato window scheduled so far.
    pub fn vibrato_until(&self) -> f64 {
        self.vibrato_until
    }

    /// Push the next vibrato window past `until` without scheduling one.
    pub fn defer_vibrato(&mut self, until: f64) {
        self.vibrato_until = self.vibrato_until.max(until);
    }

    /// Ramp the swell gain to `gain` over a short anti-click window.
    pub fn set_swell(&mut self, gain: f32, now: f64) {
        self.swell.anchor(now);
        self.swell.linear_ramp_to(gain.max(0.0), now + GAIN_RAMP_SECONDS);
    }

    /// Ramp the swell gain to `gain` over `duration` seconds.
    pub fn fade_swell(&mut self, gain: f32, duration: f64, now: f64) {
        self.swell.anchor(now);
        self.swell
            .linear_ramp_to(gain.max(0.0), now + duration.max(GAIN_RAMP_SECONDS));
    }

    /// Set the user volume trim with an anti-click ramp.
    pub fn set_trim(&mut self, gain: f32, now: f64) {
        self.trim.anchor(now);
        self.trim.linear_ramp_to(gain.max(0.0), now + GAIN_RAMP_SECONDS);
    }

    /// Freeze all three lanes at their current values.
    pub fn cancel_all_ramps(&mut self, now: f64) {
        self.frequency.anchor(now);
        self.swell.anchor(now);
        self.trim.anchor(now);
        self.ramp = None;
    }

    /// Force the phase. The scheduler owns phase transitions; the track
    /// only validates nothing here.
    pub fn set_phase(&mut self, phase: TrackPhase) {
        self.phase = phase;
        if phase == TrackPhase::Idle {
            self.target = None;
            self.initial_distance = 0.0;
        }
    }

    /// Point-in-time snapshot. `silent` is the engine-level idle-mute
    /// flag; the scheduler supplies it.
    pub fn state(&self, now: f64, silent: bool) -> TrackState {
        TrackState {
            id: self.id,
            phase: self.phase,
            frequency: self.logical_freq(now),
            target: self.target,
            proximity: self.proximity(now),
            spawned: self.spawned,
            silent,
        }
    }

    fn schedule_frequency_ramp(&mut self, target: f32, duration: f64, easing: Easing, now: f64) {
        let target = pitch::clamp_freq(target);
        let duration = duration.max(1e-3);
        let from = self.frequency.anchor(now);
        match easing {
            Easing::Linear => {
                self.frequency.linear_ramp_to(target, now + duration);
            }
            Easing::EaseIn | Easing::EaseOut => {
                let curve: Vec<f32> = (0..EASING_CURVE_POINTS)
                    .map(|i| {
                        let t = i as f32 / (EASING_CURVE_POINTS - 1) as f32;
                        let shaped = match easing {
                            Easing::EaseIn => t * t,
                            _ => 1.0 - (1.0 - t) * (1.0 - t),
                        };
                        pitch::lerp_freq(from, target, shaped)
                    })
                    .collect();
                self.frequency.set_value_curve(curve, now, duration);
            }
        }
        self.ramp = Some(LogicalRamp {
            start_freq: from,
            end_freq: target,
            start_time: now,
            end_time: now + duration,
        });
    }
}

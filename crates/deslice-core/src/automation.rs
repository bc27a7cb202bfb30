//! Timed parameter automation with anti-click scheduling.
//!
//! An [`AutomationLane`] is the unit of control the engine hands to the
//! downstream real-time renderer: an ordered list of parameter events on a
//! shared monotonic clock. The lane never runs on its own — callers pass
//! `now` explicitly and query [`AutomationLane::value_at`] when they need
//! the parameter's instantaneous value.
//!
//! ## Anti-click protocol
//!
//! Every audible parameter change follows the same three steps:
//!
//! 1. [`cancel_from`](AutomationLane::cancel_from) - clear pending events
//! 2. [`set_value_at`](AutomationLane::set_value_at) - anchor the current value
//! 3. Apply the new ramp, target, or curve
//!
//! [`anchor`](AutomationLane::anchor) performs steps 1 and 2 together.
//! Skipping the anchor produces a value discontinuity, which the renderer
//! reproduces as an audible click.

use alloc::vec::Vec;
use libm::exp;

/// Ramp shapes for scheduled frequency transitions.
///
/// Linear maps to a native ramp event; the quadratic shapes are realized by
/// sampling a 256-point value curve (see `deslice-glide`), since the
/// downstream renderer only understands linear segments, exponential
/// approaches, and sampled curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Easing {
    /// Constant-rate transition.
    #[default]
    Linear,
    /// Quadratic ease-in: starts slow, ends fast (`f(t) = t²`).
    EaseIn,
    /// Quadratic ease-out: starts fast, ends slow (`f(t) = 1 - (1-t)²`).
    EaseOut,
}

/// A single scheduled parameter event.
#[derive(Clone, Debug)]
enum Event {
    /// Instantaneous value change at `time`.
    SetValue { time: f64, value: f32 },
    /// Linear ramp from the previous event's value, arriving at `end_time`.
    RampTo { end_time: f64, value: f32 },
    /// Exponential approach toward `target` starting at `time`, with the
    /// given time constant. Remains in effect until superseded.
    TargetAt {
        time: f64,
        target: f32,
        time_constant: f64,
    },
    /// Sampled curve played over `[time, time + duration]`; linear
    /// interpolation between samples, holding the last sample afterwards.
    Curve {
        time: f64,
        duration: f64,
        values: Vec<f32>,
    },
}

impl Event {
    /// The time at which this event takes (or completes) effect, used for
    /// ordering and cancellation.
    fn effective_time(&self) -> f64 {
        match self {
            Event::SetValue { time, .. }
            | Event::TargetAt { time, .. }
            | Event::Curve { time, .. } => *time,
            Event::RampTo { end_time, .. } => *end_time,
        }
    }
}

/// An exponential approach in progress: `target + (start - target)·e^(-Δt/τ)`.
#[derive(Clone, Copy)]
struct ActiveTarget {
    start_time: f64,
    start_value: f32,
    target: f32,
    time_constant: f64,
}

impl ActiveTarget {
    fn eval(&self, t: f64) -> f32 {
        let dt = (t - self.start_time).max(0.0);
        let decay = exp(-dt / self.time_constant) as f32;
        self.target + (self.start_value - self.target) * decay
    }
}

/// A parameter automation timeline.
///
/// Events are fire-once and idempotent by re-invocation: scheduling the same
/// ramp twice leaves the lane in the same state. Times are `f64` seconds on
/// the downstream subsystem's clock; values are `f32`.
///
/// Lanes assume the anchor discipline documented at module level: an
/// exponential target or curve is never scheduled while a linear ramp is
/// mid-flight without an intervening [`anchor`](Self::anchor).
#[derive(Clone, Debug)]
pub struct AutomationLane {
    /// Value before any event applies.
    initial: f32,
    /// Events sorted by effective time.
    events: Vec<Event>,
}

impl AutomationLane {
    /// Create a lane holding `initial` until the first event.
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    /// Instantaneous value change at `time`.
    pub fn set_value_at(&mut self, value: f32, time: f64) {
        self.insert(Event::SetValue { time, value });
    }

    /// Linear ramp from the previous event's value, arriving at `end_time`.
    pub fn linear_ramp_to(&mut self, value: f32, end_time: f64) {
        self.insert(Event::RampTo { end_time, value });
    }

    /// Exponential approach toward `target` with time constant
    /// `time_constant` seconds, starting at `time`. Zero or negative time
    /// constants are clamped to 1 ms.
    pub fn set_target_at(&mut self, target: f32, time: f64, time_constant: f64) {
        self.insert(Event::TargetAt {
            time,
            target,
            time_constant: time_constant.max(1e-3),
        });
    }

    /// Play a sampled value curve over `[time, time + duration]`.
    ///
    /// Empty curves are ignored; a single-sample curve behaves like
    /// [`set_value_at`](Self::set_value_at).
    pub fn set_value_curve(&mut self, values: Vec<f32>, time: f64, duration: f64) {
        if values.is_empty() {
            return;
        }
        self.insert(Event::Curve {
            time,
            duration: duration.max(0.0),
            values,
        });
    }

    /// Remove every event with effective time at or after `time`.
    ///
    /// A ramp or curve still in flight at `time` is removed entirely, so the
    /// caller must re-anchor before scheduling anything new.
    pub fn cancel_from(&mut self, time: f64) {
        self.events.retain(|ev| ev.effective_time() < time);
    }

    /// Cancel pending events and anchor the current value at `time`.
    ///
    /// This is steps 1 and 2 of the anti-click protocol; the caller applies
    /// the new ramp afterwards. Returns the anchored value.
    pub fn anchor(&mut self, time: f64) -> f32 {
        let value = self.value_at(time);
        self.cancel_from(time);
        self.set_value_at(value, time);
        value
    }

    /// The lane's value at time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut value = self.initial;
        let mut value_time = f64::NEG_INFINITY;
        let mut active_target: Option<ActiveTarget> = None;

        for ev in &self.events {
            match ev {
                Event::SetValue { time, value: v } => {
                    if *time <= t {
                        value = *v;
                        value_time = *time;
                        active_target = None;
                    } else {
                        break;
                    }
                }
                Event::RampTo { end_time, value: v } => {
                    if *end_time <= t {
                        value = *v;
                        value_time = *end_time;
                        active_target = None;
                    } else {
                        // In-flight ramp: interpolate from the previous
                        // event's anchor point.
                        let start = value_time;
                        if t <= start || !start.is_finite() {
                            return value;
                        }
                        let frac = ((t - start) / (end_time - start)).clamp(0.0, 1.0) as f32;
                        return value + (v - value) * frac;
                    }
                }
                Event::TargetAt {
                    time,
                    target,
                    time_constant,
                } => {
                    if *time <= t {
                        active_target = Some(ActiveTarget {
                            start_time: *time,
                            start_value: value,
                            target: *target,
                            time_constant: *time_constant,
                        });
                        value_time = *time;
                    } else {
                        break;
                    }
                }
                Event::Curve {
                    time,
                    duration,
                    values,
                } => {
                    let end = time + duration;
                    if end <= t {
                        value = *values.last().unwrap_or(&value);
                        value_time = end;
                        active_target = None;
                    } else if *time <= t {
                        return sample_curve(values, (t - time) / duration.max(f64::MIN_POSITIVE));
                    } else {
                        break;
                    }
                }
            }
        }

        match active_target {
            Some(target) => target.eval(t),
            None => value,
        }
    }

    /// True when no event is scheduled at or after `t` and no exponential
    /// approach is still converging (approaches are treated as settled —
    /// they are always paired with a terminating anchor by callers).
    pub fn is_quiet_after(&self, t: f64) -> bool {
        self.events.iter().all(|ev| ev.effective_time() < t)
    }

    fn insert(&mut self, event: Event) {
        let time = event.effective_time();
        let idx = self
            .events
            .iter()
            .position(|ev| ev.effective_time() > time)
            .unwrap_or(self.events.len());
        self.events.insert(idx, event);
    }
}

/// Sample a curve at normalized position `frac` (0–1) with linear
/// interpolation between adjacent samples.
fn sample_curve(values: &[f32], frac: f64) -> f32 {
    debug_assert!(!values.is_empty());
    if values.len() == 1 {
        return values[0];
    }
    let pos = frac.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let idx = pos as usize;
    if idx + 1 >= values.len() {
        return values[values.len() - 1];
    }
    let t = (pos - idx as f64) as f32;
    values[idx] + (values[idx + 1] - values[idx]) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn holds_initial_value_with_no_events() {
        let lane = AutomationLane::new(0.25);
        assert_eq!(lane.value_at(0.0), 0.25);
        assert_eq!(lane.value_at(100.0), 0.25);
    }

    #[test]
    fn set_value_takes_effect_at_its_time() {
        let mut lane = AutomationLane::new(0.0);
        lane.set_value_at(0.5, 1.0);
        assert_eq!(lane.value_at(0.999), 0.0);
        assert_eq!(lane.value_at(1.0), 0.5);
    }

    #[test]
    fn linear_ramp_interpolates_from_anchor() {
        let mut lane = AutomationLane::new(0.0);
        lane.set_value_at(0.0, 1.0);
        lane.linear_ramp_to(1.0, 3.0);
        assert_eq!(lane.value_at(1.0), 0.0);
        assert!((lane.value_at(2.0) - 0.5).abs() < 1e-6);
        assert_eq!(lane.value_at(3.0), 1.0);
        assert_eq!(lane.value_at(10.0), 1.0);
    }

    #[test]
    fn target_approach_follows_exponential() {
        let mut lane = AutomationLane::new(1.0);
        lane.set_value_at(1.0, 0.0);
        lane.set_target_at(0.0, 0.0, 1.0);
        // After one time constant: e^-1 of the way remaining.
        let v = lane.value_at(1.0);
        assert!((v - exp(-1.0) as f32).abs() < 1e-6, "got {v}");
        // Converges toward the target but never snaps on its own.
        assert!(lane.value_at(20.0) > 0.0);
    }

    #[test]
    fn set_value_after_target_snaps_exactly() {
        let mut lane = AutomationLane::new(1.0);
        lane.set_target_at(0.0001, 0.0, 0.1);
        lane.set_value_at(0.0, 0.5);
        assert!(lane.value_at(0.4) > 0.0);
        assert_eq!(lane.value_at(0.5), 0.0);
        assert_eq!(lane.value_at(5.0), 0.0);
    }

    #[test]
    fn cancel_removes_in_flight_ramp() {
        let mut lane = AutomationLane::new(0.0);
        lane.set_value_at(0.0, 0.0);
        lane.linear_ramp_to(1.0, 2.0);
        lane.cancel_from(1.0);
        // The ramp ended at 2.0 >= 1.0, so it is gone entirely.
        assert_eq!(lane.value_at(1.5), 0.0);
    }

    #[test]
    fn anchor_freezes_mid_ramp_value() {
        let mut lane = AutomationLane::new(0.0);
        lane.set_value_at(0.0, 0.0);
        lane.linear_ramp_to(1.0, 2.0);
        let anchored = lane.anchor(1.0);
        assert!((anchored - 0.5).abs() < 1e-6);
        assert!((lane.value_at(1.5) - 0.5).abs() < 1e-6);
        assert!((lane.value_at(10.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn curve_samples_interpolate_and_hold() {
        let mut lane = AutomationLane::new(0.0);
        lane.set_value_curve(vec![0.0, 1.0, 0.0], 1.0, 1.0);
        assert_eq!(lane.value_at(0.5), 0.0);
        assert_eq!(lane.value_at(1.0), 0.0);
        assert!((lane.value_at(1.25) - 0.5).abs() < 1e-6);
        assert!((lane.value_at(1.5) - 1.0).abs() < 1e-6);
        assert_eq!(lane.value_at(2.0), 0.0);
        assert_eq!(lane.value_at(3.0), 0.0);
    }

    #[test]
    fn rescheduling_the_same_ramp_is_idempotent() {
        let mut lane = AutomationLane::new(0.0);
        for _ in 0..2 {
            lane.anchor(1.0);
            lane.linear_ramp_to(0.8, 2.0);
        }
        assert!((lane.value_at(1.5) - 0.4).abs() < 1e-6);
        assert_eq!(lane.value_at(2.0), 0.8);
    }

    #[test]
    fn zero_time_constant_is_clamped() {
        let mut lane = AutomationLane::new(1.0);
        lane.set_target_at(0.0, 0.0, 0.0);
        // With the 1 ms clamp the value is effectively settled by 10 ms.
        assert!(lane.value_at(0.01).abs() < 1e-4);
    }
}

#[cfg(all(test, feature = "std"))]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A single rising linear ramp never moves backwards.
        #[test]
        fn linear_ramp_is_monotone(
            start in 0.0_f32..1.0,
            delta in 0.0_f32..1.0,
            duration in 0.01_f64..10.0,
        ) {
            let mut lane = AutomationLane::new(start);
            lane.set_value_at(start, 0.0);
            lane.linear_ramp_to(start + delta, duration);
            let mut last = lane.value_at(0.0);
            for i in 1..=100 {
                let v = lane.value_at(duration * f64::from(i) / 100.0);
                prop_assert!(v >= last - 1e-6);
                last = v;
            }
            prop_assert!((last - (start + delta)).abs() < 1e-5);
        }
    }
}

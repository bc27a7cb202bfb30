//! The convergence scheduler: assigns targets to glide tracks and runs
//! their idle wandering, arrivals, holds, and departures.

use deslice_config::{
    BoundaryBehavior, CorrelationMode, DepartureDirection, DurationMode, IdleMode, IdleMovement,
    MidConvergencePolicy, ModeToggleBehavior, PitchBoundary, PitchMovement, PostArrivalMode,
    SlideConfig, StartPosition, SwellCurve, WanderMode, validation,
};
use deslice_core::automation::Easing;
use deslice_core::{ScaleTable, TimerQueue, Waveform, pitch};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::track::{GlideTrack, TrackPhase, TrackState};

/// A track counts as arrived within this many semitones of its target.
const ARRIVAL_THRESHOLD_SEMITONES: f32 = 0.5;

/// Departure distance range, in semitones.
const DEPARTURE_MIN_SEMITONES: f32 = 6.0;
const DEPARTURE_MAX_SEMITONES: f32 = 12.0;

/// Idle tracks are pushed apart when they drift closer than this.
const INTERACTION_MIN_SEMITONES: f32 = 2.0;

/// Orbit-home wander radius, in semitones.
const ORBIT_RADIUS_SEMITONES: f32 = 12.0;

/// Swell fade-in for freshly spawned overflow tracks.
const SPAWN_FADE_SECONDS: f64 = 0.15;

/// Fade-out granted to a track before it is actually removed.
const RETIRE_FADE_SECONDS: f64 = 0.1;

/// Length of one scheduled vibrato window.
const VIBRATO_WINDOW_SECONDS: f64 = 2.0;

/// Samples in a staircase convergence curve.
const STAIRCASE_CURVE_POINTS: usize = 256;

/// Recall glide length when a root change sends idle tracks home.
const RESET_HOME_SECONDS: f64 = 0.5;

/// Delayed per-track events. Events carry the track's id, not its index:
/// a fired event whose track has been removed or has changed phase is a
/// silent no-op.
#[derive(Clone, Copy, Debug)]
enum TrackEvent {
    /// A held track's hold time ran out.
    HoldElapsed { track: u64 },
    /// A departing track finished its slide away.
    DepartureComplete { track: u64 },
    /// A retiring track's fade-out finished; remove it.
    Retired { track: u64 },
}

/// Drives every glide track from a periodic tick.
///
/// The scheduler owns the persistent tracks, any overflow tracks spawned
/// mid-convergence, and a timer queue for hold and departure deadlines.
/// Nothing runs between ticks: callers pump [`tick`](Self::tick) on the
/// configured interval and all time-dependent behavior follows from the
/// `now` they pass.
pub struct ConvergenceScheduler {
    config: SlideConfig,
    tracks: Vec<GlideTrack>,
    timers: TimerQueue<TrackEvent>,
    scale: ScaleTable,
    waveform: Waveform,
    rng: SmallRng,
    next_track_id: u64,
    /// Targets the persistent tracks are converging to (or cycling on).
    current_targets: Vec<f32>,
    paused: bool,
}

impl ConvergenceScheduler {
    /// A scheduler with entropy-seeded wandering.
    pub fn new(config: SlideConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// A scheduler with deterministic wandering, for tests and replays.
    pub fn with_seed(mut config: SlideConfig, seed: u64) -> Self {
        validation::clamp(&mut config);
        let mut scheduler = Self {
            config,
            tracks: Vec::new(),
            timers: TimerQueue::new(),
            scale: ScaleTable::empty(),
            waveform: Waveform::default(),
            rng: SmallRng::seed_from_u64(seed),
            next_track_id: 0,
            current_targets: Vec::new(),
            paused: false,
        };
        for _ in 0..scheduler.config.track_count {
            let freq = scheduler.starting_freq(0.0);
            scheduler.add_track(freq, false, 0.0);
        }
        scheduler
    }

    /// The active configuration.
    pub fn config(&self) -> &SlideConfig {
        &self.config
    }

    /// Replace the configuration, clamping it and resizing the
    /// persistent track set if `track_count` changed.
    pub fn update_config(&mut self, mut config: SlideConfig, now: f64) {
        validation::clamp(&mut config);
        let count = config.track_count;
        self.config = config;
        self.set_track_count(count, now);
    }

    /// Grow or shrink the persistent track set.
    ///
    /// Shrinking fades each surplus track to silence first; the track is
    /// only removed when its fade-out timer fires.
    pub fn set_track_count(&mut self, count: usize, now: f64) {
        self.config.track_count = count;
        validation::clamp(&mut self.config);
        let count = self.config.track_count;
        let persistent = self
            .tracks
            .iter()
            .filter(|t| !t.is_spawned() && !t.is_retiring())
            .count();
        if count > persistent {
            for _ in persistent..count {
                let freq = self.starting_freq(now);
                self.add_track(freq, false, now);
            }
        } else if count < persistent {
            // Retire from the end.
            let mut to_drop = persistent - count;
            let mut i = self.tracks.len();
            while to_drop > 0 && i > 0 {
                i -= 1;
                if !self.tracks[i].is_spawned() && !self.tracks[i].is_retiring() {
                    self.retire_track(i, RETIRE_FADE_SECONDS, now);
                    to_drop -= 1;
                }
            }
        }
    }

    /// Replace the scale table used by magnetic snapping.
    pub fn set_scale(&mut self, scale: ScaleTable) {
        self.scale = scale;
    }

    /// Move the home frequency. In reset-home mode, idle tracks glide
    /// back to the new root.
    pub fn set_root_freq(&mut self, hz: f32, now: f64) {
        self.config.root_freq = hz;
        validation::clamp(&mut self.config);
        if self.config.starting_position == StartPosition::RootNote
            && self.config.mode_toggle_behavior == ModeToggleBehavior::ResetHome
        {
            let root = self.config.root_freq;
            for track in &mut self.tracks {
                if track.phase() == TrackPhase::Idle && !track.is_retiring() {
                    track.glide_to(root, RESET_HOME_SECONDS, Easing::Linear, now);
                }
            }
        }
    }

    /// Move the pitch boundaries.
    pub fn set_pitch_boundaries(&mut self, min_hz: f32, max_hz: f32) {
        self.config.min_freq = min_hz;
        self.config.max_freq = max_hz;
        validation::clamp(&mut self.config);
    }

    /// Switch the waveform reported for the glide oscillators.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// The glide oscillators' waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Switch idle audibility, applying it to currently idle tracks.
    pub fn set_idle_mode(&mut self, mode: IdleMode, now: f64) {
        self.config.idle_mode = mode;
        let gain = self.idle_gain();
        for track in &mut self.tracks {
            if track.phase() == TrackPhase::Idle && !track.is_retiring() {
                track.set_swell(gain, now);
            }
        }
    }

    /// Switch the post-arrival behavior for future arrivals.
    pub fn set_post_arrival_mode(&mut self, mode: PostArrivalMode) {
        self.config.post_arrival = mode;
    }

    /// Converge the tracks onto `targets`.
    ///
    /// Each track independently heads for its nearest target by
    /// semitone distance; a popular note may draw several tracks at
    /// once. All tracks in one call share a single duration so they
    /// land together.
    pub fn converge_to(&mut self, targets: &[f32], now: f64) {
        let targets: Vec<f32> = targets.iter().map(|&f| pitch::clamp_freq(f)).collect();
        if targets.is_empty() {
            self.release(now);
            return;
        }
        debug!(count = targets.len(), "convergence requested");
        self.current_targets = targets.clone();

        let busy: Vec<usize> = (0..self.tracks.len())
            .filter(|&i| {
                self.tracks[i].phase() == TrackPhase::Converging && !self.tracks[i].is_retiring()
            })
            .collect();

        match self.config.mid_convergence_policy {
            MidConvergencePolicy::Interrupt => {
                let all: Vec<usize> = (0..self.tracks.len())
                    .filter(|&i| !self.tracks[i].is_retiring())
                    .collect();
                self.assign_and_start(&all, &targets, now);
            }
            MidConvergencePolicy::FinishThenRetarget => {
                let free: Vec<usize> = (0..self.tracks.len())
                    .filter(|i| !busy.contains(i) && !self.tracks[*i].is_retiring())
                    .collect();
                // Converging tracks keep going and queue their nearest
                // new target for when they land.
                for &i in &busy {
                    let from = self.tracks[i].logical_freq(now);
                    if let Some(&nearest) = targets.iter().min_by(|a, b| {
                        pitch::semitone_distance(from, **a)
                            .partial_cmp(&pitch::semitone_distance(from, **b))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    }) {
                        self.tracks[i].queue_target(nearest);
                    }
                }
                if !free.is_empty() {
                    self.assign_and_start(&free, &targets, now);
                }
            }
            MidConvergencePolicy::SpawnOverflow => {
                if busy.is_empty() {
                    let all: Vec<usize> = (0..self.tracks.len())
                        .filter(|&i| !self.tracks[i].is_retiring())
                        .collect();
                    self.assign_and_start(&all, &targets, now);
                } else {
                    // Busy tracks keep their notes untouched; every new
                    // target gets a freshly spawned track.
                    for &target in &targets {
                        let i = self.spawn_track(now);
                        let duration = self.convergence_duration_for(&[(i, target)], now);
                        self.start_convergence(i, target, duration, now);
                    }
                }
            }
        }
    }

    /// Release every convergence: held and converging tracks depart, and
    /// cycling stops.
    pub fn release(&mut self, now: f64) {
        self.current_targets.clear();
        for i in 0..self.tracks.len() {
            if self.tracks[i].is_retiring() {
                continue;
            }
            self.tracks[i].take_queued_target();
            match self.tracks[i].phase() {
                TrackPhase::Converging | TrackPhase::Held => self.begin_departure(i, now),
                _ => {}
            }
        }
    }

    /// Freeze every track where it stands.
    pub fn pause(&mut self, now: f64) {
        self.paused = true;
        self.tracks.retain(|t| !t.is_retiring());
        for track in &mut self.tracks {
            track.cancel_all_ramps(now);
            track.set_phase(TrackPhase::Idle);
        }
        self.timers.clear();
        self.current_targets.clear();
    }

    /// Resume wandering after a pause.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Fade everything out and drop all pending events.
    pub fn dispose(&mut self, now: f64) {
        self.tracks.retain(|t| !t.is_retiring());
        for track in &mut self.tracks {
            track.fade_swell(0.0, 0.1, now);
            track.cancel_all_ramps(now);
            track.set_phase(TrackPhase::Idle);
        }
        self.timers.clear();
        self.current_targets.clear();
        self.paused = true;
    }

    /// Set the volume trim of one persistent track. Out-of-range indices
    /// do nothing.
    pub fn set_track_volume(&mut self, index: usize, gain: f32, now: f64) {
        let mut seen = 0;
        for track in &mut self.tracks {
            if track.is_spawned() || track.is_retiring() {
                continue;
            }
            if seen == index {
                track.set_trim(gain, now);
                return;
            }
            seen += 1;
        }
    }

    /// Snapshots of every track at `now`, persistent first.
    pub fn track_states(&self, now: f64) -> Vec<TrackState> {
        let silent = self.config.idle_mode == IdleMode::Silent;
        self.tracks.iter().map(|t| t.state(now, silent)).collect()
    }

    /// Number of tracks, including spawned overflow tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Advance the scheduler to `now`.
    ///
    /// Drains due timer events, detects arrivals, updates proximity
    /// swells, re-arms held-track vibrato, and hands new wander targets
    /// to idle tracks.
    pub fn tick(&mut self, now: f64) {
        if self.paused {
            return;
        }

        for event in self.timers.pop_due(now) {
            match event {
                TrackEvent::HoldElapsed { track } => {
                    if let Some(i) = self.index_of(track)
                        && self.tracks[i].phase() == TrackPhase::Held
                    {
                        self.tracks[i].take_hold_timer();
                        self.begin_departure(i, now);
                    }
                }
                TrackEvent::DepartureComplete { track } => {
                    if let Some(i) = self.index_of(track)
                        && self.tracks[i].phase() == TrackPhase::Departing
                    {
                        self.finish_departure(i, now);
                    }
                }
                TrackEvent::Retired { track } => {
                    if let Some(i) = self.index_of(track)
                        && self.tracks[i].is_retiring()
                    {
                        self.tracks.remove(i);
                    }
                }
            }
        }

        // Arrivals and proximity swells.
        for i in 0..self.tracks.len() {
            if self.tracks[i].phase() != TrackPhase::Converging {
                continue;
            }
            let Some(target) = self.tracks[i].target() else {
                continue;
            };
            let dist = pitch::semitone_distance(self.tracks[i].logical_freq(now), target);
            if dist < ARRIVAL_THRESHOLD_SEMITONES || self.tracks[i].ramp_done(now) {
                self.arrive(i, now);
            } else {
                let gain = self.proximity_gain(self.tracks[i].proximity(now));
                self.tracks[i].set_swell(gain, now);
            }
        }

        // Held tracks: keep the vibrato window ahead of the clock.
        if self.config.micro_motion && self.config.micro_motion_depth > 0.0 {
            let depth = self.config.micro_motion_depth;
            let rate = self.config.micro_motion_rate;
            for track in &mut self.tracks {
                if track.phase() == TrackPhase::Held && now >= track.vibrato_until() {
                    track.schedule_vibrato(depth, rate, VIBRATO_WINDOW_SECONDS, now);
                }
            }
        }

        // Cycling: once departed tracks are idle again, reconverge.
        if self.config.post_arrival == PostArrivalMode::Cycle && !self.current_targets.is_empty() {
            let idle: Vec<usize> = (0..self.tracks.len())
                .filter(|&i| {
                    !self.tracks[i].is_spawned()
                        && !self.tracks[i].is_retiring()
                        && self.tracks[i].phase() == TrackPhase::Idle
                        && self.tracks[i].ramp_done(now)
                })
                .collect();
            if !idle.is_empty() {
                let targets = self.current_targets.clone();
                self.assign_and_start(&idle, &targets, now);
            }
            return;
        }

        self.wander_idle_tracks(now);
    }

    // --- internals ---

    fn index_of(&self, id: u64) -> Option<usize> {
        self.tracks.iter().position(|t| t.id() == id)
    }

    fn add_track(&mut self, freq: f32, spawned: bool, now: f64) -> usize {
        let id = self.next_track_id;
        self.next_track_id += 1;
        let mut track = GlideTrack::new(id, freq, spawned);
        if !spawned {
            track.set_swell(self.idle_gain(), now);
        }
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    fn spawn_track(&mut self, now: f64) -> usize {
        let spawned_count = self.tracks.iter().filter(|t| t.is_spawned()).count();
        if spawned_count >= self.config.max_spawned_tracks {
            // Evict the oldest spawned track to stay under the cap.
            if let Some(oldest) = self.tracks.iter().position(GlideTrack::is_spawned) {
                debug!(id = self.tracks[oldest].id(), "evicting oldest spawned track");
                self.tracks.remove(oldest);
            }
        }
        let freq = match self.config.spawn_start_position {
            StartPosition::RootNote => self.config.root_freq,
            StartPosition::Random => self.random_in_range(),
            StartPosition::LastKnown => self.average_track_freq(now),
        };
        let i = self.add_track(freq, true, now);
        // Spawned tracks fade in rather than popping.
        self.tracks[i].fade_swell(self.config.floor_volume, SPAWN_FADE_SECONDS, now);
        i
    }

    /// Point each of `track_indices` at its nearest target by semitone
    /// distance and start their convergences with a shared duration.
    /// Assignment is independent per track, so several tracks may pick
    /// the same note.
    fn assign_and_start(&mut self, track_indices: &[usize], targets: &[f32], now: f64) {
        let mut assignments: Vec<(usize, f32)> = Vec::with_capacity(track_indices.len());
        for &i in track_indices {
            let from = self.tracks[i].logical_freq(now);
            let Some(&target) = targets.iter().min_by(|a, b| {
                pitch::semitone_distance(from, **a)
                    .partial_cmp(&pitch::semitone_distance(from, **b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }) else {
                continue;
            };
            assignments.push((i, target));
        }

        let duration = self.convergence_duration_for(&assignments, now);
        for &(i, target) in &assignments {
            self.start_convergence(i, target, duration, now);
        }
    }

    fn convergence_duration_for(&self, assignments: &[(usize, f32)], now: f64) -> f64 {
        match self.config.duration_mode {
            DurationMode::Fixed => self.config.convergence_duration,
            DurationMode::PerOctave => {
                let max_octaves = assignments
                    .iter()
                    .map(|&(i, target)| {
                        pitch::octave_distance(self.tracks[i].logical_freq(now), target)
                    })
                    .fold(0.0_f32, f32::max);
                self.config
                    .min_duration
                    .max(f64::from(max_octaves) * self.config.duration_per_octave)
            }
        }
    }

    fn start_convergence(&mut self, i: usize, target: f32, duration: f64, now: f64) {
        // A retarget supersedes any pending hold deadline.
        if let Some(stale) = self.tracks[i].take_hold_timer() {
            self.timers.cancel(stale);
        }
        trace!(id = self.tracks[i].id(), target, duration, "converging");
        if self.config.pitch_movement == PitchMovement::ScaleSnapped && !self.scale.is_empty() {
            let from = self.tracks[i].logical_freq(now);
            let curve = self
                .scale
                .staircase_curve(from, target, STAIRCASE_CURVE_POINTS);
            self.tracks[i].begin_convergence_curve(target, duration, curve, now);
        } else {
            let easing = self.config.easing;
            self.tracks[i].begin_convergence(target, duration, easing, now);
        }
        // Grant the anticipatory slice of the swell up front.
        let gain = self.proximity_gain(self.config.anticipatory_swell);
        self.tracks[i].set_swell(gain, now);
    }

    fn arrive(&mut self, i: usize, now: f64) {
        let Some(target) = self.tracks[i].target() else {
            return;
        };
        trace!(id = self.tracks[i].id(), target, "arrived");
        self.tracks[i].settle_on(target, now);
        self.tracks[i].set_swell(self.config.held_volume, now);
        self.tracks[i].play_bounce(
            self.config.bounce_depth_cents,
            self.config.bounce_decay_time,
            now,
        );
        // Hold the vibrato back until the bounce has settled.
        self.tracks[i].defer_vibrato(now + self.config.bounce_decay_time);

        // A queued retarget outranks holding.
        if let Some(queued) = self.tracks[i].take_queued_target() {
            let duration = self.convergence_duration_for(&[(i, queued)], now);
            self.start_convergence(i, queued, duration, now);
            return;
        }

        let id = self.tracks[i].id();
        let deadline = match self.config.post_arrival {
            PostArrivalMode::Cycle => Some(now + self.config.cycle_hold_duration),
            // Hold without a duration lasts until released.
            PostArrivalMode::Hold => self.config.hold_duration.map(|hold| now + hold),
        };
        if let Some(at) = deadline {
            let handle = self.timers.schedule(at, TrackEvent::HoldElapsed { track: id });
            if let Some(stale) = self.tracks[i].set_hold_timer(handle) {
                self.timers.cancel(stale);
            }
        }
    }

    fn begin_departure(&mut self, i: usize, now: f64) {
        if let Some(stale) = self.tracks[i].take_hold_timer() {
            self.timers.cancel(stale);
        }
        let from = self.tracks[i].logical_freq(now);
        let arrived_from_below =
            self.tracks[i].target().unwrap_or(from) >= self.tracks[i].pre_convergence_freq();
        let up = match self.config.departure_direction {
            DepartureDirection::Random => self.rng.gen_bool(0.5),
            DepartureDirection::Inverse => !arrived_from_below,
            DepartureDirection::Continue => arrived_from_below,
        };
        let semitones = self
            .rng
            .gen_range(DEPARTURE_MIN_SEMITONES..=DEPARTURE_MAX_SEMITONES);
        let dest = pitch::shift_semitones(from, if up { semitones } else { -semitones });
        let dest = self.bound(dest);

        trace!(id = self.tracks[i].id(), dest, "departing");
        self.tracks[i].set_phase(TrackPhase::Departing);
        let fade = self.config.departure_fade_time;
        self.tracks[i].glide_to(dest, fade, Easing::Linear, now);
        self.tracks[i].fade_swell(self.config.floor_volume, fade, now);
        let id = self.tracks[i].id();
        self.timers
            .schedule(now + fade, TrackEvent::DepartureComplete { track: id });
    }

    fn finish_departure(&mut self, i: usize, now: f64) {
        if self.tracks[i].is_spawned() {
            self.retire_track(i, SPAWN_FADE_SECONDS, now);
            return;
        }
        self.tracks[i].set_phase(TrackPhase::Idle);
        let gain = self.idle_gain();
        self.tracks[i].set_swell(gain, now);
    }

    /// Hand fresh wander targets to idle tracks whose ramps have ended.
    ///
    /// The pipeline runs in a fixed order: range policy, boundary
    /// handling, correlation, partitioning, interaction, magnetic snap.
    fn wander_idle_tracks(&mut self, now: f64) {
        if self.config.idle_movement == IdleMovement::Stationary {
            return;
        }
        let idle: Vec<usize> = (0..self.tracks.len())
            .filter(|&i| {
                self.tracks[i].phase() == TrackPhase::Idle
                    && !self.tracks[i].is_retiring()
                    && self.tracks[i].ramp_done(now)
            })
            .collect();
        if idle.is_empty() {
            return;
        }

        // Range policy.
        let mut targets: Vec<f32> = idle
            .iter()
            .map(|_| match self.config.wander_mode {
                WanderMode::FreeRoam | WanderMode::StayInScale => self.random_in_range(),
                WanderMode::OrbitHome => {
                    let offset = self
                        .rng
                        .gen_range(-ORBIT_RADIUS_SEMITONES..=ORBIT_RADIUS_SEMITONES);
                    pitch::shift_semitones(self.config.root_freq, offset)
                }
            })
            .collect();

        // Boundary handling.
        for t in &mut targets {
            *t = self.bound(*t);
        }

        // Correlation.
        match self.config.correlation_mode {
            CorrelationMode::Independent => {}
            CorrelationMode::Unison => {
                let lead = targets[0];
                targets.iter_mut().for_each(|t| *t = lead);
            }
            CorrelationMode::Loose => {
                // Blend toward where the group currently is, not where
                // it is headed.
                let avg = self.average_track_freq(now);
                let factor = self.config.correlation_factor;
                for t in &mut targets {
                    *t = *t * (1.0 - factor) + avg * factor;
                }
            }
        }

        // Partitioning: each persistent track gets a log-space slice.
        if self.config.partition_tracks {
            let lo = pitch::to_log2(self.config.min_freq);
            let hi = pitch::to_log2(self.config.max_freq);
            let slices = self.config.track_count.max(1) as f64;
            for (slot, &i) in idle.iter().enumerate() {
                let slice = (self.persistent_index(i).unwrap_or(slot) as f64) % slices;
                let slice_lo = lo + (hi - lo) * slice / slices;
                let slice_hi = lo + (hi - lo) * (slice + 1.0) / slices;
                let log = pitch::to_log2(targets[slot]).clamp(slice_lo, slice_hi);
                targets[slot] = pitch::from_log2(log);
            }
        }

        // Interaction: push near-coincident targets apart, then re-bound.
        if self.config.track_interaction {
            for a in 0..targets.len() {
                for b in (a + 1)..targets.len() {
                    let dist = pitch::semitone_distance(targets[a], targets[b]);
                    if dist < INTERACTION_MIN_SEMITONES {
                        let push = (INTERACTION_MIN_SEMITONES - dist) / 2.0;
                        if targets[a] <= targets[b] {
                            targets[a] = pitch::shift_semitones(targets[a], -push);
                            targets[b] = pitch::shift_semitones(targets[b], push);
                        } else {
                            targets[a] = pitch::shift_semitones(targets[a], push);
                            targets[b] = pitch::shift_semitones(targets[b], -push);
                        }
                        targets[a] = self.bound(targets[a]);
                        targets[b] = self.bound(targets[b]);
                    }
                }
            }
        }

        // Scale affinity: hard snap when pitch movement walks the
        // scale, magnetic pull otherwise.
        if !self.scale.is_empty() {
            match self.config.pitch_movement {
                PitchMovement::ScaleSnapped => {
                    for t in &mut targets {
                        *t = self.scale.nearest(*t);
                    }
                }
                PitchMovement::Continuous if self.config.magnet_strength > 0.0 => {
                    for t in &mut targets {
                        *t = self.scale.magnetic_snap(*t, self.config.magnet_strength);
                    }
                }
                PitchMovement::Continuous => {}
            }
        }

        // Movement speed with random variation sets each ramp's length.
        for (&i, &target) in idle.iter().zip(&targets) {
            let from = self.tracks[i].logical_freq(now);
            let dist = pitch::semitone_distance(from, target);
            let wobble = 1.0 + self.config.variation * self.rng.gen_range(-1.0..1.0_f32);
            let speed = (self.config.movement_speed * wobble).max(0.01);
            let duration = f64::from(dist / speed);
            self.tracks[i].glide_to(target, duration, Easing::Linear, now);
        }
    }

    /// Fade a track to silence and schedule its removal.
    fn retire_track(&mut self, i: usize, fade: f64, now: f64) {
        if let Some(stale) = self.tracks[i].take_hold_timer() {
            self.timers.cancel(stale);
        }
        self.tracks[i].retire();
        self.tracks[i].fade_swell(0.0, fade, now);
        let id = self.tracks[i].id();
        trace!(id, "retiring track");
        self.timers
            .schedule(now + fade, TrackEvent::Retired { track: id });
    }

    /// Starting pitch for a new persistent track.
    fn starting_freq(&mut self, now: f64) -> f32 {
        match self.config.starting_position {
            StartPosition::RootNote => self.config.root_freq,
            StartPosition::Random => self.random_in_range(),
            StartPosition::LastKnown => self.average_track_freq(now),
        }
    }

    /// Linear-Hz average of the live tracks, or the root when there are
    /// none.
    fn average_track_freq(&self, now: f64) -> f32 {
        let mut sum = 0.0;
        let mut count = 0;
        for track in &self.tracks {
            if track.is_retiring() {
                continue;
            }
            sum += track.logical_freq(now);
            count += 1;
        }
        if count == 0 {
            return self.config.root_freq;
        }
        sum / count as f32
    }

    fn persistent_index(&self, i: usize) -> Option<usize> {
        if self.tracks[i].is_spawned() || self.tracks[i].is_retiring() {
            return None;
        }
        Some(
            self.tracks[..i]
                .iter()
                .filter(|t| !t.is_spawned() && !t.is_retiring())
                .count(),
        )
    }

    fn proximity_gain(&self, proximity: f32) -> f32 {
        let p = proximity.clamp(0.0, 1.0);
        let shaped = match self.config.swell_curve {
            SwellCurve::Linear => p,
            SwellCurve::Squared => p * p,
        };
        self.config.floor_volume + shaped * (self.config.held_volume - self.config.floor_volume)
    }

    fn idle_gain(&self) -> f32 {
        match self.config.idle_mode {
            IdleMode::QuietSliding => self.config.idle_volume,
            IdleMode::Silent => 0.0,
        }
    }

    /// Log-uniform random frequency inside the pitch boundaries.
    fn random_in_range(&mut self) -> f32 {
        let lo = pitch::to_log2(self.config.min_freq);
        let hi = pitch::to_log2(self.config.max_freq);
        pitch::from_log2(self.rng.gen_range(lo..=hi))
    }

    /// Apply the boundary policy to a candidate frequency.
    fn bound(&self, hz: f32) -> f32 {
        if self.config.pitch_boundary == PitchBoundary::Unconstrained {
            return hz;
        }
        let min = self.config.min_freq;
        let max = self.config.max_freq;
        if hz >= min && hz <= max {
            return hz;
        }
        match self.config.boundary_behavior {
            BoundaryBehavior::Reflect => {
                let log = pitch::to_log2(hz);
                let lo = pitch::to_log2(min);
                let hi = pitch::to_log2(max);
                let reflected = if log < lo { lo + (lo - log) } else { hi - (log - hi) };
                pitch::from_log2(reflected.clamp(lo, hi))
            }
            BoundaryBehavior::Wrap => {
                let log = pitch::to_log2(hz);
                let lo = pitch::to_log2(min);
                let hi = pitch::to_log2(max);
                let span = hi - lo;
                let mut wrapped = (log - lo) % span;
                if wrapped < 0.0 {
                    wrapped += span;
                }
                pitch::from_log2(lo + wrapped)
            }
            BoundaryBehavior::Recenter => (min + max) / 2.0,
        }
    }
}

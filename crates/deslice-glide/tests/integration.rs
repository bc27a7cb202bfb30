//! End-to-end glide lifecycle scenarios.

use deslice_config::{PostArrivalMode, SlideConfig, WanderMode};
use deslice_core::{ScaleTable, pitch};
use deslice_glide::{ConvergenceScheduler, TrackPhase};
use proptest::prelude::*;

fn tick_for(s: &mut ConvergenceScheduler, from: f64, seconds: f64) -> f64 {
    let mut now = from;
    let end = from + seconds;
    while now < end {
        now += 0.05;
        s.tick(now);
    }
    now
}

/// Full lifecycle: wander, converge, hold, release, depart, wander
/// again.
#[test]
fn full_lifecycle_round_trip() {
    let mut s = ConvergenceScheduler::with_seed(SlideConfig::default(), 17);
    let now = tick_for(&mut s, 0.0, 1.0);
    assert!(
        s.track_states(now)
            .iter()
            .all(|t| t.phase == TrackPhase::Idle)
    );

    s.converge_to(&[261.63, 392.0], now);
    let now = tick_for(&mut s, now, 3.0);
    let states = s.track_states(now);
    assert!(states.iter().all(|t| t.phase == TrackPhase::Held));
    assert!(states.iter().all(|t| t.proximity == 1.0));

    s.release(now);
    let now = tick_for(&mut s, now, 2.0);
    let states = s.track_states(now);
    assert!(states.iter().all(|t| t.phase == TrackPhase::Idle));
    assert!(states.iter().all(|t| t.target.is_none()));
}

#[test]
fn tracks_land_together_despite_unequal_distances() {
    let mut config = SlideConfig::default();
    config.track_count = 2;
    config.convergence_duration = 1.0;
    let mut s = ConvergenceScheduler::with_seed(config, 23);
    // One target close to a track, one far: shared duration means both
    // are held by the same deadline.
    s.converge_to(&[100.0, 900.0], 0.0);
    let now = tick_for(&mut s, 0.0, 1.2);
    assert!(
        s.track_states(now)
            .iter()
            .all(|t| t.phase == TrackPhase::Held)
    );
}

#[test]
fn orbit_home_wandering_stays_near_the_root() {
    let mut config = SlideConfig::default();
    config.wander_mode = WanderMode::OrbitHome;
    config.root_freq = 261.63;
    let mut s = ConvergenceScheduler::with_seed(config, 31);
    let mut now = 0.0;
    for _ in 0..200 {
        now += 0.05;
        s.tick(now);
        for t in s.track_states(now) {
            // Within the orbit radius, with slack for boundary handling.
            assert!(
                pitch::semitone_distance(t.frequency, 261.63) < 12.5,
                "wandered {} st from home",
                pitch::semitone_distance(t.frequency, 261.63)
            );
        }
    }
}

#[test]
fn zero_strength_magnet_leaves_wandering_untouched() {
    // Same seed, same config: a scale with zero pull must produce the
    // exact trajectory of no scale at all.
    let mut config = SlideConfig::default();
    config.magnet_strength = 0.0;
    let mut with_scale = ConvergenceScheduler::with_seed(config.clone(), 37);
    with_scale.set_scale(ScaleTable::new(vec![196.0, 261.63, 329.63, 392.0]));
    let mut without = ConvergenceScheduler::with_seed(config, 37);

    let mut now = 0.0;
    for _ in 0..100 {
        now += 0.05;
        with_scale.tick(now);
        without.tick(now);
        let a = with_scale.track_states(now);
        let b = without.track_states(now);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.frequency, y.frequency);
            assert_eq!(x.phase, y.phase);
        }
    }
}

#[test]
fn full_strength_magnet_pulls_wander_targets_toward_degrees() {
    // With full pull and a dense scale covering the whole range, every
    // wander destination lands closer to its nearest degree than the
    // unsnapped draw would have.
    let degrees: Vec<f32> = (0..49)
        .map(|i| 65.41 * 2.0_f32.powf(i as f32 / 12.0))
        .collect();
    let mut config = SlideConfig::default();
    config.magnet_strength = 1.0;
    let mut s = ConvergenceScheduler::with_seed(config, 43);
    s.set_scale(ScaleTable::new(degrees.clone()));

    let mut now = 0.0;
    for _ in 0..400 {
        now += 0.05;
        s.tick(now);
        // A chromatic table has degrees every semitone, so the nearest
        // one is at most 0.5 st from any raw draw; full-strength pull at
        // that distance moves 80% of the remaining way. Because glides
        // interpolate in Hz between two snapped endpoints, every
        // instantaneous position stays well within a semitone of the
        // lattice.
        for t in s.track_states(now) {
            let nearest = degrees
                .iter()
                .map(|&d| pitch::semitone_distance(t.frequency, d))
                .fold(f32::INFINITY, f32::min);
            assert!(nearest < 1.0, "drifted {nearest} st from the lattice");
        }
    }
}

#[test]
fn cycle_keeps_sounding_until_released() {
    let mut config = SlideConfig::default();
    config.track_count = 2;
    config.post_arrival = PostArrivalMode::Cycle;
    config.cycle_hold_duration = 0.2;
    config.convergence_duration = 0.4;
    config.departure_fade_time = 0.3;
    let mut s = ConvergenceScheduler::with_seed(config, 41);
    s.converge_to(&[220.0, 330.0], 0.0);
    let mut held_seen = 0;
    let mut now = 0.0;
    for _ in 0..240 {
        now += 0.05;
        s.tick(now);
        if s.track_states(now)
            .iter()
            .any(|t| t.phase == TrackPhase::Held)
        {
            held_seen += 1;
        }
    }
    assert!(held_seen > 5, "cycling should keep re-arriving");

    s.release(now);
    let now = tick_for(&mut s, now, 2.0);
    assert!(
        s.track_states(now)
            .iter()
            .all(|t| t.phase == TrackPhase::Idle)
    );
    // Released: no further reconvergence.
    let now = tick_for(&mut s, now, 1.0);
    assert!(
        s.track_states(now)
            .iter()
            .all(|t| t.phase != TrackPhase::Held)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Whatever the seed, converging on in-range targets always ends with
    /// every persistent track held on some requested target.
    #[test]
    fn convergence_always_lands(seed in 0u64..1000) {
        let mut s = ConvergenceScheduler::with_seed(SlideConfig::default(), seed);
        let targets = [196.0, 293.66, 440.0];
        s.converge_to(&targets, 0.0);
        let now = tick_for(&mut s, 0.0, 4.0);
        for t in s.track_states(now) {
            prop_assert_eq!(t.phase, TrackPhase::Held);
            let target = t.target.unwrap();
            prop_assert!(targets.iter().any(|&x| (x - target).abs() < 1e-3));
            prop_assert!(pitch::semitone_distance(t.frequency, target) < 0.11);
        }
    }

    /// Proximity is always within [0, 1].
    #[test]
    fn proximity_is_always_in_unit_range(seed in 0u64..1000) {
        let mut s = ConvergenceScheduler::with_seed(SlideConfig::default(), seed);
        s.converge_to(&[330.0, 550.0], 0.0);
        let mut now = 0.0;
        for _ in 0..100 {
            now += 0.05;
            s.tick(now);
            for t in s.track_states(now) {
                prop_assert!((0.0..=1.0).contains(&t.proximity));
            }
        }
    }
}

//! End-to-end voice management scenarios.

use deslice_core::EnvelopeStage;
use deslice_synth::{ChordVoicePool, FixedVoiceBank};
use proptest::prelude::*;

/// A full pool plus one more chord: the ninth trigger must steal the
/// oldest chord and still sound all three of its notes.
#[test]
fn ninth_chord_steals_the_oldest_of_eight() {
    let mut pool = ChordVoicePool::new(24);

    let mut ids = Vec::new();
    for i in 0..8 {
        let base = 130.81 * (1.0 + i as f32 * 0.1);
        let id = pool
            .trigger_chord(&[base, base * 1.25, base * 1.5], Some(i as u8), i as f64 * 0.25)
            .unwrap();
        ids.push(id);
    }
    assert_eq!(pool.allocation_count(), 8);
    assert_eq!(pool.active_voice_count(2.0), 24);

    let ninth = pool
        .trigger_chord(&[220.0, 275.0, 330.0], Some(8), 2.0)
        .unwrap();

    // Still eight allocations: one in, the oldest out.
    assert_eq!(pool.allocation_count(), 8);
    // The first chord's id is stale now.
    pool.release_chord(ids[0], 2.5);
    assert_eq!(pool.allocation_count(), 8);
    // The new chord releases normally.
    pool.release_chord(ninth, 3.0);
    assert_eq!(pool.allocation_count(), 7);
}

#[test]
fn degree_addressing_survives_stealing() {
    let mut pool = ChordVoicePool::new(6);
    pool.trigger_chord(&[100.0, 125.0, 150.0], Some(0), 0.0);
    pool.trigger_chord(&[200.0, 250.0, 300.0], Some(1), 1.0);
    // Steals degree 0.
    pool.trigger_chord(&[400.0, 500.0, 600.0], Some(2), 2.0);

    // Releasing the stolen degree is a silent no-op.
    pool.release_by_degree(0, 3.0);
    assert_eq!(pool.allocation_count(), 2);

    pool.release_by_degree(1, 3.0);
    pool.release_by_degree(2, 3.0);
    assert_eq!(pool.allocation_count(), 0);
}

#[test]
fn bank_and_pool_share_envelope_semantics() {
    let mut bank = FixedVoiceBank::new();
    bank.set_preset("Pluck").unwrap();
    bank.trigger_attack(0, 0.0);
    // Pluck sustains at zero: the voice is silent once decay settles but
    // still reports Sustain until released.
    let state = &bank.voice_states(2.0)[0];
    assert!(state.gain < 1e-2);
    assert_eq!(state.stage, EnvelopeStage::Sustain);
    bank.trigger_release(0, 2.0);
    assert_eq!(bank.active_count(2.0 + 0.1 * 1.67 + 0.01), 0);
}

proptest! {
    /// Active voices never exceed pool capacity, whatever the trigger and
    /// release pattern.
    #[test]
    fn active_voices_never_exceed_capacity(
        sizes in prop::collection::vec(1usize..5, 1..20),
        releases in prop::collection::vec(any::<bool>(), 1..20),
    ) {
        let mut pool = ChordVoicePool::new(12);
        let mut now = 0.0;
        for (i, &n) in sizes.iter().enumerate() {
            let freqs: Vec<f32> = (0..n).map(|k| 110.0 + k as f32 * 55.0).collect();
            let degree = (i % 4) as u8;
            pool.trigger_chord(&freqs, Some(degree), now);
            if releases.get(i).copied().unwrap_or(false) {
                pool.release_by_degree(degree, now + 0.05);
            }
            now += 0.1;
            prop_assert!(pool.active_voice_count(now) <= pool.pool_size());
        }
    }

    /// Once every chord is released and the longest tail has passed, the
    /// pool is fully silent.
    #[test]
    fn release_all_eventually_silences(
        sizes in prop::collection::vec(1usize..4, 1..10),
    ) {
        let mut pool = ChordVoicePool::new(12);
        let mut now = 0.0;
        for &n in &sizes {
            let freqs: Vec<f32> = (0..n).map(|k| 110.0 + k as f32 * 55.0).collect();
            pool.trigger_chord(&freqs, None, now);
            now += 0.1;
        }
        pool.release_all(now);
        // Pad release is 2.0 s, hard zero at 1.67x.
        prop_assert_eq!(pool.active_voice_count(now + 2.0 * 1.67 + 0.1), 0);
        prop_assert_eq!(pool.allocation_count(), 0);
    }
}

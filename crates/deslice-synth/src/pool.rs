//! Dynamically allocated chord voices with oldest-first stealing.

use std::collections::HashMap;

use deslice_core::{AdsrValues, AutomationLane, Waveform};
use tracing::{debug, warn};

use crate::presets::envelope_preset;
use crate::voice::{ToneVoice, VoiceSnapshot};

/// Default pool capacity.
pub const DEFAULT_POOL_SIZE: usize = 24;

/// Fade used when a voice is forcibly reclaimed from a sounding chord.
const STEAL_FADE_SECONDS: f64 = 0.05;

/// Anti-click ramp for per-degree gain changes.
const DEGREE_GAIN_RAMP_SECONDS: f64 = 0.02;

/// Identity of a sounding chord. Ids are unique for the pool's lifetime,
/// so a stale id from an already-released chord is a harmless no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChordId(u64);

struct ChordAllocation {
    id: ChordId,
    voice_indices: Vec<usize>,
    triggered_at: f64,
    freqs: Vec<f32>,
    degree: Option<u8>,
}

/// A pool of voices shared by all sounding chords.
///
/// Chords claim idle voices on trigger; when the pool runs dry the
/// oldest sounding chord is stolen from, voice by voice, until the new
/// chord fits. Every chord may carry a scale-degree tag, which is the
/// primary addressing scheme for release and retune.
pub struct ChordVoicePool {
    voices: Vec<ToneVoice>,
    allocations: Vec<ChordAllocation>,
    degree_gains: HashMap<u8, AutomationLane>,
    adsr: AdsrValues,
    next_id: u64,
}

impl Default for ChordVoicePool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl ChordVoicePool {
    /// A pool of `size` silent voices with the Pad envelope.
    pub fn new(size: usize) -> Self {
        let adsr = envelope_preset("Pad").unwrap_or_default();
        Self {
            voices: (0..size).map(|_| ToneVoice::new(220.0, adsr)).collect(),
            allocations: Vec::new(),
            degree_gains: HashMap::new(),
            adsr,
            next_id: 0,
        }
    }

    /// Sound a chord at the given frequencies, optionally tagged with a
    /// scale degree. Returns the chord's id, or `None` for an empty
    /// frequency list.
    ///
    /// When fewer voices are free than frequencies requested, sounding
    /// chords are stolen oldest-first until the request fits. If the pool
    /// is exhausted and nothing remains to steal, the chord sounds with
    /// however many voices could be claimed.
    pub fn trigger_chord(&mut self, freqs: &[f32], degree: Option<u8>, now: f64) -> Option<ChordId> {
        if freqs.is_empty() {
            return None;
        }

        let mut free = self.free_voice_indices(now);
        // Oldest-first stealing, bounded by the number of live allocations.
        while free.len() < freqs.len() {
            let Some(oldest) = self
                .allocations
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    a.1.triggered_at
                        .partial_cmp(&b.1.triggered_at)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i)
            else {
                warn!(
                    requested = freqs.len(),
                    claimed = free.len(),
                    "chord pool exhausted with nothing left to steal"
                );
                break;
            };
            let stolen = self.allocations.remove(oldest);
            debug!(
                chord = stolen.id.0,
                voices = stolen.voice_indices.len(),
                "stealing oldest chord"
            );
            for &idx in &stolen.voice_indices {
                self.voices[idx].force_release(now, STEAL_FADE_SECONDS);
                free.push(idx);
            }
        }

        let claimed: Vec<usize> = free.into_iter().take(freqs.len()).collect();
        for (i, &idx) in claimed.iter().enumerate() {
            let voice = &mut self.voices[idx];
            voice.set_adsr(self.adsr);
            voice.set_frequency(freqs[i % freqs.len()], now);
            voice.trigger_attack(now);
        }

        let id = ChordId(self.next_id);
        self.next_id += 1;
        self.allocations.push(ChordAllocation {
            id,
            voice_indices: claimed,
            triggered_at: now,
            freqs: freqs.to_vec(),
            degree,
        });
        Some(id)
    }

    /// Release the chord with the given id. Stale ids are silent no-ops.
    pub fn release_chord(&mut self, id: ChordId, now: f64) {
        if let Some(pos) = self.allocations.iter().position(|a| a.id == id) {
            let alloc = self.allocations.remove(pos);
            for idx in alloc.voice_indices {
                self.voices[idx].trigger_release(now);
            }
        }
    }

    /// Release every chord tagged with `degree`. This is the primary
    /// release path: callers track degrees, not chord ids.
    pub fn release_by_degree(&mut self, degree: u8, now: f64) {
        let mut released = Vec::new();
        self.allocations.retain(|a| {
            if a.degree == Some(degree) {
                released.extend(a.voice_indices.iter().copied());
                false
            } else {
                true
            }
        });
        for idx in released {
            self.voices[idx].trigger_release(now);
        }
    }

    /// Release every sounding chord.
    pub fn release_all(&mut self, now: f64) {
        for alloc in self.allocations.drain(..) {
            for idx in alloc.voice_indices {
                self.voices[idx].trigger_release(now);
            }
        }
    }

    /// Retune every chord tagged with `degree` to new frequencies,
    /// in place and without retriggering envelopes.
    pub fn retune_degree(&mut self, degree: u8, freqs: &[f32], now: f64) {
        if freqs.is_empty() {
            return;
        }
        for alloc in &mut self.allocations {
            if alloc.degree != Some(degree) {
                continue;
            }
            for (i, &idx) in alloc.voice_indices.iter().enumerate() {
                self.voices[idx].set_frequency(freqs[i % freqs.len()], now);
            }
            alloc.freqs = freqs.to_vec();
        }
    }

    /// Ramp the gain scaling for all chords of `degree` over a short
    /// anti-click window.
    pub fn set_degree_gain(&mut self, degree: u8, gain: f32, now: f64) {
        let lane = self
            .degree_gains
            .entry(degree)
            .or_insert_with(|| AutomationLane::new(1.0));
        lane.anchor(now);
        lane.linear_ramp_to(gain.max(0.0), now + DEGREE_GAIN_RAMP_SECONDS);
    }

    /// The gain scaling for `degree` at `now` (1.0 when never set).
    pub fn degree_gain_at(&self, degree: u8, now: f64) -> f32 {
        self.degree_gains
            .get(&degree)
            .map_or(1.0, |lane| lane.value_at(now))
    }

    /// Replace the envelope used by future chord triggers.
    pub fn set_adsr(&mut self, adsr: AdsrValues) {
        self.adsr = adsr.clamped();
    }

    /// Switch every pool voice's waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        for voice in &mut self.voices {
            voice.set_waveform(waveform);
        }
    }

    /// Number of voices sounding or releasing at `now`.
    pub fn active_voice_count(&self, now: f64) -> usize {
        self.voices.iter().filter(|v| v.is_active_at(now)).count()
    }

    /// Number of live chord allocations.
    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    /// Pool capacity.
    pub fn pool_size(&self) -> usize {
        self.voices.len()
    }

    /// Snapshots of every pool voice at `now`.
    pub fn voice_states(&self, now: f64) -> Vec<VoiceSnapshot> {
        self.voices.iter().map(|v| v.snapshot(now)).collect()
    }

    /// Cut everything immediately and drop all allocations.
    pub fn reset(&mut self, now: f64) {
        for voice in &mut self.voices {
            voice.force_release(now, STEAL_FADE_SECONDS);
        }
        self.allocations.clear();
        self.degree_gains.clear();
    }

    /// Voices neither sounding nor referenced by a live allocation.
    fn free_voice_indices(&self, now: f64) -> Vec<usize> {
        (0..self.voices.len())
            .filter(|&i| {
                !self.voices[i].is_active_at(now)
                    && !self
                        .allocations
                        .iter()
                        .any(|a| a.voice_indices.contains(&i))
            })
            .collect()
    }
}

//! Fixed bank of manually-playable voices.

use deslice_core::{AdsrValues, Waveform};
use tracing::info;

use crate::error::SynthError;
use crate::presets::envelope_preset;
use crate::voice::{ToneVoice, VoiceSnapshot};

/// Number of voices in the fixed bank.
pub const BANK_SIZE: usize = 8;

/// Default bank pitches: a C-major-ish spread from C3 to C4.
pub const DEFAULT_VOICE_PITCHES: [f32; BANK_SIZE] = [
    130.81, 146.83, 164.81, 174.61, 196.0, 220.0, 246.94, 261.63,
];

/// Per-voice detune in cents. Small asymmetric offsets keep unison voices
/// from phase-locking into a static timbre.
pub const DEFAULT_VOICE_DETUNE: [f32; BANK_SIZE] = [-7.0, 5.0, -3.0, 8.0, -10.0, 4.0, -6.0, 11.0];

/// A fixed set of [`BANK_SIZE`] voices addressed by index.
///
/// Out-of-range indices are silent no-ops everywhere: the bank is driven
/// from interactive input paths where a stray index should drop, not
/// panic or propagate.
pub struct FixedVoiceBank {
    voices: Vec<ToneVoice>,
    preset_name: String,
}

impl Default for FixedVoiceBank {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedVoiceBank {
    /// A bank at the default pitches and detunes with the Pad envelope.
    pub fn new() -> Self {
        let adsr = envelope_preset("Pad").unwrap_or_default();
        let voices = DEFAULT_VOICE_PITCHES
            .iter()
            .zip(DEFAULT_VOICE_DETUNE)
            .map(|(&hz, cents)| ToneVoice::with_detune(hz, cents, adsr))
            .collect();
        Self {
            voices,
            preset_name: String::from("Pad"),
        }
    }

    /// Start voice `index` sounding. Out-of-range indices do nothing.
    pub fn trigger_attack(&mut self, index: usize, now: f64) {
        if let Some(voice) = self.voices.get_mut(index) {
            voice.trigger_attack(now);
        }
    }

    /// Release voice `index`. Out-of-range indices do nothing.
    pub fn trigger_release(&mut self, index: usize, now: f64) {
        if let Some(voice) = self.voices.get_mut(index) {
            voice.trigger_release(now);
        }
    }

    /// Release every sounding voice.
    pub fn release_all(&mut self, now: f64) {
        for voice in &mut self.voices {
            voice.trigger_release(now);
        }
    }

    /// Retune voice `index` immediately. Out-of-range indices do nothing.
    pub fn set_frequency(&mut self, index: usize, hz: f32, now: f64) {
        if let Some(voice) = self.voices.get_mut(index) {
            voice.set_frequency(hz, now);
        }
    }

    /// Switch every voice to the named envelope preset.
    ///
    /// Already-sounding voices keep their in-flight schedule; the preset
    /// applies from their next trigger.
    pub fn set_preset(&mut self, name: &str) -> Result<(), SynthError> {
        let adsr = envelope_preset(name)?;
        for voice in &mut self.voices {
            voice.set_adsr(adsr);
        }
        self.preset_name = name.to_string();
        info!(preset = name, "voice bank preset changed");
        Ok(())
    }

    /// Switch every voice's oscillator waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        for voice in &mut self.voices {
            voice.set_waveform(waveform);
        }
    }

    /// The active preset name.
    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    /// The envelope currently applied to new triggers.
    pub fn adsr(&self) -> AdsrValues {
        self.voices.first().map(ToneVoice::adsr).unwrap_or_default()
    }

    /// Snapshots of every voice at `now`, in index order.
    pub fn voice_states(&self, now: f64) -> Vec<VoiceSnapshot> {
        self.voices.iter().map(|v| v.snapshot(now)).collect()
    }

    /// Number of voices sounding or releasing at `now`.
    pub fn active_count(&self, now: f64) -> usize {
        self.voices.iter().filter(|v| v.is_active_at(now)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deslice_core::EnvelopeStage;

    #[test]
    fn bank_has_eight_detuned_voices() {
        let bank = FixedVoiceBank::new();
        let states = bank.voice_states(0.0);
        assert_eq!(states.len(), BANK_SIZE);
        for (i, state) in states.iter().enumerate() {
            assert_eq!(state.frequency, DEFAULT_VOICE_PITCHES[i]);
            assert_eq!(state.detune, DEFAULT_VOICE_DETUNE[i]);
            assert!(!state.active);
        }
        // Asymmetric offsets: no two voices share a detune.
        for (i, &a) in DEFAULT_VOICE_DETUNE.iter().enumerate() {
            for &b in &DEFAULT_VOICE_DETUNE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn out_of_range_index_is_a_silent_no_op() {
        let mut bank = FixedVoiceBank::new();
        bank.trigger_attack(99, 0.0);
        bank.trigger_release(99, 0.0);
        bank.set_frequency(99, 440.0, 0.0);
        assert_eq!(bank.active_count(1.0), 0);
    }

    #[test]
    fn attack_and_release_drive_one_voice() {
        let mut bank = FixedVoiceBank::new();
        bank.trigger_attack(2, 0.0);
        assert_eq!(bank.active_count(1.0), 1);
        // Pad attack is 0.8 s.
        assert_eq!(bank.voice_states(0.5)[2].stage, EnvelopeStage::Attack);
        assert_eq!(bank.voice_states(1.0)[2].stage, EnvelopeStage::Decay);
        bank.trigger_release(2, 1.0);
        // Pad release is 2.0 s; inactive only after the 1.67× deadline.
        assert_eq!(bank.active_count(1.0 + 2.0 * 1.67 - 0.1), 1);
        assert_eq!(bank.active_count(1.0 + 2.0 * 1.67 + 0.1), 0);
    }

    #[test]
    fn unknown_preset_is_rejected_and_state_kept() {
        let mut bank = FixedVoiceBank::new();
        assert!(bank.set_preset("Nope").is_err());
        assert_eq!(bank.preset_name(), "Pad");
    }

    #[test]
    fn preset_change_applies_to_future_triggers() {
        let mut bank = FixedVoiceBank::new();
        bank.set_preset("Organ").unwrap();
        assert_eq!(bank.adsr().sustain, 0.85);
        let mut bank2 = FixedVoiceBank::new();
        bank2.set_preset("organ").unwrap();
        assert_eq!(bank2.preset_name(), "organ");
    }
}

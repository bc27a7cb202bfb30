//! A single tone voice: oscillator settings plus envelope automation.

use deslice_core::{AdsrValues, AutomationLane, EnvelopeStage, Waveform, pitch};

/// Target for the exponential release approach. Exponential approaches
/// never reach their target, so release aims here and a hard zero is
/// scheduled at the silence deadline.
const RELEASE_FLOOR: f32 = 1e-4;

#[derive(Clone, Copy, Debug)]
struct ReleaseState {
    silence_at: f64,
}

/// One voice of the engine: a frequency lane, a gain lane shaped by an
/// ADSR schedule, and a waveform selection.
///
/// The voice renders nothing; both lanes are instructions for the
/// downstream subsystem. All envelope motion is scheduled up front at
/// trigger time, so queries at any later `now` are pure reads.
#[derive(Clone, Debug)]
pub struct ToneVoice {
    frequency: AutomationLane,
    detune_cents: f32,
    gain: AutomationLane,
    waveform: Waveform,
    adsr: AdsrValues,
    triggered_at: Option<f64>,
    release: Option<ReleaseState>,
}

/// Point-in-time view of a voice for display layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceSnapshot {
    /// True while the voice is sounding or releasing.
    pub active: bool,
    /// Nominal oscillator frequency in Hz, before detune.
    pub frequency: f32,
    /// Fixed detune in cents.
    pub detune: f32,
    /// Envelope gain, 0–1.
    pub gain: f32,
    /// Derived envelope stage.
    pub stage: EnvelopeStage,
}

impl ToneVoice {
    /// A silent voice at `frequency_hz` with the given envelope.
    pub fn new(frequency_hz: f32, adsr: AdsrValues) -> Self {
        Self::with_detune(frequency_hz, 0.0, adsr)
    }

    /// A silent voice with a fixed detune offset in cents.
    ///
    /// The frequency lane carries the nominal pitch; detune is a
    /// separate oscillator parameter, so retunes keep the offset.
    pub fn with_detune(frequency_hz: f32, detune_cents: f32, adsr: AdsrValues) -> Self {
        Self {
            frequency: AutomationLane::new(pitch::clamp_freq(frequency_hz)),
            detune_cents,
            gain: AutomationLane::new(0.0),
            waveform: Waveform::default(),
            adsr: adsr.clamped(),
            triggered_at: None,
            release: None,
        }
    }

    /// Start the attack phase at `now`.
    ///
    /// Schedules the full attack-decay-sustain shape: a linear ramp to peak
    /// over the attack time, then an exponential approach toward the
    /// sustain level. Retriggering an already-sounding voice re-anchors the
    /// gain first, so there is no click at the restart point.
    pub fn trigger_attack(&mut self, now: f64) {
        let attack_end = now + self.adsr.attack_seconds();
        self.gain.anchor(now);
        self.gain.linear_ramp_to(1.0, attack_end);
        self.gain
            .set_target_at(self.adsr.sustain, attack_end, self.adsr.decay_time_constant());
        self.triggered_at = Some(now);
        self.release = None;
    }

    /// Start the release phase at `now`.
    ///
    /// The gain approaches a near-zero floor exponentially, then snaps to
    /// exactly zero at the silence deadline (1.67 × release). The voice
    /// reports [`EnvelopeStage::Release`] until that deadline passes, even
    /// though the gain is inaudible well before it.
    pub fn trigger_release(&mut self, now: f64) {
        if self.triggered_at.is_none() {
            return;
        }
        let silence_at = now + self.adsr.release_silence_offset();
        self.gain.anchor(now);
        self.gain
            .set_target_at(RELEASE_FLOOR, now, self.adsr.release_time_constant());
        self.gain.set_value_at(0.0, silence_at);
        self.release = Some(ReleaseState { silence_at });
    }

    /// Cut the voice with a short linear fade, bypassing the envelope's
    /// release. Used when a voice is forcibly reclaimed.
    pub fn force_release(&mut self, now: f64, fade_seconds: f64) {
        if self.triggered_at.is_none() {
            return;
        }
        let silence_at = now + fade_seconds.max(deslice_core::MIN_SEGMENT_SECONDS);
        self.gain.anchor(now);
        self.gain.linear_ramp_to(0.0, silence_at);
        self.release = Some(ReleaseState { silence_at });
    }

    /// Jump the oscillator to `hz` immediately, with no ramp.
    ///
    /// This is the one deliberate exception to the anti-click protocol:
    /// chord retunes want the new pitch on the next render quantum, and
    /// the pitch discontinuity is masked by the sustained envelope.
    pub fn set_frequency(&mut self, hz: f32, now: f64) {
        self.frequency.cancel_from(now);
        self.frequency.set_value_at(pitch::clamp_freq(hz), now);
    }

    /// Replace the envelope used by future triggers.
    pub fn set_adsr(&mut self, adsr: AdsrValues) {
        self.adsr = adsr.clamped();
    }

    /// Replace the oscillator waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// The envelope used by future triggers.
    pub fn adsr(&self) -> AdsrValues {
        self.adsr
    }

    /// The current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Envelope gain at `now`.
    pub fn gain_at(&self, now: f64) -> f32 {
        self.gain.value_at(now)
    }

    /// Nominal oscillator frequency at `now`, before detune.
    pub fn frequency_at(&self, now: f64) -> f32 {
        self.frequency.value_at(now)
    }

    /// The fixed detune offset in cents.
    pub fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    /// Effective pitch at `now`: the nominal frequency shifted by the
    /// detune offset.
    pub fn pitch_at(&self, now: f64) -> f32 {
        pitch::shift_cents(self.frequency.value_at(now), self.detune_cents)
    }

    /// Envelope stage at `now`, derived from elapsed time since trigger.
    ///
    /// During release the stage is pinned to `Release` until the silence
    /// deadline, after which the voice is `Idle` and reclaimable.
    pub fn stage_at(&self, now: f64) -> EnvelopeStage {
        let Some(triggered_at) = self.triggered_at else {
            return EnvelopeStage::Idle;
        };
        if let Some(release) = self.release {
            return if now < release.silence_at {
                EnvelopeStage::Release
            } else {
                EnvelopeStage::Idle
            };
        }
        if now < triggered_at {
            return EnvelopeStage::Idle;
        }
        let elapsed = now - triggered_at;
        if elapsed < self.adsr.attack_seconds() {
            EnvelopeStage::Attack
        } else if elapsed < self.adsr.attack_seconds() + self.adsr.decay {
            EnvelopeStage::Decay
        } else {
            EnvelopeStage::Sustain
        }
    }

    /// True while the voice is sounding or releasing.
    pub fn is_active_at(&self, now: f64) -> bool {
        self.stage_at(now) != EnvelopeStage::Idle
    }

    /// Point-in-time snapshot.
    pub fn snapshot(&self, now: f64) -> VoiceSnapshot {
        VoiceSnapshot {
            active: self.is_active_at(now),
            frequency: self.frequency_at(now),
            detune: self.detune_cents,
            gain: self.gain_at(now),
            stage: self.stage_at(now),
        }
    }
}

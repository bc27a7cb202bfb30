//! The engine facade: one context owning every sounding subsystem.

use deslice_config::{IdleMode, PostArrivalMode, SlideConfig, SlideConfigPatch, mood_patch, validation};
use deslice_core::bus::{AudioBackend, BusDiagnostics, LimiterSettings, MasterBus, NullBackend};
use deslice_core::{ScaleTable, Waveform};
use deslice_glide::{ConvergenceScheduler, TrackState};
use deslice_synth::{ChordId, ChordVoicePool, FixedVoiceBank, VoiceSnapshot};
use tracing::info;

use crate::error::EngineError;

/// Full point-in-time view of the engine for display layers.
#[derive(Clone, Debug)]
pub struct EngineSnapshot {
    /// Fixed-bank voices, in index order.
    pub bank_voices: Vec<VoiceSnapshot>,
    /// Chord-pool voices, in index order.
    pub pool_voices: Vec<VoiceSnapshot>,
    /// Glide tracks, persistent first.
    pub glide_tracks: Vec<TrackState>,
    /// Master bus gain.
    pub master_volume: f32,
}

/// The tone engine: a fixed voice bank, a chord voice pool, and the
/// glide scheduler, summed through one master bus.
///
/// The engine is an explicit context: construct as many as needed, each
/// fully independent. All time flows in through method parameters — the
/// engine never reads a clock of its own — so a host drives it from the
/// audio subsystem's clock and tests drive it from a plain counter.
pub struct ToneEngine {
    config: SlideConfig,
    bank: FixedVoiceBank,
    pool: ChordVoicePool,
    scheduler: ConvergenceScheduler,
    bus: MasterBus,
    backend: Box<dyn AudioBackend>,
    /// The solid chord sounding under the current convergence.
    anchor_chord: Option<ChordId>,
}

impl ToneEngine {
    /// An engine on the null backend (tests, headless hosts).
    pub fn new(config: SlideConfig) -> Self {
        Self::with_backend(config, Box::new(NullBackend::default()))
    }

    /// An engine on a caller-supplied audio backend.
    pub fn with_backend(mut config: SlideConfig, backend: Box<dyn AudioBackend>) -> Self {
        validation::clamp(&mut config);
        let scheduler = ConvergenceScheduler::new(config.clone());
        info!(tracks = config.track_count, "engine created");
        Self {
            config,
            bank: FixedVoiceBank::new(),
            pool: ChordVoicePool::default(),
            scheduler,
            bus: MasterBus::new(),
            backend,
            anchor_chord: None,
        }
    }

    /// Deterministic variant for tests and replays.
    pub fn with_seed(mut config: SlideConfig, seed: u64) -> Self {
        validation::clamp(&mut config);
        let scheduler = ConvergenceScheduler::with_seed(config.clone(), seed);
        Self {
            config,
            bank: FixedVoiceBank::new(),
            pool: ChordVoicePool::default(),
            scheduler,
            bus: MasterBus::new(),
            backend: Box::new(NullBackend::default()),
            anchor_chord: None,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SlideConfig {
        &self.config
    }

    /// Advance the engine to `now`. Call on the configured tick interval.
    pub fn tick(&mut self, now: f64) {
        self.scheduler.tick(now);
    }

    // --- fixed voice bank ---

    /// Start bank voice `index` sounding.
    pub fn voice_attack(&mut self, index: usize, now: f64) {
        self.bank.trigger_attack(index, now);
    }

    /// Release bank voice `index`.
    pub fn voice_release(&mut self, index: usize, now: f64) {
        self.bank.trigger_release(index, now);
    }

    /// Switch the bank's envelope preset.
    pub fn set_preset(&mut self, name: &str) -> Result<(), EngineError> {
        self.bank.set_preset(name)?;
        // The chord pool follows the bank's envelope.
        self.pool.set_adsr(self.bank.adsr());
        Ok(())
    }

    // --- chord voice pool ---

    /// Sound a chord, optionally tagged with a scale degree.
    pub fn trigger_chord(&mut self, freqs: &[f32], degree: Option<u8>, now: f64) -> Option<ChordId> {
        self.pool.trigger_chord(freqs, degree, now)
    }

    /// Release a chord by id.
    pub fn release_chord(&mut self, id: ChordId, now: f64) {
        self.pool.release_chord(id, now);
    }

    /// Release every chord tagged with `degree`.
    pub fn release_degree(&mut self, degree: u8, now: f64) {
        self.pool.release_by_degree(degree, now);
    }

    /// Retune every chord of `degree` in place, without retriggering.
    pub fn retune_degree(&mut self, degree: u8, freqs: &[f32], now: f64) {
        self.pool.retune_degree(degree, freqs, now);
    }

    /// Scale the gain of every chord of `degree`.
    pub fn set_degree_gain(&mut self, degree: u8, gain: f32, now: f64) {
        self.pool.set_degree_gain(degree, gain, now);
    }

    // --- glide scheduler ---

    /// Converge the glide tracks onto `targets`, sounding the anchor
    /// chord under them when enabled.
    pub fn converge_to(&mut self, targets: &[f32], now: f64) {
        if let Some(id) = self.anchor_chord.take() {
            self.pool.release_chord(id, now);
        }
        if !targets.is_empty() && self.config.anchor_enabled && self.config.anchor_on_press {
            self.anchor_chord = self.pool.trigger_chord(targets, None, now);
        }
        self.scheduler.converge_to(targets, now);
    }

    /// Release every glide convergence, anchor chord included.
    pub fn release_glides(&mut self, now: f64) {
        if let Some(id) = self.anchor_chord.take() {
            self.pool.release_chord(id, now);
        }
        self.scheduler.release(now);
    }

    /// Freeze the glide layer.
    pub fn pause_glides(&mut self, now: f64) {
        self.scheduler.pause(now);
    }

    /// Resume the glide layer after a pause.
    pub fn resume_glides(&mut self) {
        self.scheduler.resume();
    }

    /// Set one persistent glide track's volume trim.
    pub fn set_track_volume(&mut self, index: usize, gain: f32, now: f64) {
        self.scheduler.set_track_volume(index, gain, now);
    }

    // --- configuration ---

    /// Apply a typed partial configuration update.
    pub fn apply_patch(&mut self, patch: &SlideConfigPatch, now: f64) {
        patch.apply(&mut self.config);
        validation::clamp(&mut self.config);
        self.scheduler.update_config(self.config.clone(), now);
    }

    /// Apply a named mood preset at the given intensity.
    pub fn set_mood(&mut self, name: &str, intensity: f32, now: f64) -> Result<(), EngineError> {
        let patch = mood_patch(name, intensity)?;
        info!(mood = name, intensity, "mood applied");
        self.apply_patch(&patch, now);
        Ok(())
    }

    /// Grow or shrink the persistent glide track set.
    pub fn set_track_count(&mut self, count: usize, now: f64) {
        self.scheduler.set_track_count(count, now);
        self.config.track_count = self.scheduler.config().track_count;
    }

    /// Replace the scale table used by magnetic snapping.
    pub fn set_scale(&mut self, freqs: Vec<f32>) {
        self.scheduler.set_scale(ScaleTable::new(freqs));
    }

    /// Move the glide layer's home frequency.
    pub fn set_root_freq(&mut self, hz: f32, now: f64) {
        self.scheduler.set_root_freq(hz, now);
        self.config.root_freq = self.scheduler.config().root_freq;
    }

    /// Move the glide layer's pitch boundaries.
    pub fn set_pitch_boundaries(&mut self, min_hz: f32, max_hz: f32) {
        self.scheduler.set_pitch_boundaries(min_hz, max_hz);
        let cfg = self.scheduler.config();
        self.config.min_freq = cfg.min_freq;
        self.config.max_freq = cfg.max_freq;
    }

    /// Switch every oscillator's waveform: bank, pool, and glide tracks.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.bank.set_waveform(waveform);
        self.pool.set_waveform(waveform);
        self.scheduler.set_waveform(waveform);
    }

    /// Switch glide idle audibility.
    pub fn set_idle_mode(&mut self, mode: IdleMode, now: f64) {
        self.config.idle_mode = mode;
        self.scheduler.set_idle_mode(mode, now);
    }

    /// Switch the glide post-arrival behavior.
    pub fn set_post_arrival_mode(&mut self, mode: PostArrivalMode) {
        self.config.post_arrival = mode;
        self.scheduler.set_post_arrival_mode(mode);
    }

    // --- bus and backend ---

    /// Ramp the master volume.
    pub fn set_master_volume(&mut self, gain: f32, now: f64) {
        self.bus.set_volume(gain, now);
    }

    /// Suspend the audio backend.
    pub fn suspend(&mut self) {
        self.backend.suspend();
    }

    /// Resume the audio backend.
    pub fn resume(&mut self) {
        self.backend.resume();
    }

    /// Backend health snapshot.
    pub fn bus_diagnostics(&self) -> BusDiagnostics {
        self.backend.diagnostics()
    }

    /// The limiter parameters forwarded to the backend.
    pub fn limiter(&self) -> LimiterSettings {
        self.bus.limiter()
    }

    /// Replace the limiter parameters.
    pub fn set_limiter(&mut self, limiter: LimiterSettings) {
        self.bus.set_limiter(limiter);
    }

    /// Full snapshot for display layers.
    pub fn snapshot(&self, now: f64) -> EngineSnapshot {
        EngineSnapshot {
            bank_voices: self.bank.voice_states(now),
            pool_voices: self.pool.voice_states(now),
            glide_tracks: self.scheduler.track_states(now),
            master_volume: self.bus.volume_at(now),
        }
    }

    /// Silence everything and drop all pending work.
    pub fn dispose(&mut self, now: f64) {
        info!("engine disposed");
        self.anchor_chord = None;
        self.bank.release_all(now);
        self.pool.reset(now);
        self.scheduler.dispose(now);
        self.bus.set_volume(0.0, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deslice_core::EnvelopeStage;
    use deslice_glide::TrackPhase;

    #[test]
    fn engine_drives_all_three_layers() {
        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        engine.voice_attack(0, 0.0);
        engine.trigger_chord(&[261.63, 329.63, 392.0], Some(0), 0.0);
        engine.converge_to(&[220.0, 440.0], 0.0);

        let mut now = 0.0;
        while now < 3.0 {
            now += 0.05;
            engine.tick(now);
        }

        let snap = engine.snapshot(now);
        assert_eq!(snap.bank_voices[0].stage, EnvelopeStage::Sustain);
        // Three chord voices plus the two-note anchor under the glides.
        assert_eq!(
            snap.pool_voices.iter().filter(|v| v.gain > 0.0).count(),
            5
        );
        assert!(
            snap.glide_tracks
                .iter()
                .all(|t| t.phase == TrackPhase::Held)
        );
    }

    #[test]
    fn anchor_chord_sounds_under_convergences_when_enabled() {
        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        engine.converge_to(&[220.0, 330.0], 0.0);
        let snap = engine.snapshot(0.5);
        assert_eq!(
            snap.pool_voices.iter().filter(|v| v.gain > 0.0).count(),
            2
        );
        // Releasing the glides releases the anchor with them.
        engine.release_glides(0.5);
        let snap = engine.snapshot(30.0);
        assert!(snap.pool_voices.iter().all(|v| v.gain == 0.0));

        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        let patch = SlideConfigPatch {
            anchor_enabled: Some(false),
            ..SlideConfigPatch::default()
        };
        engine.apply_patch(&patch, 0.0);
        engine.converge_to(&[220.0, 330.0], 0.0);
        let snap = engine.snapshot(0.5);
        assert!(snap.pool_voices.iter().all(|v| v.gain == 0.0));
    }

    #[test]
    fn unknown_preset_surfaces_as_engine_error() {
        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        assert!(engine.set_preset("NotAPreset").is_err());
        assert!(engine.set_preset("Organ").is_ok());
    }

    #[test]
    fn unknown_mood_surfaces_as_engine_error() {
        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        assert!(engine.set_mood("nope", 0.5, 0.0).is_err());
        assert!(engine.set_mood("bloom", 0.5, 0.0).is_ok());
    }

    #[test]
    fn patch_reaches_the_scheduler() {
        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        let patch = SlideConfigPatch {
            track_count: Some(4),
            ..SlideConfigPatch::default()
        };
        engine.apply_patch(&patch, 0.0);
        assert_eq!(engine.config().track_count, 4);
        assert_eq!(engine.snapshot(0.0).glide_tracks.len(), 4);
    }

    #[test]
    fn dispose_silences_everything() {
        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        engine.voice_attack(0, 0.0);
        engine.trigger_chord(&[220.0, 330.0], None, 0.0);
        engine.converge_to(&[440.0], 0.0);
        engine.dispose(1.0);
        let snap = engine.snapshot(10.0);
        assert!(snap.bank_voices.iter().all(|v| v.gain == 0.0));
        assert!(snap.pool_voices.iter().all(|v| v.gain == 0.0));
        assert_eq!(snap.master_volume, 0.0);
    }

    #[test]
    fn backend_suspension_shows_in_diagnostics() {
        let mut engine = ToneEngine::with_seed(SlideConfig::default(), 1);
        engine.suspend();
        assert_eq!(
            engine.bus_diagnostics().state,
            deslice_core::BusState::Suspended
        );
        engine.resume();
        assert_eq!(
            engine.bus_diagnostics().state,
            deslice_core::BusState::Running
        );
    }
}

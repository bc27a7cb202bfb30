//! Deslice Synth - voice management for the deslice tone engine
//!
//! Two voice-management surfaces on top of `deslice-core` automation:
//!
//! - [`FixedVoiceBank`] - eight manually-addressed voices at fixed,
//!   slightly detuned pitches, for direct interactive playing
//! - [`ChordVoicePool`] - a shared pool of voices claimed per chord,
//!   with oldest-first stealing when the pool runs dry
//!
//! Both surfaces schedule ADSR envelopes as automation events: the
//! attack is a linear ramp to peak, decay and release are exponential
//! approaches, and release ends in a hard snap to exact zero so voices
//! have an unambiguous reclaim point.
//!
//! # Example
//!
//! ```rust
//! use deslice_synth::ChordVoicePool;
//!
//! let mut pool = ChordVoicePool::new(24);
//! let chord = pool.trigger_chord(&[261.63, 329.63, 392.0], Some(0), 0.0);
//! assert!(chord.is_some());
//! assert_eq!(pool.active_voice_count(0.5), 3);
//!
//! pool.release_by_degree(0, 1.0);
//! assert_eq!(pool.allocation_count(), 0);
//! ```

pub mod bank;
pub mod error;
pub mod pool;
pub mod presets;
pub mod voice;

pub use bank::{BANK_SIZE, DEFAULT_VOICE_DETUNE, DEFAULT_VOICE_PITCHES, FixedVoiceBank};
pub use error::SynthError;
pub use pool::{ChordId, ChordVoicePool, DEFAULT_POOL_SIZE};
pub use presets::{PRESET_NAMES, envelope_preset};
pub use voice::{ToneVoice, VoiceSnapshot};

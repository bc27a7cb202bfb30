//! Deslice Engine - the full tone engine behind one facade
//!
//! [`ToneEngine`] owns the three sounding layers and the master bus:
//!
//! - a [`FixedVoiceBank`](deslice_synth::FixedVoiceBank) of eight
//!   manually-playable voices
//! - a [`ChordVoicePool`](deslice_synth::ChordVoicePool) with
//!   oldest-first voice stealing
//! - a [`ConvergenceScheduler`](deslice_glide::ConvergenceScheduler)
//!   driving the wandering glide tracks
//!
//! The engine is an explicit context: no globals, no hidden clock. A
//! host constructs one, pumps [`ToneEngine::tick`] on the configured
//! interval with its own monotonic time, and every other method takes
//! the same `now`.
//!
//! # Example
//!
//! ```rust
//! use deslice_config::SlideConfig;
//! use deslice_engine::ToneEngine;
//!
//! let mut engine = ToneEngine::new(SlideConfig::default());
//! engine.converge_to(&[261.63, 392.0], 0.0);
//! let mut now = 0.0;
//! while now < 2.0 {
//!     now += 0.05;
//!     engine.tick(now);
//! }
//! engine.release_glides(now);
//! ```

pub mod engine;
pub mod error;

pub use engine::{EngineSnapshot, ToneEngine};
pub use error::EngineError;

//! Deslice Glide - continuously sliding pitch tracks that converge on
//! demand
//!
//! A [`GlideTrack`] is a voice whose pitch is always in motion: wandering
//! inside configured boundaries while idle, sliding onto assigned targets
//! when a convergence is requested, and drifting away again afterwards.
//! Its volume swells with proximity to the target, so convergences are
//! heard approaching before they land.
//!
//! The [`ConvergenceScheduler`] drives every track from a periodic tick:
//! it assigns targets greedily by semitone distance, shares one duration
//! per convergence so tracks land together, runs the hold/cycle/departure
//! lifecycle on an explicit timer queue, and pipelines idle wander targets
//! through range, boundary, correlation, partitioning, interaction, and
//! magnetic-snap stages.
//!
//! # Example
//!
//! ```rust
//! use deslice_config::SlideConfig;
//! use deslice_glide::{ConvergenceScheduler, TrackPhase};
//!
//! let mut scheduler = ConvergenceScheduler::with_seed(SlideConfig::default(), 42);
//! scheduler.converge_to(&[261.63, 392.0], 0.0);
//!
//! let mut now = 0.0;
//! while now < 3.0 {
//!     now += 0.05;
//!     scheduler.tick(now);
//! }
//! assert!(
//!     scheduler
//!         .track_states(now)
//!         .iter()
//!         .all(|t| t.phase == TrackPhase::Held)
//! );
//! ```

pub mod scheduler;
pub mod track;

pub use scheduler::ConvergenceScheduler;
pub use track::{GlideTrack, TrackPhase, TrackState};

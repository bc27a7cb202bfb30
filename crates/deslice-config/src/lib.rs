//! Deslice Config - configuration and mood presets for the glide engine
//!
//! The glide engine is driven by one flat record, [`SlideConfig`], with a
//! musical default for every field. Three surfaces sit around it:
//!
//! - [`SlideConfigPatch`] - typed partial updates for live reconfiguration;
//!   unknown field names fail loudly at parse time
//! - [`validation::clamp`] - pulls out-of-range values into their working
//!   ranges instead of rejecting them
//! - [`mood_patch`] - named, intensity-scaled patches ("eerie", "bloom",
//!   "swarm")
//!
//! Configs load from and save to TOML; a file only needs the fields it
//! changes.
//!
//! # Example
//!
//! ```rust
//! use deslice_config::{SlideConfig, SlideConfigPatch, validation};
//!
//! let mut config = SlideConfig::default();
//! let patch = SlideConfigPatch::from_toml_str("track_count = 4").unwrap();
//! patch.apply(&mut config);
//! validation::clamp(&mut config);
//! assert_eq!(config.track_count, 4);
//! ```

pub mod config;
pub mod error;
pub mod patch;
pub mod presets;
pub mod validation;

pub use config::{
    BoundaryBehavior, CorrelationMode, DepartureDirection, DurationMode, IdleMode, IdleMovement,
    MidConvergencePolicy, ModeToggleBehavior, PitchBoundary, PitchMovement, PostArrivalMode,
    SlideConfig, StartPosition, SwellCurve, WanderMode,
};
pub use error::ConfigError;
pub use patch::SlideConfigPatch;
pub use presets::{MOOD_NAMES, mood_patch};

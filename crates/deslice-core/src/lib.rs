//! Deslice Core - automation and pitch primitives for the deslice tone engine
//!
//! This crate provides the foundational building blocks for scheduling
//! click-free audio-parameter automation against an external real-time
//! audio subsystem's clock. Nothing here renders audio: an
//! [`AutomationLane`] is a timeline of fire-and-forget parameter
//! instructions, and the rest of the crate is the math those instructions
//! are computed from.
//!
//! # Core Abstractions
//!
//! ## Parameter Automation
//!
//! Click-free parameter changes via the cancel → anchor → ramp protocol:
//!
//! - [`AutomationLane`] - Timed parameter event list with `value_at` queries
//! - [`Easing`] - Ramp shapes (linear, quadratic ease-in / ease-out)
//!
//! ## Scheduling
//!
//! - [`TimerQueue`] - Monotonic-time event queue with cancelable handles
//! - [`TimerHandle`] - Cancellation token owned by the resource a callback mutates
//!
//! ## Pitch Math
//!
//! - [`pitch`] - Semitone distances and log-frequency interpolation
//! - [`ScaleTable`] - Sorted scale-degree lookup, magnetic snap, staircase curves
//!
//! ## Envelope & Bus Types
//!
//! - [`AdsrValues`] / [`EnvelopeStage`] - Envelope parameters and derived stage
//! - [`Waveform`] - Closed oscillator waveform enumeration
//! - [`MasterBus`] / [`AudioBackend`] - Output bus model and the diagnostics
//!   boundary to the opaque downstream renderer
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! deslice-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use deslice_core::AutomationLane;
//!
//! let mut gain = AutomationLane::new(0.0);
//!
//! // Anti-click protocol: cancel pending, anchor current value, then ramp.
//! gain.anchor(1.0);
//! gain.linear_ramp_to(0.8, 1.5);
//!
//! assert!((gain.value_at(1.25) - 0.4).abs() < 1e-6);
//! assert_eq!(gain.value_at(2.0), 0.8);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod automation;
pub mod bus;
pub mod envelope;
pub mod pitch;
pub mod scale;
pub mod timer;
pub mod waveform;

pub use automation::{AutomationLane, Easing};
pub use bus::{AudioBackend, BusDiagnostics, BusState, LimiterSettings, MasterBus, NullBackend};
pub use envelope::{AdsrValues, EnvelopeStage, MIN_SEGMENT_SECONDS};
pub use scale::ScaleTable;
pub use timer::{TimerHandle, TimerQueue};
pub use waveform::Waveform;

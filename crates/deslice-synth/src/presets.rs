//! Named envelope presets.

use deslice_core::AdsrValues;

use crate::error::SynthError;

/// The valid preset names, in display order.
pub const PRESET_NAMES: [&str; 4] = ["Pad", "Pluck", "Organ", "Strings"];

/// Look up an envelope preset by name (case-insensitive).
///
/// Unknown names are a loud error: a misspelled preset is a programming
/// mistake, not a runtime condition to paper over.
pub fn envelope_preset(name: &str) -> Result<AdsrValues, SynthError> {
    match name.to_ascii_lowercase().as_str() {
        // Slow swell into a warm sustain, long tail.
        "pad" => Ok(AdsrValues {
            attack: 0.8,
            decay: 1.2,
            sustain: 0.7,
            release: 2.0,
        }),
        // Near-instant attack decaying to silence.
        "pluck" => Ok(AdsrValues {
            attack: 0.005,
            decay: 0.3,
            sustain: 0.0,
            release: 0.1,
        }),
        // Flat on/off with minimal shaping.
        "organ" => Ok(AdsrValues {
            attack: 0.01,
            decay: 0.05,
            sustain: 0.85,
            release: 0.01,
        }),
        // Bowed swell with a moderate tail.
        "strings" => Ok(AdsrValues {
            attack: 0.4,
            decay: 0.5,
            sustain: 0.6,
            release: 1.5,
        }),
        _ => Err(SynthError::unknown_preset(name, &PRESET_NAMES)),
    }
}

//! Synth-layer error types.

use thiserror::Error;

/// Errors from voice-bank and pool operations.
///
/// Only genuinely unrecoverable requests error out loudly; transient
/// conditions (an out-of-range voice index, an exhausted pool) degrade
/// silently because they occur in real-time paths where a panic or a
/// propagated error would be worse than a dropped note.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthError {
    /// A named envelope preset does not exist.
    #[error("unknown envelope preset '{name}' (available: {available})")]
    UnknownPreset {
        /// The requested preset name.
        name: String,
        /// Comma-separated list of valid preset names.
        available: String,
    },
}

impl SynthError {
    /// Build an [`SynthError::UnknownPreset`] listing the valid names.
    pub fn unknown_preset(name: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownPreset {
            name: name.into(),
            available: available.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_preset_names_the_alternatives() {
        let err = SynthError::unknown_preset("Wobble", &["Pad", "Pluck"]);
        let msg = err.to_string();
        assert!(msg.contains("'Wobble'"));
        assert!(msg.contains("Pad, Pluck"));
    }
}

//! Engine-level error type.

use thiserror::Error;

/// Errors surfaced through the engine facade.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A voice-layer operation failed.
    #[error(transparent)]
    Synth(#[from] deslice_synth::SynthError),

    /// A configuration operation failed.
    #[error(transparent)]
    Config(#[from] deslice_config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_messages() {
        let err: EngineError = deslice_config::ConfigError::UnknownMood("x".into()).into();
        assert_eq!(err.to_string(), "unknown mood preset: x");
    }
}

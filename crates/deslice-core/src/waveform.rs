//! Oscillator waveform selection.

/// The closed set of oscillator shapes a voice can run.
///
/// Backends map these onto whatever primitive their oscillator offers;
/// the engine only stores and forwards the selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Square wave.
    Square,
    /// Sawtooth wave.
    Sawtooth,
    /// Triangle wave.
    Triangle,
}

impl Waveform {
    /// Stable lowercase name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sine() {
        assert_eq!(Waveform::default(), Waveform::Sine);
        assert_eq!(Waveform::default().name(), "sine");
    }
}

use serde::{Deserialize, Serialize};

/// Requested voice timbre for a synthesized line. The mapping to a concrete
/// provider voice identity lives in configuration and the speech repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicePreference {
    MalePresenting,
    FemalePresenting,
}

impl VoicePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoicePreference::MalePresenting => "male_presenting",
            VoicePreference::FemalePresenting => "female_presenting",
        }
    }
}

impl std::fmt::Display for VoicePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_preference_serde_names() {
        let male: VoicePreference = serde_json::from_str(r#""male_presenting""#).unwrap();
        assert_eq!(male, VoicePreference::MalePresenting);

        let json = serde_json::to_string(&VoicePreference::FemalePresenting).unwrap();
        assert_eq!(json, r#""female_presenting""#);

        assert!(serde_json::from_str::<VoicePreference>(r#""robotic""#).is_err());
    }
}

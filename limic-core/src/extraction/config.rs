//! Parameters of an extraction run

use serde::{Deserialize, Serialize};

use crate::Error;

/// Parameters of a graph extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Maximum free-flight distance in meters around infrastructure nodes
    pub around: f64,
    /// Fraction of a segment length at both ends where crossings are ignored
    pub eps: f64,
    /// Minimum distance in meters from restricted structures
    pub safe_distance: f64,
    /// Weight multiplier for free-flight edges
    pub penalty: f64,
    /// Crossings closer than this many meters are one node
    pub merge_distance: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            around: 1000.0,
            eps: 0.01,
            safe_distance: 100.0,
            penalty: 20.0,
            merge_distance: 0.01,
        }
    }
}

impl ExtractConfig {
    /// # Errors
    ///
    /// Returns an error for non-finite, negative or out of range parameters
    pub fn validate(&self) -> Result<(), Error> {
        let fields = [
            ("around", self.around),
            ("eps", self.eps),
            ("safe_distance", self.safe_distance),
            ("penalty", self.penalty),
            ("merge_distance", self.merge_distance),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if self.eps >= 0.5 {
            return Err(Error::InvalidConfig(format!(
                "eps must be below 0.5, got {}",
                self.eps
            )));
        }

        if self.penalty == 0.0 {
            return Err(Error::InvalidConfig(
                "penalty must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExtractConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.around, 1000.0);
        assert_eq!(config.eps, 0.01);
        assert_eq!(config.safe_distance, 100.0);
        assert_eq!(config.penalty, 20.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            ExtractConfig {
                safe_distance: -1.0,
                ..Default::default()
            },
            ExtractConfig {
                around: f64::NAN,
                ..Default::default()
            },
            ExtractConfig {
                eps: 0.5,
                ..Default::default()
            },
            ExtractConfig {
                penalty: 0.0,
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: ExtractConfig = serde_json::from_str(r#"{"around": 500}"#).unwrap();

        assert_eq!(config.around, 500.0);
        assert_eq!(config.penalty, 20.0);
    }
}
